mod commands;
mod containment;
mod recovery;
