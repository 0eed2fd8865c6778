//! Durable schedule record and settings write-back.
//!
//! The scheduler reports every state-affecting transition to a [`StateSink`].
//! [`ScheduleStore`] writes synchronously; [`AsyncStateWriter`] moves the
//! writes onto a single background task so the tick path never blocks on IO,
//! while keeping them strictly ordered.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use shrinkborder_config::{ConfigError, ConfigFile};
use shrinkborder_types::{BorderSettings, ScheduleRecord};
use shrinkborder_utils::{
    AtomicWriteOptions, FileSyncPolicy, ParentDirSyncPolicy, atomic_write_with_options,
    recover_bak_file,
};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("schedule record IO error at {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
    #[error("failed to encode schedule record: {0}")]
    Encode(#[from] toml::ser::Error),
    #[error("corrupt schedule record at {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("schedule writer task has shut down")]
    WriterClosed,
}

/// Receives the schedule record after each state-affecting transition.
pub trait StateSink {
    fn save(&mut self, record: ScheduleRecord) -> Result<(), PersistError>;
}

/// Receives the full settings after each accepted `set`.
pub trait SettingsSink {
    fn save_settings(&self, settings: &BorderSettings) -> Result<(), PersistError>;
}

impl SettingsSink for ConfigFile {
    fn save_settings(&self, settings: &BorderSettings) -> Result<(), PersistError> {
        self.persist(settings)?;
        Ok(())
    }
}

/// Schedule record file (`schedule.toml`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleStore {
    path: PathBuf,
}

impl ScheduleStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `Ok(None)` when no record has been written yet.
    pub fn load(&self) -> Result<Option<ScheduleRecord>, PersistError> {
        recover_bak_file(&self.path);
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(PersistError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        toml::from_str(&content)
            .map(Some)
            .map_err(|source| PersistError::Decode {
                path: self.path.clone(),
                source,
            })
    }

    /// [`load`](Self::load), treating a missing or unreadable record as a fresh start.
    #[must_use]
    pub fn load_or_default(&self) -> ScheduleRecord {
        match self.load() {
            Ok(Some(record)) => {
                tracing::info!(
                    path = %self.path.display(),
                    shrinking = record.shrinking,
                    paused = record.paused,
                    ticks = ?record.ticks_until_next_shrink,
                    "Loaded schedule record"
                );
                record
            }
            Ok(None) => ScheduleRecord::default(),
            Err(err) => {
                tracing::warn!("{err}; starting from a stopped schedule");
                ScheduleRecord::default()
            }
        }
    }

    pub fn write(&self, record: &ScheduleRecord) -> Result<(), PersistError> {
        let serialized = toml::to_string(record)?;
        let io_err = |source| PersistError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        atomic_write_with_options(
            &self.path,
            serialized.as_bytes(),
            AtomicWriteOptions {
                file_sync: FileSyncPolicy::SyncAll,
                parent_dir_sync: ParentDirSyncPolicy::SkipSync,
            },
        )
        .map_err(io_err)
    }
}

impl StateSink for ScheduleStore {
    fn save(&mut self, record: ScheduleRecord) -> Result<(), PersistError> {
        self.write(&record)
    }
}

enum WriterCommand {
    Write(ScheduleRecord),
    Flush(oneshot::Sender<()>),
}

/// Handle to the background schedule writer.
///
/// Records are written one at a time in submission order. When several are
/// queued behind a slow write only the newest is written, so an older record
/// can never land after a newer one.
#[derive(Debug, Clone)]
pub struct AsyncStateWriter {
    tx: mpsc::UnboundedSender<WriterCommand>,
}

impl AsyncStateWriter {
    /// Spawn the writer task on the current tokio runtime.
    ///
    /// The task exits once every handle has been dropped and the queue is drained.
    #[must_use]
    pub fn spawn(store: ScheduleStore) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run_writer(store, rx));
        (Self { tx }, handle)
    }

    /// Wait until every record submitted before this call has been written (or failed).
    pub async fn flush(&self) -> Result<(), PersistError> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.tx
            .send(WriterCommand::Flush(ack_tx))
            .map_err(|_| PersistError::WriterClosed)?;
        ack_rx.await.map_err(|_| PersistError::WriterClosed)
    }
}

impl StateSink for AsyncStateWriter {
    fn save(&mut self, record: ScheduleRecord) -> Result<(), PersistError> {
        self.tx
            .send(WriterCommand::Write(record))
            .map_err(|_| PersistError::WriterClosed)
    }
}

async fn run_writer(store: ScheduleStore, mut rx: mpsc::UnboundedReceiver<WriterCommand>) {
    while let Some(command) = rx.recv().await {
        let mut record = match command {
            WriterCommand::Write(record) => record,
            WriterCommand::Flush(ack) => {
                let _ = ack.send(());
                continue;
            }
        };

        // Coalesce queued writes; a flush marks a point that must be written first.
        let mut flush_ack = None;
        while let Ok(next) = rx.try_recv() {
            match next {
                WriterCommand::Write(newer) => record = newer,
                WriterCommand::Flush(ack) => {
                    flush_ack = Some(ack);
                    break;
                }
            }
        }

        let writer_store = store.clone();
        match tokio::task::spawn_blocking(move || writer_store.write(&record)).await {
            Ok(Ok(())) => {
                tracing::trace!(path = %store.path().display(), "Schedule record written");
            }
            Ok(Err(err)) => tracing::warn!("Failed to save schedule record: {err}"),
            Err(join_err) => tracing::warn!("Schedule write task failed: {join_err}"),
        }

        if let Some(ack) = flush_ack {
            let _ = ack.send(());
        }
    }
    tracing::debug!("Schedule writer stopped");
}
