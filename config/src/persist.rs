//! Comment-preserving write-back via `toml_edit`.

use std::fs;
use std::io;
use std::path::Path;

use shrinkborder_types::BorderSettings;
use shrinkborder_utils::{AtomicWriteOptions, FileSyncPolicy, ParentDirSyncPolicy};
use toml_edit::{DocumentMut, Item, Table, value};

use crate::resolve::{
    BORDER, CENTER_X, CENTER_Z, ENABLED, FINAL_SIZE, GRACE, INITIAL_SIZE, INTERVAL, MESSAGES,
    SHRINK_SOUND, SOUNDS, STEP, TELEPORT,
};

fn ensure_table<'a>(doc: &'a mut DocumentMut, name: &str) -> &'a mut Item {
    if !doc.get(name).is_some_and(Item::is_table_like) {
        doc[name] = Item::Table(Table::new());
    }
    &mut doc[name]
}

fn ticks_value(ticks: u64) -> Item {
    value(i64::try_from(ticks).unwrap_or(i64::MAX))
}

pub(crate) fn render(existing: &str, settings: &BorderSettings) -> io::Result<String> {
    let mut doc = existing
        .parse::<DocumentMut>()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    let (center_x, center_z) = settings.center();
    doc[TELEPORT] = value(settings.teleport_enabled());

    let border = ensure_table(&mut doc, BORDER);
    border[CENTER_X] = value(center_x);
    border[CENTER_Z] = value(center_z);
    border[INITIAL_SIZE] = value(settings.initial_size());
    border[FINAL_SIZE] = value(settings.final_size());
    border[STEP] = value(settings.step_amount());
    border[INTERVAL] = ticks_value(settings.interval_ticks());
    border[GRACE] = ticks_value(settings.grace_ticks());

    ensure_table(&mut doc, MESSAGES)[ENABLED] = value(settings.broadcast_enabled());
    ensure_table(&mut doc, SOUNDS)[SHRINK_SOUND] = value(settings.shrink_sound().unwrap_or(""));

    Ok(doc.to_string())
}

/// Creates the file and parent directory if they don't exist.
pub(crate) fn write_settings(path: &Path, settings: &BorderSettings) -> io::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    let existing = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(e),
    };

    let serialized = render(&existing, settings)?;
    shrinkborder_utils::atomic_write_with_options(
        path,
        serialized.as_bytes(),
        AtomicWriteOptions {
            file_sync: FileSyncPolicy::SyncAll,
            parent_dir_sync: ParentDirSyncPolicy::SyncBestEffort,
        },
    )?;
    tracing::debug!(path = %path.display(), "Persisted border settings");
    Ok(())
}
