//! Backup Module
//!
//! Byte-for-byte copies of the (data file, index file) pair to and from
//! a companion location.
//!
//! ## Responsibilities
//! - Derive backup paths from the data file's path
//! - Copy the data file (mandatory) and the sidecar (best effort)
//! - On restore, force an index rebuild — the copied sidecar is never
//!   trusted to be consistent with the copied data file
//!
//! These functions operate on paths alone so a backup can be taken or
//! restored independent of an open session.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::config::Config;
use crate::error::Result;
use crate::index::OffsetIndex;

/// Copy the pair at `data_path` to the derived backup location
///
/// The index copy is best effort: the sidecar is always reconstructible
/// from the data file, so a failed copy is logged and the backup still
/// succeeds. Returns the backup data path.
pub fn backup(config: &Config, data_path: &Path) -> Result<PathBuf> {
    let backup_path = config.backup_path(data_path);
    fs::copy(data_path, &backup_path)?;

    let index_backup = config.index_path(&backup_path);
    if let Err(e) = fs::copy(config.index_path(data_path), &index_backup) {
        warn!(error = %e, "sidecar index backup failed; it will be rebuilt on restore");
    }

    info!(path = %backup_path.display(), "backup written");

    Ok(backup_path)
}

/// Copy a backup pair over `target_path` and rebuild its index
///
/// The sidecar copy is best effort (a backup without one is fine); the
/// mandatory rebuild afterwards guarantees a consistent index regardless
/// of what was copied.
pub fn restore(config: &Config, backup_path: &Path, target_path: &Path) -> Result<()> {
    fs::copy(backup_path, target_path)?;

    let index_backup = config.index_path(backup_path);
    if let Err(e) = fs::copy(&index_backup, config.index_path(target_path)) {
        warn!(error = %e, "no sidecar in backup; relying on rebuild");
    }

    let (index, stats) = OffsetIndex::rebuild(target_path)?;
    index.persist(&config.index_path(target_path))?;

    info!(
        from = %backup_path.display(),
        records = stats.lines_indexed,
        "database restored"
    );

    Ok(())
}
