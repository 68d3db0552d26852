//! Session Module
//!
//! Explicit lifecycle manager for one bound store.
//!
//! ## Responsibilities
//! - Bind/unbind a data file path (create/open/close/delete/clear)
//! - Route record operations to the bound store
//! - Surface `NotBound` instead of panicking when nothing is bound
//!
//! A `Session` is an ordinary value passed to every operation — there is
//! no process-wide singleton. Exactly one session is assumed per path
//! pair at a time; concurrent external writers are out of scope.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::backup;
use crate::config::Config;
use crate::error::{Result, RosterError};
use crate::record::StudentRecord;
use crate::store::{FieldQuery, RecordStore};

/// One bound (data file, index file) pair and its loaded index
pub struct Session {
    /// Path conventions and durability knobs
    config: Config,

    /// The bound store, if any
    store: Option<RecordStore>,
}

impl Session {
    /// Create an unbound session with the given config
    pub fn new(config: Config) -> Self {
        Self {
            config,
            store: None,
        }
    }

    /// Create an unbound session with default config
    pub fn with_defaults() -> Self {
        Self::new(Config::default())
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Create a database at `path` and bind it
    ///
    /// Truncates any existing data file and persists an empty index.
    pub fn create(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let store = RecordStore::create(path, self.config.clone())?;

        info!(path = %path.display(), "database created");
        self.store = Some(store);

        Ok(())
    }

    /// Open an existing database at `path` and bind it
    ///
    /// The index is rebuilt from the data file unconditionally; a stale
    /// or corrupt sidecar is overwritten.
    pub fn open(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let store = RecordStore::open(path, self.config.clone())?;

        info!(path = %path.display(), records = store.len(), "database opened");
        self.store = Some(store);

        Ok(())
    }

    /// Drop the binding without touching the files
    pub fn close(&mut self) {
        if let Some(store) = self.store.take() {
            info!(path = %store.data_path().display(), "database closed");
        }
    }

    /// Remove the bound database's files and unbind
    ///
    /// The sidecar is removed too — its entries are meaningless once the
    /// data file is gone.
    pub fn delete(&mut self) -> Result<()> {
        let store = self.store.take().ok_or(RosterError::NotBound)?;

        fs::remove_file(store.data_path())?;
        if let Err(e) = fs::remove_file(store.index_path()) {
            if e.kind() != io::ErrorKind::NotFound {
                warn!(error = %e, "could not remove sidecar index file");
            }
        }

        info!(path = %store.data_path().display(), "database deleted");

        Ok(())
    }

    /// Empty the bound database, keeping the file identity
    pub fn clear(&mut self) -> Result<()> {
        self.store_mut()?.clear()?;
        info!("database cleared");

        Ok(())
    }

    // =========================================================================
    // Record Operations
    // =========================================================================

    /// Add a new record; rejects a duplicate identifier before mutating
    pub fn add(&mut self, record: StudentRecord) -> Result<()> {
        self.store_mut()?.insert(record)
    }

    /// Get a record by identifier (`None` when absent or unreadable)
    pub fn get(&self, id: u64) -> Result<Option<StudentRecord>> {
        Ok(self.store_ref()?.get(id))
    }

    /// Replace an existing record's payload
    pub fn update(&mut self, id: u64, record: StudentRecord) -> Result<()> {
        self.store_mut()?.update(id, record)
    }

    /// Delete a record by identifier
    pub fn remove(&mut self, id: u64) -> Result<()> {
        self.store_mut()?.remove(id)
    }

    /// Find records matching a single-field query
    pub fn find(&self, query: &FieldQuery) -> Result<Vec<StudentRecord>> {
        Ok(self.store_ref()?.find(query))
    }

    /// Load every record, in index order
    pub fn all(&self) -> Result<Vec<StudentRecord>> {
        Ok(self.store_ref()?.all())
    }

    // =========================================================================
    // Backup / Restore
    // =========================================================================

    /// Byte-copy the bound pair to the derived backup location
    ///
    /// Returns the backup data path.
    pub fn backup(&self) -> Result<PathBuf> {
        let store = self.store_ref()?;
        backup::backup(&self.config, store.data_path())
    }

    /// Byte-copy a backup pair over the bound paths and rebuild the index
    pub fn restore(&mut self, backup_path: impl AsRef<Path>) -> Result<()> {
        let store = self.store.as_mut().ok_or(RosterError::NotBound)?;

        let target = store.data_path().to_path_buf();
        backup::restore(&self.config, backup_path.as_ref(), &target)?;

        // Pick up the index that restore just rebuilt and persisted
        store.refresh_index();

        Ok(())
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Check whether a database is bound
    pub fn is_bound(&self) -> bool {
        self.store.is_some()
    }

    /// Access the bound store, if any
    pub fn store(&self) -> Option<&RecordStore> {
        self.store.as_ref()
    }

    // =========================================================================
    // Internal Helpers
    // =========================================================================

    fn store_ref(&self) -> Result<&RecordStore> {
        self.store.as_ref().ok_or(RosterError::NotBound)
    }

    fn store_mut(&mut self) -> Result<&mut RecordStore> {
        self.store.as_mut().ok_or(RosterError::NotBound)
    }
}
