//! Record Store
//!
//! Binds a data file path to its offset index and implements the record
//! operations on top of them.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{Result, RosterError};
use crate::index::OffsetIndex;
use crate::record::{self, StudentRecord};

/// Field selector for `find`
#[derive(Debug, Clone, PartialEq)]
pub enum FieldQuery {
    /// Exact identifier match (index fast path)
    Id(u64),

    /// Case-insensitive name match
    Name(String),

    /// Case-insensitive group match
    Group(String),

    /// Exact level match
    Level(u32),

    /// Exact score match
    Score(f64),
}

/// The record store
///
/// Owns the in-memory offset index exclusively; the data file and the
/// sidecar on disk are the durable ground truth any store instance can
/// reload. Every operation opens, uses, and releases its own file
/// handle — nothing is held across operations.
#[derive(Debug)]
pub struct RecordStore {
    /// Path to the data file
    data_path: PathBuf,

    /// Path to the sidecar index file
    index_path: PathBuf,

    /// In-memory offset index (a cache over the data file)
    index: OffsetIndex,

    /// Path conventions and durability knobs
    config: Config,
}

impl RecordStore {
    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Create a store at `path`, truncating any existing data file
    ///
    /// Produces an empty data file and an empty, persisted index.
    pub fn create(path: &Path, config: Config) -> Result<Self> {
        // Truncate/create the data file
        OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        let index = OffsetIndex::new();
        let index_path = config.index_path(path);
        index.persist(&index_path)?;

        Ok(Self {
            data_path: path.to_path_buf(),
            index_path,
            index,
            config,
        })
    }

    /// Open a store over an existing data file
    ///
    /// Unconditionally rebuilds the offset index from the data file —
    /// any stale sidecar is ignored and overwritten. This trades a small
    /// startup cost for eliminating "stale index on open" as a failure
    /// class entirely.
    pub fn open(path: &Path, config: Config) -> Result<Self> {
        let (index, stats) = OffsetIndex::rebuild(path)?;

        let index_path = config.index_path(path);
        index.persist(&index_path)?;

        debug!(
            indexed = stats.lines_indexed,
            skipped = stats.lines_skipped,
            bytes = stats.bytes_scanned,
            "index rebuilt on open"
        );

        Ok(Self {
            data_path: path.to_path_buf(),
            index_path,
            index,
            config,
        })
    }

    /// Replace the data file content with an empty record set
    ///
    /// The file identity is kept; only its content and the index are
    /// discarded.
    pub fn clear(&mut self) -> Result<()> {
        OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(&self.data_path)?;

        self.index.clear();
        self.index.persist(&self.index_path)?;

        Ok(())
    }

    // =========================================================================
    // Record Operations
    // =========================================================================

    /// Get a record by identifier
    ///
    /// Returns `None` on index miss, I/O failure, decode failure, or an
    /// index entry pointing at a mismatched record — a stale index entry
    /// degrades to "not found" rather than escalating, since the next
    /// compaction or rebuild self-heals it.
    pub fn get(&self, id: u64) -> Option<StudentRecord> {
        let offset = self.index.get(&id.to_string())?;

        match self.read_at(offset) {
            Ok(rec) if rec.id == id => Some(rec),
            Ok(rec) => {
                warn!(expected = id, found = rec.id, "index entry points at mismatched record");
                None
            }
            Err(e) => {
                warn!(id, error = %e, "point read failed, degrading to not-found");
                None
            }
        }
    }

    /// Append a new record
    ///
    /// Steps:
    /// 1. Refresh the index from the sidecar (guards against drift from
    ///    a prior session)
    /// 2. Reject a duplicate identifier before touching the file
    /// 3. Append the encoded line; its offset is the file length before
    ///    the write
    /// 4. Persist the index
    ///
    /// After a successful insert, `get(record.id)` yields exactly the
    /// written record.
    pub fn insert(&mut self, record: StudentRecord) -> Result<()> {
        self.refresh_index();

        if self.index.contains(&record.key()) {
            return Err(RosterError::DuplicateId { id: record.id });
        }

        let line = record::encode_record(&record)?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.data_path)?;

        // Starting offset of this entry = file length before the write
        let offset = file.metadata()?.len();

        file.write_all(line.as_bytes())?;
        file.write_all(b"\n")?;
        if self.config.sync_appends {
            file.sync_all()?;
        }

        self.index.insert(record.key(), offset);
        self.index.persist(&self.index_path)?;

        Ok(())
    }

    /// Replace an existing record's payload
    ///
    /// Fails with `NotFound` if the identifier is absent, and with
    /// `Validation` if the payload's embedded identifier disagrees with
    /// `id` — the store never lets an update change a record's identity.
    pub fn update(&mut self, id: u64, record: StudentRecord) -> Result<()> {
        if record.id != id {
            return Err(RosterError::Validation(format!(
                "payload id {} does not match target id {}",
                record.id, id
            )));
        }

        self.refresh_index();

        if !self.index.contains(&record.key()) {
            return Err(RosterError::NotFound { id });
        }

        self.compact(Some(&record))?;

        Ok(())
    }

    /// Delete a record by identifier
    ///
    /// Removes the entry from the index, persists it, then performs a
    /// compacting rewrite that omits the record from the rebuilt file.
    pub fn remove(&mut self, id: u64) -> Result<()> {
        self.refresh_index();

        if self.index.remove(&id.to_string()).is_none() {
            return Err(RosterError::NotFound { id });
        }
        self.index.persist(&self.index_path)?;

        self.compact(None)?;

        Ok(())
    }

    /// Find records matching a single-field query
    ///
    /// Identifier queries resolve through the index; all other fields
    /// scan the indexed records. Text fields compare case-insensitively.
    pub fn find(&self, query: &FieldQuery) -> Vec<StudentRecord> {
        // Fast path: the identifier is the indexed key
        if let FieldQuery::Id(id) = query {
            return self.get(*id).into_iter().collect();
        }

        let needle = match query {
            FieldQuery::Name(s) | FieldQuery::Group(s) => s.to_lowercase(),
            _ => String::new(),
        };

        self.all()
            .into_iter()
            .filter(|rec| match query {
                FieldQuery::Id(id) => rec.id == *id,
                FieldQuery::Name(_) => rec.name.to_lowercase() == needle,
                FieldQuery::Group(_) => rec.group.to_lowercase() == needle,
                FieldQuery::Level(level) => rec.level == *level,
                FieldQuery::Score(score) => rec.score == *score,
            })
            .collect()
    }

    /// Load every indexed record, in index order
    ///
    /// Entries that fail to load are skipped with a warning, matching
    /// the degrade-to-absent behavior of `get`.
    pub fn all(&self) -> Vec<StudentRecord> {
        let mut records = Vec::with_capacity(self.index.len());

        for (key, &offset) in self.index.iter() {
            match self.read_at(offset) {
                Ok(rec) if rec.key() == *key => records.push(rec),
                Ok(rec) => {
                    warn!(expected = %key, found = rec.id, "skipping index entry with mismatched identifier");
                }
                Err(e) => {
                    warn!(key = %key, error = %e, "skipping unreadable record");
                }
            }
        }

        records
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Get the data file path
    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    /// Get the sidecar index file path
    pub fn index_path(&self) -> &Path {
        &self.index_path
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Number of indexed records
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Check whether the store holds no records
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Check whether an identifier is present
    pub fn contains(&self, id: u64) -> bool {
        self.index.contains(&id.to_string())
    }

    // =========================================================================
    // Internal Helpers
    // =========================================================================

    /// Seek to `offset` in the data file and decode one line
    pub(super) fn read_at(&self, offset: u64) -> Result<StudentRecord> {
        let file = File::open(&self.data_path)?;
        let mut reader = BufReader::new(file);
        reader.seek(SeekFrom::Start(offset))?;

        let mut buf = Vec::new();
        let line_len = reader.read_until(b'\n', &mut buf)?;
        if line_len == 0 {
            return Err(RosterError::Decode(format!(
                "offset {} is past the end of the data file",
                offset
            )));
        }

        let line = std::str::from_utf8(&buf).map_err(|e| RosterError::Decode(e.to_string()))?;
        record::decode_record(line)
    }

    /// Reload the index from the sidecar, falling back to a rebuild
    ///
    /// Guards every write against the sidecar having drifted since this
    /// index was loaded (e.g. by a prior session on the same path).
    pub(crate) fn refresh_index(&mut self) {
        match OffsetIndex::load(&self.index_path) {
            Ok(index) => self.index = index,
            Err(_) => match OffsetIndex::rebuild(&self.data_path) {
                Ok((index, _)) => self.index = index,
                Err(e) => {
                    warn!(error = %e, "index refresh failed, keeping in-memory copy");
                }
            },
        }
    }

    /// Shared access to the index for the compaction pass
    pub(super) fn index(&self) -> &OffsetIndex {
        &self.index
    }

    /// Replace the in-memory index (compaction installs the rebuilt one)
    pub(super) fn set_index(&mut self, index: OffsetIndex) {
        self.index = index;
    }
}
