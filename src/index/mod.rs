//! Offset Index Module
//!
//! Mapping from record identifier to the byte offset where that record's
//! line begins in the data file.
//!
//! ## Responsibilities
//! - Point lookups without scanning the data file
//! - Persist as a JSON sidecar next to the data file
//! - Rebuild from the data file alone (crash/corruption recovery)
//!
//! ## Sidecar Format
//! ```text
//! ┌──────────────────────┐
//! │ {"1":0,"2":46,"3":92}│
//! └──────────────────────┘
//! ```
//! A single JSON object, identifier string → byte offset. The index is a
//! cache over the data file, never the durability-authoritative copy:
//! for every entry, reading a line at its offset must yield a record
//! whose embedded identifier equals the key.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::warn;

use crate::error::{Result, RosterError};
use crate::record;

/// In-memory offset index
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OffsetIndex {
    /// Identifier string → byte offset of the record's line start
    entries: BTreeMap<String, u64>,
}

/// Result of an index rebuild scan
#[derive(Debug)]
pub struct RebuildStats {
    /// Number of decodable lines indexed
    pub lines_indexed: u64,

    /// Number of undecodable lines skipped
    pub lines_skipped: u64,

    /// Total bytes scanned (always the full file length)
    pub bytes_scanned: u64,
}

impl OffsetIndex {
    /// Create a new empty index
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Load the persisted mapping from a sidecar file
    ///
    /// A missing sidecar or a deserialization failure is not fatal — it
    /// signals the caller to rebuild from the data file.
    pub fn load(index_path: &Path) -> Result<Self> {
        let file = File::open(index_path)?;
        let entries: BTreeMap<String, u64> = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| RosterError::Decode(e.to_string()))?;

        Ok(Self { entries })
    }

    /// Persist the full mapping to a sidecar file (overwrite semantics)
    pub fn persist(&self, index_path: &Path) -> Result<()> {
        let doc = serde_json::to_string(&self.entries)
            .map_err(|e| RosterError::Serialization(e.to_string()))?;
        fs::write(index_path, doc)?;

        Ok(())
    }

    /// Rebuild the index by scanning a data file from offset 0 to EOF
    ///
    /// Steps per line:
    /// 1. Read raw bytes up to and including the terminator
    /// 2. Decode; on success, index the embedded identifier at the line's
    ///    starting offset (a later duplicate overwrites an earlier one)
    /// 3. On failure, skip the line with a warning
    /// 4. Advance the running offset by the exact byte length of the line
    ///    regardless of decode success, preserving alignment with
    ///    subsequent lines
    pub fn rebuild(data_path: &Path) -> Result<(Self, RebuildStats)> {
        let mut entries = BTreeMap::new();
        let mut stats = RebuildStats {
            lines_indexed: 0,
            lines_skipped: 0,
            bytes_scanned: 0,
        };

        let file = File::open(data_path)?;
        let mut reader = BufReader::new(file);

        // Byte offset where the current line starts
        let mut position: u64 = 0;
        let mut buf = Vec::new();

        loop {
            buf.clear();
            let line_len = reader.read_until(b'\n', &mut buf)?;
            if line_len == 0 {
                break; // EOF
            }

            let decoded = std::str::from_utf8(&buf)
                .ok()
                .and_then(|line| record::decode_record(line).ok());

            match decoded {
                Some(rec) => {
                    entries.insert(rec.key(), position);
                    stats.lines_indexed += 1;
                }
                None => {
                    warn!(offset = position, "skipping undecodable line during index rebuild");
                    stats.lines_skipped += 1;
                }
            }

            position += line_len as u64;
        }

        stats.bytes_scanned = position;

        Ok((Self { entries }, stats))
    }

    // =========================================================================
    // Map Operations
    // =========================================================================

    /// Get the byte offset for an identifier
    pub fn get(&self, key: &str) -> Option<u64> {
        self.entries.get(key).copied()
    }

    /// Record an (identifier → offset) entry
    pub fn insert(&mut self, key: String, offset: u64) {
        self.entries.insert(key, offset);
    }

    /// Remove an identifier; returns its offset if it was present
    pub fn remove(&mut self, key: &str) -> Option<u64> {
        self.entries.remove(key)
    }

    /// Check whether an identifier is indexed
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of indexed identifiers
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether the index is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop all entries
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Iterate (identifier, offset) pairs in key order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &u64)> {
        self.entries.iter()
    }

    /// Iterate identifiers in key order
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }
}
