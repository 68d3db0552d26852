//! Compacting rewrite
//!
//! Full rewrite of the data file reflecting current logical contents,
//! used to realize updates and deletes.
//!
//! ## Algorithm
//! 1. Open a fresh temp file alongside the data file
//! 2. Walk the index entries; for each, either emit the supplied
//!    replacement payload or re-read the surviving record at its
//!    recorded offset (skipping desynced or undecodable entries)
//! 3. Flush + fsync the temp file, then atomically rename it over the
//!    data file — the replacement is visible in one step
//! 4. Unconditionally rebuild the index from the new file (compaction
//!    moves every later offset; rebuild is correct by construction)
//! 5. Persist the rebuilt index

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Seek, SeekFrom, Write};

use tracing::{debug, warn};

use crate::error::{Result, RosterError};
use crate::index::OffsetIndex;
use crate::record::{self, StudentRecord};

use super::RecordStore;

/// Counters describing one compaction pass
#[derive(Debug)]
pub struct CompactionStats {
    /// Records carried into the rewritten file (replacement included)
    pub records_kept: u64,

    /// Index entries skipped (desync or decode failure)
    pub entries_skipped: u64,
}

impl RecordStore {
    /// Rewrite the data file to match the current index contents
    ///
    /// `replacement`, when supplied, substitutes the stored payload of
    /// the record with the same identifier. An entry whose stored line
    /// cannot be decoded, or whose embedded identifier disagrees with
    /// the index key, is skipped with a warning — index/data desync
    /// never aborts the whole compaction, it self-heals through the
    /// final rebuild.
    pub(super) fn compact(&mut self, replacement: Option<&StudentRecord>) -> Result<CompactionStats> {
        let temp_path = self.config().temp_path(self.data_path());
        let replacement_key = replacement.map(|rec| rec.key());

        let mut stats = CompactionStats {
            records_kept: 0,
            entries_skipped: 0,
        };

        {
            let source = File::open(self.data_path())?;
            let mut reader = BufReader::new(source);

            let temp = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(&temp_path)?;
            let mut writer = BufWriter::new(temp);

            for (existing_key, &offset) in self.index().iter() {
                // Rewrite target: emit the replacement instead of reading disk
                if replacement_key.as_deref() == Some(existing_key.as_str()) {
                    if let Some(rec) = replacement {
                        let line = record::encode_record(rec)?;
                        writer.write_all(line.as_bytes())?;
                        writer.write_all(b"\n")?;
                        stats.records_kept += 1;
                    }
                    continue;
                }

                // Re-read the surviving record at its recorded offset
                reader.seek(SeekFrom::Start(offset))?;
                let mut buf = Vec::new();
                reader.read_until(b'\n', &mut buf)?;

                let decoded = std::str::from_utf8(&buf)
                    .map_err(|e| RosterError::Decode(e.to_string()))
                    .and_then(record::decode_record);

                match decoded {
                    Ok(rec) if rec.key() == *existing_key => {
                        let line = record::encode_record(&rec)?;
                        writer.write_all(line.as_bytes())?;
                        writer.write_all(b"\n")?;
                        stats.records_kept += 1;
                    }
                    Ok(rec) => {
                        warn!(
                            expected = %existing_key,
                            found = rec.id,
                            "skipping index entry with mismatched identifier during compaction"
                        );
                        stats.entries_skipped += 1;
                    }
                    Err(e) => {
                        warn!(
                            offset,
                            error = %e,
                            "skipping undecodable record during compaction"
                        );
                        stats.entries_skipped += 1;
                    }
                }
            }

            // The temp file must be fully on disk before it replaces the
            // data file
            writer.flush()?;
            let temp = writer
                .into_inner()
                .map_err(|e| RosterError::Io(e.into_error()))?;
            temp.sync_all()?;
        }

        // Publish the rewrite in one step
        fs::rename(&temp_path, self.data_path())?;

        // Every later offset moved; recompute instead of patching
        let (index, rebuild) = OffsetIndex::rebuild(self.data_path())?;
        index.persist(self.index_path())?;
        self.set_index(index);

        debug!(
            kept = stats.records_kept,
            skipped = stats.entries_skipped,
            indexed = rebuild.lines_indexed,
            "compaction complete"
        );

        Ok(stats)
    }
}
