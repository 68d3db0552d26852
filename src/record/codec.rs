//! Record line codec
//!
//! Encoding and decoding functions for the one-record-per-line format.

use crate::error::{Result, RosterError};

use super::StudentRecord;

/// Encode a record as a single newline-free JSON line (no terminator)
///
/// Compact JSON never contains a raw newline — any newline in a field
/// value is escaped — so the returned string is always safe to frame
/// with a single `\n`.
pub fn encode_record(record: &StudentRecord) -> Result<String> {
    serde_json::to_string(record).map_err(|e| RosterError::Serialization(e.to_string()))
}

/// Decode a record from one line of text
///
/// Tolerates a trailing `\r\n` or `\n`. Fails on malformed syntax,
/// unknown fields, missing fields, and trailing garbage — a line either
/// is exactly one record or it is skippable garbage to the caller.
pub fn decode_record(line: &str) -> Result<StudentRecord> {
    let line = line.trim_end_matches(['\r', '\n']);
    serde_json::from_str(line).map_err(|e| RosterError::Decode(e.to_string()))
}
