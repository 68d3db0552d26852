//! Record Module
//!
//! The fixed-schema student record and its line codec.
//!
//! ## Responsibilities
//! - Define the record shape (fixed field set, unique identifier)
//! - Serialize one record to one self-contained text line
//! - Parse a line back, rejecting unknown or missing fields
//! - Extract the identifier key used by the offset index
//!
//! ## Line Format
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │ {"id":1,"name":"Ann","group":"CS","level":2,"score":4.5}\n  │
//! ├─────────────────────────────────────────────────────────────┤
//! │ {"id":2,"name":"Bob","group":"EE","level":1,"score":3.9}\n  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//! UTF-8 JSON, one object per newline-terminated line. No header, no
//! footer. The embedded `id` is the source of truth for indexing.

mod codec;

pub use codec::{decode_record, encode_record};

use serde::{Deserialize, Serialize};

/// One student record
///
/// Identifier uniqueness is the sole domain invariant; all other fields
/// are unconstrained payload. Records round-trip whole — the store never
/// applies partial patches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StudentRecord {
    /// Unique record identifier
    pub id: u64,

    /// Student name
    pub name: String,

    /// Study group / faculty
    pub group: String,

    /// Course level
    pub level: u32,

    /// Grade point average
    pub score: f64,
}

impl StudentRecord {
    /// Create a new record
    pub fn new(
        id: u64,
        name: impl Into<String>,
        group: impl Into<String>,
        level: u32,
        score: f64,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            group: group.into(),
            level,
            score,
        }
    }

    /// The stringified identifier used as the offset-index key
    pub fn key(&self) -> String {
        self.id.to_string()
    }
}
