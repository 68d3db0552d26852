//! # rosterdb
//!
//! An append-log student record store with:
//! - One self-describing JSON line per record
//! - A sidecar offset index for point lookups without full scans
//! - Updates and deletes via full-file compacting rewrite
//! - Index rebuild for crash and corruption recovery
//! - Byte-copy backup/restore of the (data, index) pair
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                  Session                     │
//! │    create / open / close / delete / clear    │
//! └─────────────────────┬───────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────┐
//! │                RecordStore                   │
//! │   get / insert / update / remove / find      │
//! └──────────┬──────────────────────┬───────────┘
//!            │                      │
//!            ▼                      ▼
//!     ┌─────────────┐       ┌─────────────┐
//!     │  Data File  │       │ OffsetIndex │
//!     │ (JSON lines)│◀─────▶│  (sidecar)  │
//!     └─────────────┘       └─────────────┘
//! ```
//!
//! The data file is the durability-authoritative copy; the index is a
//! cache over it that any store instance can rebuild by a linear scan.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod record;
pub mod index;
pub mod store;
pub mod session;
pub mod backup;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{Result, RosterError};
pub use config::Config;
pub use record::StudentRecord;
pub use index::OffsetIndex;
pub use store::{FieldQuery, RecordStore};
pub use session::Session;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of rosterdb
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
