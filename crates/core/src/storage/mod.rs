//! Storage layer: checksummed snapshot files for index artifacts.
//!
//! Lexical and dense indexes are built offline and persisted as bincode
//! snapshots (atomic temp-file + rename, CRC32 footer). At startup they are
//! loaded once and treated as immutable.

/// Snapshot save/load with atomic writes and integrity checks.
pub mod persistence;

pub use persistence::{load_snapshot, save_snapshot, Snapshot};
