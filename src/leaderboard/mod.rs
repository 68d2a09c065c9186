//! Leaderboard
//!
//! Per-circuit top-10 lists: line codec, persistence, and the signed
//! submission service.

pub mod record;
pub mod store;
pub mod service;

pub use record::{format_records, parse_records, ScoreRecord};
pub use store::{records_file_name, FileRecordStore, MemoryRecordStore, RecordStore, StoreError};
pub use service::{insert_ranked, Leaderboard, LeaderboardError, SubmitOutcome, LEADERBOARD_SIZE};
