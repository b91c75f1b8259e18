//! # AskDesk Memory
//!
//! SQLite persistence for operator-facing records: queries the knowledge
//! base could not answer, and user feedback.

pub mod sqlite;

pub use sqlite::{FeedbackRecord, MissedQuery, SqliteStore};
