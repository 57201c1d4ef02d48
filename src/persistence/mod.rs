//! Durable saturation history
//!
//! One JSON document per history file, keyed by date, rewritten in full on
//! every run.

pub mod history_store;

pub use history_store::{backup_path, HistoryStore, PersistSummary};
