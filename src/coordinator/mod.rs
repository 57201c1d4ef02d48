//! Run orchestration
//!
//! Drives the fetch → gate → persist pipeline for each realm and collects the
//! per-realm outcomes of a run.

pub mod run_controller;

pub use run_controller::{RealmOutcome, RealmReport, RunController, RunReport};
