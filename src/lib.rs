pub mod adapters;
pub mod cli;
pub mod collector;
pub mod config;
pub mod coordinator;
pub mod domain;
pub mod error;
pub mod persistence;

pub use adapters::SimCompaniesClient;
pub use collector::{MarketFetcher, MarketSource, SaturationGate};
pub use config::{AppConfig, PersistPolicy, RealmTarget};
pub use coordinator::{RealmOutcome, RealmReport, RunController, RunReport};
pub use domain::{DateKey, DateKeyStyle, HistoryFile, HistoryLayout, SaturationMap};
pub use error::{Result, SatrecError};
pub use persistence::{HistoryStore, PersistSummary};
