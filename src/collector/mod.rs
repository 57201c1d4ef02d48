//! Market data collection
//!
//! Fetches retail saturation snapshots from the game and holds them back until
//! the daily refresh has completed.

mod market_fetcher;
mod saturation_gate;

pub use market_fetcher::{MarketFetcher, MarketSource};
pub use saturation_gate::SaturationGate;
