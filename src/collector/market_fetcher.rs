//! Bounded-retry fetch of one realm's saturation snapshot.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::config::MarketConfig;
use crate::domain::{retain_positive, SaturationMap};
use crate::error::Result;

/// A single attempt at reading a realm's retail saturation.
///
/// Implementations do not retry; [`MarketFetcher`] owns the retry budget.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketSource: Send + Sync {
    async fn fetch_snapshot(&self, realm: u32) -> Result<SaturationMap>;
}

/// Wraps a [`MarketSource`] with retries and the optional positive filter
#[derive(Clone)]
pub struct MarketFetcher {
    source: Arc<dyn MarketSource>,
    retry_delay: Duration,
    drop_non_positive: bool,
}

impl MarketFetcher {
    pub fn new(source: Arc<dyn MarketSource>, config: &MarketConfig) -> Self {
        Self {
            source,
            retry_delay: Duration::from_millis(config.retry_delay_ms),
            drop_non_positive: config.drop_non_positive,
        }
    }

    /// Set the pause between failed attempts
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Fetch a snapshot, making at most `max_retries + 1` attempts.
    ///
    /// Never fails: once the budget is spent the error is logged and an empty
    /// map is returned, which callers must read as "no data".
    pub async fn fetch(&self, realm: u32, max_retries: u32) -> SaturationMap {
        let attempts = max_retries.saturating_add(1);

        for attempt in 1..=attempts {
            debug!(realm, attempt, "fetching market saturation");

            match self.source.fetch_snapshot(realm).await {
                Ok(mut data) => {
                    let received = data.len();
                    if self.drop_non_positive {
                        retain_positive(&mut data);
                    }
                    info!(
                        realm,
                        attempt,
                        received,
                        kept = data.len(),
                        "fetched market saturation"
                    );
                    return data;
                }
                Err(e) => {
                    let remaining = attempts - attempt;
                    if remaining == 0 {
                        error!(realm, attempts, error = %e, "market saturation unavailable");
                        break;
                    }
                    warn!(realm, attempt, remaining, error = %e, "market saturation fetch failed, retrying");
                    if !self.retry_delay.is_zero() {
                        tokio::time::sleep(self.retry_delay).await;
                    }
                }
            }
        }

        SaturationMap::new()
    }
}
