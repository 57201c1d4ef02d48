//! Waits until the upstream snapshot has been refreshed for the day.
//!
//! While the game rebuilds its retail data it serves a snapshot in which every
//! resource reads zero. A snapshot is accepted only once the sentinel resource
//! reports a positive saturation.

use std::time::{Duration, Instant};
use tracing::{info, warn};

use super::market_fetcher::MarketFetcher;
use crate::config::GateConfig;
use crate::domain::{sentinel_ready, SaturationMap};
use crate::error::{Result, SatrecError};

pub struct SaturationGate {
    fetcher: MarketFetcher,
    sentinel_id: String,
    max_retries: u32,
    poll_interval: Duration,
    max_attempts: u32,
    max_wait: Option<Duration>,
}

impl SaturationGate {
    /// `max_retries` is the per-fetch retry budget handed to the fetcher
    pub fn new(fetcher: MarketFetcher, config: &GateConfig, max_retries: u32) -> Self {
        Self {
            fetcher,
            sentinel_id: config.sentinel_id.clone(),
            max_retries,
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            max_attempts: config.max_attempts,
            max_wait: (config.max_wait_secs > 0).then(|| Duration::from_secs(config.max_wait_secs)),
        }
    }

    /// Poll until the sentinel is positive, then return that snapshot.
    ///
    /// Fails with `GateExhausted` after `max_attempts` polls or `GateTimeout`
    /// once `max_wait` has elapsed, whichever comes first.
    pub async fn ensure_ready(&self, realm: u32) -> Result<SaturationMap> {
        let started = Instant::now();
        let poll = self.poll(realm);

        match self.max_wait {
            Some(limit) => match tokio::time::timeout(limit, poll).await {
                Ok(result) => result,
                Err(_) => {
                    warn!(
                        realm,
                        waited_secs = started.elapsed().as_secs(),
                        "gave up waiting for sentinel"
                    );
                    Err(SatrecError::GateTimeout {
                        realm,
                        waited_secs: limit.as_secs(),
                    })
                }
            },
            None => poll.await,
        }
    }

    async fn poll(&self, realm: u32) -> Result<SaturationMap> {
        info!(realm, sentinel = %self.sentinel_id, "waiting for sentinel saturation");
        let mut attempts: u32 = 0;

        loop {
            attempts += 1;
            let data = self.fetcher.fetch(realm, self.max_retries).await;

            if sentinel_ready(&data, &self.sentinel_id) {
                info!(
                    realm,
                    attempts,
                    sentinel_value = data[&self.sentinel_id],
                    "sentinel ready"
                );
                return Ok(data);
            }

            if data.is_empty() {
                warn!(realm, attempts, "received empty snapshot");
            } else {
                info!(
                    realm,
                    attempts,
                    sentinel_value = ?data.get(&self.sentinel_id),
                    "snapshot not refreshed yet"
                );
            }

            if self.max_attempts > 0 && attempts >= self.max_attempts {
                warn!(realm, attempts, "gave up waiting for sentinel");
                return Err(SatrecError::GateExhausted { realm, attempts });
            }

            if !self.poll_interval.is_zero() {
                tokio::time::sleep(self.poll_interval).await;
            }
        }
    }
}
