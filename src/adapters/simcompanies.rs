//! Sim Companies public market API.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use crate::collector::MarketSource;
use crate::config::MarketConfig;
use crate::domain::{saturation_map, RetailInfoRecord, SaturationMap};
use crate::error::{Result, SatrecError};

pub const DEFAULT_API_BASE: &str = "https://www.simcompanies.com/api/v4";

#[derive(Clone)]
pub struct SimCompaniesClient {
    http: Client,
    base_url: String,
}

impl SimCompaniesClient {
    pub fn new(base_url: Option<&str>, timeout: Duration) -> Result<Self> {
        let base_url = base_url
            .unwrap_or(DEFAULT_API_BASE)
            .trim_end_matches('/')
            .to_string();

        let http = Client::builder()
            .user_agent(concat!("satrec/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| {
                SatrecError::InvalidConfig(format!("failed to build HTTP client: {}", e))
            })?;

        Ok(Self { http, base_url })
    }

    pub fn from_config(config: &MarketConfig) -> Result<Self> {
        Self::new(
            Some(&config.base_url),
            Duration::from_millis(config.timeout_ms),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn retail_info_url(&self, realm: u32) -> String {
        format!("{}/{}/resources-retail-info", self.base_url, realm)
    }
}

#[async_trait]
impl MarketSource for SimCompaniesClient {
    async fn fetch_snapshot(&self, realm: u32) -> Result<SaturationMap> {
        let url = self.retail_info_url(realm);
        debug!(realm, %url, "requesting retail info");

        let resp = self.http.get(&url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(SatrecError::UpstreamStatus {
                realm,
                status: status.as_u16(),
            });
        }

        let body = resp.bytes().await?;
        let records: Vec<RetailInfoRecord> = serde_json::from_slice(&body).map_err(|e| {
            SatrecError::InvalidMarketData(format!("realm {}: {}", realm, e))
        })?;

        Ok(saturation_map(records))
    }
}
