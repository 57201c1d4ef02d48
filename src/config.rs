use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::adapters::DEFAULT_API_BASE;
use crate::domain::{DateKeyStyle, HistoryLayout};
use crate::error::{Result, SatrecError};

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub market: MarketConfig,
    #[serde(default)]
    pub gate: GateConfig,
    #[serde(default)]
    pub store: StoreConfig,
    /// Realms polled on every run, each with its own history file
    #[serde(default = "default_realms")]
    pub realms: Vec<RealmTarget>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MarketConfig {
    /// API root; the realm id and `resources-retail-info` are appended
    pub base_url: String,
    /// Per-request timeout in milliseconds
    pub timeout_ms: u64,
    /// Retries after the first failed attempt
    pub max_retries: u32,
    /// Pause between failed attempts in milliseconds
    pub retry_delay_ms: u64,
    /// Drop resources whose saturation is zero or negative
    #[serde(default)]
    pub drop_non_positive: bool,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE.to_string(),
            timeout_ms: 5000,
            max_retries: 10,
            retry_delay_ms: 1000,
            drop_non_positive: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GateConfig {
    /// Resource id whose positive saturation marks a fully refreshed snapshot
    pub sentinel_id: String,
    /// Pause between polls while the sentinel is not ready
    pub poll_interval_ms: u64,
    /// Maximum polls before giving up (0 = unbounded)
    pub max_attempts: u32,
    /// Maximum wall-clock wait in seconds (0 = unbounded)
    pub max_wait_secs: u64,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            sentinel_id: "3".to_string(),
            poll_interval_ms: 30_000,
            max_attempts: 240,
            max_wait_secs: 7200,
        }
    }
}

/// What a run does when today's entry already exists
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PersistPolicy {
    /// Fetch again and replace today's entry
    #[default]
    OverwriteToday,
    /// Leave the realm alone for the rest of the day
    SkipIfPresent,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub policy: PersistPolicy,
    #[serde(default)]
    pub layout: HistoryLayout,
    #[serde(default)]
    pub date_style: DateKeyStyle,
    /// Days of history kept; older date keys are pruned on every write
    pub retention_days: u32,
    /// Offset from UTC used to decide which calendar day a run belongs to
    pub utc_offset_minutes: i32,
    /// Copy the previous file to `<file>.bak` before overwriting it
    pub backup: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            policy: PersistPolicy::default(),
            layout: HistoryLayout::default(),
            date_style: DateKeyStyle::default(),
            retention_days: 365,
            // Asia/Shanghai
            utc_offset_minutes: 8 * 60,
            backup: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RealmTarget {
    /// Upstream realm id (0 = Magnates, 1 = Entrepreneurs)
    pub id: u32,
    /// History file written for this realm
    pub file: PathBuf,
}

impl RealmTarget {
    pub fn new(id: u32, file: impl Into<PathBuf>) -> Self {
        Self {
            id,
            file: file.into(),
        }
    }
}

fn default_realms() -> Vec<RealmTarget> {
    vec![
        RealmTarget::new(0, "data/R1_saturation.json"),
        RealmTarget::new(1, "data/R2_saturation.json"),
    ]
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable JSON formatted logs
    #[serde(default)]
    pub json: bool,
    /// Directory for daily rotated log files; console only when unset
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
            dir: None,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            market: MarketConfig::default(),
            gate: GateConfig::default(),
            store: StoreConfig::default(),
            realms: default_realms(),
            logging: LoggingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a specific directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> std::result::Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();
        let market = MarketConfig::default();
        let gate = GateConfig::default();
        let store = StoreConfig::default();

        let builder = Config::builder()
            // Start with default values
            .set_default("market.base_url", market.base_url)?
            .set_default("market.timeout_ms", market.timeout_ms)?
            .set_default("market.max_retries", i64::from(market.max_retries))?
            .set_default("market.retry_delay_ms", market.retry_delay_ms)?
            .set_default("gate.sentinel_id", gate.sentinel_id)?
            .set_default("gate.poll_interval_ms", gate.poll_interval_ms)?
            .set_default("gate.max_attempts", i64::from(gate.max_attempts))?
            .set_default("gate.max_wait_secs", gate.max_wait_secs)?
            .set_default("store.retention_days", i64::from(store.retention_days))?
            .set_default("store.utc_offset_minutes", i64::from(store.utc_offset_minutes))?
            .set_default("store.backup", store.backup)?
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?
            // Load default config file
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Load environment-specific config (e.g., config/production.toml)
            .add_source(
                File::from(config_dir.join(
                    std::env::var("SATREC_ENV").unwrap_or_else(|_| "development".to_string()),
                ))
                .required(false),
            )
            // Override with environment variables (SATREC__MARKET__TIMEOUT_MS, etc.)
            .add_source(
                Environment::with_prefix("SATREC")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// Reject configurations a run cannot honour
    pub fn validate(&self) -> Result<()> {
        if self.realms.is_empty() {
            return Err(SatrecError::InvalidConfig(
                "at least one realm must be configured".to_string(),
            ));
        }

        let mut ids = HashSet::new();
        let mut files = HashSet::new();
        for realm in &self.realms {
            if !ids.insert(realm.id) {
                return Err(SatrecError::InvalidConfig(format!(
                    "realm {} is configured twice",
                    realm.id
                )));
            }
            // Two realms sharing a flat file would overwrite each other's day.
            if self.store.layout == HistoryLayout::Flat && !files.insert(realm.file.clone()) {
                return Err(SatrecError::InvalidConfig(format!(
                    "{} is shared by several realms; use the nested layout",
                    realm.file.display()
                )));
            }
        }

        if self.store.retention_days == 0 {
            return Err(SatrecError::InvalidConfig(
                "store.retention_days must be positive".to_string(),
            ));
        }
        if self.store.utc_offset_minutes.abs() >= 24 * 60 {
            return Err(SatrecError::InvalidConfig(format!(
                "store.utc_offset_minutes out of range: {}",
                self.store.utc_offset_minutes
            )));
        }
        if self.market.timeout_ms == 0 {
            return Err(SatrecError::InvalidConfig(
                "market.timeout_ms must be positive".to_string(),
            ));
        }
        if self.gate.sentinel_id.trim().is_empty() {
            return Err(SatrecError::InvalidConfig(
                "gate.sentinel_id must not be empty".to_string(),
            ));
        }
        if self.gate.max_attempts == 0 && self.gate.max_wait_secs == 0 {
            return Err(SatrecError::InvalidConfig(
                "gate needs max_attempts or max_wait_secs, otherwise it may poll forever"
                    .to_string(),
            ));
        }

        Ok(())
    }

    /// Look up the configured target for a realm
    pub fn realm(&self, id: u32) -> Option<&RealmTarget> {
        self.realms.iter().find(|r| r.id == id)
    }
}
