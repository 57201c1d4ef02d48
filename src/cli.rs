use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::adapters::SimCompaniesClient;
use crate::collector::MarketSource;
use crate::config::AppConfig;
use crate::domain::{catalog, sentinel_ready, Category, CATEGORIES};
use crate::persistence::HistoryStore;

pub mod output;
pub mod recent;

use output::OutputMode;
use recent::RecentRow;

#[derive(Parser)]
#[command(name = "satrec")]
#[command(version)]
#[command(about = "Daily Sim Companies market saturation recorder", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Config directory (default.toml plus the SATREC_ENV overlay)
    #[arg(short, long, default_value = "config", global = true)]
    pub config: PathBuf,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Record today's saturation for every configured realm (default)
    Run,
    /// Fetch each realm once and report what the API returns, without saving
    Check {
        /// Only check this realm
        #[arg(short, long)]
        realm: Option<u32>,
    },
    /// Show the most recent recorded days of a realm
    Recent {
        /// Realm id
        #[arg(short, long, default_value = "0")]
        realm: u32,
        /// Number of most recent date keys to include
        #[arg(short, long, default_value = "7")]
        days: usize,
        /// Restrict to one store category (e.g. fresh-store)
        #[arg(long)]
        category: Option<String>,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

/// Single unretried request per realm, reporting sentinel readiness
pub async fn check_connection(config: &AppConfig, realm: Option<u32>) -> anyhow::Result<bool> {
    let client = SimCompaniesClient::from_config(&config.market)?;
    let sentinel = config.gate.sentinel_id.as_str();
    let realms: Vec<u32> = match realm {
        Some(id) => vec![id],
        None => config.realms.iter().map(|r| r.id).collect(),
    };

    println!("Checking {}", client.base_url());
    let mut all_ok = true;
    for id in realms {
        match client.fetch_snapshot(id).await {
            Ok(data) => {
                let state = if sentinel_ready(&data, sentinel) {
                    "ready"
                } else {
                    "not refreshed"
                };
                let value = data
                    .get(sentinel)
                    .map_or_else(|| "missing".to_string(), |v| v.to_string());
                println!(
                    "\x1b[32m✓\x1b[0m realm {}: {} resources, sentinel {} = {} ({})",
                    id,
                    data.len(),
                    sentinel,
                    value,
                    state
                );
            }
            Err(e) => {
                all_ok = false;
                println!("\x1b[31m✗\x1b[0m realm {}: {}", id, e);
            }
        }
    }
    Ok(all_ok)
}

/// Print the recent window of a realm's history file
pub async fn show_recent(
    config: &AppConfig,
    realm: u32,
    days: usize,
    category: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let target = config
        .realm(realm)
        .ok_or_else(|| anyhow!("realm {} is not configured", realm))?;

    let categories: Vec<&Category> = match category {
        Some(slug) => vec![catalog::category(slug).ok_or_else(|| {
            let known: Vec<&str> = CATEGORIES.iter().map(|c| c.slug).collect();
            anyhow!("unknown category {:?}, expected one of {}", slug, known.join(", "))
        })?],
        None => CATEGORIES.iter().collect(),
    };

    let store = HistoryStore::from_config(&config.store);
    let history = store
        .load(&target.file)
        .await
        .with_context(|| format!("reading {}", target.file.display()))?;

    let dates = recent::recent_dates(&history, days);
    let series = recent::recent_series(&history, realm, days, &categories);
    let rows: Vec<RecentRow> = series.iter().map(RecentRow::from).collect();

    let mode = OutputMode::from_json_flag(json);
    if mode == OutputMode::Table {
        match (dates.first(), dates.last()) {
            (Some(first), Some(last)) => {
                println!("Realm {} · {} days · {} → {}", realm, dates.len(), first, last)
            }
            _ => println!("Realm {} · no history in {}", realm, target.file.display()),
        }
    }
    println!("{}", output::render(&rows, &series, mode)?);
    Ok(())
}
