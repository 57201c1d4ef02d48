//! One recording pass over every configured realm.

use chrono::FixedOffset;
use futures::future::join_all;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::adapters::SimCompaniesClient;
use crate::collector::{MarketFetcher, SaturationGate};
use crate::config::{AppConfig, PersistPolicy, RealmTarget};
use crate::domain::{fixed_offset, DateKey, DateKeyStyle};
use crate::error::Result;
use crate::persistence::{HistoryStore, PersistSummary};

/// How one realm's pipeline ended
#[derive(Debug, Clone, PartialEq)]
pub enum RealmOutcome {
    /// Fresh data written to the history file
    Persisted(PersistSummary),
    /// Today's entry already existed and the policy is `skip-if-present`
    Skipped,
    /// The pipeline failed; the history file was not modified
    Failed(String),
}

impl fmt::Display for RealmOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RealmOutcome::Persisted(s) => write!(
                f,
                "persisted {} resources ({} days kept, {} pruned)",
                s.resources, s.days, s.pruned
            ),
            RealmOutcome::Skipped => write!(f, "skipped, already recorded today"),
            RealmOutcome::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RealmReport {
    pub realm: u32,
    pub file: PathBuf,
    pub outcome: RealmOutcome,
}

/// Result of a whole run, one entry per realm in configuration order
#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_id: Uuid,
    pub date: DateKey,
    pub realms: Vec<RealmReport>,
}

impl RunReport {
    pub fn failures(&self) -> impl Iterator<Item = &RealmReport> {
        self.realms
            .iter()
            .filter(|r| matches!(r.outcome, RealmOutcome::Failed(_)))
    }

    pub fn failure_count(&self) -> usize {
        self.failures().count()
    }

    pub fn is_success(&self) -> bool {
        self.failure_count() == 0
    }

    pub fn outcome(&self, realm: u32) -> Option<&RealmOutcome> {
        self.realms
            .iter()
            .find(|r| r.realm == realm)
            .map(|r| &r.outcome)
    }
}

pub struct RunController {
    gate: SaturationGate,
    store: HistoryStore,
    policy: PersistPolicy,
    offset: FixedOffset,
    date_style: DateKeyStyle,
}

impl RunController {
    pub fn new(
        gate: SaturationGate,
        store: HistoryStore,
        policy: PersistPolicy,
        offset: FixedOffset,
        date_style: DateKeyStyle,
    ) -> Self {
        Self {
            gate,
            store,
            policy,
            offset,
            date_style,
        }
    }

    /// Wire the live Sim Companies client, gate and store from configuration
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let client = SimCompaniesClient::from_config(&config.market)?;
        let fetcher = MarketFetcher::new(Arc::new(client), &config.market);
        let gate = SaturationGate::new(fetcher, &config.gate, config.market.max_retries);

        Ok(Self::new(
            gate,
            HistoryStore::from_config(&config.store),
            config.store.policy,
            fixed_offset(config.store.utc_offset_minutes)?,
            config.store.date_style,
        ))
    }

    /// Today's key in the configured offset
    pub fn today(&self) -> DateKey {
        DateKey::today(self.offset, self.date_style)
    }

    /// Record today's snapshot for every target
    pub async fn run_once(&self, targets: &[RealmTarget]) -> RunReport {
        self.run_for_date(targets, self.today()).await
    }

    /// Record a snapshot under `date` for every target.
    ///
    /// Realms writing different files run concurrently; realms sharing a file
    /// run one after the other. A failing realm never stops the others.
    pub async fn run_for_date(&self, targets: &[RealmTarget], date: DateKey) -> RunReport {
        let run_id = Uuid::new_v4();
        let span = info_span!("run", %run_id, %date);

        async {
            info!(realms = targets.len(), policy = ?self.policy, "run started");

            let mut groups: Vec<Vec<(usize, &RealmTarget)>> = Vec::new();
            for (idx, target) in targets.iter().enumerate() {
                match groups.iter_mut().find(|g| g[0].1.file == target.file) {
                    Some(group) => group.push((idx, target)),
                    None => groups.push(vec![(idx, target)]),
                }
            }

            let date = &date;
            let finished = join_all(groups.into_iter().map(|group| async move {
                let mut reports = Vec::with_capacity(group.len());
                for (idx, target) in group {
                    let report = self
                        .run_realm(target, date)
                        .instrument(info_span!("realm", realm = target.id))
                        .await;
                    reports.push((idx, report));
                }
                reports
            }))
            .await;

            let mut finished: Vec<(usize, RealmReport)> = finished.into_iter().flatten().collect();
            finished.sort_by_key(|(idx, _)| *idx);
            let realms = finished.into_iter().map(|(_, report)| report).collect();

            let report = RunReport {
                run_id,
                date: *date,
                realms,
            };
            if report.is_success() {
                info!(realms = report.realms.len(), "run finished");
            } else {
                warn!(
                    realms = report.realms.len(),
                    failed = report.failure_count(),
                    "run finished with failures"
                );
            }
            report
        }
        .instrument(span)
        .await
    }

    async fn run_realm(&self, target: &RealmTarget, date: &DateKey) -> RealmReport {
        info!(file = %target.file.display(), "processing realm");

        let outcome = match self.record(target, date).await {
            Ok(outcome) => {
                info!(%outcome, "realm done");
                outcome
            }
            Err(e) => {
                error!(error = %e, "realm failed");
                RealmOutcome::Failed(e.to_string())
            }
        };

        RealmReport {
            realm: target.id,
            file: target.file.clone(),
            outcome,
        }
    }

    async fn record(&self, target: &RealmTarget, date: &DateKey) -> Result<RealmOutcome> {
        if self.policy == PersistPolicy::SkipIfPresent
            && self.store.has_entry(&target.file, target.id, date).await?
        {
            return Ok(RealmOutcome::Skipped);
        }

        let data = self.gate.ensure_ready(target.id).await?;
        let summary = self
            .store
            .persist(&target.file, target.id, date, &data)
            .await?;
        Ok(RealmOutcome::Persisted(summary))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> PersistSummary {
        PersistSummary {
            resources: 3,
            pruned: 0,
            days: 1,
            backed_up: false,
        }
    }

    #[test]
    fn report_counts_failures() {
        let report = RunReport {
            run_id: Uuid::new_v4(),
            date: DateKey::parse("2025/01/01").unwrap(),
            realms: vec![
                RealmReport {
                    realm: 0,
                    file: PathBuf::from("a.json"),
                    outcome: RealmOutcome::Persisted(summary()),
                },
                RealmReport {
                    realm: 1,
                    file: PathBuf::from("b.json"),
                    outcome: RealmOutcome::Failed("timeout".to_string()),
                },
                RealmReport {
                    realm: 2,
                    file: PathBuf::from("c.json"),
                    outcome: RealmOutcome::Skipped,
                },
            ],
        };

        assert!(!report.is_success());
        assert_eq!(report.failure_count(), 1);
        assert_eq!(report.failures().next().unwrap().realm, 1);
        assert_eq!(report.outcome(2), Some(&RealmOutcome::Skipped));
        assert!(report.outcome(9).is_none());
    }

    #[test]
    fn outcome_display() {
        assert_eq!(
            RealmOutcome::Persisted(summary()).to_string(),
            "persisted 3 resources (1 days kept, 0 pruned)"
        );
        assert_eq!(
            RealmOutcome::Failed("boom".to_string()).to_string(),
            "failed: boom"
        );
    }
}
