//! History file persistence
//!
//! Each persist reads the whole file, replaces one day, prunes days that fell
//! out of the retention window and rewrites the file. The previous version is
//! copied to `<file>.bak` first and the new one is moved into place with a
//! rename, so readers only ever see a complete document.
//!
//! A file has a single writer. Two runs persisting to the same path at the
//! same time can lose one of the updates.

use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::StoreConfig;
use crate::domain::{DateKey, DateKeyStyle, HistoryFile, HistoryLayout, SaturationMap};
use crate::error::{Result, SatrecError};

/// What a persist call did to the file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersistSummary {
    /// Resources written for the day
    pub resources: usize,
    /// Days removed by retention
    pub pruned: usize,
    /// Days left in the file
    pub days: usize,
    /// Whether the previous file was copied to the backup path
    pub backed_up: bool,
}

#[derive(Debug, Clone)]
pub struct HistoryStore {
    layout: HistoryLayout,
    date_style: DateKeyStyle,
    retention_days: u32,
    backup: bool,
}

impl HistoryStore {
    pub fn new(layout: HistoryLayout, retention_days: u32) -> Self {
        Self {
            layout,
            date_style: DateKeyStyle::default(),
            retention_days,
            backup: true,
        }
    }

    pub fn from_config(config: &StoreConfig) -> Self {
        Self::new(config.layout, config.retention_days)
            .with_date_style(config.date_style)
            .with_backup(config.backup)
    }

    /// Date key style every key of a loaded file must use
    pub fn with_date_style(mut self, style: DateKeyStyle) -> Self {
        self.date_style = style;
        self
    }

    /// Enable or disable the `.bak` copy
    pub fn with_backup(mut self, backup: bool) -> Self {
        self.backup = backup;
        self
    }

    /// Read a history file; a missing file is an empty history.
    ///
    /// A file that exists but cannot be parsed, or whose keys or entries do not
    /// match the configured style and layout, is `CorruptHistory`.
    pub async fn load(&self, path: &Path) -> Result<HistoryFile> {
        let bytes = match tokio::fs::read(path).await {
            Ok(v) => v,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(HistoryFile::new()),
            Err(e) => return Err(SatrecError::Io(e)),
        };

        HistoryFile::from_slice(&bytes, self.layout, self.date_style).map_err(|reason| {
            SatrecError::CorruptHistory {
                path: path.to_path_buf(),
                reason,
            }
        })
    }

    /// Whether the file already holds `realm`'s data for `date`
    pub async fn has_entry(&self, path: &Path, realm: u32, date: &DateKey) -> Result<bool> {
        let history = self.load(path).await?;
        Ok(history.contains(&date.to_string(), realm, self.layout))
    }

    /// Record `data` as `realm`'s entry for `date` and prune expired days
    pub async fn persist(
        &self,
        path: &Path,
        realm: u32,
        date: &DateKey,
        data: &SaturationMap,
    ) -> Result<PersistSummary> {
        let mut history = self.load(path).await?;
        debug!(path = %path.display(), days = history.len(), "loaded history");

        history.insert(&date.to_string(), realm, data.clone(), self.layout);
        let cutoff = date.retention_cutoff(self.retention_days);
        let pruned = Self::prune(&mut history, &cutoff);

        ensure_parent_dir(path).await?;
        let backed_up = self.backup && backup_file(path).await;
        write_atomic(path, &history.to_vec()?).await?;

        let summary = PersistSummary {
            resources: data.len(),
            pruned,
            days: history.len(),
            backed_up,
        };
        info!(
            path = %path.display(),
            realm,
            date = %date,
            resources = summary.resources,
            pruned = summary.pruned,
            days = summary.days,
            "history saved"
        );
        Ok(summary)
    }

    /// Remove every day strictly earlier than `cutoff`
    pub fn prune(history: &mut HistoryFile, cutoff: &DateKey) -> usize {
        let removed = history.prune_before(cutoff);
        if removed > 0 {
            info!(cutoff = %cutoff, removed, "pruned expired history");
        }
        removed
    }
}

/// `<path>.bak`
pub fn backup_path(path: &Path) -> PathBuf {
    with_suffix(path, ".bak")
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

async fn ensure_parent_dir(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            tokio::fs::create_dir_all(parent).await?;
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Copy the current file to its backup path; never fails the caller
async fn backup_file(path: &Path) -> bool {
    let target = backup_path(path);
    match tokio::fs::copy(path, &target).await {
        Ok(_) => {
            debug!(backup = %target.display(), "backed up history");
            true
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "no previous history to back up");
            false
        }
        Err(e) => {
            warn!(backup = %target.display(), error = %e, "history backup failed");
            false
        }
    }
}

async fn write_atomic(path: &Path, body: &[u8]) -> Result<()> {
    let tmp = with_suffix(path, ".tmp");
    tokio::fs::write(&tmp, body).await?;
    if let Err(e) = tokio::fs::rename(&tmp, path).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(SatrecError::Io(e));
    }
    Ok(())
}
