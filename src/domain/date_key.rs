//! Calendar date keys used to index the history file.
//!
//! Keys are zero-padded (`2025/01/31`), so within one style string order
//! equals date order. Retention compares parsed dates, not strings.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Utc};
use serde::Deserialize;
use std::fmt;

use crate::error::{Result, SatrecError};

/// Separator style of a date key
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DateKeyStyle {
    /// `YYYY/MM/DD`
    #[default]
    Slash,
    /// `YYYY-MM-DD`
    Dash,
}

impl DateKeyStyle {
    fn pattern(self) -> &'static str {
        match self {
            DateKeyStyle::Slash => "%Y/%m/%d",
            DateKeyStyle::Dash => "%Y-%m-%d",
        }
    }
}

/// One calendar day, rendered in a fixed style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateKey {
    date: NaiveDate,
    style: DateKeyStyle,
}

impl DateKey {
    pub fn new(date: NaiveDate, style: DateKeyStyle) -> Self {
        Self { date, style }
    }

    /// The calendar day `now` falls on at the given offset
    pub fn at(now: DateTime<Utc>, offset: FixedOffset, style: DateKeyStyle) -> Self {
        Self::new(now.with_timezone(&offset).date_naive(), style)
    }

    /// Today at the given offset, independent of the host time zone
    pub fn today(offset: FixedOffset, style: DateKeyStyle) -> Self {
        Self::at(Utc::now(), offset, style)
    }

    /// Parse a key written in either style
    pub fn parse(key: &str) -> Option<Self> {
        [DateKeyStyle::Slash, DateKeyStyle::Dash]
            .into_iter()
            .find_map(|style| {
                NaiveDate::parse_from_str(key, style.pattern())
                    .ok()
                    .map(|date| Self::new(date, style))
            })
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn style(&self) -> DateKeyStyle {
        self.style
    }

    /// Same style, `days` calendar days earlier
    pub fn days_before(&self, days: u32) -> Self {
        Self::new(self.date - Duration::days(i64::from(days)), self.style)
    }

    /// Oldest key kept by a retention window of `days`; anything strictly
    /// earlier is pruned.
    pub fn retention_cutoff(&self, days: u32) -> Self {
        self.days_before(days)
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.date.format(self.style.pattern()))
    }
}

/// Build the fixed offset used to decide the current day
pub fn fixed_offset(minutes: i32) -> Result<FixedOffset> {
    FixedOffset::east_opt(minutes * 60).ok_or_else(|| {
        SatrecError::InvalidConfig(format!("invalid UTC offset: {} minutes", minutes))
    })
}
