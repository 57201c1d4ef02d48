//! `satrec recent`: the last few recorded days of a realm, per category.

use serde::Serialize;
use tabled::Tabled;

use super::output::{fmt_change, fmt_value};
use crate::domain::{catalog, Category, HistoryFile};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub date: String,
    pub saturation: Option<f64>,
}

/// One resource's values over the window, oldest first
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceSeries {
    pub category: &'static str,
    pub resource: u32,
    pub name: String,
    pub points: Vec<SeriesPoint>,
}

impl ResourceSeries {
    pub fn first(&self) -> Option<f64> {
        self.points.iter().find_map(|p| p.saturation)
    }

    pub fn latest(&self) -> Option<f64> {
        self.points.iter().rev().find_map(|p| p.saturation)
    }

    pub fn change(&self) -> Option<f64> {
        Some(self.latest()? - self.first()?)
    }
}

#[derive(Debug, Tabled)]
pub struct RecentRow {
    pub category: String,
    pub id: u32,
    pub resource: String,
    pub first: String,
    pub latest: String,
    pub change: String,
}

impl From<&ResourceSeries> for RecentRow {
    fn from(series: &ResourceSeries) -> Self {
        Self {
            category: series.category.to_string(),
            id: series.resource,
            resource: series.name.clone(),
            first: fmt_value(series.first()),
            latest: fmt_value(series.latest()),
            change: fmt_change(series.change()),
        }
    }
}

/// The `days` most recent date keys, oldest first
pub fn recent_dates(history: &HistoryFile, days: usize) -> Vec<&str> {
    let mut dates: Vec<&str> = history.dates().rev().take(days).collect();
    dates.reverse();
    dates
}

/// Series for every resource of `categories` over the most recent `days`
pub fn recent_series(
    history: &HistoryFile,
    realm: u32,
    days: usize,
    categories: &[&Category],
) -> Vec<ResourceSeries> {
    let dates = recent_dates(history, days);

    categories
        .iter()
        .flat_map(|category| {
            category.resources.iter().map(|&resource| {
                let key = resource.to_string();
                let points = dates
                    .iter()
                    .map(|date| SeriesPoint {
                        date: date.to_string(),
                        saturation: history
                            .get(date)
                            .and_then(|day| day.realm(realm))
                            .and_then(|map| map.get(&key).copied()),
                    })
                    .collect();

                ResourceSeries {
                    category: category.slug,
                    resource,
                    name: catalog::resource_name(resource)
                        .map(str::to_string)
                        .unwrap_or_else(|| format!("#{}", resource)),
                    points,
                }
            })
        })
        .collect()
}
