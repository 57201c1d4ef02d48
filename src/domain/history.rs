//! In-memory form of a history file: date key → day entry.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::date_key::{DateKey, DateKeyStyle};
use super::saturation::SaturationMap;

/// Shape of each day entry in a history file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HistoryLayout {
    /// `{ "2025/01/01": { "3": 42.0 } }`, one file per realm
    #[default]
    Flat,
    /// `{ "2025/01/01": { "0": { "3": 42.0 } } }`, realms nested under the date
    Nested,
}

/// One day of history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DayEntry {
    Flat(SaturationMap),
    Nested(BTreeMap<String, SaturationMap>),
}

impl DayEntry {
    fn fits(&self, layout: HistoryLayout) -> bool {
        match (self, layout) {
            // `{}` deserializes as flat but is a valid empty day in either layout.
            (DayEntry::Flat(map), _) if map.is_empty() => true,
            (DayEntry::Flat(_), HistoryLayout::Flat) => true,
            (DayEntry::Nested(_), HistoryLayout::Nested) => true,
            _ => false,
        }
    }

    /// Saturation map of `realm` within this day
    pub fn realm(&self, realm: u32) -> Option<&SaturationMap> {
        match self {
            DayEntry::Flat(map) => Some(map),
            DayEntry::Nested(realms) => realms.get(&realm.to_string()),
        }
    }
}

/// Date key → day entry, ordered by key
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoryFile {
    days: BTreeMap<String, DayEntry>,
}

impl HistoryFile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a history document.
    ///
    /// Every key must be a date in `style` and every entry must match `layout`.
    pub fn from_slice(
        bytes: &[u8],
        layout: HistoryLayout,
        style: DateKeyStyle,
    ) -> Result<Self, String> {
        let history: HistoryFile = serde_json::from_slice(bytes).map_err(|e| e.to_string())?;
        for (key, day) in &history.days {
            match DateKey::parse(key) {
                Some(date) if date.style() == style => {}
                Some(_) => return Err(format!("date key {} is not in {:?} style", key, style)),
                None => return Err(format!("{} is not a date key", key)),
            }
            if !day.fits(layout) {
                return Err(format!("entry {} does not match the {:?} layout", key, layout));
            }
        }
        Ok(history)
    }

    /// Compact JSON, the format the dashboard downloads
    pub fn to_vec(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    /// Store `data` for `realm` on `date_key`.
    ///
    /// Flat: the whole day is replaced. Nested: only the realm's sub-entry is
    /// replaced; other realms recorded on the same day are kept.
    pub fn insert(
        &mut self,
        date_key: &str,
        realm: u32,
        data: SaturationMap,
        layout: HistoryLayout,
    ) {
        match layout {
            HistoryLayout::Flat => {
                self.days.insert(date_key.to_string(), DayEntry::Flat(data));
            }
            HistoryLayout::Nested => {
                let day = self
                    .days
                    .entry(date_key.to_string())
                    .or_insert_with(|| DayEntry::Nested(BTreeMap::new()));
                if let DayEntry::Flat(_) = day {
                    *day = DayEntry::Nested(BTreeMap::new());
                }
                if let DayEntry::Nested(realms) = day {
                    realms.insert(realm.to_string(), data);
                }
            }
        }
    }

    /// Whether `date_key` already holds data for `realm`
    pub fn contains(&self, date_key: &str, realm: u32, layout: HistoryLayout) -> bool {
        match (self.days.get(date_key), layout) {
            (None, _) => false,
            (Some(_), HistoryLayout::Flat) => true,
            (Some(day), HistoryLayout::Nested) => {
                matches!(day, DayEntry::Nested(realms) if realms.contains_key(&realm.to_string()))
            }
        }
    }

    /// Drop every day strictly earlier than `cutoff`, whatever the key style;
    /// returns how many went
    pub fn prune_before(&mut self, cutoff: &DateKey) -> usize {
        let before = self.days.len();
        self.days.retain(|key, _| {
            DateKey::parse(key).map_or(true, |day| day.date() >= cutoff.date())
        });
        before - self.days.len()
    }

    pub fn get(&self, date_key: &str) -> Option<&DayEntry> {
        self.days.get(date_key)
    }

    /// Date keys in ascending order
    pub fn dates(&self) -> impl DoubleEndedIterator<Item = &str> + '_ {
        self.days.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, f64)]) -> SaturationMap {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn flat_insert_replaces_whole_day() {
        let mut history = HistoryFile::new();
        history.insert("2025/01/01", 0, map(&[("3", 1.0), ("4", 2.0)]), HistoryLayout::Flat);
        history.insert("2025/01/01", 0, map(&[("3", 5.0)]), HistoryLayout::Flat);
        assert_eq!(
            history.get("2025/01/01"),
            Some(&DayEntry::Flat(map(&[("3", 5.0)])))
        );
    }

    #[test]
    fn nested_insert_keeps_other_realms() {
        let mut history = HistoryFile::new();
        history.insert("2025/01/01", 0, map(&[("3", 1.0)]), HistoryLayout::Nested);
        history.insert("2025/01/01", 1, map(&[("3", 2.0)]), HistoryLayout::Nested);
        history.insert("2025/01/01", 0, map(&[("3", 9.0)]), HistoryLayout::Nested);

        let day = history.get("2025/01/01").unwrap();
        assert_eq!(day.realm(0), Some(&map(&[("3", 9.0)])));
        assert_eq!(day.realm(1), Some(&map(&[("3", 2.0)])));
        assert!(history.contains("2025/01/01", 1, HistoryLayout::Nested));
        assert!(!history.contains("2025/01/01", 2, HistoryLayout::Nested));
    }

    #[test]
    fn prune_keeps_cutoff_day() {
        let mut history = HistoryFile::new();
        for key in ["2023/12/31", "2024/01/01", "2024/01/02", "2024/06/01"] {
            history.insert(key, 0, map(&[("3", 1.0)]), HistoryLayout::Flat);
        }
        let cutoff = DateKey::parse("2024/01/02").unwrap();
        assert_eq!(history.prune_before(&cutoff), 2);
        assert_eq!(history.dates().collect::<Vec<_>>(), vec!["2024/01/02", "2024/06/01"]);
    }

    #[test]
    fn prune_compares_dates_across_styles() {
        let mut history = HistoryFile::new();
        for key in ["2023/06/01", "2024/01/01", "2025-05-01"] {
            history.insert(key, 0, map(&[("3", 1.0)]), HistoryLayout::Flat);
        }
        // "2023/06/01" sorts after "2024-06-01" as a string.
        let cutoff = DateKey::parse("2024-06-01").unwrap();
        assert_eq!(history.prune_before(&cutoff), 2);
        assert_eq!(history.dates().collect::<Vec<_>>(), vec!["2025-05-01"]);
    }

    #[test]
    fn keys_must_match_date_style() {
        let slash = br#"{"2024/01/01": {"3": 1.0}}"#;
        assert!(HistoryFile::from_slice(slash, HistoryLayout::Flat, DateKeyStyle::Slash).is_ok());
        let err = HistoryFile::from_slice(slash, HistoryLayout::Flat, DateKeyStyle::Dash)
            .unwrap_err();
        assert!(err.contains("Dash"));

        let junk = br#"{"yesterday": {"3": 1.0}}"#;
        assert!(HistoryFile::from_slice(junk, HistoryLayout::Flat, DateKeyStyle::Slash).is_err());
    }

    const SLASH: DateKeyStyle = DateKeyStyle::Slash;

    #[test]
    fn layout_mismatch_is_rejected() {
        let nested = br#"{"2025/01/01": {"0": {"3": 1.0}}}"#;
        assert!(HistoryFile::from_slice(nested, HistoryLayout::Nested, SLASH).is_ok());
        assert!(HistoryFile::from_slice(nested, HistoryLayout::Flat, SLASH).is_err());

        let flat = br#"{"2025/01/01": {"3": 1.0}, "2025/01/02": {}}"#;
        assert!(HistoryFile::from_slice(flat, HistoryLayout::Flat, SLASH).is_ok());
        assert!(HistoryFile::from_slice(flat, HistoryLayout::Nested, SLASH).is_err());
    }

    #[test]
    fn serializes_compactly() {
        let mut history = HistoryFile::new();
        history.insert("2025/01/01", 0, map(&[("3", 42.0)]), HistoryLayout::Flat);
        let text = String::from_utf8(history.to_vec().unwrap()).unwrap();
        assert_eq!(text, r#"{"2025/01/01":{"3":42.0}}"#);

        let back = HistoryFile::from_slice(text.as_bytes(), HistoryLayout::Flat, SLASH).unwrap();
        assert_eq!(back, history);
    }

    #[test]
    fn rejects_non_object_document() {
        assert!(HistoryFile::from_slice(b"[1, 2]", HistoryLayout::Flat, SLASH).is_err());
        let scalar = br#"{"2025/01/01": 3}"#;
        assert!(HistoryFile::from_slice(scalar, HistoryLayout::Flat, SLASH).is_err());
    }
}
