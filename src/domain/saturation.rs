use serde::Deserialize;
use std::collections::BTreeMap;

/// Resource id → saturation for one realm at one point in time.
///
/// An empty map means "no data", never "zero saturation everywhere".
pub type SaturationMap = BTreeMap<String, f64>;

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawResourceId {
    Int(i64),
    Text(String),
}

impl RawResourceId {
    fn into_key(self) -> String {
        match self {
            RawResourceId::Int(id) => id.to_string(),
            RawResourceId::Text(id) => id.trim().to_string(),
        }
    }
}

/// One element of the `resources-retail-info` array.
///
/// The upstream identifies resources by `dbLetter`; `id` is accepted as well.
/// Every other field of the record is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct RetailInfoRecord {
    #[serde(rename = "dbLetter", default)]
    db_letter: Option<RawResourceId>,
    #[serde(default)]
    id: Option<RawResourceId>,
    #[serde(default)]
    saturation: Option<f64>,
}

impl RetailInfoRecord {
    /// Resource key and saturation, when the record carries both
    pub fn entry(self) -> Option<(String, f64)> {
        let key = self.db_letter.or(self.id)?.into_key();
        let saturation = self.saturation?;
        if key.is_empty() || !saturation.is_finite() {
            return None;
        }
        Some((key, saturation))
    }
}

/// Index records by resource id; a later record for the same id wins.
pub fn saturation_map<I>(records: I) -> SaturationMap
where
    I: IntoIterator<Item = RetailInfoRecord>,
{
    records.into_iter().filter_map(RetailInfoRecord::entry).collect()
}

/// Remove entries whose saturation is zero or negative
pub fn retain_positive(map: &mut SaturationMap) {
    map.retain(|_, saturation| *saturation > 0.0);
}

/// True once `sentinel` is present with a strictly positive value
pub fn sentinel_ready(map: &SaturationMap, sentinel: &str) -> bool {
    map.get(sentinel).is_some_and(|v| *v > 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> SaturationMap {
        let records: Vec<RetailInfoRecord> = serde_json::from_str(body).unwrap();
        saturation_map(records)
    }

    #[test]
    fn indexes_by_db_letter() {
        let map = parse(
            r#"[
                {"dbLetter": 3, "quality": 0, "saturation": 1.25, "averagePrice": 0.4},
                {"dbLetter": 5, "saturation": 0}
            ]"#,
        );
        assert_eq!(map.len(), 2);
        assert_eq!(map["3"], 1.25);
        assert_eq!(map["5"], 0.0);
    }

    #[test]
    fn accepts_id_field_and_string_ids() {
        let map = parse(r#"[{"id": "7", "saturation": 2}, {"id": 8, "saturation": 0.5}]"#);
        assert_eq!(map["7"], 2.0);
        assert_eq!(map["8"], 0.5);
    }

    #[test]
    fn skips_records_without_id_or_value() {
        let map = parse(r#"[{"saturation": 1}, {"dbLetter": 4}, {"dbLetter": 9, "saturation": 3}]"#);
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["9"]);
    }

    #[test]
    fn later_duplicate_wins() {
        let map = parse(r#"[{"dbLetter": 3, "saturation": 1}, {"dbLetter": 3, "saturation": 2}]"#);
        assert_eq!(map["3"], 2.0);
    }

    #[test]
    fn positive_filter() {
        let mut map = parse(r#"[{"dbLetter": 3, "saturation": 42}, {"dbLetter": 5, "saturation": 0}]"#);
        retain_positive(&mut map);
        assert_eq!(map, SaturationMap::from([("3".to_string(), 42.0)]));
    }

    #[test]
    fn sentinel_must_be_positive() {
        let mut map = SaturationMap::new();
        assert!(!sentinel_ready(&map, "3"));
        map.insert("3".to_string(), 0.0);
        assert!(!sentinel_ready(&map, "3"));
        map.insert("3".to_string(), 0.01);
        assert!(sentinel_ready(&map, "3"));
    }
}
