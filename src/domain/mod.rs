pub mod catalog;
pub mod date_key;
pub mod history;
pub mod saturation;

pub use catalog::{Category, CATEGORIES};
pub use date_key::{fixed_offset, DateKey, DateKeyStyle};
pub use history::{DayEntry, HistoryFile, HistoryLayout};
pub use saturation::{retain_positive, saturation_map, sentinel_ready, RetailInfoRecord, SaturationMap};
