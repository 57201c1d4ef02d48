//! Output formatting for `satrec` commands.
//!
//! Supports two modes: human-readable tables (default) and JSON (--json).

use serde::Serialize;
use tabled::{Table, Tabled};

/// Output mode for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Table,
    Json,
}

impl OutputMode {
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            OutputMode::Json
        } else {
            OutputMode::Table
        }
    }
}

/// Render table rows, or the full serializable records in JSON mode.
pub fn render<R: Tabled, J: Serialize + ?Sized>(
    rows: &[R],
    records: &J,
    mode: OutputMode,
) -> anyhow::Result<String> {
    Ok(match mode {
        OutputMode::Table if rows.is_empty() => "(no results)".to_string(),
        OutputMode::Table => Table::new(rows).to_string(),
        OutputMode::Json => serde_json::to_string_pretty(records)?,
    })
}

/// Format an optional saturation for a table cell
pub fn fmt_value(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.2}", v))
}

/// Format a signed change for a table cell
pub fn fmt_change(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:+.2}", v))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Tabled, Serialize)]
    struct Row {
        name: String,
    }

    #[test]
    fn empty_table_placeholder() {
        let rows: Vec<Row> = Vec::new();
        assert_eq!(render(&rows, &rows, OutputMode::Table).unwrap(), "(no results)");
        assert_eq!(render(&rows, &rows, OutputMode::Json).unwrap(), "[]");
    }

    #[test]
    fn table_contains_cells() {
        let rows = vec![Row {
            name: "Apples".to_string(),
        }];
        let out = render(&rows, &rows, OutputMode::from_json_flag(false)).unwrap();
        assert!(out.contains("name"));
        assert!(out.contains("Apples"));
    }

    #[test]
    fn number_cells() {
        assert_eq!(fmt_value(Some(1.234)), "1.23");
        assert_eq!(fmt_value(None), "-");
        assert_eq!(fmt_change(Some(0.5)), "+0.50");
        assert_eq!(fmt_change(Some(-2.0)), "-2.00");
    }
}
