use crate::error::{ForecastError, Result};
use serde::Serialize;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush().map_err(|source| ForecastError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s).map_err(|source| ForecastError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Render up to `max_rows` rows as a markdown table.
pub fn render_table<T>(rows: &[T], max_rows: usize) -> String
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().cloned().take(max_rows).collect();
    if slice.is_empty() {
        return "(no rows)".to_string();
    }
    Table::new(slice).with(Style::markdown()).to_string()
}

pub fn preview_table<T>(title: &str, rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    println!("{}\n", title);
    println!("{}\n", render_table(rows, max_rows));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TermRow;

    #[test]
    fn empty_tables_say_so() {
        let rows: Vec<TermRow> = Vec::new();
        assert_eq!(render_table(&rows, 5), "(no rows)");
    }

    #[test]
    fn tables_are_truncated_and_use_renamed_headers() {
        let rows = vec![
            TermRow {
                rank: 1,
                term: "staff".to_string(),
                mentions: 4,
            },
            TermRow {
                rank: 2,
                term: "location".to_string(),
                mentions: 3,
            },
        ];
        let table = render_table(&rows, 1);
        assert!(table.contains("Mentions"));
        assert!(table.contains("staff"));
        assert!(!table.contains("location"));
    }
}
