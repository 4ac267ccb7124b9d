//! CSV writers for result rows and analysis tables.

use anyhow::{Context, Result};
use bunkeropt_core::table::Table;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

fn create_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    Ok(())
}

/// Write serialisable rows with a header taken from their field names.
///
/// An empty slice produces an empty file.
pub fn write_rows<T: Serialize>(path: &Path, rows: &[T]) -> Result<PathBuf> {
    create_parent(path)?;
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    for row in rows {
        writer
            .serialize(row)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }
    writer.flush()?;
    Ok(path.to_path_buf())
}

/// Write a table whose columns are only known at run time.
pub fn write_table(path: &Path, table: &Table) -> Result<PathBuf> {
    create_parent(path)?;
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    writer.write_record(table.columns())?;
    for record in table.records() {
        writer
            .write_record(&record)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }
    writer.flush()?;
    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bunkeropt_core::table::Cell;

    #[derive(Serialize)]
    struct Row {
        #[serde(rename = "Year")]
        year: i32,
        #[serde(rename = "Supply_m3")]
        supply: f64,
    }

    #[test]
    fn rows_use_serde_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/rows.csv");
        write_rows(&path, &[Row { year: 2030, supply: 1.5 }]).unwrap();
        let text = fs::read_to_string(path).unwrap();
        assert_eq!(text, "Year,Supply_m3\n2030,1.5\n");
    }

    #[test]
    fn tables_keep_column_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.csv");
        let mut table = Table::new(["Parameter", "Swing_USDm"]);
        table
            .push_row(vec![Cell::from("economy.fuel_price"), Cell::from(f64::INFINITY)])
            .unwrap();
        write_table(&path, &table).unwrap();
        let text = fs::read_to_string(path).unwrap();
        assert_eq!(text, "Parameter,Swing_USDm\neconomy.fuel_price,inf\n");
    }
}
