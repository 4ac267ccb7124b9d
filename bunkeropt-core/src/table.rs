//! Column-ordered tables for outputs whose columns depend on the data.
//!
//! Fixed-schema outputs use `Serialize` row structs instead.

use crate::errors::{BunkerError, BunkerResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One table cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Integer(i64),
    Number(f64),
    Text(String),
    Empty,
}

impl Cell {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Integer(value) => Some(*value as f64),
            Cell::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Cell::Text(value) => Some(value),
            _ => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Integer(value) => write!(f, "{value}"),
            Cell::Number(value) if value.is_infinite() => {
                f.write_str(if *value > 0.0 { "inf" } else { "-inf" })
            }
            Cell::Number(value) => write!(f, "{value}"),
            Cell::Text(value) => f.write_str(value),
            Cell::Empty => Ok(()),
        }
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl From<u32> for Cell {
    fn from(value: u32) -> Self {
        Cell::Integer(i64::from(value))
    }
}

impl From<usize> for Cell {
    fn from(value: usize) -> Self {
        Cell::Integer(value as i64)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Cell::Empty)
    }
}

/// Named columns and rows of cells.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row; its length must match the column count.
    pub fn push_row(&mut self, row: Vec<Cell>) -> BunkerResult<()> {
        if row.len() != self.columns.len() {
            return Err(BunkerError::Error(format!(
                "Row has {} cells but the table has {} columns",
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&Cell> {
        let index = self.column_index(column)?;
        self.rows.get(row)?.get(index)
    }

    /// Numeric values of a column, skipping non-numeric cells.
    pub fn numbers(&self, column: &str) -> Vec<f64> {
        match self.column_index(column) {
            Some(index) => self.rows.iter().filter_map(|r| r[index].as_f64()).collect(),
            None => Vec::new(),
        }
    }

    /// Rows as strings, ready for a CSV writer.
    pub fn records(&self) -> impl Iterator<Item = Vec<String>> + '_ {
        self.rows
            .iter()
            .map(|row| row.iter().map(ToString::to_string).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_must_match_columns() {
        let mut table = Table::new(["Parameter", "Swing_USDm"]);
        table
            .push_row(vec!["economy.fuel_price".into(), 12.5.into()])
            .unwrap();
        assert!(table.push_row(vec![Cell::Empty]).is_err());
        assert_eq!(table.len(), 1);
        assert_eq!(table.numbers("Swing_USDm"), vec![12.5]);
        assert_eq!(
            table.cell(0, "Parameter").and_then(Cell::as_str),
            Some("economy.fuel_price")
        );
    }

    #[test]
    fn records_render_cells() {
        let mut table = Table::new(["a", "b", "c", "d"]);
        table
            .push_row(vec![Cell::from(3u32), f64::INFINITY.into(), Cell::Empty, None::<f64>.into()])
            .unwrap();
        let records: Vec<Vec<String>> = table.records().collect();
        assert_eq!(records[0], vec!["3", "inf", "", ""]);
    }
}
