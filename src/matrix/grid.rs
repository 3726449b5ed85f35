//! Rectangular numeric grid with named columns

use crate::error::{LoanError, Result};
use serde::{Deserialize, Serialize};

/// Column-major grid of reals; each column keeps its source name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix {
    names: Vec<String>,
    columns: Vec<Vec<f64>>,
    rows: usize,
}

impl Matrix {
    /// Build from named columns, all of the same length
    pub fn from_columns(names: Vec<String>, columns: Vec<Vec<f64>>) -> Result<Self> {
        let rows = columns.first().map(Vec::len).unwrap_or(0);
        if names.len() != columns.len() {
            return Err(LoanError::DimensionMismatch {
                left_rows: rows,
                left_cols: columns.len(),
                right_rows: 0,
                right_cols: names.len(),
                reason: "one name is required per column".into(),
            });
        }
        if let Some(bad) = columns.iter().find(|c| c.len() != rows) {
            return Err(LoanError::DimensionMismatch {
                left_rows: rows,
                left_cols: columns.len(),
                right_rows: bad.len(),
                right_cols: 1,
                reason: "columns have different lengths".into(),
            });
        }
        Ok(Self { names, columns, rows })
    }

    /// Build from row-major data with generated names `C1..Cn`
    pub fn from_rows(data: &[Vec<f64>]) -> Result<Self> {
        let cols = data.first().map(Vec::len).unwrap_or(0);
        if let Some(bad) = data.iter().find(|r| r.len() != cols) {
            return Err(LoanError::DimensionMismatch {
                left_rows: data.len(),
                left_cols: cols,
                right_rows: 1,
                right_cols: bad.len(),
                reason: "rows have different lengths".into(),
            });
        }
        let columns = (0..cols)
            .map(|c| data.iter().map(|row| row[c]).collect())
            .collect();
        let names = (1..=cols).map(|c| format!("C{}", c)).collect();
        Ok(Self {
            names,
            columns,
            rows: data.len(),
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.columns.len()
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols())
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn column(&self, index: usize) -> &[f64] {
        &self.columns[index]
    }

    pub fn columns(&self) -> &[Vec<f64>] {
        &self.columns
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.columns.get(col).and_then(|c| c.get(row)).copied()
    }
}
