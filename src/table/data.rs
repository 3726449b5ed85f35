//! In-memory tables with named numeric and text columns

use crate::error::{LoanError, Result};
use crate::matrix::Matrix;
use csv::{Reader, Writer};
use std::io::{Read, Write};
use std::path::Path;

/// Storage for one column
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    /// Reals; missing cells are NaN
    Numeric(Vec<f64>),
    /// Anything that did not parse as a number, kept verbatim
    Text(Vec<String>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Numeric(v) => v.len(),
            ColumnData::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnData::Numeric(_))
    }

    fn take(&self, rows: &[usize]) -> ColumnData {
        match self {
            ColumnData::Numeric(v) => ColumnData::Numeric(rows.iter().map(|&r| v[r]).collect()),
            ColumnData::Text(v) => ColumnData::Text(rows.iter().map(|&r| v[r].clone()).collect()),
        }
    }

    fn cell_text(&self, row: usize) -> String {
        match self {
            ColumnData::Numeric(v) if v[row].is_nan() => String::new(),
            ColumnData::Numeric(v) => v[row].to_string(),
            ColumnData::Text(v) => v[row].clone(),
        }
    }
}

/// Ordered named columns of equal length
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    names: Vec<String>,
    columns: Vec<ColumnData>,
    rows: usize,
}

/// Cell markers read as a missing number
fn is_missing_marker(cell: &str) -> bool {
    let cell = cell.trim();
    cell.is_empty() || cell == "?" || cell.eq_ignore_ascii_case("nan") || cell.eq_ignore_ascii_case("na")
}

fn parse_cell(cell: &str) -> Option<f64> {
    if is_missing_marker(cell) {
        Some(f64::NAN)
    } else {
        cell.trim().parse::<f64>().ok()
    }
}

impl Table {
    /// Load a table from a CSV file with a header row
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = Reader::from_path(path)?;
        Self::from_csv(reader)
    }

    /// Load a table from any reader (e.g., string buffer, stdin)
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Self::from_csv(Reader::from_reader(reader))
    }

    fn from_csv<R: Read>(mut reader: Reader<R>) -> Result<Self> {
        let names: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let mut raw: Vec<Vec<String>> = vec![Vec::new(); names.len()];

        for result in reader.records() {
            let record = result?;
            for (col, cells) in raw.iter_mut().enumerate() {
                cells.push(record.get(col).unwrap_or("").to_string());
            }
        }

        let rows = raw.first().map(Vec::len).unwrap_or(0);
        // A column is numeric only if every cell is a number or a missing marker
        let columns = raw
            .into_iter()
            .map(|cells| {
                let parsed: Option<Vec<f64>> = cells.iter().map(|c| parse_cell(c)).collect();
                match parsed {
                    Some(values) => ColumnData::Numeric(values),
                    None => ColumnData::Text(cells),
                }
            })
            .collect();

        Ok(Self { names, columns, rows })
    }

    pub fn write_path<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = std::fs::File::create(path)?;
        self.write_to(file)
    }

    /// Write as CSV with a header row; missing numbers become empty cells
    pub fn write_to<W: Write>(&self, writer: W) -> Result<()> {
        let mut writer = Writer::from_writer(writer);
        writer.write_record(&self.names)?;
        for row in 0..self.rows {
            writer.write_record(self.columns.iter().map(|c| c.cell_text(row)))?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn columns(&self) -> &[ColumnData] {
        &self.columns
    }

    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.names
            .iter()
            .position(|n| n == name)
            .ok_or_else(|| LoanError::ColumnNotFound(name.to_string()))
    }

    pub fn column(&self, name: &str) -> Result<&ColumnData> {
        Ok(&self.columns[self.column_index(name)?])
    }

    /// Values of a column that must be numeric
    pub fn numeric(&self, name: &str) -> Result<&[f64]> {
        match self.column(name)? {
            ColumnData::Numeric(values) => Ok(values),
            ColumnData::Text(cells) => {
                let bad = cells
                    .iter()
                    .find(|c| parse_cell(c).is_none())
                    .cloned()
                    .unwrap_or_default();
                Err(LoanError::non_numeric(name, bad))
            }
        }
    }

    /// Add a column, or replace an existing one of the same name in place
    pub fn push_column(&mut self, name: &str, data: ColumnData) -> Result<()> {
        if !self.names.is_empty() && data.len() != self.rows {
            return Err(LoanError::DimensionMismatch {
                left_rows: self.rows,
                left_cols: self.names.len(),
                right_rows: data.len(),
                right_cols: 1,
                reason: format!("column {} has the wrong number of rows", name),
            });
        }
        if self.names.is_empty() {
            self.rows = data.len();
        }
        match self.names.iter().position(|n| n == name) {
            Some(index) => self.columns[index] = data,
            None => {
                self.names.push(name.to_string());
                self.columns.push(data);
            }
        }
        Ok(())
    }

    pub fn push_numeric(&mut self, name: &str, values: Vec<f64>) -> Result<()> {
        self.push_column(name, ColumnData::Numeric(values))
    }

    /// New table with the given source rows, in the order given; indices may repeat
    pub fn take_rows(&self, rows: &[usize]) -> Table {
        Table {
            names: self.names.clone(),
            columns: self.columns.iter().map(|c| c.take(rows)).collect(),
            rows: rows.len(),
        }
    }

    /// Indices of the numeric columns, in table order
    pub fn numeric_indices(&self) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_numeric())
            .map(|(i, _)| i)
            .collect()
    }

    /// All numeric columns as a matrix, by position
    pub fn numeric_matrix(&self) -> Result<Matrix> {
        let indices = self.numeric_indices();
        let names = indices.iter().map(|&i| self.names[i].clone()).collect();
        let columns = indices
            .iter()
            .map(|&i| match &self.columns[i] {
                ColumnData::Numeric(values) => values.clone(),
                ColumnData::Text(_) => Vec::new(),
            })
            .collect();
        let matrix = Matrix::from_columns(names, columns)?;
        if matrix.cols() > 0 && matrix.rows() != self.rows {
            return Err(LoanError::DimensionMismatch {
                left_rows: self.rows,
                left_cols: self.names.len(),
                right_rows: matrix.rows(),
                right_cols: matrix.cols(),
                reason: "numeric columns do not span the table".into(),
            });
        }
        Ok(matrix)
    }

    /// Copy of this table with its numeric columns replaced, by position,
    /// by the columns of `matrix`; text columns are untouched
    pub fn with_numeric_matrix(&self, matrix: &Matrix) -> Result<Table> {
        let indices = self.numeric_indices();
        if indices.len() != matrix.cols() || (matrix.cols() > 0 && matrix.rows() != self.rows) {
            return Err(LoanError::DimensionMismatch {
                left_rows: self.rows,
                left_cols: indices.len(),
                right_rows: matrix.rows(),
                right_cols: matrix.cols(),
                reason: "result does not match the table's numeric columns".into(),
            });
        }
        let mut table = self.clone();
        for (position, &index) in indices.iter().enumerate() {
            table.columns[index] = ColumnData::Numeric(matrix.column(position).to_vec());
        }
        Ok(table)
    }
}
