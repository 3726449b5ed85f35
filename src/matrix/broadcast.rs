//! Element-wise arithmetic between a matrix and a matrix, vector, or scalar

use super::grid::Matrix;
use crate::error::{LoanError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Binary operator applied cell by cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Operation {
    #[default]
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operation {
    /// Plain IEEE 754 arithmetic; division by zero yields infinity or NaN
    pub fn apply(&self, left: f64, right: f64) -> f64 {
        match self {
            Operation::Add => left + right,
            Operation::Subtract => left - right,
            Operation::Multiply => left * right,
            Operation::Divide => left / right,
        }
    }
}

impl FromStr for Operation {
    type Err = LoanError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "add" | "addition" | "+" => Ok(Operation::Add),
            "subtract" | "subtraction" | "-" => Ok(Operation::Subtract),
            "multiply" | "multiplication" | "*" => Ok(Operation::Multiply),
            "divide" | "division" | "/" => Ok(Operation::Divide),
            other => Err(LoanError::Config(format!("Unknown operation: {}", other))),
        }
    }
}

/// Treatment of NaN cells before the operator runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MissingValues {
    /// NaN flows through the arithmetic
    #[default]
    Propagate,
    /// NaN cells in either operand become 0
    ReplaceWithZero,
}

impl MissingValues {
    pub fn from_flag(replace_with_zero: bool) -> Self {
        if replace_with_zero {
            MissingValues::ReplaceWithZero
        } else {
            MissingValues::Propagate
        }
    }

    #[inline]
    fn fill(&self, value: f64) -> f64 {
        match self {
            MissingValues::ReplaceWithZero if value.is_nan() => 0.0,
            _ => value,
        }
    }
}

/// Right-hand side of a broadcast operation
#[derive(Debug, Clone, Copy)]
pub enum Operand<'a> {
    /// Same shape as the left matrix
    Matrix(&'a Matrix),
    /// One value per column, repeated down every row
    RowVector(&'a [f64]),
    /// One value per row, repeated across every column
    ColumnVector(&'a [f64]),
    /// One value for every cell
    Scalar(f64),
}

impl Operand<'_> {
    fn shape(&self) -> (usize, usize) {
        match self {
            Operand::Matrix(m) => m.shape(),
            Operand::RowVector(v) => (1, v.len()),
            Operand::ColumnVector(v) => (v.len(), 1),
            Operand::Scalar(_) => (1, 1),
        }
    }

    #[inline]
    fn at(&self, row: usize, col: usize) -> f64 {
        match self {
            Operand::Matrix(m) => m.column(col)[row],
            Operand::RowVector(v) => v[col],
            Operand::ColumnVector(v) => v[row],
            Operand::Scalar(s) => *s,
        }
    }
}

/// Check the operands conform without touching any values
pub fn check_conformable(left: &Matrix, right: &Operand<'_>) -> Result<()> {
    let (rows, cols) = left.shape();
    let (right_rows, right_cols) = right.shape();

    let reason = match right {
        Operand::Matrix(_) if right_rows != rows => Some("matrices must have the same number of rows"),
        Operand::Matrix(_) if right_cols != cols => Some("matrices must have the same number of columns"),
        Operand::RowVector(_) if right_cols != cols => {
            Some("row vector length must match the number of matrix columns")
        }
        Operand::ColumnVector(_) if right_rows != rows => {
            Some("column vector length must match the number of matrix rows")
        }
        _ => None,
    };

    match reason {
        Some(reason) => Err(LoanError::DimensionMismatch {
            left_rows: rows,
            left_cols: cols,
            right_rows,
            right_cols,
            reason: reason.into(),
        }),
        None => Ok(()),
    }
}

/// Apply `op` between `left` and `right`, producing a matrix shaped and
/// named like `left`. Conformability is checked before any cell is computed.
pub fn broadcast(left: &Matrix, op: Operation, right: Operand<'_>, missing: MissingValues) -> Result<Matrix> {
    check_conformable(left, &right)?;

    let columns = left
        .columns()
        .iter()
        .enumerate()
        .map(|(col, values)| {
            values
                .iter()
                .enumerate()
                .map(|(row, &value)| op.apply(missing.fill(value), missing.fill(right.at(row, col))))
                .collect()
        })
        .collect();

    Matrix::from_columns(left.names().to_vec(), columns)
}
