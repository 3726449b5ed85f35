//! CSV tables and the row-wise loan and matrix operations over them

mod data;
mod adapter;

pub use data::{ColumnData, Table};
pub use adapter::{append_function, expand_schedule, matrix_operation, LoanColumns, LoanFunction, MatrixOperand};
