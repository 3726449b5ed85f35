//! Row-wise evaluation of loan functions, schedules and matrix operations
//! over tables

use super::data::{ColumnData, Table};
use crate::batch::BatchRunner;
use crate::error::{LoanError, Result};
use crate::formulas::{self, PeriodicRate};
use crate::loan::integral_value;
use crate::matrix::{broadcast, MissingValues, Operand, Operation};
use crate::schedule::{ScheduleEngine, ScheduleMode};
use log::info;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Excel function evaluated once per row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoanFunction {
    Pmt,
    Ipmt,
    Ppmt,
    Pv,
    Cumipmt,
    Cumprinc,
}

impl LoanFunction {
    /// Name of the appended result column
    pub fn column_name(&self) -> &'static str {
        match self {
            LoanFunction::Pmt => "PMT",
            LoanFunction::Ipmt => "IPMT",
            LoanFunction::Ppmt => "PPMT",
            LoanFunction::Pv => "PV",
            LoanFunction::Cumipmt => "CUMIPMT",
            LoanFunction::Cumprinc => "CUMPRINC",
        }
    }
}

impl FromStr for LoanFunction {
    type Err = LoanError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "pmt" => Ok(LoanFunction::Pmt),
            "ipmt" => Ok(LoanFunction::Ipmt),
            "ppmt" => Ok(LoanFunction::Ppmt),
            "pv" => Ok(LoanFunction::Pv),
            "cumipmt" => Ok(LoanFunction::Cumipmt),
            "cumprinc" => Ok(LoanFunction::Cumprinc),
            other => Err(LoanError::Config(format!("Unknown loan function: {}", other))),
        }
    }
}

/// Names of the input columns a loan computation reads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanColumns {
    pub rate: String,
    pub nper: String,
    /// Present value; PV reads `pmt` instead
    pub pv: String,
    /// Optional future value, 0 when absent
    pub fv: Option<String>,
    /// Period for IPMT / PPMT
    pub per: Option<String>,
    /// Payment for PV
    pub pmt: Option<String>,
    /// Range for CUMIPMT / CUMPRINC
    pub start: Option<String>,
    pub end: Option<String>,
    /// Treat `rate` as annual and normalize it with the run's frequency and
    /// rate method; otherwise it is already per period
    #[serde(default)]
    pub annual_rate: bool,
}

impl Default for LoanColumns {
    fn default() -> Self {
        Self {
            rate: "rate".into(),
            nper: "nper".into(),
            pv: "pv".into(),
            fv: None,
            per: None,
            pmt: None,
            start: None,
            end: None,
            annual_rate: false,
        }
    }
}

fn required<'a>(name: &'a Option<String>, what: &str) -> Result<&'a str> {
    name.as_deref()
        .ok_or_else(|| LoanError::Config(format!("{} column is required", what)))
}

fn optional_numeric<'a>(table: &'a Table, name: &Option<String>) -> Result<Option<&'a [f64]>> {
    name.as_deref().map(|n| table.numeric(n)).transpose()
}

/// Append `function`'s result as a new column (replacing one of the same name)
pub fn append_function(
    table: &Table,
    function: LoanFunction,
    columns: &LoanColumns,
    runner: &BatchRunner,
) -> Result<Table> {
    let config = *runner.config();
    let timing = config.timing;

    let rate = table.numeric(&columns.rate)?;
    let nper = table.numeric(&columns.nper)?;
    let fv = optional_numeric(table, &columns.fv)?;
    let per = match function {
        LoanFunction::Ipmt | LoanFunction::Ppmt => Some(table.numeric(required(&columns.per, "period")?)?),
        _ => None,
    };
    let (start, end) = match function {
        LoanFunction::Cumipmt | LoanFunction::Cumprinc => (
            Some(table.numeric(required(&columns.start, "start period")?)?),
            Some(table.numeric(required(&columns.end, "end period")?)?),
        ),
        _ => (None, None),
    };
    let (pv, pmt) = match function {
        LoanFunction::Pv => (None, Some(table.numeric(required(&columns.pmt, "payment")?)?)),
        _ => (Some(table.numeric(&columns.pv)?), None),
    };

    let rows: Vec<usize> = (0..table.rows()).collect();
    let results = runner.map_rows(&rows, |&row| {
        let rate = if columns.annual_rate {
            PeriodicRate::from_annual(rate[row], config.frequency, config.rate_method)?.value()
        } else {
            rate[row]
        };
        let nper = periods_total(integral_value(&columns.nper, nper[row])?)?;
        let fv = fv.map(|v| v[row]).unwrap_or(0.0);

        match function {
            LoanFunction::Pmt => formulas::pmt(rate, nper, pv_at(pv, row), fv, timing),
            LoanFunction::Ipmt => {
                let per = integral_value("per", per.map(|v| v[row]).unwrap_or(f64::NAN))?;
                formulas::ipmt(rate, per, nper, pv_at(pv, row), fv, timing)
            }
            LoanFunction::Ppmt => {
                let per = integral_value("per", per.map(|v| v[row]).unwrap_or(f64::NAN))?;
                formulas::ppmt(rate, per, nper, pv_at(pv, row), fv, timing)
            }
            LoanFunction::Pv => formulas::pv(rate, nper, pmt.map(|v| v[row]).unwrap_or(f64::NAN), fv, timing),
            LoanFunction::Cumipmt | LoanFunction::Cumprinc => {
                let start = integral_value("start", start.map(|v| v[row]).unwrap_or(f64::NAN))?;
                let end = integral_value("end", end.map(|v| v[row]).unwrap_or(f64::NAN))?;
                if function == LoanFunction::Cumipmt {
                    formulas::cumipmt(rate, nper, pv_at(pv, row), start, end, timing)
                } else {
                    formulas::cumprinc(rate, nper, pv_at(pv, row), start, end, timing)
                }
            }
        }
    });

    let kept = runner.resolve(results)?;
    let indices: Vec<usize> = kept.iter().map(|(row, _)| *row).collect();
    let mut output = table.take_rows(&indices);
    output.push_numeric(function.column_name(), kept.into_iter().map(|(_, v)| v).collect())?;

    info!("{}: {} of {} rows computed", function.column_name(), output.rows(), table.rows());
    Ok(output)
}

fn pv_at(pv: Option<&[f64]>, row: usize) -> f64 {
    pv.map(|v| v[row]).unwrap_or(f64::NAN)
}

fn periods_total(nper: i64) -> Result<u32> {
    if nper < 1 {
        return Err(LoanError::invalid_terms(format!("nper must be at least 1, got {}", nper)));
    }
    u32::try_from(nper).map_err(|_| LoanError::invalid_terms(format!("nper {} is too large", nper)))
}

/// Expand every loan row into one row per scheduled period.
///
/// `rate` is read as an annual rate and normalized with the run's frequency
/// and rate method. Original columns repeat verbatim on every expanded row,
/// followed by `Period` and the mode's columns. `window` restricts the
/// emitted periods for every loan.
pub fn expand_schedule(
    table: &Table,
    mode: ScheduleMode,
    columns: &LoanColumns,
    window: Option<(i64, i64)>,
    runner: &BatchRunner,
) -> Result<Table> {
    let rate = table.numeric(&columns.rate)?;
    let nper = table.numeric(&columns.nper)?;
    let pv = table.numeric(&columns.pv)?;
    let fv = optional_numeric(table, &columns.fv)?;

    let rows: Vec<usize> = (0..table.rows()).collect();
    let results = runner.map_rows(&rows, |&row| {
        let terms = runner.terms(
            rate[row],
            integral_value(&columns.nper, nper[row])?,
            pv[row],
            fv.map(|v| v[row]).unwrap_or(0.0),
        )?;
        let engine = ScheduleEngine::new(terms)?;
        match window {
            Some((from, to)) => engine.schedule_window(mode, from, to),
            None => engine.schedule(mode),
        }
    });
    let kept = runner.resolve(results)?;

    let mut source_rows = Vec::new();
    let mut periods = Vec::new();
    let mut values: Vec<Vec<f64>> = vec![Vec::new(); mode.columns().len()];
    for (row, schedule) in &kept {
        for (period, row_values) in schedule.projected_rows() {
            source_rows.push(*row);
            periods.push(period as f64);
            for (column, value) in values.iter_mut().zip(row_values) {
                column.push(value);
            }
        }
    }

    let mut output = table.take_rows(&source_rows);
    output.push_numeric("Period", periods)?;
    for (column, data) in mode.columns().iter().zip(values) {
        output.push_numeric(column.name(), data)?;
    }

    info!(
        "{} schedule: {} loans expanded to {} rows",
        mode,
        kept.len(),
        output.rows()
    );
    Ok(output)
}

/// Shape of the second table in a matrix operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatrixOperand {
    /// All numeric columns, aligned by position
    Matrix,
    /// A single row; its numeric columns align by position
    RowVector,
    /// One named numeric column, aligned by row
    ColumnVector(String),
    /// The first cell of the table
    Scalar,
}

/// Apply `op` between the numeric columns of `primary` and `secondary`.
/// Text columns of `primary` pass through unchanged and numeric results keep
/// the primary column names.
pub fn matrix_operation(
    primary: &Table,
    secondary: &Table,
    operand: &MatrixOperand,
    op: Operation,
    missing: MissingValues,
) -> Result<Table> {
    let left = primary.numeric_matrix()?;

    let result = match operand {
        MatrixOperand::Matrix => {
            let right = secondary.numeric_matrix()?;
            broadcast(&left, op, Operand::Matrix(&right), missing)?
        }
        MatrixOperand::RowVector => {
            let right = secondary.numeric_matrix()?;
            if right.rows() != 1 {
                return Err(LoanError::DimensionMismatch {
                    left_rows: left.rows(),
                    left_cols: left.cols(),
                    right_rows: right.rows(),
                    right_cols: right.cols(),
                    reason: "row vector must have exactly one row".into(),
                });
            }
            let row: Vec<f64> = right.columns().iter().map(|c| c[0]).collect();
            broadcast(&left, op, Operand::RowVector(&row), missing)?
        }
        MatrixOperand::ColumnVector(name) => {
            let vector = secondary.numeric(name)?;
            broadcast(&left, op, Operand::ColumnVector(vector), missing)?
        }
        MatrixOperand::Scalar => broadcast(&left, op, Operand::Scalar(scalar_cell(secondary)?), missing)?,
    };

    primary.with_numeric_matrix(&result)
}

fn scalar_cell(table: &Table) -> Result<f64> {
    let first = table.columns().first().filter(|_| table.rows() > 0);
    match first {
        Some(ColumnData::Numeric(values)) => Ok(values[0]),
        Some(ColumnData::Text(cells)) => Err(LoanError::non_numeric(&table.names()[0], &cells[0])),
        None => Err(LoanError::DimensionMismatch {
            left_rows: 1,
            left_cols: 1,
            right_rows: table.rows(),
            right_cols: table.names().len(),
            reason: "scalar table is empty".into(),
        }),
    }
}
