//! Loan Engine CLI
//!
//! ```bash
//! # Append a PMT column to a loan file
//! loan_engine function pmt loans.csv --rate annual_rate --nper nper --pv pv
//!
//! # Expand every loan into its full schedule
//! loan_engine schedule loans.csv --mode full --frequency monthly -o schedules.csv
//!
//! # Divide a grid by a column vector, treating blanks as zero
//! loan_engine matrix grid.csv weights.csv --operation divide --column-vector w --handle-missing
//! ```

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use loan_engine::config::{EngineConfig, FailurePolicy};
use loan_engine::loan::{Frequency, PaymentTiming, RateMethod};
use loan_engine::matrix::{MissingValues, Operation};
use loan_engine::schedule::ScheduleMode;
use loan_engine::table::{self, LoanColumns, LoanFunction, MatrixOperand, Table};
use loan_engine::BatchRunner;
use log::info;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Excel-compatible loan calculations over CSV files
#[derive(Parser)]
#[command(name = "loan_engine")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Write the result here instead of stdout
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Append one function column (pmt, ipmt, ppmt, pv, cumipmt, cumprinc)
    Function(FunctionArgs),

    /// Expand each loan row into its amortization schedule
    Schedule(ScheduleArgs),

    /// Element-wise arithmetic between two tables
    Matrix(MatrixArgs),
}

/// Run-wide conventions; flags override the JSON config file
#[derive(Args)]
struct ConventionArgs {
    /// JSON file with frequency, rate_method, timing and failure_policy
    #[arg(long)]
    config: Option<PathBuf>,

    /// monthly, quarterly, annual (or 12, 4, 1)
    #[arg(long)]
    frequency: Option<Frequency>,

    /// simple or compound
    #[arg(long)]
    rate_method: Option<RateMethod>,

    /// end or beginning
    #[arg(long)]
    timing: Option<PaymentTiming>,

    /// abort or skip
    #[arg(long)]
    on_error: Option<FailurePolicy>,
}

impl ConventionArgs {
    fn engine_config(&self) -> Result<EngineConfig> {
        let mut config = match &self.config {
            Some(path) => EngineConfig::from_json_path(path)
                .with_context(|| format!("reading config {}", path.display()))?,
            None => EngineConfig::default(),
        };
        if let Some(frequency) = self.frequency {
            config.frequency = frequency;
        }
        if let Some(method) = self.rate_method {
            config.rate_method = method;
        }
        if let Some(timing) = self.timing {
            config.timing = timing;
        }
        if let Some(policy) = self.on_error {
            config.failure_policy = policy;
        }
        Ok(config)
    }
}

#[derive(Args)]
struct ColumnArgs {
    #[arg(long, default_value = "rate")]
    rate: String,

    #[arg(long, default_value = "nper")]
    nper: String,

    #[arg(long, default_value = "pv")]
    pv: String,

    #[arg(long)]
    fv: Option<String>,

    #[arg(long)]
    per: Option<String>,

    #[arg(long)]
    pmt: Option<String>,

    #[arg(long)]
    start: Option<String>,

    #[arg(long)]
    end: Option<String>,
}

impl ColumnArgs {
    fn loan_columns(&self, annual_rate: bool) -> LoanColumns {
        LoanColumns {
            rate: self.rate.clone(),
            nper: self.nper.clone(),
            pv: self.pv.clone(),
            fv: self.fv.clone(),
            per: self.per.clone(),
            pmt: self.pmt.clone(),
            start: self.start.clone(),
            end: self.end.clone(),
            annual_rate,
        }
    }
}

#[derive(Args)]
struct FunctionArgs {
    function: LoanFunction,

    input: PathBuf,

    #[command(flatten)]
    columns: ColumnArgs,

    /// The rate column is already per period; skip annual normalization
    #[arg(long)]
    periodic_rate: bool,

    #[command(flatten)]
    conventions: ConventionArgs,
}

#[derive(Args)]
struct ScheduleArgs {
    input: PathBuf,

    /// full, interest, principal, cumulative-interest, open-payment, ...
    #[arg(long, default_value = "full")]
    mode: ScheduleMode,

    /// First period to emit
    #[arg(long, requires = "to")]
    from: Option<i64>,

    /// Last period to emit
    #[arg(long, requires = "from")]
    to: Option<i64>,

    #[command(flatten)]
    columns: ColumnArgs,

    #[command(flatten)]
    conventions: ConventionArgs,
}

#[derive(Args)]
struct MatrixArgs {
    primary: PathBuf,

    secondary: PathBuf,

    /// add, subtract, multiply, divide
    #[arg(long, default_value = "add")]
    operation: Operation,

    /// Use the secondary table's single row as a row vector
    #[arg(long, conflicts_with_all = ["column_vector", "scalar"])]
    row_vector: bool,

    /// Use this column of the secondary table as a column vector
    #[arg(long, conflicts_with = "scalar")]
    column_vector: Option<String>,

    /// Use the secondary table's first cell as a scalar
    #[arg(long)]
    scalar: bool,

    /// Treat blank cells as zero instead of propagating NaN
    #[arg(long)]
    handle_missing: bool,
}

impl MatrixArgs {
    fn operand(&self) -> MatrixOperand {
        match (&self.column_vector, self.row_vector, self.scalar) {
            (Some(name), _, _) => MatrixOperand::ColumnVector(name.clone()),
            (None, true, _) => MatrixOperand::RowVector,
            (None, false, true) => MatrixOperand::Scalar,
            (None, false, false) => MatrixOperand::Matrix,
        }
    }
}

fn load(path: &Path) -> Result<Table> {
    Table::from_path(path).with_context(|| format!("reading {}", path.display()))
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let start = Instant::now();

    let result = match &cli.command {
        Commands::Function(args) => {
            let runner = BatchRunner::new(args.conventions.engine_config()?);
            let input = load(&args.input)?;
            table::append_function(&input, args.function, &args.columns.loan_columns(!args.periodic_rate), &runner)?
        }
        Commands::Schedule(args) => {
            let runner = BatchRunner::new(args.conventions.engine_config()?);
            let input = load(&args.input)?;
            let window = args.from.zip(args.to);
            table::expand_schedule(&input, args.mode, &args.columns.loan_columns(true), window, &runner)?
        }
        Commands::Matrix(args) => {
            let primary = load(&args.primary)?;
            let secondary = load(&args.secondary)?;
            table::matrix_operation(
                &primary,
                &secondary,
                &args.operand(),
                args.operation,
                MissingValues::from_flag(args.handle_missing),
            )?
        }
    };

    match &cli.output {
        Some(path) => {
            result
                .write_path(path)
                .with_context(|| format!("writing {}", path.display()))?;
            info!("Wrote {} rows to {} in {:?}", result.rows(), path.display(), start.elapsed());
        }
        None => result.write_to(std::io::stdout().lock())?,
    }

    Ok(())
}
