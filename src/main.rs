//! Finance Diagnosis CLI
//!
//! Runs one diagnosis per invocation and prints the results to stdout.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- cashflow --income 20000 --fixed 8000 --variable 5000
//! cargo run -- loan --income 10000 --fixed 8000 --variable 5000 --principal 50000 --term 12
//! cargo run -- expenses expenses.csv > ledger.csv
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Set to `debug` or `warn` to control logging verbosity

use clap::{Args, Parser, Subcommand};
use finance_diagnosis::cashflow;
use finance_diagnosis::loan::DEFAULT_ANNUAL_RATE_PERCENT;
use finance_diagnosis::projection::{Horizon, DEFAULT_HORIZON_YEARS};
use finance_diagnosis::report;
use finance_diagnosis::{ExpenseLedger, IncomeExpenseInput, LoanTerms, Money, Result, Session};
use rust_decimal::Decimal;
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::PathBuf;
use std::process;

#[derive(Parser, Debug)]
#[command(name = "finance-diagnosis", version, about = "Personal finance diagnosis")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check whether monthly income covers expenses
    Cashflow(BudgetArgs),

    /// Check whether a fixed-rate loan fits the monthly budget
    Loan {
        #[command(flatten)]
        budget: BudgetArgs,

        /// Loan amount
        #[arg(long)]
        principal: Money,

        /// Loan term in months
        #[arg(long)]
        term: u32,

        /// Annual nominal rate in percent (0 to 120)
        #[arg(long, default_value_t = DEFAULT_ANNUAL_RATE_PERCENT)]
        rate: Decimal,

        /// Year marks at which projected debt is reported (at most 50 years)
        #[arg(long, value_delimiter = ',', default_values_t = DEFAULT_HORIZON_YEARS)]
        horizon: Vec<u32>,

        /// Also print the month-by-month balance series as CSV
        #[arg(long)]
        series: bool,
    },

    /// Build an expense ledger from CSV form submissions and print it with variance
    Expenses {
        /// CSV file with expense submissions; reads stdin when omitted
        #[arg(value_name = "PATH")]
        input: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct BudgetArgs {
    /// Net monthly income
    #[arg(long)]
    income: Money,

    /// Fixed monthly expenses
    #[arg(long, default_value_t = Money::ZERO)]
    fixed: Money,

    /// Variable monthly expenses
    #[arg(long, default_value_t = Money::ZERO)]
    variable: Money,
}

impl BudgetArgs {
    fn to_input(&self) -> Result<IncomeExpenseInput> {
        IncomeExpenseInput::new(self.income, self.fixed, self.variable)
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    match cli.command {
        Command::Cashflow(budget) => {
            let input = budget.to_input()?;
            let mut session = Session::new();
            let result = session.analyze_cash_flow(input);
            report::write_cash_flow(&mut handle, &result, cashflow::breakdown(&input))?;
        }
        Command::Loan {
            budget,
            principal,
            term,
            rate,
            horizon,
            series,
        } => {
            let input = budget.to_input()?;
            let terms = LoanTerms::new(principal, term, rate)?;
            let horizon = Horizon::new(horizon)?;

            let mut session = Session::with_horizon(horizon);
            let cash_flow = session.analyze_cash_flow(input);
            report::write_cash_flow(&mut handle, &cash_flow, cashflow::breakdown(&input))?;
            writeln!(handle)?;

            let loan = session.evaluate_credit(terms)?;
            report::write_loan(&mut handle, &loan)?;

            if let Some(projection) = session.projection() {
                writeln!(handle)?;
                report::write_projection(&mut handle, &projection)?;
            }
            if series {
                if let Some(points) = session.balance_series() {
                    writeln!(handle)?;
                    report::write_balance_series(&mut handle, &points)?;
                }
            }
        }
        Command::Expenses { input } => {
            let mut ledger = ExpenseLedger::new();
            match input {
                Some(path) => {
                    let file = File::open(path)?;
                    ledger.add_from_csv(BufReader::new(file))?;
                }
                None => {
                    ledger.add_from_csv(io::stdin().lock())?;
                }
            }
            report::write_ledger(&mut handle, &ledger)?;
        }
    }

    Ok(())
}
