//! Terminal rendering of diagnosis results.
//!
//! Text sections are written for people; series and ledger tables are
//! written as CSV so they can be charted or edited elsewhere.

use crate::cashflow::{CashFlowResult, CashFlowStatus, ExpenseBreakdown};
use crate::error::Result;
use crate::ledger::ExpenseLedger;
use crate::loan::{LoanResult, Viability};
use crate::money::Money;
use crate::projection::{BalancePoint, DebtProjection};
use rust_decimal::Decimal;
use std::io::Write;

/// Formats an amount as currency with thousands separators, e.g. `-$1,234.56`.
pub fn format_currency(amount: Money) -> String {
    let text = amount.abs().to_string();
    let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amount.rounded() < Decimal::ZERO { "-" } else { "" };
    format!("{}${}.{}", sign, grouped, fraction)
}

pub fn write_cash_flow<W: Write>(
    mut writer: W,
    result: &CashFlowResult,
    breakdown: Option<ExpenseBreakdown>,
) -> Result<()> {
    writeln!(writer, "Cash flow diagnosis")?;
    writeln!(
        writer,
        "  Income:          {}",
        format_currency(result.input.monthly_net_income)
    )?;
    writeln!(
        writer,
        "  Total expenses:  {}",
        format_currency(result.total_expenses)
    )?;
    writeln!(
        writer,
        "  Free cash flow:  {}",
        format_currency(result.free_cash_flow)
    )?;

    match result.status() {
        CashFlowStatus::Sustainable { surplus } => writeln!(
            writer,
            "  Sustainable: {} left over each month.",
            format_currency(surplus)
        )?,
        CashFlowStatus::Deficit { shortfall } => writeln!(
            writer,
            "  Deficit: spending exceeds income by {} each month.",
            format_currency(shortfall)
        )?,
    }

    if let Some(split) = breakdown {
        writeln!(
            writer,
            "  Expense split:   fixed {:.1}% / variable {:.1}%",
            split.fixed_share.round_dp(1),
            split.variable_share.round_dp(1)
        )?;
    }

    Ok(())
}

pub fn write_loan<W: Write>(mut writer: W, loan: &LoanResult) -> Result<()> {
    writeln!(writer, "Loan diagnosis")?;
    if loan.pre_existing_deficit {
        writeln!(
            writer,
            "  Warning: you already spend more than you earn. Taking a loan is very risky."
        )?;
    }
    writeln!(
        writer,
        "  Monthly payment:       {}",
        format_currency(loan.monthly_payment)
    )?;
    writeln!(
        writer,
        "  Post-loan cash flow:   {}",
        format_currency(loan.post_loan_cash_flow)
    )?;

    match loan.viability() {
        Viability::Viable { surplus } => writeln!(
            writer,
            "  VIABLE: you could pay it and keep {} each month.",
            format_currency(surplus)
        )?,
        Viability::NotViable {
            deficit,
            required_adjustment,
        } => {
            writeln!(
                writer,
                "  NOT VIABLE: you would be {} short each month.",
                format_currency(deficit)
            )?;
            writeln!(
                writer,
                "  To afford it, earn {} more per month or cut the same amount of expenses.",
                format_currency(required_adjustment)
            )?;
        }
    }

    Ok(())
}

/// Writes the checkpoint table of a debt projection.
pub fn write_projection<W: Write>(mut writer: W, projection: &DebtProjection) -> Result<()> {
    writeln!(writer, "Projected debt")?;
    writeln!(writer, "  {:<12} {:>20}", "Time", "Total debt")?;
    for checkpoint in &projection.checkpoints {
        writeln!(
            writer,
            "  {:<12} {:>20}",
            checkpoint.label(),
            format_currency(checkpoint.accumulated_debt)
        )?;
    }
    if projection.saturated {
        writeln!(
            writer,
            "  Note: debt exceeds the largest representable amount and is shown capped."
        )?;
    }
    writeln!(writer, "  Note: does not include fines or late fees.")?;
    Ok(())
}

/// Writes the linear balance series as CSV with debt and savings regions.
pub fn write_balance_series<W: Write>(writer: W, series: &[BalancePoint]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer.write_record(["month", "balance", "debt", "savings"])?;
    for point in series {
        csv_writer.write_record([
            point.month.to_string(),
            point.balance.to_string(),
            point.debt().to_string(),
            point.savings().to_string(),
        ])?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Writes the ledger as CSV, including the computed variance column.
pub fn write_ledger<W: Write>(writer: W, ledger: &ExpenseLedger) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer.write_record([
        "name",
        "category",
        "subcategory",
        "estimated",
        "actual",
        "variance",
        "periodicity",
        "start_date",
        "total_payments",
    ])?;

    for entry in ledger.list() {
        let record = entry.record;
        csv_writer.write_record([
            record.name.clone(),
            record.category.clone(),
            record.subcategory.clone(),
            record.estimated_amount.to_string(),
            record.actual_amount.to_string(),
            entry.variance.to_string(),
            record.periodicity.to_string(),
            record.start_date.to_string(),
            record.total_payments.to_string(),
        ])?;
    }

    csv_writer.flush()?;
    Ok(())
}
