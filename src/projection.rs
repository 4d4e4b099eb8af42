//! Debt and balance projections for loans that do not fit the budget.
//!
//! Two independent models are exposed here and must not be mixed up:
//!
//! - [`project`] compounds the unpaid monthly deficit at the loan's nominal
//!   monthly rate over a multi-year horizon (debt growth).
//! - [`balance_series`] is a linear accumulation of post-loan cash flow over
//!   the loan term, used only for charting debt and savings regions.
//!
//! The compounding model keeps applying the loan rate after the loan term
//! ends, to the structural deficit alone. No separate cost of carrying
//! unpaid debt is modeled.
//!
//! Horizons are capped at [`MAX_HORIZON_YEARS`]. Compounding saturates at
//! [`Money::MAX`] rather than overflowing; [`DebtProjection::saturated`]
//! reports when that happened.

use crate::cashflow::CashFlowResult;
use crate::error::{FinanceError, Result};
use crate::loan::LoanResult;
use crate::money::Money;
use log::{debug, warn};
use rust_decimal::Decimal;

/// Year marks at which accumulated debt is reported by default.
pub const DEFAULT_HORIZON_YEARS: [u32; 6] = [1, 2, 3, 5, 10, 20];

/// Longest projection horizon accepted, in years.
pub const MAX_HORIZON_YEARS: u32 = 50;

pub(crate) const MONTHS_PER_YEAR: u32 = 12;

/// Validated set of year marks at which debt is reported.
///
/// Every mark is at most [`MAX_HORIZON_YEARS`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Horizon {
    years: Vec<u32>,
}

impl Horizon {
    /// Collects year marks, rejecting any beyond [`MAX_HORIZON_YEARS`].
    pub fn new(years: Vec<u32>) -> Result<Self> {
        if let Some(&too_long) = years.iter().find(|&&y| y > MAX_HORIZON_YEARS) {
            return Err(FinanceError::HorizonTooLong(too_long));
        }
        Ok(Horizon { years })
    }

    pub fn years(&self) -> &[u32] {
        &self.years
    }

    /// Number of months simulated to reach the furthest mark.
    pub fn total_months(&self) -> u32 {
        self.years.iter().copied().max().unwrap_or(0) * MONTHS_PER_YEAR
    }
}

impl Default for Horizon {
    fn default() -> Self {
        Horizon {
            years: DEFAULT_HORIZON_YEARS.to_vec(),
        }
    }
}

/// Accumulated debt after a number of simulated months.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebtProjectionPoint {
    /// Months since the start of the simulation, starting at 1.
    pub elapsed_months: u32,
    pub accumulated_debt: Money,
}

/// Snapshot of accumulated debt at a whole-year mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint {
    pub years: u32,
    pub accumulated_debt: Money,
}

impl Checkpoint {
    /// Display label, e.g. `"5 year(s)"`.
    pub fn label(&self) -> String {
        format!("{} year(s)", self.years)
    }
}

/// Month-by-month debt trajectory plus its yearly checkpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DebtProjection {
    /// One entry per simulated month, in order.
    pub points: Vec<DebtProjectionPoint>,

    /// Entries for the requested year marks, in chronological order.
    pub checkpoints: Vec<Checkpoint>,

    /// Set when the debt reached [`Money::MAX`] and stopped growing.
    pub saturated: bool,
}

impl DebtProjection {
    /// Debt at the end of the simulated horizon.
    pub fn final_debt(&self) -> Money {
        self.points
            .last()
            .map(|p| p.accumulated_debt)
            .unwrap_or(Money::ZERO)
    }
}

/// Simulates compounding unpaid deficit.
///
/// For each month `m` in `1..=max(horizon_years) * 12`, the month's deficit
/// (`loan_deficit` during the loan term, `structural_deficit` afterwards) is
/// added to the running debt, and the new balance then compounds at
/// `monthly_rate`. Both steps saturate at [`Money::MAX`].
pub fn project(
    structural_deficit: Money,
    loan_deficit: Money,
    loan_term_months: u32,
    monthly_rate: Decimal,
    horizon: &Horizon,
) -> DebtProjection {
    let total_months = horizon.total_months();
    let growth = Decimal::ONE + monthly_rate;

    let mut projection = DebtProjection {
        points: Vec::with_capacity(total_months as usize),
        checkpoints: Vec::with_capacity(horizon.years().len()),
        saturated: false,
    };
    let mut accumulated_debt = Money::ZERO;

    for month in 1..=total_months {
        let deficit = if month <= loan_term_months {
            loan_deficit
        } else {
            structural_deficit
        };

        accumulated_debt = accumulated_debt.saturating_add(deficit).saturating_mul(growth);
        if accumulated_debt.is_saturated() && !projection.saturated {
            warn!("Projected debt saturated at month {}", month);
            projection.saturated = true;
        }
        projection.points.push(DebtProjectionPoint {
            elapsed_months: month,
            accumulated_debt,
        });

        if month % MONTHS_PER_YEAR == 0 {
            let years = month / MONTHS_PER_YEAR;
            if horizon.years().contains(&years) {
                projection.checkpoints.push(Checkpoint {
                    years,
                    accumulated_debt,
                });
            }
        }
    }

    debug!(
        "Projected {} months of debt, final balance {}",
        total_months,
        projection.final_debt()
    );

    projection
}

/// Runs the debt projection for an evaluated loan.
///
/// Returns `None` when the loan is viable: there is no deficit to compound.
pub fn project_loan(
    cash_flow: &CashFlowResult,
    loan: &LoanResult,
    horizon: &Horizon,
) -> Option<DebtProjection> {
    if loan.is_viable() {
        return None;
    }

    Some(project(
        cash_flow.structural_deficit(),
        loan.loan_deficit(),
        loan.terms.term_months(),
        loan.terms.monthly_rate(),
        horizon,
    ))
}

/// A point of the linear balance series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalancePoint {
    pub month: u32,

    /// `post_loan_cash_flow * month`.
    pub balance: Money,
}

impl BalancePoint {
    /// Debt region value: the balance clamped to `<= 0`.
    pub fn debt(&self) -> Money {
        self.balance.min(Money::ZERO)
    }

    /// Savings region value: the balance clamped to `>= 0`.
    pub fn savings(&self) -> Money {
        self.balance.max(Money::ZERO)
    }
}

/// Linear accumulation of post-loan cash flow for months `0..=loan_term_months`.
pub fn balance_series(post_loan_cash_flow: Money, loan_term_months: u32) -> Vec<BalancePoint> {
    (0..=loan_term_months)
        .map(|month| BalancePoint {
            month,
            balance: post_loan_cash_flow * Decimal::from(month),
        })
        .collect()
}
