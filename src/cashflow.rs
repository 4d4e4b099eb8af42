//! Monthly free cash flow analysis.

use crate::error::{FinanceError, Result};
use crate::money::Money;
use log::debug;
use rust_decimal::Decimal;

/// Monthly income and expense totals entered by the user.
///
/// All three amounts lie in `0..=Money::MAX_INPUT` once constructed through
/// [`IncomeExpenseInput::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IncomeExpenseInput {
    /// Net monthly income, after taxes.
    pub monthly_net_income: Money,

    /// Fixed monthly expenses (rent, subscriptions, ...).
    pub fixed_expenses: Money,

    /// Variable monthly expenses (groceries, leisure, ...).
    pub variable_expenses: Money,
}

impl IncomeExpenseInput {
    /// Collects the three amounts, rejecting negative or oversized values.
    pub fn new(
        monthly_net_income: Money,
        fixed_expenses: Money,
        variable_expenses: Money,
    ) -> Result<Self> {
        ensure_amount("income", monthly_net_income)?;
        ensure_amount("fixed expenses", fixed_expenses)?;
        ensure_amount("variable expenses", variable_expenses)?;

        Ok(IncomeExpenseInput {
            monthly_net_income,
            fixed_expenses,
            variable_expenses,
        })
    }

    pub fn total_expenses(&self) -> Money {
        self.fixed_expenses + self.variable_expenses
    }
}

/// Checks that a collected amount lies in `0..=Money::MAX_INPUT`.
pub(crate) fn ensure_amount(field: &'static str, value: Money) -> Result<()> {
    if value.is_negative() {
        return Err(FinanceError::NegativeAmount { field, value });
    }
    if value > Money::MAX_INPUT {
        return Err(FinanceError::AmountTooLarge {
            field,
            value,
            max: Money::MAX_INPUT,
        });
    }
    Ok(())
}

/// Whether the current lifestyle fits the income.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CashFlowStatus {
    /// Income covers expenses; carries the monthly surplus.
    Sustainable { surplus: Money },

    /// Expenses exceed income; carries the monthly shortfall as a positive amount.
    Deficit { shortfall: Money },
}

/// Result of a cash flow analysis. Always recomputed in full from its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CashFlowResult {
    /// The input this result was derived from.
    pub input: IncomeExpenseInput,

    /// Fixed plus variable expenses.
    pub total_expenses: Money,

    /// Income minus total expenses. Negative when spending exceeds income.
    pub free_cash_flow: Money,
}

impl CashFlowResult {
    pub fn status(&self) -> CashFlowStatus {
        if self.free_cash_flow.is_negative() {
            CashFlowStatus::Deficit {
                shortfall: self.free_cash_flow.abs(),
            }
        } else {
            CashFlowStatus::Sustainable {
                surplus: self.free_cash_flow,
            }
        }
    }

    pub fn is_sustainable(&self) -> bool {
        matches!(self.status(), CashFlowStatus::Sustainable { .. })
    }

    /// The pre-loan monthly shortfall, zero when cash flow is non-negative.
    pub fn structural_deficit(&self) -> Money {
        if self.free_cash_flow.is_negative() {
            self.free_cash_flow.abs()
        } else {
            Money::ZERO
        }
    }
}

/// Computes `income - (fixed + variable)`.
pub fn analyze(input: &IncomeExpenseInput) -> CashFlowResult {
    let total_expenses = input.total_expenses();
    let free_cash_flow = input.monthly_net_income - total_expenses;

    debug!(
        "Cash flow: income {} - expenses {} = {}",
        input.monthly_net_income, total_expenses, free_cash_flow
    );

    CashFlowResult {
        input: *input,
        total_expenses,
        free_cash_flow,
    }
}

/// Share of fixed and variable expenses, in percent of total expenses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpenseBreakdown {
    pub fixed_share: Decimal,
    pub variable_share: Decimal,
}

/// Splits expenses into fixed and variable shares.
///
/// Returns `None` when there are no expenses to split.
pub fn breakdown(input: &IncomeExpenseInput) -> Option<ExpenseBreakdown> {
    let total = input.total_expenses();
    if total.is_zero() {
        return None;
    }

    let hundred = Decimal::ONE_HUNDRED;
    let fixed_share = input.fixed_expenses.amount() * hundred / total.amount();
    Some(ExpenseBreakdown {
        fixed_share,
        variable_share: hundred - fixed_share,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(income: i64, fixed: i64, variable: i64) -> IncomeExpenseInput {
        IncomeExpenseInput::new(
            Money::from_units(income),
            Money::from_units(fixed),
            Money::from_units(variable),
        )
        .unwrap()
    }

    #[test]
    fn test_surplus_is_sustainable() {
        let result = analyze(&input(20_000, 8_000, 5_000));
        assert_eq!(result.free_cash_flow, Money::from_units(7_000));
        assert_eq!(result.total_expenses, Money::from_units(13_000));
        assert_eq!(
            result.status(),
            CashFlowStatus::Sustainable {
                surplus: Money::from_units(7_000)
            }
        );
        assert_eq!(result.structural_deficit(), Money::ZERO);
    }

    #[test]
    fn test_overspending_is_deficit() {
        let result = analyze(&input(10_000, 8_000, 5_000));
        assert_eq!(result.free_cash_flow, Money::from_units(-3_000));
        assert_eq!(
            result.status(),
            CashFlowStatus::Deficit {
                shortfall: Money::from_units(3_000)
            }
        );
        assert_eq!(result.structural_deficit(), Money::from_units(3_000));
    }

    #[test]
    fn test_break_even_is_sustainable() {
        let result = analyze(&input(5_000, 5_000, 0));
        assert!(result.free_cash_flow.is_zero());
        assert!(result.is_sustainable());
    }

    #[test]
    fn test_analyze_is_exact_for_fractional_amounts() {
        let input = IncomeExpenseInput::new(
            "1000.10".parse().unwrap(),
            "333.33".parse().unwrap(),
            "0.01".parse().unwrap(),
        )
        .unwrap();
        assert_eq!(analyze(&input).free_cash_flow.to_string(), "666.76");
    }

    #[test]
    fn test_negative_input_rejected() {
        let err = IncomeExpenseInput::new(
            Money::from_units(100),
            Money::from_units(-1),
            Money::ZERO,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            FinanceError::NegativeAmount {
                field: "fixed expenses",
                ..
            }
        ));
    }

    #[test]
    fn test_oversized_input_rejected() {
        let huge = Money::new(Decimal::MAX);
        let err = IncomeExpenseInput::new(huge, huge, Money::ZERO).unwrap_err();
        assert!(matches!(
            err,
            FinanceError::AmountTooLarge { field: "income", .. }
        ));

        let at_limit =
            IncomeExpenseInput::new(Money::MAX_INPUT, Money::MAX_INPUT, Money::MAX_INPUT).unwrap();
        assert_eq!(
            analyze(&at_limit).free_cash_flow,
            Money::ZERO - Money::MAX_INPUT
        );
    }

    #[test]
    fn test_breakdown_shares() {
        let split = breakdown(&input(0, 750, 250)).unwrap();
        assert_eq!(split.fixed_share, Decimal::from(75));
        assert_eq!(split.variable_share, Decimal::from(25));
    }

    #[test]
    fn test_breakdown_absent_without_expenses() {
        assert!(breakdown(&input(1_000, 0, 0)).is_none());
    }
}
