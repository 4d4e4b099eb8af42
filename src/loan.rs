//! Fixed-rate amortizing loan evaluation.
//!
//! The monthly payment follows the standard annuity formula on a nominal
//! monthly rate of `annual / 100 / 12`. Zero rates and numerically
//! degenerate denominators fall back to straight-line repayment instead of
//! signaling an error.

use crate::cashflow::{ensure_amount, CashFlowResult};
use crate::error::{FinanceError, Result};
use crate::money::Money;
use crate::projection::MONTHS_PER_YEAR;
use log::{debug, warn};
use rust_decimal::{Decimal, MathematicalOps};

/// Upper bound accepted for the annual nominal rate, in percent.
pub const MAX_ANNUAL_RATE_PERCENT: Decimal = Decimal::from_parts(120, 0, 0, false, 0);

/// Annual rate offered when the user does not pick one, in percent.
pub const DEFAULT_ANNUAL_RATE_PERCENT: Decimal = Decimal::from_parts(35, 0, 0, false, 0);

/// Terms of a fixed-rate loan.
///
/// # Invariants
///
/// - `0 <= principal <= Money::MAX_INPUT`
/// - `term_months >= 1`
/// - `0 <= annual_rate_percent <= 120`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoanTerms {
    principal: Money,
    term_months: u32,
    annual_rate_percent: Decimal,
}

impl LoanTerms {
    /// Collects loan terms, rejecting values outside their domain.
    pub fn new(principal: Money, term_months: u32, annual_rate_percent: Decimal) -> Result<Self> {
        ensure_amount("principal", principal)?;
        if term_months < 1 {
            return Err(FinanceError::InvalidTerm(term_months));
        }
        if annual_rate_percent < Decimal::ZERO || annual_rate_percent > MAX_ANNUAL_RATE_PERCENT {
            return Err(FinanceError::RateOutOfRange(annual_rate_percent));
        }

        Ok(LoanTerms {
            principal,
            term_months,
            annual_rate_percent,
        })
    }

    pub fn principal(&self) -> Money {
        self.principal
    }

    pub fn term_months(&self) -> u32 {
        self.term_months
    }

    pub fn annual_rate_percent(&self) -> Decimal {
        self.annual_rate_percent
    }

    /// Nominal monthly rate as a fraction, e.g. `0.35 / 12` for 35%.
    pub fn monthly_rate(&self) -> Decimal {
        monthly_rate(self.annual_rate_percent)
    }

    /// Fixed monthly payment for these terms.
    pub fn monthly_payment(&self) -> Money {
        compute_payment(self.principal, self.term_months, self.annual_rate_percent)
    }
}

/// Converts an annual percentage into a nominal monthly fraction.
pub fn monthly_rate(annual_rate_percent: Decimal) -> Decimal {
    annual_rate_percent / Decimal::ONE_HUNDRED / Decimal::from(MONTHS_PER_YEAR)
}

/// Computes the fixed monthly payment of an amortizing loan.
///
/// `term_months` must be at least 1; [`LoanTerms`] guarantees this for
/// collected input.
///
/// When `(1 + r)^n` exceeds the decimal range, the payment takes its limit
/// `principal * r`: the annuity factor converges to the monthly rate as the
/// term grows.
///
/// The result saturates at [`Money::MAX`] for principals beyond what
/// [`LoanTerms`] accepts.
pub fn compute_payment(principal: Money, term_months: u32, annual_rate_percent: Decimal) -> Money {
    debug_assert!(term_months >= 1, "term_months must be at least 1");
    let months = Decimal::from(term_months);

    if annual_rate_percent.is_zero() {
        return principal / months;
    }

    let rate = monthly_rate(annual_rate_percent);
    let growth = match (Decimal::ONE + rate).checked_powu(u64::from(term_months)) {
        Some(growth) => growth,
        None => {
            debug!(
                "Growth factor overflow for {} months at {}/month, using interest-only limit",
                term_months, rate
            );
            return principal.saturating_mul(rate);
        }
    };

    let denominator = growth - Decimal::ONE;
    if denominator <= Decimal::ZERO {
        debug!(
            "Degenerate amortization denominator {}, falling back to straight-line",
            denominator
        );
        return principal / months;
    }

    let numerator = rate * growth;
    principal.saturating_mul(numerator / denominator)
}

/// Cash left each month once the loan payment is made. Negative means a shortfall.
pub fn post_loan_cash_flow(free_cash_flow: Money, monthly_payment: Money) -> Money {
    free_cash_flow - monthly_payment
}

/// Whether the loan fits the monthly budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Viability {
    /// The payment is covered; carries what is left each month.
    Viable { surplus: Money },

    /// The payment is not covered.
    ///
    /// `required_adjustment` is the income increase or expense cut needed to
    /// cover it, and always equals `deficit`.
    NotViable {
        deficit: Money,
        required_adjustment: Money,
    },
}

/// Outcome of evaluating a loan against a cash flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoanResult {
    pub terms: LoanTerms,
    pub monthly_payment: Money,
    pub post_loan_cash_flow: Money,

    /// The loan was evaluated while spending already exceeded income.
    pub pre_existing_deficit: bool,
}

impl LoanResult {
    pub fn viability(&self) -> Viability {
        if self.post_loan_cash_flow.is_negative() {
            let deficit = self.post_loan_cash_flow.abs();
            Viability::NotViable {
                deficit,
                required_adjustment: deficit,
            }
        } else {
            Viability::Viable {
                surplus: self.post_loan_cash_flow,
            }
        }
    }

    pub fn is_viable(&self) -> bool {
        matches!(self.viability(), Viability::Viable { .. })
    }

    /// Monthly shortfall while the loan is being repaid, zero when viable.
    pub fn loan_deficit(&self) -> Money {
        match self.viability() {
            Viability::NotViable { deficit, .. } => deficit,
            Viability::Viable { .. } => Money::ZERO,
        }
    }
}

/// Evaluates a loan against the free cash flow of an analysis.
pub fn evaluate(cash_flow: &CashFlowResult, terms: &LoanTerms) -> LoanResult {
    let pre_existing_deficit = cash_flow.free_cash_flow.is_negative();
    if pre_existing_deficit {
        warn!(
            "Evaluating a loan while already spending {} more than earned each month",
            cash_flow.free_cash_flow.abs()
        );
    }

    let monthly_payment = terms.monthly_payment();
    let post_loan = post_loan_cash_flow(cash_flow.free_cash_flow, monthly_payment);

    debug!(
        "Loan {} over {} months at {}%: payment {}, post-loan cash flow {}",
        terms.principal, terms.term_months, terms.annual_rate_percent, monthly_payment, post_loan
    );

    LoanResult {
        terms: *terms,
        monthly_payment,
        post_loan_cash_flow: post_loan,
        pre_existing_deficit,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cashflow::{analyze, IncomeExpenseInput};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn cash_flow(income: i64, fixed: i64, variable: i64) -> CashFlowResult {
        let input = IncomeExpenseInput::new(
            Money::from_units(income),
            Money::from_units(fixed),
            Money::from_units(variable),
        )
        .unwrap();
        analyze(&input)
    }

    #[test]
    fn test_zero_rate_is_straight_line() {
        let payment = compute_payment(Money::from_units(12_000), 12, Decimal::ZERO);
        assert_eq!(payment, Money::from_units(1_000));

        let payment = compute_payment(Money::from_units(100), 3, Decimal::ZERO);
        assert_eq!(payment.amount(), dec("33.3333"));
    }

    #[test]
    fn test_reference_payment_at_35_percent() {
        let terms = LoanTerms::new(Money::from_units(50_000), 12, dec("35")).unwrap();
        assert_eq!(terms.monthly_rate().round_dp(7), dec("0.0291667"));
        assert_eq!(terms.monthly_payment().to_string(), "4998.15");
    }

    #[test]
    fn test_payment_amortizes_principal_to_zero() {
        let principal = Money::from_units(250_000);
        let term = 360;
        let rate = monthly_rate(dec("7.5"));
        let payment = compute_payment(principal, term, dec("7.5"));

        let mut balance = principal.amount();
        for _ in 0..term {
            balance = balance * (Decimal::ONE + rate) - payment.amount();
        }
        assert!(balance.abs() < Decimal::ONE, "residual balance {}", balance);
    }

    #[test]
    fn test_positive_rate_costs_more_than_principal() {
        let principal = Money::from_units(10_000);
        for (term, rate) in [(1, "0.5"), (12, "35"), (48, "120"), (240, "4")] {
            let payment = compute_payment(principal, term, dec(rate));
            assert!(payment > Money::ZERO);
            let total = payment * Decimal::from(term);
            assert!(total >= principal, "term {} rate {}", term, rate);
        }
    }

    #[test]
    fn test_single_month_repays_principal_plus_one_month_interest() {
        let payment = compute_payment(Money::from_units(1_200), 1, dec("12"));
        assert_eq!(payment, Money::from_units(1_212));
    }

    #[test]
    fn test_zero_principal_pays_nothing() {
        assert!(compute_payment(Money::ZERO, 24, dec("35")).is_zero());
    }

    #[test]
    fn test_overflowing_growth_uses_interest_only_limit() {
        let payment = compute_payment(Money::from_units(10_000), 10_000, dec("120"));
        assert_eq!(payment, Money::from_units(1_000));
    }

    #[test]
    fn test_terms_validation() {
        assert!(matches!(
            LoanTerms::new(Money::from_units(1), 0, dec("10")),
            Err(FinanceError::InvalidTerm(0))
        ));
        assert!(matches!(
            LoanTerms::new(Money::from_units(1), 12, dec("120.5")),
            Err(FinanceError::RateOutOfRange(_))
        ));
        assert!(matches!(
            LoanTerms::new(Money::from_units(1), 12, dec("-1")),
            Err(FinanceError::RateOutOfRange(_))
        ));
        assert!(matches!(
            LoanTerms::new(Money::from_units(-1), 12, dec("10")),
            Err(FinanceError::NegativeAmount { .. })
        ));
        assert!(LoanTerms::new(Money::ZERO, 1, MAX_ANNUAL_RATE_PERCENT).is_ok());
    }

    #[test]
    fn test_principal_above_input_maximum_rejected() {
        let over = Money::MAX_INPUT + Money::from_units(1);
        assert!(matches!(
            LoanTerms::new(over, 12, dec("10")),
            Err(FinanceError::AmountTooLarge {
                field: "principal",
                ..
            })
        ));

        let terms = LoanTerms::new(Money::MAX_INPUT, 1, MAX_ANNUAL_RATE_PERCENT).unwrap();
        assert_eq!(terms.monthly_payment(), Money::from_units(1_100_000_000_000));
    }

    #[test]
    fn test_payment_saturates_for_unchecked_principal() {
        let payment = compute_payment(Money::MAX, 1, MAX_ANNUAL_RATE_PERCENT);
        assert_eq!(payment, Money::MAX);

        let payment = compute_payment(Money::MAX, 10_000, MAX_ANNUAL_RATE_PERCENT);
        assert!(payment > Money::ZERO);
    }

    #[test]
    fn test_viable_loan_reports_surplus() {
        let terms = LoanTerms::new(Money::from_units(50_000), 12, dec("35")).unwrap();
        let result = evaluate(&cash_flow(20_000, 8_000, 5_000), &terms);

        assert_eq!(result.post_loan_cash_flow.to_string(), "2001.85");
        assert!(result.is_viable());
        assert!(!result.pre_existing_deficit);
        assert_eq!(result.loan_deficit(), Money::ZERO);
    }

    #[test]
    fn test_unviable_loan_reports_required_adjustment() {
        let terms = LoanTerms::new(Money::from_units(12_000), 12, Decimal::ZERO).unwrap();
        let result = evaluate(&cash_flow(10_000, 8_000, 5_000), &terms);

        assert!(result.pre_existing_deficit);
        assert_eq!(result.post_loan_cash_flow, Money::from_units(-4_000));
        assert_eq!(
            result.viability(),
            Viability::NotViable {
                deficit: Money::from_units(4_000),
                required_adjustment: Money::from_units(4_000),
            }
        );
    }

    #[test]
    fn test_post_loan_cash_flow_is_difference() {
        let free = Money::from_units(7_000);
        let payment = Money::from_str("4980.73").unwrap();
        assert_eq!(
            post_loan_cash_flow(free, payment),
            Money::from_str("2019.27").unwrap()
        );
    }
}
