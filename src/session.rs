//! Per-session application state.
//!
//! A session walks through two stages: the cash flow must be analyzed
//! before a loan can be evaluated, and re-analyzing the cash flow drops any
//! previous loan evaluation.
//!
//! ```text
//! Uninitialized --analyze--> CashFlowKnown --evaluate--> CreditEvaluated
//!       ^                      ^    |                          |
//!       |                      +----+------- analyze ----------+
//!       +------------------ invalidate ------------------------+
//! ```

use crate::cashflow::{self, CashFlowResult, IncomeExpenseInput};
use crate::error::{FinanceError, Result};
use crate::ledger::ExpenseLedger;
use crate::loan::{self, LoanResult, LoanTerms};
use crate::projection::{self, BalancePoint, DebtProjection, Horizon};
use log::debug;

/// Where the session is in the diagnosis flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Stage {
    /// Nothing analyzed yet, or inputs changed since the last analysis.
    #[default]
    Uninitialized,

    /// The cash flow is known; a loan may be evaluated.
    CashFlowKnown(CashFlowResult),

    /// A loan was evaluated against the known cash flow.
    CreditEvaluated {
        cash_flow: CashFlowResult,
        loan: LoanResult,
    },
}

/// State owned by one user session. Dropped when the session ends.
#[derive(Debug, Clone)]
pub struct Session {
    stage: Stage,
    horizon: Horizon,
    ledger: ExpenseLedger,
}

impl Session {
    /// Creates a session projecting debt at the default year marks.
    pub fn new() -> Self {
        Self::with_horizon(Horizon::default())
    }

    /// Creates a session projecting debt at the given year marks.
    pub fn with_horizon(horizon: Horizon) -> Self {
        Session {
            stage: Stage::Uninitialized,
            horizon,
            ledger: ExpenseLedger::new(),
        }
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn horizon_years(&self) -> &[u32] {
        self.horizon.years()
    }

    /// Analyzes the cash flow and moves to `CashFlowKnown`.
    ///
    /// Any previous loan evaluation is discarded.
    pub fn analyze_cash_flow(&mut self, input: IncomeExpenseInput) -> CashFlowResult {
        let result = cashflow::analyze(&input);
        if matches!(self.stage, Stage::CreditEvaluated { .. }) {
            debug!("Cash flow re-analyzed, discarding loan evaluation");
        }
        self.stage = Stage::CashFlowKnown(result);
        result
    }

    /// Evaluates a loan against the analyzed cash flow and moves to `CreditEvaluated`.
    ///
    /// The free cash flow is recomputed from the stored input so the
    /// evaluation is never based on a stale value.
    pub fn evaluate_credit(&mut self, terms: LoanTerms) -> Result<LoanResult> {
        let input = match &self.stage {
            Stage::Uninitialized => return Err(FinanceError::CashFlowNotAnalyzed),
            Stage::CashFlowKnown(cash_flow) | Stage::CreditEvaluated { cash_flow, .. } => {
                cash_flow.input
            }
        };

        if terms.principal().is_zero() {
            return Err(FinanceError::NoLoanRequested);
        }

        let cash_flow = cashflow::analyze(&input);
        let loan = loan::evaluate(&cash_flow, &terms);
        self.stage = Stage::CreditEvaluated { cash_flow, loan };
        Ok(loan)
    }

    /// Drops all derived values after upstream inputs changed.
    pub fn invalidate(&mut self) {
        self.stage = Stage::Uninitialized;
    }

    pub fn cash_flow(&self) -> Option<&CashFlowResult> {
        match &self.stage {
            Stage::Uninitialized => None,
            Stage::CashFlowKnown(cash_flow) | Stage::CreditEvaluated { cash_flow, .. } => {
                Some(cash_flow)
            }
        }
    }

    pub fn loan(&self) -> Option<&LoanResult> {
        match &self.stage {
            Stage::CreditEvaluated { loan, .. } => Some(loan),
            _ => None,
        }
    }

    /// Compounding debt projection, present only for a loan that is not viable.
    pub fn projection(&self) -> Option<DebtProjection> {
        match &self.stage {
            Stage::CreditEvaluated { cash_flow, loan } => {
                projection::project_loan(cash_flow, loan, &self.horizon)
            }
            _ => None,
        }
    }

    /// Linear balance series over the loan term, present only for a loan that is not viable.
    pub fn balance_series(&self) -> Option<Vec<BalancePoint>> {
        self.loan().filter(|loan| !loan.is_viable()).map(|loan| {
            projection::balance_series(loan.post_loan_cash_flow, loan.terms.term_months())
        })
    }

    pub fn ledger(&self) -> &ExpenseLedger {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut ExpenseLedger {
        &mut self.ledger
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use rust_decimal::Decimal;

    fn input(income: i64, fixed: i64, variable: i64) -> IncomeExpenseInput {
        IncomeExpenseInput::new(
            Money::from_units(income),
            Money::from_units(fixed),
            Money::from_units(variable),
        )
        .unwrap()
    }

    fn terms(principal: i64, months: u32, rate: i64) -> LoanTerms {
        LoanTerms::new(Money::from_units(principal), months, Decimal::from(rate)).unwrap()
    }

    #[test]
    fn test_new_session_is_uninitialized() {
        let session = Session::new();
        assert_eq!(session.stage(), &Stage::Uninitialized);
        assert!(session.cash_flow().is_none());
        assert!(session.loan().is_none());
        assert!(session.projection().is_none());
        assert!(session.ledger().is_empty());
        assert_eq!(
            session.horizon_years(),
            &crate::projection::DEFAULT_HORIZON_YEARS
        );
    }

    #[test]
    fn test_credit_requires_cash_flow() {
        let mut session = Session::new();
        let err = session.evaluate_credit(terms(1_000, 12, 10)).unwrap_err();
        assert!(matches!(err, FinanceError::CashFlowNotAnalyzed));
    }

    #[test]
    fn test_credit_requires_principal() {
        let mut session = Session::new();
        session.analyze_cash_flow(input(20_000, 8_000, 5_000));
        let err = session.evaluate_credit(terms(0, 12, 10)).unwrap_err();
        assert!(matches!(err, FinanceError::NoLoanRequested));
        assert!(matches!(session.stage(), Stage::CashFlowKnown(_)));
    }

    #[test]
    fn test_full_flow_and_reset_on_reanalysis() {
        let mut session = Session::new();
        session.analyze_cash_flow(input(20_000, 8_000, 5_000));
        let loan = session.evaluate_credit(terms(50_000, 12, 35)).unwrap();

        assert!(loan.is_viable());
        assert!(matches!(session.stage(), Stage::CreditEvaluated { .. }));
        assert!(session.projection().is_none());
        assert!(session.balance_series().is_none());

        session.analyze_cash_flow(input(10_000, 8_000, 5_000));
        assert!(matches!(session.stage(), Stage::CashFlowKnown(_)));
        assert!(session.loan().is_none());
    }

    #[test]
    fn test_reevaluation_from_credit_stage() {
        let mut session = Session::new();
        session.analyze_cash_flow(input(20_000, 8_000, 5_000));
        session.evaluate_credit(terms(50_000, 12, 35)).unwrap();
        let loan = session.evaluate_credit(terms(200_000, 12, 35)).unwrap();

        assert!(!loan.is_viable());
        assert_eq!(session.loan(), Some(&loan));
    }

    #[test]
    fn test_unviable_loan_exposes_both_projections() {
        let mut session = Session::with_horizon(Horizon::new(vec![1, 2]).unwrap());
        session.analyze_cash_flow(input(10_000, 8_000, 5_000));
        session.evaluate_credit(terms(12_000, 12, 0)).unwrap();

        let projection = session.projection().unwrap();
        assert_eq!(projection.points.len(), 24);
        assert_eq!(projection.checkpoints[0].accumulated_debt, Money::from_units(48_000));
        assert_eq!(projection.checkpoints[1].accumulated_debt, Money::from_units(84_000));

        let series = session.balance_series().unwrap();
        assert_eq!(series.len(), 13);
        assert_eq!(series[12].balance, Money::from_units(-48_000));
    }

    #[test]
    fn test_invalidate_returns_to_start() {
        let mut session = Session::new();
        session.analyze_cash_flow(input(1, 0, 0));
        session.invalidate();
        assert_eq!(session.stage(), &Stage::Uninitialized);
    }

    #[test]
    fn test_ledger_survives_stage_changes() {
        use crate::ledger::{ExpenseRecord, Periodicity, TotalPayments};
        use chrono::NaiveDate;

        let mut session = Session::new();
        session.ledger_mut().add(ExpenseRecord {
            name: "Rent".to_string(),
            category: "Housing".to_string(),
            subcategory: String::new(),
            estimated_amount: Money::from_units(8_000),
            actual_amount: Money::ZERO,
            periodicity: Periodicity::Monthly,
            start_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            total_payments: TotalPayments::Indefinite,
        });
        session.analyze_cash_flow(input(1, 0, 0));
        session.invalidate();
        assert_eq!(session.ledger().len(), 1);
    }
}
