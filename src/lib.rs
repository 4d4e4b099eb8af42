//! # Finance Diagnosis
//!
//! A two-step personal finance calculator: first find out whether monthly
//! income covers expenses, then check whether a fixed-rate loan fits that
//! budget and how unpaid shortfalls would compound if it does not. An
//! independent expense ledger tracks estimated vs. actual spending.
//!
//! ## Design Principles
//!
//! - **Fixed-point arithmetic**: 4 decimal places via `rust_decimal`
//! - **Total calculations**: zero rates and degenerate formulas fall back to
//!   straight-line repayment instead of failing
//! - **Explicit session state**: an owned [`Session`] value, no globals
//! - **Two separate projections**: compounding debt vs. linear balance
//!
//! ## Example
//!
//! ```
//! use finance_diagnosis::{IncomeExpenseInput, LoanTerms, Money, Session};
//! use rust_decimal::Decimal;
//!
//! let mut session = Session::new();
//! let input = IncomeExpenseInput::new(
//!     Money::from_units(20_000),
//!     Money::from_units(8_000),
//!     Money::from_units(5_000),
//! )
//! .unwrap();
//! let cash_flow = session.analyze_cash_flow(input);
//! assert_eq!(cash_flow.free_cash_flow, Money::from_units(7_000));
//!
//! let terms = LoanTerms::new(Money::from_units(50_000), 12, Decimal::from(35)).unwrap();
//! let loan = session.evaluate_credit(terms).unwrap();
//! assert!(loan.is_viable());
//! ```

pub mod cashflow;
pub mod error;
pub mod ledger;
pub mod loan;
pub mod money;
pub mod projection;
pub mod report;
pub mod session;

pub use cashflow::{CashFlowResult, CashFlowStatus, ExpenseBreakdown, IncomeExpenseInput};
pub use error::{FinanceError, Result};
pub use ledger::{
    ExpenseLedger, ExpenseRecord, ExpenseSubmission, LedgerEntry, LedgerTotals, Periodicity,
    TotalPayments,
};
pub use loan::{LoanResult, LoanTerms, Viability};
pub use money::Money;
pub use projection::{BalancePoint, Checkpoint, DebtProjection, DebtProjectionPoint, Horizon};
pub use session::{Session, Stage};
