//! Itemized expense ledger with estimated vs. actual amounts.
//!
//! The ledger lives for a single session. Records enter through form
//! submissions ([`ExpenseLedger::add`]) and are reconciled after free-form
//! table edits through [`ExpenseLedger::replace_all`]. Variance is derived on
//! every read and never stored.

use crate::error::Result;
use crate::money::Money;
use chrono::NaiveDate;
use csv::{ReaderBuilder, Trim};
use log::{debug, warn};
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::io::Read;
use std::num::NonZeroU32;

/// How often an expense recurs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum Periodicity {
    #[serde(alias = "once")]
    Once,
    #[serde(alias = "daily")]
    Daily,
    #[serde(alias = "weekly")]
    Weekly,
    #[serde(alias = "biweekly")]
    Biweekly,
    #[serde(alias = "monthly")]
    Monthly,
    #[serde(alias = "yearly")]
    Yearly,
}

impl fmt::Display for Periodicity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Periodicity::Once => "Once",
            Periodicity::Daily => "Daily",
            Periodicity::Weekly => "Weekly",
            Periodicity::Biweekly => "Biweekly",
            Periodicity::Monthly => "Monthly",
            Periodicity::Yearly => "Yearly",
        };
        f.write_str(label)
    }
}

/// Number of payments an expense runs for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TotalPayments {
    /// A fixed number of payments, e.g. a 12-month installment plan.
    Count(NonZeroU32),

    /// No end date, e.g. rent.
    Indefinite,
}

impl TotalPayments {
    /// Maps a form value to a payment count; `0` means indefinite.
    pub fn from_form_value(count: u32) -> Self {
        match NonZeroU32::new(count) {
            Some(n) => TotalPayments::Count(n),
            None => TotalPayments::Indefinite,
        }
    }
}

impl fmt::Display for TotalPayments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TotalPayments::Count(n) => write!(f, "{}", n),
            TotalPayments::Indefinite => f.write_str("Indefinite"),
        }
    }
}

impl<'de> Deserialize<'de> for TotalPayments {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("indefinite") {
            return Ok(TotalPayments::Indefinite);
        }
        trimmed
            .parse::<u32>()
            .map(TotalPayments::from_form_value)
            .map_err(serde::de::Error::custom)
    }
}

/// An itemized expense.
///
/// Fields are freely editable after creation; only the add path checks
/// that the name is non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpenseRecord {
    pub name: String,
    pub category: String,
    pub subcategory: String,
    pub estimated_amount: Money,

    /// What was actually paid. Zero until the user records a payment.
    pub actual_amount: Money,
    pub periodicity: Periodicity,

    /// Start date or next payment date.
    pub start_date: NaiveDate,
    pub total_payments: TotalPayments,
}

impl ExpenseRecord {
    /// `actual - estimated`. Positive means overspending.
    pub fn variance(&self) -> Money {
        self.actual_amount - self.estimated_amount
    }
}

/// An expense as entered in the add form, before it has an actual amount.
#[derive(Debug, Clone, Deserialize)]
pub struct ExpenseSubmission {
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub subcategory: String,
    pub estimated: Money,
    pub periodicity: Periodicity,
    pub start_date: NaiveDate,
    pub total_payments: TotalPayments,
}

impl From<ExpenseSubmission> for ExpenseRecord {
    fn from(form: ExpenseSubmission) -> Self {
        ExpenseRecord {
            name: form.name,
            category: form.category,
            subcategory: form.subcategory,
            estimated_amount: form.estimated,
            actual_amount: Money::ZERO,
            periodicity: form.periodicity,
            start_date: form.start_date,
            total_payments: form.total_payments,
        }
    }
}

/// A ledger row as read: the record plus its computed variance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerEntry<'a> {
    pub record: &'a ExpenseRecord,
    pub variance: Money,
}

/// Column sums over the whole ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LedgerTotals {
    pub estimated: Money,
    pub actual: Money,
    pub variance: Money,
}

/// Ordered, session-scoped collection of expense records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpenseLedger {
    records: Vec<ExpenseRecord>,
}

impl ExpenseLedger {
    pub fn new() -> Self {
        ExpenseLedger {
            records: Vec::new(),
        }
    }

    /// Appends a record when its name is non-empty.
    ///
    /// Returns `false`, leaving the ledger untouched, for an empty name.
    pub fn add(&mut self, record: ExpenseRecord) -> bool {
        if record.name.is_empty() {
            warn!("Ignoring expense without a name");
            return false;
        }

        debug!(
            "Added expense '{}' estimated at {}",
            record.name, record.estimated_amount
        );
        self.records.push(record);
        true
    }

    /// Adds form submissions read as CSV, in order.
    ///
    /// Rows that fail to parse are logged at warn level and skipped, as are
    /// rows with an empty name. Returns the number of records added.
    pub fn add_from_csv<R: Read>(&mut self, reader: R) -> Result<usize> {
        let mut csv_reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(reader);

        let mut added = 0;
        for (row_idx, result) in csv_reader.deserialize::<ExpenseSubmission>().enumerate() {
            let row_num = row_idx + 2; // 1-indexed, accounting for header row

            match result {
                Ok(submission) => {
                    if self.add(submission.into()) {
                        added += 1;
                    } else {
                        debug!("Row {}: Expense without a name skipped", row_num);
                    }
                }
                Err(e) => {
                    warn!("Row {}: CSV parse error: {}", row_num, e);
                }
            }
        }

        Ok(added)
    }

    /// Records in order, each with its variance computed now.
    pub fn list(&self) -> Vec<LedgerEntry<'_>> {
        self.records
            .iter()
            .map(|record| LedgerEntry {
                record,
                variance: record.variance(),
            })
            .collect()
    }

    /// Replaces the whole collection with the edited table state.
    ///
    /// Reordering, insertions and removals are all expressed as a full
    /// replacement; no diff is computed and no validation is applied.
    pub fn replace_all(&mut self, records: Vec<ExpenseRecord>) {
        debug!(
            "Replacing {} expense records with {}",
            self.records.len(),
            records.len()
        );
        self.records = records;
    }

    pub fn records(&self) -> &[ExpenseRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn totals(&self) -> LedgerTotals {
        self.records
            .iter()
            .fold(LedgerTotals::default(), |mut totals, record| {
                totals.estimated += record.estimated_amount;
                totals.actual += record.actual_amount;
                totals.variance += record.variance();
                totals
            })
    }
}
