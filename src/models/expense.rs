//! Expense report rows: expenses and salary settlements merged into one list.

use super::payment::PaymentMode;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Discriminator used for filtering the report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExpenseKind {
    /// Operating expense
    Expense,
    /// Staff salary settlement
    Salary,
}

impl ExpenseKind {
    /// Value used for the `type` query parameter
    #[must_use]
    pub const fn as_param(self) -> &'static str {
        match self {
            Self::Expense => "EXPENSE",
            Self::Salary => "SALARY",
        }
    }
}

/// An operating expense
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseRow {
    /// Backend identifier
    #[serde(alias = "_id")]
    pub id: String,
    /// Date the expense was incurred
    pub date: NaiveDate,
    /// Category ("Rent", "Equipment")
    pub category: String,
    /// Details
    #[serde(default)]
    pub description: String,
    /// Amount spent
    pub amount: f64,
    /// How it was paid
    #[serde(default)]
    pub payment_mode: PaymentMode,
}

/// A salary settled to a staff member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "SalaryRecord")]
pub struct SalaryRow {
    /// Backend identifier
    pub id: String,
    /// Settlement date
    pub date: NaiveDate,
    /// Staff member paid
    pub staff_name: String,
    /// Staff designation
    pub designation: Option<String>,
    /// Amount settled
    pub amount: f64,
}

/// Raw salary shape; older rows carry `designationName` instead of `designation`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SalaryRecord {
    #[serde(alias = "_id")]
    id: String,
    date: NaiveDate,
    staff_name: String,
    #[serde(default)]
    designation: Option<String>,
    #[serde(default)]
    designation_name: Option<String>,
    amount: f64,
}

impl From<SalaryRecord> for SalaryRow {
    fn from(raw: SalaryRecord) -> Self {
        Self {
            id: raw.id,
            date: raw.date,
            staff_name: raw.staff_name,
            designation: raw.designation.or(raw.designation_name),
            amount: raw.amount,
        }
    }
}

/// One row of the merged expense report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExpenseReportRow {
    /// Operating expense row
    Expense(ExpenseRow),
    /// Salary settlement row
    Salary(SalaryRow),
}

impl ExpenseReportRow {
    /// Which source the row came from
    #[must_use]
    pub const fn kind(&self) -> ExpenseKind {
        match self {
            Self::Expense(_) => ExpenseKind::Expense,
            Self::Salary(_) => ExpenseKind::Salary,
        }
    }

    /// Amount regardless of kind
    #[must_use]
    pub fn amount(&self) -> f64 {
        match self {
            Self::Expense(row) => row.amount,
            Self::Salary(row) => row.amount,
        }
    }
}
