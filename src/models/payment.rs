//! Balance payment record and payment classification.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a payment was made
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMode {
    /// Cash at the front desk
    #[default]
    Cash,
    /// UPI transfer
    Upi,
    /// Debit or credit card
    Card,
    /// Bank transfer
    BankTransfer,
}

/// Derived classification of cumulative payments against a fee
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    /// Fully paid
    Paid,
    /// Something paid, something pending
    Partial,
    /// Nothing paid yet
    Pending,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Paid => "PAID",
            Self::Partial => "PARTIAL",
            Self::Pending => "PENDING",
        };
        f.write_str(label)
    }
}

/// One installment paid towards a member's final fee
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalancePayment {
    /// Backend identifier
    #[serde(alias = "_id")]
    pub id: String,
    /// Member the payment belongs to
    pub member_id: String,
    /// Amount paid
    pub amount: f64,
    /// Date the payment was received
    pub payment_date: NaiveDate,
    /// How it was paid
    #[serde(default)]
    pub payment_mode: PaymentMode,
    /// When the next installment is expected
    #[serde(default)]
    pub next_due_date: Option<NaiveDate>,
    /// Free-form note
    #[serde(default)]
    pub notes: Option<String>,
}
