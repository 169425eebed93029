//! Personal-training membership record.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A PT package attached to a member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PtMembership {
    /// Backend identifier
    #[serde(alias = "_id")]
    pub id: String,
    /// Member receiving training
    pub member_id: String,
    /// Trainer assigned
    pub trainer_id: String,
    /// Number of sessions in the package
    pub sessions: u32,
    /// First day of the package
    pub start_date: NaiveDate,
    /// Last day of the package
    pub end_date: NaiveDate,
    /// Package price before discount
    pub package_fee: f64,
    /// Discount granted
    #[serde(default)]
    pub discount: f64,
    /// Amount owed
    pub final_fee: f64,
    /// Amount paid so far
    #[serde(default)]
    pub paid_amount: f64,
}
