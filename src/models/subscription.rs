//! Subscription plans and the per-gym renewal history.

use super::payment::PaymentStatus;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A plan a gym can subscribe to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionPlan {
    /// Backend identifier
    #[serde(alias = "_id")]
    pub id: String,
    /// Plan name
    pub name: String,
    /// Price for one period
    pub price: f64,
    /// Length of one period in days
    pub duration_days: u32,
    /// Whether the plan can still be chosen
    #[serde(default)]
    pub is_active: bool,
}

/// Kind of renewal event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RenewalType {
    /// First subscription
    New,
    /// Same plan, or a plan at the same price, extended
    Renewal,
    /// Moved to a more expensive plan
    Upgrade,
    /// Moved to a cheaper plan
    Downgrade,
}

/// One append-only renewal event for a gym
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionHistory {
    /// Backend identifier
    #[serde(alias = "_id")]
    pub id: String,
    /// Gym that renewed
    pub gym_id: String,
    /// Plan chosen
    pub plan_id: String,
    /// Plan name at the time of renewal
    #[serde(default)]
    pub plan_name: Option<String>,
    /// What kind of change this was
    pub renewal_type: RenewalType,
    /// Plan price
    pub amount: f64,
    /// Discount granted
    #[serde(default)]
    pub discount: f64,
    /// Amount charged
    pub final_amount: f64,
    /// Payment state at the time of renewal
    pub payment_status: PaymentStatus,
    /// First day covered
    pub start_date: NaiveDate,
    /// Last day covered
    pub end_date: NaiveDate,
}
