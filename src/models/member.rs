//! Member record.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Whether a membership includes personal training
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MembershipType {
    /// Gym floor access only
    #[default]
    Regular,
    /// Regular membership augmented with a PT package
    Pt,
}

/// A gym member with their current membership terms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    /// Backend identifier
    #[serde(alias = "_id")]
    pub id: String,
    /// Gym the member belongs to
    pub gym_id: String,
    /// Full name
    pub name: String,
    /// Contact phone
    #[serde(default)]
    pub phone: String,
    /// Contact email
    #[serde(default)]
    pub email: Option<String>,
    /// First day of the current membership
    pub membership_start: NaiveDate,
    /// Last day of the current membership
    pub membership_end: NaiveDate,
    /// Package price before discounts
    pub package_fee: f64,
    /// Standard discount allowed on the package
    #[serde(default)]
    pub max_discount: f64,
    /// Additional discount granted at signup
    #[serde(default)]
    pub extra_discount: f64,
    /// Amount the member owes for the package
    pub final_fee: f64,
    /// Regular or PT-augmented
    #[serde(default)]
    pub membership_type: MembershipType,
    /// Whether the member is active
    #[serde(default)]
    pub is_active: bool,
    /// Photo asset location
    #[serde(default)]
    pub photo_url: Option<String>,
}
