//! Gym record.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A gym (tenant) as the backend describes it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "GymRecord")]
pub struct Gym {
    /// Backend identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Street address
    pub address: String,
    /// City
    pub city: String,
    /// State or region
    pub state: String,
    /// Postal code
    pub pincode: String,
    /// Contact phone
    pub phone: String,
    /// Contact email
    pub email: String,
    /// Current subscription plan, a denormalized pointer updated on renewal
    pub subscription_plan_id: Option<String>,
    /// Last day covered by the current subscription
    pub subscription_end_date: Option<NaiveDate>,
    /// Assigned owner, if any
    pub owner_id: Option<String>,
    /// Whether the gym is active
    pub is_active: bool,
    /// Logo asset location
    pub logo_url: Option<String>,
}

/// Raw wire shape; the logo shows up as `logoUrl` or the older `logo`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GymRecord {
    #[serde(alias = "_id")]
    id: String,
    name: String,
    #[serde(default)]
    address: String,
    #[serde(default)]
    city: String,
    #[serde(default)]
    state: String,
    #[serde(default)]
    pincode: String,
    #[serde(default)]
    phone: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    subscription_plan_id: Option<String>,
    #[serde(default)]
    subscription_end_date: Option<NaiveDate>,
    #[serde(default)]
    owner_id: Option<String>,
    #[serde(default = "active_by_default")]
    is_active: bool,
    #[serde(default)]
    logo_url: Option<String>,
    #[serde(default)]
    logo: Option<String>,
}

const fn active_by_default() -> bool {
    true
}

impl From<GymRecord> for Gym {
    fn from(raw: GymRecord) -> Self {
        Self {
            id: raw.id,
            name: raw.name,
            address: raw.address,
            city: raw.city,
            state: raw.state,
            pincode: raw.pincode,
            phone: raw.phone,
            email: raw.email,
            subscription_plan_id: raw.subscription_plan_id,
            subscription_end_date: raw.subscription_end_date,
            owner_id: raw.owner_id,
            is_active: raw.is_active,
            logo_url: raw.logo_url.or(raw.logo).filter(|url| !url.is_empty()),
        }
    }
}
