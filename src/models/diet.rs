//! Diet templates, their meals, and per-member diet plans.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One meal slot in a day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meal {
    /// Position in the day, 1-based
    pub meal_number: u32,
    /// Short title ("Breakfast")
    pub title: String,
    /// Time of day as `HH:MM`
    pub time: String,
    /// What to eat
    #[serde(default)]
    pub description: String,
}

impl Meal {
    /// Blank meal used when a template grows
    #[must_use]
    pub fn blank(meal_number: u32) -> Self {
        Self {
            meal_number,
            title: format!("Meal {meal_number}"),
            time: String::new(),
            description: String::new(),
        }
    }
}

/// A named, ordered list of meals that can be assigned to members
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DietTemplate {
    /// Backend identifier
    #[serde(alias = "_id")]
    pub id: String,
    /// Template name
    pub name: String,
    /// Optional notes
    #[serde(default)]
    pub description: Option<String>,
    /// Number of meals per day
    pub meals_per_day: u32,
    /// Meals in order
    #[serde(default)]
    pub meals: Vec<Meal>,
}

/// A template instantiated for one member over a date range
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DietPlan {
    /// Backend identifier
    #[serde(alias = "_id")]
    pub id: String,
    /// Member following the plan
    pub member_id: String,
    /// Template it was created from
    pub template_id: String,
    /// First day of the plan
    pub start_date: NaiveDate,
    /// Last day of the plan
    pub end_date: NaiveDate,
    /// Meals copied from the template
    #[serde(default)]
    pub meals: Vec<Meal>,
}
