//! Diet templates and their assignment to members.

use super::mutation::run_mutation;
use super::query::{ListQuery, fetch_collection};
use super::validate::{Checks, Validate};
use crate::api::{Method, paths, send_json};
use crate::context::AppContext;
use crate::errors::{FieldError, Result};
use crate::models::{DietPlan, DietTemplate, Meal};
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument};

/// Resizes a meal list to `meals_per_day`.
///
/// Meals are ordered by number. When shrinking, the highest-numbered meals are
/// dropped; when growing, blank meals are appended. The result is always
/// numbered `1..=meals_per_day`.
#[must_use]
pub fn reconcile_meals(meals: &[Meal], meals_per_day: u32) -> Vec<Meal> {
    let mut ordered = meals.to_vec();
    ordered.sort_by_key(|meal| meal.meal_number);

    let mut reconciled: Vec<Meal> = ordered
        .into_iter()
        .take(meals_per_day as usize)
        .zip(1..)
        .map(|(meal, number)| Meal {
            meal_number: number,
            ..meal
        })
        .collect();

    let kept = u32::try_from(reconciled.len()).unwrap_or(meals_per_day);
    reconciled.extend((kept + 1..=meals_per_day).map(Meal::blank));
    reconciled
}

/// Create/edit form for a diet template
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DietTemplateForm {
    /// Template name
    pub name: String,
    /// Optional notes
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Number of meals per day
    pub meals_per_day: u32,
    /// Meals in order
    pub meals: Vec<Meal>,
}

impl DietTemplateForm {
    /// Changes the meal count and resizes the meal list to match.
    pub fn set_meals_per_day(&mut self, meals_per_day: u32) {
        self.meals = reconcile_meals(&self.meals, meals_per_day);
        self.meals_per_day = meals_per_day;
    }
}

impl From<&DietTemplate> for DietTemplateForm {
    fn from(template: &DietTemplate) -> Self {
        Self {
            name: template.name.clone(),
            description: template.description.clone().unwrap_or_default(),
            meals_per_day: template.meals_per_day,
            meals: reconcile_meals(&template.meals, template.meals_per_day),
        }
    }
}

impl Validate for DietTemplateForm {
    fn validate(&self) -> Vec<FieldError> {
        let mut checks = Checks::new();
        checks
            .required("name", &self.name, "Template name")
            .ensure(
                self.meals_per_day >= 1,
                "mealsPerDay",
                "At least one meal per day is required",
            )
            .ensure(
                self.meals.len() == self.meals_per_day as usize,
                "meals",
                "Meal list does not match meals per day",
            );
        for (i, meal) in self.meals.iter().enumerate() {
            checks
                .required(&format!("meals[{i}].title"), &meal.title, "Meal title")
                .time_of_day(&format!("meals[{i}].time"), &meal.time);
        }
        checks.finish()
    }
}

/// Diet templates of the session's gym.
#[must_use]
pub fn template_list(ctx: &AppContext) -> ListQuery<DietTemplate> {
    ListQuery::for_context(ctx, paths::DIET_TEMPLATES)
}

/// Creates a template.
#[instrument(skip_all, fields(name = %form.name))]
pub async fn create_template(ctx: &AppContext, form: &DietTemplateForm) -> Result<DietTemplate> {
    form.check()?;
    run_mutation(
        ctx,
        &[&[paths::DIET_TEMPLATES]],
        "Diet template created successfully",
        send_json(ctx.backend.as_ref(), Method::Post, paths::DIET_TEMPLATES, form),
    )
    .await
}

/// Saves edits to a template.
#[instrument(skip(ctx, form))]
pub async fn update_template(
    ctx: &AppContext,
    id: &str,
    form: &DietTemplateForm,
) -> Result<DietTemplate> {
    form.check()?;
    let path = paths::diet_template(id);
    run_mutation(
        ctx,
        &[&[paths::DIET_TEMPLATES]],
        "Diet template updated successfully",
        send_json(ctx.backend.as_ref(), Method::Put, &path, form),
    )
    .await
}

/// Deletes a template; plans already assigned from it are kept.
#[instrument(skip(ctx))]
pub async fn delete_template(ctx: &AppContext, id: &str) -> Result<()> {
    let path = paths::diet_template(id);
    run_mutation(
        ctx,
        &[&[paths::DIET_TEMPLATES]],
        "Diet template deleted successfully",
        async { ctx.backend.send(Method::Delete, &path, None).await.map(drop) },
    )
    .await
}

/// Members and dates a template is assigned for
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentForm {
    /// Members receiving the plan
    pub member_ids: Vec<String>,
    /// First day of the plan
    pub start_date: Option<NaiveDate>,
    /// Last day of the plan
    pub end_date: Option<NaiveDate>,
}

impl Validate for AssignmentForm {
    fn validate(&self) -> Vec<FieldError> {
        let mut checks = Checks::new();
        checks
            .ensure(
                !self.member_ids.is_empty(),
                "memberIds",
                "Select at least one member",
            )
            .ensure(self.start_date.is_some(), "startDate", "Start date is required")
            .ensure(self.end_date.is_some(), "endDate", "End date is required");
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            checks.date_order("endDate", start, end);
        }
        checks.finish()
    }
}

/// Creates a diet plan from `template_id` for every selected member.
#[instrument(skip(ctx, form), fields(members = form.member_ids.len()))]
pub async fn assign_template(
    ctx: &AppContext,
    template_id: &str,
    form: &AssignmentForm,
) -> Result<()> {
    form.check()?;
    let path = paths::diet_template_assign(template_id);
    let message = format!("Diet plan assigned to {} member(s)", form.member_ids.len());
    run_mutation(
        ctx,
        &[&[paths::DIET_PLANS], &[paths::MEMBERS]],
        &message,
        send_json::<_, Value>(ctx.backend.as_ref(), Method::Post, &path, form),
    )
    .await?;
    debug!("Template assigned");
    Ok(())
}

/// Diet plans assigned to one member.
pub async fn member_diet_plans(ctx: &AppContext, member_id: &str) -> Result<Vec<DietPlan>> {
    fetch_collection(ctx, &paths::member_diet_plans(member_id), &[]).await
}
