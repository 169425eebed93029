//! Gym subscription plans, renewals, and the renewal history.

use super::mutation::run_mutation;
use super::query::{ListQuery, fetch_collection};
use super::totals::{MONEY_EPSILON, project_end_date};
use super::validate::{Checks, Validate};
use crate::api::{Method, paths, send_json};
use crate::context::AppContext;
use crate::errors::{Error, FieldError, Result};
use crate::models::{Gym, PaymentStatus, RenewalType, SubscriptionHistory, SubscriptionPlan};
use chrono::{Duration, NaiveDate};
use serde::Serialize;
use tracing::{info, instrument};

/// Plans a gym can choose from.
pub async fn plan_list(ctx: &AppContext) -> Result<Vec<SubscriptionPlan>> {
    fetch_collection(ctx, paths::SUBSCRIPTION_PLANS, &[]).await
}

/// Renewal events of one gym, newest first.
#[must_use]
pub fn subscription_history(ctx: &AppContext, gym_id: &str) -> ListQuery<SubscriptionHistory> {
    let mut list = ListQuery::new(
        paths::gym_subscription_history(gym_id),
        ctx.settings.default_page_size,
    );
    list.view_mut().toggle_sort("startDate");
    list.view_mut().toggle_sort("startDate");
    list
}

/// Kind of change from `current` to `selected`.
#[must_use]
pub fn derive_renewal(
    current: Option<&SubscriptionPlan>,
    selected: &SubscriptionPlan,
) -> RenewalType {
    let Some(current) = current else {
        return RenewalType::New;
    };
    if current.id == selected.id || (selected.price - current.price).abs() < MONEY_EPSILON {
        RenewalType::Renewal
    } else if selected.price > current.price {
        RenewalType::Upgrade
    } else {
        RenewalType::Downgrade
    }
}

/// First day of the renewed period: the day after a still-running
/// subscription ends, otherwise today.
#[must_use]
pub fn renewal_start(current_end: Option<NaiveDate>, today: NaiveDate) -> NaiveDate {
    match current_end {
        Some(end) if end > today => end + Duration::days(1),
        _ => today,
    }
}

/// Operator input for a renewal
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenewalForm {
    /// Discount on the plan price
    pub discount: f64,
    /// Payment state to record; paid when left unset
    pub payment_status: Option<PaymentStatus>,
}

impl Validate for RenewalForm {
    fn validate(&self) -> Vec<FieldError> {
        Checks::new()
            .non_negative("discount", self.discount, "Discount")
            .finish()
    }
}

/// Body of a renewal request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenewalRequest {
    /// Gym renewing
    pub gym_id: String,
    /// Plan chosen
    pub plan_id: String,
    /// Derived kind of change
    pub renewal_type: RenewalType,
    /// Plan price
    pub amount: f64,
    /// Discount granted
    pub discount: f64,
    /// Amount charged
    pub final_amount: f64,
    /// Payment state
    pub payment_status: PaymentStatus,
    /// First day covered
    pub start_date: NaiveDate,
    /// Last day covered
    pub end_date: NaiveDate,
}

impl RenewalRequest {
    /// Derives the request for moving `gym` onto `selected` as of `today`.
    pub fn derive(
        gym: &Gym,
        current: Option<&SubscriptionPlan>,
        selected: &SubscriptionPlan,
        form: &RenewalForm,
        today: NaiveDate,
    ) -> Result<Self> {
        form.check()?;
        let amount = selected.price;
        if form.discount > amount + MONEY_EPSILON {
            return Err(Error::validation(
                "discount",
                "Discount cannot exceed the plan amount",
            ));
        }

        let start_date = renewal_start(gym.subscription_end_date, today);
        Ok(Self {
            gym_id: gym.id.clone(),
            plan_id: selected.id.clone(),
            renewal_type: derive_renewal(current, selected),
            amount,
            discount: form.discount,
            final_amount: (amount - form.discount).max(0.0),
            payment_status: form.payment_status.unwrap_or(PaymentStatus::Paid),
            start_date,
            end_date: project_end_date(start_date, selected.duration_days),
        })
    }
}

/// Renews or changes the subscription of `gym`.
#[instrument(skip_all, fields(gym_id = %gym.id, plan_id = %selected.id))]
pub async fn renew_subscription(
    ctx: &AppContext,
    gym: &Gym,
    current: Option<&SubscriptionPlan>,
    selected: &SubscriptionPlan,
    form: &RenewalForm,
) -> Result<SubscriptionHistory> {
    let request = RenewalRequest::derive(gym, current, selected, form, ctx.today())?;
    info!(
        renewal_type = ?request.renewal_type,
        start = %request.start_date,
        end = %request.end_date,
        "Renewing subscription"
    );

    let path = paths::gym_renew(&gym.id);
    run_mutation(
        ctx,
        &[&[paths::GYMS]],
        "Subscription renewed successfully",
        send_json(ctx.backend.as_ref(), Method::Post, &path, &request),
    )
    .await
}
