//! Personal-training packages attached to members.

use super::mutation::run_mutation;
use super::query::ListQuery;
use super::totals::{MONEY_EPSILON, PtFeeBreakdown};
use super::validate::{Checks, Validate};
use crate::api::{Method, paths, send_json};
use crate::context::AppContext;
use crate::errors::{FieldError, Result};
use crate::models::PtMembership;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::instrument;

/// PT packages, optionally narrowed to one member.
#[must_use]
pub fn pt_membership_list(ctx: &AppContext, member_id: Option<&str>) -> ListQuery<PtMembership> {
    let list = ListQuery::for_context(ctx, paths::PT_MEMBERSHIPS);
    match member_id {
        Some(id) => list.with_scope("memberId", id),
        None => list,
    }
}

/// Form for selling a PT package
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PtMembershipForm {
    /// Member receiving training
    pub member_id: String,
    /// Trainer assigned
    pub trainer_id: String,
    /// Sessions in the package
    pub sessions: u32,
    /// First day
    pub start_date: Option<NaiveDate>,
    /// Last day
    pub end_date: Option<NaiveDate>,
    /// Package price
    pub package_fee: f64,
    /// Discount granted
    pub discount: f64,
    /// Paid up front
    pub paid_amount: f64,
}

impl PtMembershipForm {
    /// Fee breakdown for the current input
    #[must_use]
    pub fn breakdown(&self) -> PtFeeBreakdown {
        PtFeeBreakdown::new(self.package_fee, self.discount, self.paid_amount)
    }
}

impl Validate for PtMembershipForm {
    fn validate(&self) -> Vec<FieldError> {
        let final_fee = self.breakdown().final_fee;
        let mut checks = Checks::new();
        checks
            .required("memberId", &self.member_id, "Member")
            .required("trainerId", &self.trainer_id, "Trainer")
            .ensure(self.sessions > 0, "sessions", "At least one session is required")
            .ensure(self.start_date.is_some(), "startDate", "Start date is required")
            .ensure(self.end_date.is_some(), "endDate", "End date is required")
            .non_negative("packageFee", self.package_fee, "Package fee")
            .non_negative("discount", self.discount, "Discount")
            .ensure(
                self.discount <= self.package_fee + MONEY_EPSILON,
                "discount",
                "Discount cannot exceed the package fee",
            )
            .non_negative("paidAmount", self.paid_amount, "Paid amount")
            .ensure(
                self.paid_amount <= final_fee + MONEY_EPSILON,
                "paidAmount",
                "Paid amount cannot exceed the final fee",
            );
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            checks.date_order("endDate", start, end);
        }
        checks.finish()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PtMembershipPayload<'a> {
    #[serde(flatten)]
    form: &'a PtMembershipForm,
    final_fee: f64,
}

/// Sells a PT package.
#[instrument(skip_all, fields(member_id = %form.member_id))]
pub async fn create_pt_membership(
    ctx: &AppContext,
    form: &PtMembershipForm,
) -> Result<PtMembership> {
    form.check()?;
    let payload = PtMembershipPayload {
        form,
        final_fee: form.breakdown().final_fee,
    };
    run_mutation(
        ctx,
        &[&[paths::PT_MEMBERSHIPS], &[paths::MEMBERS]],
        "PT membership created successfully",
        send_json(ctx.backend.as_ref(), Method::Post, paths::PT_MEMBERSHIPS, &payload),
    )
    .await
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::models::PaymentStatus;
    use crate::test_utils::{FakeBackend, test_context};
    use serde_json::json;

    fn form() -> PtMembershipForm {
        PtMembershipForm {
            member_id: "m1".to_string(),
            trainer_id: "t1".to_string(),
            sessions: 12,
            start_date: NaiveDate::from_ymd_opt(2026, 3, 1),
            end_date: NaiveDate::from_ymd_opt(2026, 5, 31),
            package_fee: 6_000.0,
            discount: 500.0,
            paid_amount: 2_000.0,
        }
    }

    #[test]
    fn test_breakdown() {
        let breakdown = form().breakdown();
        assert!((breakdown.final_fee - 5_500.0).abs() < MONEY_EPSILON);
        assert!((breakdown.pending - 3_500.0).abs() < MONEY_EPSILON);
        assert_eq!(breakdown.status, PaymentStatus::Partial);
    }

    #[test]
    fn test_overpayment_rejected() {
        let mut form = form();
        form.paid_amount = 6_000.0;
        let errors = form.validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field.as_deref(), Some("paidAmount"));
    }

    #[tokio::test]
    async fn test_create_sends_final_fee_and_lists_by_member() {
        let backend = FakeBackend::new();
        let (ctx, _rx) = test_context(backend.clone());

        let created = create_pt_membership(&ctx, &form()).await.unwrap();
        assert!((created.final_fee - 5_500.0).abs() < MONEY_EPSILON);
        assert_eq!(backend.last_body("POST pt-memberships").unwrap()["finalFee"], json!(5_500.0));

        let mut mine = pt_membership_list(&ctx, Some("m1"));
        mine.refresh(&ctx).await.unwrap();
        assert_eq!(mine.items().len(), 1);

        let mut theirs = pt_membership_list(&ctx, Some("m2"));
        theirs.refresh(&ctx).await.unwrap();
        assert!(theirs.items().is_empty());
    }
}
