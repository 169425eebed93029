//! Member management: list, create/edit with photo and ID proof, fee summary.

use super::mutation::{FollowUp, SaveOutcome, run_mutation, save_with_uploads};
use super::query::{ListQuery, fetch_collection};
use super::totals::{MONEY_EPSILON, MemberFeeSummary, final_fee};
use super::validate::{Checks, Validate};
use crate::api::{Method, Upload, paths, send_json};
use crate::context::AppContext;
use crate::errors::{FieldError, Result};
use crate::models::{BalancePayment, Member, MembershipType, PtMembership};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::instrument;

/// Create/edit form for a member
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberForm {
    /// Gym to enroll in; the session's gym is used when empty
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gym_id: Option<String>,
    /// Full name
    pub name: String,
    /// Contact phone
    pub phone: String,
    /// Contact email, optional
    #[serde(skip_serializing_if = "String::is_empty")]
    pub email: String,
    /// First day of the membership
    pub membership_start: Option<NaiveDate>,
    /// Last day of the membership
    pub membership_end: Option<NaiveDate>,
    /// Package price
    pub package_fee: f64,
    /// Standard discount
    pub max_discount: f64,
    /// Additional discount
    pub extra_discount: f64,
    /// Regular or PT
    pub membership_type: MembershipType,
}

impl MemberForm {
    /// Fee derived from the package and both discounts
    #[must_use]
    pub fn final_fee(&self) -> f64 {
        final_fee(self.package_fee, self.max_discount, self.extra_discount)
    }
}

impl From<&Member> for MemberForm {
    fn from(member: &Member) -> Self {
        Self {
            gym_id: Some(member.gym_id.clone()),
            name: member.name.clone(),
            phone: member.phone.clone(),
            email: member.email.clone().unwrap_or_default(),
            membership_start: Some(member.membership_start),
            membership_end: Some(member.membership_end),
            package_fee: member.package_fee,
            max_discount: member.max_discount,
            extra_discount: member.extra_discount,
            membership_type: member.membership_type,
        }
    }
}

impl Validate for MemberForm {
    fn validate(&self) -> Vec<FieldError> {
        let mut checks = Checks::new();
        checks
            .required("name", &self.name, "Name")
            .phone("phone", &self.phone)
            .ensure(
                self.membership_start.is_some(),
                "membershipStart",
                "Start date is required",
            )
            .ensure(
                self.membership_end.is_some(),
                "membershipEnd",
                "End date is required",
            )
            .non_negative("packageFee", self.package_fee, "Package fee")
            .non_negative("maxDiscount", self.max_discount, "Discount")
            .non_negative("extraDiscount", self.extra_discount, "Extra discount")
            .ensure(
                self.max_discount + self.extra_discount <= self.package_fee + MONEY_EPSILON,
                "extraDiscount",
                "Discounts cannot exceed the package fee",
            );
        if !self.email.trim().is_empty() {
            checks.email("email", &self.email);
        }
        if let (Some(start), Some(end)) = (self.membership_start, self.membership_end) {
            checks.date_order("membershipEnd", start, end);
        }
        checks.finish()
    }
}

/// What is sent to the backend: the form plus the derived fee
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MemberPayload<'a> {
    #[serde(flatten)]
    form: &'a MemberForm,
    #[serde(skip_serializing_if = "Option::is_none")]
    gym_id: Option<&'a str>,
    final_fee: f64,
}

impl<'a> MemberPayload<'a> {
    fn new(ctx: &'a AppContext, form: &'a MemberForm) -> Self {
        let gym_id = if form.gym_id.is_some() {
            None
        } else {
            ctx.tenant()
        };
        Self {
            form,
            gym_id,
            final_fee: form.final_fee(),
        }
    }
}

fn member_follow_ups(
    photo: Option<Upload>,
    id_proof: Option<Upload>,
) -> impl FnOnce(&Member) -> Vec<FollowUp> {
    move |member| {
        vec![
            FollowUp {
                label: "photo",
                path: paths::member_photo(&member.id),
                upload: photo,
            },
            FollowUp {
                label: "ID proof",
                path: paths::member_id_proof(&member.id),
                upload: id_proof,
            },
        ]
    }
}

/// Members of the session's gym, or of every gym for an admin.
#[must_use]
pub fn member_list(ctx: &AppContext) -> ListQuery<Member> {
    ListQuery::for_context(ctx, paths::MEMBERS)
}

/// Enrolls a member, then uploads the photo and ID proof that were picked.
#[instrument(skip_all, fields(name = %form.name))]
pub async fn create_member(
    ctx: &AppContext,
    form: &MemberForm,
    photo: Option<Upload>,
    id_proof: Option<Upload>,
) -> Result<SaveOutcome<Member>> {
    form.check()?;
    let payload = MemberPayload::new(ctx, form);
    save_with_uploads(
        ctx,
        "Member",
        &[&[paths::MEMBERS]],
        "Member created successfully",
        send_json(ctx.backend.as_ref(), Method::Post, paths::MEMBERS, &payload),
        member_follow_ups(photo, id_proof),
    )
    .await
}

/// Saves edits to a member, then uploads any replacement files.
#[instrument(skip(ctx, form, photo, id_proof))]
pub async fn update_member(
    ctx: &AppContext,
    id: &str,
    form: &MemberForm,
    photo: Option<Upload>,
    id_proof: Option<Upload>,
) -> Result<SaveOutcome<Member>> {
    form.check()?;
    let payload = MemberPayload::new(ctx, form);
    let path = paths::member(id);
    save_with_uploads(
        ctx,
        "Member",
        &[&[paths::MEMBERS]],
        "Member updated successfully",
        send_json(ctx.backend.as_ref(), Method::Put, &path, &payload),
        member_follow_ups(photo, id_proof),
    )
    .await
}

/// Deletes a member.
#[instrument(skip(ctx))]
pub async fn delete_member(ctx: &AppContext, id: &str) -> Result<()> {
    let path = paths::member(id);
    run_mutation(
        ctx,
        &[&[paths::MEMBERS], &[paths::PT_MEMBERSHIPS]],
        "Member deleted successfully",
        async { ctx.backend.send(Method::Delete, &path, None).await.map(drop) },
    )
    .await
}

/// Derives fees, payments and expiry for one member from their payments and PT packages.
#[instrument(skip_all, fields(member_id = %member.id))]
pub async fn member_summary(ctx: &AppContext, member: &Member) -> Result<MemberFeeSummary> {
    let payments: Vec<BalancePayment> =
        fetch_collection(ctx, &paths::member_balance_payments(&member.id), &[]).await?;
    let pt: Vec<PtMembership> = if member.membership_type == MembershipType::Pt {
        fetch_collection(
            ctx,
            paths::PT_MEMBERSHIPS,
            &[("memberId".to_string(), member.id.clone())],
        )
        .await?
    } else {
        Vec::new()
    };

    Ok(MemberFeeSummary::derive(
        member,
        &payments,
        &pt,
        ctx.today(),
        ctx.settings.expiring_threshold_days,
    ))
}
