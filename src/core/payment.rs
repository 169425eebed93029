//! Balance payments: installments a member pays towards their final fee.
//!
//! One member's payments are few, so they are fetched whole and searched,
//! sorted and paged locally. Every new or edited amount is checked against
//! the running total before anything is sent.

use super::mutation::run_mutation;
use super::query::fetch_collection;
use super::totals::validate_balance_payment;
use super::validate::{Checks, Validate};
use super::view::{DerivedPage, SortValue, ViewRecord, ViewState, derive_view};
use crate::api::{Method, paths, send_json};
use crate::context::AppContext;
use crate::errors::{FieldError, Result};
use crate::models::{BalancePayment, Member, PaymentMode};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::{instrument, warn};

/// Form for recording or editing one payment
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentForm {
    /// Amount received
    pub amount: f64,
    /// Date received
    pub payment_date: Option<NaiveDate>,
    /// How it was paid
    pub payment_mode: PaymentMode,
    /// When the next installment is due
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_due_date: Option<NaiveDate>,
    /// Free-form note
    #[serde(skip_serializing_if = "String::is_empty")]
    pub notes: String,
}

impl From<&BalancePayment> for PaymentForm {
    fn from(payment: &BalancePayment) -> Self {
        Self {
            amount: payment.amount,
            payment_date: Some(payment.payment_date),
            payment_mode: payment.payment_mode,
            next_due_date: payment.next_due_date,
            notes: payment.notes.clone().unwrap_or_default(),
        }
    }
}

impl Validate for PaymentForm {
    fn validate(&self) -> Vec<FieldError> {
        let mut checks = Checks::new();
        checks
            .positive("amount", self.amount, "Amount")
            .ensure(
                self.payment_date.is_some(),
                "paymentDate",
                "Payment date is required",
            );
        if let (Some(paid_on), Some(due)) = (self.payment_date, self.next_due_date) {
            checks.ensure(
                due >= paid_on,
                "nextDueDate",
                "Next due date cannot be before the payment date",
            );
        }
        checks.finish()
    }
}

impl ViewRecord for BalancePayment {
    fn search_fields(&self) -> Vec<&str> {
        self.notes.as_deref().into_iter().collect()
    }

    fn filter_value(&self, field: &str) -> Option<String> {
        match field {
            "paymentMode" => serde_json::to_value(self.payment_mode)
                .ok()
                .and_then(|v| v.as_str().map(ToString::to_string)),
            _ => None,
        }
    }

    fn sort_value(&self, column: &str) -> SortValue {
        match column {
            "amount" => SortValue::Number(self.amount),
            "paymentDate" => SortValue::Date(self.payment_date),
            "nextDueDate" => self.next_due_date.map_or(SortValue::Missing, SortValue::Date),
            _ => SortValue::Missing,
        }
    }
}

/// Every payment recorded for `member_id`.
pub async fn payment_list(ctx: &AppContext, member_id: &str) -> Result<Vec<BalancePayment>> {
    fetch_collection(ctx, &paths::member_balance_payments(member_id), &[]).await
}

/// The displayed page of a member's payments.
#[must_use]
pub fn payment_view(payments: &[BalancePayment], view: &ViewState) -> DerivedPage<BalancePayment> {
    derive_view(payments, view)
}

/// Checks the amount against the running total, reporting a rejection as a notification.
fn check_against_balance(
    ctx: &AppContext,
    member: &Member,
    payments: &[BalancePayment],
    editing: Option<&str>,
    amount: f64,
) -> Result<()> {
    validate_balance_payment(member.final_fee, payments, editing, amount)
        .map(drop)
        .inspect_err(|e| {
            warn!(member_id = %member.id, amount, "Balance payment rejected");
            ctx.notifier.error(e.display_message());
        })
}

/// Records a new payment for `member`.
#[instrument(skip_all, fields(member_id = %member.id, amount = form.amount))]
pub async fn submit_balance_payment(
    ctx: &AppContext,
    member: &Member,
    form: &PaymentForm,
) -> Result<BalancePayment> {
    form.check()?;
    let payments = payment_list(ctx, &member.id).await?;
    check_against_balance(ctx, member, &payments, None, form.amount)?;

    let path = paths::member_balance_payments(&member.id);
    run_mutation(
        ctx,
        &[&[paths::MEMBERS], &[paths::BALANCE_PAYMENTS]],
        "Payment recorded successfully",
        send_json(ctx.backend.as_ref(), Method::Post, &path, form),
    )
    .await
}

/// Replaces an existing payment of `member`.
#[instrument(skip(ctx, member, form), fields(member_id = %member.id))]
pub async fn update_balance_payment(
    ctx: &AppContext,
    member: &Member,
    payment_id: &str,
    form: &PaymentForm,
) -> Result<BalancePayment> {
    form.check()?;
    let payments = payment_list(ctx, &member.id).await?;
    check_against_balance(ctx, member, &payments, Some(payment_id), form.amount)?;

    let path = paths::balance_payment(payment_id);
    run_mutation(
        ctx,
        &[&[paths::MEMBERS], &[paths::BALANCE_PAYMENTS]],
        "Payment updated successfully",
        send_json(ctx.backend.as_ref(), Method::Put, &path, form),
    )
    .await
}

/// Deletes a payment.
#[instrument(skip(ctx))]
pub async fn delete_balance_payment(ctx: &AppContext, payment_id: &str) -> Result<()> {
    let path = paths::balance_payment(payment_id);
    run_mutation(
        ctx,
        &[&[paths::MEMBERS], &[paths::BALANCE_PAYMENTS]],
        "Payment deleted successfully",
        async { ctx.backend.send(Method::Delete, &path, None).await.map(drop) },
    )
    .await
}
