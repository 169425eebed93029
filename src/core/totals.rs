//! Derived fee totals and membership status.
//!
//! Nothing here is stored. Every value is recomputed from the fetched records
//! each time it is shown.

use crate::errors::{Error, Result};
use crate::models::{BalancePayment, Member, PaymentStatus, PtMembership};
use chrono::{Duration, NaiveDate};
use serde::Serialize;

/// Amounts closer than this are treated as equal
pub const MONEY_EPSILON: f64 = 0.005;

/// Package fee less both discounts, floored at zero.
#[must_use]
pub fn final_fee(package_fee: f64, max_discount: f64, extra_discount: f64) -> f64 {
    (package_fee - max_discount - extra_discount).max(0.0)
}

/// Sum of payment amounts
#[must_use]
pub fn total_paid(payments: &[BalancePayment]) -> f64 {
    payments.iter().map(|p| p.amount).sum()
}

/// What is still owed, floored at zero.
#[must_use]
pub fn pending_amount(final_fee: f64, paid: f64) -> f64 {
    (final_fee - paid).max(0.0)
}

/// Classifies cumulative payments against a fee.
///
/// A zero fee is never `Paid`: nothing was charged, so nothing was settled.
#[must_use]
pub fn payment_status(final_fee: f64, paid: f64) -> PaymentStatus {
    if final_fee > 0.0 && paid + MONEY_EPSILON >= final_fee {
        PaymentStatus::Paid
    } else if paid > 0.0 {
        PaymentStatus::Partial
    } else {
        PaymentStatus::Pending
    }
}

/// Checks a new or edited balance payment against the running total.
///
/// `editing` is the id of the payment being replaced, whose amount is left out
/// of the running total. Returns the amount to send.
pub fn validate_balance_payment(
    final_fee: f64,
    payments: &[BalancePayment],
    editing: Option<&str>,
    amount: f64,
) -> Result<f64> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(Error::InvalidAmount { amount });
    }

    let paid_excluding_edited: f64 = payments
        .iter()
        .filter(|p| editing != Some(p.id.as_str()))
        .map(|p| p.amount)
        .sum();

    if paid_excluding_edited + amount > final_fee + MONEY_EPSILON {
        return Err(Error::PaymentExceedsBalance {
            amount,
            max_allowed: (final_fee - paid_excluding_edited).max(0.0),
        });
    }
    Ok(amount)
}

/// Whether a membership is running, about to lapse, or over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MembershipStatus {
    /// More than the threshold left
    Active,
    /// Between zero and the threshold days left, inclusive
    ExpiringSoon,
    /// End date has passed
    Expired,
}

/// Days from `today` until `end`; negative once `end` has passed.
#[must_use]
pub fn days_remaining(end: NaiveDate, today: NaiveDate) -> i64 {
    (end - today).num_days()
}

/// Classifies a membership by the days left before `end`.
#[must_use]
pub fn membership_status(
    end: NaiveDate,
    today: NaiveDate,
    threshold_days: i64,
) -> MembershipStatus {
    let days = days_remaining(end, today);
    if days < 0 {
        MembershipStatus::Expired
    } else if days <= threshold_days {
        MembershipStatus::ExpiringSoon
    } else {
        MembershipStatus::Active
    }
}

/// Last day of a period of `days` days starting on `start` (both days included).
#[must_use]
pub fn project_end_date(start: NaiveDate, days: u32) -> NaiveDate {
    start + Duration::days(i64::from(days.max(1)) - 1)
}

/// Fee breakdown of a PT package
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PtFeeBreakdown {
    /// Package price
    pub package_fee: f64,
    /// Discount granted
    pub discount: f64,
    /// Amount owed
    pub final_fee: f64,
    /// Amount paid so far
    pub paid: f64,
    /// Amount still owed
    pub pending: f64,
    /// Classification of `paid` against `final_fee`
    pub status: PaymentStatus,
}

impl PtFeeBreakdown {
    /// Computes the breakdown from raw amounts.
    #[must_use]
    pub fn new(package_fee: f64, discount: f64, paid: f64) -> Self {
        let final_fee = final_fee(package_fee, discount, 0.0);
        Self {
            package_fee,
            discount,
            final_fee,
            paid,
            pending: pending_amount(final_fee, paid),
            status: payment_status(final_fee, paid),
        }
    }

    /// Breakdown of a stored PT membership.
    #[must_use]
    pub fn of(pt: &PtMembership) -> Self {
        Self::new(pt.package_fee, pt.discount, pt.paid_amount)
    }
}

/// Fees, payments and expiry for one member
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberFeeSummary {
    /// Amount owed for the regular package
    pub final_fee: f64,
    /// Sum of balance payments
    pub paid: f64,
    /// Amount still owed for the regular package
    pub pending: f64,
    /// Payment classification of the regular package
    pub payment_status: PaymentStatus,
    /// Days until the membership ends
    pub days_remaining: i64,
    /// Membership classification
    pub membership_status: MembershipStatus,
    /// PT package breakdowns
    pub pt: Vec<PtFeeBreakdown>,
    /// Regular plus PT amounts owed
    pub combined_final_fee: f64,
    /// Regular plus PT amounts paid
    pub combined_paid: f64,
    /// Regular plus PT amounts pending
    pub combined_pending: f64,
}

impl MemberFeeSummary {
    /// Derives the summary for `member` as of `today`.
    #[must_use]
    pub fn derive(
        member: &Member,
        payments: &[BalancePayment],
        pt_memberships: &[PtMembership],
        today: NaiveDate,
        threshold_days: i64,
    ) -> Self {
        let paid = total_paid(payments);
        let pt: Vec<PtFeeBreakdown> = pt_memberships.iter().map(PtFeeBreakdown::of).collect();
        let pt_final: f64 = pt.iter().map(|b| b.final_fee).sum();
        let pt_paid: f64 = pt.iter().map(|b| b.paid).sum();
        let pt_pending: f64 = pt.iter().map(|b| b.pending).sum();
        let pending = pending_amount(member.final_fee, paid);

        Self {
            final_fee: member.final_fee,
            paid,
            pending,
            payment_status: payment_status(member.final_fee, paid),
            days_remaining: days_remaining(member.membership_end, today),
            membership_status: membership_status(member.membership_end, today, threshold_days),
            pt,
            combined_final_fee: member.final_fee + pt_final,
            combined_paid: paid + pt_paid,
            combined_pending: pending + pt_pending,
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::models::PaymentMode;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn payment(id: &str, amount: f64) -> BalancePayment {
        BalancePayment {
            id: id.to_string(),
            member_id: "m1".to_string(),
            amount,
            payment_date: date(2026, 1, 10),
            payment_mode: PaymentMode::Cash,
            next_due_date: None,
            notes: None,
        }
    }

    #[test]
    fn test_final_fee_never_negative() {
        assert!((final_fee(10_000.0, 1_000.0, 500.0) - 8_500.0).abs() < MONEY_EPSILON);
        assert!(final_fee(1_000.0, 800.0, 500.0).abs() < MONEY_EPSILON);
    }

    #[test]
    fn test_payment_status_classification() {
        assert_eq!(payment_status(10_000.0, 10_000.0), PaymentStatus::Paid);
        assert_eq!(payment_status(10_000.0, 4_000.0), PaymentStatus::Partial);
        assert_eq!(payment_status(10_000.0, 0.0), PaymentStatus::Pending);
        assert_eq!(payment_status(0.0, 0.0), PaymentStatus::Pending);
        assert!(pending_amount(10_000.0, 12_000.0).abs() < MONEY_EPSILON);
    }

    #[test]
    fn test_payment_over_balance_reports_maximum() {
        let payments = vec![payment("p1", 5_000.0), payment("p2", 3_000.0)];
        let err = validate_balance_payment(10_000.0, &payments, None, 5_000.0).unwrap_err();
        match err {
            Error::PaymentExceedsBalance { max_allowed, .. } => {
                assert!((max_allowed - 2_000.0).abs() < MONEY_EPSILON);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(validate_balance_payment(10_000.0, &payments, None, 2_000.0).is_ok());
    }

    #[test]
    fn test_editing_excludes_the_edited_payment() {
        let payments = vec![payment("p1", 5_000.0), payment("p2", 3_000.0)];
        assert!(validate_balance_payment(10_000.0, &payments, Some("p2"), 5_000.0).is_ok());
        let err = validate_balance_payment(10_000.0, &payments, Some("p2"), 6_000.0).unwrap_err();
        assert!(err.to_string().contains("Maximum allowed amount is 5000.00"));
    }

    #[test]
    fn test_non_positive_payment_rejected() {
        assert!(matches!(
            validate_balance_payment(10_000.0, &[], None, 0.0),
            Err(Error::InvalidAmount { .. })
        ));
        assert!(matches!(
            validate_balance_payment(10_000.0, &[], None, -5.0),
            Err(Error::InvalidAmount { .. })
        ));
    }

    #[test]
    fn test_membership_status_around_threshold() {
        let today = date(2026, 3, 1);
        let threshold = 7;
        assert_eq!(
            membership_status(date(2026, 3, 7), today, threshold),
            MembershipStatus::ExpiringSoon
        );
        assert_eq!(
            membership_status(date(2026, 3, 8), today, threshold),
            MembershipStatus::ExpiringSoon
        );
        assert_eq!(
            membership_status(date(2026, 3, 9), today, threshold),
            MembershipStatus::Active
        );
        assert_eq!(membership_status(today, today, threshold), MembershipStatus::ExpiringSoon);
        assert_eq!(
            membership_status(date(2026, 2, 28), today, threshold),
            MembershipStatus::Expired
        );
    }

    #[test]
    fn test_project_end_date_is_inclusive() {
        assert_eq!(project_end_date(date(2026, 1, 1), 30), date(2026, 1, 30));
        assert_eq!(project_end_date(date(2026, 1, 1), 1), date(2026, 1, 1));
        assert_eq!(project_end_date(date(2026, 1, 1), 365), date(2026, 12, 31));
    }

    #[test]
    fn test_member_summary_combines_pt() {
        let member: Member = serde_json::from_value(serde_json::json!({
            "id": "m1",
            "gymId": "g1",
            "name": "John Smith",
            "membershipStart": "2026-01-01",
            "membershipEnd": "2026-03-31",
            "packageFee": 12000.0,
            "maxDiscount": 1000.0,
            "extraDiscount": 1000.0,
            "finalFee": 10000.0,
            "membershipType": "PT"
        }))
        .unwrap();
        let pt = PtMembership {
            id: "pt1".to_string(),
            member_id: "m1".to_string(),
            trainer_id: "t1".to_string(),
            sessions: 12,
            start_date: date(2026, 1, 1),
            end_date: date(2026, 2, 28),
            package_fee: 6_000.0,
            discount: 1_000.0,
            final_fee: 5_000.0,
            paid_amount: 2_000.0,
        };

        let summary = MemberFeeSummary::derive(
            &member,
            &[payment("p1", 4_000.0)],
            &[pt],
            date(2026, 3, 28),
            7,
        );
        assert_eq!(summary.payment_status, PaymentStatus::Partial);
        assert!((summary.pending - 6_000.0).abs() < MONEY_EPSILON);
        assert_eq!(summary.membership_status, MembershipStatus::ExpiringSoon);
        assert_eq!(summary.days_remaining, 3);
        assert!((summary.combined_final_fee - 15_000.0).abs() < MONEY_EPSILON);
        assert!((summary.combined_pending - 9_000.0).abs() < MONEY_EPSILON);
        assert_eq!(summary.pt[0].status, PaymentStatus::Partial);
    }
}
