//! Wire records mirrored from the REST backend.
//!
//! The backend owns every one of these. The client only holds cached copies, so
//! the types carry no invariants beyond what deserialization enforces. Legacy field
//! names are folded into one canonical field here, at the boundary, so the rest of
//! the crate never branches on schema drift.

pub mod diet;
pub mod expense;
pub mod gym;
pub mod member;
pub mod pagination;
pub mod payment;
pub mod pt_membership;
pub mod session;
pub mod subscription;

pub use diet::{DietPlan, DietTemplate, Meal};
pub use expense::{ExpenseKind, ExpenseRow, ExpenseReportRow, SalaryRow};
pub use gym::Gym;
pub use member::{Member, MembershipType};
pub use pagination::{Page, Pagination};
pub use payment::{BalancePayment, PaymentMode, PaymentStatus};
pub use pt_membership::PtMembership;
pub use session::{AuthSession, Role};
pub use subscription::{RenewalType, SubscriptionHistory, SubscriptionPlan};
