//! Core client logic, independent of any UI toolkit.
//!
//! Generic machinery (cache, list queries, views, debounce, mutations,
//! validation, totals) sits next to one module per entity that composes it
//! into the operations a screen performs.

pub mod cache;
pub mod debounce;
pub mod mutation;
pub mod notify;
pub mod query;
pub mod search;
pub mod session;
pub mod totals;
pub mod validate;
pub mod view;

pub mod diet;
pub mod expense;
pub mod gym;
pub mod member;
pub mod payment;
pub mod pt_membership;
pub mod subscription;

pub use cache::{QueryCache, QueryKey};
pub use debounce::Debouncer;
pub use mutation::{
    FollowUp, FormDialog, SaveOutcome, UploadStatus, run_mutation, save_with_uploads,
};
pub use notify::{Notification, NotificationLevel, Notifier};
pub use query::{ListParams, ListQuery, fetch_collection};
pub use search::SearchBox;
pub use session::AuthStore;
pub use totals::{MemberFeeSummary, MembershipStatus, PtFeeBreakdown};
pub use validate::{Checks, Validate};
pub use view::{
    DerivedPage, SortDirection, SortState, SortValue, ViewRecord, ViewState, derive_view,
};
