//! Unified error type for gymdesk.
//!
//! Every failure in the crate degrades to one of these variants. The UI never
//! crashes on them: it shows [`Error::display_message`] as a notification, or the
//! field errors inline, and leaves the screen in a retryable state.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// A single validation problem, optionally tied to a form field.
///
/// The same shape is used for client-side validation and for the
/// `{errors:[{field?, message}]}` payload returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Field name as the form knows it, `None` for form-level problems
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// Human-readable description of the problem
    pub message: String,
}

impl FieldError {
    /// Creates an error bound to a specific field.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: Some(field.into()),
            message: message.into(),
        }
    }

    /// Creates an error that is not bound to any field.
    pub fn form(message: impl Into<String>) -> Self {
        Self {
            field: None,
            message: message.into(),
        }
    }
}

/// Joins field errors into a single line: `field: message; other: message`.
#[must_use]
pub fn flatten_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| match &e.field {
            Some(field) => format!("{field}: {}", e.message),
            None => e.message.clone(),
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors produced by gymdesk operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read or is invalid
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the problem
        message: String,
    },

    /// Durable client storage failed
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Network-level failure talking to the backend
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status
    #[error("{message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Flattened message from the error payload
        message: String,
    },

    /// Input failed validation before submission
    #[error("{}", flatten_field_errors(.errors))]
    Validation {
        /// All problems found, in form order
        errors: Vec<FieldError>,
    },

    /// An amount was zero, negative, or not finite where that is not allowed
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected amount
        amount: f64,
    },

    /// A balance payment would push the running total above the final fee
    #[error(
        "Payment of {amount:.2} exceeds the pending balance. Maximum allowed amount is {max_allowed:.2}"
    )]
    PaymentExceedsBalance {
        /// The amount the user tried to pay
        amount: f64,
        /// The largest amount that would still be accepted
        max_allowed: f64,
    },

    /// A referenced record does not exist
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of record
        entity: &'static str,
        /// Identifier that was looked up
        id: String,
    },

    /// A paginated collection returned fewer rows than the total it reported
    #[error("Could only load {fetched} of {total} records from {path}")]
    IncompleteCollection {
        /// Collection endpoint
        path: String,
        /// Rows received across all pages
        fetched: u64,
        /// Total the server reported
        total: u64,
    },

    /// A payload could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Local I/O failure (reading config files, upload sources)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An error shared between several callers of one deduplicated fetch
    #[error("{0}")]
    Shared(Arc<Error>),
}

impl Error {
    /// Builds a validation error from a single message.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            errors: vec![FieldError::new(field, message)],
        }
    }

    /// The one-line message shown to the user in a notification.
    #[must_use]
    pub fn display_message(&self) -> String {
        match self {
            Self::Shared(inner) => inner.display_message(),
            Self::Http(e) if e.is_timeout() => "The server took too long to respond".to_string(),
            Self::Http(e) if e.is_connect() => "Unable to reach the server".to_string(),
            other => other.to_string(),
        }
    }

    /// Field-level problems carried by this error, empty for other kinds.
    #[must_use]
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            Self::Validation { errors } => errors,
            Self::Shared(inner) => inner.field_errors(),
            _ => &[],
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flatten_field_errors_mixes_field_and_form_level() {
        let errors = vec![
            FieldError::new("phone", "Phone must have 10 digits"),
            FieldError::form("Discount cannot exceed the package fee"),
        ];
        assert_eq!(
            flatten_field_errors(&errors),
            "phone: Phone must have 10 digits; Discount cannot exceed the package fee"
        );
    }

    #[test]
    fn test_payment_error_names_the_maximum() {
        let err = Error::PaymentExceedsBalance {
            amount: 5000.0,
            max_allowed: 2000.0,
        };
        assert!(err.display_message().contains("Maximum allowed amount is 2000.00"));
    }

    #[test]
    fn test_shared_error_unwraps_for_display() {
        let inner = Error::Api {
            status: 500,
            message: "Database unavailable".to_string(),
        };
        let shared = Error::Shared(Arc::new(inner));
        assert_eq!(shared.display_message(), "Database unavailable");
    }
}
