//! Form validation.
//!
//! Forms implement [`Validate`] by collecting [`FieldError`]s with the helpers
//! below. Problems are reported per field and shown inline. A form with any
//! problem is never submitted.

use crate::errors::{Error, FieldError, Result};
use chrono::{NaiveDate, NaiveTime};

/// A form that can check itself before submission
pub trait Validate {
    /// Every problem with the current input, empty when the form can be submitted
    fn validate(&self) -> Vec<FieldError>;

    /// `Ok` when valid, otherwise `Error::Validation` with every problem
    fn check(&self) -> Result<()> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation { errors })
        }
    }
}

/// Collects field errors for one form
#[derive(Debug, Default)]
pub struct Checks {
    errors: Vec<FieldError>,
}

impl Checks {
    /// Starts an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a problem when `ok` is false.
    pub fn ensure(&mut self, ok: bool, field: &str, message: &str) -> &mut Self {
        if !ok {
            self.errors.push(FieldError::new(field, message));
        }
        self
    }

    /// Text must contain something other than whitespace.
    pub fn required(&mut self, field: &str, value: &str, label: &str) -> &mut Self {
        let ok = !value.trim().is_empty();
        self.ensure(ok, field, &format!("{label} is required"))
    }

    /// Optional reference must be present and non-blank.
    pub fn required_ref(&mut self, field: &str, value: Option<&str>, label: &str) -> &mut Self {
        let ok = value.is_some_and(|v| !v.trim().is_empty());
        self.ensure(ok, field, &format!("{label} is required"))
    }

    /// Amount must be finite and at least zero.
    pub fn non_negative(&mut self, field: &str, value: f64, label: &str) -> &mut Self {
        let ok = value.is_finite() && value >= 0.0;
        self.ensure(ok, field, &format!("{label} cannot be negative"))
    }

    /// Amount must be finite and greater than zero.
    pub fn positive(&mut self, field: &str, value: f64, label: &str) -> &mut Self {
        let ok = value.is_finite() && value > 0.0;
        self.ensure(ok, field, &format!("{label} must be greater than zero"))
    }

    /// Phone must have 10 to 15 digits once spaces, dashes and a leading `+` are removed.
    pub fn phone(&mut self, field: &str, value: &str) -> &mut Self {
        let ok = is_valid_phone(value);
        self.ensure(ok, field, "Phone must have 10 to 15 digits")
    }

    /// Email must look like `name@domain.tld`.
    pub fn email(&mut self, field: &str, value: &str) -> &mut Self {
        let ok = is_valid_email(value);
        self.ensure(ok, field, "Email is invalid")
    }

    /// Time must be `HH:MM` on a 24-hour clock.
    pub fn time_of_day(&mut self, field: &str, value: &str) -> &mut Self {
        let ok = NaiveTime::parse_from_str(value.trim(), "%H:%M").is_ok();
        self.ensure(ok, field, "Time must be in HH:MM format")
    }

    /// `end` must not be before `start`.
    pub fn date_order(&mut self, field: &str, start: NaiveDate, end: NaiveDate) -> &mut Self {
        self.ensure(end >= start, field, "End date cannot be before start date")
    }

    /// The collected problems
    #[must_use]
    pub fn finish(&mut self) -> Vec<FieldError> {
        std::mem::take(&mut self.errors)
    }
}

/// Phone check shared by every contact form
#[must_use]
pub fn is_valid_phone(value: &str) -> bool {
    let trimmed = value.trim();
    let body = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let digits: String = body.chars().filter(|c| !matches!(c, ' ' | '-')).collect();
    (10..=15).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit())
}

/// Email check shared by every contact form
#[must_use]
pub fn is_valid_email(value: &str) -> bool {
    let value = value.trim();
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !value.contains(char::is_whitespace)
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
}
