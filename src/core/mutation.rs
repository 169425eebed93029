//! Form submission and mutations.
//!
//! A mutation either succeeds, in which case the affected cache prefixes are
//! invalidated and a success notification is emitted, or it fails, in which case
//! the flattened error is emitted and returned. Nothing is retried, queued, or
//! applied optimistically.
//!
//! Multi-step saves (create, then upload a file for the new record) run their
//! follow-up uploads only after the primary write succeeded. An upload failure
//! never undoes the primary write; it downgrades the success notification to a
//! warning.

use super::validate::Validate;
use crate::api::Upload;
use crate::context::AppContext;
use crate::errors::{Error, FieldError, Result};
use std::future::Future;
use tracing::{debug, instrument, warn};

/// Runs a mutation request and applies the success or failure side effects.
pub async fn run_mutation<T, Fut>(
    ctx: &AppContext,
    invalidates: &[&[&str]],
    success_message: &str,
    request: Fut,
) -> Result<T>
where
    Fut: Future<Output = Result<T>>,
{
    match request.await {
        Ok(value) => {
            invalidate_all(ctx, invalidates).await;
            ctx.notifier.success(success_message);
            Ok(value)
        }
        Err(e) => {
            ctx.notifier.error(e.display_message());
            Err(e)
        }
    }
}

async fn invalidate_all(ctx: &AppContext, prefixes: &[&[&str]]) {
    for prefix in prefixes {
        ctx.cache.invalidate(prefix).await;
    }
}

/// Result of one follow-up upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadStatus {
    /// No file was selected
    NotRequested,
    /// The file was stored
    Uploaded,
    /// The file was not stored; the primary record was kept
    Failed(String),
}

/// A file to upload once the primary record exists
#[derive(Debug, Clone)]
pub struct FollowUp {
    /// What the file is, for messages ("logo", "photo")
    pub label: &'static str,
    /// Endpoint keyed by the saved record's id
    pub path: String,
    /// The selected file, `None` when nothing was picked
    pub upload: Option<Upload>,
}

/// A saved record plus the status of each follow-up upload, in order
#[derive(Debug, Clone, PartialEq)]
pub struct SaveOutcome<T> {
    /// The record as returned by the primary write
    pub entity: T,
    /// One status per follow-up
    pub uploads: Vec<UploadStatus>,
}

impl<T> SaveOutcome<T> {
    /// True when no selected file failed to upload
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self
            .uploads
            .iter()
            .any(|status| matches!(status, UploadStatus::Failed(_)))
    }
}

/// Saves a record, then uploads its files.
///
/// `entity_label` names the record in messages ("Gym"). `follow_ups` receives
/// the saved record and returns the uploads to run for it.
#[instrument(skip_all, fields(entity = entity_label))]
pub async fn save_with_uploads<T, Fut, F>(
    ctx: &AppContext,
    entity_label: &str,
    invalidates: &[&[&str]],
    success_message: &str,
    primary: Fut,
    follow_ups: F,
) -> Result<SaveOutcome<T>>
where
    Fut: Future<Output = Result<T>>,
    F: FnOnce(&T) -> Vec<FollowUp>,
{
    let entity = match primary.await {
        Ok(entity) => entity,
        Err(e) => {
            ctx.notifier.error(e.display_message());
            return Err(e);
        }
    };

    let mut uploads = Vec::new();
    let mut failures = Vec::new();
    for follow_up in follow_ups(&entity) {
        let Some(upload) = follow_up.upload else {
            uploads.push(UploadStatus::NotRequested);
            continue;
        };
        match ctx.backend.upload(&follow_up.path, upload).await {
            Ok(_) => {
                debug!(upload = follow_up.label, "Follow-up upload stored");
                uploads.push(UploadStatus::Uploaded);
            }
            Err(e) => {
                let message = e.display_message();
                warn!(upload = follow_up.label, %message, "Follow-up upload failed");
                failures.push(format!("{} upload failed: {message}", follow_up.label));
                uploads.push(UploadStatus::Failed(message));
            }
        }
    }

    invalidate_all(ctx, invalidates).await;
    if failures.is_empty() {
        ctx.notifier.success(success_message);
    } else {
        ctx.notifier
            .warning(format!("{entity_label} saved but {}", failures.join("; ")));
    }

    Ok(SaveOutcome { entity, uploads })
}

/// A form shown in a modal dialog
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FormDialog<F> {
    /// Whether the dialog is showing
    pub open: bool,
    /// Current input
    pub form: F,
    /// Inline problems from the last submission attempt
    pub field_errors: Vec<FieldError>,
}

impl<F: Default + Clone + Validate> FormDialog<F> {
    /// Closed dialog with an empty form.
    #[must_use]
    pub fn new() -> Self {
        Self {
            open: false,
            form: F::default(),
            field_errors: Vec::new(),
        }
    }

    /// Opens the dialog with an empty form (create).
    pub fn open_blank(&mut self) {
        self.open_with(F::default());
    }

    /// Opens the dialog pre-filled (edit).
    pub fn open_with(&mut self, form: F) {
        self.form = form;
        self.field_errors.clear();
        self.open = true;
    }

    /// Closes the dialog and discards input.
    pub fn close(&mut self) {
        self.open = false;
        self.form = F::default();
        self.field_errors.clear();
    }

    /// Validates, then submits a copy of the form.
    ///
    /// Validation problems are kept inline and block the submission with no
    /// notification. On success the dialog resets and closes. On failure the
    /// input stays so the user can correct it and resubmit.
    pub async fn submit<T, Fut, S>(&mut self, send: S) -> Result<T>
    where
        S: FnOnce(F) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let errors = self.form.validate();
        if !errors.is_empty() {
            self.field_errors.clone_from(&errors);
            return Err(Error::Validation { errors });
        }
        self.field_errors.clear();

        match send(self.form.clone()).await {
            Ok(value) => {
                self.close();
                Ok(value)
            }
            Err(e) => {
                self.field_errors = e.field_errors().to_vec();
                Err(e)
            }
        }
    }
}
