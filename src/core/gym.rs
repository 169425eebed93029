//! Gym management: the admin list, create/edit with logo, status and owner changes.

use super::mutation::{FollowUp, SaveOutcome, run_mutation, save_with_uploads};
use super::query::ListQuery;
use super::validate::{Checks, Validate};
use crate::api::{Method, Upload, paths, send_json};
use crate::context::AppContext;
use crate::errors::{FieldError, Result};
use crate::models::Gym;
use serde::Serialize;
use serde_json::json;
use tracing::{info, instrument};

/// Create/edit form for a gym
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GymForm {
    /// Display name
    pub name: String,
    /// Street address
    pub address: String,
    /// City
    pub city: String,
    /// State or region
    pub state: String,
    /// Postal code
    pub pincode: String,
    /// Contact phone
    pub phone: String,
    /// Contact email
    pub email: String,
    /// Plan the gym subscribes to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription_plan_id: Option<String>,
}

impl From<&Gym> for GymForm {
    fn from(gym: &Gym) -> Self {
        Self {
            name: gym.name.clone(),
            address: gym.address.clone(),
            city: gym.city.clone(),
            state: gym.state.clone(),
            pincode: gym.pincode.clone(),
            phone: gym.phone.clone(),
            email: gym.email.clone(),
            subscription_plan_id: gym.subscription_plan_id.clone(),
        }
    }
}

impl Validate for GymForm {
    fn validate(&self) -> Vec<FieldError> {
        Checks::new()
            .required("name", &self.name, "Gym name")
            .required("address", &self.address, "Address")
            .required("city", &self.city, "City")
            .required("state", &self.state, "State")
            .phone("phone", &self.phone)
            .email("email", &self.email)
            .required_ref(
                "subscriptionPlanId",
                self.subscription_plan_id.as_deref(),
                "Subscription plan",
            )
            .finish()
    }
}

/// All gyms, for the platform admin.
#[must_use]
pub fn gym_list(ctx: &AppContext) -> ListQuery<Gym> {
    ListQuery::new(paths::GYMS, ctx.settings.default_page_size)
}

fn logo_follow_up(logo: Option<Upload>) -> impl FnOnce(&Gym) -> Vec<FollowUp> {
    move |gym| {
        vec![FollowUp {
            label: "logo",
            path: paths::gym_logo(&gym.id),
            upload: logo,
        }]
    }
}

/// Creates a gym, then uploads its logo when one was picked.
#[instrument(skip_all, fields(name = %form.name))]
pub async fn create_gym(
    ctx: &AppContext,
    form: &GymForm,
    logo: Option<Upload>,
) -> Result<SaveOutcome<Gym>> {
    form.check()?;
    let outcome = save_with_uploads(
        ctx,
        "Gym",
        &[&[paths::GYMS]],
        "Gym created successfully",
        send_json(ctx.backend.as_ref(), Method::Post, paths::GYMS, form),
        logo_follow_up(logo),
    )
    .await?;
    info!(gym_id = %outcome.entity.id, "Gym created");
    Ok(outcome)
}

/// Saves edits to a gym, then uploads a replacement logo when one was picked.
#[instrument(skip(ctx, form, logo))]
pub async fn update_gym(
    ctx: &AppContext,
    id: &str,
    form: &GymForm,
    logo: Option<Upload>,
) -> Result<SaveOutcome<Gym>> {
    form.check()?;
    let path = paths::gym(id);
    save_with_uploads(
        ctx,
        "Gym",
        &[&[paths::GYMS]],
        "Gym updated successfully",
        send_json(ctx.backend.as_ref(), Method::Put, &path, form),
        logo_follow_up(logo),
    )
    .await
}

/// Flips a gym between active and inactive.
#[instrument(skip_all, fields(gym_id = %gym.id))]
pub async fn toggle_gym_status(ctx: &AppContext, gym: &Gym) -> Result<Gym> {
    let activate = !gym.is_active;
    let message = if activate {
        "Gym activated"
    } else {
        "Gym deactivated"
    };
    let path = paths::gym_status(&gym.id);
    run_mutation(
        ctx,
        &[&[paths::GYMS]],
        message,
        send_json(
            ctx.backend.as_ref(),
            Method::Patch,
            &path,
            &json!({ "isActive": activate }),
        ),
    )
    .await
}

/// Assigns an owner account to a gym.
#[instrument(skip(ctx))]
pub async fn assign_owner(ctx: &AppContext, gym_id: &str, owner_id: &str) -> Result<Gym> {
    let path = paths::gym_owner(gym_id);
    run_mutation(
        ctx,
        &[&[paths::GYMS]],
        "Owner assigned successfully",
        send_json(
            ctx.backend.as_ref(),
            Method::Patch,
            &path,
            &json!({ "ownerId": owner_id }),
        ),
    )
    .await
}

/// Deletes a gym.
#[instrument(skip(ctx))]
pub async fn delete_gym(ctx: &AppContext, id: &str) -> Result<()> {
    let path = paths::gym(id);
    run_mutation(ctx, &[&[paths::GYMS]], "Gym deleted successfully", async {
        ctx.backend.send(Method::Delete, &path, None).await.map(drop)
    })
    .await
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::mutation::{FormDialog, UploadStatus};
    use crate::core::notify::NotificationLevel;
    use crate::errors::Error;
    use crate::test_utils::{FakeBackend, gym_json, test_context};

    fn filled_form() -> GymForm {
        GymForm {
            name: "Iron Temple".to_string(),
            address: "12 MG Road".to_string(),
            city: "Pune".to_string(),
            state: "Maharashtra".to_string(),
            pincode: "411001".to_string(),
            phone: "9876543210".to_string(),
            email: "owner@irontemple.in".to_string(),
            subscription_plan_id: Some("plan-basic".to_string()),
        }
    }

    #[test]
    fn test_blank_form_reports_every_required_field() {
        let errors = GymForm::default().validate();
        let fields: Vec<&str> = errors.iter().filter_map(|e| e.field.as_deref()).collect();
        for field in ["name", "address", "city", "state", "phone", "email", "subscriptionPlanId"] {
            assert!(fields.contains(&field), "missing error for {field}");
        }
    }

    #[tokio::test]
    async fn test_create_without_logo_closes_dialog_and_refreshes_list() {
        let backend = FakeBackend::new();
        backend.seed("gyms", gym_json("g1", "Atlas Fitness"));
        let (ctx, mut rx) = test_context(backend.clone());

        let mut list = gym_list(&ctx);
        list.refresh(&ctx).await.unwrap();
        assert_eq!(list.items().len(), 1);

        let mut dialog: FormDialog<GymForm> = FormDialog::new();
        dialog.open_blank();
        dialog.form = filled_form();
        let ctx_ref = &ctx;
        let outcome = dialog
            .submit(|form| async move { create_gym(ctx_ref, &form, None).await })
            .await
            .unwrap();

        assert_eq!(outcome.uploads, vec![UploadStatus::NotRequested]);
        assert!(!dialog.open);
        assert_eq!(dialog.form, GymForm::default());
        let toast = rx.try_recv().unwrap();
        assert_eq!(toast.level, NotificationLevel::Success);
        assert_eq!(toast.message, "Gym created successfully");
        assert!(backend.requests().iter().all(|r| !r.label.starts_with("UPLOAD")));

        list.refresh(&ctx).await.unwrap();
        assert_eq!(backend.requests_to("GET gyms"), 2);
        assert!(list.items().iter().any(|g| g.name == "Iron Temple"));
    }

    #[tokio::test]
    async fn test_create_with_logo_uploads_after_save() {
        let backend = FakeBackend::new();
        let (ctx, _rx) = test_context(backend.clone());
        let logo = Upload::new("logo", "logo.png", "image/png", vec![0x89, 0x50]);

        let outcome = create_gym(&ctx, &filled_form(), Some(logo)).await.unwrap();

        assert!(outcome.is_complete());
        let id = outcome.entity.id;
        assert_eq!(backend.requests_to(&format!("UPLOAD gyms/{id}/logo")), 1);
        let labels: Vec<String> = backend.requests().into_iter().map(|r| r.label).collect();
        assert_eq!(labels, vec!["POST gyms".to_string(), format!("UPLOAD gyms/{id}/logo")]);
    }

    #[tokio::test]
    async fn test_invalid_form_sends_nothing() {
        let backend = FakeBackend::new();
        let (ctx, mut rx) = test_context(backend.clone());
        let mut form = filled_form();
        form.email = "not-an-email".to_string();

        let result = create_gym(&ctx, &form, None).await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        assert!(backend.requests().is_empty());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_toggle_status_sends_inverse() {
        let backend = FakeBackend::new();
        backend.seed("gyms", gym_json("g1", "Iron Temple"));
        let (ctx, mut rx) = test_context(backend.clone());
        let gym: Gym = serde_json::from_value(gym_json("g1", "Iron Temple")).unwrap();
        assert!(gym.is_active);

        let updated = toggle_gym_status(&ctx, &gym).await.unwrap();
        assert!(!updated.is_active);
        assert_eq!(
            backend.last_body("PATCH gyms/g1/status"),
            Some(json!({"isActive": false}))
        );
        assert_eq!(rx.try_recv().unwrap().message, "Gym deactivated");
    }

    #[tokio::test]
    async fn test_delete_invalidates_list() {
        let backend = FakeBackend::new();
        backend.seed("gyms", gym_json("g1", "Iron Temple"));
        let (ctx, _rx) = test_context(backend.clone());
        let mut list = gym_list(&ctx);
        list.refresh(&ctx).await.unwrap();

        delete_gym(&ctx, "g1").await.unwrap();
        list.refresh(&ctx).await.unwrap();
        assert!(list.items().is_empty());
    }

    #[tokio::test]
    async fn test_assign_owner() {
        let backend = FakeBackend::new();
        backend.seed("gyms", gym_json("g1", "Iron Temple"));
        let (ctx, _rx) = test_context(backend.clone());

        let gym = assign_owner(&ctx, "g1", "u42").await.unwrap();
        assert_eq!(gym.owner_id.as_deref(), Some("u42"));
    }
}
