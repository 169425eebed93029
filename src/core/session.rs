//! Persisted auth session.
//!
//! The session issued by the auth service is kept in the `client_state` table
//! under one key, so a restart does not force a new sign-in. The bearer token
//! is mirrored into a [`TokenHandle`] that the API client reads on every request.

use crate::api::TokenHandle;
use crate::entities::{ClientState, ClientStateColumn, client_state};
use crate::errors::Result;
use crate::models::AuthSession;
use chrono::Utc;
use sea_orm::{Set, prelude::*};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

const AUTH_SESSION_KEY: &str = "auth_session";

/// Current session plus its durable copy
#[derive(Debug, Clone)]
pub struct AuthStore {
    db: DatabaseConnection,
    session: Arc<RwLock<Option<AuthSession>>>,
    token: TokenHandle,
}

impl AuthStore {
    /// Loads the persisted session, if any.
    ///
    /// A stored value that no longer parses is discarded with a warning and the
    /// user starts signed out.
    pub async fn load(db: DatabaseConnection) -> Result<Self> {
        let stored = ClientState::find()
            .filter(ClientStateColumn::Key.eq(AUTH_SESSION_KEY))
            .one(&db)
            .await?;

        let session = stored.and_then(|row| match serde_json::from_str::<AuthSession>(&row.value) {
            Ok(session) => Some(session),
            Err(e) => {
                warn!(error = %e, "Discarding unreadable auth session");
                None
            }
        });
        if session.is_some() {
            info!("Restored auth session");
        }

        let token = session.as_ref().map(|s| s.token.clone());
        Ok(Self {
            db,
            session: Arc::new(RwLock::new(session)),
            token: Arc::new(RwLock::new(token)),
        })
    }

    /// Token handle to hand to the API client
    #[must_use]
    pub fn token_handle(&self) -> TokenHandle {
        Arc::clone(&self.token)
    }

    /// Current session, `None` when signed out
    pub async fn session(&self) -> Option<AuthSession> {
        self.session.read().await.clone()
    }

    /// Stores a new session and starts sending its token.
    pub async fn set_session(&self, session: AuthSession) -> Result<()> {
        let value = serde_json::to_string(&session)?;
        let now = Utc::now().naive_utc();

        let existing = ClientState::find()
            .filter(ClientStateColumn::Key.eq(AUTH_SESSION_KEY))
            .one(&self.db)
            .await?;

        if let Some(row) = existing {
            let mut active_model: client_state::ActiveModel = row.into();
            active_model.value = Set(value);
            active_model.updated_at = Set(now);
            active_model.update(&self.db).await?;
        } else {
            let row = client_state::ActiveModel {
                key: Set(AUTH_SESSION_KEY.to_string()),
                value: Set(value),
                updated_at: Set(now),
                ..Default::default()
            };
            row.insert(&self.db).await?;
        }

        *self.token.write().await = Some(session.token.clone());
        *self.session.write().await = Some(session);
        info!("Auth session stored");
        Ok(())
    }

    /// Signs out: forgets the session and its durable copy.
    pub async fn clear(&self) -> Result<()> {
        ClientState::delete_many()
            .filter(ClientStateColumn::Key.eq(AUTH_SESSION_KEY))
            .exec(&self.db)
            .await?;
        *self.token.write().await = None;
        *self.session.write().await = None;
        info!("Auth session cleared");
        Ok(())
    }
}
