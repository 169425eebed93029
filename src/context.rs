//! Application context: everything an operation needs, built once and passed by reference.

use crate::api::{ApiClient, Backend};
use crate::config::AppConfig;
use crate::config::database::init_db;
use crate::core::cache::QueryCache;
use crate::core::notify::{Notification, Notifier};
use crate::core::session::AuthStore;
use crate::errors::Result;
use chrono::{Local, NaiveDate};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::info;

/// Tunables read from configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    /// Page size new lists start with
    pub default_page_size: u32,
    /// Quiet period before a search is applied
    pub debounce: Duration,
    /// Days before expiry at which a membership counts as expiring soon
    pub expiring_threshold_days: i64,
}

impl From<&AppConfig> for Settings {
    fn from(config: &AppConfig) -> Self {
        Self {
            default_page_size: config.query.default_page_size,
            debounce: config.search.debounce(),
            expiring_threshold_days: config.membership.expiring_threshold_days,
        }
    }
}

/// Shared handles for every screen
#[derive(Clone)]
pub struct AppContext {
    /// Transport to the REST API
    pub backend: Arc<dyn Backend>,
    /// Query cache shared by every list
    pub cache: QueryCache,
    /// Notification sender
    pub notifier: Notifier,
    /// Tunables
    pub settings: Settings,
    tenant: Option<String>,
}

impl fmt::Debug for AppContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppContext")
            .field("cache", &self.cache)
            .field("settings", &self.settings)
            .field("tenant", &self.tenant)
            .finish_non_exhaustive()
    }
}

impl AppContext {
    /// Context over an existing backend.
    pub fn new(backend: Arc<dyn Backend>, config: &AppConfig, notifier: Notifier) -> Self {
        Self {
            backend,
            cache: QueryCache::new(config.query.stale_after()),
            notifier,
            settings: Settings::from(config),
            tenant: None,
        }
    }

    /// Same context pinned to a gym (`None` for platform-wide access).
    #[must_use]
    pub fn with_tenant(mut self, gym_id: Option<String>) -> Self {
        self.tenant = gym_id;
        self
    }

    /// Gym every tenant-scoped list is pinned to
    #[must_use]
    pub fn tenant(&self) -> Option<&str> {
        self.tenant.as_deref()
    }

    /// Today's date on the local clock; membership and renewal dates are calendar days.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    /// Opens client storage, restores the auth session and builds the HTTP backend.
    ///
    /// Returns the context, the receiver notifications are delivered on, and the
    /// auth store for signing in and out. After a sign-in the context should be
    /// re-pinned with [`AppContext::with_tenant`].
    pub async fn connect(
        config: &AppConfig,
    ) -> Result<(Self, mpsc::UnboundedReceiver<Notification>, AuthStore)> {
        let db = init_db(&config.database_url).await?;
        let auth = AuthStore::load(db).await?;
        let client = ApiClient::new(&config.api, auth.token_handle())?;
        info!(base_url = %client.base_url(), "API client ready");

        let tenant = auth
            .session()
            .await
            .and_then(|session| session.tenant_scope().map(ToString::to_string));
        let (notifier, rx) = Notifier::channel();
        let ctx = Self::new(Arc::new(client), config, notifier).with_tenant(tenant);
        Ok((ctx, rx, auth))
    }
}
