//! List queries: parameterized, cached reads of paginated collections.
//!
//! Every backend list is filtered, sorted and paginated server-side. The view
//! state is forwarded as query parameters and the server returns exactly one
//! page, so `total` is always the backend's count, never the size of what
//! happened to be fetched.

use super::cache::QueryKey;
use super::view::{SortDirection, ViewState};
use crate::api::{decode, decode_entity};
use crate::context::AppContext;
use crate::errors::{Error, Result};
use crate::models::{Page, Pagination};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Query parameters understood by every collection endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListParams {
    /// Page number (1-based)
    pub page: u32,
    /// Page size
    pub limit: u32,
    /// Search text
    pub search: Option<String>,
    /// Sort column
    pub sort_by: Option<String>,
    /// Sort direction
    pub sort_order: Option<SortDirection>,
    /// Entity-specific filters
    pub filters: BTreeMap<String, String>,
}

impl ListParams {
    /// Parameters describing the current view.
    #[must_use]
    pub fn from_view(view: &ViewState) -> Self {
        Self {
            page: view.page(),
            limit: view.page_size(),
            search: Some(view.search().to_string()).filter(|s| !s.is_empty()),
            sort_by: view.sort().map(|s| s.column.clone()),
            sort_order: view.sort().map(|s| s.direction),
            filters: view.filters().clone(),
        }
    }

    /// Encodes the parameters as query pairs.
    #[must_use]
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = vec![
            ("page".to_string(), self.page.to_string()),
            ("limit".to_string(), self.limit.to_string()),
        ];
        if let Some(search) = &self.search {
            query.push(("search".to_string(), search.clone()));
        }
        if let Some(sort_by) = &self.sort_by {
            query.push(("sortBy".to_string(), sort_by.clone()));
        }
        if let Some(order) = self.sort_order {
            query.push(("sortOrder".to_string(), order.as_param().to_string()));
        }
        query.extend(self.filters.iter().map(|(k, v)| (k.clone(), v.clone())));
        query
    }
}

/// A list screen's data: view state, loading and error flags, and the last page fetched
#[derive(Debug, Clone)]
pub struct ListQuery<T> {
    path: String,
    view: ViewState,
    scope: BTreeMap<String, String>,
    loading: bool,
    error: Option<String>,
    data: Option<Page<T>>,
}

impl<T: DeserializeOwned> ListQuery<T> {
    /// List over `path` with the given page size and no tenant scope.
    pub fn new(path: impl Into<String>, page_size: u32) -> Self {
        Self {
            path: path.into(),
            view: ViewState::new(page_size),
            scope: BTreeMap::new(),
            loading: false,
            error: None,
            data: None,
        }
    }

    /// List over `path` using the context's default page size and tenant scope.
    pub fn for_context(ctx: &AppContext, path: impl Into<String>) -> Self {
        let query = Self::new(path, ctx.settings.default_page_size);
        match ctx.tenant() {
            Some(gym_id) => query.with_scope("gymId", gym_id),
            None => query,
        }
    }

    /// Pins a filter that the view cannot change.
    #[must_use]
    pub fn with_scope(mut self, field: &str, value: &str) -> Self {
        self.scope.insert(field.to_string(), value.to_string());
        self
    }

    /// Endpoint path
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// View state
    #[must_use]
    pub const fn view(&self) -> &ViewState {
        &self.view
    }

    /// Mutable view state; call [`ListQuery::refresh`] afterwards
    pub fn view_mut(&mut self) -> &mut ViewState {
        &mut self.view
    }

    /// Parameters for the next fetch, with scope filters applied over view filters
    #[must_use]
    pub fn params(&self) -> ListParams {
        let mut params = ListParams::from_view(&self.view);
        params
            .filters
            .extend(self.scope.iter().map(|(k, v)| (k.clone(), v.clone())));
        params
    }

    /// Cache key for the next fetch
    #[must_use]
    pub fn key(&self) -> QueryKey {
        QueryKey::with_params(&self.path, &self.params().to_query())
    }

    /// True while a fetch is running
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// Message from the last failed fetch, cleared by the next successful one
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Records on the current page
    #[must_use]
    pub fn items(&self) -> &[T] {
        self.data.as_ref().map_or(&[], |page| page.data.as_slice())
    }

    /// Metadata of the last page fetched
    #[must_use]
    pub fn pagination(&self) -> Option<Pagination> {
        self.data.as_ref().map(|page| page.pagination)
    }

    async fn fetch_page(&self, ctx: &AppContext) -> Result<Page<T>> {
        let value = cached_get(ctx, &self.path, &self.params().to_query()).await?;
        decode::<Page<T>>(&value)
    }

    /// Fetches the page described by the current view through the query cache.
    ///
    /// When the server reports fewer pages than the view is on (the last row of
    /// the last page was deleted), the view moves to the last page and that page
    /// is fetched instead. On failure the previous data stays visible, the error
    /// is recorded and an error notification is emitted.
    #[instrument(skip(self, ctx), fields(path = %self.path))]
    pub async fn refresh(&mut self, ctx: &AppContext) -> Result<()> {
        self.loading = true;
        let mut outcome = self.fetch_page(ctx).await;
        if let Ok(page) = &outcome {
            let last = page.pagination.total_pages.max(1);
            if self.view.page() > last {
                debug!(
                    requested = self.view.page(),
                    last,
                    "Page past the end, fetching last page"
                );
                self.view.set_page(last, last);
                outcome = self.fetch_page(ctx).await;
            }
        }
        self.loading = false;

        match outcome {
            Ok(page) => {
                debug!(
                    records = page.data.len(),
                    total = page.pagination.total,
                    "List refreshed"
                );
                self.error = None;
                self.data = Some(page);
                Ok(())
            }
            Err(e) => {
                let message = e.display_message();
                ctx.notifier.error(message.clone());
                self.error = Some(message);
                Err(e)
            }
        }
    }

    /// Moves to `page` (clamped to the known page count) and refreshes.
    pub async fn go_to_page(&mut self, ctx: &AppContext, page: u32) -> Result<()> {
        let total_pages = self.pagination().map_or(1, |p| p.total_pages);
        self.view.set_page(page, total_pages);
        self.refresh(ctx).await
    }
}

async fn cached_get(ctx: &AppContext, path: &str, query: &[(String, String)]) -> Result<Arc<Value>> {
    let key = QueryKey::with_params(path, query);
    let owned_path = path.to_string();
    let owned_query = query.to_vec();
    let backend = Arc::clone(&ctx.backend);
    ctx.cache
        .fetch(key, async move { backend.get(&owned_path, &owned_query).await })
        .await
}

fn with_param(query: &[(String, String)], name: &str, value: String) -> Vec<(String, String)> {
    let mut query: Vec<(String, String)> = query
        .iter()
        .filter(|(key, _)| key != name)
        .cloned()
        .collect();
    query.push((name.to_string(), value));
    query
}

async fn collect_pages<T: DeserializeOwned>(
    ctx: &AppContext,
    path: &str,
    query: &[(String, String)],
) -> Result<Vec<T>> {
    let first = cached_get(ctx, path, query).await?;
    if first.get("pagination").is_none() {
        return decode_entity::<Vec<T>>(&first);
    }

    let Page {
        mut data,
        pagination,
    } = decode::<Page<T>>(&first)?;
    let query = with_param(query, "limit", pagination.limit.to_string());
    for number in pagination.page.max(1) + 1..=pagination.total_pages {
        let next = cached_get(ctx, path, &with_param(&query, "page", number.to_string())).await?;
        let page = decode::<Page<T>>(&next)?;
        if page.is_empty() {
            break;
        }
        data.extend(page.data);
    }

    let fetched = u64::try_from(data.len()).unwrap_or(u64::MAX);
    if fetched < pagination.total {
        return Err(Error::IncompleteCollection {
            path: path.to_string(),
            fetched,
            total: pagination.total,
        });
    }
    Ok(data)
}

/// Fetches a whole collection through the query cache.
///
/// Used for small collections that are derived from locally, such as one
/// member's payments. Accepts a bare array, a `{data: [...]}` envelope, or a
/// paginated reply, in which case every remaining page is fetched as well.
/// A paginated reply that yields fewer rows than its `total` is an error,
/// never a silently shortened collection.
#[instrument(skip(ctx, query))]
pub async fn fetch_collection<T: DeserializeOwned>(
    ctx: &AppContext,
    path: &str,
    query: &[(String, String)],
) -> Result<Vec<T>> {
    let outcome = collect_pages(ctx, path, query).await;
    if let Err(e) = &outcome {
        ctx.notifier.error(e.display_message());
    }
    outcome
}
