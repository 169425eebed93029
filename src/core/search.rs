//! Debounced search box bound to a list query.

use super::debounce::Debouncer;
use super::query::ListQuery;
use crate::context::AppContext;
use crate::errors::Result;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

/// Search input whose text reaches the list only after typing pauses
#[derive(Debug)]
pub struct SearchBox {
    text: String,
    debouncer: Debouncer<String>,
    committed: mpsc::UnboundedReceiver<String>,
}

impl SearchBox {
    /// Search box with an explicit quiet period.
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        let (debouncer, committed) = Debouncer::new(delay);
        Self {
            text: String::new(),
            debouncer,
            committed,
        }
    }

    /// Search box using the configured debounce delay.
    #[must_use]
    pub fn for_context(ctx: &AppContext) -> Self {
        Self::new(ctx.settings.debounce)
    }

    /// Text as typed so far
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Records a keystroke: updates the visible text and restarts the quiet period.
    pub fn input(&mut self, text: &str) {
        text.clone_into(&mut self.text);
        self.debouncer.push(text.to_string());
    }

    /// Clears the box immediately, skipping the quiet period.
    pub async fn clear<T: DeserializeOwned>(
        &mut self,
        list: &mut ListQuery<T>,
        ctx: &AppContext,
    ) -> Result<bool> {
        self.debouncer.cancel();
        self.text.clear();
        Self::apply(list, ctx, "").await
    }

    /// Waits for the next committed value.
    pub async fn next_commit(&mut self) -> Option<String> {
        self.committed.recv().await
    }

    /// Waits for the next committed value and applies it to `list`.
    ///
    /// Returns whether the list was refetched.
    pub async fn commit_into<T: DeserializeOwned>(
        &mut self,
        list: &mut ListQuery<T>,
        ctx: &AppContext,
    ) -> Result<bool> {
        match self.next_commit().await {
            Some(value) => Self::apply(list, ctx, &value).await,
            None => Ok(false),
        }
    }

    /// Sets the search on `list` (back to page 1) and refetches when it changed.
    pub async fn apply<T: DeserializeOwned>(
        list: &mut ListQuery<T>,
        ctx: &AppContext,
        value: &str,
    ) -> Result<bool> {
        if !list.view_mut().set_search(value) {
            return Ok(false);
        }
        debug!(search = %list.view().search(), "Applying search");
        list.refresh(ctx).await?;
        Ok(true)
    }
}
