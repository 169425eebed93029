//! reqwest implementation of [`Backend`].

use super::backend::{Backend, Method, Upload};
use super::payload::flatten_error_body;
use crate::config::app::ApiConfig;
use crate::errors::{Error, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, multipart};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

/// Shared bearer token, written by the auth store and read on every request
pub type TokenHandle = Arc<RwLock<Option<String>>>;

/// HTTP client for the gym-management REST API
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: TokenHandle,
}

impl ApiClient {
    /// Builds a client for `config.base_url` that authenticates with `token`.
    pub fn new(config: &ApiConfig, token: TokenHandle) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    /// Base URL every path is appended to
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Starts an authorized request; the bearer token is attached when one is set.
    pub async fn request(&self, method: reqwest::Method, path: &str) -> RequestBuilder {
        let builder = self.client.request(method, self.url(path));
        match self.token.read().await.as_deref() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn execute(&self, builder: RequestBuilder) -> Result<Value> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let message = flatten_error_body(status.as_u16(), &body);
            warn!(status = status.as_u16(), %message, "Backend rejected request");
            return Err(Error::Api {
                status: status.as_u16(),
                message,
            });
        }

        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl Backend for ApiClient {
    #[instrument(skip(self, query))]
    async fn get(&self, path: &str, query: &[(String, String)]) -> Result<Value> {
        debug!(params = query.len(), "GET");
        let builder = self.request(reqwest::Method::GET, path).await.query(query);
        self.execute(builder).await
    }

    #[instrument(skip(self, body))]
    async fn send(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value> {
        let mut builder = self.request(method.into(), path).await;
        if let Some(body) = body {
            builder = builder.json(&body);
        }
        self.execute(builder).await
    }

    #[instrument(skip(self, upload), fields(file = %upload.file_name, size = upload.bytes.len()))]
    async fn upload(&self, path: &str, upload: Upload) -> Result<Value> {
        let part = multipart::Part::bytes(upload.bytes)
            .file_name(upload.file_name)
            .mime_str(&upload.mime)?;
        let form = multipart::Form::new().part(upload.field, part);
        let builder = self
            .request(reqwest::Method::POST, path)
            .await
            .multipart(form);
        self.execute(builder).await
    }
}
