//! The backend trait and typed helpers over it.

use crate::errors::{Error, Result};
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::Path;

/// HTTP verbs used by mutations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// Create
    Post,
    /// Replace
    Put,
    /// Partial update or action
    Patch,
    /// Remove
    Delete,
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Post => Self::POST,
            Method::Put => Self::PUT,
            Method::Patch => Self::PATCH,
            Method::Delete => Self::DELETE,
        }
    }
}

/// A file to send as one multipart part
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    /// Multipart field name the backend expects (`logo`, `photo`, `idProof`)
    pub field: String,
    /// Original file name
    pub file_name: String,
    /// MIME type of the content
    pub mime: String,
    /// File content
    pub bytes: Vec<u8>,
}

impl Upload {
    /// Wraps in-memory content.
    pub fn new(
        field: impl Into<String>,
        file_name: impl Into<String>,
        mime: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            field: field.into(),
            file_name: file_name.into(),
            mime: mime.into(),
            bytes,
        }
    }

    /// Reads a file from disk, guessing the MIME type from its extension.
    pub fn from_file(field: impl Into<String>, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| Error::validation("file", "File name is not valid UTF-8"))?
            .to_string();
        let mime = mime_for(&file_name);
        Ok(Self::new(field, file_name, mime, bytes))
    }
}

fn mime_for(file_name: &str) -> &'static str {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "pdf" => "application/pdf",
        _ => "application/octet-stream",
    }
}

/// Transport to the REST backend.
///
/// Paths are relative to the API base (`gyms`, `members/42/balance-payments`).
/// Non-success responses surface as [`Error::Api`] with the payload already flattened.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Reads a resource or collection.
    async fn get(&self, path: &str, query: &[(String, String)]) -> Result<Value>;

    /// Sends a mutation with an optional JSON body.
    async fn send(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value>;

    /// Sends one file as a multipart request.
    async fn upload(&self, path: &str, upload: Upload) -> Result<Value>;
}

/// Decodes a JSON value into a typed record.
pub fn decode<T: DeserializeOwned>(value: &Value) -> Result<T> {
    T::deserialize(value).map_err(Into::into)
}

/// Serializes `body`, sends it, and decodes the returned entity.
pub async fn send_json<B, T>(
    backend: &dyn Backend,
    method: Method,
    path: &str,
    body: &B,
) -> Result<T>
where
    B: Serialize + ?Sized,
    T: DeserializeOwned,
{
    let body = serde_json::to_value(body)?;
    let response = backend.send(method, path, Some(body)).await?;
    crate::api::payload::decode_entity(&response)
}
