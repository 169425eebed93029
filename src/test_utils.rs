//! Shared test utilities for `gymdesk`.
//!
//! This module provides an in-memory stand-in for the REST backend, fixture
//! records with sensible defaults, and helpers for setting up a test context
//! and a test database.
#![allow(clippy::unwrap_used)]

use crate::api::{Backend, Method, Upload, flatten_error_body};
use crate::config::AppConfig;
use crate::context::AppContext;
use crate::core::notify::{Notification, Notifier};
use crate::core::view::{SortValue, ViewRecord, ViewState, derive_view};
use crate::errors::{Error, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;
use serde_json::{Map, Value, json};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// Installs a test-writer subscriber so `RUST_LOG=debug cargo test` shows traces.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// Creates an in-memory `SQLite` database with all tables initialized.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Context over `backend` with default settings and no tenant.
pub fn test_context(backend: FakeBackend) -> (AppContext, mpsc::UnboundedReceiver<Notification>) {
    init_test_tracing();
    let (notifier, rx) = Notifier::channel();
    let ctx = AppContext::new(Arc::new(backend), &AppConfig::default(), notifier);
    (ctx, rx)
}

/// A gym record as the backend would return it.
pub fn gym_json(id: &str, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "address": "1 Main Street",
        "city": "Pune",
        "state": "Maharashtra",
        "pincode": "411001",
        "phone": "9876543210",
        "email": format!("{id}@gyms.test"),
        "subscriptionPlanId": "plan-basic",
        "isActive": true
    })
}

/// A regular member of gym `g1` with no discounts.
pub fn member_json(id: &str, name: &str, final_fee: f64) -> Value {
    json!({
        "id": id,
        "gymId": "g1",
        "name": name,
        "phone": "9123456780",
        "membershipStart": "2026-01-01",
        "membershipEnd": "2030-12-31",
        "packageFee": final_fee,
        "maxDiscount": 0.0,
        "extraDiscount": 0.0,
        "finalFee": final_fee,
        "membershipType": "REGULAR",
        "isActive": true
    })
}

/// One request the fake backend received
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    /// `"<METHOD> <path>"`, with `UPLOAD` for multipart requests
    pub label: String,
    /// Query parameters, in the order sent
    pub query: Vec<(String, String)>,
    /// JSON body, if any
    pub body: Option<Value>,
}

impl RecordedRequest {
    /// Value of one query parameter
    pub fn param(&self, name: &str) -> Option<String> {
        self.query
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.clone())
    }
}

#[derive(Debug, Default)]
struct FakeState {
    collections: BTreeMap<String, Vec<Value>>,
    failures: HashMap<String, VecDeque<Error>>,
    responses: HashMap<String, Value>,
    requests: Vec<RecordedRequest>,
    next_id: u64,
}

impl FakeState {
    /// Collection key and index of the item addressed by `path` (`gyms/g1`).
    fn locate(&self, path: &str) -> Option<(String, usize)> {
        let (parent, id) = path.rsplit_once('/')?;
        let suffix = format!("/{parent}");
        self.collections.iter().find_map(|(key, items)| {
            if key != parent && !key.ends_with(&suffix) {
                return None;
            }
            items
                .iter()
                .position(|item| item.get("id").and_then(Value::as_str) == Some(id))
                .map(|index| (key.clone(), index))
        })
    }

    fn item_mut(&mut self, path: &str) -> Option<&mut Value> {
        let (key, index) = self.locate(path)?;
        self.collections.get_mut(&key)?.get_mut(index)
    }

    fn generate_id(&mut self, collection: &str) -> String {
        self.next_id += 1;
        let stem = collection.rsplit('/').next().unwrap_or(collection);
        format!("{stem}-{}", self.next_id)
    }
}

/// In-memory REST backend.
///
/// Collections are keyed by path (`gyms`, `members/m1/balance-payments`).
/// Collection reads apply `search`, `sortBy`/`sortOrder`, `page`/`limit` and
/// treat every other parameter as an exact-match filter, the way the real
/// server does. Items are addressed as `<collection>/<id>`; sub-resources
/// (`gyms/g1/status`) write into their parent item.
#[derive(Debug, Clone, Default)]
pub struct FakeBackend {
    state: Arc<Mutex<FakeState>>,
}

impl FakeBackend {
    /// Empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record to a collection.
    pub fn seed(&self, collection: &str, record: Value) {
        let mut state = self.state.lock().unwrap();
        state
            .collections
            .entry(collection.to_string())
            .or_default()
            .push(record);
    }

    /// Makes the next request with `label` fail with `status` and an error `payload`.
    pub fn fail_next(&self, label: &str, status: u16, payload: Value) {
        let body = serde_json::to_vec(&payload).unwrap();
        let error = Error::Api {
            status,
            message: flatten_error_body(status, &body),
        };
        let mut state = self.state.lock().unwrap();
        state
            .failures
            .entry(label.to_string())
            .or_default()
            .push_back(error);
    }

    /// Answers every request with `label` with `response`.
    pub fn respond_with(&self, label: &str, response: Value) {
        let mut state = self.state.lock().unwrap();
        state.responses.insert(label.to_string(), response);
    }

    /// Every request received so far, in order
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    /// Number of requests with `label`
    pub fn requests_to(&self, label: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .requests
            .iter()
            .filter(|r| r.label == label)
            .count()
    }

    /// Body of the most recent request with `label`
    pub fn last_body(&self, label: &str) -> Option<Value> {
        self.state
            .lock()
            .unwrap()
            .requests
            .iter()
            .rev()
            .find(|r| r.label == label)
            .and_then(|r| r.body.clone())
    }

    /// Records the request and returns a queued failure or canned response, if any.
    fn intercept(
        &self,
        label: String,
        query: &[(String, String)],
        body: Option<Value>,
    ) -> Option<Result<Value>> {
        let mut state = self.state.lock().unwrap();
        state.requests.push(RecordedRequest {
            label: label.clone(),
            query: query.to_vec(),
            body,
        });
        if let Some(error) = state.failures.get_mut(&label).and_then(VecDeque::pop_front) {
            return Some(Err(error));
        }
        state.responses.get(&label).cloned().map(Ok)
    }
}

fn not_found(path: &str) -> Error {
    Error::Api {
        status: 404,
        message: format!("Not found: {path}"),
    }
}

fn merge(target: &mut Value, patch: Option<Value>) {
    if let (Some(target), Some(Value::Object(patch))) = (target.as_object_mut(), patch) {
        target.extend(patch);
    }
}

fn camel_case(segment: &str) -> String {
    let mut out = String::new();
    let mut upper = false;
    for c in segment.chars() {
        if c == '-' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// A JSON record viewed through [`ViewRecord`]
#[derive(Debug, Clone)]
struct JsonRecord(Value);

impl ViewRecord for JsonRecord {
    fn search_fields(&self) -> Vec<&str> {
        self.0
            .as_object()
            .map(|fields| fields.values().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    fn filter_value(&self, field: &str) -> Option<String> {
        match self.0.get(field)? {
            Value::String(s) => Some(s.clone()),
            Value::Null => None,
            other => Some(other.to_string()),
        }
    }

    fn sort_value(&self, column: &str) -> SortValue {
        match self.0.get(column) {
            Some(Value::String(s)) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .map_or_else(|_| SortValue::Text(s.clone()), SortValue::Date),
            Some(Value::Number(n)) => n.as_f64().map_or(SortValue::Missing, SortValue::Number),
            Some(Value::Bool(b)) => SortValue::Bool(*b),
            _ => SortValue::Missing,
        }
    }
}

/// Page size the fake uses when a collection read sends no `limit`
pub const DEFAULT_PAGE_LIMIT: u32 = 10;

fn list_page(items: Vec<Value>, query: &[(String, String)]) -> Value {
    let param = |name: &str| {
        query
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    };
    let records: Vec<JsonRecord> = items.into_iter().map(JsonRecord).collect();
    let limit = param("limit")
        .and_then(|l| l.parse().ok())
        .unwrap_or(DEFAULT_PAGE_LIMIT);

    let mut view = ViewState::new(limit);
    if let Some(search) = param("search") {
        view.set_search(search);
    }
    for (key, value) in query {
        if !matches!(key.as_str(), "page" | "limit" | "search" | "sortBy" | "sortOrder") {
            view.set_filter(key, Some(value.as_str()));
        }
    }
    if let Some(column) = param("sortBy") {
        view.toggle_sort(column);
        if param("sortOrder") == Some("desc") {
            view.toggle_sort(column);
        }
    }
    let page = param("page").and_then(|p| p.parse().ok()).unwrap_or(1);
    view.set_page(page, u32::MAX);

    let mut derived = derive_view(&records, &view);
    if view.page() > derived.pagination.total_pages.max(1) {
        derived.items.clear();
        derived.pagination.page = view.page();
    }
    let data: Vec<Value> = derived.items.into_iter().map(|record| record.0).collect();
    json!({ "data": data, "pagination": derived.pagination })
}

#[async_trait]
impl Backend for FakeBackend {
    async fn get(&self, path: &str, query: &[(String, String)]) -> Result<Value> {
        if let Some(outcome) = self.intercept(format!("GET {path}"), query, None) {
            return outcome;
        }
        let state = self.state.lock().unwrap();
        if let Some((key, index)) = state.locate(path) {
            return Ok(state.collections[&key][index].clone());
        }
        let items = state.collections.get(path).cloned().unwrap_or_default();
        Ok(list_page(items, query))
    }

    async fn send(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value> {
        let verb = match method {
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        };
        if let Some(outcome) = self.intercept(format!("{verb} {path}"), &[], body.clone()) {
            return outcome;
        }

        let mut state = self.state.lock().unwrap();
        match method {
            Method::Post => {
                let mut record = match body {
                    Some(Value::Object(fields)) => fields,
                    _ => Map::new(),
                };
                if !record.contains_key("id") {
                    let id = state.generate_id(path);
                    record.insert("id".to_string(), Value::String(id));
                }
                let record = Value::Object(record);
                state
                    .collections
                    .entry(path.to_string())
                    .or_default()
                    .push(record.clone());
                Ok(record)
            }
            Method::Put | Method::Patch => {
                let target = if state.locate(path).is_some() {
                    path
                } else {
                    path.rsplit_once('/').map_or(path, |(parent, _)| parent)
                };
                let item = state.item_mut(target).ok_or_else(|| not_found(path))?;
                merge(item, body);
                Ok(item.clone())
            }
            Method::Delete => {
                let (key, index) = state.locate(path).ok_or_else(|| not_found(path))?;
                if let Some(items) = state.collections.get_mut(&key) {
                    items.remove(index);
                }
                Ok(Value::Null)
            }
        }
    }

    async fn upload(&self, path: &str, upload: Upload) -> Result<Value> {
        let body = json!({ "field": &upload.field, "fileName": &upload.file_name });
        if let Some(outcome) = self.intercept(format!("UPLOAD {path}"), &[], Some(body)) {
            return outcome;
        }

        let (parent, asset) = path.rsplit_once('/').ok_or_else(|| not_found(path))?;
        let mut state = self.state.lock().unwrap();
        let item = state.item_mut(parent).ok_or_else(|| not_found(path))?;
        if let Some(fields) = item.as_object_mut() {
            fields.insert(
                format!("{}Url", camel_case(asset)),
                Value::String(format!("https://files.test/{path}/{}", upload.file_name)),
            );
        }
        Ok(item.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fake_collection_paging_and_filters() {
        let backend = FakeBackend::new();
        for i in 0..5 {
            let mut member = member_json(&format!("m{i}"), &format!("Member {i}"), 1_000.0);
            if i % 2 == 0 {
                member["gymId"] = json!("g2");
            }
            backend.seed("members", member);
        }

        let query = vec![
            ("page".to_string(), "2".to_string()),
            ("limit".to_string(), "2".to_string()),
            ("gymId".to_string(), "g2".to_string()),
        ];
        let page = backend.get("members", &query).await.unwrap();
        assert_eq!(page["pagination"]["total"], json!(3));
        assert_eq!(page["data"][0]["id"], json!("m4"));
    }

    #[tokio::test]
    async fn test_fake_defaults_limit_and_leaves_pages_past_end_empty() {
        let backend = FakeBackend::new();
        for i in 0..12 {
            backend.seed("gyms", gym_json(&format!("g{i}"), &format!("Gym {i:02}")));
        }

        let first = backend.get("gyms", &[]).await.unwrap();
        assert_eq!(first["data"].as_array().unwrap().len(), 10);
        assert_eq!(first["pagination"]["totalPages"], json!(2));

        let query = vec![("page".to_string(), "3".to_string())];
        let past_end = backend.get("gyms", &query).await.unwrap();
        assert_eq!(past_end["data"], json!([]));
        assert_eq!(past_end["pagination"]["page"], json!(3));
        assert_eq!(past_end["pagination"]["total"], json!(12));
    }

    #[tokio::test]
    async fn test_fake_sub_resource_writes_parent() {
        let backend = FakeBackend::new();
        backend.seed("members", member_json("m1", "John Smith", 1_000.0));

        backend
            .upload(
                "members/m1/id-proof",
                Upload::new("idProof", "id.pdf", "application/pdf", vec![1]),
            )
            .await
            .unwrap();
        let member = backend.get("members/m1", &[]).await.unwrap();
        assert_eq!(
            member["idProofUrl"],
            json!("https://files.test/members/m1/id-proof/id.pdf")
        );
    }
}
