//! REST backend boundary.
//!
//! [`Backend`] is the seam between the crate and the network: it moves JSON
//! values and nothing else. [`ApiClient`] is the reqwest implementation used in
//! production; tests substitute an in-memory backend.

pub mod backend;
pub mod client;
pub mod paths;
pub mod payload;

pub use backend::{Backend, Method, Upload, decode, send_json};
pub use client::{ApiClient, TokenHandle};
pub use payload::{decode_entity, flatten_error_body, flatten_error_payload};
