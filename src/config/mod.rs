/// Application settings loaded from `gymdesk.toml` and the environment
pub mod app;

/// Client storage connection and table creation
pub mod database;

pub use app::{AppConfig, load_app_configuration, load_config};
