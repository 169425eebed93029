//! Client state entity - Durable key-value storage on the client.
//! Holds the small subset of client state that must survive a restart,
//! such as the persisted auth session.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Client state database model - stores key-value pairs
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "client_state")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i32,
    /// State key (e.g., `"auth_session"`)
    #[sea_orm(unique)]
    pub key: String,
    /// Value stored as a string, JSON for structured values
    pub value: String,
    /// When this value was last written
    pub updated_at: DateTime,
}

/// `ClientState` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
