//! Entity module - SeaORM entity definitions for durable client storage.

pub mod client_state;

pub use client_state::{
    Column as ClientStateColumn, Entity as ClientState, Model as ClientStateModel,
};
