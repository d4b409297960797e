#![doc = "The `taskdesk` library crate."]
#![doc = ""]
#![doc = "Domain models, authentication, persistence, routing configuration and error"]
#![doc = "handling for the TaskDesk API. The binary (`main.rs`) wires these into an"]
#![doc = "actix-web server."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;

pub use crate::error::AppError;
pub use crate::state::AppState;
