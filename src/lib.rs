//! Voyago API: read side of a tour-booking marketplace.
//!
//! List endpoints translate HTTP query parameters into a typed [`query::Predicate`] with the
//! [`query::QueryBuilder`], which a [`query::Collection`] (PostgreSQL via [`service::PgCollection`])
//! renders into parameterized SQL.

pub mod access;
pub mod case;
pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod migration;
pub mod model;
pub mod query;
pub mod response;
pub mod routes;
pub mod service;
pub mod sql;
pub mod state;
pub mod store;

pub use config::AppConfig;
pub use error::{AppError, ConfigError, ModelError};
pub use migration::apply_migrations;
pub use model::{marketplace_model, ResolvedModel};
pub use routes::app_router;
pub use state::AppState;
pub use store::ensure_database_exists;
