//! Routers: health checks and the versioned API.

mod api;
mod common;

pub use api::{app_router, API_PREFIX};
pub use common::common_routes;
