//! Entity model: the marketplace catalog, its runtime types and integrity checks.

pub mod marketplace;
pub mod resolved;
pub mod validator;

pub use marketplace::marketplace_model;
pub use resolved::*;
pub use validator::*;
