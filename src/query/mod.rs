//! Dynamic query builder: HTTP query parameters to filter, search, sort and page window.

mod builder;
pub mod collection;
pub mod params;
pub mod predicate;

pub use builder::*;
pub use collection::*;
pub use params::RawParams;
pub use predicate::*;
