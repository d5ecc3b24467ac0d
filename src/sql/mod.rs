//! Safe SQL rendering: identifiers from the entity model only, values as parameters.

mod builder;
pub mod params;
pub use builder::*;
pub use params::*;
