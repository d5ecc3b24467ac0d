//! Process configuration, read once at startup and injected through `AppState`.

mod env;

pub use env::*;
