//! HTTP handlers: extract identity and query, call a service, wrap the result in the envelope.

pub mod account;
pub mod admin;
pub mod catalog;
