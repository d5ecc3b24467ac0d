//! Read services: each endpoint configures a QueryBuilder, or a single lookup, over a collection from the data source.

mod admin;
mod availability;
mod booking;
mod crud;
mod listing;
mod message;
mod notification;
mod payment;
mod review;
mod user;
mod validation;
mod wishlist;

pub use admin::AdminService;
pub use availability::AvailabilityService;
pub use booking::BookingService;
pub use crud::{PgCollection, PgDataSource};
pub use listing::ListingService;
pub use message::MessageService;
pub use notification::NotificationService;
pub use payment::PaymentService;
pub use review::ReviewService;
pub use user::UserService;
pub use validation::{Format, ParamRule, QueryValidator};
pub use wishlist::WishlistService;

use crate::error::AppError;
use crate::query::PageMeta;
use serde_json::Value;
use uuid::Uuid;

/// One page of rows plus its metadata.
#[derive(Debug)]
pub struct Page {
    pub items: Vec<Value>,
    pub meta: PageMeta,
}

/// Path identifiers must be UUIDs; anything else can never match a row.
pub fn parse_id(name: &str, raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw.trim()).map_err(|_| AppError::Validation(format!("{} must be a valid UUID", name)))
}
