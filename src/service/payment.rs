use crate::access::{require, Capability, Role};
use crate::error::AppError;
use crate::model::marketplace::{BOOKINGS, PAYMENTS};
use crate::query::{DataSource, Predicate};
use crate::service::booking::can_view;
use crate::service::parse_id;
use serde_json::Value;
use uuid::Uuid;

pub struct PaymentService;

impl PaymentService {
    /// Payment of a booking the caller may see.
    pub async fn by_booking(source: &dyn DataSource, booking_id: &str, user_id: Uuid, role: Role) -> Result<Value, AppError> {
        require(role, Capability::ListOwnBookings)?;
        let booking_id = parse_id("bookingId", booking_id)?;
        let booking = source
            .collection(BOOKINGS)?
            .find_first(Predicate::new().eq("id", booking_id), Vec::new())
            .await?
            .ok_or_else(|| AppError::NotFound("Booking not found".into()))?;
        if !can_view(&booking, user_id, role) {
            let message = match role {
                Role::Guide => "You can only view payment for bookings on your listings",
                _ => "You can only view payment for your own bookings",
            };
            return Err(AppError::Forbidden(message.into()));
        }
        source
            .collection(PAYMENTS)?
            .find_first(Predicate::new().eq("bookingId", booking_id), Vec::new())
            .await?
            .ok_or_else(|| AppError::NotFound("Payment not found for this booking".into()))
    }
}
