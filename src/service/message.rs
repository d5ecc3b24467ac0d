use crate::access::{require, Capability, Role};
use crate::error::AppError;
use crate::model::marketplace::{BOOKINGS, MESSAGES};
use crate::query::{window_params, DataSource, Include, Order, Predicate, QueryBuilder, RawParams};
use crate::service::{parse_id, Page};
use uuid::Uuid;

/// Chat history is read oldest first in one large page.
const MESSAGE_PAGE_LIMIT: u64 = 100;

fn participant(relation: &str) -> Include {
    Include::new(relation)
        .select(&["id", "name", "role"])
        .with(Include::new("profile").select(&["avatarUrl"]))
}

pub struct MessageService;

impl MessageService {
    /// Messages of one booking. Only the booking's tourist and guide may read them.
    pub async fn by_booking(
        source: &dyn DataSource,
        booking_id: &str,
        user_id: Uuid,
        role: Role,
        params: RawParams,
    ) -> Result<Page, AppError> {
        require(role, Capability::ReadBookingMessages)?;
        let booking_id = parse_id("bookingId", booking_id)?;
        let booking = source
            .collection(BOOKINGS)?
            .find_first(Predicate::new().eq("id", booking_id), Vec::new())
            .await?
            .ok_or_else(|| AppError::NotFound("Booking not found".into()))?;

        let me = user_id.to_string();
        let is_party = ["touristId", "guideId"]
            .iter()
            .any(|k| booking.get(*k).and_then(|v| v.as_str()) == Some(me.as_str()));
        if !is_party {
            return Err(AppError::Forbidden("You can only view messages for your own bookings".into()));
        }

        // Only the window is client-controlled; other keys never filter messages.
        let qb = QueryBuilder::new(source.collection(MESSAGES)?, window_params(params))
            .filter(Predicate::new().eq("bookingId", booking_id))
            .sort(Order::asc("createdAt"))
            .paginate_with(1, MESSAGE_PAGE_LIMIT)
            .include(vec![participant("fromUser"), participant("toUser")]);
        let (items, meta) = qb.execute().await?;
        Ok(Page { items, meta })
    }
}
