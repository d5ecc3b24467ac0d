//! The marketplace catalog: every table the API reads.

use crate::model::resolved::{ColumnInfo as C, IncludeDirection::*, ResolvedEntity, ResolvedModel};

pub const USERS: &str = "users";
pub const PROFILES: &str = "profiles";
pub const GUIDE_PROFILES: &str = "guide_profiles";
pub const LISTINGS: &str = "listings";
pub const LISTING_IMAGES: &str = "listing_images";
pub const AVAILABILITY_SLOTS: &str = "availability_slots";
pub const BOOKINGS: &str = "bookings";
pub const PAYMENTS: &str = "payments";
pub const REVIEWS: &str = "reviews";
pub const MESSAGES: &str = "messages";
pub const NOTIFICATIONS: &str = "notifications";
pub const WISHLISTS: &str = "wishlists";

fn id() -> C {
    C::new("id", "uuid").primary_key().default("gen_random_uuid()")
}

fn created_at() -> C {
    C::new("created_at", "timestamptz").not_null().default("now()")
}

fn updated_at() -> C {
    C::new("updated_at", "timestamptz").not_null().default("now()")
}

fn fk(name: &str, entity: &str) -> C {
    C::new(name, "uuid").not_null().references(entity, "id")
}

/// Build the marketplace model with every table in `schema`.
pub fn marketplace_model(schema: &str) -> ResolvedModel {
    let users = ResolvedEntity::new(
        schema,
        USERS,
        vec![
            id(),
            C::new("name", "text").not_null(),
            C::new("email", "text").not_null().unique(),
            C::new("password", "text").not_null(),
            C::new("role", "text").not_null().default("'TOURIST'"),
            C::new("is_approved", "boolean").not_null().default("true"),
            C::new("is_banned", "boolean").not_null().default("false"),
            C::new("is_email_verified", "boolean").not_null().default("false"),
            created_at(),
            updated_at(),
        ],
    )
    .sensitive("password")
    .relation("profile", ToOne, PROFILES, "id", "user_id")
    .relation("guideProfile", ToOne, GUIDE_PROFILES, "id", "user_id")
    .index(&["role"]);

    let profiles = ResolvedEntity::new(
        schema,
        PROFILES,
        vec![
            id(),
            fk("user_id", USERS).unique(),
            C::new("bio", "text"),
            C::new("avatar_url", "text"),
            C::new("languages", "text[]").not_null().default("'{}'"),
            C::new("city", "text"),
            C::new("country", "text"),
            C::new("preferences", "text[]").not_null().default("'{}'"),
            created_at(),
            updated_at(),
        ],
    );

    let guide_profiles = ResolvedEntity::new(
        schema,
        GUIDE_PROFILES,
        vec![
            id(),
            fk("user_id", USERS).unique(),
            C::new("expertise", "text[]").not_null().default("'{}'"),
            C::new("daily_rate", "double precision"),
            C::new("experience_years", "integer"),
            C::new("verification_status", "text").not_null().default("'PENDING'"),
            created_at(),
            updated_at(),
        ],
    );

    let listings = ResolvedEntity::new(
        schema,
        LISTINGS,
        vec![
            id(),
            fk("guide_id", USERS),
            C::new("title", "text").not_null(),
            C::new("description", "text").not_null(),
            C::new("itinerary", "text"),
            C::new("city", "text").not_null(),
            C::new("country", "text").not_null(),
            C::new("category", "text").not_null(),
            C::new("languages", "text[]").not_null().default("'{}'"),
            C::new("tour_fee", "double precision").not_null(),
            C::new("fee_type", "text").not_null().default("'PER_PERSON'"),
            C::new("duration", "integer").not_null(),
            C::new("meeting_point", "text"),
            C::new("meeting_lat", "double precision"),
            C::new("meeting_lng", "double precision"),
            C::new("max_group_size", "integer").not_null(),
            C::new("status", "text").not_null().default("'DRAFT'"),
            C::new("avg_rating", "double precision").not_null().default("0"),
            C::new("total_reviews", "integer").not_null().default("0"),
            C::new("deleted_at", "timestamptz"),
            created_at(),
            updated_at(),
        ],
    )
    .relation("images", ToMany, LISTING_IMAGES, "id", "listing_id")
    .relation("guide", ToOne, USERS, "guide_id", "id")
    .index(&["status"])
    .index(&["guide_id"])
    .index(&["city"]);

    let listing_images = ResolvedEntity::new(
        schema,
        LISTING_IMAGES,
        vec![
            id(),
            fk("listing_id", LISTINGS),
            C::new("url", "text").not_null(),
            C::new("order", "integer").not_null().default("0"),
            created_at(),
        ],
    )
    .index(&["listing_id"]);

    let availability_slots = ResolvedEntity::new(
        schema,
        AVAILABILITY_SLOTS,
        vec![
            id(),
            fk("guide_id", USERS),
            C::new("date", "timestamptz"),
            C::new("day_of_week", "integer"),
            C::new("start_time", "text").not_null(),
            C::new("end_time", "text").not_null(),
            C::new("is_recurring", "boolean").not_null().default("false"),
            C::new("is_active", "boolean").not_null().default("true"),
            created_at(),
            updated_at(),
        ],
    )
    .index(&["guide_id"]);

    let bookings = ResolvedEntity::new(
        schema,
        BOOKINGS,
        vec![
            id(),
            fk("listing_id", LISTINGS),
            fk("tourist_id", USERS),
            fk("guide_id", USERS),
            C::new("date", "timestamptz").not_null(),
            C::new("group_size", "integer").not_null(),
            C::new("total_price", "double precision").not_null(),
            C::new("platform_fee", "double precision").not_null().default("0"),
            C::new("note", "text"),
            C::new("status", "text").not_null().default("'PENDING'"),
            C::new("cancelled_at", "timestamptz"),
            C::new("cancel_reason", "text"),
            created_at(),
            updated_at(),
        ],
    )
    .relation("listing", ToOne, LISTINGS, "listing_id", "id")
    .relation("tourist", ToOne, USERS, "tourist_id", "id")
    .relation("guide", ToOne, USERS, "guide_id", "id")
    .relation("payment", ToOne, PAYMENTS, "id", "booking_id")
    .relation("review", ToOne, REVIEWS, "id", "booking_id")
    .index(&["tourist_id"])
    .index(&["guide_id"])
    .index(&["status"]);

    let payments = ResolvedEntity::new(
        schema,
        PAYMENTS,
        vec![
            id(),
            fk("booking_id", BOOKINGS).unique(),
            C::new("amount", "double precision").not_null(),
            C::new("currency", "text").not_null().default("'usd'"),
            C::new("status", "text").not_null().default("'PENDING'"),
            C::new("stripe_checkout_session_id", "text"),
            C::new("stripe_payment_intent_id", "text"),
            C::new("paid_at", "timestamptz"),
            C::new("refunded_at", "timestamptz"),
            created_at(),
            updated_at(),
        ],
    );

    let reviews = ResolvedEntity::new(
        schema,
        REVIEWS,
        vec![
            id(),
            fk("booking_id", BOOKINGS).unique(),
            fk("listing_id", LISTINGS),
            fk("tourist_id", USERS),
            C::new("rating", "integer").not_null(),
            C::new("title", "text"),
            C::new("comment", "text"),
            created_at(),
            updated_at(),
        ],
    )
    .relation("tourist", ToOne, USERS, "tourist_id", "id")
    .relation("listing", ToOne, LISTINGS, "listing_id", "id")
    .index(&["listing_id"]);

    let messages = ResolvedEntity::new(
        schema,
        MESSAGES,
        vec![
            id(),
            fk("booking_id", BOOKINGS),
            fk("from_user_id", USERS),
            fk("to_user_id", USERS),
            C::new("body", "text").not_null(),
            C::new("read_at", "timestamptz"),
            created_at(),
            updated_at(),
        ],
    )
    .relation("fromUser", ToOne, USERS, "from_user_id", "id")
    .relation("toUser", ToOne, USERS, "to_user_id", "id")
    .index(&["booking_id"]);

    let notifications = ResolvedEntity::new(
        schema,
        NOTIFICATIONS,
        vec![
            id(),
            fk("user_id", USERS),
            C::new("type", "text").not_null(),
            C::new("title", "text").not_null(),
            C::new("message", "text").not_null(),
            C::new("data_json", "jsonb"),
            C::new("read_at", "timestamptz"),
            created_at(),
            updated_at(),
        ],
    )
    .index(&["user_id"]);

    let wishlists = ResolvedEntity::new(
        schema,
        WISHLISTS,
        vec![id(), fk("user_id", USERS), fk("listing_id", LISTINGS), created_at()],
    )
    .relation("listing", ToOne, LISTINGS, "listing_id", "id")
    .unique_index(&["user_id", "listing_id"]);

    ResolvedModel::new(vec![
        users,
        profiles,
        guide_profiles,
        listings,
        listing_images,
        availability_slots,
        bookings,
        payments,
        reviews,
        messages,
        notifications,
        wishlists,
    ])
}
