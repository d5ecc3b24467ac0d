//! Handlers for the caller's bookings, payments, messages, notifications, profile and wishlist.

use crate::error::AppError;
use crate::extractors::AuthUser;
use crate::query::RawParams;
use crate::response::{success_one, success_page};
use crate::service::{BookingService, MessageService, NotificationService, PaymentService, UserService, WishlistService};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};

pub async fn my_bookings(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<RawParams>,
) -> Result<impl IntoResponse, AppError> {
    let page = BookingService::list_for(&state.source(), user.id, user.role, params).await?;
    Ok(success_page("Bookings retrieved successfully", "bookings", page))
}

pub async fn get_booking(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let booking = BookingService::get(&state.source(), &id, user.id, user.role).await?;
    Ok(success_one("Booking retrieved successfully", "booking", booking))
}

pub async fn booking_payment(
    State(state): State<AppState>,
    user: AuthUser,
    Path(booking_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let payment = PaymentService::by_booking(&state.source(), &booking_id, user.id, user.role).await?;
    Ok(success_one("Payment retrieved successfully", "payment", payment))
}

pub async fn booking_messages(
    State(state): State<AppState>,
    user: AuthUser,
    Path(booking_id): Path<String>,
    Query(params): Query<RawParams>,
) -> Result<impl IntoResponse, AppError> {
    let page = MessageService::by_booking(&state.source(), &booking_id, user.id, user.role, params).await?;
    Ok(success_page("Messages retrieved successfully", "messages", page))
}

pub async fn my_notifications(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<RawParams>,
) -> Result<impl IntoResponse, AppError> {
    let page = NotificationService::list(&state.source(), user.id, user.role, params).await?;
    Ok(success_page("Notifications retrieved successfully", "notifications", page))
}

pub async fn unread_count(State(state): State<AppState>, user: AuthUser) -> Result<impl IntoResponse, AppError> {
    let count = NotificationService::unread_count(&state.source(), user.id, user.role).await?;
    Ok(success_one("Unread count retrieved successfully", "count", count.into()))
}

pub async fn my_profile(State(state): State<AppState>, user: AuthUser) -> Result<impl IntoResponse, AppError> {
    let profile = UserService::me(&state.source(), user.id).await?;
    Ok(success_one("Profile retrieved successfully", "user", profile))
}

pub async fn user_profile(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let profile = UserService::profile(&state.source(), &id).await?;
    Ok(success_one("User profile retrieved successfully", "user", profile))
}

pub async fn my_wishlist(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<RawParams>,
) -> Result<impl IntoResponse, AppError> {
    let page = WishlistService::list(&state.source(), user.id, params).await?;
    Ok(success_page("Wishlist retrieved successfully", "wishlist", page))
}

pub async fn wishlist_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(listing_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let saved = WishlistService::contains(&state.source(), user.id, &listing_id).await?;
    Ok(success_one("Wishlist status retrieved successfully", "isInWishlist", saved.into()))
}
