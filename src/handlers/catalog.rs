//! Public catalogue handlers: listings, their reviews and guide availability.

use crate::error::AppError;
use crate::extractors::MaybeUser;
use crate::query::RawParams;
use crate::response::{success_data, success_one, success_page};
use crate::service::{AvailabilityService, ListingService, ReviewService};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};

pub async fn list_listings(
    State(state): State<AppState>,
    Query(params): Query<RawParams>,
) -> Result<impl IntoResponse, AppError> {
    let page = ListingService::list(&state.source(), params).await?;
    Ok(success_page("Listings retrieved successfully", "listings", page))
}

pub async fn get_listing(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let listing = ListingService::get(&state.source(), &id).await?;
    Ok(success_one("Listing retrieved successfully", "listing", listing))
}

pub async fn listing_reviews(
    State(state): State<AppState>,
    Path(listing_id): Path<String>,
    Query(params): Query<RawParams>,
) -> Result<impl IntoResponse, AppError> {
    let page = ReviewService::by_listing(&state.source(), &listing_id, params).await?;
    Ok(success_page("Reviews retrieved successfully", "reviews", page))
}

pub async fn list_availability(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Query(params): Query<RawParams>,
) -> Result<impl IntoResponse, AppError> {
    let caller = user.map(|u| (u.id, u.role));
    let page = AvailabilityService::list(&state.source(), caller, params).await?;
    Ok(success_page("Availability slots retrieved successfully", "slots", page))
}

pub async fn check_availability(
    State(state): State<AppState>,
    Query(params): Query<RawParams>,
) -> Result<impl IntoResponse, AppError> {
    let result = AvailabilityService::check(&state.source(), &params).await?;
    Ok(success_data("Availability checked successfully", result))
}
