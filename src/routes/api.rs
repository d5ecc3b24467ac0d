//! The `/api/v1` router.

use crate::handlers::{account, admin, catalog};
use crate::routes::common_routes;
use crate::state::AppState;
use axum::{routing::get, Router};
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

pub const API_PREFIX: &str = "/api/v1";

fn v1_routes() -> Router<AppState> {
    Router::new()
        .merge(common_routes())
        .route("/listings", get(catalog::list_listings))
        .route("/listings/:id", get(catalog::get_listing))
        .route("/reviews/listings/:id", get(catalog::listing_reviews))
        .route("/availability", get(catalog::list_availability))
        .route("/availability/check", get(catalog::check_availability))
        .route("/bookings/me", get(account::my_bookings))
        .route("/bookings/:id", get(account::get_booking))
        .route("/bookings/:id/messages", get(account::booking_messages))
        .route("/payments/booking/:booking_id", get(account::booking_payment))
        .route("/notifications", get(account::my_notifications))
        .route("/notifications/unread-count", get(account::unread_count))
        .route("/users/me", get(account::my_profile))
        .route("/users/:id", get(account::user_profile))
        .route("/wishlist", get(account::my_wishlist))
        .route("/wishlist/check/:listing_id", get(account::wishlist_status))
        .route("/admin/users", get(admin::users))
        .route("/admin/listings", get(admin::listings))
        .route("/admin/bookings", get(admin::bookings))
}

/// Full application router with body limit and request tracing.
pub fn app_router(state: AppState) -> Router {
    let limit = state.config.request_body_limit;
    Router::new()
        .nest(API_PREFIX, v1_routes())
        .layer(RequestBodyLimitLayer::new(limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::model::marketplace_model;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    fn app() -> Router {
        let config = AppConfig::from_lookup(|_| None).unwrap();
        let pool = PgPoolOptions::new().connect_lazy(&config.database_url).unwrap();
        app_router(AppState::new(pool, marketplace_model("public"), config))
    }

    async fn call(req: Request<Body>) -> (StatusCode, Value) {
        let resp = app().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn health_is_served_under_prefix() {
        let (status, body) = call(get("/api/v1/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Voyago API v1 is healthy");
    }

    #[tokio::test]
    async fn authenticated_routes_need_identity() {
        for uri in [
            "/api/v1/bookings/me",
            "/api/v1/bookings/0b3c6d5e-2222-4c1e-9d59-0a7f3e1c2b11",
            "/api/v1/payments/booking/0b3c6d5e-2222-4c1e-9d59-0a7f3e1c2b11",
            "/api/v1/notifications",
            "/api/v1/users/me",
            "/api/v1/users/0b3c6d5e-3333-4c1e-9d59-0a7f3e1c2b11",
            "/api/v1/wishlist",
            "/api/v1/wishlist/check/0b3c6d5e-7777-4c1e-9d59-0a7f3e1c2b11",
            "/api/v1/admin/users",
        ] {
            let (status, body) = call(get(uri)).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{}", uri);
            assert_eq!(body["success"], false);
        }
    }

    #[tokio::test]
    async fn admin_routes_reject_other_roles() {
        let req = Request::builder()
            .uri("/api/v1/admin/bookings")
            .header("X-User-Id", "0b3c6d5e-3333-4c1e-9d59-0a7f3e1c2b11")
            .header("X-User-Role", "TOURIST")
            .body(Body::empty())
            .unwrap();
        let (status, body) = call(req).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["code"], "forbidden");
    }

    #[tokio::test]
    async fn invalid_query_is_rejected_before_the_database() {
        let (status, body) = call(get("/api/v1/listings?category=KARAOKE")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "validation_error");

        let (status, _) = call(get("/api/v1/listings/not-a-uuid")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = call(get("/api/v1/availability/check?date=2026-05-06T00:00:00Z")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "guideId is required");
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let (status, _) = call(get("/api/v1/payments")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
