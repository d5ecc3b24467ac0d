//! Standard response envelope helpers.

use crate::query::PageMeta;
use crate::service::Page;
use axum::{http::StatusCode, Json};
use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<PageMeta>,
    pub data: T,
}

fn keyed(key: &str, value: Value) -> Value {
    let mut data = Map::new();
    data.insert(key.to_string(), value);
    Value::Object(data)
}

/// One page under `data.<key>`, with pagination meta beside it.
pub fn success_page(message: &'static str, key: &str, page: Page) -> (StatusCode, Json<Envelope<Value>>) {
    (
        StatusCode::OK,
        Json(Envelope {
            success: true,
            message,
            meta: Some(page.meta),
            data: keyed(key, Value::Array(page.items)),
        }),
    )
}

/// A single value under `data.<key>`.
pub fn success_one(message: &'static str, key: &str, value: Value) -> (StatusCode, Json<Envelope<Value>>) {
    success_data(message, keyed(key, value))
}

/// `data` exactly as given.
pub fn success_data(message: &'static str, data: Value) -> (StatusCode, Json<Envelope<Value>>) {
    (
        StatusCode::OK,
        Json(Envelope {
            success: true,
            message,
            meta: None,
            data,
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn page_envelope_shape() {
        let page = Page {
            items: vec![json!({"id": 1})],
            meta: PageMeta::new(2, 10, 11),
        };
        let (status, Json(body)) = success_page("Listings retrieved successfully", "listings", page);
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            serde_json::to_value(body).unwrap(),
            json!({
                "success": true,
                "message": "Listings retrieved successfully",
                "meta": {"page": 2, "limit": 10, "total": 11, "totalPage": 2},
                "data": {"listings": [{"id": 1}]}
            })
        );
    }

    #[test]
    fn single_value_has_no_meta() {
        let (_, Json(body)) = success_one("Unread count retrieved successfully", "count", json!(3));
        let v = serde_json::to_value(body).unwrap();
        assert!(v.get("meta").is_none());
        assert_eq!(v["data"]["count"], 3);
    }

    #[test]
    fn data_is_passed_through() {
        let (_, Json(body)) = success_data("Availability checked successfully", json!({"available": false, "slots": []}));
        let v = serde_json::to_value(body).unwrap();
        assert_eq!(v["data"], json!({"available": false, "slots": []}));
    }
}
