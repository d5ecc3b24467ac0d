//! Typed errors and HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("missing reference: {kind} '{id}'")]
    MissingReference { kind: &'static str, id: String },
    #[error("invalid primary key: entity {entity} column {column}")]
    InvalidPrimaryKey { entity: String, column: String },
    #[error("duplicate name: {0}")]
    DuplicateName(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    Missing(&'static str),
    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Validation(String),
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub message: String,
    pub code: &'static str,
}

/// Status, machine code and client message for a database error.
fn classify_db(e: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match e {
        sqlx::Error::RowNotFound => (StatusCode::NOT_FOUND, "not_found", "Record not found".into()),
        sqlx::Error::Database(db) => match db.code().as_deref() {
            Some("23505") => (StatusCode::CONFLICT, "conflict", "Duplicate value violates a unique constraint".into()),
            Some("23503") => (
                StatusCode::BAD_REQUEST,
                "bad_request",
                "Invalid reference: related record does not exist".into(),
            ),
            Some("22P02") | Some("22007") | Some("22008") | Some("22003") => {
                (StatusCode::BAD_REQUEST, "bad_request", "Invalid input data".into())
            }
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "database_error", "Something went wrong".into()),
        },
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "database_error", "Something went wrong".into()),
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Model(_) | AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Db(e) => classify_db(e).0,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Model(_) | AppError::Config(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "Something went wrong".to_string(),
            ),
            AppError::Db(e) => classify_db(e),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found", self.to_string()),
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error", self.to_string()),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request", self.to_string()),
            AppError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "unauthorized", self.to_string()),
            AppError::Forbidden(_) => (StatusCode::FORBIDDEN, "forbidden", self.to_string()),
        };
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = ErrorBody {
            success: false,
            message,
            code,
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(AppError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::Unauthorized("x".into()).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::Forbidden("x".into()).status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::Db(sqlx::Error::RowNotFound).status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::Db(sqlx::Error::PoolTimedOut).status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            AppError::Model(ModelError::DuplicateName("a".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn body_carries_success_false() {
        let resp = AppError::BadRequest("unknown field 'foo' on listings".into()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let v: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(v["success"], false);
        assert_eq!(v["code"], "bad_request");
        assert_eq!(v["message"], "unknown field 'foo' on listings");
    }
}
