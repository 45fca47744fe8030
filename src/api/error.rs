use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use tracing::error;

/// Build a `302 Found` redirect. `axum::response::Redirect` answers with
/// 303 for `to`, while the browser flows here rely on 302.
pub fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

#[derive(Debug)]
pub enum ApiError {
    /// No logged-in session, redirect to the login page
    Unauthenticated,
    /// Login attempt with an unknown email or wrong password
    BadCredentials,
    /// Authenticated, but not the owner of the targeted todo
    NotOwner,
    /// Missing or mismatched `_csrf` token
    InvalidCsrf,
    Validation(String),
    Conflict(&'static str),
    NotFound,
    Internal(&'static str),
    Database(sqlx::Error),
}

impl From<sqlx::Error> for ApiError {
    fn from(error: sqlx::Error) -> Self {
        Self::Database(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Unauthenticated => found("/login"),

            Self::BadCredentials => (
                StatusCode::UNAUTHORIZED,
                Json(json!({"error": "Invalid email or password"})),
            )
                .into_response(),

            Self::NotOwner => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({"error": "You can only modify your own todos"})),
            )
                .into_response(),

            Self::InvalidCsrf => (
                StatusCode::FORBIDDEN,
                Json(json!({"error": "Invalid CSRF token"})),
            )
                .into_response(),

            Self::Validation(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({"error": message}))).into_response()
            }

            Self::Conflict(message) => {
                (StatusCode::CONFLICT, Json(json!({"error": message}))).into_response()
            }

            Self::NotFound => (
                StatusCode::NOT_FOUND,
                Json(json!({"error": "Not found"})),
            )
                .into_response(),

            Self::Internal(message) => {
                error!("Internal error: {}", message);

                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"error": "Internal server error"})),
                )
                    .into_response()
            }

            Self::Database(error) => {
                error!("Database error: {}", error);

                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"error": "Internal server error"})),
                )
                    .into_response()
            }
        }
    }
}
