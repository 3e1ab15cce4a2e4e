//! Error types for the Soundshelf server

use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use bounded_file_store::StoreError;
use serde_json::json;
use std::fmt;

/// Startup and serving errors
#[derive(Debug)]
pub enum ServerError {
    Store(StoreError),
    Io(Box<std::io::Error>),
    Config(String),
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerError::Store(err) => write!(f, "Store error: {}", err),
            ServerError::Io(err) => write!(f, "IO error: {}", err),
            ServerError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for ServerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ServerError::Store(err) => Some(err),
            ServerError::Io(err) => Some(err.as_ref()),
            ServerError::Config(_) => None,
        }
    }
}

impl From<StoreError> for ServerError {
    fn from(err: StoreError) -> Self {
        ServerError::Store(err)
    }
}

impl From<std::io::Error> for ServerError {
    fn from(err: std::io::Error) -> Self {
        ServerError::Io(Box::new(err))
    }
}

impl From<tracing_subscriber::filter::ParseError> for ServerError {
    fn from(err: tracing_subscriber::filter::ParseError) -> Self {
        ServerError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ServerError>;

/// Request error that converts to a JSON HTTP response
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    Multipart(MultipartError),
    Store(StoreError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Multipart(err) => (err.status(), err.body_text()),
            AppError::Store(err) => {
                let status = match &err {
                    StoreError::InvalidFormat(_) | StoreError::InvalidName(_) => {
                        StatusCode::BAD_REQUEST
                    }
                    StoreError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
                    StoreError::AlreadyExists(_) => StatusCode::CONFLICT,
                    StoreError::NotFound(_) => StatusCode::NOT_FOUND,
                    StoreError::Unauthorized => StatusCode::UNAUTHORIZED,
                    StoreError::Io(e) => {
                        tracing::error!(error = %e, "Storage error");
                        return (
                            StatusCode::INTERNAL_SERVER_ERROR,
                            axum::Json(json!({ "error": "Internal server error" })),
                        )
                            .into_response();
                    }
                };
                (status, err.to_string())
            }
        };

        (status, axum::Json(json!({ "error": message }))).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Store(err)
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        AppError::Multipart(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_config_error_display() {
        let err = ServerError::Config("unknown eviction policy: lru".to_string());
        assert_eq!(
            format!("{}", err),
            "Configuration error: unknown eviction policy: lru"
        );
    }

    #[test]
    fn test_store_error_display() {
        let err = ServerError::from(StoreError::Unauthorized);
        assert_eq!(format!("{}", err), "Store error: Invalid API key");
    }

    #[test]
    fn test_store_errors_map_to_status() {
        assert_eq!(
            status_of(StoreError::InvalidFormat("a.txt".into()).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(StoreError::InvalidName("../a.mp3".into()).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(
                StoreError::TooLarge {
                    size: 2,
                    capacity: 1
                }
                .into()
            ),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            status_of(StoreError::AlreadyExists("a.mp3".into()).into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(StoreError::NotFound("a.mp3".into()).into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(StoreError::Unauthorized.into()),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(StoreError::from(std::io::Error::other("disk full")).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(AppError::BadRequest("missing file".into())),
            StatusCode::BAD_REQUEST
        );
    }
}
