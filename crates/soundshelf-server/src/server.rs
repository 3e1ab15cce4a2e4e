//! HTTP server for the audio store
//!
//! Provides /health, /upload, /music and /music/{name} endpoints, and serves
//! stored files under /uploads.

use crate::config::ServerConfig;
use crate::error::AppError;
use crate::types::{HealthResponse, ListResponse, MessageResponse, UploadResponse};
use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{header, HeaderMap, HeaderName, HeaderValue, Method},
    response::Json,
    routing::{delete, get, post},
    Router,
};
use bounded_file_store::BoundedStore;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tracing::{info, warn};

/// Header carrying the delete credential
pub const API_KEY_HEADER: &str = "x-api-key";

/// Multipart field holding the uploaded file
const UPLOAD_FIELD: &str = "file";

/// Shared state for the HTTP server
pub struct ServerState {
    pub store: BoundedStore,
    pub started_at: DateTime<Utc>,
}

impl ServerState {
    pub fn new(store: BoundedStore) -> Self {
        Self {
            store,
            started_at: Utc::now(),
        }
    }
}

pub type SharedState = Arc<ServerState>;

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static(API_KEY_HEADER)])
        .allow_credentials(true)
}

/// Create the HTTP router
pub fn create_router(state: SharedState, config: &ServerConfig) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/upload", post(upload))
        .route("/music", get(list_music))
        .route("/music/{name}", delete(delete_music))
        .nest_service("/uploads", ServeDir::new(&config.upload_dir))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(cors_layer(&config.cors_origins))
        .with_state(state)
}

/// Start the HTTP server
pub async fn start_server(state: SharedState, config: &ServerConfig) -> std::io::Result<()> {
    let router = create_router(state, config);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await
}

/// Health check endpoint
async fn health(State(state): State<SharedState>) -> Result<Json<HealthResponse>, AppError> {
    let storage = state.store.stats().await?;
    let uptime_secs = (Utc::now() - state.started_at).num_seconds() as u64;

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        uptime_secs,
        storage,
    }))
}

/// POST /upload
/// Multipart form with a `file` field; its file name becomes the stored name.
async fn upload(
    State(state): State<SharedState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let name = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| AppError::BadRequest("Missing file name".to_string()))?;
        let data = field.bytes().await?;

        let receipt = state.store.upload(&name, &data).await?;
        return Ok(Json(receipt.into()));
    }

    Err(AppError::BadRequest(format!(
        "Missing '{}' field",
        UPLOAD_FIELD
    )))
}

/// GET /music
async fn list_music(State(state): State<SharedState>) -> Result<Json<ListResponse>, AppError> {
    let files = state.store.list().await?;
    Ok(Json(ListResponse { files }))
}

/// DELETE /music/{name}
async fn delete_music(
    State(state): State<SharedState>,
    Path(name): Path<String>,
    headers: HeaderMap,
) -> Result<Json<MessageResponse>, AppError> {
    let credential = headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok());

    state.store.delete(&name, credential).await?;

    Ok(Json(MessageResponse {
        message: format!("File {} deleted successfully", name),
    }))
}
