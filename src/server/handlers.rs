//! HTTP request handlers for the photomosaic API.
//!
//! # Endpoints
//!
//! - `GET /` - Upload page
//! - `POST /upload` - Build a mosaic from a multipart upload
//! - `GET /tiles/stats` - Tile corpus size
//! - `GET /health` - Health check endpoint

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::error::{MosaicError, SourceError};
use crate::mosaic::{decode_image, Compositor, MosaicEncoder};
use crate::source::TileSource;

use super::page::render_index;

// =============================================================================
// Application State
// =============================================================================

/// Shared application state containing the compositor.
pub struct AppState<S: TileSource> {
    /// The compositor holding the tile corpus
    pub compositor: Arc<Compositor<S>>,

    /// JPEG encoder for finished mosaics
    pub encoder: MosaicEncoder,

    /// Cell size used when the upload does not name one
    pub default_cell_size: u32,

    /// Largest cell size an upload may request
    pub max_cell_size: u32,
}

impl<S: TileSource> AppState<S> {
    pub fn new(compositor: Compositor<S>, encoder: MosaicEncoder) -> Self {
        Self {
            compositor: Arc::new(compositor),
            encoder,
            default_cell_size: crate::config::DEFAULT_CELL_SIZE,
            max_cell_size: crate::config::DEFAULT_MAX_CELL_SIZE,
        }
    }

    /// Set the default and maximum cell sizes.
    pub fn with_cell_sizes(mut self, default_cell_size: u32, max_cell_size: u32) -> Self {
        self.default_cell_size = default_cell_size;
        self.max_cell_size = max_cell_size;
        self
    }
}

impl<S: TileSource> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            compositor: Arc::clone(&self.compositor),
            encoder: self.encoder,
            default_cell_size: self.default_cell_size,
            max_cell_size: self.max_cell_size,
        }
    }
}

// =============================================================================
// Response Types
// =============================================================================

/// JSON error response returned for all error conditions.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error type identifier (e.g., "pool_exhausted", "invalid_upload")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// HTTP status code (included for convenience)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            status: None,
        }
    }

    pub fn with_status(
        error: impl Into<String>,
        message: impl Into<String>,
        status: StatusCode,
    ) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            status: Some(status.as_u16()),
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Tile corpus statistics.
#[derive(Debug, Serialize)]
pub struct TileStatsResponse {
    /// Number of usable tiles, the most cells one mosaic can have
    pub tiles: usize,
}

// =============================================================================
// Error Mapping
// =============================================================================

/// Log an error response at a level matching its severity.
fn log_error(status: StatusCode, error_type: &str, message: &str) {
    if status.is_server_error() {
        error!(
            error_type = error_type,
            status = status.as_u16(),
            "Server error: {}",
            message
        );
    } else {
        warn!(
            error_type = error_type,
            status = status.as_u16(),
            "Client error: {}",
            message
        );
    }
}

/// Convert MosaicError to HTTP response.
///
/// - 4xx errors are logged at WARN level (client errors)
/// - 5xx errors are logged at ERROR level (server errors)
impl IntoResponse for MosaicError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            MosaicError::InvalidCellSize { .. } => (StatusCode::BAD_REQUEST, "invalid_cell_size"),
            MosaicError::EmptyImage => (StatusCode::BAD_REQUEST, "empty_image"),
            MosaicError::Decode { .. } => (StatusCode::BAD_REQUEST, "decode_error"),
            MosaicError::PoolExhausted => (StatusCode::UNPROCESSABLE_ENTITY, "pool_exhausted"),
            MosaicError::Timeout { .. } => (StatusCode::GATEWAY_TIMEOUT, "timeout"),
            MosaicError::Source(SourceError::NotFound(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "tile_not_found")
            }
            MosaicError::Source(SourceError::Io(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "tile_io_error")
            }
            MosaicError::Encode { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "encode_error"),
            MosaicError::RegionTask { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "region_failed"),
        };

        let message = match &self {
            MosaicError::PoolExhausted => format!(
                "{}; use a larger tile size or a smaller image",
                self
            ),
            _ => self.to_string(),
        };
        log_error(status, error_type, &message);

        let error_response = ErrorResponse::with_status(error_type, message, status);
        (status, Json(error_response)).into_response()
    }
}

/// Errors returned by the upload handler.
#[derive(Debug)]
pub enum HandlerError {
    /// The multipart form was malformed or incomplete
    InvalidUpload(String),

    /// The upload exceeded the body limit
    PayloadTooLarge(String),

    /// Mosaic generation failed
    Mosaic(MosaicError),
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        match self {
            HandlerError::Mosaic(err) => err.into_response(),
            HandlerError::InvalidUpload(message) => {
                let status = StatusCode::BAD_REQUEST;
                log_error(status, "invalid_upload", &message);
                let error_response = ErrorResponse::with_status("invalid_upload", message, status);
                (status, Json(error_response)).into_response()
            }
            HandlerError::PayloadTooLarge(message) => {
                let status = StatusCode::PAYLOAD_TOO_LARGE;
                log_error(status, "payload_too_large", &message);
                let error_response =
                    ErrorResponse::with_status("payload_too_large", message, status);
                (status, Json(error_response)).into_response()
            }
        }
    }
}

impl From<MosaicError> for HandlerError {
    fn from(err: MosaicError) -> Self {
        HandlerError::Mosaic(err)
    }
}

impl From<MultipartError> for HandlerError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            HandlerError::PayloadTooLarge(err.body_text())
        } else {
            HandlerError::InvalidUpload(err.body_text())
        }
    }
}

// =============================================================================
// Upload Parsing
// =============================================================================

/// Parse the `tile_size` form value.
///
/// An empty value selects the default. Values must lie in `1..=max`.
pub fn parse_cell_size(value: &str, default: u32, max: u32) -> Result<u32, HandlerError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(default);
    }

    let cell_size: u32 = value
        .parse()
        .map_err(|_| HandlerError::InvalidUpload(format!("tile_size is not a number: {:?}", value)))?;

    if cell_size == 0 || cell_size > max {
        return Err(HandlerError::InvalidUpload(format!(
            "tile_size must be between 1 and {}, got {}",
            max, cell_size
        )));
    }
    Ok(cell_size)
}

/// Fields extracted from the upload form.
struct Upload {
    image: Bytes,
    cell_size: u32,
}

async fn read_upload(
    mut multipart: Multipart,
    default_cell_size: u32,
    max_cell_size: u32,
) -> Result<Upload, HandlerError> {
    let mut image = None;
    let mut cell_size = default_cell_size;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("image") => image = Some(field.bytes().await?),
            Some("tile_size") => {
                let text = field.text().await?;
                cell_size = parse_cell_size(&text, default_cell_size, max_cell_size)?;
            }
            other => debug!(field = ?other, "Ignoring unknown form field"),
        }
    }

    let image = image
        .filter(|data| !data.is_empty())
        .ok_or_else(|| HandlerError::InvalidUpload("missing image field".to_string()))?;

    Ok(Upload { image, cell_size })
}

// =============================================================================
// Handlers
// =============================================================================

/// Handle mosaic uploads.
///
/// # Endpoint
///
/// `POST /upload` (multipart/form-data)
///
/// # Form Fields
///
/// - `image`: the source photo (JPEG or PNG)
/// - `tile_size`: cell size in pixels (optional)
///
/// # Response
///
/// - `200 OK`: the mosaic as `image/jpeg`
/// - `400 Bad Request`: malformed form, undecodable image, bad tile size
/// - `413 Payload Too Large`: upload exceeds the body limit
/// - `422 Unprocessable Entity`: not enough tiles for the requested grid
/// - `504 Gateway Timeout`: the mosaic deadline expired
///
/// # Headers
///
/// - `X-Mosaic-Duration-Ms`: time spent decoding, tiling and encoding
/// - `X-Mosaic-Cell-Size`: cell size used
/// - `X-Mosaic-Tiles-Used`: number of distinct tiles placed
pub async fn upload_handler<S: TileSource + 'static>(
    State(state): State<AppState<S>>,
    multipart: Multipart,
) -> Result<Response, HandlerError> {
    let started = Instant::now();
    let upload = read_upload(multipart, state.default_cell_size, state.max_cell_size).await?;

    let source = decode_image(&upload.image)?;
    let mosaic = state.compositor.render(&source, upload.cell_size).await?;
    let jpeg = state.encoder.encode(&mosaic.image)?;

    let elapsed = started.elapsed();
    info!(
        width = source.width(),
        height = source.height(),
        cell_size = upload.cell_size,
        tiles_used = mosaic.tiles_used,
        elapsed_ms = elapsed.as_millis() as u64,
        "Mosaic generated"
    );

    let response = (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "image/jpeg".to_string()),
            (header::CACHE_CONTROL, "no-store".to_string()),
        ],
        [
            ("X-Mosaic-Duration-Ms", elapsed.as_millis().to_string()),
            ("X-Mosaic-Cell-Size", upload.cell_size.to_string()),
            ("X-Mosaic-Tiles-Used", mosaic.tiles_used.to_string()),
        ],
        jpeg,
    );
    Ok(response.into_response())
}

/// Serve the upload page.
///
/// # Endpoint
///
/// `GET /`
pub async fn index_handler<S: TileSource + 'static>(
    State(state): State<AppState<S>>,
) -> Html<String> {
    Html(render_index(
        state.default_cell_size,
        state.max_cell_size,
        state.compositor.corpus().len(),
    ))
}

/// Report the size of the tile corpus.
///
/// # Endpoint
///
/// `GET /tiles/stats`
pub async fn tile_stats_handler<S: TileSource + 'static>(
    State(state): State<AppState<S>>,
) -> Json<TileStatsResponse> {
    Json(TileStatsResponse {
        tiles: state.compositor.corpus().len(),
    })
}

/// Handle health check requests.
///
/// # Endpoint
///
/// `GET /health`
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// =============================================================================
// Tests
// =============================================================================
