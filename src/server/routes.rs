//! Router configuration for the photomosaic server.
//!
//! # Route Structure
//!
//! ```text
//! /               - Upload page
//! /upload         - Mosaic generation (POST, multipart)
//! /tiles/stats    - Tile corpus size
//! /health         - Health check
//! /static/*       - Files from the static directory (optional)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use photomosaic::server::routes::{create_router, RouterConfig};
//! use photomosaic::mosaic::{Compositor, TileCorpus};
//! use photomosaic::source::LocalTileSource;
//!
//! let source = LocalTileSource::new("tiles");
//! let corpus = TileCorpus::load(&source).await?;
//! let compositor = Compositor::new(corpus, source);
//!
//! let config = RouterConfig::new().with_default_cell_size(20);
//! let router = create_router(compositor, config);
//!
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
//! axum::serve(listener, router).await?;
//! ```

use std::path::PathBuf;
use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use http::header::CONTENT_TYPE;
use http::{HeaderName, Method};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use super::handlers::{
    health_handler, index_handler, tile_stats_handler, upload_handler, AppState,
};
use crate::config::{DEFAULT_CELL_SIZE, DEFAULT_MAX_CELL_SIZE, DEFAULT_MAX_UPLOAD_BYTES};
use crate::mosaic::{Compositor, MosaicEncoder, DEFAULT_JPEG_QUALITY};
use crate::source::TileSource;

/// Response headers the browser may read on cross-origin uploads.
const EXPOSED_HEADERS: [&str; 3] = [
    "x-mosaic-duration-ms",
    "x-mosaic-cell-size",
    "x-mosaic-tiles-used",
];

// =============================================================================
// Router Configuration
// =============================================================================

/// Configuration for the HTTP router.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Cell size used when an upload does not name one
    pub default_cell_size: u32,

    /// Largest cell size an upload may request
    pub max_cell_size: u32,

    /// JPEG quality of the returned mosaic
    pub jpeg_quality: u8,

    /// Request body limit for uploads, in bytes
    pub max_upload_bytes: usize,

    /// Allowed CORS origins (None = allow any origin)
    pub cors_origins: Option<Vec<String>>,

    /// Whether to enable request tracing
    pub enable_tracing: bool,

    /// Directory served under `/static` (None = no static route)
    pub static_dir: Option<PathBuf>,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl RouterConfig {
    /// Create a router configuration with default settings.
    ///
    /// By default:
    /// - Cell size 15, at most 512
    /// - JPEG quality 80
    /// - 10 MiB upload limit
    /// - CORS allows any origin
    /// - Tracing is enabled
    /// - No static directory
    pub fn new() -> Self {
        Self {
            default_cell_size: DEFAULT_CELL_SIZE,
            max_cell_size: DEFAULT_MAX_CELL_SIZE,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            cors_origins: None,
            enable_tracing: true,
            static_dir: None,
        }
    }

    /// Set the default cell size.
    pub fn with_default_cell_size(mut self, cell_size: u32) -> Self {
        self.default_cell_size = cell_size;
        self
    }

    /// Set the maximum cell size.
    pub fn with_max_cell_size(mut self, cell_size: u32) -> Self {
        self.max_cell_size = cell_size;
        self
    }

    /// Set the output JPEG quality.
    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality;
        self
    }

    /// Set the upload size limit in bytes.
    pub fn with_max_upload_bytes(mut self, bytes: usize) -> Self {
        self.max_upload_bytes = bytes;
        self
    }

    /// Set specific allowed CORS origins.
    ///
    /// Pass an empty vec to disallow all cross-origin requests.
    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = Some(origins);
        self
    }

    /// Allow any CORS origin.
    pub fn with_cors_any_origin(mut self) -> Self {
        self.cors_origins = None;
        self
    }

    /// Enable or disable request tracing.
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.enable_tracing = enabled;
        self
    }

    /// Serve files from `dir` under `/static`.
    pub fn with_static_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.static_dir = Some(dir.into());
        self
    }
}

// =============================================================================
// Router Builder
// =============================================================================

/// Create the main application router.
///
/// # Arguments
///
/// * `compositor` - The compositor holding the tile corpus
/// * `config` - Router configuration
pub fn create_router<S>(compositor: Compositor<S>, config: RouterConfig) -> Router
where
    S: TileSource + 'static,
{
    let encoder = MosaicEncoder::new(config.jpeg_quality);
    let app_state = AppState::new(compositor, encoder)
        .with_cell_sizes(config.default_cell_size, config.max_cell_size);

    let cors = build_cors_layer(&config);

    let mut router = Router::new()
        .route("/", get(index_handler::<S>))
        .route("/upload", post(upload_handler::<S>))
        .route("/tiles/stats", get(tile_stats_handler::<S>))
        .route("/health", get(health_handler))
        .with_state(app_state);

    if let Some(ref dir) = config.static_dir {
        router = router.nest_service("/static", ServeDir::new(dir));
    }

    let router = router
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(cors);

    if config.enable_tracing {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

/// Build the CORS layer based on configuration.
fn build_cors_layer(config: &RouterConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .expose_headers(EXPOSED_HEADERS.map(HeaderName::from_static))
        .max_age(Duration::from_secs(86400));

    match &config.cors_origins {
        None => cors.allow_origin(Any),
        Some(origins) if origins.is_empty() => cors,
        Some(origins) => {
            let parsed_origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            cors.allow_origin(parsed_origins)
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
