//! # Photomosaic
//!
//! A concurrent photomosaic engine and upload server.
//!
//! A photo is cut into square cells. Each cell is replaced by the tile image
//! whose average color is closest, and no tile is used twice within one
//! mosaic. The photo is split into regions that are tiled concurrently while
//! sharing a single pool of unused tiles.
//!
//! ## Architecture
//!
//! - [`source`] - Where tile bytes come from (directory or memory)
//! - [`mosaic`] - Color signatures, tile corpus, reservation pool, tiling
//!   and compositing
//! - [`server`] - Axum-based HTTP server and routes
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```rust,no_run
//! use photomosaic::{Compositor, LocalTileSource, TileCorpus};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let source = LocalTileSource::new("tiles");
//!     let corpus = TileCorpus::load(&source).await?;
//!     let compositor = Compositor::new(corpus, source);
//!
//!     let photo = image::open("photo.jpg")?;
//!     let mosaic = compositor.render(&photo, 15).await?;
//!     mosaic.image.save("mosaic.png")?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod mosaic;
pub mod server;
pub mod source;

// Re-export commonly used types
pub use config::{Config, SamplingArg};
pub use error::{MosaicError, SourceError};
pub use mosaic::{
    are_disjoint, clamp_quality, decode_image, is_valid_quality, partition, quadrants,
    resize_nearest, sample_cell, signature, tile_region, ColorSignature, Compositor, Mosaic,
    MosaicEncoder, MosaicOptions, Region, ReservationPool, Rgba16Image, Sampling,
    TileCorpus, TileFailurePolicy, TilerOptions, DEFAULT_GRID_COLUMNS, DEFAULT_GRID_ROWS,
    DEFAULT_JPEG_QUALITY, MAX_JPEG_QUALITY, MIN_JPEG_QUALITY,
};
pub use server::{
    create_router, health_handler, index_handler, tile_stats_handler, upload_handler, AppState,
    ErrorResponse, HealthResponse, RouterConfig, TileStatsResponse,
};
pub use source::{LocalTileSource, MemoryTileSource, TileId, TileSource};
