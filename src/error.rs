use std::time::Duration;

use thiserror::Error;

/// Errors raised by a tile source while enumerating or fetching tiles
#[derive(Debug, Clone, Error)]
pub enum SourceError {
    /// The requested tile does not exist in the source
    #[error("Tile not found: {0}")]
    NotFound(String),

    /// Storage-level failure (permissions, unreadable directory, ...)
    #[error("I/O error: {0}")]
    Io(String),
}

/// Errors that can occur while building a mosaic
#[derive(Debug, Clone, Error)]
pub enum MosaicError {
    /// Tile storage error while resolving a tile
    #[error("Tile source error: {0}")]
    Source(#[from] SourceError),

    /// Source image or tile bytes could not be decoded
    #[error("Failed to decode image: {message}")]
    Decode { message: String },

    /// The finished mosaic could not be encoded
    #[error("Failed to encode mosaic: {message}")]
    Encode { message: String },

    /// The grid asked for more tiles than the reservation pool holds
    #[error("Reservation pool exhausted: no unused tiles remain for this mosaic")]
    PoolExhausted,

    /// A region task panicked or was cancelled before producing its image
    #[error("Region task failed: {message}")]
    RegionTask { message: String },

    /// Cell size must be at least one pixel
    #[error("Invalid cell size: {cell_size}")]
    InvalidCellSize { cell_size: u32 },

    /// Source image has zero width or height
    #[error("Source image is empty")]
    EmptyImage,

    /// The request deadline expired before every region completed
    #[error("Mosaic generation timed out after {after:?}")]
    Timeout { after: Duration },
}
