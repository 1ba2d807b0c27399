//! Tile storage layer.
//!
//! The mosaic engine never touches storage directly. It asks a [`TileSource`]
//! for the list of candidate tiles once at startup, and for a tile's bytes
//! each time a cell is painted.
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │      TileCorpus / Cell Tiler            │
//! └────────────────────┬────────────────────┘
//!                      │ list_tiles() / fetch(id)
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │           TileSource Trait              │
//! └────────────────────┬────────────────────┘
//!          ┌───────────┴───────────┐
//!          ▼                       ▼
//! ┌─────────────────┐    ┌─────────────────────┐
//! │ LocalTileSource │    │  MemoryTileSource   │
//! │  (directory)    │    │  (in-process map)   │
//! └─────────────────┘    └─────────────────────┘
//! ```

mod local;
mod memory;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::SourceError;

pub use local::LocalTileSource;
pub use memory::MemoryTileSource;

// =============================================================================
// Tile Identifier
// =============================================================================

/// Opaque handle naming one tile within its source.
///
/// Cloning is cheap (shared string). Ordering is lexicographic, which the
/// reservation pool relies on for its tie-break.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TileId(Arc<str>);

impl TileId {
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TileId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for TileId {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}

// =============================================================================
// TileSource Trait
// =============================================================================

/// Storage backend holding the tile library.
#[async_trait]
pub trait TileSource: Send + Sync {
    /// Enumerate every tile the source can supply.
    async fn list_tiles(&self) -> Result<Vec<TileId>, SourceError>;

    /// Fetch the encoded bytes of one tile.
    async fn fetch(&self, id: &TileId) -> Result<Bytes, SourceError>;
}

#[async_trait]
impl<T: TileSource + ?Sized> TileSource for Arc<T> {
    async fn list_tiles(&self) -> Result<Vec<TileId>, SourceError> {
        (**self).list_tiles().await
    }

    async fn fetch(&self, id: &TileId) -> Result<Bytes, SourceError> {
        (**self).fetch(id).await
    }
}
