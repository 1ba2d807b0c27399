//! In-memory tile source.

use std::collections::BTreeMap;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::SourceError;

use super::{TileId, TileSource};

/// Tile source backed by a map of encoded tile bytes.
///
/// Useful for embedding a fixed tile set and for tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryTileSource {
    tiles: BTreeMap<TileId, Bytes>,
}

impl MemoryTileSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with_tile(mut self, id: impl Into<TileId>, data: impl Into<Bytes>) -> Self {
        self.insert(id, data);
        self
    }

    pub fn insert(&mut self, id: impl Into<TileId>, data: impl Into<Bytes>) {
        self.tiles.insert(id.into(), data.into());
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}

#[async_trait]
impl TileSource for MemoryTileSource {
    async fn list_tiles(&self) -> Result<Vec<TileId>, SourceError> {
        Ok(self.tiles.keys().cloned().collect())
    }

    async fn fetch(&self, id: &TileId) -> Result<Bytes, SourceError> {
        self.tiles
            .get(id)
            .cloned()
            .ok_or_else(|| SourceError::NotFound(id.to_string()))
    }
}
