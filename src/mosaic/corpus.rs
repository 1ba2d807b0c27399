//! Process-wide tile corpus.
//!
//! The corpus maps every usable tile to its full-image average color. It is
//! built once at startup and never mutated afterwards; each mosaic request
//! takes a structural copy of it as a [`ReservationPool`].

use std::collections::BTreeMap;
use std::fmt::Display;
use std::sync::Arc;

use image::DynamicImage;
use tracing::{debug, info, warn};

use crate::error::SourceError;
use crate::source::{TileId, TileSource};

use super::codec::decode_image;
use super::pool::ReservationPool;
use super::signature::{signature, ColorSignature};

/// Immutable table of tile identifiers and their color signatures.
///
/// Cloning a corpus shares the underlying table.
#[derive(Debug, Clone, Default)]
pub struct TileCorpus {
    entries: Arc<BTreeMap<TileId, ColorSignature>>,
}

impl TileCorpus {
    /// Build a corpus from already decoded tiles.
    ///
    /// Tiles whose decode failed, and zero-area images, are logged and left
    /// out of the corpus.
    pub fn build<I, E>(tiles: I) -> Self
    where
        I: IntoIterator<Item = (TileId, Result<DynamicImage, E>)>,
        E: Display,
    {
        let mut entries = BTreeMap::new();
        for (id, decoded) in tiles {
            let image = match decoded {
                Ok(image) => image,
                Err(e) => {
                    warn!(tile = %id, "Skipping tile that failed to decode: {}", e);
                    continue;
                }
            };

            match signature(&image.to_rgba16()) {
                Some(sig) => {
                    entries.insert(id, sig);
                }
                None => warn!(tile = %id, "Skipping empty tile image"),
            }
        }

        Self {
            entries: Arc::new(entries),
        }
    }

    /// Build a corpus directly from signatures.
    pub fn from_signatures(entries: impl IntoIterator<Item = (TileId, ColorSignature)>) -> Self {
        Self {
            entries: Arc::new(entries.into_iter().collect()),
        }
    }

    /// Enumerate, fetch and decode every tile of `source`.
    ///
    /// Per-tile fetch or decode failures are skipped with a warning. Only a
    /// failure to enumerate the source is returned as an error.
    pub async fn load<S>(source: &S) -> Result<Self, SourceError>
    where
        S: TileSource + ?Sized,
    {
        let ids = source.list_tiles().await?;
        info!("Loading {} candidate tile(s)", ids.len());

        let mut decoded = Vec::with_capacity(ids.len());
        for id in ids {
            let image = match source.fetch(&id).await {
                Ok(data) => decode_image(&data),
                Err(e) => Err(e.into()),
            };
            decoded.push((id, image));
        }

        let corpus = Self::build(decoded);
        debug!("Tile corpus holds {} tile(s)", corpus.len());
        Ok(corpus)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &TileId) -> Option<ColorSignature> {
        self.entries.get(id).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TileId, &ColorSignature)> {
        self.entries.iter()
    }

    /// Fresh, fully populated pool for one mosaic request.
    pub fn reservation_pool(&self) -> ReservationPool {
        ReservationPool::new((*self.entries).clone())
    }
}

// =============================================================================
// Tests
// =============================================================================
