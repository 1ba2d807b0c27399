//! Fan-out/fan-in compositor.
//!
//! ```text
//!                    ┌──────────────┐
//!                    │ source image │
//!                    └──────┬───────┘
//!                           │ partition (columns x rows)
//!        ┌──────────────┬───┴──────────┬──────────────┐
//!        ▼              ▼              ▼              ▼
//!   tile_region    tile_region    tile_region    tile_region   (tokio tasks)
//!        │              │              │              │
//!        └──────────────┴──────┬───────┴──────────────┘
//!                              │ shared ReservationPool
//!                              ▼
//!                    JoinSet, completion order
//!                              │ copy each region at its offset
//!                              ▼
//!                       ┌─────────────┐
//!                       │   mosaic    │
//!                       └─────────────┘
//! ```
//!
//! The call returns only once every region has been tiled and copied. If any
//! region fails, the remaining tasks are aborted and no image is returned.

use std::sync::Arc;
use std::time::Duration;

use image::imageops;
use image::{DynamicImage, RgbaImage};
use tokio::task::JoinSet;
use tracing::debug;

use crate::error::MosaicError;
use crate::source::TileSource;

use super::corpus::TileCorpus;
use super::region::{are_disjoint, partition, Region, DEFAULT_GRID_COLUMNS, DEFAULT_GRID_ROWS};
use super::signature::Rgba16Image;
use super::tiler::{tile_region, TilerOptions};

// =============================================================================
// Options
// =============================================================================

/// Request-independent settings of the compositor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MosaicOptions {
    /// Number of region columns the source is split into
    pub grid_columns: u32,

    /// Number of region rows the source is split into
    pub grid_rows: u32,

    /// Per-cell behavior
    pub tiler: TilerOptions,

    /// Deadline for one mosaic; `None` waits indefinitely
    pub timeout: Option<Duration>,
}

impl Default for MosaicOptions {
    fn default() -> Self {
        Self {
            grid_columns: DEFAULT_GRID_COLUMNS,
            grid_rows: DEFAULT_GRID_ROWS,
            tiler: TilerOptions::default(),
            timeout: None,
        }
    }
}

impl MosaicOptions {
    pub fn with_grid(mut self, columns: u32, rows: u32) -> Self {
        self.grid_columns = columns;
        self.grid_rows = rows;
        self
    }

    pub fn with_tiler(mut self, tiler: TilerOptions) -> Self {
        self.tiler = tiler;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

/// A finished mosaic.
#[derive(Debug, Clone)]
pub struct Mosaic {
    /// The tiled image, same dimensions as the source
    pub image: RgbaImage,

    /// Number of tiles consumed from the pool
    pub tiles_used: usize,

    /// Regions the source was split into
    pub regions: Vec<Region>,
}

// =============================================================================
// Compositor
// =============================================================================

/// Builds mosaics from a shared tile corpus.
///
/// One compositor serves every request; each call to [`Compositor::render`]
/// works on its own reservation pool.
pub struct Compositor<S: TileSource> {
    corpus: TileCorpus,
    tiles: Arc<S>,
    options: MosaicOptions,
}

impl<S: TileSource + 'static> Compositor<S> {
    pub fn new(corpus: TileCorpus, tiles: S) -> Self {
        Self::with_shared_source(corpus, Arc::new(tiles))
    }

    /// Create a compositor over a source that is shared with other components.
    pub fn with_shared_source(corpus: TileCorpus, tiles: Arc<S>) -> Self {
        Self {
            corpus,
            tiles,
            options: MosaicOptions::default(),
        }
    }

    pub fn with_options(mut self, options: MosaicOptions) -> Self {
        self.options = options;
        self
    }

    pub fn corpus(&self) -> &TileCorpus {
        &self.corpus
    }

    pub fn options(&self) -> &MosaicOptions {
        &self.options
    }

    /// Tile `image` with square cells of `cell_size` pixels.
    pub async fn tile(&self, image: &DynamicImage, cell_size: u32) -> Result<RgbaImage, MosaicError> {
        self.render(image, cell_size).await.map(|mosaic| mosaic.image)
    }

    /// Tile `image` and report how the work was split.
    ///
    /// # Errors
    ///
    /// - [`MosaicError::InvalidCellSize`] for a zero cell size
    /// - [`MosaicError::EmptyImage`] for a zero-area source
    /// - [`MosaicError::PoolExhausted`] when the grid needs more tiles than the
    ///   corpus holds
    /// - [`MosaicError::Timeout`] when the deadline expires
    /// - any error a region task returns
    pub async fn render(&self, image: &DynamicImage, cell_size: u32) -> Result<Mosaic, MosaicError> {
        if cell_size == 0 {
            return Err(MosaicError::InvalidCellSize { cell_size });
        }
        if image.width() == 0 || image.height() == 0 {
            return Err(MosaicError::EmptyImage);
        }

        let source = Arc::new(image.to_rgba16());
        let work = self.fan_out_fan_in(source, cell_size);

        match self.options.timeout {
            Some(limit) => tokio::time::timeout(limit, work)
                .await
                .map_err(|_| MosaicError::Timeout { after: limit })?,
            None => work.await,
        }
    }

    async fn fan_out_fan_in(
        &self,
        source: Arc<Rgba16Image>,
        cell_size: u32,
    ) -> Result<Mosaic, MosaicError> {
        let (width, height) = source.dimensions();
        let regions = partition(width, height, self.options.grid_columns, self.options.grid_rows);
        debug_assert!(are_disjoint(&regions));

        let pool = Arc::new(self.corpus.reservation_pool());
        debug!(
            width,
            height,
            cell_size,
            regions = regions.len(),
            pool = pool.initial_len(),
            "Starting mosaic"
        );

        // Dropping the set aborts any task still running, so an early return
        // below cancels the other regions.
        let mut tasks = JoinSet::new();
        for region in regions.iter().copied() {
            let source = Arc::clone(&source);
            let pool = Arc::clone(&pool);
            let tiles = Arc::clone(&self.tiles);
            let options = self.options.tiler;

            tasks.spawn(async move {
                let image =
                    tile_region(&source, region, cell_size, &pool, tiles.as_ref(), options).await?;
                Ok::<_, MosaicError>((region, image))
            });
        }

        let mut output = RgbaImage::new(width, height);
        while let Some(joined) = tasks.join_next().await {
            let (region, image) = joined.map_err(|e| MosaicError::RegionTask {
                message: e.to_string(),
            })??;

            debug!(
                x = region.x,
                y = region.y,
                width = region.width,
                height = region.height,
                "Region complete"
            );
            imageops::replace(&mut output, &image, i64::from(region.x), i64::from(region.y));
        }

        Ok(Mosaic {
            image: output,
            tiles_used: pool.taken(),
            regions,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
