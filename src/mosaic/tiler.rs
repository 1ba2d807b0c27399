//! Cell tiler: paints one region of the mosaic.
//!
//! The region is walked in `cell_size` steps from its top-left corner, row by
//! row. For every cell a representative color is sampled from the source, the
//! nearest unused tile is taken from the shared [`ReservationPool`], and that
//! tile is resized (nearest neighbour) and copied over the cell. Cells on the
//! right and bottom edges may be narrower than `cell_size`; the pasted tile is
//! clipped to the region.
//!
//! Decoding and resizing run on the blocking pool and the tiler yields after
//! every cell, so a region task never holds a runtime worker for more than one
//! cell. Deadlines and aborts of the enclosing mosaic are observed between
//! cells even when the tile source answers without pausing.

use image::imageops::{self, FilterType};
use image::RgbaImage;
use tracing::warn;

use crate::error::MosaicError;
use crate::source::{TileId, TileSource};

use super::codec::decode_image;
use super::pool::ReservationPool;
use super::region::Region;
use super::signature::{signature, ColorSignature, Rgba16Image};

// =============================================================================
// Options
// =============================================================================

/// How a cell's color is sampled from the source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Sampling {
    /// Color of the cell's top-left pixel. Matches the classic output.
    #[default]
    TopLeft,

    /// Average color of the whole visible cell, the same measure used for
    /// tile signatures.
    BlockAverage,
}

/// What to do when a tile taken from the pool cannot be fetched or decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TileFailurePolicy {
    /// Log a warning and leave the cell unpainted. The tile stays consumed.
    #[default]
    Skip,

    /// Fail the whole mosaic with the underlying error.
    Abort,
}

/// Per-cell behavior of the tiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TilerOptions {
    pub sampling: Sampling,
    pub on_tile_failure: TileFailurePolicy,
}

// =============================================================================
// Region Tiling
// =============================================================================

/// Tile `region` of `source` and return the painted region image.
///
/// The returned image has the region's dimensions; pixel `(0, 0)` corresponds
/// to source pixel `(region.x, region.y)`. `cell_size` must be non-zero and the
/// region must lie within `source`.
///
/// # Errors
///
/// - [`MosaicError::PoolExhausted`] once the pool runs dry
/// - fetch or decode errors when the policy is [`TileFailurePolicy::Abort`]
pub async fn tile_region<S>(
    source: &Rgba16Image,
    region: Region,
    cell_size: u32,
    pool: &ReservationPool,
    tiles: &S,
    options: TilerOptions,
) -> Result<RgbaImage, MosaicError>
where
    S: TileSource + ?Sized,
{
    if cell_size == 0 {
        return Err(MosaicError::InvalidCellSize { cell_size });
    }
    debug_assert!(region.fits_within(source.width(), source.height()));

    let mut output = RgbaImage::new(region.width, region.height);

    for y in (0..region.height).step_by(cell_size as usize) {
        for x in (0..region.width).step_by(cell_size as usize) {
            let cell = Region::new(
                region.x + x,
                region.y + y,
                cell_size.min(region.width - x),
                cell_size.min(region.height - y),
            );
            let color = sample_cell(source, cell, options.sampling);
            let tile_id = pool.take_nearest(&color)?;

            match resolve_tile(tiles, &tile_id, cell_size).await {
                Ok(tile) => imageops::replace(&mut output, &tile, i64::from(x), i64::from(y)),
                Err(e) => match options.on_tile_failure {
                    TileFailurePolicy::Skip => {
                        warn!(
                            tile = %tile_id,
                            x = cell.x,
                            y = cell.y,
                            "Leaving cell unpainted: {}",
                            e
                        );
                    }
                    TileFailurePolicy::Abort => return Err(e),
                },
            }

            tokio::task::yield_now().await;
        }
    }

    Ok(output)
}

/// Representative color of one cell.
pub fn sample_cell(source: &Rgba16Image, cell: Region, sampling: Sampling) -> ColorSignature {
    let top_left = ColorSignature::from_pixel(*source.get_pixel(cell.x, cell.y));
    match sampling {
        Sampling::TopLeft => top_left,
        Sampling::BlockAverage => {
            let block = imageops::crop_imm(source, cell.x, cell.y, cell.width, cell.height);
            signature(&*block).unwrap_or(top_left)
        }
    }
}

/// Fetch, decode and resize one tile to `cell_size x cell_size`.
async fn resolve_tile<S>(tiles: &S, id: &TileId, cell_size: u32) -> Result<RgbaImage, MosaicError>
where
    S: TileSource + ?Sized,
{
    let data = tiles.fetch(id).await?;

    tokio::task::spawn_blocking(move || {
        let image = decode_image(&data)?;
        Ok::<_, MosaicError>(resize_nearest(&image.to_rgba8(), cell_size))
    })
    .await
    .map_err(|e| MosaicError::RegionTask {
        message: format!("tile decode task failed: {}", e),
    })?
}

/// Nearest-neighbour resize to a square, without interpolation.
pub fn resize_nearest(tile: &RgbaImage, cell_size: u32) -> RgbaImage {
    if tile.dimensions() == (cell_size, cell_size) {
        return tile.clone();
    }
    imageops::resize(tile, cell_size, cell_size, FilterType::Nearest)
}

// =============================================================================
// Tests
// =============================================================================
