//! Concurrent mosaic engine.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │              HTTP Handlers              │
//! └────────────────────┬────────────────────┘
//!                      │ decoded upload, cell size
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │               Compositor                │
//! │  ┌──────────────┐  ┌─────────────────┐  │
//! │  │  partition   │  │  region tasks   │  │
//! │  │  (regions)   │  │  (tile_region)  │  │
//! │  └──────────────┘  └────────┬────────┘  │
//! └─────────────────────────────┼───────────┘
//!                               │ take_nearest
//!                               ▼
//! ┌─────────────────────────────────────────┐
//! │   ReservationPool (copy of TileCorpus)  │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Components
//!
//! - [`ColorSignature`] and [`signature`]: average color of a pixel region
//! - [`TileCorpus`]: tile signatures, built once at startup
//! - [`ReservationPool`]: per-request copy of the corpus; each tile is handed
//!   out at most once
//! - [`tile_region`]: paints one region cell by cell
//! - [`Compositor`]: splits the source, tiles the regions concurrently and
//!   joins them into the final image
//! - [`MosaicEncoder`]: JPEG output

mod codec;
mod compositor;
mod corpus;
mod pool;
mod region;
mod signature;
mod tiler;

pub use codec::{
    clamp_quality, decode_image, is_valid_quality, MosaicEncoder, DEFAULT_JPEG_QUALITY,
    MAX_JPEG_QUALITY, MIN_JPEG_QUALITY,
};
pub use compositor::{Compositor, Mosaic, MosaicOptions};
pub use corpus::TileCorpus;
pub use pool::ReservationPool;
pub use region::{
    are_disjoint, partition, quadrants, Region, DEFAULT_GRID_COLUMNS, DEFAULT_GRID_ROWS,
};
pub use signature::{signature, ColorSignature, Rgba16Image};
pub use tiler::{resize_nearest, sample_cell, tile_region, Sampling, TileFailurePolicy, TilerOptions};
