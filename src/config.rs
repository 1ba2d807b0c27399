//! Configuration management for the photomosaic server.
//!
//! Settings come from command-line arguments via clap, with environment
//! variable fallbacks using the `MOSAIC_` prefix, and defaults for everything.
//!
//! # Environment Variables
//!
//! - `MOSAIC_HOST` - Server bind address (default: 127.0.0.1)
//! - `MOSAIC_PORT` - Server port (default: 8080)
//! - `MOSAIC_TILES_DIR` - Directory holding the tile library (default: tiles)
//! - `MOSAIC_STATIC_DIR` - Directory served under /static (default: public)
//! - `MOSAIC_CELL_SIZE` - Default cell size in pixels (default: 15)
//! - `MOSAIC_MAX_CELL_SIZE` - Largest accepted cell size (default: 512)
//! - `MOSAIC_GRID_COLUMNS` / `MOSAIC_GRID_ROWS` - Region grid (default: 2 x 2)
//! - `MOSAIC_SAMPLING` - `top-left` or `block-average` (default: top-left)
//! - `MOSAIC_STRICT_TILES` - Fail a mosaic when a tile cannot be read
//! - `MOSAIC_REQUEST_TIMEOUT` - Seconds per mosaic, 0 disables (default: 60)
//! - `MOSAIC_JPEG_QUALITY` - Output JPEG quality (default: 80)
//! - `MOSAIC_MAX_UPLOAD_BYTES` - Upload size limit (default: 10 MiB)
//! - `MOSAIC_CORS_ORIGINS` - Allowed CORS origins, comma-separated

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::mosaic::{
    MosaicOptions, Sampling, TileFailurePolicy, TilerOptions, DEFAULT_GRID_COLUMNS,
    DEFAULT_GRID_ROWS, DEFAULT_JPEG_QUALITY,
};

// =============================================================================
// Default Values
// =============================================================================

/// Default server host.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port.
pub const DEFAULT_PORT: u16 = 8080;

/// Default tile library directory.
pub const DEFAULT_TILES_DIR: &str = "tiles";

/// Default static file directory.
pub const DEFAULT_STATIC_DIR: &str = "public";

/// Default cell size in pixels.
pub const DEFAULT_CELL_SIZE: u32 = 15;

/// Default upper bound for a requested cell size.
pub const DEFAULT_MAX_CELL_SIZE: u32 = 512;

/// Default per-mosaic deadline in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Default upload limit (10 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Largest region grid dimension accepted.
const MAX_GRID_DIMENSION: u32 = 64;

// =============================================================================
// CLI Arguments
// =============================================================================

/// Cell color sampling, as accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SamplingArg {
    /// Top-left pixel of each cell
    TopLeft,
    /// Average of each cell
    BlockAverage,
}

impl From<SamplingArg> for Sampling {
    fn from(arg: SamplingArg) -> Self {
        match arg {
            SamplingArg::TopLeft => Sampling::TopLeft,
            SamplingArg::BlockAverage => Sampling::BlockAverage,
        }
    }
}

/// Photomosaic - turn photos into mosaics of tile images.
///
/// Loads every image in the tile directory at startup, then serves an upload
/// page that returns the mosaic of any submitted photo.
#[derive(Parser, Debug, Clone)]
#[command(name = "photomosaic")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    // =========================================================================
    // Server Configuration
    // =========================================================================
    /// Host address to bind the server to.
    #[arg(long, default_value = DEFAULT_HOST, env = "MOSAIC_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "MOSAIC_PORT")]
    pub port: u16,

    /// Directory containing the tile images.
    #[arg(long, default_value = DEFAULT_TILES_DIR, env = "MOSAIC_TILES_DIR")]
    pub tiles_dir: PathBuf,

    /// Directory served under /static.
    #[arg(long, default_value = DEFAULT_STATIC_DIR, env = "MOSAIC_STATIC_DIR")]
    pub static_dir: PathBuf,

    /// Maximum accepted upload size in bytes.
    #[arg(long, default_value_t = DEFAULT_MAX_UPLOAD_BYTES, env = "MOSAIC_MAX_UPLOAD_BYTES")]
    pub max_upload_bytes: usize,

    // =========================================================================
    // Mosaic Configuration
    // =========================================================================
    /// Cell size used when an upload does not specify one.
    #[arg(long, default_value_t = DEFAULT_CELL_SIZE, env = "MOSAIC_CELL_SIZE")]
    pub cell_size: u32,

    /// Largest cell size an upload may request.
    #[arg(long, default_value_t = DEFAULT_MAX_CELL_SIZE, env = "MOSAIC_MAX_CELL_SIZE")]
    pub max_cell_size: u32,

    /// Number of region columns tiled concurrently.
    #[arg(long, default_value_t = DEFAULT_GRID_COLUMNS, env = "MOSAIC_GRID_COLUMNS")]
    pub grid_columns: u32,

    /// Number of region rows tiled concurrently.
    #[arg(long, default_value_t = DEFAULT_GRID_ROWS, env = "MOSAIC_GRID_ROWS")]
    pub grid_rows: u32,

    /// How each cell's color is sampled.
    #[arg(long, value_enum, default_value_t = SamplingArg::TopLeft, env = "MOSAIC_SAMPLING")]
    pub sampling: SamplingArg,

    /// Fail the whole mosaic when a chosen tile cannot be read.
    ///
    /// By default the cell is left unpainted and a warning is logged.
    #[arg(long, default_value_t = false, env = "MOSAIC_STRICT_TILES")]
    pub strict_tiles: bool,

    /// Deadline for one mosaic in seconds (0 disables the deadline).
    #[arg(long, default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS, env = "MOSAIC_REQUEST_TIMEOUT")]
    pub request_timeout: u64,

    /// JPEG quality of the returned mosaic (1-100).
    #[arg(long, default_value_t = DEFAULT_JPEG_QUALITY, env = "MOSAIC_JPEG_QUALITY")]
    pub jpeg_quality: u8,

    // =========================================================================
    // CORS Configuration
    // =========================================================================
    /// Allowed CORS origins (comma-separated).
    ///
    /// If not specified, allows any origin.
    #[arg(long, env = "MOSAIC_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Option<Vec<String>>,

    // =========================================================================
    // Logging Configuration
    // =========================================================================
    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Disable request tracing.
    #[arg(long, default_value_t = false)]
    pub no_tracing: bool,
}

impl Config {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.cell_size == 0 {
            return Err("cell_size must be greater than 0".to_string());
        }
        if self.max_cell_size == 0 {
            return Err("max_cell_size must be greater than 0".to_string());
        }
        if self.cell_size > self.max_cell_size {
            return Err(format!(
                "cell_size ({}) must not exceed max_cell_size ({})",
                self.cell_size, self.max_cell_size
            ));
        }

        if self.grid_columns == 0 || self.grid_rows == 0 {
            return Err("grid_columns and grid_rows must be greater than 0".to_string());
        }
        if self.grid_columns > MAX_GRID_DIMENSION || self.grid_rows > MAX_GRID_DIMENSION {
            return Err(format!(
                "grid_columns and grid_rows must be at most {}",
                MAX_GRID_DIMENSION
            ));
        }

        if self.jpeg_quality == 0 || self.jpeg_quality > 100 {
            return Err("jpeg_quality must be between 1 and 100".to_string());
        }

        if self.max_upload_bytes < 1024 {
            return Err("max_upload_bytes must be at least 1KB".to_string());
        }

        Ok(())
    }

    /// Get the server bind address as "host:port".
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Per-mosaic deadline, `None` when disabled.
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout > 0).then(|| Duration::from_secs(self.request_timeout))
    }

    /// Compositor settings derived from this configuration.
    pub fn mosaic_options(&self) -> MosaicOptions {
        let on_tile_failure = if self.strict_tiles {
            TileFailurePolicy::Abort
        } else {
            TileFailurePolicy::Skip
        };

        MosaicOptions::default()
            .with_grid(self.grid_columns, self.grid_rows)
            .with_tiler(TilerOptions {
                sampling: self.sampling.into(),
                on_tile_failure,
            })
            .with_timeout(self.request_timeout())
    }
}

// =============================================================================
// Tests
// =============================================================================
