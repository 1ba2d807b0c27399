//! Test utilities for integration tests.
//!
//! This module provides a tracking tile source and helpers for building test
//! images, multipart uploads and routers.

use async_trait::async_trait;
use bytes::Bytes;
use image::{ImageFormat, Rgba, RgbaImage};
use std::collections::{BTreeMap, HashSet};
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use photomosaic::error::SourceError;
use photomosaic::mosaic::{Compositor, MosaicOptions, TileCorpus};
use photomosaic::server::{create_router, RouterConfig};
use photomosaic::source::{TileId, TileSource};

/// Quadrant colors used throughout the suite: red, green, blue, yellow.
pub const QUADRANT_COLORS: [[u8; 3]; 4] = [[255, 0, 0], [0, 255, 0], [0, 0, 255], [255, 255, 0]];

// =============================================================================
// Mock Tile Source with Fetch Tracking
// =============================================================================

/// In-memory tile source that records every fetch.
///
/// Clones share the same tracking state and broken-tile set, so a test can
/// break a tile after the corpus was built from it.
#[derive(Clone, Default)]
pub struct MockTileSource {
    tiles: BTreeMap<TileId, Bytes>,
    broken: Arc<Mutex<HashSet<TileId>>>,
    fetch_count: Arc<AtomicUsize>,
    fetched: Arc<Mutex<Vec<TileId>>>,
}

impl MockTileSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tile with the given bytes.
    pub fn with_tile(mut self, id: &str, data: Vec<u8>) -> Self {
        self.tiles.insert(TileId::from(id), Bytes::from(data));
        self
    }

    /// Add a solid-color PNG tile.
    pub fn with_color(self, id: &str, rgb: [u8; 3]) -> Self {
        self.with_tile(id, solid_png(rgb, 8))
    }

    /// Make every later fetch of `id` fail.
    pub fn break_tile(&self, id: &str) {
        self.broken.lock().unwrap().insert(TileId::from(id));
    }

    /// Forget fetches recorded so far.
    pub fn reset_tracking(&self) {
        self.fetch_count.store(0, Ordering::SeqCst);
        self.fetched.lock().unwrap().clear();
    }

    pub fn fetch_count(&self) -> usize {
        self.fetch_count.load(Ordering::SeqCst)
    }

    pub fn fetched(&self) -> Vec<TileId> {
        self.fetched.lock().unwrap().clone()
    }
}

#[async_trait]
impl TileSource for MockTileSource {
    async fn list_tiles(&self) -> Result<Vec<TileId>, SourceError> {
        Ok(self.tiles.keys().cloned().collect())
    }

    async fn fetch(&self, id: &TileId) -> Result<Bytes, SourceError> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);
        self.fetched.lock().unwrap().push(id.clone());

        if self.broken.lock().unwrap().contains(id) {
            return Err(SourceError::Io(format!("tile {} is unreadable", id)));
        }
        self.tiles
            .get(id)
            .cloned()
            .ok_or_else(|| SourceError::NotFound(id.to_string()))
    }
}

/// Source with one solid tile per quadrant color.
pub fn quadrant_tiles() -> MockTileSource {
    MockTileSource::new()
        .with_color("blue.png", QUADRANT_COLORS[2])
        .with_color("green.png", QUADRANT_COLORS[1])
        .with_color("red.png", QUADRANT_COLORS[0])
        .with_color("yellow.png", QUADRANT_COLORS[3])
}

// =============================================================================
// Image Helpers
// =============================================================================

/// Encode an image as PNG.
pub fn encode_png(img: &RgbaImage) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png).unwrap();
    buf.into_inner()
}

/// A square solid-color PNG.
pub fn solid_png(rgb: [u8; 3], size: u32) -> Vec<u8> {
    encode_png(&RgbaImage::from_pixel(
        size,
        size,
        Rgba([rgb[0], rgb[1], rgb[2], 255]),
    ))
}

/// An image split into four colored quadrants at the integer midpoint,
/// colored in row-major order from `colors`.
pub fn quadrant_image(width: u32, height: u32, colors: [[u8; 3]; 4]) -> RgbaImage {
    let (mid_x, mid_y) = (width / 2, height / 2);
    RgbaImage::from_fn(width, height, |x, y| {
        let index = match (x < mid_x, y < mid_y) {
            (true, true) => 0,
            (false, true) => 1,
            (true, false) => 2,
            (false, false) => 3,
        };
        let [r, g, b] = colors[index];
        Rgba([r, g, b, 255])
    })
}

/// Check if data is a valid JPEG (starts with SOI, ends with EOI).
pub fn is_valid_jpeg(data: &[u8]) -> bool {
    data.len() >= 4
        && data[0] == 0xFF
        && data[1] == 0xD8
        && data[data.len() - 2] == 0xFF
        && data[data.len() - 1] == 0xD9
}

/// Whether two colors are within `tolerance` on every channel.
pub fn color_close(actual: [u8; 3], expected: [u8; 3], tolerance: u8) -> bool {
    actual
        .iter()
        .zip(expected.iter())
        .all(|(a, e)| a.abs_diff(*e) <= tolerance)
}

// =============================================================================
// Multipart Helpers
// =============================================================================

pub const BOUNDARY: &str = "photomosaic-test-boundary";

/// Builder for `multipart/form-data` request bodies.
#[derive(Default)]
pub struct MultipartBody {
    body: Vec<u8>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file field.
    pub fn file(mut self, name: &str, filename: &str, content_type: &str, data: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                BOUNDARY, name, filename, content_type
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(data);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    /// Add a text field.
    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
        self
    }

    /// Close the form and return the body bytes.
    pub fn finish(mut self) -> Vec<u8> {
        self.body
            .extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
        self.body
    }

    pub fn content_type() -> String {
        format!("multipart/form-data; boundary={}", BOUNDARY)
    }
}

// =============================================================================
// Router Helpers
// =============================================================================

/// Build a compositor over `source` with default options.
pub async fn compositor_for(source: MockTileSource) -> Compositor<MockTileSource> {
    compositor_with_options(source, MosaicOptions::default()).await
}

pub async fn compositor_with_options(
    source: MockTileSource,
    options: MosaicOptions,
) -> Compositor<MockTileSource> {
    let corpus = TileCorpus::load(&source).await.unwrap();
    // Only fetches made while tiling are of interest
    source.reset_tracking();
    Compositor::new(corpus, source).with_options(options)
}

/// Router over `source` with tracing disabled.
pub async fn router_for(source: MockTileSource, config: RouterConfig) -> axum::Router {
    create_router(compositor_for(source).await, config.with_tracing(false))
}
