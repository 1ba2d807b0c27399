//! End-to-end tests of the mosaic engine through the public API.
//!
//! Tests verify:
//! - Quadrant sources are painted with their nearest tiles
//! - No tile is placed twice, even with many concurrent regions
//! - Exhaustion and unreadable-tile policies
//! - Corpus loading from a tile directory

use std::collections::HashSet;

use image::{DynamicImage, Rgba, RgbaImage};

use photomosaic::error::{MosaicError, SourceError};
use photomosaic::mosaic::{
    are_disjoint, Compositor, MosaicOptions, Sampling, TileCorpus, TileFailurePolicy,
    TilerOptions,
};
use photomosaic::source::LocalTileSource;

use super::test_utils::{
    compositor_for, compositor_with_options, quadrant_image, quadrant_tiles, solid_png,
    MockTileSource, QUADRANT_COLORS,
};

fn rgba(rgb: [u8; 3]) -> Rgba<u8> {
    Rgba([rgb[0], rgb[1], rgb[2], 255])
}

/// A source with `count` tiles on a gray ramp.
fn gray_ramp(count: u32) -> MockTileSource {
    (0..count).fold(MockTileSource::new(), |source, i| {
        let level = (i * 255 / count.max(1)) as u8;
        source.with_color(&format!("gray-{:03}.png", i), [level, level, level])
    })
}

// =============================================================================
// Quadrant Mosaics
// =============================================================================

#[tokio::test]
async fn test_quadrants_painted_with_nearest_tiles() {
    let source = quadrant_tiles();
    let compositor = compositor_for(source.clone()).await;

    // Slightly off colors still land on the matching tile
    let photo = quadrant_image(
        8,
        8,
        [[240, 10, 10], [10, 240, 10], [10, 10, 240], [240, 240, 10]],
    );
    let mosaic = compositor
        .render(&DynamicImage::ImageRgba8(photo), 4)
        .await
        .unwrap();

    assert_eq!(mosaic.image.dimensions(), (8, 8));
    assert_eq!(mosaic.tiles_used, 4);
    assert_eq!(mosaic.regions.len(), 4);

    for (x, y) in [(0, 0), (3, 3)] {
        assert_eq!(*mosaic.image.get_pixel(x, y), rgba(QUADRANT_COLORS[0]));
        assert_eq!(*mosaic.image.get_pixel(x + 4, y), rgba(QUADRANT_COLORS[1]));
        assert_eq!(*mosaic.image.get_pixel(x, y + 4), rgba(QUADRANT_COLORS[2]));
        assert_eq!(*mosaic.image.get_pixel(x + 4, y + 4), rgba(QUADRANT_COLORS[3]));
    }

    assert_eq!(source.fetch_count(), 4);
    let fetched: HashSet<_> = source.fetched().into_iter().collect();
    assert_eq!(fetched.len(), 4);
}

#[tokio::test]
async fn test_tile_returns_only_the_image() {
    let compositor = compositor_for(quadrant_tiles()).await;
    let photo = DynamicImage::ImageRgba8(quadrant_image(4, 4, QUADRANT_COLORS));

    let image = compositor.tile(&photo, 2).await.unwrap();
    assert_eq!(image.dimensions(), (4, 4));
    assert_eq!(*image.get_pixel(3, 3), rgba(QUADRANT_COLORS[3]));
}

#[tokio::test]
async fn test_odd_dimensions_fill_every_pixel() {
    // 5x4 splits into (0,0,2,2) (2,0,3,2) (0,2,2,2) (2,2,3,2): six cells of size 2
    let compositor = compositor_for(gray_ramp(6)).await;
    let photo = DynamicImage::ImageRgba8(RgbaImage::from_pixel(5, 4, Rgba([90, 90, 90, 255])));

    let mosaic = compositor.render(&photo, 2).await.unwrap();
    assert_eq!(mosaic.image.dimensions(), (5, 4));
    assert_eq!(mosaic.tiles_used, 6);
    assert!(are_disjoint(&mosaic.regions));

    // Every tile is opaque, so every painted pixel is opaque
    for pixel in mosaic.image.pixels() {
        assert_eq!(pixel.0[3], 255);
    }
}

// =============================================================================
// No Reuse
// =============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_no_tile_reused_across_concurrent_regions() {
    let source = gray_ramp(300);
    let options = MosaicOptions::default().with_grid(4, 4);
    let compositor = compositor_with_options(source.clone(), options).await;

    // 64x64 at cell size 4 needs 256 cells, all of the same color
    let photo = DynamicImage::ImageRgba8(RgbaImage::from_pixel(64, 64, Rgba([128, 128, 128, 255])));
    let mosaic = compositor.render(&photo, 4).await.unwrap();

    assert_eq!(mosaic.regions.len(), 16);
    assert_eq!(mosaic.tiles_used, 256);

    let fetched = source.fetched();
    let distinct: HashSet<_> = fetched.iter().cloned().collect();
    assert_eq!(fetched.len(), 256);
    assert_eq!(distinct.len(), 256, "a tile was placed twice");
}

#[tokio::test]
async fn test_each_request_gets_a_fresh_pool() {
    let compositor = compositor_for(quadrant_tiles()).await;
    let photo = DynamicImage::ImageRgba8(quadrant_image(8, 8, QUADRANT_COLORS));

    for _ in 0..3 {
        let mosaic = compositor.render(&photo, 4).await.unwrap();
        assert_eq!(mosaic.tiles_used, 4);
    }
    assert_eq!(compositor.corpus().len(), 4);
}

// =============================================================================
// Failures
// =============================================================================

#[tokio::test]
async fn test_exhaustion_fails_whole_mosaic() {
    let compositor = compositor_for(quadrant_tiles()).await;
    let photo = DynamicImage::ImageRgba8(quadrant_image(8, 8, QUADRANT_COLORS));

    let result = compositor.render(&photo, 2).await;
    assert!(matches!(result, Err(MosaicError::PoolExhausted)));
}

#[tokio::test]
async fn test_single_tile_corpus() {
    let compositor = compositor_for(MockTileSource::new().with_color("only.png", [1, 2, 3])).await;

    let one_cell = DynamicImage::ImageRgba8(RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 255])));
    let mosaic = compositor.render(&one_cell, 4).await.unwrap();
    assert_eq!(mosaic.tiles_used, 1);
    assert_eq!(*mosaic.image.get_pixel(0, 0), Rgba([1, 2, 3, 255]));

    let two_cells = DynamicImage::ImageRgba8(RgbaImage::from_pixel(2, 1, Rgba([0, 0, 0, 255])));
    let result = compositor.render(&two_cells, 1).await;
    assert!(matches!(result, Err(MosaicError::PoolExhausted)));
}

#[tokio::test]
async fn test_invalid_inputs() {
    let compositor = compositor_for(quadrant_tiles()).await;
    let photo = DynamicImage::ImageRgba8(quadrant_image(8, 8, QUADRANT_COLORS));

    assert!(matches!(
        compositor.render(&photo, 0).await,
        Err(MosaicError::InvalidCellSize { cell_size: 0 })
    ));

    let empty = DynamicImage::ImageRgba8(RgbaImage::new(0, 0));
    assert!(matches!(
        compositor.render(&empty, 4).await,
        Err(MosaicError::EmptyImage)
    ));
}

#[tokio::test]
async fn test_unreadable_tile_skipped_by_default() {
    let source = quadrant_tiles();
    let compositor = compositor_for(source.clone()).await;
    source.break_tile("red.png");

    let photo = DynamicImage::ImageRgba8(quadrant_image(8, 8, QUADRANT_COLORS));
    let mosaic = compositor.render(&photo, 4).await.unwrap();

    // The red tile stays consumed, its cell stays unpainted
    assert_eq!(mosaic.tiles_used, 4);
    assert_eq!(*mosaic.image.get_pixel(0, 0), Rgba([0, 0, 0, 0]));
    assert_eq!(*mosaic.image.get_pixel(4, 0), rgba(QUADRANT_COLORS[1]));
}

#[tokio::test]
async fn test_unreadable_tile_aborts_when_strict() {
    let source = quadrant_tiles();
    let options = MosaicOptions::default().with_tiler(TilerOptions {
        sampling: Sampling::TopLeft,
        on_tile_failure: TileFailurePolicy::Abort,
    });
    let compositor = compositor_with_options(source.clone(), options).await;
    source.break_tile("red.png");

    let photo = DynamicImage::ImageRgba8(quadrant_image(8, 8, QUADRANT_COLORS));
    let result = compositor.render(&photo, 4).await;
    assert!(matches!(
        result,
        Err(MosaicError::Source(SourceError::Io(_)))
    ));
}

// =============================================================================
// Tile Directory
// =============================================================================

#[tokio::test]
async fn test_mosaic_from_tile_directory() {
    let dir = tempfile::tempdir().unwrap();
    let names = ["red.png", "green.png", "blue.png", "yellow.png"];
    for (name, rgb) in names.iter().zip(QUADRANT_COLORS) {
        std::fs::write(dir.path().join(name), solid_png(rgb, 6)).unwrap();
    }
    std::fs::write(dir.path().join("README"), b"not a tile").unwrap();
    std::fs::write(dir.path().join(".hidden.png"), solid_png([0, 0, 0], 6)).unwrap();
    std::fs::create_dir(dir.path().join("nested")).unwrap();

    let source = LocalTileSource::new(dir.path());
    let corpus = TileCorpus::load(&source).await.unwrap();
    assert_eq!(corpus.len(), 4);

    let compositor = Compositor::new(corpus, source);
    let photo = DynamicImage::ImageRgba8(quadrant_image(12, 12, QUADRANT_COLORS));
    let mosaic = compositor.render(&photo, 6).await.unwrap();

    assert_eq!(mosaic.tiles_used, 4);
    assert_eq!(*mosaic.image.get_pixel(11, 11), rgba(QUADRANT_COLORS[3]));
}

#[tokio::test]
async fn test_missing_tile_directory() {
    let dir = tempfile::tempdir().unwrap();
    let source = LocalTileSource::new(dir.path().join("missing"));

    let result = TileCorpus::load(&source).await;
    assert!(matches!(result, Err(SourceError::NotFound(_))));
}
