//! Average-color signatures.
//!
//! Signatures live in 16-bit channel space (0-65535). 8-bit images are
//! widened with `v * 257` before averaging, so a tile and a source pixel of
//! the same 8-bit color always compare at distance zero.
//!
//! Channels are straight, not premultiplied by alpha: a half-transparent red
//! pixel contributes full red to an average. Transparent regions of a tile do
//! not darken its signature.

use image::{GenericImageView, ImageBuffer, Rgba};

/// RGBA image with 16 bits per channel, the working format for matching.
pub type Rgba16Image = ImageBuffer<Rgba<u16>, Vec<u16>>;

/// Mean red, green and blue intensity of a pixel region.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ColorSignature {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
}

impl ColorSignature {
    pub const fn new(red: f64, green: f64, blue: f64) -> Self {
        Self { red, green, blue }
    }

    /// Signature of a single pixel.
    ///
    /// Alpha is ignored and the color channels are taken as stored, without
    /// premultiplying by alpha.
    pub fn from_pixel(pixel: Rgba<u16>) -> Self {
        let [r, g, b, _] = pixel.0;
        Self::new(f64::from(r), f64::from(g), f64::from(b))
    }

    /// Signature of an 8-bit color, widened to 16-bit range.
    pub fn from_rgb8(rgb: [u8; 3]) -> Self {
        let widen = |c: u8| f64::from(u16::from(c) * 257);
        Self::new(widen(rgb[0]), widen(rgb[1]), widen(rgb[2]))
    }

    /// Euclidean distance over the three channels.
    pub fn distance(&self, other: &ColorSignature) -> f64 {
        let dr = self.red - other.red;
        let dg = self.green - other.green;
        let db = self.blue - other.blue;
        (dr * dr + dg * dg + db * db).sqrt()
    }

    pub fn channels(&self) -> [f64; 3] {
        [self.red, self.green, self.blue]
    }
}

/// Average color of every pixel in `region`.
///
/// Returns `None` for a zero-area region. Sums are accumulated in `u64`, which
/// holds `pixel_count * 65535` for any image the `image` crate can address.
pub fn signature<I>(region: &I) -> Option<ColorSignature>
where
    I: GenericImageView<Pixel = Rgba<u16>>,
{
    let (width, height) = region.dimensions();
    let count = u64::from(width) * u64::from(height);
    if count == 0 {
        return None;
    }

    let (mut r, mut g, mut b) = (0u64, 0u64, 0u64);
    for (_, _, pixel) in region.pixels() {
        r += u64::from(pixel[0]);
        g += u64::from(pixel[1]);
        b += u64::from(pixel[2]);
    }

    let count = count as f64;
    Some(ColorSignature::new(
        r as f64 / count,
        g as f64 / count,
        b as f64 / count,
    ))
}

// =============================================================================
// Tests
// =============================================================================
