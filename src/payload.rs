//! Conversion between payloads and the bit patterns that get embedded.
//!
//! Text is stored as a 16 bit big endian byte count followed by the UTF-8 bytes, most
//! significant bit first, filling the layout row by row. Images are flattened to luma, shrunk to
//! fit the layout when needed, centered and binarized at the threshold.

use image::imageops::FilterType;

use crate::error::{Error, Result};
use crate::grid::PixelGrid;
use crate::pattern::{BitPattern, Layout};

/// Width of the byte count in front of a text payload.
const LENGTH_BITS: usize = 16;

/// Data to hide in a carrier.
#[derive(Clone, Debug, PartialEq)]
pub enum Payload {
    Text(String),
    /// Watermark image; dark samples form the mark, near-white samples are background.
    Image(PixelGrid),
}

/// What a recovered pattern should be turned back into.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PayloadKind {
    Text,
    /// Binary image, black mark on white.
    Image,
    /// Binary image with transparent background, see [`crate::mask`].
    Mask,
}

/// Classify a sample: below the threshold it is mark, at or above it background.
pub fn is_mark(sample: u8, threshold: u8) -> bool {
    sample < threshold
}

/// Lay the payload out over `layout`.
pub fn to_pattern(payload: &Payload, layout: Layout, threshold: u8) -> Result<BitPattern> {
    match payload {
        Payload::Text(text) => text_pattern(text, layout),
        Payload::Image(watermark) => image_pattern(watermark, layout, threshold),
    }
}

fn push_bits(bits: &mut Vec<bool>, value: u16, width: usize) {
    bits.extend((0..width).rev().map(|i| (value >> i) & 1 == 1));
}

fn text_pattern(text: &str, layout: Layout) -> Result<BitPattern> {
    let bytes = text.as_bytes();
    let needed = LENGTH_BITS + 8 * bytes.len();
    if needed > layout.len() || bytes.len() > u16::MAX as usize {
        return Err(Error::CapacityExceeded {
            needed,
            available: layout.len(),
        });
    }

    let mut bits = Vec::with_capacity(needed);
    push_bits(&mut bits, bytes.len() as u16, LENGTH_BITS);
    for byte in bytes {
        push_bits(&mut bits, *byte as u16, 8);
    }

    let width = layout.width;
    let height = needed.div_ceil(width);
    bits.resize(width * height, false);
    BitPattern::from_bits(width, height, bits)
}

fn read_bits(bits: &[bool]) -> u16 {
    bits.iter().fold(0u16, |acc, bit| (acc << 1) | *bit as u16)
}

/// Recover text laid out by [`to_pattern`].
///
/// Bytes that do not form valid UTF-8 are replaced, so a damaged payload still decodes.
pub fn text_from_pattern(pattern: &BitPattern) -> Result<String> {
    let bits = pattern.bits();
    if bits.len() < LENGTH_BITS {
        return Err(Error::TruncatedPayload {
            expected: LENGTH_BITS,
            available: bits.len(),
        });
    }
    let length = read_bits(&bits[..LENGTH_BITS]) as usize;
    let expected = LENGTH_BITS + 8 * length;
    if expected > bits.len() {
        return Err(Error::TruncatedPayload {
            expected,
            available: bits.len(),
        });
    }
    let bytes = bits[LENGTH_BITS..expected]
        .chunks_exact(8)
        .map(|byte| read_bits(byte) as u8)
        .collect::<Vec<_>>();
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn image_pattern(watermark: &PixelGrid, layout: Layout, threshold: u8) -> Result<BitPattern> {
    if layout.is_empty() || watermark.rows() == 0 || watermark.cols() == 0 {
        return Err(Error::dimensions(
            (layout.height, layout.width),
            watermark.dimensions(),
        ));
    }

    // Composite over white, transparent regions count as background.
    let luma_alpha = watermark.clone().into_image().into_luma_alpha8();
    let (width, height) = luma_alpha.dimensions();
    let flat = luma_alpha
        .pixels()
        .map(|p| {
            let (l, a) = (p.0[0] as u32, p.0[1] as u32);
            ((l * a + 255 * (255 - a)) / 255) as u8
        })
        .collect::<Vec<_>>();
    let mut gray = image::GrayImage::from_raw(width, height, flat).expect("Guaranteed dimensions");

    let (layout_w, layout_h) = (layout.width as u32, layout.height as u32);
    if width > layout_w || height > layout_h {
        let scale = f64::min(
            layout_w as f64 / width as f64,
            layout_h as f64 / height as f64,
        );
        let new_w = ((width as f64 * scale) as u32).clamp(1, layout_w);
        let new_h = ((height as f64 * scale) as u32).clamp(1, layout_h);
        tracing::debug!(width, height, new_w, new_h, "shrinking watermark to fit");
        gray = image::imageops::resize(&gray, new_w, new_h, FilterType::Triangle);
    }

    let left = (layout.width - gray.width() as usize) / 2;
    let top = (layout.height - gray.height() as usize) / 2;
    let mut pattern = BitPattern::new(layout.width, layout.height);
    for (x, y, pixel) in gray.enumerate_pixels() {
        pattern.set(
            top + y as usize,
            left + x as usize,
            is_mark(pixel.0[0], threshold),
        );
    }
    Ok(pattern)
}

/// Render a pattern as a single channel image, mark black on a white background.
pub fn image_from_pattern(pattern: &BitPattern) -> PixelGrid {
    let data = pattern
        .bits()
        .iter()
        .map(|bit| if *bit { 0 } else { 255 })
        .collect();
    PixelGrid::from_raw(pattern.height(), pattern.width(), 1, data).expect("Guaranteed dimensions")
}
