//! Frequency domain embedding and extraction.
//!
//! A [`Converter`] moves a single channel plane into some coefficient domain and back, and knows
//! how to write one bit into, or read one bit from, a slot of that domain. Two converters exist:
//! - [`DctConverter`], one slot per 8x8 block, using a pair of mid frequency DCT coefficients.
//! - [`DftConverter`], slots on a mid radius ring of the whole plane spectrum.
//!
//! Both encode a bit as the sign of the difference between two coefficients, so a bit survives
//! as long as distortion does not flip which of the two is larger. The generic [`embed`] and
//! [`extract`] drive a converter over every color channel of a grid.

mod dct;
mod dft;

pub use dct::{BlockCoefficients, DctConverter, BLOCK_SIZE};
pub use dft::{DftConverter, RingSpectrum};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::grid::PixelGrid;
use crate::pattern::{BitPattern, Layout};

/// Capability shared by the transform strategies.
pub trait Converter {
    /// Coefficient representation of one plane.
    type Domain;

    /// Slots available for a plane of `rows x cols`.
    fn layout(&self, rows: usize, cols: usize) -> Layout;

    /// Transform a row first plane into the coefficient domain.
    fn forward(&mut self, rows: usize, cols: usize, plane: &[f32]) -> Self::Domain;

    /// Transform back into a row first plane, not yet rounded.
    fn inverse(&mut self, domain: Self::Domain) -> Vec<f32>;

    /// Force the coefficients of `slot` to represent `bit` with at least `strength` margin.
    fn embed_coefficient(&self, domain: &mut Self::Domain, slot: usize, bit: bool, strength: f32);

    /// Read the bit held by `slot`.
    fn extract_coefficient(&self, domain: &Self::Domain, slot: usize) -> bool;

    /// Distance the plane has to keep from both ends of the sample range before embedding at
    /// `strength`, so the changes are not clipped away.
    fn headroom(&self, _strength: f32) -> f32 {
        0.0
    }
}

/// Move two values apart so `a - b` is at least `strength` for a mark and at most `-strength`
/// for background, preserving their mean. Pairs that already satisfy the margin are kept.
pub(crate) fn separate(a: f32, b: f32, bit: bool, strength: f32) -> (f32, f32) {
    let mean = (a + b) / 2.0;
    let difference = a - b;
    let difference = if bit {
        difference.max(strength)
    } else {
        difference.min(-strength)
    };
    (mean + difference / 2.0, mean - difference / 2.0)
}

/// Fit the plane into `margin..=255 - margin`. A plane whose spread allows it is shifted,
/// otherwise it is compressed linearly. Planes already inside are left alone.
pub(crate) fn make_headroom(plane: &mut [f32], margin: f32) {
    let margin = margin.min(127.0);
    if margin <= 0.0 || plane.is_empty() {
        return;
    }
    let (low, high) = (margin, 255.0 - margin);
    let min = plane.iter().copied().fold(f32::INFINITY, f32::min);
    let max = plane.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    if min >= low && max <= high {
        return;
    }
    if max - min <= high - low {
        let shift = if min < low { low - min } else { high - max };
        plane.iter_mut().for_each(|v| *v += shift);
    } else {
        let scale = (high - low) / (max - min);
        plane.iter_mut().for_each(|v| *v = low + (*v - min) * scale);
    }
}

/// Slot index and bit for every position of the pattern. Pattern rows map onto layout rows,
/// so a narrower pattern occupies the left part of the layout.
fn slot_bits(pattern: &BitPattern, layout: Layout) -> Vec<(usize, bool)> {
    (0..pattern.height())
        .flat_map(|row| {
            (0..pattern.width()).map(move |col| (row * layout.width + col, pattern.get(row, col)))
        })
        .collect()
}

/// Embed the pattern into every color channel of the carrier.
///
/// The pattern is checked against the capacity and the layout geometry before the carrier is
/// touched. After each inverse transform the plane is quantized to 8 bits and read back; slots
/// that no longer hold their bit are embedded again with 1.5 times the previous strength. If
/// slots still fail after `attempts` passes in total, the embedding is an error.
pub fn embed<C: Converter>(
    converter: &mut C,
    carrier: PixelGrid,
    pattern: &BitPattern,
    strength: f32,
    attempts: usize,
) -> Result<PixelGrid> {
    let (rows, cols) = carrier.dimensions();
    let layout = converter.layout(rows, cols);
    if pattern.len() > layout.len() {
        return Err(Error::CapacityExceeded {
            needed: pattern.len(),
            available: layout.len(),
        });
    }
    if pattern.width() > layout.width || pattern.height() > layout.height {
        return Err(Error::dimensions(
            (layout.height, layout.width),
            (pattern.height(), pattern.width()),
        ));
    }
    let slots = slot_bits(pattern, layout);
    debug!(rows, cols, capacity = layout.len(), bits = pattern.len(), "embedding pattern");

    let mut grid = carrier;
    for channel in 0..grid.color_channels() {
        let mut plane = grid.plane(channel);
        make_headroom(&mut plane, converter.headroom(strength));
        let mut domain = converter.forward(rows, cols, &plane);
        for (slot, bit) in slots.iter() {
            converter.embed_coefficient(&mut domain, *slot, *bit, strength);
        }
        grid.set_plane(channel, &converter.inverse(domain));

        let mut boosted = strength;
        for pass in 1..=attempts {
            let mut domain = converter.forward(rows, cols, &grid.plane(channel));
            let failing = slots
                .iter()
                .filter(|(slot, bit)| converter.extract_coefficient(&domain, *slot) != *bit)
                .copied()
                .collect::<Vec<_>>();
            if failing.is_empty() {
                break;
            }
            if pass == attempts {
                warn!(channel, failing = failing.len(), "slots unreadable after {attempts} passes");
                return Err(Error::EmbeddingFailed {
                    channel,
                    failing: failing.len(),
                    attempts,
                });
            }
            boosted *= 1.5;
            debug!(channel, failing = failing.len(), boosted, "re-embedding slots");
            for (slot, bit) in failing {
                converter.embed_coefficient(&mut domain, slot, bit, boosted);
            }
            grid.set_plane(channel, &converter.inverse(domain));
        }
    }
    Ok(grid)
}

/// Read every slot of the grid, the result has the shape of the layout.
///
/// Each color channel is read independently and the bits are combined with a majority vote,
/// ties count as mark.
pub fn extract<C: Converter>(converter: &mut C, grid: &PixelGrid) -> BitPattern {
    let (rows, cols) = grid.dimensions();
    let layout = converter.layout(rows, cols);
    let channels = grid.color_channels();
    debug!(rows, cols, capacity = layout.len(), channels, "extracting pattern");

    let mut votes = vec![0usize; layout.len()];
    for channel in 0..channels {
        let domain = converter.forward(rows, cols, &grid.plane(channel));
        for (slot, vote) in votes.iter_mut().enumerate() {
            if converter.extract_coefficient(&domain, slot) {
                *vote += 1;
            }
        }
    }
    let bits = votes.iter().map(|v| 2 * v >= channels).collect();
    BitPattern::from_bits(layout.width, layout.height, bits).expect("Guaranteed dimensions")
}

/// Selects the converter used by the encoder and decoder.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Block local discrete cosine transform.
    Dct,
    /// Whole image discrete Fourier transform.
    Dft,
}

impl Strategy {
    /// Slots available in a carrier of `rows x cols`.
    pub fn layout(&self, rows: usize, cols: usize, config: &Config) -> Layout {
        match self {
            Strategy::Dct => DctConverter::new().layout(rows, cols),
            Strategy::Dft => DftConverter::new(config.ring).layout(rows, cols),
        }
    }

    pub fn embed(
        &self,
        carrier: PixelGrid,
        pattern: &BitPattern,
        config: &Config,
    ) -> Result<PixelGrid> {
        config.validate()?;
        match self {
            Strategy::Dct => embed(
                &mut DctConverter::new(),
                carrier,
                pattern,
                config.dct_strength,
                config.attempts,
            ),
            Strategy::Dft => embed(
                &mut DftConverter::new(config.ring),
                carrier,
                pattern,
                config.dft_strength,
                config.attempts,
            ),
        }
    }

    pub fn extract(&self, grid: &PixelGrid, config: &Config) -> Result<BitPattern> {
        config.validate()?;
        Ok(match self {
            Strategy::Dct => extract(&mut DctConverter::new(), grid),
            Strategy::Dft => extract(&mut DftConverter::new(config.ring), grid),
        })
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::Dct => write!(f, "dct"),
            Strategy::Dft => write!(f, "dft"),
        }
    }
}
