//! End to end embedding and blind extraction.
//!
//! The [`Encoder`] turns a payload into a pattern sized for the carrier and embeds it with the
//! selected [`Strategy`]. The [`Decoder`] extracts the pattern again, using nothing but the
//! (possibly attacked) watermarked image. Neither applies a [`crate::robust::Hardening`]
//! pipeline; callers chain that around them when needed.

use std::path::Path;

use tracing::{debug, info};

use crate::config::Config;
use crate::converter::Strategy;
use crate::error::Result;
use crate::grid::{Depth, PixelGrid};
use crate::io;
use crate::mask;
use crate::pattern::{BitPattern, Layout};
use crate::payload::{self, Payload, PayloadKind};

/// Embeds payloads into carriers.
#[derive(Debug, Clone)]
pub struct Encoder {
    strategy: Strategy,
    config: Config,
}

impl Encoder {
    pub fn new(strategy: Strategy, config: Config) -> Self {
        Encoder { strategy, config }
    }

    /// Slots available in the carrier.
    pub fn layout(&self, carrier: &PixelGrid) -> Layout {
        self.strategy
            .layout(carrier.rows(), carrier.cols(), &self.config)
    }

    /// Embed the payload, returning the watermarked grid.
    pub fn embed(&self, carrier: PixelGrid, payload: &Payload) -> Result<PixelGrid> {
        self.config.validate()?;
        let layout = self.layout(&carrier);
        debug!(
            strategy = %self.strategy,
            rows = carrier.rows(),
            cols = carrier.cols(),
            capacity = layout.len(),
            "encoding"
        );
        let pattern = payload::to_pattern(payload, layout, self.config.threshold)?;
        self.strategy.embed(carrier, &pattern, &self.config)
    }

    /// Load the carrier, embed the payload and write the result.
    pub fn encode<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        carrier_path: P,
        payload: &Payload,
        output_path: Q,
    ) -> Result<()> {
        let carrier = io::read(carrier_path, Depth::Native)?;
        let marked = self.embed(carrier, payload)?;
        io::write(output_path, &marked)
    }
}

/// Result of decoding a file.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    Text(String),
    Image(PixelGrid),
}

/// Recovers payloads from watermarked images.
#[derive(Debug, Clone)]
pub struct Decoder {
    strategy: Strategy,
    config: Config,
}

impl Decoder {
    pub fn new(strategy: Strategy, config: Config) -> Self {
        Decoder { strategy, config }
    }

    /// Read the raw pattern from every slot.
    pub fn extract(&self, grid: &PixelGrid) -> Result<BitPattern> {
        debug!(strategy = %self.strategy, rows = grid.rows(), cols = grid.cols(), "decoding");
        self.strategy.extract(grid, &self.config)
    }

    pub fn decode_text(&self, grid: &PixelGrid) -> Result<String> {
        payload::text_from_pattern(&self.extract(grid)?)
    }

    /// The recovered mark as black on white.
    pub fn decode_image(&self, grid: &PixelGrid) -> Result<PixelGrid> {
        Ok(payload::image_from_pattern(&self.extract(grid)?))
    }

    /// The recovered mark on a transparent background.
    pub fn decode_mask(&self, grid: &PixelGrid) -> Result<PixelGrid> {
        Ok(mask::to_alpha_visualization(&self.decode_image(grid)?))
    }

    /// Load an image, decode it as `kind` and write the result.
    ///
    /// Text is written as UTF-8, the image kinds in the format given by the output extension.
    pub fn decode<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input_path: P,
        output_path: Q,
        kind: PayloadKind,
    ) -> Result<Decoded> {
        let grid = io::read(input_path, Depth::Native)?;
        let output_path = output_path.as_ref();
        let decoded = match kind {
            PayloadKind::Text => {
                let text = self.decode_text(&grid)?;
                std::fs::write(output_path, &text)?;
                info!(path = %output_path.display(), bytes = text.len(), "wrote text");
                Decoded::Text(text)
            }
            PayloadKind::Image => {
                let image = self.decode_image(&grid)?;
                io::write(output_path, &image)?;
                Decoded::Image(image)
            }
            PayloadKind::Mask => {
                let image = self.decode_mask(&grid)?;
                io::write(output_path, &image)?;
                Decoded::Image(image)
            }
        };
        Ok(decoded)
    }
}
