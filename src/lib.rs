//! Blind watermarking of images in the frequency domain.
//!
//! A text or image payload is laid out as a [`BitPattern`] and embedded into a carrier with one
//! of two [`Strategy`] variants, block DCT or whole image DFT. Extraction needs only the
//! watermarked image. The [`robust`] module holds reversible pixel domain passes that can be
//! chained around embedding.

pub mod codec;
pub mod config;
pub mod converter;
pub mod dct2d;
pub mod error;
pub mod fft2d;
pub mod grid;
pub mod io;
pub mod mask;
pub mod pattern;
pub mod payload;
pub mod robust;

// expose the converter trait in the prelude.
pub mod prelude {
    pub use crate::converter::Converter;
}

pub use codec::{Decoded, Decoder, Encoder};
pub use config::Config;
pub use converter::{DctConverter, DftConverter, Strategy};
pub use error::{Error, Result};
pub use grid::{Depth, PixelGrid};
pub use pattern::{BitPattern, Layout};
pub use payload::{Payload, PayloadKind};
pub use robust::{Hardened, Hardening, Interleave, ScrambleMap, Step};
