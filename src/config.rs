//! Tunable parameters, passed explicitly into every operation that needs them.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Configuration shared by the encoder, decoder and hardening passes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Samples at or above this value are background, below it they are mark.
    pub threshold: u8,
    /// Minimum difference between the two coefficients of a DCT slot.
    pub dct_strength: f32,
    /// Minimum magnitude difference between the two frequencies of a DFT slot.
    pub dft_strength: f32,
    /// Embed and verify passes before giving up on a slot.
    pub attempts: usize,
    /// Inner and outer normalized radius of the DFT embedding ring.
    pub ring: (f32, f32),
}

impl Default for Config {
    fn default() -> Self {
        Config {
            threshold: 240,
            dct_strength: 24.0,
            dft_strength: 12.0,
            attempts: 4,
            ring: (0.15, 0.30),
        }
    }
}

impl Config {
    /// Reject values no converter can work with.
    pub fn validate(&self) -> Result<()> {
        let invalid = |name: &str, reason: String| Error::InvalidParameter {
            name: name.to_owned(),
            reason,
        };
        if !(self.dct_strength > 0.0) {
            return Err(invalid(
                "dct_strength",
                format!("must be positive, got {}", self.dct_strength),
            ));
        }
        if !(self.dft_strength > 0.0) {
            return Err(invalid(
                "dft_strength",
                format!("must be positive, got {}", self.dft_strength),
            ));
        }
        if self.attempts == 0 {
            return Err(invalid("attempts", "at least one pass is needed".to_owned()));
        }
        let (inner, outer) = self.ring;
        if !(0.0 <= inner && inner < outer && outer <= 0.5) {
            return Err(invalid(
                "ring",
                format!("need 0 <= inner < outer <= 0.5, got ({inner}, {outer})"),
            ));
        }
        Ok(())
    }
}
