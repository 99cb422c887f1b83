//! Bit patterns and the slot layouts they are embedded into.

use crate::error::{Error, Result};

/// Usable region of a converter for a given carrier, in slots.
///
/// One slot holds one bit. Pattern bits are assigned to slots row first.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Layout {
    pub width: usize,
    pub height: usize,
}

impl Layout {
    pub fn new(width: usize, height: usize) -> Self {
        Layout { width, height }
    }

    /// Number of bits the layout can hold.
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Two dimensional binary pattern, `true` marks a watermark bit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BitPattern {
    width: usize,
    height: usize,
    bits: Vec<bool>,
}

impl BitPattern {
    /// Pattern of `width x height` background bits.
    pub fn new(width: usize, height: usize) -> Self {
        BitPattern {
            width,
            height,
            bits: vec![false; width * height],
        }
    }

    pub fn from_bits(width: usize, height: usize, bits: Vec<bool>) -> Result<Self> {
        if bits.len() != width * height {
            return Err(Error::DimensionMismatch {
                expected: format!("{} bits for {width}x{height}", width * height),
                actual: format!("{} bits", bits.len()),
            });
        }
        Ok(BitPattern {
            width,
            height,
            bits,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    pub fn get(&self, row: usize, col: usize) -> bool {
        self.bits[row * self.width + col]
    }

    pub fn set(&mut self, row: usize, col: usize, bit: bool) {
        self.bits[row * self.width + col] = bit;
    }

    /// Number of mark bits.
    pub fn count_ones(&self) -> usize {
        self.bits.iter().filter(|b| **b).count()
    }

    /// Number of positions where the two patterns disagree, compared over the shorter one.
    pub fn differences(&self, other: &BitPattern) -> usize {
        self.bits
            .iter()
            .zip(other.bits.iter())
            .filter(|(a, b)| a != b)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_bits_checks_length() {
        assert!(BitPattern::from_bits(3, 2, vec![true; 6]).is_ok());
        assert!(matches!(
            BitPattern::from_bits(3, 2, vec![true; 5]),
            Err(Error::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_set_get() {
        let mut pattern = BitPattern::new(4, 3);
        pattern.set(2, 1, true);
        assert!(pattern.get(2, 1));
        assert_eq!(pattern.bits()[9], true);
        assert_eq!(pattern.count_ones(), 1);
        assert_eq!(pattern.differences(&BitPattern::new(4, 3)), 1);
    }
}
