use rustdct::DctPlanner;

use super::{separate, Converter};
use crate::dct2d::{dct_2d, Type};
use crate::pattern::Layout;

/// Edge length of the square blocks the plane is cut into.
pub const BLOCK_SIZE: usize = 8;

/// The two mid frequency coefficients compared in every block, as (row, col) within the block.
const PAIR: [(usize, usize); 2] = [(3, 4), (4, 3)];

/// Plane with every full block replaced by its DCT coefficients.
///
/// Rows and columns past the last full block keep their sample values.
pub struct BlockCoefficients {
    rows: usize,
    cols: usize,
    data: Vec<f32>,
}

impl BlockCoefficients {
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Indices of the coefficient pair for a slot.
    fn pair(&self, slot: usize) -> (usize, usize) {
        let blocks_across = self.cols / BLOCK_SIZE;
        let top = (slot / blocks_across) * BLOCK_SIZE;
        let left = (slot % blocks_across) * BLOCK_SIZE;
        let index = |(r, c): (usize, usize)| (top + r) * self.cols + left + c;
        (index(PAIR[0]), index(PAIR[1]))
    }
}

/// Converter working on independent 8x8 blocks, one bit per block.
pub struct DctConverter {
    planner: DctPlanner<f32>,
}

impl Default for DctConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl DctConverter {
    pub fn new() -> Self {
        DctConverter {
            planner: DctPlanner::new(),
        }
    }

    fn transform_blocks(&mut self, transform: Type, rows: usize, cols: usize, data: &mut [f32]) {
        let mut block = [0f32; BLOCK_SIZE * BLOCK_SIZE];
        for by in 0..rows / BLOCK_SIZE {
            for bx in 0..cols / BLOCK_SIZE {
                let origin = by * BLOCK_SIZE * cols + bx * BLOCK_SIZE;
                for (r, block_row) in block.chunks_exact_mut(BLOCK_SIZE).enumerate() {
                    let start = origin + r * cols;
                    block_row.copy_from_slice(&data[start..start + BLOCK_SIZE]);
                }
                dct_2d(&mut self.planner, transform, BLOCK_SIZE, BLOCK_SIZE, &mut block);
                for (r, block_row) in block.chunks_exact(BLOCK_SIZE).enumerate() {
                    let start = origin + r * cols;
                    data[start..start + BLOCK_SIZE].copy_from_slice(block_row);
                }
            }
        }
    }
}

impl Converter for DctConverter {
    type Domain = BlockCoefficients;

    fn layout(&self, rows: usize, cols: usize) -> Layout {
        Layout::new(cols / BLOCK_SIZE, rows / BLOCK_SIZE)
    }

    fn forward(&mut self, rows: usize, cols: usize, plane: &[f32]) -> BlockCoefficients {
        let mut data = plane.to_vec();
        self.transform_blocks(Type::DCT2, rows, cols, &mut data);
        BlockCoefficients { rows, cols, data }
    }

    fn inverse(&mut self, domain: BlockCoefficients) -> Vec<f32> {
        let BlockCoefficients {
            rows,
            cols,
            mut data,
        } = domain;
        self.transform_blocks(Type::DCT3, rows, cols, &mut data);
        data
    }

    fn embed_coefficient(
        &self,
        domain: &mut BlockCoefficients,
        slot: usize,
        bit: bool,
        strength: f32,
    ) {
        let (a, b) = domain.pair(slot);
        let (new_a, new_b) = separate(domain.data[a], domain.data[b], bit, strength);
        domain.data[a] = new_a;
        domain.data[b] = new_b;
    }

    fn extract_coefficient(&self, domain: &BlockCoefficients, slot: usize) -> bool {
        let (a, b) = domain.pair(slot);
        domain.data[a] > domain.data[b]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::{embed, extract};
    use crate::grid::PixelGrid;
    use crate::pattern::BitPattern;

    fn textured(rows: usize, cols: usize) -> PixelGrid {
        let data = (0..rows * cols)
            .map(|i| (60 + (i * 7919 % 131)) as u8)
            .collect::<Vec<_>>();
        PixelGrid::from_raw(rows, cols, 1, data).unwrap()
    }

    #[test]
    fn test_layout_ignores_remainder() {
        let converter = DctConverter::new();
        assert_eq!(converter.layout(20, 35), Layout::new(4, 2));
        assert!(converter.layout(7, 100).is_empty());
    }

    #[test]
    fn test_forward_inverse_identity() {
        let grid = textured(19, 21);
        let plane = grid.plane(0);
        let mut converter = DctConverter::new();
        let domain = converter.forward(19, 21, &plane);
        // Remainder column untouched by the forward transform.
        assert_eq!(domain.data()[20], plane[20]);
        let back = converter.inverse(domain);
        for (a, b) in plane.iter().zip(back.iter()) {
            assert!((a - b).abs() < 0.01);
        }
    }

    #[test]
    fn test_embed_extract_coefficient() {
        let mut converter = DctConverter::new();
        let plane = textured(16, 16).plane(0);
        let mut domain = converter.forward(16, 16, &plane);
        for slot in 0..4 {
            converter.embed_coefficient(&mut domain, slot, slot % 2 == 0, 10.0);
        }
        for slot in 0..4 {
            assert_eq!(converter.extract_coefficient(&domain, slot), slot % 2 == 0);
        }
    }

    #[test]
    fn test_round_trip_quantized() {
        let carrier = textured(64, 72);
        let mut pattern = BitPattern::new(9, 8);
        for i in 0..72 {
            pattern.set(i / 9, i % 9, (i * 5) % 3 == 0);
        }
        let mut converter = DctConverter::new();
        let marked = embed(&mut converter, carrier.clone(), &pattern, 24.0, 4).unwrap();
        assert_eq!(extract(&mut converter, &marked), pattern);
        assert_ne!(marked, carrier);
    }
}
