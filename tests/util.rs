#![allow(dead_code)]
use blind_watermark as wm;
use rand_chacha::ChaCha8Rng;

pub fn generate_fixed_normal_sequence(seed: u64, length: usize, std_dev: f32) -> Vec<f32> {
    use rand::prelude::*;
    use rand_distr::Normal;
    let mut generator = ChaCha8Rng::seed_from_u64(seed);
    let normal = Normal::new(0.0f32, std_dev).expect("valid deviation");
    let mut data = Vec::with_capacity(length);
    data.resize_with(length, || generator.sample(normal));
    data
}

/// A smooth diagonal gradient between 64 and 192 with fixed gaussian texture on top, every
/// channel offset a little so color carriers are not plain gray.
pub fn textured_carrier(seed: u64, rows: usize, cols: usize, channels: usize) -> wm::PixelGrid {
    let noise = generate_fixed_normal_sequence(seed, rows * cols * channels, 12.0);
    let mut data = Vec::with_capacity(rows * cols * channels);
    for row in 0..rows {
        for col in 0..cols {
            let base = 64.0 + 128.0 * (row + col) as f32 / (rows + cols) as f32;
            for c in 0..channels {
                let n = noise[(row * cols + col) * channels + c];
                data.push((base + 6.0 * c as f32 + n).round().clamp(0.0, 255.0) as u8);
            }
        }
    }
    wm::PixelGrid::from_raw(rows, cols, channels, data).expect("Guaranteed dimensions")
}

/// Black square on white, the watermark image used throughout the tests.
pub fn square_watermark(size: usize, border: usize) -> wm::PixelGrid {
    let mut grid = wm::PixelGrid::filled(size, size, 1, 255);
    for row in border..size - border {
        for col in border..size - border {
            grid.set(row, col, 0, 0);
        }
    }
    grid
}
