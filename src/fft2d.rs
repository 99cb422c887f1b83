//! Orthonormal 2d discrete Fourier transform over a whole plane.
//!
//! Rows are transformed in place, columns are gathered into a single buffer, transformed and
//! scattered back. Both directions scale by `1 / sqrt(width * height)`, so a round trip is the
//! identity and coefficient magnitudes are on the same scale as the samples.

use rustfft::num_complex::Complex;
use rustfft::{FftDirection, FftPlanner};

pub type Complex32 = Complex<f32>;

/// 2d complex spectrum, stored row first.
#[derive(Clone, Debug)]
pub struct Spectrum {
    pub data: Vec<Complex32>,
    pub width: usize,
    pub height: usize,
}

impl Spectrum {
    /// Index of frequency `(fy, fx)`, negative frequencies wrap around.
    pub fn index(&self, fy: isize, fx: isize) -> usize {
        let row = fy.rem_euclid(self.height as isize) as usize;
        let col = fx.rem_euclid(self.width as isize) as usize;
        row * self.width + col
    }

    /// Set a coefficient and its conjugate mirror, keeping the inverse real valued.
    pub fn set_symmetric(&mut self, fy: isize, fx: isize, value: Complex32) {
        let index = self.index(fy, fx);
        let mirror = self.index(-fy, -fx);
        self.data[index] = value;
        self.data[mirror] = value.conj();
    }

    pub fn get(&self, fy: isize, fx: isize) -> Complex32 {
        self.data[self.index(fy, fx)]
    }
}

fn transform(
    planner: &mut FftPlanner<f32>,
    direction: FftDirection,
    width: usize,
    height: usize,
    data: &mut [Complex32],
) {
    assert_eq!(data.len(), width * height);

    let row_fft = planner.plan_fft(width, direction);
    let mut scratch = vec![Complex32::new(0.0, 0.0); row_fft.get_inplace_scratch_len()];
    for row in data.chunks_exact_mut(width) {
        row_fft.process_with_scratch(row, &mut scratch);
    }

    let col_fft = planner.plan_fft(height, direction);
    scratch.resize(col_fft.get_inplace_scratch_len(), Complex32::new(0.0, 0.0));
    let mut column = vec![Complex32::new(0.0, 0.0); height];
    for x in 0..width {
        for (y, value) in column.iter_mut().enumerate() {
            *value = data[y * width + x];
        }
        col_fft.process_with_scratch(&mut column, &mut scratch);
        for (y, value) in column.iter().enumerate() {
            data[y * width + x] = *value;
        }
    }

    let scale = 1.0 / ((width * height) as f32).sqrt();
    for value in data.iter_mut() {
        *value *= scale;
    }
}

/// Forward transform of a real plane.
pub fn forward(
    planner: &mut FftPlanner<f32>,
    width: usize,
    height: usize,
    plane: &[f32],
) -> Spectrum {
    let mut data = plane
        .iter()
        .map(|v| Complex32::new(*v, 0.0))
        .collect::<Vec<_>>();
    transform(planner, FftDirection::Forward, width, height, &mut data);
    Spectrum {
        data,
        width,
        height,
    }
}

/// Inverse transform, keeping only the real part.
pub fn inverse(planner: &mut FftPlanner<f32>, mut spectrum: Spectrum) -> Vec<f32> {
    let (width, height) = (spectrum.width, spectrum.height);
    transform(
        planner,
        FftDirection::Inverse,
        width,
        height,
        &mut spectrum.data,
    );
    spectrum.data.iter().map(|c| c.re).collect()
}
