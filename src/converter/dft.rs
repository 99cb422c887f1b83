use rustfft::FftPlanner;

use super::{separate, Converter};
use crate::fft2d::{self, Complex32, Spectrum};
use crate::pattern::Layout;

/// Phase step between slots whose coefficients start out without energy.
const GOLDEN_ANGLE: f32 = 2.399_963;

/// Below this magnitude a coefficient has no meaningful phase.
const SILENT: f32 = 1e-3;

/// Phase to keep for a rewritten coefficient. Flat regions of a plane have no energy in the
/// ring, giving every new component the same phase would stack them into one bright spot.
fn phase(value: Complex32, index: usize) -> f32 {
    if value.norm() > SILENT {
        value.arg()
    } else {
        (index as f32 * GOLDEN_ANGLE) % std::f32::consts::TAU
    }
}

/// Spectrum of a whole plane, together with the frequencies its slots occupy.
pub struct RingSpectrum {
    spectrum: Spectrum,
    slots: Vec<(isize, isize)>,
}

impl RingSpectrum {
    pub fn spectrum(&self) -> &Spectrum {
        &self.spectrum
    }

    /// Frequency `(fy, fx)` of the first coefficient of each slot, the second is `(fy, fx + 1)`.
    pub fn slots(&self) -> &[(isize, isize)] {
        &self.slots
    }
}

/// Converter embedding in the magnitudes of a mid radius ring of the whole plane spectrum.
///
/// Only frequencies with a positive horizontal component are used; their conjugate mirrors are
/// written alongside, so the plane stays real valued.
pub struct DftConverter {
    planner: FftPlanner<f32>,
    ring: (f32, f32),
}

impl DftConverter {
    /// Converter using the normalized radius band `ring`, given as (inner, outer).
    pub fn new(ring: (f32, f32)) -> Self {
        DftConverter {
            planner: FftPlanner::new(),
            ring,
        }
    }

    /// Pairs of horizontally adjacent frequencies that fall entirely inside the ring.
    fn ring_slots(&self, rows: usize, cols: usize) -> Vec<(isize, isize)> {
        let (inner, outer) = self.ring;
        let radius = |fy: isize, fx: isize| {
            let y = fy as f32 / rows as f32;
            let x = fx as f32 / cols as f32;
            (x * x + y * y).sqrt()
        };
        let in_ring = |fy: isize, fx: isize| {
            let r = radius(fy, fx);
            inner <= r && r <= outer
        };

        let limit = (rows.saturating_sub(1) / 2) as isize;
        let mut slots = vec![];
        for fy in -limit..=limit {
            let mut fx = 1isize;
            // Stay below the horizontal Nyquist frequency.
            while 2 * (fx + 1) < cols as isize {
                if in_ring(fy, fx) && in_ring(fy, fx + 1) {
                    slots.push((fy, fx));
                }
                fx += 2;
            }
        }
        slots
    }
}

impl Converter for DftConverter {
    type Domain = RingSpectrum;

    fn layout(&self, rows: usize, cols: usize) -> Layout {
        let n = self.ring_slots(rows, cols).len();
        let width = (n as f64).sqrt() as usize;
        if width == 0 {
            return Layout::new(0, 0);
        }
        Layout::new(width, n / width)
    }

    fn forward(&mut self, rows: usize, cols: usize, plane: &[f32]) -> RingSpectrum {
        RingSpectrum {
            spectrum: fft2d::forward(&mut self.planner, cols, rows, plane),
            slots: self.ring_slots(rows, cols),
        }
    }

    fn inverse(&mut self, domain: RingSpectrum) -> Vec<f32> {
        fft2d::inverse(&mut self.planner, domain.spectrum)
    }

    fn embed_coefficient(&self, domain: &mut RingSpectrum, slot: usize, bit: bool, strength: f32) {
        let (fy, fx) = domain.slots[slot];
        let a = domain.spectrum.get(fy, fx);
        let b = domain.spectrum.get(fy, fx + 1);
        let (mag_a, mag_b) = separate(a.norm(), b.norm(), bit, strength);
        // Magnitudes can not go negative, lift both and keep the difference.
        let lift = (-mag_a.min(mag_b)).max(0.0);
        let (phase_a, phase_b) = (phase(a, 2 * slot), phase(b, 2 * slot + 1));
        domain
            .spectrum
            .set_symmetric(fy, fx, Complex32::from_polar(mag_a + lift, phase_a));
        domain
            .spectrum
            .set_symmetric(fy, fx + 1, Complex32::from_polar(mag_b + lift, phase_b));
    }

    fn extract_coefficient(&self, domain: &RingSpectrum, slot: usize) -> bool {
        let (fy, fx) = domain.slots[slot];
        domain.spectrum.get(fy, fx).norm() > domain.spectrum.get(fy, fx + 1).norm()
    }

    /// Changes spread over the whole plane and clip on saturated carriers.
    fn headroom(&self, strength: f32) -> f32 {
        2.0 * strength
    }
}
