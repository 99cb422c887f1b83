//! Visualization of a binary grid with a transparent background.

use crate::grid::PixelGrid;

/// Sample value of background pixels in a binarized grid.
pub const BACKGROUND: u8 = 255;

/// Turn a binary grid into RGBA.
///
/// Color channels copy the first channel of `binary`. Alpha is 0 where that channel is
/// [`BACKGROUND`] and 255 everywhere else, so only the mark remains visible.
pub fn to_alpha_visualization(binary: &PixelGrid) -> PixelGrid {
    let mut rgba = Vec::with_capacity(binary.rows() * binary.cols() * 4);
    for sample in binary.data().iter().step_by(binary.channels()) {
        let alpha = if *sample == BACKGROUND { 0 } else { 255 };
        rgba.extend_from_slice(&[*sample, *sample, *sample, alpha]);
    }
    PixelGrid::from_raw(binary.rows(), binary.cols(), 4, rgba).expect("Guaranteed dimensions")
}
