//! Reading and writing pixel grids through the `image` crate.

use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use tracing::info;

use crate::error::{Error, Result};
use crate::grid::{Depth, PixelGrid};

/// Quality used when a grid is saved to a `.jpg` path without an explicit quality.
pub const JPEG_QUALITY: u8 = 95;

fn codec_error(path: &Path, source: image::ImageError) -> Error {
    match source {
        image::ImageError::IoError(e) => Error::Io(e),
        source => Error::UnsupportedFormat {
            path: path.to_path_buf(),
            source,
        },
    }
}

fn is_jpeg(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| matches!(e.to_lowercase().as_str(), "jpg" | "jpeg"))
        .unwrap_or(false)
}

/// Load an image file with the requested channel layout.
pub fn read<P: AsRef<Path>>(path: P, depth: Depth) -> Result<PixelGrid> {
    let path = path.as_ref();
    let image = image::open(path).map_err(|source| codec_error(path, source))?;
    Ok(PixelGrid::from_image(image, depth))
}

/// Save a grid, the format follows from the extension.
pub fn write<P: AsRef<Path>>(path: P, grid: &PixelGrid) -> Result<()> {
    let path = path.as_ref();
    if is_jpeg(path) {
        return write_jpeg(path, grid, JPEG_QUALITY);
    }
    grid.clone()
        .into_image()
        .save(path)
        .map_err(|source| codec_error(path, source))?;
    info!(path = %path.display(), rows = grid.rows(), cols = grid.cols(), "wrote image");
    Ok(())
}

/// Save a grid as JPEG with the given quality (1 to 100). Alpha is dropped.
pub fn write_jpeg<P: AsRef<Path>>(path: P, grid: &PixelGrid, quality: u8) -> Result<()> {
    let path = path.as_ref();
    let bytes = encode_jpeg(grid, quality)?;
    std::fs::write(path, bytes)?;
    info!(path = %path.display(), quality, "wrote jpeg");
    Ok(())
}

/// Compress a grid to JPEG in memory. Alpha is dropped.
pub fn encode_jpeg(grid: &PixelGrid, quality: u8) -> Result<Vec<u8>> {
    let image = match grid.channels() {
        2 => image::DynamicImage::ImageLuma8(grid.clone().into_image().into_luma8()),
        4 => image::DynamicImage::ImageRgb8(grid.clone().into_image().into_rgb8()),
        _ => grid.clone().into_image(),
    };
    let mut bytes = vec![];
    JpegEncoder::new_with_quality(&mut bytes, quality)
        .encode(
            image.as_bytes(),
            image.width(),
            image.height(),
            image.color(),
        )
        .map_err(|source| codec_error(&PathBuf::from("<memory>"), source))?;
    Ok(bytes)
}

/// Decode an in-memory image.
pub fn decode(bytes: &[u8], depth: Depth) -> Result<PixelGrid> {
    let image = image::load_from_memory(bytes)
        .map_err(|source| codec_error(&PathBuf::from("<memory>"), source))?;
    Ok(PixelGrid::from_image(image, depth))
}
