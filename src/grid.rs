//! The pixel grid passed between every stage of the pipeline.

use crate::error::{Error, Result};

/// Channel layout requested when loading an image.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Depth {
    /// Single 8 bit luma channel.
    Gray,
    /// Three 8 bit color channels.
    Color,
    /// Three color channels plus alpha.
    ColorAlpha,
    /// Whatever the source holds: gray, gray with alpha, color or color with alpha.
    Native,
}

/// Rectangular `rows x cols x channels` array of 8 bit samples.
///
/// Samples are stored row first with channels interleaved, so the sample of channel `c` at
/// `(row, col)` lives at `(row * cols + col) * channels + c`. Dimensions never change after
/// construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelGrid {
    rows: usize,
    cols: usize,
    channels: usize,
    data: Vec<u8>,
}

impl PixelGrid {
    /// Create a grid with every sample set to `value`.
    pub fn filled(rows: usize, cols: usize, channels: usize, value: u8) -> Self {
        assert!(
            (1..=4).contains(&channels),
            "a grid holds between 1 and 4 channels, got {channels}"
        );
        PixelGrid {
            rows,
            cols,
            channels,
            data: vec![value; rows * cols * channels],
        }
    }

    /// Create a grid from interleaved samples.
    pub fn from_raw(rows: usize, cols: usize, channels: usize, data: Vec<u8>) -> Result<Self> {
        if !(1..=4).contains(&channels) {
            return Err(Error::InvalidParameter {
                name: "channels".to_owned(),
                reason: format!("expected 1 to 4 channels, got {channels}"),
            });
        }
        if data.len() != rows * cols * channels {
            return Err(Error::DimensionMismatch {
                expected: format!("{} samples", rows * cols * channels),
                actual: format!("{} samples", data.len()),
            });
        }
        Ok(PixelGrid {
            rows,
            cols,
            channels,
            data,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// `(rows, cols)` of the grid.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Number of channels that carry intensity, alpha excluded.
    pub fn color_channels(&self) -> usize {
        match self.channels {
            1 | 2 => 1,
            _ => 3,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    fn offset(&self, row: usize, col: usize) -> usize {
        debug_assert!(row < self.rows && col < self.cols);
        (row * self.cols + col) * self.channels
    }

    pub fn get(&self, row: usize, col: usize, channel: usize) -> u8 {
        self.data[self.offset(row, col) + channel]
    }

    pub fn set(&mut self, row: usize, col: usize, channel: usize, value: u8) {
        let index = self.offset(row, col) + channel;
        self.data[index] = value;
    }

    /// All channels of the pixel at `(row, col)`.
    pub fn pixel(&self, row: usize, col: usize) -> &[u8] {
        let start = self.offset(row, col);
        &self.data[start..start + self.channels]
    }

    /// Exchange every channel of two pixels.
    pub fn swap_pixels(&mut self, a: (usize, usize), b: (usize, usize)) {
        let a = self.offset(a.0, a.1);
        let b = self.offset(b.0, b.1);
        for c in 0..self.channels {
            self.data.swap(a + c, b + c);
        }
    }

    /// Copy one channel out as `f32` samples, row first.
    pub fn plane(&self, channel: usize) -> Vec<f32> {
        self.data
            .iter()
            .skip(channel)
            .step_by(self.channels)
            .map(|v| *v as f32)
            .collect()
    }

    /// Write `f32` samples back into one channel, rounding and clamping to the 8 bit range.
    pub fn set_plane(&mut self, channel: usize, plane: &[f32]) {
        assert_eq!(plane.len(), self.rows * self.cols);
        for (sample, value) in self
            .data
            .iter_mut()
            .skip(channel)
            .step_by(self.channels)
            .zip(plane.iter())
        {
            *sample = value.round().clamp(0.0, 255.0) as u8;
        }
    }

    /// Split into one single channel grid per channel.
    pub fn split(&self) -> Vec<PixelGrid> {
        (0..self.channels)
            .map(|c| PixelGrid {
                rows: self.rows,
                cols: self.cols,
                channels: 1,
                data: self
                    .data
                    .iter()
                    .skip(c)
                    .step_by(self.channels)
                    .copied()
                    .collect(),
            })
            .collect()
    }

    /// Interleave single channel grids of identical size into one grid.
    pub fn merge(planes: &[PixelGrid]) -> Result<PixelGrid> {
        let first = planes.first().ok_or_else(|| Error::InvalidParameter {
            name: "planes".to_owned(),
            reason: "nothing to merge".to_owned(),
        })?;
        let channels = planes.len();
        let mut data = Vec::with_capacity(first.rows * first.cols * channels);
        for plane in planes {
            if plane.dimensions() != first.dimensions() {
                return Err(Error::dimensions(first.dimensions(), plane.dimensions()));
            }
            if plane.channels != 1 {
                return Err(Error::InvalidParameter {
                    name: "planes".to_owned(),
                    reason: format!("merge expects single channel grids, got {}", plane.channels),
                });
            }
        }
        for i in 0..first.rows * first.cols {
            data.extend(planes.iter().map(|p| p.data[i]));
        }
        PixelGrid::from_raw(first.rows, first.cols, channels, data)
    }

    /// Convert a decoded image into a grid with the requested channel layout.
    pub fn from_image(image: image::DynamicImage, depth: Depth) -> Self {
        let (cols, rows) = (image.width() as usize, image.height() as usize);
        let color = image.color();
        let (channels, data) = match depth {
            Depth::Gray => (1, image.into_luma8().into_raw()),
            Depth::Color => (3, image.into_rgb8().into_raw()),
            Depth::ColorAlpha => (4, image.into_rgba8().into_raw()),
            Depth::Native => match (color.has_color(), color.has_alpha()) {
                (false, false) => (1, image.into_luma8().into_raw()),
                (false, true) => (2, image.into_luma_alpha8().into_raw()),
                (true, false) => (3, image.into_rgb8().into_raw()),
                (true, true) => (4, image.into_rgba8().into_raw()),
            },
        };
        PixelGrid {
            rows,
            cols,
            channels,
            data,
        }
    }

    /// Convert into an image the `image` crate can encode.
    pub fn into_image(self) -> image::DynamicImage {
        let (width, height) = (self.cols as u32, self.rows as u32);
        match self.channels {
            1 => image::DynamicImage::ImageLuma8(
                image::GrayImage::from_raw(width, height, self.data)
                    .expect("Guaranteed dimensions"),
            ),
            2 => image::DynamicImage::ImageLumaA8(
                image::GrayAlphaImage::from_raw(width, height, self.data)
                    .expect("Guaranteed dimensions"),
            ),
            3 => image::DynamicImage::ImageRgb8(
                image::RgbImage::from_raw(width, height, self.data)
                    .expect("Guaranteed dimensions"),
            ),
            _ => image::DynamicImage::ImageRgba8(
                image::RgbaImage::from_raw(width, height, self.data)
                    .expect("Guaranteed dimensions"),
            ),
        }
    }
}
