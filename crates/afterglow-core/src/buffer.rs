//! RGB working buffer.
//!
//! [`PixelBuffer`] is the single image type every effect consumes and
//! produces: `width × height × 3` interleaved `f32` samples, nominally in
//! [0, 1].
//!
//! # Memory Layout
//!
//! Row-major, top-to-bottom, channels interleaved:
//!
//! ```text
//! Memory: [R G B R G B R G B ...]  ← Row 0
//!         [R G B R G B R G B ...]  ← Row 1
//! ```
//!
//! # Ownership
//!
//! Samples live in an [`Arc<Vec<f32>>`]: cloning a buffer shares the data
//! and the first mutation through [`data_mut`](PixelBuffer::data_mut) or
//! [`set_pixel`](PixelBuffer::set_pixel) copies it. Effects take
//! `&PixelBuffer` and return a fresh buffer, so an input is never observed
//! changing.
//!
//! # Example
//!
//! ```rust
//! use afterglow_core::PixelBuffer;
//!
//! let mut img = PixelBuffer::filled(8, 8, [0.5, 0.25, 1.0]);
//! let copy = img.clone();
//! img.set_pixel(0, 0, [0.0, 0.0, 0.0]);
//! assert_eq!(copy.pixel(0, 0), [0.5, 0.25, 1.0]);
//! ```

use std::sync::Arc;

use crate::error::checked_len;
use crate::pixel::{from_u8, luminance, to_u8};
use crate::{Error, Field, Result};

/// Number of interleaved channels in a [`PixelBuffer`].
pub const CHANNELS: usize = 3;

/// Owned RGB float image with copy-on-write storage.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    data: Arc<Vec<f32>>,
    width: usize,
    height: usize,
}

impl PixelBuffer {
    /// Creates a black buffer.
    pub fn new(width: usize, height: usize) -> Self {
        Self::filled(width, height, [0.0; CHANNELS])
    }

    /// Creates a buffer with every pixel set to `rgb`.
    pub fn filled(width: usize, height: usize, rgb: [f32; CHANNELS]) -> Self {
        let pixel_count = width * height;
        let mut data = Vec::with_capacity(pixel_count * CHANNELS);
        for _ in 0..pixel_count {
            data.extend_from_slice(&rgb);
        }
        Self {
            data: Arc::new(data),
            width,
            height,
        }
    }

    /// Wraps interleaved float samples.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DataLength`] if the data does not hold exactly
    /// `width * height * 3` samples.
    pub fn from_data(width: usize, height: usize, data: Vec<f32>) -> Result<Self> {
        let expected = checked_len(width, height, CHANNELS)?;
        if data.len() != expected {
            return Err(Error::data_length(expected, data.len()));
        }
        Ok(Self {
            data: Arc::new(data),
            width,
            height,
        })
    }

    /// Converts interleaved 8-bit RGB into the working range.
    ///
    /// # Example
    ///
    /// ```rust
    /// use afterglow_core::PixelBuffer;
    ///
    /// let img = PixelBuffer::from_rgb8(1, 1, &[255, 0, 51]).unwrap();
    /// assert_eq!(img.pixel(0, 0), [1.0, 0.0, 0.2]);
    /// ```
    pub fn from_rgb8(width: usize, height: usize, bytes: &[u8]) -> Result<Self> {
        let expected = checked_len(width, height, CHANNELS)?;
        if bytes.len() != expected {
            return Err(Error::data_length(expected, bytes.len()));
        }
        Ok(Self {
            data: Arc::new(bytes.iter().map(|&b| from_u8(b)).collect()),
            width,
            height,
        })
    }

    /// Re-quantizes to interleaved 8-bit RGB, clamping to [0, 1] first.
    pub fn to_rgb8(&self) -> Vec<u8> {
        self.data.iter().map(|&v| to_u8(v)).collect()
    }

    /// Stacks three same-shaped planes back into an interleaved buffer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`] if the planes differ in shape.
    pub fn from_planes(planes: &[Field; CHANNELS]) -> Result<Self> {
        let dims = planes[0].dimensions();
        for plane in &planes[1..] {
            if plane.dimensions() != dims {
                return Err(Error::dimension_mismatch(dims, plane.dimensions()));
            }
        }
        let (width, height) = dims;
        let mut data = Vec::with_capacity(width * height * CHANNELS);
        for i in 0..width * height {
            for plane in planes {
                data.push(plane.data()[i]);
            }
        }
        Ok(Self {
            data: Arc::new(data),
            width,
            height,
        })
    }

    /// Image width in pixels.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Image height in pixels.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns `(width, height)`.
    #[inline]
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Number of pixels.
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    /// Returns `true` if the image has zero area.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Interleaved samples.
    #[inline]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Mutable interleaved samples (copy-on-write if shared).
    #[inline]
    pub fn data_mut(&mut self) -> &mut [f32] {
        Arc::make_mut(&mut self.data).as_mut_slice()
    }

    /// Consumes the buffer, returning its samples (copying only if shared).
    pub fn into_data(self) -> Vec<f32> {
        Arc::try_unwrap(self.data).unwrap_or_else(|shared| (*shared).clone())
    }

    #[inline]
    fn pixel_offset(&self, x: usize, y: usize) -> usize {
        (y * self.width + x) * CHANNELS
    }

    /// Pixel at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is out of bounds.
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> [f32; CHANNELS] {
        debug_assert!(x < self.width && y < self.height, "pixel out of bounds");
        let o = self.pixel_offset(x, y);
        [self.data[o], self.data[o + 1], self.data[o + 2]]
    }

    /// Sets the pixel at `(x, y)`.
    #[inline]
    pub fn set_pixel(&mut self, x: usize, y: usize, rgb: [f32; CHANNELS]) {
        debug_assert!(x < self.width && y < self.height, "pixel out of bounds");
        let o = self.pixel_offset(x, y);
        Arc::make_mut(&mut self.data)[o..o + CHANNELS].copy_from_slice(&rgb);
    }

    /// One row of interleaved samples.
    #[inline]
    pub fn row(&self, y: usize) -> &[f32] {
        let start = y * self.width * CHANNELS;
        &self.data[start..start + self.width * CHANNELS]
    }

    /// One mutable row of interleaved samples.
    #[inline]
    pub fn row_mut(&mut self, y: usize) -> &mut [f32] {
        let start = y * self.width * CHANNELS;
        let end = start + self.width * CHANNELS;
        &mut self.data_mut()[start..end]
    }

    /// Copies one channel out as a [`Field`].
    pub fn plane(&self, channel: usize) -> Field {
        debug_assert!(channel < CHANNELS, "channel out of range");
        let data = self.data.iter().skip(channel).step_by(CHANNELS).copied().collect();
        Field::from_vec(self.width, self.height, data)
            .unwrap_or_else(|_| Field::new(self.width, self.height))
    }

    /// Splits into `[R, G, B]` planes.
    pub fn planes(&self) -> [Field; CHANNELS] {
        [self.plane(0), self.plane(1), self.plane(2)]
    }

    /// Rec.709 luminance of every pixel.
    pub fn luminance(&self) -> Field {
        let data = self
            .data
            .chunks_exact(CHANNELS)
            .map(|px| luminance([px[0], px[1], px[2]]))
            .collect();
        Field::from_vec(self.width, self.height, data)
            .unwrap_or_else(|_| Field::new(self.width, self.height))
    }

    /// Applies `f` to each pixel in place.
    pub fn map_pixels<F>(&mut self, f: F)
    where
        F: Fn([f32; CHANNELS]) -> [f32; CHANNELS],
    {
        let data = Arc::make_mut(&mut self.data);
        for chunk in data.chunks_exact_mut(CHANNELS) {
            let out = f([chunk[0], chunk[1], chunk[2]]);
            chunk.copy_from_slice(&out);
        }
    }

    /// Clamps every sample to [0, 1]; NaN becomes 0.
    pub fn clamp_unit(&mut self) {
        for v in self.data_mut() {
            *v = if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) };
        }
    }

    /// Consuming form of [`clamp_unit`](Self::clamp_unit).
    pub fn clamped(mut self) -> Self {
        self.clamp_unit();
        self
    }

    /// Largest absolute per-sample difference to `other`, or `None` if the
    /// shapes differ.
    pub fn max_abs_diff(&self, other: &PixelBuffer) -> Option<f32> {
        if self.dimensions() != other.dimensions() {
            return None;
        }
        Some(
            self.data
                .iter()
                .zip(other.data.iter())
                .map(|(a, b)| (a - b).abs())
                .fold(0.0, f32::max),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_from_data_checks_length() {
        assert!(PixelBuffer::from_data(2, 2, vec![0.0; 12]).is_ok());
        assert!(PixelBuffer::from_data(2, 2, vec![0.0; 11]).is_err());
        assert!(PixelBuffer::from_data(0, 2, vec![]).is_err());
    }

    #[test]
    fn test_copy_on_write() {
        let a = PixelBuffer::filled(2, 2, [0.1, 0.2, 0.3]);
        let mut b = a.clone();
        b.data_mut()[0] = 0.9;
        assert_relative_eq!(a.data()[0], 0.1);
        assert_relative_eq!(b.data()[0], 0.9);
    }

    #[test]
    fn test_planes_roundtrip() {
        let data: Vec<f32> = (0..4 * 3 * 3).map(|i| i as f32 / 36.0).collect();
        let img = PixelBuffer::from_data(4, 3, data).unwrap();
        let planes = img.planes();
        assert_relative_eq!(planes[1].get(2, 1), img.pixel(2, 1)[1]);
        let back = PixelBuffer::from_planes(&planes).unwrap();
        assert_eq!(back, img);
    }

    #[test]
    fn test_from_planes_mismatch() {
        let planes = [Field::new(2, 2), Field::new(2, 2), Field::new(3, 2)];
        assert!(PixelBuffer::from_planes(&planes).is_err());
    }

    #[test]
    fn test_luminance_white_is_one() {
        let img = PixelBuffer::filled(3, 3, [1.0, 1.0, 1.0]);
        for &v in img.luminance().data() {
            assert_relative_eq!(v, 1.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_rgb8_roundtrip() {
        let bytes: Vec<u8> = (0..=255u8).cycle().take(5 * 4 * 3).collect();
        let img = PixelBuffer::from_rgb8(5, 4, &bytes).unwrap();
        assert_eq!(img.to_rgb8(), bytes);
    }

    #[test]
    fn test_clamped() {
        let img = PixelBuffer::from_data(1, 1, vec![-1.0, 0.5, f32::NAN]).unwrap().clamped();
        assert_eq!(img.pixel(0, 0), [0.0, 0.5, 0.0]);
    }

    #[test]
    fn test_row_access() {
        let mut img = PixelBuffer::new(3, 2);
        img.row_mut(1)[0] = 1.0;
        assert_eq!(img.pixel(0, 1)[0], 1.0);
        assert_eq!(img.row(1).len(), 9);
    }
}
