//! Scalar grids.
//!
//! A [`Field`] is a row-major `width × height` grid of `f32`. It carries
//! every single-valued quantity the effects work with: luminance, noise,
//! reaction-diffusion concentrations, velocity components and individual
//! colour planes split out of a [`PixelBuffer`](crate::PixelBuffer).
//!
//! # Example
//!
//! ```rust
//! use afterglow_core::Field;
//!
//! let mut f = Field::new(4, 2);
//! f.set(3, 1, 2.0);
//! assert_eq!(f.get(3, 1), 2.0);
//! assert_eq!(f.min_max(), (0.0, 2.0));
//! ```

use crate::error::checked_len;
use crate::{Error, Result};

/// Range below which a min-max normalisation is considered degenerate.
pub const NORMALIZE_EPSILON: f32 = 1e-6;

/// Row-major scalar grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    width: usize,
    height: usize,
    data: Vec<f32>,
}

impl Field {
    /// Creates a zero-filled field.
    pub fn new(width: usize, height: usize) -> Self {
        Self::filled(width, height, 0.0)
    }

    /// Creates a field with every cell set to `value`.
    pub fn filled(width: usize, height: usize, value: f32) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    /// Wraps existing row-major data.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DataLength`] if `data.len() != width * height`, or
    /// [`Error::InvalidDimensions`] for an empty shape.
    pub fn from_vec(width: usize, height: usize, data: Vec<f32>) -> Result<Self> {
        let expected = checked_len(width, height, 1)?;
        if data.len() != expected {
            return Err(Error::data_length(expected, data.len()));
        }
        Ok(Self { width, height, data })
    }

    /// Builds a field by evaluating `f(x, y)` for every cell.
    pub fn from_fn<F>(width: usize, height: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> f32,
    {
        let mut data = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self { width, height, data }
    }

    /// Grid width.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Grid height.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns `(width, height)`.
    #[inline]
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Number of cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the field has no cells.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Raw row-major data.
    #[inline]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Mutable row-major data.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Consumes the field and returns its data.
    #[inline]
    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }

    /// Linear index of `(x, y)`.
    #[inline]
    pub fn index(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.width && y < self.height, "field index out of bounds");
        y * self.width + x
    }

    /// Value at `(x, y)`.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.data[self.index(x, y)]
    }

    /// Sets the value at `(x, y)`.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: f32) {
        let idx = self.index(x, y);
        self.data[idx] = value;
    }

    /// One row as a slice.
    #[inline]
    pub fn row(&self, y: usize) -> &[f32] {
        let start = y * self.width;
        &self.data[start..start + self.width]
    }

    /// Smallest and largest value. An empty field reports `(0.0, 0.0)`.
    pub fn min_max(&self) -> (f32, f32) {
        if self.data.is_empty() {
            return (0.0, 0.0);
        }
        self.data
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)))
    }

    /// Arithmetic mean of all cells.
    pub fn mean(&self) -> f32 {
        if self.data.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.data.iter().map(|&v| v as f64).sum();
        (sum / self.data.len() as f64) as f32
    }

    /// Applies `f` to every cell, returning a new field.
    pub fn map<F>(&self, f: F) -> Self
    where
        F: Fn(f32) -> f32,
    {
        Self {
            width: self.width,
            height: self.height,
            data: self.data.iter().map(|&v| f(v)).collect(),
        }
    }

    /// Combines two same-shaped fields cell by cell.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`] if the shapes differ.
    pub fn zip_map<F>(&self, other: &Field, f: F) -> Result<Self>
    where
        F: Fn(f32, f32) -> f32,
    {
        if self.dimensions() != other.dimensions() {
            return Err(Error::dimension_mismatch(self.dimensions(), other.dimensions()));
        }
        Ok(Self {
            width: self.width,
            height: self.height,
            data: self.data.iter().zip(&other.data).map(|(&a, &b)| f(a, b)).collect(),
        })
    }

    /// Min-max normalises to [0, 1].
    ///
    /// A field whose range is below [`NORMALIZE_EPSILON`] has no contrast to
    /// stretch and becomes a constant 0.5.
    pub fn normalized(&self) -> Self {
        let (lo, hi) = self.min_max();
        let range = hi - lo;
        if !(range >= NORMALIZE_EPSILON) {
            return Self::filled(self.width, self.height, 0.5);
        }
        self.map(|v| (v - lo) / range)
    }

    /// Min-max normalises as `(v - min) / (range + eps)`.
    ///
    /// Unlike [`normalized`](Self::normalized) a flat field maps to 0, which
    /// is what edge magnitudes need: no edges means no glow.
    pub fn normalized_with_epsilon(&self, eps: f32) -> Self {
        let (lo, hi) = self.min_max();
        let denom = hi - lo + eps;
        self.map(|v| (v - lo) / denom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_from_vec_checks_length() {
        assert!(Field::from_vec(3, 3, vec![0.0; 9]).is_ok());
        assert!(matches!(
            Field::from_vec(3, 3, vec![0.0; 8]),
            Err(Error::DataLength { expected: 9, got: 8 })
        ));
    }

    #[test]
    fn test_from_fn_row_major() {
        let f = Field::from_fn(3, 2, |x, y| (y * 10 + x) as f32);
        assert_eq!(f.data(), &[0.0, 1.0, 2.0, 10.0, 11.0, 12.0]);
        assert_eq!(f.row(1), &[10.0, 11.0, 12.0]);
    }

    #[test]
    fn test_normalized_stretches() {
        let f = Field::from_vec(2, 2, vec![1.0, 2.0, 3.0, 5.0]).unwrap();
        let n = f.normalized();
        assert_relative_eq!(n.get(0, 0), 0.0);
        assert_relative_eq!(n.get(1, 1), 1.0);
        assert_relative_eq!(n.get(1, 0), 0.25);
    }

    #[test]
    fn test_normalized_flat_is_mid_gray() {
        let f = Field::filled(4, 4, 0.3);
        assert!(f.normalized().data().iter().all(|&v| v == 0.5));
    }

    #[test]
    fn test_normalized_with_epsilon_flat_is_zero() {
        let f = Field::filled(4, 4, 0.3);
        assert!(f.normalized_with_epsilon(1e-6).data().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_zip_map_shape_mismatch() {
        let a = Field::new(2, 2);
        let b = Field::new(3, 2);
        assert!(a.zip_map(&b, |x, y| x + y).is_err());
    }

    #[test]
    fn test_mean() {
        let f = Field::from_vec(2, 1, vec![0.25, 0.75]).unwrap();
        assert_relative_eq!(f.mean(), 0.5);
    }
}
