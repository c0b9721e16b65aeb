//! Convolution, blur and derivative kernels on scalar fields.
//!
//! Every kernel here treats the border the same way: taps that fall outside
//! the field are mirrored back in with the edge sample repeated
//! (`[c b a | a b c d | d c b]`), via [`reflect_index`].
//!
//! # Kernels
//!
//! - [`Kernel::gray_scott_laplacian`] - 3×3 diffusion stencil
//! - [`Kernel::sobel_x`] / [`Kernel::sobel_y`] - edge derivatives
//! - [`gaussian_blur`] - separable Gaussian, truncated at 4σ
//! - [`gradient`] - central differences, one-sided at the borders
//!
//! # Example
//!
//! ```rust
//! use afterglow_core::Field;
//! use afterglow_ops::filter::{convolve, gaussian_blur, Kernel};
//!
//! let f = Field::filled(16, 16, 0.5);
//! let blurred = gaussian_blur(&f, 2.0);
//! assert!((blurred.get(8, 8) - 0.5).abs() < 1e-5);
//! let lap = convolve(&f, &Kernel::gray_scott_laplacian());
//! assert!(lap.get(0, 0).abs() < 1e-6);
//! ```

use afterglow_core::{Field, PixelBuffer, CHANNELS};
use afterglow_math::reflect_index;
#[allow(unused_imports)]
use tracing::{debug, trace};

use crate::parallel::for_each_row;
use crate::{OpsError, OpsResult};

/// Gaussian kernels are truncated at this many standard deviations.
const GAUSSIAN_TRUNCATE: f32 = 4.0;

/// Small 2D kernel applied by correlation.
#[derive(Debug, Clone)]
pub struct Kernel {
    /// Kernel weights, row-major.
    pub data: Vec<f32>,
    /// Kernel width (odd).
    pub width: usize,
    /// Kernel height (odd).
    pub height: usize,
}

impl Kernel {
    /// Creates a kernel from row-major weights.
    ///
    /// Width and height must be odd numbers.
    pub fn new(data: Vec<f32>, width: usize, height: usize) -> OpsResult<Self> {
        if width % 2 == 0 || height % 2 == 0 {
            return Err(OpsError::invalid_param("kernel", "dimensions must be odd"));
        }
        if data.len() != width * height {
            return Err(OpsError::invalid_param(
                "kernel",
                format!("data size {} doesn't match {}x{}", data.len(), width, height),
            ));
        }
        Ok(Self { data, width, height })
    }

    /// The 3×3 Gray-Scott diffusion stencil. Weights sum to zero.
    pub fn gray_scott_laplacian() -> Self {
        Self {
            data: vec![
                0.05, 0.2, 0.05,
                0.2, -1.0, 0.2,
                0.05, 0.2, 0.05,
            ],
            width: 3,
            height: 3,
        }
    }

    /// Horizontal Sobel derivative.
    pub fn sobel_x() -> Self {
        Self {
            data: vec![
                -1.0, 0.0, 1.0,
                -2.0, 0.0, 2.0,
                -1.0, 0.0, 1.0,
            ],
            width: 3,
            height: 3,
        }
    }

    /// Vertical Sobel derivative.
    pub fn sobel_y() -> Self {
        Self {
            data: vec![
                -1.0, -2.0, -1.0,
                0.0, 0.0, 0.0,
                1.0, 2.0, 1.0,
            ],
            width: 3,
            height: 3,
        }
    }

    /// Returns the kernel radius (half-size).
    #[inline]
    pub fn radius(&self) -> (usize, usize) {
        (self.width / 2, self.height / 2)
    }
}

/// Applies `kernel` to `field` with a mirrored border.
///
/// The kernel is not flipped; every kernel used by the effects is symmetric
/// or only used through its magnitude.
pub fn convolve(field: &Field, kernel: &Kernel) -> Field {
    let (w, h) = field.dimensions();
    trace!(w, h, kernel_w = kernel.width, kernel_h = kernel.height, "convolve");
    let (rx, ry) = kernel.radius();
    let src = field.data();
    let mut out = vec![0.0f32; w * h];

    for_each_row(&mut out, w, |y, row| {
        for (x, dst) in row.iter_mut().enumerate() {
            let mut sum = 0.0f32;
            for ky in 0..kernel.height {
                let sy = reflect_index(y as isize + ky as isize - ry as isize, h);
                for kx in 0..kernel.width {
                    let sx = reflect_index(x as isize + kx as isize - rx as isize, w);
                    sum += src[sy * w + sx] * kernel.data[ky * kernel.width + kx];
                }
            }
            *dst = sum;
        }
    });

    rebuild(w, h, out)
}

/// Normalised 1D Gaussian weights for `sigma`, radius `⌊4σ + 0.5⌋`.
pub fn gaussian_weights(sigma: f32) -> Vec<f32> {
    let radius = (GAUSSIAN_TRUNCATE * sigma + 0.5) as usize;
    let denom = 2.0 * sigma * sigma;
    let mut weights: Vec<f32> = (0..=2 * radius)
        .map(|i| {
            let d = i as f32 - radius as f32;
            (-d * d / denom).exp()
        })
        .collect();
    let sum: f32 = weights.iter().sum();
    for w in &mut weights {
        *w /= sum;
    }
    weights
}

/// Separable Gaussian blur with standard deviation `sigma`.
///
/// A non-positive or non-finite `sigma` returns the field unchanged.
pub fn gaussian_blur(field: &Field, sigma: f32) -> Field {
    if !(sigma > 0.0) || !sigma.is_finite() {
        return field.clone();
    }
    let (w, h) = field.dimensions();
    trace!(w, h, sigma, "gaussian_blur");
    let weights = gaussian_weights(sigma);
    let radius = (weights.len() / 2) as isize;
    let src = field.data();

    let mut tmp = vec![0.0f32; w * h];
    for_each_row(&mut tmp, w, |y, row| {
        let line = &src[y * w..(y + 1) * w];
        for (x, dst) in row.iter_mut().enumerate() {
            let mut sum = 0.0f32;
            for (k, &wt) in weights.iter().enumerate() {
                sum += line[reflect_index(x as isize + k as isize - radius, w)] * wt;
            }
            *dst = sum;
        }
    });

    let mut out = vec![0.0f32; w * h];
    for_each_row(&mut out, w, |y, row| {
        for (k, &wt) in weights.iter().enumerate() {
            let sy = reflect_index(y as isize + k as isize - radius, h);
            let line = &tmp[sy * w..(sy + 1) * w];
            for (dst, &v) in row.iter_mut().zip(line) {
                *dst += v * wt;
            }
        }
    });

    rebuild(w, h, out)
}

/// [`gaussian_blur`] applied to each colour plane.
pub fn gaussian_blur_buffer(src: &PixelBuffer, sigma: f32) -> OpsResult<PixelBuffer> {
    let [r, g, b] = src.planes();
    let planes: [Field; CHANNELS] = [
        gaussian_blur(&r, sigma),
        gaussian_blur(&g, sigma),
        gaussian_blur(&b, sigma),
    ];
    Ok(PixelBuffer::from_planes(&planes)?)
}

/// Spatial derivatives `(d/dy, d/dx)`.
///
/// Central differences inside, one-sided differences on the first and last
/// sample of each axis. A single-sample axis has zero derivative.
pub fn gradient(field: &Field) -> (Field, Field) {
    let (w, h) = field.dimensions();
    let gx = Field::from_fn(w, h, |x, y| axis_diff(w, x, |i| field.get(i, y)));
    let gy = Field::from_fn(w, h, |x, y| axis_diff(h, y, |i| field.get(x, i)));
    (gy, gx)
}

#[inline]
fn axis_diff<F: Fn(usize) -> f32>(n: usize, i: usize, at: F) -> f32 {
    if n < 2 {
        0.0
    } else if i == 0 {
        at(1) - at(0)
    } else if i == n - 1 {
        at(n - 1) - at(n - 2)
    } else {
        (at(i + 1) - at(i - 1)) * 0.5
    }
}

/// Sobel gradient magnitude `sqrt(sx² + sy²)`.
pub fn sobel_magnitude(field: &Field) -> Field {
    let sx = convolve(field, &Kernel::sobel_x());
    let sy = convolve(field, &Kernel::sobel_y());
    let (w, h) = field.dimensions();
    let data = sx.data().iter().zip(sy.data()).map(|(a, b)| (a * a + b * b).sqrt()).collect();
    rebuild(w, h, data)
}

/// Wraps kernel output; shapes always match the input here.
pub(crate) fn rebuild(w: usize, h: usize, data: Vec<f32>) -> Field {
    Field::from_vec(w, h, data).unwrap_or_else(|_| Field::new(w, h))
}
