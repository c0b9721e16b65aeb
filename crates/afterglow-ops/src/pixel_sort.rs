//! Threshold pixel sorting.
//!
//! Along each row (or column), maximal runs of pixels brighter than the
//! threshold are sorted by luminance. Pixels at or below the threshold stay
//! where they are, and runs never continue onto the next line.

use std::fmt;
use std::str::FromStr;

use afterglow_core::{PixelBuffer, CHANNELS};
#[allow(unused_imports)]
use tracing::{debug, trace};

use crate::parallel::for_each_row;
use crate::{params, OpsError, OpsResult};

/// Line direction for [`pixel_sort`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum SortDirection {
    /// Sort along rows.
    #[default]
    Row,
    /// Sort along columns.
    Col,
}

impl SortDirection {
    /// Accepted spellings.
    pub const NAMES: &'static [&'static str] = &["row", "col"];
}

impl FromStr for SortDirection {
    type Err = OpsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "row" => Ok(Self::Row),
            "col" => Ok(Self::Col),
            other => Err(OpsError::invalid_param(
                "direction",
                format!("expected row or col, got `{other}`"),
            )),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Row => "row",
            Self::Col => "col",
        })
    }
}

/// Parameters for [`pixel_sort`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PixelSortParams {
    /// Luminance a pixel must exceed to join a run.
    pub threshold: f32,
    /// Rows or columns.
    pub direction: SortDirection,
    /// Brightest first instead of darkest first.
    pub reverse: bool,
}

impl Default for PixelSortParams {
    fn default() -> Self {
        Self {
            threshold: 0.7,
            direction: SortDirection::Row,
            reverse: false,
        }
    }
}

impl PixelSortParams {
    /// The threshold must be finite.
    pub fn validate(&self) -> OpsResult<()> {
        params::finite("threshold", self.threshold)
    }
}

/// Sorts every above-threshold run of one line in place.
///
/// `pixels` holds `lum.len()` interleaved RGB triples.
fn sort_line(pixels: &mut [f32], lum: &[f32], threshold: f32, reverse: bool) {
    let n = lum.len();
    let mut x = 0;
    while x < n {
        if lum[x] <= threshold {
            x += 1;
            continue;
        }
        let start = x;
        while x < n && lum[x] > threshold {
            x += 1;
        }
        sort_run(&mut pixels[start * CHANNELS..x * CHANNELS], &lum[start..x], reverse);
    }
}

fn sort_run(pixels: &mut [f32], lum: &[f32], reverse: bool) {
    let mut order: Vec<usize> = (0..lum.len()).collect();
    order.sort_by(|&a, &b| lum[a].total_cmp(&lum[b]));
    if reverse {
        order.reverse();
    }
    let original = pixels.to_vec();
    for (dst, &src) in order.iter().enumerate() {
        pixels[dst * CHANNELS..(dst + 1) * CHANNELS]
            .copy_from_slice(&original[src * CHANNELS..(src + 1) * CHANNELS]);
    }
}

/// Sorts bright runs of pixels by luminance.
///
/// The sort is stable, so equal-luminance pixels keep their order;
/// `reverse` flips the finished ascending order.
///
/// # Example
///
/// ```rust
/// use afterglow_core::PixelBuffer;
/// use afterglow_ops::pixel_sort::{pixel_sort, PixelSortParams};
///
/// let img = PixelBuffer::from_data(3, 1, vec![0.9, 0.9, 0.9, 0.2, 0.2, 0.2, 0.5, 0.5, 0.5]).unwrap();
/// let p = PixelSortParams { threshold: 0.0, ..Default::default() };
/// let out = pixel_sort(&img, &p).unwrap();
/// assert_eq!(out.row(0), &[0.2, 0.2, 0.2, 0.5, 0.5, 0.5, 0.9, 0.9, 0.9]);
/// ```
pub fn pixel_sort(src: &PixelBuffer, p: &PixelSortParams) -> OpsResult<PixelBuffer> {
    p.validate()?;
    let (w, h) = src.dimensions();
    debug!(w, h, threshold = p.threshold, direction = %p.direction, reverse = p.reverse, "pixel_sort");
    let lum = src.luminance();
    let mut out = src.clone();

    match p.direction {
        SortDirection::Row => {
            for_each_row(out.data_mut(), w * CHANNELS, |y, row| {
                sort_line(row, lum.row(y), p.threshold, p.reverse);
            });
        }
        SortDirection::Col => {
            let mut column = vec![0.0f32; h * CHANNELS];
            let mut column_lum = vec![0.0f32; h];
            for x in 0..w {
                for y in 0..h {
                    column[y * CHANNELS..(y + 1) * CHANNELS].copy_from_slice(&src.pixel(x, y));
                    column_lum[y] = lum.get(x, y);
                }
                sort_line(&mut column, &column_lum, p.threshold, p.reverse);
                for y in 0..h {
                    let o = y * CHANNELS;
                    out.set_pixel(x, y, [column[o], column[o + 1], column[o + 2]]);
                }
            }
        }
    }
    Ok(out.clamped())
}
