//! Glow effects: bloom and neon edges.

use afterglow_core::{Field, PixelBuffer, CHANNELS};
#[allow(unused_imports)]
use tracing::{debug, trace};

use crate::filter::{gaussian_blur, sobel_magnitude};
use crate::{params, OpsResult};

const PEAK_EPSILON: f32 = 1e-6;
const EDGE_EPSILON: f32 = 1e-6;
/// Hue cycles per unit of edge magnitude.
const NEON_FREQUENCY: f32 = 6.283;

/// Parameters for [`bloom`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BloomParams {
    /// Luminance a pixel must exceed to glow.
    pub threshold: f32,
    /// Glow gain.
    pub strength: f32,
    /// Blur sigma in pixels.
    pub radius: usize,
}

impl Default for BloomParams {
    fn default() -> Self {
        Self {
            threshold: 0.85,
            strength: 0.8,
            radius: 12,
        }
    }
}

impl BloomParams {
    /// Threshold and strength must be finite.
    pub fn validate(&self) -> OpsResult<()> {
        params::finite("threshold", self.threshold)?;
        params::finite("strength", self.strength)?;
        Ok(())
    }
}

/// Adds a soft glow around pixels brighter than the threshold.
///
/// The bright pixels are blurred per channel, scaled so the brightest
/// blurred sample is 1, then added to the source. An image with nothing
/// above the threshold comes back unchanged.
///
/// # Example
///
/// ```rust
/// use afterglow_core::PixelBuffer;
/// use afterglow_ops::glow::{bloom, BloomParams};
///
/// let img = PixelBuffer::filled(8, 8, [0.5, 0.5, 0.5]);
/// let out = bloom(&img, &BloomParams { threshold: 0.9, ..Default::default() }).unwrap();
/// assert_eq!(out, img);
/// ```
pub fn bloom(src: &PixelBuffer, p: &BloomParams) -> OpsResult<PixelBuffer> {
    p.validate()?;
    let (w, h) = src.dimensions();
    debug!(w, h, threshold = p.threshold, strength = p.strength, radius = p.radius, "bloom");

    let lum = src.luminance();
    let sigma = p.radius as f32;
    let planes = src.planes();
    let blurred: Vec<Field> = planes
        .iter()
        .map(|plane| {
            let masked = plane
                .zip_map(&lum, |v, l| if l > p.threshold { v } else { 0.0 })
                .unwrap_or_else(|_| Field::new(w, h));
            gaussian_blur(&masked, sigma)
        })
        .collect();

    let peak = blurred
        .iter()
        .flat_map(|f| f.data().iter().copied())
        .fold(0.0f32, f32::max)
        .max(PEAK_EPSILON);
    trace!(peak, "bloom peak");

    let gain = p.strength / peak;
    let mut out = src.clone();
    for (i, px) in out.data_mut().chunks_exact_mut(CHANNELS).enumerate() {
        for (c, v) in px.iter_mut().enumerate() {
            *v = (*v + blurred[c].data()[i] * gain).clamp(0.0, 1.0);
        }
    }
    Ok(out)
}

/// Parameters for [`neon`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NeonParams {
    /// How strongly edges replace the source.
    pub strength: f32,
    /// Blur sigma of the glow.
    pub glow_radius: f32,
    /// Phase offset of the edge colouring.
    pub hue_shift: f32,
}

impl Default for NeonParams {
    fn default() -> Self {
        Self {
            strength: 1.4,
            glow_radius: 1.8,
            hue_shift: 0.1,
        }
    }
}

impl NeonParams {
    /// All values must be finite; the glow radius non-negative.
    pub fn validate(&self) -> OpsResult<()> {
        params::finite("strength", self.strength)?;
        params::non_negative("glow_radius", self.glow_radius)?;
        params::finite("hue_shift", self.hue_shift)?;
        Ok(())
    }
}

/// Glowing, hue-cycled edges.
///
/// Edges come from the normalised Sobel magnitude of luminance. Each channel
/// is tinted by a sine of the magnitude phase-shifted by a third of a cycle,
/// blurred, and composited over the source darkened along the same edges.
pub fn neon(src: &PixelBuffer, p: &NeonParams) -> OpsResult<PixelBuffer> {
    p.validate()?;
    let (w, h) = src.dimensions();
    debug!(w, h, strength = p.strength, glow_radius = p.glow_radius, hue_shift = p.hue_shift, "neon");

    let mag = sobel_magnitude(&src.luminance()).normalized_with_epsilon(EDGE_EPSILON);
    let glow: Vec<Field> = (0..CHANNELS)
        .map(|c| {
            let phase = p.hue_shift + c as f32 / 3.0;
            let tinted = mag.map(|m| {
                let neon_c = (0.5 + 0.5 * (NEON_FREQUENCY * (m + phase)).sin()).clamp(0.0, 1.0);
                neon_c * m
            });
            gaussian_blur(&tinted, p.glow_radius)
        })
        .collect();

    let mut out = src.clone();
    let m = mag.data();
    for (i, px) in out.data_mut().chunks_exact_mut(CHANNELS).enumerate() {
        let keep = 1.0 - p.strength * m[i];
        for (c, v) in px.iter_mut().enumerate() {
            *v = (*v * keep + glow[c].data()[i] * p.strength).clamp(0.0, 1.0);
        }
    }
    Ok(out)
}
