//! Luminance weights and 8-bit sample conversion.
//!
//! Every effect that reads brightness goes through [`luminance`], so the
//! BT.709 weights below are the only luminance definition in the workspace.

/// Rec.709 luminance coefficient for the red channel.
pub const REC709_LUMA_R: f32 = 0.2126;

/// Rec.709 luminance coefficient for the green channel.
pub const REC709_LUMA_G: f32 = 0.7152;

/// Rec.709 luminance coefficient for the blue channel.
pub const REC709_LUMA_B: f32 = 0.0722;

/// Rec.709 luminance coefficients as an array [R, G, B].
pub const REC709_LUMA: [f32; 3] = [REC709_LUMA_R, REC709_LUMA_G, REC709_LUMA_B];

/// Calculate Rec.709 luminance from RGB values.
///
/// `Y = 0.2126*R + 0.7152*G + 0.0722*B`
///
/// # Example
///
/// ```
/// use afterglow_core::luminance;
///
/// assert!((luminance([1.0, 1.0, 1.0]) - 1.0).abs() < 1e-6);
/// assert!((luminance([0.0, 1.0, 0.0]) - 0.7152).abs() < 1e-6);
/// ```
#[inline]
pub fn luminance(rgb: [f32; 3]) -> f32 {
    rgb[0] * REC709_LUMA_R + rgb[1] * REC709_LUMA_G + rgb[2] * REC709_LUMA_B
}

/// Converts an 8-bit sample to the [0, 1] working range.
#[inline]
pub fn from_u8(v: u8) -> f32 {
    v as f32 / 255.0
}

/// Re-quantizes a working sample to 8 bits.
///
/// Values are clamped to [0, 1] and rounded to the nearest level, which
/// makes `to_u8(from_u8(v)) == v` for every byte. NaN maps to 0.
#[inline]
pub fn to_u8(v: f32) -> u8 {
    if v.is_nan() {
        return 0;
    }
    (v.clamp(0.0, 1.0) * 255.0 + 0.5) as u8
}
