//! JPEG format support.
//!
//! Grayscale, CMYK and 16-bit luma inputs are converted to 8-bit RGB on
//! read. Writes are baseline RGB at [`DEFAULT_QUALITY`] unless a quality is
//! given.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use afterglow_core::PixelBuffer;
#[allow(unused_imports)]
use tracing::{debug, trace};

use crate::{IoError, IoResult};

/// Encoder quality used by [`write`].
pub const DEFAULT_QUALITY: u8 = 90;

/// Reads a JPEG file.
pub fn read<P: AsRef<Path>>(path: P) -> IoResult<PixelBuffer> {
    let file = File::open(path.as_ref())?;
    let mut decoder = jpeg_decoder::Decoder::new(BufReader::new(file));
    let pixels = decoder
        .decode()
        .map_err(|e| IoError::DecodeError(e.to_string()))?;
    let info = decoder
        .info()
        .ok_or_else(|| IoError::DecodeError("missing JPEG info".into()))?;

    let rgb: Vec<u8> = match info.pixel_format {
        jpeg_decoder::PixelFormat::RGB24 => pixels,
        jpeg_decoder::PixelFormat::L8 => pixels.iter().flat_map(|&g| [g, g, g]).collect(),
        jpeg_decoder::PixelFormat::L16 => pixels
            .chunks_exact(2)
            .flat_map(|l16| [l16[0], l16[0], l16[0]])
            .collect(),
        jpeg_decoder::PixelFormat::CMYK32 => pixels
            .chunks_exact(4)
            .flat_map(|cmyk| {
                let k = 1.0 - cmyk[3] as f32 / 255.0;
                let ink = |v: u8| ((1.0 - v as f32 / 255.0) * k * 255.0) as u8;
                [ink(cmyk[0]), ink(cmyk[1]), ink(cmyk[2])]
            })
            .collect(),
    };

    debug!(w = info.width, h = info.height, format = ?info.pixel_format, "jpeg::read");
    Ok(PixelBuffer::from_rgb8(info.width as usize, info.height as usize, &rgb)?)
}

/// Writes `image` at [`DEFAULT_QUALITY`].
pub fn write<P: AsRef<Path>>(path: P, image: &PixelBuffer) -> IoResult<()> {
    write_with_quality(path, image, DEFAULT_QUALITY)
}

/// Writes `image` at `quality` (1-100).
pub fn write_with_quality<P: AsRef<Path>>(path: P, image: &PixelBuffer, quality: u8) -> IoResult<()> {
    let (w, h) = image.dimensions();
    let width = u16::try_from(w).map_err(|_| IoError::EncodeError(format!("width {w} exceeds 65535")))?;
    let height = u16::try_from(h).map_err(|_| IoError::EncodeError(format!("height {h} exceeds 65535")))?;

    let encoder = jpeg_encoder::Encoder::new_file(path.as_ref(), quality.clamp(1, 100))
        .map_err(|e| IoError::EncodeError(e.to_string()))?;
    encoder
        .encode(&image.to_rgb8(), width, height, jpeg_encoder::ColorType::Rgb)
        .map_err(|e: jpeg_encoder::EncodingError| IoError::EncodeError(e.to_string()))?;
    trace!(w, h, quality, "jpeg::write");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_close() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flat.jpg");
        let image = PixelBuffer::filled(16, 16, [0.2, 0.5, 0.8]);
        write(&path, &image).unwrap();
        let loaded = read(&path).unwrap();
        assert_eq!(loaded.dimensions(), (16, 16));
        assert!(loaded.max_abs_diff(&image).unwrap() < 0.05);
    }

    #[test]
    fn test_quality_changes_size() {
        let dir = tempfile::tempdir().unwrap();
        let bytes: Vec<u8> = (0..64 * 64).flat_map(|i| [(i * 7) as u8, (i * 13) as u8, (i * 3) as u8]).collect();
        let image = PixelBuffer::from_rgb8(64, 64, &bytes).unwrap();
        let low = dir.path().join("low.jpg");
        let high = dir.path().join("high.jpg");
        write_with_quality(&low, &image, 10).unwrap();
        write_with_quality(&high, &image, 100).unwrap();
        let size = |p: &Path| std::fs::metadata(p).unwrap().len();
        assert!(size(&low) < size(&high));
    }

    #[test]
    fn test_oversized_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let image = PixelBuffer::new(70_000, 1);
        assert!(matches!(
            write(dir.path().join("wide.jpg"), &image),
            Err(IoError::EncodeError(_))
        ));
    }
}
