//! PNG format support.
//!
//! Every colour type is expanded to 8-bit RGB on read: palettes are
//! resolved, grayscale is replicated, 16-bit samples keep their high byte,
//! and alpha is dropped. Writes are 8-bit RGB tagged sRGB.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use afterglow_core::PixelBuffer;
#[allow(unused_imports)]
use tracing::{debug, trace};

use crate::{IoError, IoResult};

/// Reads a PNG file.
pub fn read<P: AsRef<Path>>(path: P) -> IoResult<PixelBuffer> {
    let file = File::open(path.as_ref())?;
    let mut decoder = png::Decoder::new(BufReader::new(file));
    decoder.set_transformations(png::Transformations::EXPAND);
    let mut reader = decoder
        .read_info()
        .map_err(|e: png::DecodingError| IoError::DecodeError(e.to_string()))?;

    let buf_size = reader
        .output_buffer_size()
        .ok_or_else(|| IoError::DecodeError("cannot determine output buffer size".into()))?;
    let mut buf = vec![0u8; buf_size];
    let info = reader
        .next_frame(&mut buf)
        .map_err(|e: png::DecodingError| IoError::DecodeError(e.to_string()))?;
    let bytes = &buf[..info.buffer_size()];

    let channels = match info.color_type {
        png::ColorType::Grayscale => 1,
        png::ColorType::GrayscaleAlpha => 2,
        png::ColorType::Rgb => 3,
        png::ColorType::Rgba => 4,
        other => {
            return Err(IoError::UnsupportedBitDepth(format!("{other:?} {:?}", info.bit_depth)));
        }
    };
    let stride = match info.bit_depth {
        png::BitDepth::Eight => 1,
        png::BitDepth::Sixteen => 2,
        other => {
            return Err(IoError::UnsupportedBitDepth(format!("{:?} {other:?}", info.color_type)));
        }
    };

    // High byte of big-endian 16-bit samples.
    let rgb: Vec<u8> = bytes
        .chunks_exact(channels * stride)
        .flat_map(|px| {
            let at = |c: usize| px[c * stride];
            if channels < 3 {
                [at(0), at(0), at(0)]
            } else {
                [at(0), at(1), at(2)]
            }
        })
        .collect();

    debug!(w = info.width, h = info.height, color = ?info.color_type, depth = ?info.bit_depth, "png::read");
    Ok(PixelBuffer::from_rgb8(info.width as usize, info.height as usize, &rgb)?)
}

/// Writes `image` as an 8-bit RGB PNG.
pub fn write<P: AsRef<Path>>(path: P, image: &PixelBuffer) -> IoResult<()> {
    let (w, h) = image.dimensions();
    let width = u32::try_from(w).map_err(|_| IoError::EncodeError(format!("width {w} too large")))?;
    let height = u32::try_from(h).map_err(|_| IoError::EncodeError(format!("height {h} too large")))?;

    let file = File::create(path.as_ref())?;
    let mut encoder = png::Encoder::new(BufWriter::new(file), width, height);
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_compression(png::Compression::default());
    encoder.set_source_srgb(png::SrgbRenderingIntent::Perceptual);

    let mut writer = encoder
        .write_header()
        .map_err(|e| IoError::EncodeError(e.to_string()))?;
    writer
        .write_image_data(&image.to_rgb8())
        .map_err(|e| IoError::EncodeError(e.to_string()))?;
    writer.finish().map_err(|e| IoError::EncodeError(e.to_string()))?;
    trace!(w, h, "png::write");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(w: usize, h: usize) -> PixelBuffer {
        let bytes: Vec<u8> = (0..h)
            .flat_map(|y| (0..w).flat_map(move |x| [(x * 8) as u8, (y * 8) as u8, 128]))
            .collect();
        PixelBuffer::from_rgb8(w, h, &bytes).unwrap()
    }

    #[test]
    fn test_roundtrip_is_lossless_at_8_bit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rgb.png");
        let image = gradient(32, 16);
        write(&path, &image).unwrap();
        let loaded = read(&path).unwrap();
        assert_eq!(loaded.dimensions(), (32, 16));
        assert_eq!(loaded.to_rgb8(), image.to_rgb8());
    }

    #[test]
    fn test_grayscale_expands_to_rgb() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gray.png");
        {
            let file = File::create(&path).unwrap();
            let mut enc = png::Encoder::new(BufWriter::new(file), 2, 1);
            enc.set_color(png::ColorType::Grayscale);
            enc.set_depth(png::BitDepth::Eight);
            let mut w = enc.write_header().unwrap();
            w.write_image_data(&[0, 255]).unwrap();
        }
        let loaded = read(&path).unwrap();
        assert_eq!(loaded.to_rgb8(), vec![0, 0, 0, 255, 255, 255]);
    }

    #[test]
    fn test_alpha_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rgba.png");
        {
            let file = File::create(&path).unwrap();
            let mut enc = png::Encoder::new(BufWriter::new(file), 1, 1);
            enc.set_color(png::ColorType::Rgba);
            enc.set_depth(png::BitDepth::Eight);
            let mut w = enc.write_header().unwrap();
            w.write_image_data(&[10, 20, 30, 0]).unwrap();
        }
        assert_eq!(read(&path).unwrap().to_rgb8(), vec![10, 20, 30]);
    }

    #[test]
    fn test_garbage_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.png");
        std::fs::write(&path, b"not a png at all").unwrap();
        assert!(matches!(read(&path), Err(IoError::DecodeError(_))));
    }
}
