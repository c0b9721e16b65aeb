//! # afterglow-io
//!
//! Image file I/O for afterglow.
//!
//! Files decode into 8-bit RGB and arrive as a
//! [`PixelBuffer`](afterglow_core::PixelBuffer) in [0, 1]; writing quantizes
//! back to 8 bits.
//!
//! # Supported Formats
//!
//! | Format | Read | Write | Feature |
//! |--------|------|-------|---------|
//! | PNG    | Yes  | Yes   | `png`   |
//! | JPEG   | Yes  | Yes   | `jpeg`  |
//!
//! The `text` feature adds [`text::FontGlyphs`], a system-font glyph
//! rasterizer for the `ascii` effect.
//!
//! # Example
//!
//! ```rust,ignore
//! let image = afterglow_io::read("input.jpg")?;
//! afterglow_io::write("output.png", &image)?;
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod detect;
mod error;

#[cfg(feature = "jpeg")]
pub mod jpeg;
#[cfg(feature = "png")]
pub mod png;
#[cfg(feature = "text")]
pub mod text;

use std::path::Path;

use afterglow_core::PixelBuffer;
#[allow(unused_imports)]
use tracing::{debug, trace};

pub use detect::Format;
pub use error::{IoError, IoResult};

/// Reads an image, detecting the format from its header or extension.
pub fn read<P: AsRef<Path>>(path: P) -> IoResult<PixelBuffer> {
    let path = path.as_ref();
    let format = Format::detect(path)?;
    trace!(path = %path.display(), format = format.name(), "read");
    match format {
        #[cfg(feature = "png")]
        Format::Png => png::read(path),
        #[cfg(feature = "jpeg")]
        Format::Jpeg => jpeg::read(path),
        _ => Err(unsupported(path, format)),
    }
}

/// Writes an image in the format named by the extension.
pub fn write<P: AsRef<Path>>(path: P, image: &PixelBuffer) -> IoResult<()> {
    let path = path.as_ref();
    let format = Format::from_extension(path);
    trace!(path = %path.display(), format = format.name(), "write");
    match format {
        #[cfg(feature = "png")]
        Format::Png => png::write(path, image),
        #[cfg(feature = "jpeg")]
        Format::Jpeg => jpeg::write(path, image),
        _ => Err(unsupported(path, format)),
    }
}

fn unsupported(path: &Path, format: Format) -> IoError {
    match format {
        Format::Unknown => IoError::UnsupportedFormat(path.display().to_string()),
        other => IoError::UnsupportedFormat(format!(
            "{} ({} support not compiled in)",
            path.display(),
            other.name()
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_extension_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let img = PixelBuffer::filled(2, 2, [0.5; 3]);
        assert!(matches!(
            write(dir.path().join("out.bmp"), &img),
            Err(IoError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(read(dir.path().join("nope.png")), Err(IoError::Io(_))));
    }

    #[cfg(all(feature = "png", feature = "jpeg"))]
    #[test]
    fn test_dispatch_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let img = PixelBuffer::filled(8, 8, [0.25, 0.5, 0.75]);
        for name in ["a.png", "b.jpg", "c.JPEG"] {
            let path = dir.path().join(name);
            write(&path, &img).unwrap();
            let back = read(&path).unwrap();
            assert_eq!(back.dimensions(), (8, 8));
            assert!(back.max_abs_diff(&img).unwrap() < 0.05);
        }
    }
}
