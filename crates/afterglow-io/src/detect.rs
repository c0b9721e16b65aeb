//! Format detection from magic bytes and file extensions.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::IoResult;

/// Supported image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// PNG.
    Png,
    /// JPEG.
    Jpeg,
    /// Anything else.
    Unknown,
}

impl Format {
    /// Detects the format of an existing file.
    ///
    /// Magic bytes win; the extension is the fallback.
    pub fn detect<P: AsRef<Path>>(path: P) -> IoResult<Self> {
        let path = path.as_ref();
        let mut header = [0u8; 8];
        let n = File::open(path)?.read(&mut header)?;
        match Self::from_bytes(&header[..n]) {
            Format::Unknown => Ok(Self::from_extension(path)),
            format => Ok(format),
        }
    }

    /// Detects the format from the extension only.
    pub fn from_extension<P: AsRef<Path>>(path: P) -> Self {
        let ext = path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());
        match ext.as_deref() {
            Some("png") => Format::Png,
            Some("jpg") | Some("jpeg") => Format::Jpeg,
            _ => Format::Unknown,
        }
    }

    /// Detects the format from leading bytes.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        if bytes.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            Format::Png
        } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Format::Jpeg
        } else {
            Format::Unknown
        }
    }

    /// Lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            Format::Png => "png",
            Format::Jpeg => "jpeg",
            Format::Unknown => "unknown",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension() {
        assert_eq!(Format::from_extension("a/b.PNG"), Format::Png);
        assert_eq!(Format::from_extension("x.jpeg"), Format::Jpeg);
        assert_eq!(Format::from_extension("x.jpg"), Format::Jpeg);
        assert_eq!(Format::from_extension("x.tif"), Format::Unknown);
        assert_eq!(Format::from_extension("noext"), Format::Unknown);
    }

    #[test]
    fn test_magic() {
        assert_eq!(
            Format::from_bytes(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]),
            Format::Png
        );
        assert_eq!(Format::from_bytes(&[0xFF, 0xD8, 0xFF, 0xE0]), Format::Jpeg);
        assert_eq!(Format::from_bytes(b"GIF8"), Format::Unknown);
        assert_eq!(Format::from_bytes(&[]), Format::Unknown);
    }

    #[test]
    fn test_detect_prefers_magic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mislabelled.jpg");
        std::fs::write(&path, [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0]).unwrap();
        assert_eq!(Format::detect(&path).unwrap(), Format::Png);

        let path = dir.path().join("empty.png");
        std::fs::write(&path, []).unwrap();
        assert_eq!(Format::detect(&path).unwrap(), Format::Png);
    }
}
