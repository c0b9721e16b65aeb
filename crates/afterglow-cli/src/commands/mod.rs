//! CLI command implementations

pub mod chain;
pub mod filter;
pub mod list;
pub mod recipe;

use std::path::Path;
use std::time::Duration;

use afterglow_core::PixelBuffer;
use afterglow_ops::{apply_chain, ApplyContext, CancelToken, Filter};
use anyhow::{Context, Result};

/// Options shared by every command that applies filters.
pub struct Session {
    pub verbose: u8,
    pub timeout: Option<Duration>,
    #[cfg(feature = "text")]
    pub font: Option<String>,
}

impl Session {
    /// Fresh context for one run.
    pub fn context(&self) -> ApplyContext {
        let mut cancel = CancelToken::new();
        if let Some(budget) = self.timeout {
            cancel = cancel.with_timeout(budget);
        }
        let ctx = ApplyContext::new().with_cancel(cancel);
        #[cfg(feature = "text")]
        let ctx = match &self.font {
            Some(family) => ctx.with_rasterizer(Box::new(afterglow_io::text::FontGlyphs::with_family(family))),
            None => ctx,
        };
        ctx
    }

    /// Loads `input`, runs `filters` in order and saves to `output`.
    pub fn process(&self, input: &Path, output: &Path, filters: &[Filter]) -> Result<()> {
        if self.verbose > 0 {
            println!("Loading: {}", input.display());
        }
        let image = load_image(input)?;
        if self.verbose > 0 {
            println!("Size: {}x{}", image.width(), image.height());
            for filter in filters {
                println!("Apply: {filter:?}");
            }
        }

        let result = apply_chain(&image, filters, &mut self.context())?;
        save_image(output, &result)?;

        if self.verbose > 0 {
            println!("Saved: {}", output.display());
        }
        Ok(())
    }
}

/// Load image from path
pub fn load_image(path: &Path) -> Result<PixelBuffer> {
    afterglow_io::read(path).with_context(|| format!("Failed to load: {}", path.display()))
}

/// Save image to path, creating missing parent directories
pub fn save_image(path: &Path, image: &PixelBuffer) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    afterglow_io::write(path, image).with_context(|| format!("Failed to save: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn session() -> Session {
        Session {
            verbose: 0,
            timeout: None,
            #[cfg(feature = "text")]
            font: None,
        }
    }

    pub(crate) fn write_input(dir: &Path) -> std::path::PathBuf {
        let path = dir.join("in.png");
        let bytes: Vec<u8> = (0..24 * 16)
            .flat_map(|i| [(i * 5) as u8, (i * 11) as u8, (255 - i % 256) as u8])
            .collect();
        let image = PixelBuffer::from_rgb8(24, 16, &bytes).unwrap();
        save_image(&path, &image).unwrap();
        path
    }

    #[test]
    fn test_save_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a/b/out.png");
        save_image(&path, &PixelBuffer::filled(2, 2, [0.5; 3])).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_load_missing_has_context() {
        let err = load_image(Path::new("/nonexistent/in.png")).unwrap_err();
        assert!(err.to_string().contains("Failed to load"));
    }

    #[test]
    fn test_timeout_cancels_iterative_filters() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(dir.path());
        let session = Session {
            timeout: Some(Duration::ZERO),
            ..session()
        };
        let filters = [Filter::parse("react_diff:steps=50").unwrap()];
        let err = session
            .process(&input, &dir.path().join("out.png"), &filters)
            .unwrap_err();
        assert!(err.to_string().contains("cancel"), "{err}");
    }
}
