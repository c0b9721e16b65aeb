//! Integration tests for afterglow crates.
//!
//! End-to-end checks that run effects through the registry, the math
//! primitives and file I/O together.

#[cfg(test)]
mod tests {
    use afterglow_core::PixelBuffer;
    use afterglow_ops::{apply_chain, ApplyContext, CancelToken, Filter, FilterKind, OpsError};
    use approx::assert_relative_eq;
    use tempfile::tempdir;

    /// Deterministic colourful test image with every luminance above zero.
    fn pattern(w: usize, h: usize) -> PixelBuffer {
        let data = (0..w * h * 3)
            .map(|i| 0.05 + ((i * 37) % 101) as f32 / 110.0)
            .collect();
        PixelBuffer::from_data(w, h, data).unwrap()
    }

    fn in_unit_range(img: &PixelBuffer) -> bool {
        img.data().iter().all(|v| (0.0..=1.0).contains(v))
    }

    /// Every filter's defaults, with the simulators shortened.
    fn all_filters() -> Vec<Filter> {
        FilterKind::ALL
            .into_iter()
            .map(|kind| match kind {
                FilterKind::ReactDiff => Filter::from_pairs(kind, [("steps", "20")]).unwrap(),
                FilterKind::FlowPaint => Filter::from_pairs(kind, [("steps", "20")]).unwrap(),
                FilterKind::Ascii => Filter::from_pairs(kind, [("cols", "12")]).unwrap(),
                _ => Filter::with_defaults(kind),
            })
            .collect()
    }

    #[test]
    fn test_every_filter_stays_in_unit_range() {
        let img = pattern(40, 30);
        let mut ctx = ApplyContext::default();
        for filter in all_filters() {
            let out = filter.apply(&img, &mut ctx).unwrap();
            assert!(in_unit_range(&out), "{} left [0, 1]", filter.kind());
        }
    }

    #[test]
    fn test_every_filter_is_deterministic() {
        let img = pattern(24, 18);
        for filter in all_filters() {
            let a = filter.apply(&img, &mut ApplyContext::default()).unwrap();
            let b = filter.apply(&img, &mut ApplyContext::default()).unwrap();
            assert_eq!(a, b, "{} differs between runs", filter.kind());
        }
    }

    #[test]
    fn test_noise_bit_identical() {
        let a = afterglow_math::value_noise(33, 47, 8.0, 3, 42);
        let b = afterglow_math::value_noise(33, 47, 8.0, 3, 42);
        let c = afterglow_math::value_noise(33, 47, 8.0, 3, 43);
        assert_eq!(a.data(), b.data());
        assert_ne!(a.data(), c.data());
        assert!(a.data().iter().all(|v| (-1.0..=1.0).contains(v)));
    }

    #[test]
    fn test_kaleidoscope_two_slices_keeps_unmirrored_quadrant() {
        let (w, h) = (32, 24);
        let img = pattern(w, h);
        let out = Filter::parse("kaleidoscope:slices=2,radius=1.0")
            .unwrap()
            .apply(&img, &mut ApplyContext::default())
            .unwrap();

        let (cx, cy) = (w as f32 / 2.0, h as f32 / 2.0);
        let r_max = cx.min(cy);
        for y in h / 2..h {
            for x in w / 2..w {
                let (dx, dy) = (x as f32 - cx, y as f32 - cy);
                if (dx * dx + dy * dy).sqrt() > r_max {
                    continue;
                }
                let (a, b) = (img.pixel(x, y), out.pixel(x, y));
                for c in 0..3 {
                    assert!((a[c] - b[c]).abs() < 1e-4, "({x}, {y}) moved");
                }
            }
        }
    }

    #[test]
    fn test_kaleidoscope_rejects_single_slice() {
        assert!(matches!(
            Filter::parse("kale:slices=1"),
            Err(OpsError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_oilpaint_huge_radius_completes() {
        let img = pattern(6, 5);
        let out = Filter::parse("oilpaint:radius=100000")
            .unwrap()
            .apply(&img, &mut ApplyContext::default())
            .unwrap();
        assert_eq!(out.dimensions(), (6, 5));
        assert!(in_unit_range(&out));
    }

    #[test]
    fn test_crt_zeros_is_identity() {
        let img = pattern(30, 20);
        let filter = Filter::parse("crt:scanline_strength=0,vignette=0,curvature=0,mask_strength=0").unwrap();
        let out = filter.apply(&img, &mut ApplyContext::default()).unwrap();
        assert!(out.max_abs_diff(&img).unwrap() < 1e-5);
    }

    #[test]
    fn test_bloom_threshold_one_is_identity() {
        let img = pattern(20, 20);
        assert!(img.data().iter().all(|&v| v < 1.0));
        let out = Filter::parse("bloom:threshold=1.0")
            .unwrap()
            .apply(&img, &mut ApplyContext::default())
            .unwrap();
        assert_eq!(out, img);
    }

    #[test]
    fn test_pixel_sort_extremes() {
        let img = pattern(17, 9);
        let mut ctx = ApplyContext::default();

        let sorted = Filter::parse("sort:threshold=0").unwrap().apply(&img, &mut ctx).unwrap();
        let lum = sorted.luminance();
        for y in 0..9 {
            assert!(lum.row(y).windows(2).all(|p| p[0] <= p[1]), "row {y} unsorted");
        }

        let untouched = Filter::parse("sort:threshold=1").unwrap().apply(&img, &mut ctx).unwrap();
        assert_eq!(untouched, img);
    }

    #[test]
    fn test_reaction_diffusion_reproducible() {
        let img = pattern(28, 28);
        let filter = Filter::parse("rd:steps=40,seed=9").unwrap();
        let a = filter.apply(&img, &mut ApplyContext::default()).unwrap();
        let b = filter.apply(&img, &mut ApplyContext::default()).unwrap();
        assert_eq!(a.data(), b.data());

        let other = Filter::parse("rd:steps=40,seed=10").unwrap();
        let c = other.apply(&img, &mut ApplyContext::default()).unwrap();
        assert_ne!(a.data(), c.data());
    }

    #[test]
    fn test_mid_gray_halftone_and_bloom() {
        use afterglow_ops::halftone::{halftone_layout, HalftoneParams};

        let gray = PixelBuffer::filled(4, 4, [0.5; 3]);
        let dots = halftone_layout(&gray, &HalftoneParams { cell: 4, contrast: 1.0 }).unwrap();
        assert_eq!(dots.len(), 1);
        assert_relative_eq!(dots[0].cx, 2.0);
        assert_relative_eq!(dots[0].cy, 2.0);
        assert_relative_eq!(dots[0].radius, 0.5 * 4.0 * std::f32::consts::SQRT_2 / 2.0, epsilon = 1e-5);

        let bloomed = Filter::parse("glow:threshold=0.9")
            .unwrap()
            .apply(&gray, &mut ApplyContext::default())
            .unwrap();
        assert_eq!(bloomed, gray);
    }

    #[test]
    fn test_cancelled_chain_stops() {
        let img = pattern(16, 16);
        let token = CancelToken::new();
        token.cancel();
        let mut ctx = ApplyContext::default().with_cancel(token);
        let steps = [Filter::parse("crt").unwrap(), Filter::parse("flow:steps=50").unwrap()];
        assert!(matches!(
            apply_chain(&img, &steps, &mut ctx),
            Err(OpsError::Cancelled { completed: 0 })
        ));
    }

    #[test]
    fn test_png_pipeline() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in.png");
        let output = dir.path().join("out.jpg");

        let src = PixelBuffer::from_rgb8(32, 24, &pattern(32, 24).to_rgb8()).unwrap();
        afterglow_io::write(&input, &src).unwrap();
        let loaded = afterglow_io::read(&input).unwrap();
        assert_eq!(loaded, src);

        let steps: Vec<Filter> = ["oilpaint:radius=2", "glitch:prob=0.5", "neon"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();
        let result = apply_chain(&loaded, &steps, &mut ApplyContext::default()).unwrap();
        afterglow_io::write(&output, &result).unwrap();

        let back = afterglow_io::read(&output).unwrap();
        assert_eq!(back.dimensions(), (32, 24));
        assert!(in_unit_range(&back));
    }
}
