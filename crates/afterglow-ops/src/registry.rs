//! Filter registry: names, parameter schemas and dispatch.
//!
//! A pipeline step is written `name:key=value,key=value`. The name may be a
//! canonical filter name or an alias; keys must appear in the filter's
//! schema. Text values may be quoted with `'` or `"` to carry commas.
//!
//! Steps are resolved once into a typed [`Filter`] holding the effect's
//! parameter struct, so no string handling happens while pixels are
//! processed.
//!
//! ```rust
//! use afterglow_core::PixelBuffer;
//! use afterglow_ops::{ApplyContext, Filter, FilterKind};
//!
//! let filter: Filter = "sort:threshold=0,reverse=true".parse().unwrap();
//! assert_eq!(filter.kind(), FilterKind::PixelSort);
//!
//! let img = PixelBuffer::filled(4, 4, [0.5, 0.5, 0.5]);
//! let out = filter.apply(&img, &mut ApplyContext::default()).unwrap();
//! assert_eq!(out.dimensions(), (4, 4));
//! ```

use std::fmt;
use std::str::FromStr;

use afterglow_core::PixelBuffer;
#[allow(unused_imports)]
use tracing::{debug, info, trace};

use crate::ascii::{ascii, AsciiParams, DEFAULT_CHARSET};
use crate::cancel::CancelToken;
use crate::crt::{crt, CrtParams};
use crate::draw::{BitmapGlyphs, GlyphRasterizer};
use crate::flow_paint::{flow_paint, FlowPaintParams};
use crate::glitch::{glitch, GlitchParams};
use crate::glow::{bloom, neon, BloomParams, NeonParams};
use crate::halftone::{halftone, HalftoneParams};
use crate::kuwahara::{kuwahara, KuwaharaParams};
use crate::pixel_sort::{pixel_sort, PixelSortParams, SortDirection};
use crate::reaction_diffusion::{reaction_diffusion, ReactionDiffusionParams};
use crate::warp::{kaleidoscope, perlin_warp, KaleidoscopeParams, WarpParams};
use crate::{OpsError, OpsResult};

use ParamKind::{Bool, Choice, Float, Int, Text};

/// Every filter the registry knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKind {
    /// Dot-screen halftone.
    Halftone,
    /// Value-noise displacement.
    PerlinWarp,
    /// Polar mirror.
    Kaleidoscope,
    /// Bloom.
    Glow,
    /// Chromatic aberration plus scanline tearing.
    Glitch,
    /// Threshold pixel sorting.
    PixelSort,
    /// Isophote advection.
    FlowPaint,
    /// Gray-Scott reaction-diffusion.
    ReactDiff,
    /// ASCII-art rendering.
    Ascii,
    /// CRT monitor look.
    Crt,
    /// Kuwahara oil paint.
    OilPaint,
    /// Neon edges.
    Neon,
}

impl FilterKind {
    /// All kinds in listing order.
    pub const ALL: [FilterKind; 12] = [
        Self::Halftone,
        Self::PerlinWarp,
        Self::Kaleidoscope,
        Self::Glow,
        Self::Glitch,
        Self::PixelSort,
        Self::FlowPaint,
        Self::ReactDiff,
        Self::Ascii,
        Self::Crt,
        Self::OilPaint,
        Self::Neon,
    ];

    /// Canonical name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Halftone => "halftone",
            Self::PerlinWarp => "perlin_warp",
            Self::Kaleidoscope => "kaleidoscope",
            Self::Glow => "glow",
            Self::Glitch => "glitch",
            Self::PixelSort => "pixel_sort",
            Self::FlowPaint => "flow_paint",
            Self::ReactDiff => "react_diff",
            Self::Ascii => "ascii",
            Self::Crt => "crt",
            Self::OilPaint => "oilpaint",
            Self::Neon => "neon",
        }
    }

    /// Alternative names accepted on input.
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::PerlinWarp => &["perlin-warp", "warp"],
            Self::Kaleidoscope => &["kale"],
            Self::Glow => &["bloom"],
            Self::PixelSort => &["pixel-sort", "sort"],
            Self::FlowPaint => &["flow-paint", "flow"],
            Self::ReactDiff => &["react-diff", "rd"],
            Self::OilPaint => &["kuwahara"],
            _ => &[],
        }
    }

    /// One-line description.
    pub fn summary(self) -> &'static str {
        match self {
            Self::Halftone => "black dots on white, sized by block brightness",
            Self::PerlinWarp => "displace pixels along smooth value noise",
            Self::Kaleidoscope => "mirror angular slices around the centre",
            Self::Glow => "soft bloom around bright areas",
            Self::Glitch => "RGB split and torn scanlines",
            Self::PixelSort => "sort bright runs of pixels by luminance",
            Self::FlowPaint => "drag colour along lines of equal brightness",
            Self::ReactDiff => "Gray-Scott reaction-diffusion pattern",
            Self::Ascii => "render as ASCII art",
            Self::Crt => "curved screen, scanlines and shadow mask",
            Self::OilPaint => "Kuwahara oil-paint smoothing",
            Self::Neon => "glowing hue-cycled edges",
        }
    }

    /// Declared parameters.
    pub fn schema(self) -> &'static [ParamSpec] {
        match self {
            Self::Halftone => HALFTONE_PARAMS,
            Self::PerlinWarp => WARP_PARAMS,
            Self::Kaleidoscope => KALEIDOSCOPE_PARAMS,
            Self::Glow => GLOW_PARAMS,
            Self::Glitch => GLITCH_PARAMS,
            Self::PixelSort => PIXEL_SORT_PARAMS,
            Self::FlowPaint => FLOW_PAINT_PARAMS,
            Self::ReactDiff => REACT_DIFF_PARAMS,
            Self::Ascii => ASCII_PARAMS,
            Self::Crt => CRT_PARAMS,
            Self::OilPaint => OILPAINT_PARAMS,
            Self::Neon => NEON_PARAMS,
        }
    }

    /// Comma-separated canonical names.
    pub fn expected_names() -> String {
        Self::ALL.iter().map(|k| k.name()).collect::<Vec<_>>().join(", ")
    }
}

impl FromStr for FilterKind {
    type Err = OpsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|k| k.name() == wanted || k.aliases().contains(&wanted.as_str()))
            .ok_or_else(|| OpsError::UnknownFilter {
                name: s.trim().to_string(),
                expected: Self::expected_names(),
            })
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Value type of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// Integer.
    Int,
    /// Floating point.
    Float,
    /// `true`/`false`.
    Bool,
    /// One of a fixed set of words.
    Choice(&'static [&'static str]),
    /// Free text.
    Text,
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int => f.write_str("int"),
            Self::Float => f.write_str("float"),
            Self::Bool => f.write_str("bool"),
            Self::Choice(options) => write!(f, "{{{}}}", options.join(",")),
            Self::Text => f.write_str("str"),
        }
    }
}

/// One entry of a filter's parameter schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSpec {
    /// Key.
    pub name: &'static str,
    /// Value type.
    pub kind: ParamKind,
    /// Default, as it would be written.
    pub default: &'static str,
    /// Short description.
    pub help: &'static str,
}

const fn spec(name: &'static str, kind: ParamKind, default: &'static str, help: &'static str) -> ParamSpec {
    ParamSpec { name, kind, default, help }
}

const HALFTONE_PARAMS: &[ParamSpec] = &[
    spec("cell", Int, "8", "grid cell size in pixels (>= 1)"),
    spec("contrast", Float, "1.0", "tone response exponent"),
];

const WARP_PARAMS: &[ParamSpec] = &[
    spec("scale", Float, "10.0", "noise feature size (> 0)"),
    spec("intensity", Float, "12.0", "displacement in pixels"),
    spec("octaves", Int, "3", "noise octaves (>= 1)"),
    spec("seed", Int, "42", "noise seed"),
];

const KALEIDOSCOPE_PARAMS: &[ParamSpec] = &[
    spec("slices", Int, "8", "mirror slices (>= 2)"),
    spec("radius", Float, "1.0", "visible radius, fraction of the shorter half-side"),
];

const GLOW_PARAMS: &[ParamSpec] = &[
    spec("threshold", Float, "0.85", "luminance that starts to glow"),
    spec("strength", Float, "0.8", "glow gain"),
    spec("radius", Int, "12", "blur radius in pixels"),
];

const GLITCH_PARAMS: &[ParamSpec] = &[
    spec("aberration", Bool, "true", "split red and blue first"),
    spec("shift", Int, "3", "red/blue split in pixels"),
    spec("line_shift", Int, "12", "largest row displacement (>= 0)"),
    spec("prob", Float, "0.15", "chance a row is displaced, in [0, 1]"),
    spec("seed", Int, "1234", "displacement seed"),
];

const PIXEL_SORT_PARAMS: &[ParamSpec] = &[
    spec("threshold", Float, "0.7", "luminance a pixel must exceed to be sorted"),
    spec("direction", Choice(SortDirection::NAMES), "row", "sort along rows or columns"),
    spec("reverse", Bool, "false", "brightest first"),
];

const FLOW_PAINT_PARAMS: &[ParamSpec] = &[
    spec("steps", Int, "400", "advection iterations"),
    spec("stride", Int, "3", "sample spacing in pixels (>= 1)"),
    spec("jitter", Float, "0.3", "direction noise (>= 0)"),
    spec("blur", Float, "1.2", "luminance blur before the gradient (>= 0)"),
    spec("seed", Int, "7", "jitter seed"),
];

const REACT_DIFF_PARAMS: &[ParamSpec] = &[
    spec("steps", Int, "300", "simulation steps"),
    spec("feed", Float, "0.055", "feed rate"),
    spec("kill", Float, "0.062", "kill rate"),
    spec("diff_a", Float, "1.0", "diffusion of A"),
    spec("diff_b", Float, "0.5", "diffusion of B"),
    spec("mix", Float, "0.6", "pattern opacity over the source"),
    spec("seed", Int, "123", "seed for the initial noise"),
    spec("tolerance", Float, "none", "stop once a step changes less than this"),
];

const ASCII_PARAMS: &[ParamSpec] = &[
    spec("cols", Int, "120", "characters across (>= 1)"),
    spec("invert", Bool, "false", "bright areas get dark glyphs"),
    spec("charset", Text, DEFAULT_CHARSET, "glyph ramp, darkest first"),
    spec("font_size", Int, "10", "glyph cell width in pixels (>= 1)"),
];

const CRT_PARAMS: &[ParamSpec] = &[
    spec("scanline_strength", Float, "0.25", "darkening of alternate lines"),
    spec("vignette", Float, "0.35", "corner darkening"),
    spec("curvature", Float, "0.08", "barrel distortion"),
    spec("mask_strength", Float, "0.2", "RGB stripe mask"),
];

const OILPAINT_PARAMS: &[ParamSpec] = &[spec("radius", Int, "4", "window size in pixels")];

const NEON_PARAMS: &[ParamSpec] = &[
    spec("strength", Float, "1.4", "edge opacity"),
    spec("glow_radius", Float, "1.8", "glow blur sigma"),
    spec("hue_shift", Float, "0.1", "colour cycle offset"),
];

/// A pipeline step as written: filter kind plus raw `key=value` pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSpec {
    /// Resolved filter kind.
    pub kind: FilterKind,
    /// Parameters in the order given.
    pub params: Vec<(String, String)>,
}

impl FilterSpec {
    /// Parses `name` or `name:key=value,key=value`.
    pub fn parse(text: &str) -> OpsResult<Self> {
        let (name, rest) = match text.split_once(':') {
            Some((name, rest)) => (name, rest),
            None => (text, ""),
        };
        let kind: FilterKind = name.parse()?;
        let params = split_pairs(kind, rest)?;
        Ok(Self { kind, params })
    }

    /// Builds the typed filter, checking keys, value types and ranges.
    pub fn resolve(&self) -> OpsResult<Filter> {
        Filter::from_pairs(self.kind, self.params.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }
}

/// Splits `k=v,k=v`, honouring quoted values.
fn split_pairs(kind: FilterKind, text: &str) -> OpsResult<Vec<(String, String)>> {
    let mut pairs = Vec::new();
    let mut chars = text.chars().peekable();
    loop {
        while chars.next_if(|c| *c == ',' || c.is_whitespace()).is_some() {}
        if chars.peek().is_none() {
            break;
        }
        let key: String = chars.by_ref().take_while(|c| *c != '=').collect();
        let key = key.trim().to_string();
        if key.contains(',') || key.is_empty() {
            return Err(OpsError::MalformedValue {
                filter: kind.name(),
                param: key,
                value: String::new(),
                expected: "key=value".into(),
            });
        }
        let value = match chars.peek().copied() {
            Some(q @ ('\'' | '"')) => {
                chars.next();
                let mut value = String::new();
                let mut closed = false;
                for c in chars.by_ref() {
                    if c == q {
                        closed = true;
                        break;
                    }
                    value.push(c);
                }
                if !closed {
                    return Err(OpsError::MalformedValue {
                        filter: kind.name(),
                        param: key,
                        value,
                        expected: format!("closing {q}"),
                    });
                }
                value
            }
            _ => {
                let mut value = String::new();
                while let Some(c) = chars.next_if(|c| *c != ',') {
                    value.push(c);
                }
                value.trim().to_string()
            }
        };
        pairs.push((key, value));
    }
    Ok(pairs)
}

/// A fully resolved filter with typed parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// See [`halftone`](crate::halftone::halftone).
    Halftone(HalftoneParams),
    /// See [`perlin_warp`](crate::warp::perlin_warp).
    PerlinWarp(WarpParams),
    /// See [`kaleidoscope`](crate::warp::kaleidoscope).
    Kaleidoscope(KaleidoscopeParams),
    /// See [`bloom`](crate::glow::bloom).
    Glow(BloomParams),
    /// See [`glitch`](crate::glitch::glitch).
    Glitch(GlitchParams),
    /// See [`pixel_sort`](crate::pixel_sort::pixel_sort).
    PixelSort(PixelSortParams),
    /// See [`flow_paint`](crate::flow_paint::flow_paint).
    FlowPaint(FlowPaintParams),
    /// See [`reaction_diffusion`](crate::reaction_diffusion::reaction_diffusion).
    ReactDiff(ReactionDiffusionParams),
    /// See [`ascii`](crate::ascii::ascii).
    Ascii(AsciiParams),
    /// See [`crt`](crate::crt::crt).
    Crt(CrtParams),
    /// See [`kuwahara`](crate::kuwahara::kuwahara).
    OilPaint(KuwaharaParams),
    /// See [`neon`](crate::glow::neon).
    Neon(NeonParams),
}

impl Filter {
    /// The filter with all parameters at their defaults.
    pub fn with_defaults(kind: FilterKind) -> Self {
        match kind {
            FilterKind::Halftone => Self::Halftone(HalftoneParams::default()),
            FilterKind::PerlinWarp => Self::PerlinWarp(WarpParams::default()),
            FilterKind::Kaleidoscope => Self::Kaleidoscope(KaleidoscopeParams::default()),
            FilterKind::Glow => Self::Glow(BloomParams::default()),
            FilterKind::Glitch => Self::Glitch(GlitchParams::default()),
            FilterKind::PixelSort => Self::PixelSort(PixelSortParams::default()),
            FilterKind::FlowPaint => Self::FlowPaint(FlowPaintParams::default()),
            FilterKind::ReactDiff => Self::ReactDiff(ReactionDiffusionParams::default()),
            FilterKind::Ascii => Self::Ascii(AsciiParams::default()),
            FilterKind::Crt => Self::Crt(CrtParams::default()),
            FilterKind::OilPaint => Self::OilPaint(KuwaharaParams::default()),
            FilterKind::Neon => Self::Neon(NeonParams::default()),
        }
    }

    /// Builds a filter from raw key/value pairs and validates it.
    pub fn from_pairs<'a, I>(kind: FilterKind, pairs: I) -> OpsResult<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut filter = Self::with_defaults(kind);
        for (key, value) in pairs {
            filter.set(key.trim(), value)?;
        }
        filter.validate()?;
        trace!(filter = ?filter, "resolved");
        Ok(filter)
    }

    /// Parses `name:key=value,...` straight into a filter.
    pub fn parse(text: &str) -> OpsResult<Self> {
        FilterSpec::parse(text)?.resolve()
    }

    /// Which filter this is.
    pub fn kind(&self) -> FilterKind {
        match self {
            Self::Halftone(_) => FilterKind::Halftone,
            Self::PerlinWarp(_) => FilterKind::PerlinWarp,
            Self::Kaleidoscope(_) => FilterKind::Kaleidoscope,
            Self::Glow(_) => FilterKind::Glow,
            Self::Glitch(_) => FilterKind::Glitch,
            Self::PixelSort(_) => FilterKind::PixelSort,
            Self::FlowPaint(_) => FilterKind::FlowPaint,
            Self::ReactDiff(_) => FilterKind::ReactDiff,
            Self::Ascii(_) => FilterKind::Ascii,
            Self::Crt(_) => FilterKind::Crt,
            Self::OilPaint(_) => FilterKind::OilPaint,
            Self::Neon(_) => FilterKind::Neon,
        }
    }

    /// Runs the parameter checks of the wrapped effect.
    pub fn validate(&self) -> OpsResult<()> {
        match self {
            Self::Halftone(p) => p.validate(),
            Self::PerlinWarp(p) => p.validate(),
            Self::Kaleidoscope(p) => p.validate(),
            Self::Glow(p) => p.validate(),
            Self::Glitch(p) => p.validate(),
            Self::PixelSort(p) => p.validate(),
            Self::FlowPaint(p) => p.validate(),
            Self::ReactDiff(p) => p.validate(),
            Self::Ascii(p) => p.validate(),
            Self::Crt(p) => p.validate(),
            Self::OilPaint(_) => Ok(()),
            Self::Neon(p) => p.validate(),
        }
    }

    fn set(&mut self, key: &str, raw: &str) -> OpsResult<()> {
        let kind = self.kind();
        let v = Value { filter: kind.name(), key, raw };
        match self {
            Self::Halftone(p) => match key {
                "cell" => p.cell = v.int()?,
                "contrast" => p.contrast = v.float()?,
                _ => return Err(v.unknown(kind)),
            },
            Self::PerlinWarp(p) => match key {
                "scale" => p.scale = v.float()?,
                "intensity" => p.intensity = v.float()?,
                "octaves" => p.octaves = v.int()?,
                "seed" => p.seed = v.int()?,
                _ => return Err(v.unknown(kind)),
            },
            Self::Kaleidoscope(p) => match key {
                "slices" => p.slices = v.int()?,
                "radius" => p.radius = v.float()?,
                _ => return Err(v.unknown(kind)),
            },
            Self::Glow(p) => match key {
                "threshold" => p.threshold = v.float()?,
                "strength" => p.strength = v.float()?,
                "radius" => p.radius = v.int()?,
                _ => return Err(v.unknown(kind)),
            },
            Self::Glitch(p) => match key {
                "aberration" => p.aberration = v.boolean()?,
                "shift" => p.shift = v.int()?,
                "line_shift" => p.line_shift = v.int()?,
                "prob" => p.prob = v.float()?,
                "seed" => p.seed = v.int()?,
                _ => return Err(v.unknown(kind)),
            },
            Self::PixelSort(p) => match key {
                "threshold" => p.threshold = v.float()?,
                "direction" => p.direction = raw.parse()?,
                "reverse" => p.reverse = v.boolean()?,
                _ => return Err(v.unknown(kind)),
            },
            Self::FlowPaint(p) => match key {
                "steps" => p.steps = v.int()?,
                "stride" => p.stride = v.int()?,
                "jitter" => p.jitter = v.float()?,
                "blur" => p.blur = v.float()?,
                "seed" => p.seed = v.int()?,
                _ => return Err(v.unknown(kind)),
            },
            Self::ReactDiff(p) => match key {
                "steps" => p.steps = v.int()?,
                "feed" => p.feed = v.float()?,
                "kill" => p.kill = v.float()?,
                "diff_a" => p.diff_a = v.float()?,
                "diff_b" => p.diff_b = v.float()?,
                "mix" => p.mix = v.float()?,
                "seed" => p.seed = v.int()?,
                "tolerance" => p.tolerance = v.optional_float()?,
                _ => return Err(v.unknown(kind)),
            },
            Self::Ascii(p) => match key {
                "cols" => p.cols = v.int()?,
                "invert" => p.invert = v.boolean()?,
                "charset" => p.charset = raw.to_string(),
                "font_size" => p.font_size = v.int()?,
                _ => return Err(v.unknown(kind)),
            },
            Self::Crt(p) => match key {
                "scanline_strength" => p.scanline_strength = v.float()?,
                "vignette" => p.vignette = v.float()?,
                "curvature" => p.curvature = v.float()?,
                "mask_strength" => p.mask_strength = v.float()?,
                _ => return Err(v.unknown(kind)),
            },
            Self::OilPaint(p) => match key {
                "radius" => p.radius = v.int()?,
                _ => return Err(v.unknown(kind)),
            },
            Self::Neon(p) => match key {
                "strength" => p.strength = v.float()?,
                "glow_radius" => p.glow_radius = v.float()?,
                "hue_shift" => p.hue_shift = v.float()?,
                _ => return Err(v.unknown(kind)),
            },
        }
        Ok(())
    }

    /// Runs the filter on `src`.
    pub fn apply(&self, src: &PixelBuffer, ctx: &mut ApplyContext) -> OpsResult<PixelBuffer> {
        debug!(filter = %self.kind(), w = src.width(), h = src.height(), "apply");
        match self {
            Self::Halftone(p) => halftone(src, p),
            Self::PerlinWarp(p) => perlin_warp(src, p),
            Self::Kaleidoscope(p) => kaleidoscope(src, p),
            Self::Glow(p) => bloom(src, p),
            Self::Glitch(p) => glitch(src, p),
            Self::PixelSort(p) => pixel_sort(src, p),
            Self::FlowPaint(p) => flow_paint(src, p, &ctx.cancel),
            Self::ReactDiff(p) => reaction_diffusion(src, p, &ctx.cancel),
            Self::Ascii(p) => ascii(src, p, ctx.rasterizer.as_mut()),
            Self::Crt(p) => crt(src, p),
            Self::OilPaint(p) => kuwahara(src, p),
            Self::Neon(p) => neon(src, p),
        }
    }
}

impl FromStr for Filter {
    type Err = OpsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Runs `filters` in order, feeding each output to the next step.
pub fn apply_chain(src: &PixelBuffer, filters: &[Filter], ctx: &mut ApplyContext) -> OpsResult<PixelBuffer> {
    let mut current = src.clone();
    for (i, filter) in filters.iter().enumerate() {
        current = filter.apply(&current, ctx)?;
        trace!(step = i, filter = %filter.kind(), "chain step done");
    }
    info!(steps = filters.len(), "chain done");
    Ok(current)
}

/// Raw value being assigned to `filter.key`.
struct Value<'a> {
    filter: &'static str,
    key: &'a str,
    raw: &'a str,
}

impl Value<'_> {
    fn malformed(&self, expected: &str) -> OpsError {
        OpsError::MalformedValue {
            filter: self.filter,
            param: self.key.to_string(),
            value: self.raw.to_string(),
            expected: expected.to_string(),
        }
    }

    fn unknown(&self, kind: FilterKind) -> OpsError {
        OpsError::UnknownParameter {
            filter: self.filter,
            param: self.key.to_string(),
            expected: kind.schema().iter().map(|s| s.name).collect::<Vec<_>>().join(", "),
        }
    }

    fn int<T: FromStr>(&self) -> OpsResult<T> {
        let text = self.raw.trim();
        // Accept integral floats such as `12.0`.
        text.parse()
            .ok()
            .or_else(|| {
                let f: f64 = text.parse().ok()?;
                (f.fract() == 0.0).then(|| format!("{f:.0}").parse().ok()).flatten()
            })
            .ok_or_else(|| self.malformed("an integer in range"))
    }

    fn float(&self) -> OpsResult<f32> {
        self.raw.trim().parse().map_err(|_| self.malformed("a number"))
    }

    fn optional_float(&self) -> OpsResult<Option<f32>> {
        match self.raw.trim().to_ascii_lowercase().as_str() {
            "" | "none" | "off" => Ok(None),
            _ => self.float().map(Some),
        }
    }

    fn boolean(&self) -> OpsResult<bool> {
        match self.raw.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => Err(self.malformed("true or false")),
        }
    }
}

/// Per-run state handed to [`Filter::apply`].
pub struct ApplyContext {
    /// Polled by the iterative filters.
    pub cancel: CancelToken,
    rasterizer: Box<dyn GlyphRasterizer + Send>,
}

impl ApplyContext {
    /// Context with a fresh token and the built-in bitmap glyphs.
    pub fn new() -> Self {
        Self {
            cancel: CancelToken::new(),
            rasterizer: Box::new(BitmapGlyphs),
        }
    }

    /// Replaces the cancel token.
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Replaces the glyph rasterizer used by `ascii`.
    pub fn with_rasterizer(mut self, rasterizer: Box<dyn GlyphRasterizer + Send>) -> Self {
        self.rasterizer = rasterizer;
        self
    }
}

impl Default for ApplyContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ApplyContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApplyContext")
            .field("cancel", &self.cancel)
            .finish_non_exhaustive()
    }
}
