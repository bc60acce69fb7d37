//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the [`job`](crate::job) module (which decides which
//! variants to create) and the [`backend`](super::backend) (which does the
//! actual pixel work). This separation allows swapping backends (e.g. for
//! testing with a mock) without changing job logic.
//!
//! ## Types
//!
//! - [`Quality`] — Lossy encoding quality (1–100, default 90). Clamped on construction.
//! - [`FitPolicy`] — The one geometric transform applied to a variant.
//! - [`Anchor`] — Where a watermark is placed on the canvas.
//! - [`OutputFormat`] — Encoder selected from the resolved output extension.
//! - [`Background`] — Opaque fill color for letterbox fields and JPEG flattening.
//! - [`RenderParams`] — Full specification for a still variant.
//! - [`AnimatedParams`] — Full specification for an animated GIF variant.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}

/// Geometric transform applied to one variant.
///
/// Selected once per size entry, evaluated in this order (first match wins):
///
/// | Policy | When | Result |
/// |---|---|---|
/// | `AutoAspect` | width or height not set | honors the set dimension, preserves aspect ratio |
/// | `Stretch` | mode is `stretch` | exact target size, may distort |
/// | `Letterbox` | fit mode is `add_fields` | scaled to fit inside, padded with background |
/// | `Crop` | otherwise | scaled to cover, center-cropped to exact size |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FitPolicy {
    AutoAspect,
    Stretch,
    Crop,
    Letterbox,
}

impl fmt::Display for FitPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FitPolicy::AutoAspect => "auto-aspect",
            FitPolicy::Stretch => "stretch",
            FitPolicy::Crop => "crop",
            FitPolicy::Letterbox => "letterbox",
        };
        f.write_str(name)
    }
}

/// Watermark placement on the output canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Anchor {
    #[default]
    TopLeft,
    Top,
    TopRight,
    Left,
    Center,
    Right,
    BottomLeft,
    Bottom,
    BottomRight,
}

/// Encoder chosen from the resolved output extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Jpeg,
    Png,
    Gif,
    WebP,
    Tiff,
    Avif,
}

impl OutputFormat {
    /// Map a lowercase file extension to an encoder. `None` for unknown extensions.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(OutputFormat::Jpeg),
            "png" => Some(OutputFormat::Png),
            "gif" => Some(OutputFormat::Gif),
            "webp" => Some(OutputFormat::WebP),
            "tif" | "tiff" => Some(OutputFormat::Tiff),
            "avif" => Some(OutputFormat::Avif),
            _ => None,
        }
    }

    /// JPEG has no alpha channel; images are flattened onto the background first.
    pub fn has_alpha(self) -> bool {
        !matches!(self, OutputFormat::Jpeg)
    }
}

/// Opaque RGB fill color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Background(pub [u8; 3]);

impl Background {
    pub const WHITE: Background = Background([255, 255, 255]);

    /// Parse `#rrggbb` (the leading `#` is optional).
    pub fn parse_hex(value: &str) -> Option<Self> {
        let hex = value.strip_prefix('#').unwrap_or(value);
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Background([channel(0)?, channel(2)?, channel(4)?]))
    }

    pub fn rgba(self) -> image::Rgba<u8> {
        let [r, g, b] = self.0;
        image::Rgba([r, g, b, 255])
    }
}

impl Default for Background {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Watermark overlay applied after the fit transform.
#[derive(Debug, Clone, PartialEq)]
pub struct WatermarkParams {
    pub image: PathBuf,
    pub anchor: Anchor,
    pub offset_x: i32,
    pub offset_y: i32,
}

/// Parameters for a still-image variant.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderParams {
    pub source: PathBuf,
    pub output: PathBuf,
    /// Final output dimensions (auto dimensions already resolved).
    pub width: u32,
    pub height: u32,
    pub fit: FitPolicy,
    pub format: OutputFormat,
    pub quality: Quality,
    pub background: Background,
    pub watermark: Option<WatermarkParams>,
}

/// Parameters for an animated GIF variant. Every frame gets the same transform.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimatedParams {
    pub source: PathBuf,
    pub output: PathBuf,
    pub width: u32,
    pub height: u32,
    pub fit: FitPolicy,
}
