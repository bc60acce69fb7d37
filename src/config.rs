//! Resizer configuration module.
//!
//! Handles loading, validating, and merging the `image-variants.toml` file.
//! Stock defaults are serialized to a TOML table and the user file is merged
//! on top, so a config only needs the keys it wants to override.
//!
//! ## Configuration Options
//!
//! ```toml
//! [imaging]
//! quality = 90              # JPEG/AVIF quality (1-100)
//! background = "#ffffff"    # Letterbox fields and JPEG flattening
//! animated_gif = true       # Resize animated GIFs frame by frame
//!
//! [types.avatar]
//! compiled = "public/avatars"   # Output base; relative to this file
//! fit_mode = "crop"             # "crop" or "add_fields" (letterbox)
//!
//! [types.avatar.crop]
//! enabled = false               # Must be off for "animated" entries
//!
//! [types.avatar.sizes]
//! thumb = [200, "auto", "fit", "original"]
//! square = [120, 120, "fit", "jpg"]
//! banner = { width = 800, height = 200, mode = "stretch", extension = "png" }
//! motion = [96, 96, "fit", "gif", "animated"]
//!
//! [types.avatar.watermark]
//! enabled = true
//!
//! [types.avatar.watermark.folders.banner]
//! image = "watermark.png"
//! position = "bottom-right"
//! x = 10
//! y = 10
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{Anchor, Background, OutputFormat, Quality};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default config file name looked up by the CLI.
pub const CONFIG_FILE: &str = "image-variants.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
    #[error("Unknown image type '{name}'. Available: {available:?}")]
    UnknownType {
        name: String,
        available: Vec<String>,
    },
}

/// Top-level configuration: imaging settings plus one entry per image type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResizerConfig {
    /// Settings shared by every type.
    pub imaging: ImagingConfig,
    /// Per image type sizing rules, keyed by type name.
    pub types: BTreeMap<String, TypeConfig>,
}

impl ResizerConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.imaging.validate()?;
        for (name, type_config) in &self.types {
            check_segment("type name", name).map_err(ConfigError::Validation)?;
            type_config
                .validate()
                .map_err(|e| ConfigError::Validation(format!("types.{name}: {e}")))?;
        }
        Ok(())
    }

    /// Look up one type's config by name.
    pub fn type_config(&self, name: &str) -> Result<&TypeConfig, ConfigError> {
        self.types.get(name).ok_or_else(|| ConfigError::UnknownType {
            name: name.to_string(),
            available: self.types.keys().cloned().collect(),
        })
    }

    /// Anchor relative output and watermark paths at `base`.
    pub fn resolve_paths(&mut self, base: &Path) {
        for type_config in self.types.values_mut() {
            type_config.resolve_paths(base);
        }
    }
}

/// Settings for the imaging library itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImagingConfig {
    /// JPEG/AVIF encoding quality (1 = worst, 100 = best).
    pub quality: u32,
    /// Hex color used for letterbox fields and behind transparent JPEG sources.
    pub background: String,
    /// Whether animated GIF support is available to jobs.
    pub animated_gif: bool,
}

impl Default for ImagingConfig {
    fn default() -> Self {
        Self {
            quality: 90,
            background: "#ffffff".to_string(),
            animated_gif: true,
        }
    }
}

impl ImagingConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=100).contains(&self.quality) {
            return Err(ConfigError::Validation(
                "imaging.quality must be 1-100".into(),
            ));
        }
        if Background::parse_hex(&self.background).is_none() {
            return Err(ConfigError::Validation(format!(
                "imaging.background must be a #rrggbb color, got '{}'",
                self.background
            )));
        }
        Ok(())
    }

    pub fn quality(&self) -> Quality {
        Quality::new(self.quality)
    }

    /// Parsed background; white if the value was never validated.
    pub fn background(&self) -> Background {
        Background::parse_hex(&self.background).unwrap_or_default()
    }
}

/// How `fit` entries with both dimensions set are filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitMode {
    /// Scale to cover and crop the overflow.
    #[default]
    Crop,
    /// Scale to fit inside and pad with the background color.
    AddFields,
}

/// User-driven cropping for a type. Incompatible with animated entries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CropConfig {
    pub enabled: bool,
}

/// One watermark overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WatermarkSpec {
    pub image: PathBuf,
    #[serde(default)]
    pub position: Anchor,
    #[serde(default)]
    pub x: i32,
    #[serde(default)]
    pub y: i32,
}

/// Watermarks, keyed by size folder.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WatermarkConfig {
    pub enabled: bool,
    pub folders: BTreeMap<String, WatermarkSpec>,
}

impl WatermarkConfig {
    /// The overlay for `folder`, if watermarking is on and one is configured.
    pub fn for_folder(&self, folder: &str) -> Option<&WatermarkSpec> {
        if self.enabled {
            self.folders.get(folder)
        } else {
            None
        }
    }
}

/// Sizing rules for one image type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TypeConfig {
    /// Base directory for generated variants.
    pub compiled: PathBuf,
    pub fit_mode: FitMode,
    pub crop: CropConfig,
    pub watermark: WatermarkConfig,
    /// Output folder name → size entry.
    pub sizes: BTreeMap<String, SizeSpec>,
}

impl Default for TypeConfig {
    fn default() -> Self {
        Self {
            compiled: PathBuf::from("compiled"),
            fit_mode: FitMode::default(),
            crop: CropConfig::default(),
            watermark: WatermarkConfig::default(),
            sizes: BTreeMap::new(),
        }
    }
}

impl TypeConfig {
    fn validate(&self) -> Result<(), String> {
        for (folder, size) in &self.sizes {
            check_segment("size folder", folder)?;
            if let OutputExtension::Named(ext) = &size.extension
                && OutputFormat::from_extension(ext).is_none()
            {
                return Err(format!("sizes.{folder}: unsupported extension '{ext}'"));
            }
        }
        if let Some(folder) = self
            .watermark
            .folders
            .keys()
            .find(|f| !self.sizes.contains_key(*f))
        {
            return Err(format!(
                "watermark.folders.{folder} does not match any size folder"
            ));
        }
        Ok(())
    }

    fn resolve_paths(&mut self, base: &Path) {
        if self.compiled.is_relative() {
            self.compiled = base.join(&self.compiled);
        }
        for spec in self.watermark.folders.values_mut() {
            if spec.image.is_relative() {
                spec.image = base.join(&spec.image);
            }
        }
    }
}

fn check_segment(what: &str, value: &str) -> Result<(), String> {
    if value.is_empty() || value == "." || value == ".." || value.contains(['/', '\\']) {
        return Err(format!("{what} '{value}' must be a single path segment"));
    }
    Ok(())
}

// =============================================================================
// Size entries
// =============================================================================

/// How a size entry with both dimensions set is resized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalingMode {
    #[default]
    #[serde(alias = "auto")]
    Fit,
    Stretch,
}

/// Output file extension: a fixed one, or whatever the source had.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OutputExtension {
    #[default]
    Original,
    Named(String),
}

impl OutputExtension {
    /// Resolve to a concrete lowercase extension.
    pub fn resolve<'a>(&'a self, source_extension: &'a str) -> &'a str {
        match self {
            OutputExtension::Original => source_extension,
            OutputExtension::Named(ext) => ext,
        }
    }
}

impl From<String> for OutputExtension {
    fn from(value: String) -> Self {
        let value = value.trim_start_matches('.').to_ascii_lowercase();
        if value == "original" {
            OutputExtension::Original
        } else {
            OutputExtension::Named(value)
        }
    }
}

impl From<OutputExtension> for String {
    fn from(value: OutputExtension) -> Self {
        match value {
            OutputExtension::Original => "original".to_string(),
            OutputExtension::Named(ext) => ext,
        }
    }
}

impl fmt::Display for OutputExtension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputExtension::Original => f.write_str("original"),
            OutputExtension::Named(ext) => f.write_str(ext),
        }
    }
}

/// One output variant: target box, resize mode, format, animation flag.
///
/// Accepts `[width, height, mode, extension]`, the same with a trailing
/// `"animated"`, or a table. A dimension may be `"auto"` (or omitted in the
/// table form) to follow the source aspect ratio.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SizeSpecRepr", into = "SizeTable")]
pub struct SizeSpec {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub mode: ScalingMode,
    pub extension: OutputExtension,
    pub animated: bool,
}

impl SizeSpec {
    pub fn new(width: Option<u32>, height: Option<u32>) -> Self {
        Self {
            width,
            height,
            mode: ScalingMode::Fit,
            extension: OutputExtension::Original,
            animated: false,
        }
    }

    pub fn stretch(mut self) -> Self {
        self.mode = ScalingMode::Stretch;
        self
    }

    pub fn extension(mut self, ext: &str) -> Self {
        self.extension = OutputExtension::from(ext.to_string());
        self
    }

    pub fn animated(mut self) -> Self {
        self.animated = true;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum AutoKeyword {
    Auto,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
enum Dimension {
    Px(u32),
    Auto(AutoKeyword),
}

impl Dimension {
    fn px(self) -> Option<u32> {
        match self {
            Dimension::Px(v) => Some(v),
            Dimension::Auto(_) => None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct SizeTable {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    width: Option<Dimension>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    height: Option<Dimension>,
    #[serde(default)]
    mode: ScalingMode,
    #[serde(default)]
    extension: OutputExtension,
    #[serde(default)]
    animated: bool,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SizeSpecRepr {
    Flagged((Dimension, Dimension, ScalingMode, OutputExtension, String)),
    Plain((Dimension, Dimension, ScalingMode, OutputExtension)),
    Table(SizeTable),
}

impl TryFrom<SizeSpecRepr> for SizeSpec {
    type Error = String;

    fn try_from(repr: SizeSpecRepr) -> Result<Self, Self::Error> {
        let spec = match repr {
            SizeSpecRepr::Flagged((w, h, mode, extension, flag)) => {
                if flag != "animated" {
                    return Err(format!(
                        "unknown size flag '{flag}', expected \"animated\""
                    ));
                }
                SizeSpec {
                    width: w.px(),
                    height: h.px(),
                    mode,
                    extension,
                    animated: true,
                }
            }
            SizeSpecRepr::Plain((w, h, mode, extension)) => SizeSpec {
                width: w.px(),
                height: h.px(),
                mode,
                extension,
                animated: false,
            },
            SizeSpecRepr::Table(t) => SizeSpec {
                width: t.width.and_then(Dimension::px),
                height: t.height.and_then(Dimension::px),
                mode: t.mode,
                extension: t.extension,
                animated: t.animated,
            },
        };

        if spec.width == Some(0) || spec.height == Some(0) {
            return Err("size dimensions must be non-zero".into());
        }
        if spec.width.is_none() && spec.height.is_none() {
            return Err("size entry needs a width or a height".into());
        }
        Ok(spec)
    }
}

impl From<SizeSpec> for SizeTable {
    fn from(spec: SizeSpec) -> Self {
        Self {
            width: spec.width.map(Dimension::Px),
            height: spec.height.map(Dimension::Px),
            mode: spec.mode,
            extension: spec.extension,
            animated: spec.animated,
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(ResizerConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<ResizerConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: ResizerConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from the given file.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// validates, and anchors relative paths at the file's directory.
pub fn load_config(path: &Path) -> Result<ResizerConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(path)?;
    let mut config = resolve_config(base, overlay)?;
    let dir = path.parent().unwrap_or_else(|| Path::new(""));
    config.resolve_paths(dir);
    Ok(config)
}

/// Returns a fully-commented stock config with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# image-variants configuration
# ============================
# Relative paths are resolved against the directory holding this file.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Imaging
# ---------------------------------------------------------------------------
[imaging]
# JPEG/AVIF encoding quality (1 = worst, 100 = best).
quality = 90

# Fill color for letterbox fields ("add_fields") and behind transparent
# pixels when writing JPEG.
background = "#ffffff"

# Resize animated GIFs frame by frame. When false, any size entry flagged
# "animated" fails the job.
animated_gif = true

# ---------------------------------------------------------------------------
# Image types
# ---------------------------------------------------------------------------
# One [types.<name>] table per kind of upload. Each output lands at
#   <compiled>/<folder>/<file name>-<width>x<height>.<extension>
[types.avatar]
compiled = "public/images/avatars"

# "crop": scale to cover the box and cut the overflow.
# "add_fields": scale to fit inside the box and pad with the background.
fit_mode = "crop"

# User-driven cropping. Cannot be combined with "animated" size entries.
[types.avatar.crop]
enabled = false

# folder = [width, height, mode, extension]  or  [..., "animated"]
#   width/height: pixels, or "auto" to follow the source aspect ratio
#   mode:         "fit" or "stretch" (ignored when a dimension is auto)
#   extension:    "jpg", "png", "gif", "webp", "tiff", "avif" or "original"
# Table form: folder = { width = 200, mode = "fit", extension = "png" }
[types.avatar.sizes]
small = [64, 64, "fit", "original"]
medium = [200, "auto", "fit", "jpg"]
motion = [96, 96, "fit", "gif", "animated"]

[types.avatar.watermark]
enabled = false

# Per-folder overlay. position is one of top-left, top, top-right, left,
# center, right, bottom-left, bottom, bottom-right. x/y move it inward.
# [types.avatar.watermark.folders.medium]
# image = "watermark.png"
# position = "bottom-right"
# x = 10
# y = 10
"##
}
