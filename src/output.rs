//! CLI output formatting.
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.
//!
//! # Output Format
//!
//! ## Run
//!
//! ```text
//! photo.jpg (2 variants)
//!     medium → public/avatars/medium/photo-200x150.jpg
//!         200x150, auto-aspect
//!     motion → public/avatars/motion/photo-96x96.gif
//!         96x96, crop, 12 frames, 1200ms
//! ```
//!
//! ## Plan
//!
//! ```text
//! photo.gif (2 variants, dry run)
//!     medium → public/avatars/medium/photo-200x150.jpg
//!         200x150, auto-aspect, watermark: wm.png
//!     motion → public/avatars/motion/photo-96x96.gif
//!         96x96, crop, animated
//! ```
//!
//! ## Check
//!
//! ```text
//! Config: image-variants.toml
//! Imaging: quality 90, background #ffffff, animated GIF on
//!
//! avatar → public/avatars (crop)
//!     medium    200 x auto, fit, jpg
//!     motion    96 x 96, fit, gif, animated
//! ```

use crate::config::{FitMode, ResizerConfig, ScalingMode, SizeSpec};
use crate::job::VariantPlan;
use crate::types::{GeneratedVariant, SourceImage};
use std::path::Path;

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn variant_count(n: usize) -> String {
    if n == 1 {
        "1 variant".to_string()
    } else {
        format!("{n} variants")
    }
}

fn source_header(source: &SourceImage, count: usize, suffix: &str) -> String {
    format!(
        "{}.{} ({}{})",
        source.file_name,
        source.extension,
        variant_count(count),
        suffix
    )
}

fn dimension(value: Option<u32>) -> String {
    value.map_or_else(|| "auto".to_string(), |v| v.to_string())
}

/// One-line summary of a configured size entry.
pub fn describe_size(size: &SizeSpec) -> String {
    let mode = match size.mode {
        ScalingMode::Fit => "fit",
        ScalingMode::Stretch => "stretch",
    };
    let mut line = format!(
        "{} x {}, {}, {}",
        dimension(size.width),
        dimension(size.height),
        mode,
        size.extension
    );
    if size.animated {
        line.push_str(", animated");
    }
    line
}

// ============================================================================
// run
// ============================================================================

/// Format the variants written by one job run.
pub fn format_run_output(source: &SourceImage, variants: &[GeneratedVariant]) -> Vec<String> {
    let mut lines = vec![source_header(source, variants.len(), "")];

    for variant in variants {
        lines.push(format!(
            "{}{} → {}",
            indent(1),
            variant.folder,
            variant.path.display()
        ));
        let mut detail = format!("{}x{}, {}", variant.width, variant.height, variant.fit);
        if let Some(frames) = variant.frames {
            detail.push_str(&format!(", {frames} frames"));
        }
        if let Some(ms) = variant.duration_ms {
            detail.push_str(&format!(", {ms}ms"));
        }
        lines.push(format!("{}{}", indent(2), detail));
    }

    lines
}

pub fn print_run_output(source: &SourceImage, variants: &[GeneratedVariant]) {
    for line in format_run_output(source, variants) {
        println!("{}", line);
    }
}

// ============================================================================
// plan
// ============================================================================

/// Format a dry run: where each variant would go and how it would be made.
pub fn format_plan_output(source: &SourceImage, plans: &[VariantPlan]) -> Vec<String> {
    let mut lines = vec![source_header(source, plans.len(), ", dry run")];

    for plan in plans {
        lines.push(format!(
            "{}{} → {}",
            indent(1),
            plan.folder,
            plan.target.display()
        ));
        let mut detail = format!("{}x{}, {}", plan.width, plan.height, plan.fit);
        if plan.animated {
            detail.push_str(", animated");
        }
        if let Some(wm) = &plan.watermark {
            let name = wm
                .image
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| wm.image.display().to_string());
            detail.push_str(&format!(", watermark: {name}"));
        }
        lines.push(format!("{}{}", indent(2), detail));
    }

    lines
}

pub fn print_plan_output(source: &SourceImage, plans: &[VariantPlan]) {
    for line in format_plan_output(source, plans) {
        println!("{}", line);
    }
}

// ============================================================================
// check
// ============================================================================

/// Format a validated config: imaging settings, then each type and its sizes.
pub fn format_check_output(config: &ResizerConfig, config_path: &Path) -> Vec<String> {
    let mut lines = vec![
        format!("Config: {}", config_path.display()),
        format!(
            "Imaging: quality {}, background {}, animated GIF {}",
            config.imaging.quality,
            config.imaging.background,
            if config.imaging.animated_gif { "on" } else { "off" }
        ),
    ];

    if config.types.is_empty() {
        lines.push(String::new());
        lines.push("No image types configured".to_string());
        return lines;
    }

    for (name, type_config) in &config.types {
        lines.push(String::new());
        let mode = match type_config.fit_mode {
            FitMode::Crop => "crop",
            FitMode::AddFields => "add_fields",
        };
        let mut header = format!("{} → {} ({})", name, type_config.compiled.display(), mode);
        if type_config.crop.enabled {
            header.push_str(", user crop");
        }
        lines.push(header);

        let width = type_config.sizes.keys().map(|k| k.len()).max().unwrap_or(0);
        for (folder, size) in &type_config.sizes {
            let mut line = format!(
                "{}{:<width$}    {}",
                indent(1),
                folder,
                describe_size(size)
            );
            if type_config.watermark.for_folder(folder).is_some() {
                line.push_str(", watermark");
            }
            lines.push(line);
        }
    }

    lines
}

pub fn print_check_output(config: &ResizerConfig, config_path: &Path) {
    for line in format_check_output(config, config_path) {
        println!("{}", line);
    }
}
