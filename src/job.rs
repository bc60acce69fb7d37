//! The variant job: one source image in, one file per configured size out.
//!
//! A [`VariantJob`] is built from a [`SourceImage`], one [`TypeConfig`] and
//! the global [`ImagingConfig`], plus two injected collaborators: the
//! [`ImageBackend`] that does pixel work and the [`FrameCodec`] that splits
//! and reassembles animated GIFs. [`frame_codec`] picks the codec from config,
//! so a runtime without animation support gets the failing stub up front.
//!
//! ## Per-entry decision
//!
//! ```text
//! extension = size.extension, or the source extension for "original"
//! animated  = extension == "gif" && size.animated
//!   crop.enabled        → JobError::Configuration
//!   codec.probe() fails → JobError::MissingCapability
//!   source not animated → still path (logged)
//! target    = {compiled}/{folder}/{file_name}-{w}x{h}.{extension}
//! ```
//!
//! Entries run in folder-name order, one at a time. The first error aborts
//! the run; variants already written stay on disk. Re-running overwrites the
//! same paths with the same bytes.

use crate::config::{FitMode, ImagingConfig, ScalingMode, SizeSpec, TypeConfig};
use crate::imaging::{
    AnimatedParams, Background, BackendError, FitPolicy, FrameCodec, GifFrameCodec,
    ImageBackend, MissingCapability, NoFrameCodec, OutputFormat, Quality, RenderParams,
    WatermarkParams, calculate_auto_dimensions,
};
use crate::types::{GeneratedVariant, SourceImage};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum JobError {
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Missing capability: {0}")]
    MissingCapability(#[from] MissingCapability),
    #[error("Image processing failed: {0}")]
    Imaging(#[from] BackendError),
    #[error("Invalid source image: {0}")]
    InvalidSource(String),
}

impl JobError {
    /// Whether running the same job again could succeed without a fix.
    ///
    /// Configuration mistakes, missing capabilities, undecodable sources and
    /// unsupported formats fail the same way on every attempt. Disk and
    /// encoder failures may not.
    pub fn is_retryable(&self) -> bool {
        match self {
            JobError::Imaging(e) => !matches!(
                e,
                BackendError::Decode { .. } | BackendError::UnsupportedFormat(_)
            ),
            _ => false,
        }
    }
}

/// Everything decided about one variant before any pixels move.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantPlan {
    pub folder: String,
    pub target: PathBuf,
    pub width: u32,
    pub height: u32,
    pub fit: FitPolicy,
    pub extension: String,
    pub format: OutputFormat,
    /// Goes through the frame codec rather than the still path.
    pub animated: bool,
    pub watermark: Option<WatermarkParams>,
}

/// Output file for one variant.
pub fn target_path(
    compiled: &Path,
    folder: &str,
    file_name: &str,
    width: u32,
    height: u32,
    extension: &str,
) -> PathBuf {
    compiled
        .join(folder)
        .join(format!("{file_name}-{width}x{height}.{extension}"))
}

/// Still-path policy. First match wins: auto, stretch, letterbox, crop.
pub fn select_fit_policy(size: &SizeSpec, fit_mode: FitMode) -> FitPolicy {
    if size.width.is_none() || size.height.is_none() {
        FitPolicy::AutoAspect
    } else if size.mode == ScalingMode::Stretch {
        FitPolicy::Stretch
    } else if fit_mode == FitMode::AddFields {
        FitPolicy::Letterbox
    } else {
        FitPolicy::Crop
    }
}

/// Animated-path policy. Letterboxing is not offered for frames, so the
/// non-stretch default is always crop.
pub fn select_frame_policy(size: &SizeSpec) -> FitPolicy {
    match select_fit_policy(size, FitMode::Crop) {
        FitPolicy::Letterbox => FitPolicy::Crop,
        policy => policy,
    }
}

/// The frame codec the imaging config asks for.
pub fn frame_codec(imaging: &ImagingConfig) -> &'static dyn FrameCodec {
    if imaging.animated_gif {
        &GifFrameCodec
    } else {
        &NoFrameCodec
    }
}

/// Generates every configured variant of one source image.
pub struct VariantJob<'a, B: ImageBackend> {
    source: SourceImage,
    config: &'a TypeConfig,
    quality: Quality,
    background: Background,
    backend: &'a B,
    codec: &'a dyn FrameCodec,
}

impl<'a, B: ImageBackend> VariantJob<'a, B> {
    pub fn new(
        source: SourceImage,
        config: &'a TypeConfig,
        imaging: &ImagingConfig,
        backend: &'a B,
        codec: &'a dyn FrameCodec,
    ) -> Self {
        Self {
            source,
            config,
            quality: imaging.quality(),
            background: imaging.background(),
            backend,
            codec,
        }
    }

    pub fn source(&self) -> &SourceImage {
        &self.source
    }

    /// Decide every variant without writing anything.
    pub fn plan(&self) -> Result<Vec<VariantPlan>, JobError> {
        let dims = self.identify_source()?;
        self.config
            .sizes
            .iter()
            .map(|(folder, size)| self.plan_variant(folder, size, dims))
            .collect()
    }

    /// Generate every variant, in folder order.
    pub fn run(&self) -> Result<Vec<GeneratedVariant>, JobError> {
        info!(
            "Generating {} variant(s) of {}",
            self.config.sizes.len(),
            self.source.full_path.display()
        );
        let dims = self.identify_source()?;

        let mut generated = Vec::with_capacity(self.config.sizes.len());
        for (folder, size) in &self.config.sizes {
            let plan = self.plan_variant(folder, size, dims)?;
            generated.push(self.execute(&plan)?);
        }

        info!(
            "Finished {}: {} variant(s) written",
            self.source.file_name,
            generated.len()
        );
        Ok(generated)
    }

    fn identify_source(&self) -> Result<(u32, u32), JobError> {
        let dims = self.backend.identify(&self.source.full_path)?;
        debug!(
            "{} is {}x{} after orientation",
            self.source.full_path.display(),
            dims.width,
            dims.height
        );
        Ok((dims.width, dims.height))
    }

    /// Decide one variant given the oriented source dimensions.
    pub fn plan_variant(
        &self,
        folder: &str,
        size: &SizeSpec,
        source_dims: (u32, u32),
    ) -> Result<VariantPlan, JobError> {
        let extension = size
            .extension
            .resolve(&self.source.extension)
            .to_ascii_lowercase();
        let animated = extension == "gif" && size.animated && self.check_animated(folder)?;

        let (width, height) = calculate_auto_dimensions(source_dims, size.width, size.height)
            .ok_or_else(|| {
                JobError::Configuration(format!(
                    "size '{folder}' needs a width or a height"
                ))
            })?;

        let fit = if animated {
            select_frame_policy(size)
        } else {
            select_fit_policy(size, self.config.fit_mode)
        };

        let format = OutputFormat::from_extension(&extension)
            .ok_or_else(|| BackendError::UnsupportedFormat(extension.clone()))?;

        let watermark = if animated {
            None
        } else {
            self.config
                .watermark
                .for_folder(folder)
                .map(|spec| WatermarkParams {
                    image: spec.image.clone(),
                    anchor: spec.position,
                    offset_x: spec.x,
                    offset_y: spec.y,
                })
        };

        let target = target_path(
            &self.config.compiled,
            folder,
            &self.source.file_name,
            width,
            height,
            &extension,
        );
        debug!("{folder}: {fit} {width}x{height} → {}", target.display());

        Ok(VariantPlan {
            folder: folder.to_string(),
            target,
            width,
            height,
            fit,
            extension,
            format,
            animated,
            watermark,
        })
    }

    /// Gatekeeping for an entry flagged animated. `Ok(false)` means the
    /// source is a plain still and the entry takes the still path.
    fn check_animated(&self, folder: &str) -> Result<bool, JobError> {
        if self.config.crop.enabled {
            return Err(JobError::Configuration(format!(
                "size '{folder}' is animated but cropping is enabled for this type; \
                 crop and animated GIF output cannot be combined"
            )));
        }
        self.codec.probe()?;

        if self.codec.is_animated(&self.source.full_path)? {
            Ok(true)
        } else {
            warn!(
                "{folder}: {} is not animated, rendering a still GIF",
                self.source.full_path.display()
            );
            Ok(false)
        }
    }

    fn execute(&self, plan: &VariantPlan) -> Result<GeneratedVariant, JobError> {
        let mut generated = GeneratedVariant {
            folder: plan.folder.clone(),
            path: plan.target.clone(),
            width: plan.width,
            height: plan.height,
            extension: plan.extension.clone(),
            fit: plan.fit,
            animated: plan.animated,
            frames: None,
            duration_ms: None,
        };

        if plan.animated {
            let summary = self.backend.render_animated(
                &AnimatedParams {
                    source: self.source.full_path.clone(),
                    output: plan.target.clone(),
                    width: plan.width,
                    height: plan.height,
                    fit: plan.fit,
                },
                self.codec,
            )?;
            info!(
                "{} → {} ({} frames, {}ms)",
                plan.folder,
                plan.target.display(),
                summary.frames,
                summary.total_duration.as_millis()
            );
            generated.frames = Some(summary.frames);
            generated.duration_ms = Some(summary.total_duration.as_millis());
        } else {
            self.backend.render(&RenderParams {
                source: self.source.full_path.clone(),
                output: plan.target.clone(),
                width: plan.width,
                height: plan.height,
                fit: plan.fit,
                format: plan.format,
                quality: self.quality,
                background: self.background,
                watermark: plan.watermark.clone(),
            })?;
            info!("{} → {}", plan.folder, plan.target.display());
        }

        Ok(generated)
    }
}
