//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the three operations the variant job
//! needs: identify, render (still variant), and render_animated (every frame
//! of an animated GIF through the same transform).
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate. Frame extraction and reassembly for animations are delegated to a
//! [`FrameCodec`](super::animation::FrameCodec) passed in by the caller.

use super::animation::FrameCodec;
use super::params::{AnimatedParams, RenderParams};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to decode {path}: {message}")]
    Decode { path: String, message: String },
    #[error("Failed to encode {path}: {message}")]
    Encode { path: String, message: String },
    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Result of an identify operation (orientation already applied).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// What an animated render wrote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationSummary {
    pub frames: usize,
    pub total_duration: Duration,
}

/// Trait for image processing backends.
///
/// Implementations write the output file themselves and replace whatever
/// already exists at the output path.
pub trait ImageBackend: Sync {
    /// Get display dimensions, with EXIF orientation taken into account.
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Decode, orient, fit, optionally watermark, encode.
    fn render(&self, params: &RenderParams) -> Result<(), BackendError>;

    /// Resize every frame of an animation, keeping per-frame timing.
    fn render_animated(
        &self,
        params: &AnimatedParams,
        codec: &dyn FrameCodec,
    ) -> Result<AnimationSummary, BackendError>;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::imaging::params::{FitPolicy, OutputFormat};
    use std::sync::Mutex;

    /// Mock backend that records operations without executing them.
    #[derive(Default)]
    pub struct MockBackend {
        pub identify_results: Mutex<Vec<Dimensions>>,
        pub operations: Mutex<Vec<RecordedOp>>,
        /// Fail the render whose output path ends with this suffix.
        pub fail_on: Option<String>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedOp {
        Identify(String),
        Render {
            output: String,
            width: u32,
            height: u32,
            fit: FitPolicy,
            format: OutputFormat,
            watermark: Option<String>,
        },
        RenderAnimated {
            output: String,
            width: u32,
            height: u32,
            fit: FitPolicy,
            codec: String,
        },
    }

    impl MockBackend {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_dimensions(dims: Vec<Dimensions>) -> Self {
            Self {
                identify_results: Mutex::new(dims),
                ..Self::default()
            }
        }

        pub fn failing_on(dims: Vec<Dimensions>, suffix: &str) -> Self {
            Self {
                identify_results: Mutex::new(dims),
                fail_on: Some(suffix.to_string()),
                ..Self::default()
            }
        }

        pub fn get_operations(&self) -> Vec<RecordedOp> {
            self.operations.lock().unwrap().clone()
        }

        fn check_failure(&self, output: &Path) -> Result<(), BackendError> {
            match &self.fail_on {
                Some(suffix) if output.to_string_lossy().ends_with(suffix.as_str()) => Err(
                    BackendError::ProcessingFailed(format!("mock failure for {suffix}")),
                ),
                _ => Ok(()),
            }
        }
    }

    impl ImageBackend for MockBackend {
        fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
            self.operations
                .lock()
                .unwrap()
                .push(RecordedOp::Identify(path.to_string_lossy().to_string()));

            self.identify_results
                .lock()
                .unwrap()
                .pop()
                .ok_or_else(|| BackendError::ProcessingFailed("No mock dimensions".to_string()))
        }

        fn render(&self, params: &RenderParams) -> Result<(), BackendError> {
            self.check_failure(&params.output)?;
            self.operations.lock().unwrap().push(RecordedOp::Render {
                output: params.output.to_string_lossy().to_string(),
                width: params.width,
                height: params.height,
                fit: params.fit,
                format: params.format,
                watermark: params
                    .watermark
                    .as_ref()
                    .map(|w| w.image.to_string_lossy().to_string()),
            });
            Ok(())
        }

        fn render_animated(
            &self,
            params: &AnimatedParams,
            codec: &dyn FrameCodec,
        ) -> Result<AnimationSummary, BackendError> {
            self.check_failure(&params.output)?;
            self.operations
                .lock()
                .unwrap()
                .push(RecordedOp::RenderAnimated {
                    output: params.output.to_string_lossy().to_string(),
                    width: params.width,
                    height: params.height,
                    fit: params.fit,
                    codec: codec.name().to_string(),
                });
            Ok(AnimationSummary {
                frames: 0,
                total_duration: Duration::ZERO,
            })
        }
    }

    #[test]
    fn mock_records_identify() {
        let backend = MockBackend::with_dimensions(vec![Dimensions {
            width: 800,
            height: 600,
        }]);

        let result = backend.identify(Path::new("/test/image.jpg")).unwrap();
        assert_eq!(result.width, 800);
        assert_eq!(result.height, 600);

        let ops = backend.get_operations();
        assert_eq!(ops.len(), 1);
        assert!(matches!(&ops[0], RecordedOp::Identify(p) if p == "/test/image.jpg"));
    }

    #[test]
    fn mock_fails_on_matching_output() {
        let backend = MockBackend::failing_on(vec![], "b.png");
        let params = |output: &str| RenderParams {
            source: "/src.png".into(),
            output: output.into(),
            width: 10,
            height: 10,
            fit: FitPolicy::Crop,
            format: OutputFormat::Png,
            quality: Default::default(),
            background: Default::default(),
            watermark: None,
        };

        assert!(backend.render(&params("/out/a.png")).is_ok());
        assert!(backend.render(&params("/out/b.png")).is_err());
        assert_eq!(backend.get_operations().len(), 1);
    }
}
