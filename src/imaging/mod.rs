//! Image processing — pure Rust on the `image` crate.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | decoder header + EXIF orientation |
//! | **Fit** | `resize_exact`, `crop_imm`, `imageops::overlay` |
//! | **Watermark** | `imageops::overlay` at an anchored position |
//! | **Animated GIF** | `GifDecoder::into_frames` → per-frame fit → `GifEncoder` |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension and placement math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Animation**: [`FrameCodec`] capability + [`GifFrameCodec`] / [`NoFrameCodec`]

pub mod animation;
pub mod backend;
mod calculations;
mod params;
pub mod rust_backend;

pub use animation::{FrameCodec, GifFrameCodec, MissingCapability, NoFrameCodec};
pub use backend::{AnimationSummary, BackendError, Dimensions, ImageBackend};
pub use calculations::{
    Placement, calculate_anchor_position, calculate_auto_dimensions, calculate_letterbox,
};
pub use params::{
    AnimatedParams, Anchor, Background, FitPolicy, OutputFormat, Quality, RenderParams,
    WatermarkParams,
};
pub use rust_backend::RustBackend;
