//! # Image Variants
//!
//! Turns one uploaded image into a set of derived files (thumbnails, crop
//! fits, letterboxed fits, stretched fits, watermarked copies, resized
//! animated GIFs) driven entirely by a declarative size config.
//!
//! # Flow
//!
//! ```text
//! image-variants.toml ─┐
//!                      ├─→ VariantJob ─→ <compiled>/<folder>/<name>-<w>x<h>.<ext>
//! source image ────────┘        │
//!                               ├─ ImageBackend  (decode, orient, fit, watermark, encode)
//!                               └─ FrameCodec    (split / reassemble animated GIFs)
//! ```
//!
//! A job runs one size entry at a time on the calling thread. It owns no
//! retry or scheduling logic: the first error is returned as a [`job::JobError`],
//! and [`job::JobError::is_retryable`] tells a host queue whether trying again
//! could help.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | `image-variants.toml` loading, stock defaults, merging, validation |
//! | [`types`] | Job input and output types (`SourceImage`, `GeneratedVariant`) |
//! | [`job`] | Per-entry decisions (extension, animation, fit policy, target path) and execution |
//! | [`imaging`] | Pure-Rust image operations on the `image` crate, plus the GIF frame codec |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## One Fit Policy per Variant
//!
//! Every size entry maps to exactly one [`imaging::FitPolicy`]
//! (auto-aspect, stretch, letterbox, crop), chosen up front by
//! [`job::select_fit_policy`] and dispatched in a single match in the backend.
//! Animated entries use [`job::select_frame_policy`], which never letterboxes.
//!
//! ## Injected Animation Support
//!
//! Animated GIF handling sits behind [`imaging::FrameCodec`]. The job is built
//! with either the real [`imaging::GifFrameCodec`] or the
//! [`imaging::NoFrameCodec`] stub, whose probe fails before any frame is
//! decoded. Nothing is discovered at runtime.
//!
//! ## Explicit Output Base
//!
//! Every type names its own `compiled` directory. Relative paths in the config
//! are resolved against the config file's directory at load time, never
//! against the process working directory.
//!
//! ## Overwrite in Place
//!
//! Targets are rewritten on every run with no staleness check. Output is
//! deterministic, so re-running a job after a host-side retry produces the
//! same files at the same paths.

pub mod config;
pub mod imaging;
pub mod job;
pub mod output;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
