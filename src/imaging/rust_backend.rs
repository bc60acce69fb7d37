//! Pure Rust image processing backend built on the `image` crate.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, GIF, TIFF, WebP) | `image::ImageReader` with format sniffing |
//! | Orientation | `ImageDecoder::orientation` + `DynamicImage::apply_orientation` |
//! | Auto-aspect / stretch | `DynamicImage::resize_exact` with `Lanczos3` |
//! | Crop fit | fill resize + centered `crop_imm` |
//! | Letterbox | scaled copy `overlay`ed on a background canvas |
//! | Watermark | `image::imageops::overlay` at the anchored position |
//! | Encode → JPEG | `JpegEncoder::new_with_quality` |
//! | Encode → AVIF | `AvifEncoder` (rav1e, speed 6) |
//! | Encode → PNG / GIF / WebP / TIFF | `DynamicImage::write_to` |

use super::animation::FrameCodec;
use super::backend::{AnimationSummary, BackendError, Dimensions, ImageBackend};
use super::calculations::{
    calculate_anchor_position, calculate_center_crop, calculate_fill_dimensions,
    calculate_letterbox,
};
use super::params::{
    AnimatedParams, Background, FitPolicy, OutputFormat, RenderParams, WatermarkParams,
};
use image::imageops::{self, FilterType};
use image::metadata::Orientation;
use image::{DynamicImage, Frame, ImageDecoder, ImageFormat, ImageReader, RgbaImage};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Duration;

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn decode_error(path: &Path, e: image::ImageError) -> BackendError {
    BackendError::Decode {
        path: path.display().to_string(),
        message: e.to_string(),
    }
}

fn encode_error(path: &Path, e: image::ImageError) -> BackendError {
    BackendError::Encode {
        path: path.display().to_string(),
        message: e.to_string(),
    }
}

fn swaps_axes(orientation: Orientation) -> bool {
    matches!(
        orientation,
        Orientation::Rotate90
            | Orientation::Rotate270
            | Orientation::Rotate90FlipH
            | Orientation::Rotate270FlipH
    )
}

/// Load and decode an image from disk, with EXIF orientation applied.
fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    let mut decoder = ImageReader::open(path)?
        .with_guessed_format()?
        .into_decoder()
        .map_err(|e| decode_error(path, e))?;
    let orientation = decoder.orientation().unwrap_or(Orientation::NoTransforms);
    let mut img = DynamicImage::from_decoder(decoder).map_err(|e| decode_error(path, e))?;
    img.apply_orientation(orientation);
    Ok(img)
}

fn resize_to(img: DynamicImage, width: u32, height: u32) -> DynamicImage {
    if img.width() == width && img.height() == height {
        img
    } else {
        img.resize_exact(width, height, FilterType::Lanczos3)
    }
}

/// Composite onto an opaque canvas so nothing is lost when alpha is dropped.
fn flatten(img: &DynamicImage, background: Background) -> DynamicImage {
    let mut canvas = RgbaImage::from_pixel(img.width(), img.height(), background.rgba());
    imageops::overlay(&mut canvas, &img.to_rgba8(), 0, 0);
    DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(canvas).to_rgb8())
}

/// Apply one fit policy, producing exactly `width`x`height` pixels.
fn apply_fit(
    img: DynamicImage,
    fit: FitPolicy,
    width: u32,
    height: u32,
    background: Background,
) -> DynamicImage {
    match fit {
        FitPolicy::AutoAspect | FitPolicy::Stretch => resize_to(img, width, height),
        FitPolicy::Crop => {
            let (fill_w, fill_h) =
                calculate_fill_dimensions((img.width(), img.height()), (width, height));
            let filled = resize_to(img, fill_w, fill_h);
            let (x, y) = calculate_center_crop((fill_w, fill_h), (width, height));
            filled.crop_imm(x, y, width, height)
        }
        FitPolicy::Letterbox => {
            let placement = calculate_letterbox((img.width(), img.height()), (width, height));
            let scaled = resize_to(img, placement.width, placement.height);
            let mut canvas = RgbaImage::from_pixel(width, height, background.rgba());
            imageops::overlay(&mut canvas, &scaled.to_rgba8(), placement.x, placement.y);
            DynamicImage::ImageRgba8(canvas)
        }
    }
}

fn apply_watermark(
    img: DynamicImage,
    watermark: &WatermarkParams,
) -> Result<DynamicImage, BackendError> {
    let mark = load_image(&watermark.image)?.to_rgba8();
    let mut canvas = img.to_rgba8();
    let (x, y) = calculate_anchor_position(
        canvas.dimensions(),
        mark.dimensions(),
        watermark.anchor,
        (watermark.offset_x, watermark.offset_y),
    );
    imageops::overlay(&mut canvas, &mark, x, y);
    Ok(DynamicImage::ImageRgba8(canvas))
}

/// Encode `img` to `path`, replacing any existing file.
fn save_image(
    img: &DynamicImage,
    path: &Path,
    format: OutputFormat,
    quality: u32,
) -> Result<(), BackendError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    let result = match format {
        OutputFormat::Jpeg => {
            let encoder =
                image::codecs::jpeg::JpegEncoder::new_with_quality(&mut writer, quality as u8);
            DynamicImage::ImageRgb8(img.to_rgb8()).write_with_encoder(encoder)
        }
        OutputFormat::Avif => {
            let encoder = image::codecs::avif::AvifEncoder::new_with_speed_quality(
                &mut writer,
                6,
                quality as u8,
            );
            DynamicImage::ImageRgba8(img.to_rgba8()).write_with_encoder(encoder)
        }
        OutputFormat::Png => img.write_to(&mut writer, ImageFormat::Png),
        OutputFormat::Gif => {
            DynamicImage::ImageRgba8(img.to_rgba8()).write_to(&mut writer, ImageFormat::Gif)
        }
        OutputFormat::WebP => {
            DynamicImage::ImageRgba8(img.to_rgba8()).write_to(&mut writer, ImageFormat::WebP)
        }
        OutputFormat::Tiff => img.write_to(&mut writer, ImageFormat::Tiff),
    };
    result.map_err(|e| encode_error(path, e))?;
    writer.flush()?;
    Ok(())
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        let mut decoder = ImageReader::open(path)?
            .with_guessed_format()?
            .into_decoder()
            .map_err(|e| decode_error(path, e))?;
        let (width, height) = decoder.dimensions();
        let orientation = decoder.orientation().unwrap_or(Orientation::NoTransforms);
        if swaps_axes(orientation) {
            Ok(Dimensions {
                width: height,
                height: width,
            })
        } else {
            Ok(Dimensions { width, height })
        }
    }

    fn render(&self, params: &RenderParams) -> Result<(), BackendError> {
        let mut img = load_image(&params.source)?;

        if !params.format.has_alpha() {
            img = flatten(&img, params.background);
        }

        let mut img = apply_fit(
            img,
            params.fit,
            params.width,
            params.height,
            params.background,
        );

        if let Some(watermark) = &params.watermark {
            img = apply_watermark(img, watermark)?;
        }

        save_image(&img, &params.output, params.format, params.quality.value())
    }

    fn render_animated(
        &self,
        params: &AnimatedParams,
        codec: &dyn FrameCodec,
    ) -> Result<AnimationSummary, BackendError> {
        let frames = codec.extract(&params.source)?;

        let mut processed = Vec::with_capacity(frames.len());
        let mut total_duration = Duration::ZERO;
        for frame in frames {
            let delay = frame.delay();
            total_duration += Duration::from(delay);
            let fitted = apply_fit(
                DynamicImage::ImageRgba8(frame.into_buffer()),
                params.fit,
                params.width,
                params.height,
                Background::default(),
            );
            processed.push(Frame::from_parts(fitted.to_rgba8(), 0, 0, delay));
        }

        let summary = AnimationSummary {
            frames: processed.len(),
            total_duration,
        };
        let bytes = codec.assemble(processed)?;

        if let Some(parent) = params.output.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&params.output, bytes)?;
        Ok(summary)
    }
}
