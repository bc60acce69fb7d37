//! Shared test utilities: synthetic source images written to disk.
//!
//! Every helper writes a small, fully valid file so tests exercise the real
//! decoders instead of fixtures checked into the repo.

use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame, ImageEncoder, Rgb, RgbImage, Rgba, RgbaImage};
use std::path::Path;

// =========================================================================
// Still images
// =========================================================================

/// Create a gradient JPEG with the given dimensions.
pub fn create_test_jpeg(path: &Path, width: u32, height: u32) {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let file = std::fs::File::create(path).unwrap();
    let writer = std::io::BufWriter::new(file);
    image::codecs::jpeg::JpegEncoder::new(writer)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
}

/// Create an opaque gradient PNG.
pub fn create_test_png(path: &Path, width: u32, height: u32) {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x % 256) as u8, (y % 256) as u8, 64, 255])
    });
    img.save_with_format(path, image::ImageFormat::Png).unwrap();
}

/// Create a fully transparent PNG.
pub fn create_transparent_png(path: &Path, width: u32, height: u32) {
    let img = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0]));
    img.save_with_format(path, image::ImageFormat::Png).unwrap();
}

/// Create a solid-color opaque PNG (used as a watermark).
pub fn create_solid_png(path: &Path, width: u32, height: u32, color: [u8; 3]) {
    let img = RgbaImage::from_pixel(width, height, Rgba([color[0], color[1], color[2], 255]));
    img.save_with_format(path, image::ImageFormat::Png).unwrap();
}

/// Create a JPEG carrying an EXIF orientation tag (1-8).
///
/// Stored pixels are red on the left half and blue on the right, so the
/// applied rotation shows up in where each color lands. The APP1 segment is spliced in right after SOI: a little-endian TIFF
/// header with a single IFD0 entry for tag 0x0112.
pub fn create_oriented_jpeg(path: &Path, width: u32, height: u32, orientation: u16) {
    let img = RgbImage::from_fn(width, height, |x, _| {
        if x < width / 2 {
            Rgb([255, 0, 0])
        } else {
            Rgb([0, 0, 255])
        }
    });
    let mut jpeg = Vec::new();
    image::codecs::jpeg::JpegEncoder::new(&mut jpeg)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();

    let mut tiff: Vec<u8> = Vec::new();
    tiff.extend_from_slice(b"II");
    tiff.extend_from_slice(&42u16.to_le_bytes());
    tiff.extend_from_slice(&8u32.to_le_bytes());
    tiff.extend_from_slice(&1u16.to_le_bytes());
    tiff.extend_from_slice(&0x0112u16.to_le_bytes());
    tiff.extend_from_slice(&3u16.to_le_bytes());
    tiff.extend_from_slice(&1u32.to_le_bytes());
    tiff.extend_from_slice(&orientation.to_le_bytes());
    tiff.extend_from_slice(&[0, 0]);
    tiff.extend_from_slice(&0u32.to_le_bytes());

    let mut payload = b"Exif\0\0".to_vec();
    payload.extend_from_slice(&tiff);

    let mut segment = vec![0xFF, 0xE1];
    segment.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
    segment.extend_from_slice(&payload);

    jpeg.splice(2..2, segment);
    std::fs::write(path, jpeg).unwrap();
}

// =========================================================================
// Animated images
// =========================================================================

/// Create a GIF with one frame per delay (milliseconds). Loops forever.
pub fn create_test_animated_gif(path: &Path, width: u32, height: u32, delays_ms: &[u32]) {
    let frames: Vec<Frame> = delays_ms
        .iter()
        .enumerate()
        .map(|(i, &ms)| {
            let shade = ((i * 70) % 256) as u8;
            let buf = RgbaImage::from_fn(width, height, |x, _| {
                Rgba([shade, (x % 256) as u8, 255 - shade, 255])
            });
            Frame::from_parts(buf, 0, 0, Delay::from_numer_denom_ms(ms, 1))
        })
        .collect();

    let file = std::fs::File::create(path).unwrap();
    let mut encoder = GifEncoder::new(std::io::BufWriter::new(file));
    encoder.set_repeat(Repeat::Infinite).unwrap();
    encoder.encode_frames(frames).unwrap();
}
