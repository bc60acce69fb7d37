//! Animated GIF frame capability.
//!
//! Animated variants need two things the still pipeline does not: splitting a
//! GIF into full-canvas frames with their delays, and stitching processed
//! frames back into a looping GIF. Both live behind [`FrameCodec`] so the
//! capability is injected when the job is built:
//!
//! - [`GifFrameCodec`] — the real implementation on `image::codecs::gif`.
//! - [`NoFrameCodec`] — stands in when animation support is switched off; its
//!   [`probe`](FrameCodec::probe) fails before any frame is touched.

use super::backend::BackendError;
use image::codecs::gif::{GifDecoder, GifEncoder, Repeat};
use image::{AnimationDecoder, Frame, ImageFormat, ImageReader};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use thiserror::Error;

/// The runtime cannot extract or reassemble animation frames.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct MissingCapability(pub String);

/// Frame extraction and reassembly for animated images.
pub trait FrameCodec: Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Fails fast when this codec cannot do any work.
    fn probe(&self) -> Result<(), MissingCapability>;

    /// Whether the file really holds more than one frame.
    fn is_animated(&self, path: &Path) -> Result<bool, BackendError>;

    /// Decode every frame as a full-canvas RGBA image with its delay.
    fn extract(&self, path: &Path) -> Result<Vec<Frame>, BackendError>;

    /// Encode frames into one GIF that loops forever.
    fn assemble(&self, frames: Vec<Frame>) -> Result<Vec<u8>, BackendError>;
}

fn open_gif(path: &Path) -> Result<GifDecoder<BufReader<File>>, BackendError> {
    let file = File::open(path)?;
    GifDecoder::new(BufReader::new(file)).map_err(|e| BackendError::Decode {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// NeuQuant sampling speed for re-encoded frames (1 = slowest, 30 = fastest).
const GIF_ENCODE_SPEED: i32 = 10;

/// GIF frame codec backed by the `image` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct GifFrameCodec;

impl FrameCodec for GifFrameCodec {
    fn name(&self) -> &str {
        "gif"
    }

    fn probe(&self) -> Result<(), MissingCapability> {
        if ImageFormat::Gif.reading_enabled() && ImageFormat::Gif.writing_enabled() {
            Ok(())
        } else {
            Err(MissingCapability(
                "GIF decoding and encoding must both be compiled in".into(),
            ))
        }
    }

    fn is_animated(&self, path: &Path) -> Result<bool, BackendError> {
        let format = ImageReader::open(path)?.with_guessed_format()?.format();
        if format != Some(ImageFormat::Gif) {
            return Ok(false);
        }

        let mut frames = open_gif(path)?.into_frames();
        let decode_err = |e: image::ImageError| BackendError::Decode {
            path: path.display().to_string(),
            message: e.to_string(),
        };
        let first = frames.next().transpose().map_err(decode_err)?;
        let second = frames.next().transpose().map_err(decode_err)?;
        Ok(first.is_some() && second.is_some())
    }

    fn extract(&self, path: &Path) -> Result<Vec<Frame>, BackendError> {
        open_gif(path)?
            .into_frames()
            .collect_frames()
            .map_err(|e| BackendError::Decode {
                path: path.display().to_string(),
                message: e.to_string(),
            })
    }

    fn assemble(&self, frames: Vec<Frame>) -> Result<Vec<u8>, BackendError> {
        let encode_err = |e: image::ImageError| BackendError::Encode {
            path: "<animated gif>".to_string(),
            message: e.to_string(),
        };

        let mut bytes = Vec::new();
        {
            // The trailer is written when the encoder drops.
            let mut encoder = GifEncoder::new_with_speed(&mut bytes, GIF_ENCODE_SPEED);
            encoder.set_repeat(Repeat::Infinite).map_err(encode_err)?;
            encoder.encode_frames(frames).map_err(encode_err)?;
        }
        Ok(bytes)
    }
}

/// Placeholder used when animated GIF support is disabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoFrameCodec;

const NO_FRAMES: &str = "animated GIF resizing is disabled; set `imaging.animated_gif = true` \
                         or drop the \"animated\" flag from the size entry";

impl FrameCodec for NoFrameCodec {
    fn name(&self) -> &str {
        "none"
    }

    fn probe(&self) -> Result<(), MissingCapability> {
        Err(MissingCapability(NO_FRAMES.to_string()))
    }

    fn is_animated(&self, _path: &Path) -> Result<bool, BackendError> {
        Err(BackendError::ProcessingFailed(NO_FRAMES.to_string()))
    }

    fn extract(&self, _path: &Path) -> Result<Vec<Frame>, BackendError> {
        Err(BackendError::ProcessingFailed(NO_FRAMES.to_string()))
    }

    fn assemble(&self, _frames: Vec<Frame>) -> Result<Vec<u8>, BackendError> {
        Err(BackendError::ProcessingFailed(NO_FRAMES.to_string()))
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::test_helpers::{create_test_animated_gif, create_test_png};
    use image::{Delay, RgbaImage};
    use std::time::Duration;

    /// Codec double that reports a fixed animation answer and records nothing.
    pub struct MockCodec {
        pub animated: bool,
    }

    impl FrameCodec for MockCodec {
        fn name(&self) -> &str {
            "mock"
        }

        fn probe(&self) -> Result<(), MissingCapability> {
            Ok(())
        }

        fn is_animated(&self, _path: &Path) -> Result<bool, BackendError> {
            Ok(self.animated)
        }

        fn extract(&self, _path: &Path) -> Result<Vec<Frame>, BackendError> {
            Ok(Vec::new())
        }

        fn assemble(&self, _frames: Vec<Frame>) -> Result<Vec<u8>, BackendError> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn gif_codec_probe_succeeds() {
        assert!(GifFrameCodec.probe().is_ok());
    }

    #[test]
    fn no_codec_probe_fails() {
        let err = NoFrameCodec.probe().unwrap_err();
        assert!(err.0.contains("animated GIF"));
    }

    #[test]
    fn detects_animated_gif() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("anim.gif");
        create_test_animated_gif(&path, 40, 30, &[100, 200, 300]);

        assert!(GifFrameCodec.is_animated(&path).unwrap());
    }

    #[test]
    fn single_frame_gif_is_not_animated() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("still.gif");
        create_test_animated_gif(&path, 40, 30, &[100]);

        assert!(!GifFrameCodec.is_animated(&path).unwrap());
    }

    #[test]
    fn png_is_not_animated() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("still.png");
        create_test_png(&path, 40, 30);

        assert!(!GifFrameCodec.is_animated(&path).unwrap());
    }

    #[test]
    fn extract_keeps_frame_count_and_delays() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("anim.gif");
        create_test_animated_gif(&path, 40, 30, &[100, 200, 300]);

        let frames = GifFrameCodec.extract(&path).unwrap();
        assert_eq!(frames.len(), 3);
        let delays: Vec<Duration> = frames.iter().map(|f| Duration::from(f.delay())).collect();
        assert_eq!(
            delays,
            vec![
                Duration::from_millis(100),
                Duration::from_millis(200),
                Duration::from_millis(300)
            ]
        );
        assert_eq!(frames[0].buffer().dimensions(), (40, 30));
    }

    #[test]
    fn assemble_produces_decodable_gif() {
        let frames: Vec<Frame> = (0..4)
            .map(|i| {
                let buf = RgbaImage::from_pixel(8, 8, image::Rgba([i * 60, 0, 0, 255]));
                Frame::from_parts(buf, 0, 0, Delay::from_numer_denom_ms(50, 1))
            })
            .collect();

        let bytes = GifFrameCodec.assemble(frames).unwrap();
        let decoder = GifDecoder::new(std::io::Cursor::new(bytes)).unwrap();
        let decoded = decoder.into_frames().collect_frames().unwrap();
        assert_eq!(decoded.len(), 4);
    }

    #[test]
    fn assemble_keeps_flat_colors_and_delays() {
        let colors = [[255u8, 0, 0], [0, 0, 255]];
        let frames: Vec<Frame> = colors
            .iter()
            .map(|&[r, g, b]| {
                let buf = RgbaImage::from_pixel(16, 16, image::Rgba([r, g, b, 255]));
                Frame::from_parts(buf, 0, 0, Delay::from_numer_denom_ms(120, 1))
            })
            .collect();

        let bytes = GifFrameCodec.assemble(frames).unwrap();
        let decoded = GifDecoder::new(std::io::Cursor::new(bytes))
            .unwrap()
            .into_frames()
            .collect_frames()
            .unwrap();

        assert_eq!(decoded.len(), 2);
        let first = decoded[0].buffer().get_pixel(8, 8);
        let second = decoded[1].buffer().get_pixel(8, 8);
        assert!(first[0] > 240 && first[2] < 15);
        assert!(second[2] > 240 && second[0] < 15);
        for frame in &decoded {
            assert_eq!(Duration::from(frame.delay()), Duration::from_millis(120));
        }
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = GifFrameCodec.extract(Path::new("/nonexistent/anim.gif"));
        assert!(matches!(result, Err(BackendError::Io(_))));
    }
}
