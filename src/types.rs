//! Shared types passed into and out of a variant job.

use crate::imaging::FitPolicy;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// The uploaded file a job works on. Immutable for the job's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceImage {
    pub full_path: PathBuf,
    /// File stem, used as the output name prefix.
    pub file_name: String,
    /// Lowercase extension without the dot.
    pub extension: String,
}

impl SourceImage {
    pub fn new(
        full_path: impl Into<PathBuf>,
        file_name: impl Into<String>,
        extension: impl Into<String>,
    ) -> Self {
        Self {
            full_path: full_path.into(),
            file_name: file_name.into(),
            extension: extension.into().to_ascii_lowercase(),
        }
    }

    /// Derive stem and extension from the path. `None` if either is missing.
    pub fn from_path(path: &Path) -> Option<Self> {
        let stem = path.file_stem()?.to_str()?;
        let ext = path.extension()?.to_str()?;
        if stem.is_empty() || ext.is_empty() {
            return None;
        }
        Some(Self::new(path, stem, ext))
    }
}

/// One variant written by a job run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedVariant {
    pub folder: String,
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub extension: String,
    pub fit: FitPolicy,
    pub animated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frames: Option<usize>,
    /// Total playback time of an animated variant.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u128>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_path_splits_stem_and_extension() {
        let source = SourceImage::from_path(Path::new("/uploads/Photo.JPG")).unwrap();
        assert_eq!(source.file_name, "Photo");
        assert_eq!(source.extension, "jpg");
        assert_eq!(source.full_path, PathBuf::from("/uploads/Photo.JPG"));
    }

    #[test]
    fn from_path_keeps_inner_dots_in_stem() {
        let source = SourceImage::from_path(Path::new("a.b.png")).unwrap();
        assert_eq!(source.file_name, "a.b");
        assert_eq!(source.extension, "png");
    }

    #[test]
    fn from_path_requires_extension() {
        assert!(SourceImage::from_path(Path::new("/uploads/photo")).is_none());
        assert!(SourceImage::from_path(Path::new("/uploads/.hidden")).is_none());
    }

    #[test]
    fn generated_variant_omits_frames_for_stills() {
        let variant = GeneratedVariant {
            folder: "thumb".into(),
            path: "out/thumb/a-10x10.png".into(),
            width: 10,
            height: 10,
            extension: "png".into(),
            fit: FitPolicy::Crop,
            animated: false,
            frames: None,
            duration_ms: None,
        };
        let json = serde_json::to_value(&variant).unwrap();
        assert_eq!(json["fit"], "crop");
        assert!(json.get("frames").is_none());
    }
}
