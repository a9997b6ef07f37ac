//! EXIF capture metadata. Lives outside the digest pipeline: a failure here never fails a run.

use exif::{In, Reader, Tag, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use thiserror::Error;

use crate::types::CaptureMetadata;

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("open: {0}")]
    Io(#[from] std::io::Error),

    #[error("exif: {0}")]
    Exif(#[from] exif::Error),
}

/// Anything that can attach capture metadata to an image path.
pub trait MetadataExtractor: Send + Sync {
    fn extract(&self, path: &Path) -> Result<CaptureMetadata, MetadataError>;
}

/// Which EXIF tags feed each [`CaptureMetadata`] field, tried in order until one decodes.
///
/// Passed explicitly to [`ExifExtractor::new`]; there is no process-wide tag registry.
#[derive(Clone, Debug)]
pub struct ExifConfig {
    pub taken_tags: Vec<Tag>,
    pub camera_tags: Vec<Tag>,
    pub owner_tags: Vec<Tag>,
}

impl Default for ExifConfig {
    fn default() -> Self {
        Self {
            taken_tags: vec![Tag::DateTimeOriginal, Tag::DateTimeDigitized, Tag::DateTime],
            camera_tags: vec![Tag::Model],
            owner_tags: vec![Tag::CameraOwnerName, Tag::Artist],
        }
    }
}

/// Reads capture time, camera model and owner from the primary IFD.
pub struct ExifExtractor {
    config: ExifConfig,
}

impl ExifExtractor {
    pub fn new(config: ExifConfig) -> Self {
        Self { config }
    }

    /// Extract from an already-parsed EXIF block.
    pub fn from_exif(&self, exif: &exif::Exif) -> CaptureMetadata {
        CaptureMetadata {
            taken: self
                .config
                .taken_tags
                .iter()
                .find_map(|&tag| get_datetime(exif, tag)),
            camera: first_text(exif, &self.config.camera_tags),
            owner: first_text(exif, &self.config.owner_tags),
        }
    }
}

impl MetadataExtractor for ExifExtractor {
    fn extract(&self, path: &Path) -> Result<CaptureMetadata, MetadataError> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        match Reader::new().read_from_container(&mut reader) {
            Ok(exif) => Ok(self.from_exif(&exif)),
            // No EXIF block at all is normal for edited or exported images.
            Err(exif::Error::NotFound(_)) => Ok(CaptureMetadata::default()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Extractor that attaches nothing. Used when metadata is turned off.
pub struct NoMetadata;

impl MetadataExtractor for NoMetadata {
    fn extract(&self, _path: &Path) -> Result<CaptureMetadata, MetadataError> {
        Ok(CaptureMetadata::default())
    }
}

fn first_text(exif: &exif::Exif, tags: &[Tag]) -> Option<String> {
    tags.iter().find_map(|&tag| get_string(exif, tag))
}

/// Get a string field, trimmed of padding and NULs. Blank values count as absent.
fn get_string(exif: &exif::Exif, tag: Tag) -> Option<String> {
    let field = exif.get_field(tag, In::PRIMARY)?;
    let s = match &field.value {
        Value::Ascii(parts) => parts
            .iter()
            .map(|p| String::from_utf8_lossy(p).into_owned())
            .find(|p| !p.trim().is_empty())?,
        _ => field.display_value().to_string(),
    };
    let s = s.trim_matches(|c: char| c == '\0' || c == '"' || c.is_whitespace());
    (!s.is_empty()).then(|| s.to_string())
}

/// Decode an EXIF `YYYY:MM:DD HH:MM:SS` field. Present only if it parses.
fn get_datetime(exif: &exif::Exif, tag: Tag) -> Option<String> {
    let field = exif.get_field(tag, In::PRIMARY)?;
    let Value::Ascii(parts) = &field.value else {
        return None;
    };
    let dt = exif::DateTime::from_ascii(parts.first()?).ok()?;
    Some(format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}",
        dt.year, dt.month, dt.day, dt.hour, dt.minute, dt.second
    ))
}
