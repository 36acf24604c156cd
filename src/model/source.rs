//! Image and overlay source inputs.

use std::sync::Arc;

use thiserror::Error;

/// Which volume slot a source is meant for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceSlot {
    Image,
    Overlay,
}

impl std::fmt::Display for SourceSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceSlot::Image => write!(f, "image"),
            SourceSlot::Overlay => write!(f, "overlay"),
        }
    }
}

/// Errors from validating a source input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// A URL and a file were both supplied for the same slot
    #[error("Both a URL and a file were provided for the {slot}")]
    BothProvided { slot: SourceSlot },

    /// No base image was supplied
    #[error("No image source provided")]
    MissingImage,

    /// URL is neither http(s) nor a root-relative path
    #[error("Unsupported URL '{url}': expected http(s) or a root-relative path")]
    UnsupportedScheme { url: String },

    /// No bundled sample with this id
    #[error("Unknown sample '{id}'")]
    UnknownSample { id: String },
}

/// An in-memory file picked by the user.
#[derive(Clone, PartialEq, Eq)]
pub struct VolumeFile {
    /// Original file name, e.g. `brain.nii.gz`
    pub name: String,
    /// Raw (possibly compressed) file contents
    pub bytes: Arc<[u8]>,
}

impl VolumeFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

// File contents are left out so log lines stay readable.
impl std::fmt::Debug for VolumeFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VolumeFile")
            .field("name", &self.name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// A validated volume source: exactly one representation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VolumeSource {
    Url(String),
    File(VolumeFile),
}

impl VolumeSource {
    /// Human-readable label (URL or file name).
    pub fn label(&self) -> &str {
        match self {
            VolumeSource::Url(url) => url,
            VolumeSource::File(file) => &file.name,
        }
    }
}

/// Raw input for one slot as collected by the UI.
///
/// A blank URL counts as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceInput {
    pub url: Option<String>,
    pub file: Option<VolumeFile>,
}

impl SourceInput {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            file: None,
        }
    }

    pub fn file(file: VolumeFile) -> Self {
        Self {
            url: None,
            file: Some(file),
        }
    }

    /// Validate as "URL xor file xor absent".
    pub fn resolve(self, slot: SourceSlot) -> Result<Option<VolumeSource>, SourceError> {
        let url = self
            .url
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty());

        match (url, self.file) {
            (Some(_), Some(_)) => Err(SourceError::BothProvided { slot }),
            (Some(url), None) => {
                if is_supported_url(&url) {
                    Ok(Some(VolumeSource::Url(url)))
                } else {
                    Err(SourceError::UnsupportedScheme { url })
                }
            }
            (None, Some(file)) => Ok(Some(VolumeSource::File(file))),
            (None, None) => Ok(None),
        }
    }
}

impl From<VolumeSource> for SourceInput {
    fn from(source: VolumeSource) -> Self {
        match source {
            VolumeSource::Url(url) => SourceInput::url(url),
            VolumeSource::File(file) => SourceInput::file(file),
        }
    }
}

fn is_supported_url(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://") || url.starts_with('/')
}
