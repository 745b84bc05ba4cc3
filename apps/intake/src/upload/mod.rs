// Upload Controller
// Implements: file validation, drop zone highlight state, single-slot file selection.
// Nothing in here touches the network; the slot is read by the submission controller.

pub mod controller;
pub mod drop_zone;
pub mod slot;

use std::fmt;
use std::path::{Path, PathBuf};

use crate::errors::ValidationError;

pub use controller::{UploadController, UploadEffect};
pub use drop_zone::{DragEvent, DragResponse, DropZone, EventTarget};
pub use slot::{FileSlot, InputValue, InputView, Origin, TransferSupport};

/// Largest accepted bill: 16 MiB, inclusive.
pub const MAX_FILE_BYTES: u64 = 16 * 1024 * 1024;

/// Accepted extensions, compared lowercased.
pub const ALLOWED_EXTENSIONS: &[&str] = &["pdf", "jpg", "jpeg", "png"];

pub const READY_COLOR: &str = "#5cb85c";
pub const ALERT_COLOR: &str = "#d9534f";

// ────────────────────────────────────────────────────────────────────────────
// Selected file
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
enum FileContent {
    Bytes(Vec<u8>),
    Path(PathBuf),
}

/// The file currently chosen by the user. Replaced on every selection or drop.
///
/// Files picked from disk keep only their path; bytes are read when the request is built,
/// so an oversize file is rejected from its metadata alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub byte_size: u64,
    pub extension: String,
    content: FileContent,
}

impl SelectedFile {
    /// Builds a file from in-memory content (drops, tests).
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let name = name.into();
        Self {
            extension: extension_of(&name),
            byte_size: bytes.len() as u64,
            name,
            content: FileContent::Bytes(bytes),
        }
    }

    /// Stats a file on disk without reading it.
    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let metadata = tokio::fs::metadata(path).await?;
        if !metadata.is_file() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("{} is not a regular file", path.display()),
            ));
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self {
            extension: extension_of(&name),
            byte_size: metadata.len(),
            name,
            content: FileContent::Path(path.to_path_buf()),
        })
    }

    /// Loads the file body for the multipart request.
    pub async fn read_bytes(&self) -> std::io::Result<Vec<u8>> {
        match &self.content {
            FileContent::Bytes(bytes) => Ok(bytes.clone()),
            FileContent::Path(path) => tokio::fs::read(path).await,
        }
    }

    /// MIME type sent with the file part, derived from the extension.
    pub fn mime_type(&self) -> &'static str {
        match self.extension.as_str() {
            "pdf" => "application/pdf",
            "jpg" | "jpeg" => "image/jpeg",
            "png" => "image/png",
            _ => "application/octet-stream",
        }
    }
}

/// Text after the last `.`, lowercased. A name without a dot yields the whole name,
/// which never matches an allowed extension.
pub fn extension_of(name: &str) -> String {
    name.rsplit_once('.')
        .map(|(_, ext)| ext)
        .unwrap_or(name)
        .to_lowercase()
}

// ────────────────────────────────────────────────────────────────────────────
// Validation
// ────────────────────────────────────────────────────────────────────────────

/// Checks size first, then extension. An oversize file of a bad type reports the size.
pub fn validate_file(file: &SelectedFile) -> Result<(), ValidationError> {
    if file.byte_size > MAX_FILE_BYTES {
        return Err(ValidationError::TooLarge {
            byte_size: file.byte_size,
            max_bytes: MAX_FILE_BYTES,
        });
    }

    if !ALLOWED_EXTENSIONS.contains(&file.extension.as_str()) {
        return Err(ValidationError::InvalidType {
            extension: file.extension.clone(),
        });
    }

    Ok(())
}

/// Size in MiB with one decimal, e.g. `2.0`. Exact halves round up.
pub fn human_size_mb(byte_size: u64) -> String {
    const MIB: u128 = 1024 * 1024;
    let tenths = (u128::from(byte_size) * 10 + MIB / 2) / MIB;
    format!("{}.{}", tenths / 10, tenths % 10)
}

/// The status line shown under the drop zone after each selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileInfo {
    Ready { name: String, byte_size: u64 },
    Rejected(ValidationError),
}

impl FileInfo {
    pub fn for_file(file: &SelectedFile) -> Self {
        match validate_file(file) {
            Ok(()) => FileInfo::Ready {
                name: file.name.clone(),
                byte_size: file.byte_size,
            },
            Err(e) => FileInfo::Rejected(e),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, FileInfo::Ready { .. })
    }

    pub fn color(&self) -> &'static str {
        match self {
            FileInfo::Ready { .. } => READY_COLOR,
            FileInfo::Rejected(_) => ALERT_COLOR,
        }
    }
}

impl fmt::Display for FileInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileInfo::Ready { name, byte_size } => {
                write!(f, "✅ Ready: {} ({}MB)", name, human_size_mb(*byte_size))
            }
            FileInfo::Rejected(e) => write!(f, "❌ {e}"),
        }
    }
}
