//! Source image handle - original encoded bytes plus decoded dimensions.
//!
//! **Why**: the server decodes the upload itself, so the client keeps the
//! file's encoded bytes and never re-encodes. Decoding happens exactly once
//! on load, to validate the file and learn its dimensions.
//!
//! **Used by**: ParamStore (current source), RequestSequencer (shared with
//! in-flight requests via Arc)

use log::info;
use std::path::{Path, PathBuf};

/// A decoded-and-validated source image.
///
/// Immutable after creation. The store replaces it wholesale on a new load;
/// in-flight requests keep the old one alive through their `Arc` until they
/// settle.
#[derive(Debug, Clone)]
pub struct SourceImage {
    path: Option<PathBuf>,
    bytes: Vec<u8>,
    width: u32,
    height: u32,
    format: image::ImageFormat,
}

/// Source image loading errors
#[derive(Debug)]
pub enum SourceError {
    Read(String),
    Decode(String),
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceError::Read(e) => write!(f, "Read error: {}", e),
            SourceError::Decode(e) => write!(f, "Decode error: {}", e),
        }
    }
}

impl std::error::Error for SourceError {}

impl SourceImage {
    /// Load and validate an image file from disk.
    pub fn from_path(path: &Path) -> Result<Self, SourceError> {
        let bytes = std::fs::read(path).map_err(|e| SourceError::Read(e.to_string()))?;
        let mut source = Self::from_bytes(bytes)?;
        source.path = Some(path.to_path_buf());
        info!(
            "Source image loaded: {} ({}x{}, {} bytes)",
            path.display(),
            source.width,
            source.height,
            source.bytes.len()
        );
        Ok(source)
    }

    /// Validate encoded image bytes and record their dimensions.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, SourceError> {
        let format =
            image::guess_format(&bytes).map_err(|e| SourceError::Decode(e.to_string()))?;
        let decoded =
            image::load_from_memory(&bytes).map_err(|e| SourceError::Decode(e.to_string()))?;
        Ok(Self {
            path: None,
            width: decoded.width(),
            height: decoded.height(),
            bytes,
            format,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Short display name for the status bar.
    pub fn file_name(&self) -> String {
        self.path
            .as_deref()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
            .unwrap_or("(memory)")
            .to_string()
    }

    /// Encoded bytes exactly as read from disk; uploaded verbatim.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// MIME type of the encoded bytes, for the multipart `image` part.
    pub fn mime(&self) -> &'static str {
        match self.format {
            image::ImageFormat::Png => "image/png",
            image::ImageFormat::Jpeg => "image/jpeg",
            image::ImageFormat::Bmp => "image/bmp",
            image::ImageFormat::Tiff => "image/tiff",
            image::ImageFormat::WebP => "image/webp",
            _ => "application/octet-stream",
        }
    }

    /// File name reported in the multipart upload.
    pub fn upload_name(&self) -> String {
        self.path
            .as_deref()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .unwrap_or_else(|| "upload.png".to_string())
    }
}
