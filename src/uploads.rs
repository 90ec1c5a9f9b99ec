//! Uploaded-image storage
//!
//! Stores user-uploaded cover and profile images under a local directory
//! and serves them back by filename. Validation is an extension allow-list;
//! filenames are sanitized before they touch the filesystem. Persisting the
//! returned URL onto a work or profile record is the caller's job via the
//! normal update endpoints.

use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

use crate::error::ApiError;

/// Image extensions accepted for upload
const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif"];

/// Filesystem-backed store for uploaded images
pub struct ImageStore {
    root_dir: PathBuf,
}

impl ImageStore {
    /// Create a new image store at the given directory
    pub async fn new<P: AsRef<Path>>(root_dir: P) -> Result<Self, ApiError> {
        let root_dir = root_dir.as_ref().to_path_buf();

        fs::create_dir_all(&root_dir).await?;

        info!(path = %root_dir.display(), "Initialized image store");

        Ok(Self { root_dir })
    }

    /// Whether a filename carries an allowed image extension
    pub fn allowed_file(filename: &str) -> bool {
        match filename.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => {
                ALLOWED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str())
            }
            _ => false,
        }
    }

    /// Reduce a client-supplied filename to a safe single path component:
    /// strip directories, keep only alphanumerics, dash, underscore and dot.
    /// Returns None when nothing usable remains.
    pub fn sanitize_filename(filename: &str) -> Option<String> {
        let base = filename
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(filename);

        let clean: String = base
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
            .collect();

        if clean.is_empty() || clean.chars().all(|c| c == '.') {
            return None;
        }

        Some(clean)
    }

    /// Store an uploaded image. Validates and sanitizes the filename, writes
    /// the bytes, and returns the stored filename.
    pub async fn save(&self, filename: &str, data: &[u8]) -> Result<String, ApiError> {
        let clean = Self::sanitize_filename(filename)
            .ok_or_else(|| ApiError::Validation("missing or invalid filename".to_string()))?;

        if !Self::allowed_file(&clean) {
            return Err(ApiError::Validation(
                "file type not allowed".to_string(),
            ));
        }

        let path = self.root_dir.join(&clean);
        fs::write(&path, data).await?;

        info!(file = %clean, size = data.len(), "Stored uploaded image");

        Ok(clean)
    }

    /// Load a stored image by filename. Returns the bytes and a content
    /// type, or None when no such file exists.
    pub async fn load(&self, filename: &str) -> Result<Option<(Vec<u8>, &'static str)>, ApiError> {
        let clean = match Self::sanitize_filename(filename) {
            Some(c) => c,
            None => return Ok(None),
        };

        let path = self.root_dir.join(&clean);
        match fs::read(&path).await {
            Ok(data) => Ok(Some((data, Self::content_type_for(&clean)))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Content type by extension; octet-stream for anything unexpected
    fn content_type_for(filename: &str) -> &'static str {
        match filename.rsplit_once('.').map(|(_, ext)| ext) {
            Some("png") => "image/png",
            Some("jpg") | Some("jpeg") => "image/jpeg",
            Some("gif") => "image/gif",
            _ => "application/octet-stream",
        }
    }
}
