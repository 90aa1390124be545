//! Scratch storage for embedded images
//!
//! A decoded logo is staged as a uniquely named PNG under the scratch root
//! and removed when its [`ScratchFile`] guard drops, whether or not the
//! render that used it succeeded.

use std::io;
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat};
use uuid::Uuid;

use crate::encoding;
use crate::error::ServiceError;

#[derive(Debug, Clone)]
pub struct ScratchDir {
    root: PathBuf,
}

impl ScratchDir {
    /// Create the root if it does not exist yet
    pub fn create(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Decode a base64 image and write it to a fresh PNG file
    pub fn stage_image(&self, payload: &str) -> Result<ScratchFile, ServiceError> {
        let bytes = encoding::decode_payload(payload)
            .map_err(|e| ServiceError::InvalidEmbeddedImage(e.to_string()))?;
        let image = image::load_from_memory(&bytes)
            .map_err(|e| ServiceError::InvalidEmbeddedImage(e.to_string()))?;

        let file = ScratchFile {
            path: self.root.join(format!("{}.png", Uuid::new_v4())),
        };
        image
            .save_with_format(&file.path, ImageFormat::Png)
            .map_err(|e| ServiceError::internal(format!("staging embedded image: {e}")))?;
        tracing::debug!(path = %file.path.display(), "staged embedded image");
        Ok(file)
    }
}

/// Owned scratch file, deleted on drop
#[derive(Debug)]
pub struct ScratchFile {
    path: PathBuf,
}

impl ScratchFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<DynamicImage, ServiceError> {
        image::open(&self.path).map_err(|e| ServiceError::internal(format!("reading staged image: {e}")))
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(path = %self.path.display(), error = %e, "failed to remove scratch file"),
        }
    }
}
