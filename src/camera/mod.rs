//! Camera capability
//!
//! A camera hands back one encoded frame per capture. Permission problems
//! surface as [`Error::CapabilityDenied`](crate::Error::CapabilityDenied).

pub mod mock;

pub use mock::MockCamera;

use crate::{Error, Result};
use async_trait::async_trait;
use std::io::ErrorKind as IoErrorKind;
use std::path::PathBuf;

#[async_trait]
pub trait CameraSource: Send + Sync {
    /// Capture one encoded frame.
    async fn capture(&self) -> Result<Vec<u8>>;
}

/// Camera backed by an image file on disk, re-read on every capture.
pub struct FileCamera {
    path: PathBuf,
}

impl FileCamera {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CameraSource for FileCamera {
    async fn capture(&self) -> Result<Vec<u8>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.is_empty() => Err(Error::CapabilityDenied(format!(
                "No frame available from {}",
                self.path.display()
            ))),
            Ok(bytes) => Ok(bytes),
            Err(e) if matches!(e.kind(), IoErrorKind::NotFound | IoErrorKind::PermissionDenied) => {
                Err(Error::CapabilityDenied(format!(
                    "Cannot open camera source {}: {}",
                    self.path.display(),
                    e
                )))
            }
            Err(e) => Err(e.into()),
        }
    }
}
