//! Photo storage for lifecard.
//!
//! Uploaded photos land in a bucket directory on the local filesystem,
//! under a per-owner path with a collision-resistant file name, and are
//! addressed afterwards by a durable public URL.
//!
//! A missing bucket is a recoverable condition: `upload` reports
//! [`Error::StorageUnavailable`] and callers are expected to continue the
//! record save without a photo.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::link;

/// Extension used when the original file name has none.
const FALLBACK_EXTENSION: &str = "bin";

/// Filesystem-backed photo storage.
#[derive(Debug, Clone)]
pub struct PhotoStore {
    /// The bucket directory photos are written under.
    bucket_dir: PathBuf,
    /// Base URL photos are publicly served from.
    public_base_url: String,
}

impl PhotoStore {
    /// Create a photo store over the given bucket directory.
    ///
    /// The directory is not created here; its absence is reported per
    /// upload so record saves can proceed without a photo.
    #[must_use]
    pub fn new(bucket_dir: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            bucket_dir: bucket_dir.into(),
            public_base_url: public_base_url.into(),
        }
    }

    /// The bucket directory this store writes under.
    #[must_use]
    pub fn bucket_dir(&self) -> &Path {
        &self.bucket_dir
    }

    /// Check whether the bucket directory exists.
    #[must_use]
    pub fn bucket_exists(&self) -> bool {
        self.bucket_dir.is_dir()
    }

    /// Upload photo bytes for an owner and return the public URL.
    ///
    /// The stored path is `{owner_id}/{random-token}.{ext}`, preserving the
    /// extension of the original file name.
    ///
    /// # Errors
    ///
    /// Returns `Error::StorageUnavailable` when the bucket directory does
    /// not exist (checked before any write; recoverable by contract), or
    /// `Error::Io` if writing the bytes fails.
    pub fn upload(&self, owner_id: &str, original_name: &str, bytes: &[u8]) -> Result<String> {
        if !self.bucket_exists() {
            warn!(
                "Photo bucket {} not found, upload skipped",
                self.bucket_dir.display()
            );
            return Err(Error::StorageUnavailable {
                bucket: self.bucket_dir.clone(),
            });
        }

        let extension = Path::new(original_name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or(FALLBACK_EXTENSION);
        let file_name = format!("{}.{extension}", link::generate());

        let owner_dir = self.bucket_dir.join(owner_id);
        if !owner_dir.exists() {
            std::fs::create_dir_all(&owner_dir).map_err(|source| Error::DirectoryCreate {
                path: owner_dir.clone(),
                source,
            })?;
        }

        let target = owner_dir.join(&file_name);
        std::fs::write(&target, bytes)?;
        debug!("Stored photo at {}", target.display());

        Ok(format!(
            "{}/{owner_id}/{file_name}",
            self.public_base_url.trim_end_matches('/')
        ))
    }
}
