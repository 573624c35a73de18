//! Filesystem cover storage.
//!
//! Covers live under the configured upload directory as
//! `books/<uuid>_<book_code>.<ext>`; the relative path is what the book row stores.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use lms_core::{CoverStore, CoverUpload, DomainError, RepoResult};
use tracing::{debug, info};
use uuid::Uuid;

const COVER_DIR: &str = "books";

#[derive(Debug, Clone)]
pub struct FsCoverStore {
    base_path: PathBuf,
}

impl FsCoverStore {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Book codes are free text; keep only characters safe in a file name
    fn file_stem(book_code: &str) -> String {
        book_code
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect()
    }

    /// Resolve a stored relative path, refusing anything that escapes the base directory
    fn resolve(&self, relative: &str) -> RepoResult<PathBuf> {
        let path = Path::new(relative);
        if path
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(DomainError::StorageError(format!(
                "invalid cover path: {relative}"
            )));
        }
        Ok(self.base_path.join(path))
    }
}

#[async_trait]
impl CoverStore for FsCoverStore {
    async fn save(&self, book_code: &str, upload: &CoverUpload) -> RepoResult<String> {
        let relative = format!(
            "{COVER_DIR}/{}_{}.{}",
            Uuid::new_v4().simple(),
            Self::file_stem(book_code),
            upload.format.extension()
        );
        let path = self.resolve(&relative)?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                DomainError::StorageError(format!(
                    "failed to create directory {}: {e}",
                    parent.display()
                ))
            })?;
        }

        // Temp file + rename so a crash never leaves a half-written cover
        let temp_path = path.with_extension("tmp");
        tokio::fs::write(&temp_path, &upload.bytes)
            .await
            .map_err(|e| {
                DomainError::StorageError(format!(
                    "failed to write {}: {e}",
                    temp_path.display()
                ))
            })?;
        tokio::fs::rename(&temp_path, &path).await.map_err(|e| {
            DomainError::StorageError(format!("failed to rename {}: {e}", temp_path.display()))
        })?;

        info!(path = %relative, size = upload.bytes.len(), "Stored cover image");
        Ok(relative)
    }

    async fn remove(&self, relative: &str) -> RepoResult<()> {
        let path = self.resolve(relative)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!(path = %relative, "Removed cover image");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DomainError::StorageError(format!(
                "failed to remove {}: {e}",
                path.display()
            ))),
        }
    }
}
