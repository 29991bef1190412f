//! File access gateway for book content.
//!
//! Stores, loads and deletes physical files by logical path. Knows nothing
//! about ownership; callers decide who may reach a file.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use crate::config::ACCEPTED_CONTENT_TYPE;
use crate::domain::UploadedFile;
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Storage backend for book files.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Store the file under the book's directory and return its logical path
    async fn save(&self, book_id: i64, file: &UploadedFile) -> AppResult<String>;

    /// Read the full content stored at a logical path
    async fn load(&self, path: &str) -> AppResult<Vec<u8>>;

    /// Delete the file at a logical path. Missing files are not an error.
    async fn delete(&self, path: &str) -> AppResult<()>;
}

/// Local filesystem storage.
///
/// Structure: `{root}/{book_id}/{file_name}`
pub struct LocalFileStorage {
    root: PathBuf,
}

impl LocalFileStorage {
    /// Create storage at the given root directory.
    ///
    /// Creates the directory if it doesn't exist.
    pub async fn new(root: impl AsRef<Path>) -> AppResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a logical path under the root, rejecting anything that could escape it
    fn resolve(&self, logical: &str) -> AppResult<PathBuf> {
        let relative = Path::new(logical);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));

        if logical.is_empty() || escapes {
            return Err(AppError::file_not_found("File not found or not readable"));
        }

        Ok(self.root.join(relative))
    }
}

/// Strip client-supplied directories and reject traversal attempts.
fn clean_file_name(original: &str) -> AppResult<String> {
    if original.contains("..") {
        return Err(AppError::file_storage("Invalid file name"));
    }

    let name = original
        .rsplit(['/', '\\'])
        .next()
        .map(str::trim)
        .unwrap_or_default();

    if name.is_empty() {
        return Err(AppError::file_storage("Invalid file name"));
    }

    Ok(name.to_string())
}

#[async_trait]
impl FileStorage for LocalFileStorage {
    async fn save(&self, book_id: i64, file: &UploadedFile) -> AppResult<String> {
        let file_name = clean_file_name(&file.file_name)?;

        if !file.has_content_type(ACCEPTED_CONTENT_TYPE) {
            return Err(AppError::file_storage("Only PDF files are allowed"));
        }

        let dir = self.root.join(book_id.to_string());
        fs::create_dir_all(&dir).await?;
        fs::write(dir.join(&file_name), &file.bytes).await?;

        let logical = format!("{}/{}", book_id, file_name);
        tracing::debug!(path = %logical, bytes = file.bytes.len(), "Stored book file");

        Ok(logical)
    }

    async fn load(&self, path: &str) -> AppResult<Vec<u8>> {
        let full_path = self.resolve(path)?;

        match fs::read(&full_path).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(AppError::file_not_found("File not found or not readable"))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, path: &str) -> AppResult<()> {
        let full_path = self
            .resolve(path)
            .map_err(|_| AppError::file_storage(format!("Failed to delete file: {}", path)))?;

        match fs::remove_file(&full_path).await {
            Ok(()) => {
                tracing::debug!(path, "Deleted book file");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::file_storage(format!(
                "Failed to delete file: {}: {}",
                path, e
            ))),
        }
    }
}
