//! Book file metadata and transfer types.

use serde::Serialize;
use utoipa::ToSchema;

/// Metadata pointer to a physical file owned by exactly one book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FileRecord {
    #[serde(skip)]
    pub id: Option<i64>,
    pub file_name: String,
    /// Logical storage path; absent until content has been stored
    #[serde(skip)]
    pub file_path: Option<String>,
    pub content_type: String,
}

impl FileRecord {
    pub fn new(file_name: impl Into<String>, file_path: impl Into<String>, content_type: impl Into<String>) -> Self {
        Self {
            id: None,
            file_name: file_name.into(),
            file_path: Some(file_path.into()),
            content_type: content_type.into(),
        }
    }

    pub fn stored_path(&self) -> Option<&str> {
        self.file_path.as_deref().filter(|p| !p.is_empty())
    }
}

/// File content received from a client upload.
#[derive(Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for UploadedFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadedFile")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl UploadedFile {
    pub fn new(file_name: impl Into<String>, content_type: Option<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type,
            bytes,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn has_content_type(&self, expected: &str) -> bool {
        self.content_type.as_deref() == Some(expected)
    }
}

/// Loaded file content ready to stream back to a purchaser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDownload {
    pub file_name: String,
    pub content_type: String,
    pub content: Vec<u8>,
}
