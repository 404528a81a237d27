//! Object storage collaborator for file transfers.
//!
//! The relay hands the decoded payload here and persists whatever locator
//! comes back. The default implementation writes to a directory under the
//! data dir; serving the files over HTTP belongs to the outer REST layer.

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// Durable storage for uploaded file payloads.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store `bytes` under a unique name derived from `file_name` and
    /// return the locator URL to persist alongside the message.
    async fn store(&self, file_name: &str, bytes: &[u8]) -> Result<String>;
}

/// Disk-backed object storage rooted at `<data_dir>/uploads`.
pub struct DiskStorage {
    root: PathBuf,
}

impl DiskStorage {
    pub fn new(data_dir: &str) -> std::io::Result<Self> {
        let root = PathBuf::from(data_dir).join("uploads");
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }
}

/// Strip path separators and other filesystem-hostile characters from a
/// client-supplied file name. The unique prefix provides collision safety;
/// this only keeps the stored name readable and contained.
fn sanitize_file_name(file_name: &str) -> String {
    let cleaned: String = file_name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '\0' => '_',
            c => c,
        })
        .collect();

    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned
    }
}

#[async_trait]
impl ObjectStorage for DiskStorage {
    async fn store(&self, file_name: &str, bytes: &[u8]) -> Result<String> {
        let stored_name = format!("{}-{}", Uuid::now_v7(), sanitize_file_name(file_name));
        let path = self.root.join(&stored_name);

        tokio::fs::write(&path, bytes).await?;

        tracing::debug!(
            file = %path.display(),
            size = bytes.len(),
            "Stored uploaded file"
        );

        Ok(format!("/uploads/{stored_name}"))
    }
}
