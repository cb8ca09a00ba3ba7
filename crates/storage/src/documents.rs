use std::path::{Path, PathBuf};

use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tracing::info;
use uuid::Uuid;

use crate::error::StorageError;

/// Longest client name that still fits a 255-byte file name behind the
/// `<uuid>_` prefix.
pub const MAX_NAME_BYTES: usize = 255 - 37;

/// A persisted upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredDocument {
    /// `<uuid>_<original name>`.
    pub file_name: String,
    #[serde(skip)]
    pub path: PathBuf,
    /// Subject of the token that authorized the upload.
    pub owner: String,
    pub size: u64,
}

/// Flat directory of uploaded documents, one file per upload.
///
/// Writes are not transactional: a crash mid-write leaves a truncated
/// file behind and nothing cleans it up. There is no delete path.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    root: PathBuf,
}

impl DocumentStore {
    /// Open (creating if needed) the store rooted at `root`.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Collision-resistant storage name for a client-supplied file name.
    ///
    /// Only the last path component of `original` is kept, otherwise
    /// verbatim. Blank names and names longer than [`MAX_NAME_BYTES`] are
    /// rejected.
    pub fn storage_name(original: &str) -> Result<String, StorageError> {
        let base = original.rsplit(['/', '\\']).next().unwrap_or_default();
        let blank = base.trim().is_empty() || base == "." || base == "..";
        if blank || base.len() > MAX_NAME_BYTES {
            return Err(StorageError::InvalidName(original.to_string()));
        }
        Ok(format!("{}_{}", Uuid::new_v4(), base))
    }

    /// Persist `content` under a fresh storage name.
    pub async fn store(
        &self,
        owner: &str,
        original_name: &str,
        content: &[u8],
    ) -> Result<StoredDocument, StorageError> {
        let file_name = Self::storage_name(original_name)?;
        let path = self.root.join(&file_name);

        let mut file = tokio::fs::File::create(&path).await?;
        file.write_all(content).await?;
        file.flush().await?;

        info!(
            file = %file_name,
            owner = %owner,
            bytes = content.len(),
            "stored document"
        );

        Ok(StoredDocument {
            file_name,
            path,
            owner: owner.to_string(),
            size: content.len() as u64,
        })
    }
}
