use super::error::DropboxError;
use super::types::{FileMetadata, Metadata};

/// The remote-store operations the pipeline needs.
///
/// Implemented by [`DropboxClient`](super::DropboxClient) for real runs and
/// by an in-memory fake in tests, so the sync engine, exporter, and folder
/// browser never depend on the network.
#[async_trait::async_trait]
pub trait RemoteStore: Send + Sync {
    /// Create a folder at `path`. Fails with an already-exists error if the
    /// folder is present; the caller decides whether that matters.
    async fn create_folder(&self, path: &str) -> Result<(), DropboxError>;

    /// Look up the entry at `path`. Fails with a not-found error for an
    /// absent path.
    async fn get_metadata(&self, path: &str) -> Result<Metadata, DropboxError>;

    /// Upload `bytes` as a new file at `path`.
    async fn upload(&self, path: &str, bytes: Vec<u8>) -> Result<FileMetadata, DropboxError>;

    /// Delete the entry at `path`.
    async fn delete(&self, path: &str) -> Result<(), DropboxError>;

    /// List the direct children of the folder at `path` (`""` for the
    /// account root), following pagination to the end.
    async fn list_folder(&self, path: &str) -> Result<Vec<Metadata>, DropboxError>;

    /// Attach a tag text to the entry at `path`.
    async fn add_tag(&self, path: &str, tag_text: &str) -> Result<(), DropboxError>;
}
