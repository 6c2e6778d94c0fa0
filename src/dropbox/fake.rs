//! In-memory [`RemoteStore`] used by engine, exporter, and picker tests.
//!
//! Paths are exact-match keys; every call is appended to a log so tests can
//! assert on ordering and on the absence of mutations.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use chrono::Utc;

use super::content_hash::content_hash;
use super::error::{DropboxError, ErrorKind};
use super::store::RemoteStore;
use super::types::{FileMetadata, FolderMetadata, Metadata};

#[derive(Default)]
pub(crate) struct FakeStore {
    calls: Mutex<Vec<String>>,
    entries: Mutex<HashMap<String, Metadata>>,
    files: Mutex<HashMap<String, Vec<u8>>>,
    tags: Mutex<Vec<(String, String)>>,
    fail_tags: Mutex<HashSet<String>>,
    fail_metadata: Mutex<HashSet<String>>,
    fail_listings: Mutex<HashSet<String>>,
}

impl FakeStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert_folder(&self, path: &str) {
        self.entries.lock().unwrap().insert(
            path.to_string(),
            Metadata::Folder(FolderMetadata {
                name: leaf(path),
                path_lower: Some(path.to_lowercase()),
                path_display: Some(path.to_string()),
            }),
        );
    }

    pub(crate) fn insert_file(&self, path: &str, bytes: &[u8]) {
        self.entries
            .lock()
            .unwrap()
            .insert(path.to_string(), Metadata::File(file_metadata(path, bytes)));
        self.files
            .lock()
            .unwrap()
            .insert(path.to_string(), bytes.to_vec());
    }

    /// Make `add_tag` fail with `ErrorKind::Other` for this tag text.
    pub(crate) fn fail_tag(&self, tag_text: &str) {
        self.fail_tags.lock().unwrap().insert(tag_text.to_string());
    }

    /// Make `get_metadata` fail with `ErrorKind::Other` for this path.
    pub(crate) fn fail_metadata_for(&self, path: &str) {
        self.fail_metadata.lock().unwrap().insert(path.to_string());
    }

    /// Make `list_folder` fail with `ErrorKind::Other` for this path.
    pub(crate) fn fail_listing(&self, path: &str) {
        self.fail_listings.lock().unwrap().insert(path.to_string());
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn tags(&self) -> Vec<(String, String)> {
        self.tags.lock().unwrap().clone()
    }

    pub(crate) fn file_bytes(&self, path: &str) -> Option<Vec<u8>> {
        self.files.lock().unwrap().get(path).cloned()
    }

    pub(crate) fn has_entry(&self, path: &str) -> bool {
        self.entries.lock().unwrap().contains_key(path)
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

fn leaf(path: &str) -> String {
    path.rsplit('/').next().unwrap_or(path).to_string()
}

/// Parent of an entry path, with `""` standing for the root.
fn parent(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) | None => "",
        Some(i) => &path[..i],
    }
}

fn file_metadata(path: &str, bytes: &[u8]) -> FileMetadata {
    FileMetadata {
        name: leaf(path),
        path_lower: Some(path.to_lowercase()),
        path_display: Some(path.to_string()),
        size: bytes.len() as u64,
        server_modified: Utc::now(),
        content_hash: Some(content_hash(bytes)),
    }
}

fn api_error(endpoint: &str, status: u16, kind: ErrorKind, summary: &str) -> DropboxError {
    DropboxError::Api {
        endpoint: endpoint.to_string(),
        status,
        kind,
        summary: summary.to_string(),
    }
}

#[async_trait::async_trait]
impl RemoteStore for FakeStore {
    async fn create_folder(&self, path: &str) -> Result<(), DropboxError> {
        self.record(format!("create_folder {path}"));
        let mut entries = self.entries.lock().unwrap();
        if entries.contains_key(path) {
            return Err(api_error(
                "files/create_folder_v2",
                409,
                ErrorKind::AlreadyExists,
                "path/conflict/folder/..",
            ));
        }
        entries.insert(
            path.to_string(),
            Metadata::Folder(FolderMetadata {
                name: leaf(path),
                path_lower: Some(path.to_lowercase()),
                path_display: Some(path.to_string()),
            }),
        );
        Ok(())
    }

    async fn get_metadata(&self, path: &str) -> Result<Metadata, DropboxError> {
        self.record(format!("get_metadata {path}"));
        if self.fail_metadata.lock().unwrap().contains(path) {
            return Err(api_error(
                "files/get_metadata",
                500,
                ErrorKind::Other,
                "internal_error/..",
            ));
        }
        self.entries
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| {
                api_error(
                    "files/get_metadata",
                    409,
                    ErrorKind::NotFound,
                    "path/not_found/..",
                )
            })
    }

    async fn upload(&self, path: &str, bytes: Vec<u8>) -> Result<FileMetadata, DropboxError> {
        self.record(format!("upload {path}"));
        let mut entries = self.entries.lock().unwrap();
        if entries.contains_key(path) {
            return Err(api_error(
                "files/upload",
                409,
                ErrorKind::AlreadyExists,
                "path/conflict/file/..",
            ));
        }
        let metadata = file_metadata(path, &bytes);
        entries.insert(path.to_string(), Metadata::File(metadata.clone()));
        self.files.lock().unwrap().insert(path.to_string(), bytes);
        Ok(metadata)
    }

    async fn delete(&self, path: &str) -> Result<(), DropboxError> {
        self.record(format!("delete {path}"));
        if self.entries.lock().unwrap().remove(path).is_none() {
            return Err(api_error(
                "files/delete_v2",
                409,
                ErrorKind::NotFound,
                "path_lookup/not_found/..",
            ));
        }
        self.files.lock().unwrap().remove(path);
        Ok(())
    }

    async fn list_folder(&self, path: &str) -> Result<Vec<Metadata>, DropboxError> {
        self.record(format!("list_folder {path}"));
        if self.fail_listings.lock().unwrap().contains(path) {
            return Err(api_error(
                "files/list_folder",
                500,
                ErrorKind::Other,
                "internal_error/..",
            ));
        }
        let entries = self.entries.lock().unwrap();
        let mut keys: Vec<&String> = entries.keys().filter(|k| parent(k) == path).collect();
        keys.sort();
        Ok(keys.into_iter().map(|k| entries[k].clone()).collect())
    }

    async fn add_tag(&self, path: &str, tag_text: &str) -> Result<(), DropboxError> {
        self.record(format!("add_tag {path} {tag_text}"));
        if self.fail_tags.lock().unwrap().contains(tag_text) {
            return Err(api_error(
                "files/tags/add",
                409,
                ErrorKind::Other,
                "tag_limit_reached/..",
            ));
        }
        self.tags
            .lock()
            .unwrap()
            .push((path.to_string(), tag_text.to_string()));
        Ok(())
    }
}
