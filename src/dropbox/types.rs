use chrono::{DateTime, Utc};
use serde::Deserialize;

/// A Dropbox entry as returned by `files/get_metadata` and folder listings.
/// Dropbox discriminates the union on the `.tag` field.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = ".tag", rename_all = "snake_case")]
pub enum Metadata {
    File(FileMetadata),
    Folder(FolderMetadata),
    Deleted(DeletedMetadata),
}

impl Metadata {
    pub fn name(&self) -> &str {
        match self {
            Metadata::File(f) => &f.name,
            Metadata::Folder(f) => &f.name,
            Metadata::Deleted(d) => &d.name,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FileMetadata {
    pub name: String,
    #[serde(default)]
    pub path_lower: Option<String>,
    #[serde(default)]
    pub path_display: Option<String>,
    pub size: u64,
    pub server_modified: DateTime<Utc>,
    #[serde(default)]
    pub content_hash: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FolderMetadata {
    pub name: String,
    #[serde(default)]
    pub path_lower: Option<String>,
    #[serde(default)]
    pub path_display: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeletedMetadata {
    pub name: String,
    #[serde(default)]
    pub path_lower: Option<String>,
}

/// One page from `files/list_folder` / `files/list_folder/continue`.
#[derive(Debug, Deserialize)]
pub struct ListFolderResult {
    #[serde(default)]
    pub entries: Vec<Metadata>,
    pub cursor: String,
    pub has_more: bool,
}

/// Response from `files/create_folder_v2`.
#[derive(Debug, Deserialize)]
pub struct CreateFolderResult {
    pub metadata: FolderMetadata,
}

/// Response from `files/delete_v2`.
#[derive(Debug, Deserialize)]
pub struct DeleteResult {
    pub metadata: Metadata,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_metadata() {
        let json = r#"{
            ".tag": "file",
            "name": "photo.jpg",
            "id": "id:abc123",
            "path_lower": "/team/photo.jpg",
            "path_display": "/Team/photo.jpg",
            "client_modified": "2025-05-12T15:50:38Z",
            "server_modified": "2025-05-12T15:50:39Z",
            "rev": "015",
            "size": 12345,
            "content_hash": "deadbeef"
        }"#;
        let meta: Metadata = serde_json::from_str(json).unwrap();
        match meta {
            Metadata::File(f) => {
                assert_eq!(f.name, "photo.jpg");
                assert_eq!(f.size, 12345);
                assert_eq!(f.path_lower.as_deref(), Some("/team/photo.jpg"));
                assert_eq!(f.content_hash.as_deref(), Some("deadbeef"));
                assert_eq!(f.server_modified.to_rfc3339(), "2025-05-12T15:50:39+00:00");
            }
            other => panic!("expected file, got {:?}", other),
        }
    }

    #[test]
    fn test_folder_metadata() {
        let json = r#"{
            ".tag": "folder",
            "name": "Team",
            "id": "id:xyz",
            "path_lower": "/team",
            "path_display": "/Team"
        }"#;
        let meta: Metadata = serde_json::from_str(json).unwrap();
        match meta {
            Metadata::Folder(f) => {
                assert_eq!(f.name, "Team");
                assert_eq!(f.path_lower.as_deref(), Some("/team"));
            }
            other => panic!("expected folder, got {:?}", other),
        }
    }

    #[test]
    fn test_deleted_metadata() {
        let json = r#"{".tag": "deleted", "name": "gone.jpg", "path_lower": "/gone.jpg"}"#;
        let meta: Metadata = serde_json::from_str(json).unwrap();
        assert!(matches!(meta, Metadata::Deleted(_)));
        assert_eq!(meta.name(), "gone.jpg");
    }

    #[test]
    fn test_list_folder_result() {
        let json = r#"{
            "entries": [
                {".tag": "folder", "name": "A", "path_lower": "/a"},
                {".tag": "file", "name": "b.jpg", "path_lower": "/b.jpg",
                 "server_modified": "2025-01-01T00:00:00Z", "size": 1}
            ],
            "cursor": "AAA",
            "has_more": true
        }"#;
        let page: ListFolderResult = serde_json::from_str(json).unwrap();
        assert_eq!(page.entries.len(), 2);
        assert!(page.has_more);
        assert_eq!(page.cursor, "AAA");
        assert_eq!(page.entries[0].name(), "A");
    }

    #[test]
    fn test_create_folder_result() {
        let json = r#"{"metadata": {"name": "photos", "path_lower": "/photos"}}"#;
        let resp: CreateFolderResult = serde_json::from_str(json).unwrap();
        assert_eq!(resp.metadata.name, "photos");
    }

    #[test]
    fn test_delete_result() {
        let json = r#"{
            "metadata": {".tag": "file", "name": "tags.xlsx",
                         "server_modified": "2025-01-01T00:00:00Z", "size": 9}
        }"#;
        let resp: DeleteResult = serde_json::from_str(json).unwrap();
        assert_eq!(resp.metadata.name(), "tags.xlsx");
    }
}
