//! Dropbox v2 API client — a thin typed wrapper over the handful of HTTP
//! endpoints the pipeline uses. RPC endpoints take JSON bodies against
//! `api.dropboxapi.com`; the upload endpoint sends raw bytes against
//! `content.dropboxapi.com` with its argument packed into the
//! `Dropbox-API-Arg` header. Non-success responses are classified once into
//! `{AlreadyExists, NotFound, Other}` (see [`error`]) so callers branch on
//! structure, never on payload shape.

pub mod content_hash;
pub mod error;
pub mod store;
pub mod types;

#[cfg(test)]
pub(crate) mod fake;

pub use content_hash::content_hash;
pub use error::DropboxError;
pub use store::RemoteStore;
pub use types::{FileMetadata, Metadata};

use std::fmt::Write as _;

use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use types::{CreateFolderResult, DeleteResult, ListFolderResult};

const API_BASE: &str = "https://api.dropboxapi.com/2";
const CONTENT_BASE: &str = "https://content.dropboxapi.com/2";

/// Authenticated Dropbox client. Cheap to clone; no transport timeout is
/// configured beyond reqwest's defaults.
#[derive(Clone)]
pub struct DropboxClient {
    http: reqwest::Client,
    token: String,
}

impl std::fmt::Debug for DropboxClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DropboxClient")
            .field("token", &"<redacted>")
            .finish_non_exhaustive()
    }
}

impl DropboxClient {
    pub fn new(token: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            token,
        }
    }

    /// POST a JSON body to an RPC endpoint and deserialize the response.
    async fn rpc<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: Value,
    ) -> Result<T, DropboxError> {
        let response = self
            .http
            .post(format!("{API_BASE}/{endpoint}"))
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?;
        parse_response(endpoint, response).await
    }

    /// POST a JSON body to an RPC endpoint whose success response carries no
    /// payload worth keeping (`files/tags/add` returns an empty body).
    async fn rpc_discard(&self, endpoint: &str, body: Value) -> Result<(), DropboxError> {
        let response = self
            .http
            .post(format!("{API_BASE}/{endpoint}"))
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(DropboxError::from_api_response(
                endpoint,
                status.as_u16(),
                &body,
            ));
        }
        Ok(())
    }
}

async fn parse_response<T: DeserializeOwned>(
    endpoint: &str,
    response: reqwest::Response,
) -> Result<T, DropboxError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(DropboxError::from_api_response(
            endpoint,
            status.as_u16(),
            &body,
        ));
    }
    serde_json::from_str(&body).map_err(|source| DropboxError::Decode {
        endpoint: endpoint.to_string(),
        source,
    })
}

/// Serialize a JSON value for the `Dropbox-API-Arg` header.
///
/// HTTP headers must be ASCII, so every non-ASCII character is escaped as
/// `\uXXXX` UTF-16 units (a surrogate pair for characters outside the BMP).
/// serde_json handles control characters; this handles the rest.
fn header_safe_json(value: &Value) -> String {
    let raw = value.to_string();
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if c.is_ascii() {
            out.push(c);
        } else {
            let mut units = [0u16; 2];
            for unit in c.encode_utf16(&mut units) {
                let _ = write!(out, "\\u{:04x}", unit);
            }
        }
    }
    out
}

#[async_trait::async_trait]
impl RemoteStore for DropboxClient {
    async fn create_folder(&self, path: &str) -> Result<(), DropboxError> {
        let result: CreateFolderResult = self
            .rpc(
                "files/create_folder_v2",
                json!({"path": path, "autorename": false}),
            )
            .await?;
        tracing::debug!(path = %result.metadata.path_display.as_deref().unwrap_or(path), "folder created");
        Ok(())
    }

    async fn get_metadata(&self, path: &str) -> Result<Metadata, DropboxError> {
        self.rpc("files/get_metadata", json!({"path": path})).await
    }

    async fn upload(&self, path: &str, bytes: Vec<u8>) -> Result<FileMetadata, DropboxError> {
        let arg = header_safe_json(&json!({
            "path": path,
            "mode": "add",
            "autorename": false,
            "mute": false
        }));
        let response = self
            .http
            .post(format!("{CONTENT_BASE}/files/upload"))
            .bearer_auth(&self.token)
            .header("Dropbox-API-Arg", arg)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(bytes)
            .send()
            .await?;
        parse_response("files/upload", response).await
    }

    async fn delete(&self, path: &str) -> Result<(), DropboxError> {
        let _: DeleteResult = self.rpc("files/delete_v2", json!({"path": path})).await?;
        Ok(())
    }

    async fn list_folder(&self, path: &str) -> Result<Vec<Metadata>, DropboxError> {
        let mut page: ListFolderResult = self
            .rpc("files/list_folder", json!({"path": path}))
            .await?;
        let mut entries = std::mem::take(&mut page.entries);
        while page.has_more {
            page = self
                .rpc("files/list_folder/continue", json!({"cursor": page.cursor}))
                .await?;
            entries.append(&mut page.entries);
        }
        Ok(entries)
    }

    async fn add_tag(&self, path: &str, tag_text: &str) -> Result<(), DropboxError> {
        self.rpc_discard(
            "files/tags/add",
            json!({"path": path, "tag_text": tag_text}),
        )
        .await
    }
}
