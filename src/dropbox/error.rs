use serde_json::Value;
use thiserror::Error;

/// Classified outcome of a failed Dropbox API call.
///
/// The sync engine only ever branches on three cases: a folder that already
/// exists, a path that does not exist, and everything else. Classification
/// happens once, here, when the response is parsed; callers match on the
/// result instead of probing raw payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    AlreadyExists,
    NotFound,
    Other,
}

/// Typed errors for the Dropbox client.
#[derive(Debug, Error)]
pub enum DropboxError {
    #[error("Dropbox API error on {endpoint} (HTTP {status}): {summary}")]
    Api {
        endpoint: String,
        status: u16,
        kind: ErrorKind,
        summary: String,
    },

    #[error("Unexpected response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl DropboxError {
    /// Build an `Api` error from a non-success response body.
    ///
    /// Error responses normally carry `{"error_summary": ..., "error": ...}`;
    /// a body that is not JSON (proxies, HTML error pages) still produces an
    /// `Api` error with `ErrorKind::Other` and the raw body as summary.
    pub(crate) fn from_api_response(endpoint: &str, status: u16, body: &str) -> Self {
        let (kind, summary) = match serde_json::from_str::<Value>(body) {
            Ok(payload) => {
                let kind = payload
                    .get("error")
                    .map(classify_error)
                    .unwrap_or(ErrorKind::Other);
                let summary = payload
                    .get("error_summary")
                    .and_then(Value::as_str)
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| truncate_body(body));
                (kind, summary)
            }
            Err(_) => (ErrorKind::Other, truncate_body(body)),
        };
        DropboxError::Api {
            endpoint: endpoint.to_string(),
            status,
            kind,
            summary,
        }
    }

    /// Folder-creation conflict: the folder is already there.
    pub fn is_already_exists(&self) -> bool {
        matches!(
            self,
            DropboxError::Api {
                kind: ErrorKind::AlreadyExists,
                ..
            }
        )
    }

    /// Path lookup miss: nothing exists at the requested path.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            DropboxError::Api {
                kind: ErrorKind::NotFound,
                ..
            }
        )
    }
}

/// Walk the nested union encoding of a Dropbox error payload.
///
/// Dropbox encodes error unions as `{".tag": "path", "path": {".tag":
/// "conflict", ...}}`, nesting one level per union. The walk follows the
/// `.tag` discriminant into its same-named child until it reaches
/// `conflict` or `not_found`, or runs out of structure.
fn classify_error(error: &Value) -> ErrorKind {
    let mut node = error;
    loop {
        let tag = match node.get(".tag").and_then(Value::as_str) {
            Some(tag) => tag,
            None => return ErrorKind::Other,
        };
        match tag {
            "conflict" => return ErrorKind::AlreadyExists,
            "not_found" => return ErrorKind::NotFound,
            _ => match node.get(tag) {
                Some(inner) => node = inner,
                None => return ErrorKind::Other,
            },
        }
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    let trimmed = body.trim();
    if trimmed.len() <= MAX {
        return trimmed.to_string();
    }
    let mut cut = MAX;
    while !trimmed.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}...", &trimmed[..cut])
}
