//! Index exporter — builds the label→tag worksheet and publishes it to the
//! remote folder, replacing any previous copy. Export failures are reported
//! to the caller; the binary logs them and still exits normally, an index
//! that fails to publish never undoes a completed sync.

use std::collections::HashSet;

use rust_xlsxwriter::{Workbook, XlsxError};
use thiserror::Error;

use crate::dropbox::{DropboxError, RemoteStore};
use crate::tags::{normalize_tag, LocalImage};

/// Fixed name of the published workbook inside the remote folder.
pub const INDEX_FILE_NAME: &str = "tags.xlsx";

/// One worksheet row: the original label and its normalized hashtag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexRow {
    pub subject: String,
    pub tag: String,
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Could not render the tag index: {0}")]
    Render(#[from] XlsxError),

    #[error("Could not check for an existing index at {path}: {source}")]
    Check {
        path: String,
        #[source]
        source: DropboxError,
    },

    #[error("Could not delete the previous index at {path}: {source}")]
    Replace {
        path: String,
        #[source]
        source: DropboxError,
    },

    #[error("Could not upload the tag index to {path}: {source}")]
    Upload {
        path: String,
        #[source]
        source: DropboxError,
    },
}

/// Flatten every label across all images into `(label, #tag)` rows,
/// deduplicated by tag (first occurrence wins) and sorted by label.
///
/// Two distinct labels may normalize to the same tag; the row keeps the
/// label seen first in scan order.
pub fn build_index_rows(images: &[LocalImage]) -> Vec<IndexRow> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut rows: Vec<IndexRow> = Vec::new();
    for image in images {
        for label in &image.labels {
            let tag = format!("#{}", normalize_tag(label));
            if seen.insert(tag.clone()) {
                rows.push(IndexRow {
                    subject: label.clone(),
                    tag,
                });
            }
        }
    }
    rows.sort_by(|a, b| a.subject.cmp(&b.subject));
    rows
}

/// Serialize the rows into an in-memory xlsx workbook.
pub fn render_workbook(rows: &[IndexRow]) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    worksheet.write_string(0, 0, "jugador")?;
    worksheet.write_string(0, 1, "tag")?;
    for (i, row) in rows.iter().enumerate() {
        let r = (i + 1) as u32;
        worksheet.write_string(r, 0, row.subject.as_str())?;
        worksheet.write_string(r, 1, row.tag.as_str())?;
    }

    workbook.save_to_buffer()
}

/// Build, render and upload the tag index to `<remote_root>/tags.xlsx`.
///
/// An existing index is deleted first; a NotFound on the existence check
/// means there is nothing to replace. An empty image list still publishes a
/// header-only workbook.
pub async fn publish_index(
    store: &dyn RemoteStore,
    images: &[LocalImage],
    remote_root: &str,
    dry_run: bool,
) -> Result<(), ExportError> {
    let rows = build_index_rows(images);
    let buffer = render_workbook(&rows)?;
    let target = format!("{}/{}", remote_root, INDEX_FILE_NAME);

    match store.get_metadata(&target).await {
        Ok(_) => {
            if dry_run {
                tracing::info!("[DRY RUN] Would replace {} ({} rows)", target, rows.len());
                return Ok(());
            }
            store
                .delete(&target)
                .await
                .map_err(|source| ExportError::Replace {
                    path: target.clone(),
                    source,
                })?;
            tracing::debug!("Deleted previous index at {}", target);
        }
        Err(e) if e.is_not_found() => {}
        Err(source) => {
            return Err(ExportError::Check {
                path: target,
                source,
            })
        }
    }

    if dry_run {
        tracing::info!("[DRY RUN] Would upload {} ({} rows)", target, rows.len());
        return Ok(());
    }

    store
        .upload(&target, buffer)
        .await
        .map_err(|source| ExportError::Upload {
            path: target.clone(),
            source,
        })?;
    tracing::info!("Published tag index to {} ({} rows)", target, rows.len());
    Ok(())
}
