//! Sync engine — a single pass over the scanned images: ensure the remote
//! folder exists, upload each file that is not already present, then attach
//! its normalized tags. Repeated runs against an unchanged folder perform no
//! uploads and no folder creation.

use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};
use thiserror::Error;

use crate::dropbox::{content_hash, DropboxError, Metadata, RemoteStore};
use crate::tags::{normalize_tag, LocalImage};

/// Subset of application config consumed by the sync engine.
/// Decoupled from CLI parsing so the engine can be tested independently.
#[derive(Debug)]
pub struct SyncConfig {
    pub remote_root: String,
    pub dry_run: bool,
    pub no_progress_bar: bool,
}

/// Counters accumulated over one sync run. In dry-run mode `uploaded`
/// counts the files that would have been uploaded.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub uploaded: usize,
    pub skipped: usize,
    pub failed_tags: usize,
}

/// Fatal sync failures. Per-tag attach errors are not here: they are
/// logged and counted, never propagated.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Could not create remote folder {path}: {source}")]
    CreateFolder {
        path: String,
        #[source]
        source: DropboxError,
    },

    #[error("Could not check remote path {path}: {source}")]
    Lookup {
        path: String,
        #[source]
        source: DropboxError,
    },

    #[error("Could not read {}: {source}", path.display())]
    ReadLocal {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not upload {path}: {source}")]
    Upload {
        path: String,
        #[source]
        source: DropboxError,
    },
}

/// Outcome of a single idempotent upload attempt.
#[derive(Debug, PartialEq, Eq)]
pub enum UploadOutcome {
    Uploaded,
    Skipped,
}

/// Create the remote folder, treating an already-existing folder as success.
pub async fn ensure_folder(
    store: &dyn RemoteStore,
    path: &str,
    dry_run: bool,
) -> Result<(), SyncError> {
    if dry_run {
        tracing::info!("[DRY RUN] Would create folder {}", path);
        return Ok(());
    }
    match store.create_folder(path).await {
        Ok(()) => {
            tracing::info!("Created remote folder {}", path);
            Ok(())
        }
        Err(e) if e.is_already_exists() => {
            tracing::debug!("Remote folder {} already exists", path);
            Ok(())
        }
        Err(source) => Err(SyncError::CreateFolder {
            path: path.to_string(),
            source,
        }),
    }
}

/// Upload `local_path` to `remote_path` unless an entry already exists there.
///
/// The existence check runs even in dry-run mode so the dry-run output
/// reflects what a real run would do. When the remote copy is a file with a
/// content hash, the local file is hashed and a divergence is logged as a
/// warning without changing the skip decision.
pub async fn upload_if_absent(
    store: &dyn RemoteStore,
    local_path: &Path,
    remote_path: &str,
    dry_run: bool,
) -> Result<UploadOutcome, SyncError> {
    match store.get_metadata(remote_path).await {
        Ok(existing) => {
            match &existing {
                Metadata::File(file) => {
                    tracing::info!(
                        "Skipping {} (uploaded {})",
                        file.name,
                        file.server_modified.format("%Y-%m-%d %H:%M:%S UTC"),
                    );
                    if let Some(remote_hash) = &file.content_hash {
                        warn_on_hash_divergence(local_path, remote_hash).await;
                    }
                }
                _ => {
                    tracing::warn!(
                        "Remote path {} exists but is not a file, skipping upload",
                        remote_path
                    );
                }
            }
            Ok(UploadOutcome::Skipped)
        }
        Err(e) if e.is_not_found() => {
            if dry_run {
                tracing::info!("[DRY RUN] Would upload {}", remote_path);
                return Ok(UploadOutcome::Uploaded);
            }
            let bytes =
                tokio::fs::read(local_path)
                    .await
                    .map_err(|source| SyncError::ReadLocal {
                        path: local_path.to_path_buf(),
                        source,
                    })?;
            tracing::debug!(size_bytes = bytes.len(), path = %remote_path, "uploading");
            store
                .upload(remote_path, bytes)
                .await
                .map_err(|source| SyncError::Upload {
                    path: remote_path.to_string(),
                    source,
                })?;
            tracing::info!("Uploaded {}", remote_path);
            Ok(UploadOutcome::Uploaded)
        }
        Err(source) => Err(SyncError::Lookup {
            path: remote_path.to_string(),
            source,
        }),
    }
}

async fn warn_on_hash_divergence(local_path: &Path, remote_hash: &str) {
    match tokio::fs::read(local_path).await {
        Ok(bytes) => {
            if content_hash(&bytes) != remote_hash {
                tracing::warn!(
                    "Remote copy of {} differs from the local file (content hash mismatch)",
                    local_path.display()
                );
            }
        }
        Err(e) => {
            tracing::warn!(
                "Could not read {} for hash comparison: {}",
                local_path.display(),
                e
            );
        }
    }
}

/// Attach every label's normalized tag to `remote_path`, returning the
/// number of attachments that failed. One bad tag never aborts the batch.
pub async fn attach_tags(
    store: &dyn RemoteStore,
    remote_path: &str,
    labels: &[String],
    dry_run: bool,
) -> usize {
    let mut failed = 0usize;
    for label in labels {
        let tag = normalize_tag(label);
        if tag.is_empty() {
            // files/tags/add rejects empty tag text, no point calling it
            tracing::warn!("Label {:?} normalizes to an empty tag, skipping", label);
            continue;
        }
        if dry_run {
            tracing::info!("[DRY RUN] Would tag {} with \"{}\"", remote_path, tag);
            continue;
        }
        tracing::debug!(path = %remote_path, tag = %tag, "attaching tag");
        if let Err(e) = store.add_tag(remote_path, &tag).await {
            tracing::warn!("Could not tag {} with \"{}\": {}", remote_path, tag, e);
            failed += 1;
        }
    }
    failed
}

/// Entry point for the sync engine.
///
/// Folder creation precedes all uploads; for each file, the upload step
/// precedes tag attachment; files are processed in scan order. Fatal errors
/// abort the run, per-tag failures only bump the report counter.
pub async fn sync_images(
    store: &dyn RemoteStore,
    local_dir: &Path,
    images: &[LocalImage],
    config: &SyncConfig,
) -> Result<SyncReport, SyncError> {
    let started = Instant::now();

    ensure_folder(store, &config.remote_root, config.dry_run).await?;

    let pb = create_progress_bar(config.no_progress_bar, images.len() as u64);
    let mut report = SyncReport::default();

    for image in images {
        pb.set_message(image.file_name.clone());
        let local_path = local_dir.join(&image.file_name);
        let remote_path = format!("{}/{}", config.remote_root, image.file_name);

        match upload_if_absent(store, &local_path, &remote_path, config.dry_run).await {
            Ok(UploadOutcome::Uploaded) => report.uploaded += 1,
            Ok(UploadOutcome::Skipped) => report.skipped += 1,
            Err(e) => {
                pb.finish_and_clear();
                return Err(e);
            }
        }

        report.failed_tags += attach_tags(store, &remote_path, &image.labels, config.dry_run).await;
        pb.inc(1);
    }

    pb.finish_and_clear();

    if config.dry_run {
        println!("── Dry Run Summary ──");
        println!(
            "  {} files would be uploaded, {} already present",
            report.uploaded, report.skipped
        );
        println!("  destination: {}", config.remote_root);
    } else {
        println!("── Summary ──");
        println!(
            "  {} uploaded, {} skipped, {} total",
            report.uploaded,
            report.skipped,
            images.len()
        );
        if report.failed_tags > 0 {
            println!("  {} tag attachments failed", report.failed_tags);
        }
    }
    println!("  elapsed: {}", format_duration(started.elapsed()));

    Ok(report)
}

/// Create a progress bar with a consistent template.
///
/// Returns `ProgressBar::hidden()` when the user passed `--no-progress-bar`
/// or stderr is not a TTY (piped output, cron jobs).
fn create_progress_bar(no_progress_bar: bool, total: u64) -> ProgressBar {
    if no_progress_bar || !std::io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}",
        )
        .expect("valid template")
        .progress_chars("=> "),
    );
    pb
}

fn format_duration(d: Duration) -> String {
    let total_secs = d.as_secs();
    let hours = total_secs / 3600;
    let mins = (total_secs % 3600) / 60;
    let secs = total_secs % 60;

    if hours > 0 {
        format!("{}h {:02}m {:02}s", hours, mins, secs)
    } else if mins > 0 {
        format!("{}m {:02}s", mins, secs)
    } else {
        format!("{}s", secs)
    }
}
