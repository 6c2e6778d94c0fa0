//! Local metadata reader — enumerates JPEG files in a directory and reads
//! the Finder tags macOS stores for each of them.
//!
//! Finder tags live in the `com.apple.metadata:_kMDItemUserTags` extended
//! attribute as a binary property list of strings. Tags with a color carry a
//! `\n<color-index>` suffix ("Urgent\n6") which is stripped on read. A file
//! with no attribute, or on a filesystem without xattr support, simply has no
//! labels; that is never an error.

pub mod normalize;

pub use normalize::normalize_tag;

use std::path::Path;

use anyhow::{Context, Result};

/// Extended attribute holding the Finder tag list.
const FINDER_TAGS_XATTR: &str = "com.apple.metadata:_kMDItemUserTags";

/// One matched image file and its Finder labels, in directory-scan order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalImage {
    pub file_name: String,
    pub labels: Vec<String>,
}

/// Scan `dir` for JPEG files and read each file's Finder labels.
///
/// Matches regular files with a case-insensitive `jpg`/`jpeg` extension.
/// Files are returned in the order the directory iterator yields them, not
/// sorted. Files whose names are not valid UTF-8 are skipped with a warning
/// since they cannot become Dropbox paths.
pub fn scan_image_tags(dir: &Path) -> Result<Vec<LocalImage>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory {}", dir.display()))?;

    let mut images = Vec::new();
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let path = entry.path();
        if !is_jpeg_path(&path) {
            continue;
        }
        let file_name = match path.file_name().and_then(|f| f.to_str()) {
            Some(name) => name.to_string(),
            None => {
                tracing::warn!("Skipping {}: file name is not valid UTF-8", path.display());
                continue;
            }
        };
        let labels = read_finder_labels(&path);
        tracing::debug!(file = %file_name, labels = labels.len(), "scanned");
        images.push(LocalImage { file_name, labels });
    }

    Ok(images)
}

fn is_jpeg_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("jpg") || ext.eq_ignore_ascii_case("jpeg"))
}

/// Read the Finder tag labels of one file. Missing attribute, unsupported
/// filesystem, and unparsable plist data all yield an empty list.
fn read_finder_labels(path: &Path) -> Vec<String> {
    let bytes = match xattr::get(path, FINDER_TAGS_XATTR) {
        Ok(Some(bytes)) => bytes,
        Ok(None) => return Vec::new(),
        Err(e) => {
            tracing::debug!("No Finder tags for {}: {}", path.display(), e);
            return Vec::new();
        }
    };
    match parse_finder_labels(&bytes) {
        Ok(labels) => labels,
        Err(e) => {
            tracing::warn!(
                "Could not parse Finder tag plist for {}: {}",
                path.display(),
                e
            );
            Vec::new()
        }
    }
}

/// Decode the attribute's binary plist into plain label names.
fn parse_finder_labels(bytes: &[u8]) -> Result<Vec<String>, plist::Error> {
    let raw: Vec<String> = plist::from_bytes(bytes)?;
    Ok(raw.iter().map(|tag| strip_color_suffix(tag)).collect())
}

/// Finder stores colored tags as `Name\n<color-index>`; keep the name only.
fn strip_color_suffix(tag: &str) -> String {
    tag.split('\n').next().unwrap_or_default().to_string()
}
