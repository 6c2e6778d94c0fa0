//! Interactive selection layer — supplies whatever the command line did not:
//! the local directory, the access token (with instructions for generating
//! one), and the remote destination, the latter via manual entry or a
//! level-by-level browser over the remote folder hierarchy.

use std::path::PathBuf;

use anyhow::Result;
use dialoguer::{Input, Select};

use crate::config::expand_tilde;
use crate::dropbox::{Metadata, RemoteStore};

/// Blocking terminal prompts behind a seam so the selection flows can be
/// driven by scripted answers in tests.
pub trait Prompter {
    /// Free-form line input; an empty line is allowed and returned as `""`.
    fn input(&self, prompt: &str) -> Result<String>;

    /// Hidden input for the access token.
    fn secret(&self, prompt: &str) -> Result<String>;

    /// Menu selection; `None` when the user cancels with Esc or `q`.
    fn select(&self, prompt: &str, items: &[String]) -> Result<Option<usize>>;
}

/// Real prompts on the controlling terminal. The blocking dialoguer and
/// rpassword calls run inside `block_in_place`, which requires the
/// multi-thread tokio runtime.
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn input(&self, prompt: &str) -> Result<String> {
        let text = tokio::task::block_in_place(|| {
            Input::<String>::new()
                .with_prompt(prompt)
                .allow_empty(true)
                .interact_text()
        })?;
        Ok(text)
    }

    fn secret(&self, prompt: &str) -> Result<String> {
        let text = tokio::task::block_in_place(|| rpassword::prompt_password(prompt))?;
        Ok(text)
    }

    fn select(&self, prompt: &str, items: &[String]) -> Result<Option<usize>> {
        let choice = tokio::task::block_in_place(|| {
            Select::new()
                .with_prompt(prompt)
                .items(items)
                .default(0)
                .interact_opt()
        })?;
        Ok(choice)
    }
}

/// Ask for the folder containing the images. Returns `None` when the user
/// enters nothing.
pub fn pick_local_directory(prompter: &dyn Prompter) -> Result<Option<PathBuf>> {
    let raw = prompter.input("Folder containing the images")?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    Ok(Some(expand_tilde(trimmed)))
}

/// Resolve the access token: a configured (flag or env) value wins,
/// otherwise print the how-to and prompt. Returns `None` when the user
/// enters nothing.
pub fn acquire_token(configured: Option<String>, prompter: &dyn Prompter) -> Result<Option<String>> {
    if let Some(token) = configured {
        if !token.trim().is_empty() {
            return Ok(Some(token));
        }
    }

    println!("To create a Dropbox access token:");
    println!("  1. Go to https://www.dropbox.com/developers/apps and open your app");
    println!("  2. Under \"Generate access token\", click Generate");
    println!("  3. Copy the token and paste it below");

    let token = prompter.secret("Dropbox access token: ")?;
    let token = token.trim().to_string();
    if token.is_empty() {
        return Ok(None);
    }
    Ok(Some(token))
}

enum MenuEntry {
    UseCurrent,
    Manual,
    GoUp,
    Descend(String),
}

/// Browse the remote folder tree one level at a time.
///
/// At the root the menu offers manual entry plus the root's folders; deeper
/// levels add "use this folder" and "go up". A level that fails to list is
/// rendered empty (warned) so the user can still enter a path manually.
/// Returns `None` when the user cancels.
pub async fn pick_remote_folder(
    store: &dyn RemoteStore,
    prompter: &dyn Prompter,
) -> Result<Option<String>> {
    let mut current = String::new();
    loop {
        let folders = match store.list_folder(&current).await {
            Ok(entries) => folder_paths(&entries, &current),
            Err(e) => {
                tracing::warn!("Could not list {}: {}", display_path(&current), e);
                Vec::new()
            }
        };

        let mut entries: Vec<(MenuEntry, String)> = Vec::new();
        if !current.is_empty() {
            entries.push((
                MenuEntry::UseCurrent,
                format!("Use this folder ({current})"),
            ));
        }
        entries.push((MenuEntry::Manual, "Enter a path manually".to_string()));
        if !current.is_empty() {
            entries.push((MenuEntry::GoUp, "Go up".to_string()));
        }
        for path in folders {
            let label = format!("{}/", folder_name(&path));
            entries.push((MenuEntry::Descend(path), label));
        }

        let labels: Vec<String> = entries.iter().map(|(_, label)| label.clone()).collect();
        let prompt = format!("Dropbox folder: {}", display_path(&current));
        let choice = match prompter.select(&prompt, &labels)? {
            Some(i) => i,
            None => return Ok(None),
        };

        match &entries[choice].0 {
            MenuEntry::UseCurrent => return Ok(Some(current)),
            MenuEntry::Manual => {
                let raw = prompter.input("Dropbox path (e.g. /Team/2026)")?;
                match normalize_manual_path(&raw) {
                    Some(path) => return Ok(Some(path)),
                    None => println!("Not a valid Dropbox path."),
                }
            }
            MenuEntry::GoUp => current = parent_path(&current),
            MenuEntry::Descend(path) => current = path.clone(),
        }
    }
}

/// Clean up a hand-entered Dropbox path: trim whitespace, ensure a leading
/// slash, strip trailing slashes. The root itself is not a valid
/// destination.
pub(crate) fn normalize_manual_path(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let mut path = if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    };
    while path.len() > 1 && path.ends_with('/') {
        path.pop();
    }
    if path == "/" {
        return None;
    }
    Some(path)
}

fn folder_paths(entries: &[Metadata], current: &str) -> Vec<String> {
    entries
        .iter()
        .filter_map(|entry| match entry {
            Metadata::Folder(folder) => Some(folder.path_lower.clone().unwrap_or_else(|| {
                format!("{}/{}", current, folder.name.to_lowercase())
            })),
            _ => None,
        })
        .collect()
}

fn folder_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

fn parent_path(path: &str) -> String {
    match path.rfind('/') {
        Some(0) | None => String::new(),
        Some(i) => path[..i].to_string(),
    }
}

fn display_path(path: &str) -> &str {
    if path.is_empty() {
        "/"
    } else {
        path
    }
}
