//! tagsync-rs — upload Finder-tagged images to Dropbox and publish a tag
//! index.
//!
//! Scans a local folder for JPEG files, reads each file's Finder tags from
//! the `com.apple.metadata:_kMDItemUserTags` xattr, uploads the files to a
//! chosen Dropbox folder (skipping files already present), attaches the
//! normalized tags remotely, and publishes a `tags.xlsx` label→tag index
//! alongside them. Anything not provided on the command line is gathered
//! interactively.

#![warn(clippy::all)]

mod cli;
mod config;
mod dropbox;
mod export;
mod picker;
mod sync;
mod tags;
mod types;

use std::path::PathBuf;

use anyhow::bail;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use config::Config;
use dropbox::DropboxClient;
use picker::{Prompter, TerminalPrompter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    let filter = cli.log_level.as_str();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .init();

    let config = Config::from_cli(cli);
    tracing::debug!(?config, "Starting tagsync-rs");

    run(config).await
}

/// End-to-end flow: gather inputs, scan, sync, export.
///
/// User aborts (empty prompt answers, cancelled menus) print a message and
/// return `Ok` without touching the remote store; real failures propagate
/// and exit non-zero. An export failure is logged but does not fail a run
/// whose uploads already completed.
async fn run(config: Config) -> anyhow::Result<()> {
    let prompter = TerminalPrompter;

    let directory = match resolve_directory(&config, &prompter)? {
        Some(dir) => dir,
        None => {
            println!("No folder selected. Exiting.");
            return Ok(());
        }
    };
    if !directory.is_dir() {
        bail!("Directory does not exist: {}", directory.display());
    }

    let token = match picker::acquire_token(config.token.clone(), &prompter)? {
        Some(token) => token,
        None => {
            println!("No Dropbox access token entered. Exiting.");
            return Ok(());
        }
    };
    let client = DropboxClient::new(token);

    let remote_root = match resolve_remote_root(&config, &client, &prompter).await? {
        Some(path) => path,
        None => {
            println!("No Dropbox path selected. Exiting.");
            return Ok(());
        }
    };

    let images = tags::scan_image_tags(&directory)?;
    tracing::info!("Found {} image(s) in {}", images.len(), directory.display());

    let sync_config = sync::SyncConfig {
        remote_root: remote_root.clone(),
        dry_run: config.dry_run,
        no_progress_bar: config.no_progress_bar,
    };
    sync::sync_images(&client, &directory, &images, &sync_config).await?;

    if let Err(e) = export::publish_index(&client, &images, &remote_root, config.dry_run).await {
        tracing::error!("Could not publish the tag index: {}", e);
    }

    Ok(())
}

fn resolve_directory(config: &Config, prompter: &dyn Prompter) -> anyhow::Result<Option<PathBuf>> {
    match &config.directory {
        Some(dir) => Ok(Some(dir.clone())),
        None => picker::pick_local_directory(prompter),
    }
}

async fn resolve_remote_root(
    config: &Config,
    store: &DropboxClient,
    prompter: &dyn Prompter,
) -> anyhow::Result<Option<String>> {
    match &config.remote_path {
        Some(raw) => match picker::normalize_manual_path(raw) {
            Some(path) => Ok(Some(path)),
            None => bail!("Invalid --remote-path: {:?}", raw),
        },
        None => picker::pick_remote_folder(store, prompter).await,
    }
}
