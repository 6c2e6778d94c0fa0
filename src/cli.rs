use crate::types::LogLevel;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "tagsync-rs",
    about = "Upload Finder-tagged images to Dropbox and publish a tag index"
)]
pub struct Cli {
    /// Local folder containing tagged .jpg/.jpeg images (prompted if omitted)
    #[arg(short = 'd', long)]
    pub directory: Option<String>,

    /// Dropbox folder to upload into (interactive browser if omitted)
    #[arg(short = 'r', long)]
    pub remote_path: Option<String>,

    /// Dropbox access token (if not provided, will prompt).
    /// WARNING: passing via --token is visible in process listings.
    /// Prefer the DROPBOX_TOKEN environment variable instead.
    #[arg(short = 't', long, env = "DROPBOX_TOKEN")]
    pub token: Option<String>,

    /// Do not modify Dropbox; log what would be uploaded and tagged
    #[arg(long)]
    pub dry_run: bool,

    /// Disable progress bar
    #[arg(long)]
    pub no_progress_bar: bool,

    /// Log level
    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,
}
