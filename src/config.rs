use std::path::PathBuf;

use crate::types::LogLevel;

/// Application configuration resolved from the CLI.
///
/// `directory`, `remote_path` and `token` stay optional here; whatever is
/// missing is supplied interactively by the selection layer at run time.
pub struct Config {
    pub directory: Option<PathBuf>,
    pub remote_path: Option<String>,
    pub token: Option<String>,
    pub log_level: LogLevel,
    pub dry_run: bool,
    pub no_progress_bar: bool,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("directory", &self.directory)
            .field("remote_path", &self.remote_path)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("dry_run", &self.dry_run)
            .finish_non_exhaustive()
    }
}

/// Expand ~ to the user's home directory.
pub(crate) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

impl Config {
    pub fn from_cli(cli: crate::cli::Cli) -> Self {
        Self {
            directory: cli.directory.as_deref().map(expand_tilde),
            remote_path: cli.remote_path,
            token: cli.token,
            log_level: cli.log_level,
            dry_run: cli.dry_run,
            no_progress_bar: cli.no_progress_bar,
        }
    }
}
