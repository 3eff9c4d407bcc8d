//! Error types for capy-apps

use std::path::PathBuf;

/// Catalog and launch errors.
///
/// Malformed desktop files never surface here; they are skipped during
/// parsing. Only lookups, launches and the watcher can fail.
#[derive(Debug, thiserror::Error)]
pub enum AppsError {
    #[error("Failed to spawn `{command}` in {}: {source}", .working_dir.display())]
    Spawn {
        command: String,
        working_dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No application named '{0}'")]
    NotFound(String),

    #[error("Watcher error: {0}")]
    Watch(#[from] notify::Error),
}
