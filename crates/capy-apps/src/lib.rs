//! capy-apps: Desktop application catalog for Linux desktops.
//!
//! Provides:
//! - Discovery of .desktop files across the XDG application directories
//! - Permissive parsing of the `[Desktop Entry]` group
//! - An mtime-checked catalog cache that only re-parses when files change
//! - Launch command synthesis from `Exec` templates
//! - A launcher with swappable action/annotation strategies for selection UIs

mod catalog;
mod command;
mod desktop_entry;
mod discovery;
mod error;
mod launcher;
mod paths;
mod watcher;

pub use catalog::{AppEvent, Catalog, CatalogCache};
pub use command::{FILE_FIELD_CODES, LaunchCommand, build, build_in_current_dir, strip_field_codes};
pub use desktop_entry::{AppEntry, ParsedFiles, Skip, parse_entry, parse_files};
pub use discovery::{DiscoveredFile, discover};
pub use error::AppsError;
pub use launcher::{ActionFn, AnnotateFn, Launcher, comment_annotation, spawn_via_shell};
pub use paths::{SearchPath, find_executable};
pub use watcher::CatalogWatcher;

use std::sync::Arc;

/// Create a launcher over the application directories from the environment.
pub fn launcher_from_env() -> Launcher {
    Launcher::new(Arc::new(CatalogCache::new(SearchPath::from_env())))
}
