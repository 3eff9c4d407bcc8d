//! Selection-facing launcher: lists catalog entries and runs the chosen one.

use crate::catalog::CatalogCache;
use crate::command::build_in_current_dir;
use crate::desktop_entry::AppEntry;
use crate::error::AppsError;
use log::info;
use std::process::{Command, Stdio};
use std::sync::Arc;

/// Action run on the selected entry.
pub type ActionFn = Box<dyn Fn(&AppEntry) -> Result<(), AppsError> + Send + Sync>;

/// Annotation shown next to an entry in a selection list.
pub type AnnotateFn = Box<dyn Fn(&AppEntry) -> Option<String> + Send + Sync>;

/// Spawn the entry's command through `sh -c` without waiting for it.
pub fn spawn_via_shell(entry: &AppEntry) -> Result<(), AppsError> {
    let launch = build_in_current_dir(entry);
    info!("Launching {}: {}", entry.name, launch.command);

    Command::new("sh")
        .arg("-c")
        .arg(&launch.command)
        .current_dir(&launch.working_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map(|_| ())
        .map_err(|source| AppsError::Spawn {
            command: launch.command,
            working_dir: launch.working_dir,
            source,
        })
}

/// Default annotation: the entry's `Comment`.
pub fn comment_annotation(entry: &AppEntry) -> Option<String> {
    entry.comment.clone()
}

/// Glue between a catalog cache and whatever UI picks an entry.
pub struct Launcher {
    cache: Arc<CatalogCache>,
    action: ActionFn,
    annotate: AnnotateFn,
}

impl Launcher {
    pub fn new(cache: Arc<CatalogCache>) -> Self {
        Self {
            cache,
            action: Box::new(spawn_via_shell),
            annotate: Box::new(comment_annotation),
        }
    }

    /// Replace the action run by `run_selected`.
    pub fn with_action<F>(mut self, action: F) -> Self
    where
        F: Fn(&AppEntry) -> Result<(), AppsError> + Send + Sync + 'static,
    {
        self.action = Box::new(action);
        self
    }

    /// Replace the annotation function.
    pub fn with_annotation<F>(mut self, annotate: F) -> Self
    where
        F: Fn(&AppEntry) -> Option<String> + Send + Sync + 'static,
    {
        self.annotate = Box::new(annotate);
        self
    }

    pub fn cache(&self) -> &Arc<CatalogCache> {
        &self.cache
    }

    /// Entries ordered by name.
    pub fn list_apps(&self, include_hidden: bool) -> Vec<AppEntry> {
        self.cache.get().apps(include_hidden).cloned().collect()
    }

    pub fn annotate(&self, entry: &AppEntry) -> Option<String> {
        (self.annotate)(entry)
    }

    /// Run the action on the entry named `name`.
    pub fn run_selected(&self, name: &str) -> Result<(), AppsError> {
        let catalog = self.cache.get();
        let entry = catalog
            .get(name)
            .ok_or_else(|| AppsError::NotFound(name.to_string()))?;
        (self.action)(entry)
    }
}
