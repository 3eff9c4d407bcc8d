//! App catalog service shim.
//!
//! Wraps the capy-apps crate for the command line front end.

use capy_apps::{AppEntry, AppEvent, AppsError, CatalogWatcher, Launcher};
use log::{info, warn};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;

/// One row of the app list handed to a selection UI.
pub struct AppRow {
    pub entry: AppEntry,
    pub annotation: Option<String>,
}

/// Build the launcher for this session from the environment.
pub fn start() -> Launcher {
    let launcher = capy_apps::launcher_from_env();
    info!(
        "App catalog searching {} directories",
        launcher.cache().search_path().app_dirs.len()
    );
    launcher
}

/// List apps with their annotations, ordered by name.
pub fn rows(launcher: &Launcher, include_hidden: bool) -> Vec<AppRow> {
    launcher
        .list_apps(include_hidden)
        .into_iter()
        .map(|entry| {
            let annotation = launcher.annotate(&entry);
            AppRow { entry, annotation }
        })
        .collect()
}

/// Launch the app called `name`.
pub fn run(launcher: &Launcher, name: &str) -> Result<(), AppsError> {
    launcher.run_selected(name)
}

/// Watch the application directories and log every rebuild until the
/// catalog cache goes away.
pub fn watch(launcher: &Launcher) -> Result<(), AppsError> {
    let cache = Arc::clone(launcher.cache());
    let mut rx = cache.subscribe();
    let initial = cache.get();
    info!("Catalog loaded: {} apps", initial.len());

    let watcher = CatalogWatcher::spawn(cache)?;
    if watcher.watched() == 0 {
        warn!("No application directories exist, nothing to watch");
        return Ok(());
    }

    loop {
        match rx.blocking_recv() {
            Ok(AppEvent::Refresh { generation, apps }) => {
                info!("Catalog generation {}: {} apps", generation, apps);
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!("Missed {} catalog events", skipped);
            }
            Err(RecvError::Closed) => return Ok(()),
        }
    }
}
