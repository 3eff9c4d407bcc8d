//! Filesystem watcher that keeps the catalog warm.

use crate::catalog::CatalogCache;
use crate::discovery::DESKTOP_SUFFIX;
use crate::error::AppsError;
use log::{debug, info, warn};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::Duration;

/// Quiet period after the last relevant event before the catalog is rebuilt.
pub const DEBOUNCE: Duration = Duration::from_millis(250);

/// Rebuilds the catalog when desktop files change. Stops when dropped.
///
/// Events are coalesced: a burst (e.g. a package install) causes a single
/// rebuild once the directories have been quiet for [`DEBOUNCE`]. Application
/// directories that do not exist yet are picked up when they are created,
/// as long as their parent exists.
pub struct CatalogWatcher {
    _watcher: Arc<Mutex<RecommendedWatcher>>,
    watched: usize,
}

impl CatalogWatcher {
    /// Watch every existing application directory of `cache`.
    pub fn spawn(cache: Arc<CatalogCache>) -> Result<Self, AppsError> {
        let app_dirs = cache.search_path().app_dirs.clone();
        let (tx, rx) = mpsc::channel::<Vec<PathBuf>>();

        let filter_dirs = app_dirs.clone();
        let watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
            Ok(event) if is_relevant(&event, &filter_dirs) => {
                let _ = tx.send(event.paths);
            }
            Ok(_) => {}
            Err(e) => warn!("App directory watch error: {}", e),
        })?;
        let watcher = Arc::new(Mutex::new(watcher));

        let mut watched = 0;
        let mut pending = Vec::new();
        let mut parents = HashSet::new();
        {
            let mut guard = watcher.lock().unwrap_or_else(PoisonError::into_inner);
            for dir in &app_dirs {
                if dir.is_dir() {
                    match guard.watch(dir, RecursiveMode::Recursive) {
                        Ok(()) => watched += 1,
                        Err(e) => warn!("Cannot watch {}: {}", dir.display(), e),
                    }
                    continue;
                }

                // Watch the parent so the directory is noticed once it appears.
                let Some(parent) = dir.parent().filter(|p| p.is_dir()) else {
                    continue;
                };
                pending.push(dir.clone());
                if parents.insert(parent.to_path_buf()) {
                    if let Err(e) = guard.watch(parent, RecursiveMode::NonRecursive) {
                        debug!("Cannot watch {}: {}", parent.display(), e);
                    }
                }
            }
        }

        info!(
            "Watching {} application directories ({} pending)",
            watched,
            pending.len()
        );

        let weak = Arc::downgrade(&watcher);
        std::thread::spawn(move || rebuild_loop(rx, cache, weak, pending));

        Ok(Self {
            _watcher: watcher,
            watched,
        })
    }

    /// Number of application directories watched at spawn time.
    pub fn watched(&self) -> usize {
        self.watched
    }
}

/// Runs until the watcher is dropped and its event sender goes with it.
fn rebuild_loop(
    rx: Receiver<Vec<PathBuf>>,
    cache: Arc<CatalogCache>,
    watcher: Weak<Mutex<RecommendedWatcher>>,
    mut pending: Vec<PathBuf>,
) {
    while let Ok(first) = rx.recv() {
        let mut events = 1;
        debug!("Desktop files changed: {:?}", first);
        while rx.recv_timeout(DEBOUNCE).is_ok() {
            events += 1;
        }

        watch_new_dirs(&watcher, &mut pending);
        debug!("Rebuilding app catalog after {} events", events);
        cache.get();
    }
}

fn watch_new_dirs(watcher: &Weak<Mutex<RecommendedWatcher>>, pending: &mut Vec<PathBuf>) {
    if pending.iter().all(|dir| !dir.is_dir()) {
        return;
    }
    let Some(watcher) = watcher.upgrade() else {
        return;
    };
    let mut guard = watcher.lock().unwrap_or_else(PoisonError::into_inner);

    pending.retain(|dir| {
        if !dir.is_dir() {
            return true;
        }
        match guard.watch(dir, RecursiveMode::Recursive) {
            Ok(()) => {
                info!("Watching new application directory {}", dir.display());
                false
            }
            Err(e) => {
                warn!("Cannot watch {}: {}", dir.display(), e);
                true
            }
        }
    });
}

fn is_relevant(event: &Event, app_dirs: &[PathBuf]) -> bool {
    let kind = matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    );
    kind && event
        .paths
        .iter()
        .any(|p| is_desktop_path(p) || app_dirs.iter().any(|dir| dir == p))
}

fn is_desktop_path(path: &Path) -> bool {
    path.to_str().is_some_and(|p| p.ends_with(DESKTOP_SUFFIX))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::AppEvent;
    use crate::paths::SearchPath;
    use notify::event::{CreateKind, ModifyKind};
    use std::fs;
    use std::time::Instant;

    fn stage_desktop(dir: &Path, file: &str, name: &str) {
        // Write aside and rename so the watcher never sees a half-written file.
        let staged = dir.join(format!("{file}.tmp"));
        fs::write(
            &staged,
            format!("[Desktop Entry]\nType=Application\nName={name}\nExec=run\n"),
        )
        .unwrap();
        fs::rename(&staged, dir.join(file)).unwrap();
    }

    fn wait_for_apps(cache: &CatalogCache, apps: usize) -> bool {
        let deadline = Instant::now() + Duration::from_secs(10);
        while Instant::now() < deadline {
            if cache.peek().is_some_and(|c| c.len() == apps) {
                return true;
            }
            std::thread::sleep(Duration::from_millis(20));
        }
        false
    }

    #[test]
    fn test_is_relevant() {
        let dirs = vec![PathBuf::from("/share/applications")];

        let create = Event::new(EventKind::Create(CreateKind::File))
            .add_path(PathBuf::from("/apps/a.desktop"));
        assert!(is_relevant(&create, &dirs));

        let other = Event::new(EventKind::Modify(ModifyKind::Any))
            .add_path(PathBuf::from("/apps/readme.txt"));
        assert!(!is_relevant(&other, &dirs));

        let access = Event::new(EventKind::Access(notify::event::AccessKind::Any))
            .add_path(PathBuf::from("/apps/a.desktop"));
        assert!(!is_relevant(&access, &dirs));

        let new_dir = Event::new(EventKind::Create(CreateKind::Folder))
            .add_path(PathBuf::from("/share/applications"));
        assert!(is_relevant(&new_dir, &dirs));

        let sibling = Event::new(EventKind::Create(CreateKind::Folder))
            .add_path(PathBuf::from("/share/icons"));
        assert!(!is_relevant(&sibling, &dirs));
    }

    #[test]
    fn test_watcher_skips_missing_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let search = SearchPath::new(
            vec![dir.path().to_path_buf(), PathBuf::from("/nonexistent/capy/apps")],
            Vec::new(),
        );
        let watcher = CatalogWatcher::spawn(Arc::new(CatalogCache::new(search))).unwrap();
        assert_eq!(watcher.watched(), 1);
    }

    #[test]
    fn test_watcher_rebuilds_on_new_file() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Arc::new(CatalogCache::new(SearchPath::new(
            vec![dir.path().to_path_buf()],
            Vec::new(),
        )));
        assert!(cache.get().is_empty());
        let mut rx = cache.subscribe();

        let _watcher = CatalogWatcher::spawn(Arc::clone(&cache)).unwrap();
        stage_desktop(dir.path(), "new.desktop", "New");

        let deadline = Instant::now() + Duration::from_secs(10);
        let mut seen = false;
        while Instant::now() < deadline {
            if let Ok(AppEvent::Refresh { apps, .. }) = rx.try_recv() {
                if apps == 1 {
                    seen = true;
                    break;
                }
            }
            std::thread::sleep(Duration::from_millis(20));
        }
        assert!(seen);
        assert!(cache.peek().unwrap().get("New").is_some());
    }

    #[test]
    fn test_watcher_coalesces_bursts() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Arc::new(CatalogCache::new(SearchPath::new(
            vec![dir.path().to_path_buf()],
            Vec::new(),
        )));
        cache.get();

        let _watcher = CatalogWatcher::spawn(Arc::clone(&cache)).unwrap();
        for i in 0..20 {
            stage_desktop(dir.path(), &format!("app{i}.desktop"), &format!("App {i}"));
        }

        assert!(wait_for_apps(&cache, 20));
        std::thread::sleep(DEBOUNCE * 2);
        // One initial pass plus far fewer rebuilds than the 20 files written.
        assert!(cache.parse_passes() <= 4, "passes: {}", cache.parse_passes());
    }

    #[test]
    fn test_watcher_picks_up_created_app_dir() {
        let root = tempfile::tempdir().unwrap();
        let app_dir = root.path().join("applications");
        let cache = Arc::new(CatalogCache::new(SearchPath::new(
            vec![app_dir.clone()],
            Vec::new(),
        )));
        assert!(cache.get().is_empty());

        let watcher = CatalogWatcher::spawn(Arc::clone(&cache)).unwrap();
        assert_eq!(watcher.watched(), 0);

        fs::create_dir(&app_dir).unwrap();
        std::thread::sleep(DEBOUNCE * 3);
        stage_desktop(&app_dir, "late.desktop", "Late");

        assert!(wait_for_apps(&cache, 1));
        assert!(cache.peek().unwrap().get("Late").is_some());
    }
}
