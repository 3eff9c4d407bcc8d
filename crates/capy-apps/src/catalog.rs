//! App Catalog implementation.

use crate::desktop_entry::{AppEntry, parse_files};
use crate::discovery::{DiscoveredFile, discover};
use crate::paths::SearchPath;
use log::{debug, info};

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::SystemTime;

/// Events emitted when the catalog changes.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// A new catalog generation was published.
    Refresh { generation: u64, apps: usize },
}

/// One immutable generation of parsed desktop entries.
#[derive(Debug)]
pub struct Catalog {
    /// Entries keyed by `Name`.
    pub entries: BTreeMap<String, AppEntry>,
    /// Desktop files the generation was parsed from, in discovery order.
    pub source_files: Vec<PathBuf>,
    /// Taken after parsing finished.
    pub generated_at: SystemTime,
    pub generation: u64,
}

impl Catalog {
    pub fn get(&self, name: &str) -> Option<&AppEntry> {
        self.entries.get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries ordered by name, hidden ones only when `include_hidden` is set.
    pub fn apps(&self, include_hidden: bool) -> impl Iterator<Item = &AppEntry> {
        self.entries
            .values()
            .filter(move |app| include_hidden || app.visible)
    }

    /// Whether the on-disk state in `files` no longer matches this generation.
    fn is_stale(&self, files: &[DiscoveredFile]) -> bool {
        if files.len() != self.source_files.len()
            || files
                .iter()
                .zip(&self.source_files)
                .any(|(file, cached)| &file.path != cached)
        {
            return true;
        }

        files.iter().any(|file| {
            fs::metadata(&file.path)
                .and_then(|meta| meta.modified())
                .map(|mtime| mtime >= self.generated_at)
                .unwrap_or(true)
        })
    }
}

/// Lazily rebuilt catalog of desktop applications.
///
/// Every `get()` rescans the search path and only re-parses when the set of
/// desktop files changed or one of them was modified since the last build.
pub struct CatalogCache {
    search_path: SearchPath,
    current: Mutex<Option<Arc<Catalog>>>,
    parse_passes: AtomicUsize,
    event_tx: tokio::sync::broadcast::Sender<AppEvent>,
}

impl CatalogCache {
    /// Create an empty cache. Nothing is scanned until the first `get()`.
    pub fn new(search_path: SearchPath) -> Self {
        let (tx, _) = tokio::sync::broadcast::channel(16);

        Self {
            search_path,
            current: Mutex::new(None),
            parse_passes: AtomicUsize::new(0),
            event_tx: tx,
        }
    }

    pub fn search_path(&self) -> &SearchPath {
        &self.search_path
    }

    /// Return the current catalog, rebuilding it first if it is stale.
    ///
    /// The check and the swap happen under one lock, so concurrent callers
    /// never see a partially built catalog or race two rebuilds.
    pub fn get(&self) -> Arc<Catalog> {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        let files = discover(&self.search_path.app_dirs);

        if let Some(catalog) = current.as_ref() {
            if !catalog.is_stale(&files) {
                debug!("App catalog generation {} is fresh", catalog.generation);
                return Arc::clone(catalog);
            }
        }

        let generation = current.as_ref().map_or(1, |c| c.generation + 1);
        let catalog = Arc::new(self.build(files, generation));
        *current = Some(Arc::clone(&catalog));

        // Notify listeners
        let _ = self.event_tx.send(AppEvent::Refresh {
            generation,
            apps: catalog.len(),
        });

        catalog
    }

    /// The last published catalog, without checking the filesystem.
    pub fn peek(&self) -> Option<Arc<Catalog>> {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of full parse passes run so far.
    pub fn parse_passes(&self) -> usize {
        self.parse_passes.load(Ordering::SeqCst)
    }

    /// Subscribe to catalog changes.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<AppEvent> {
        self.event_tx.subscribe()
    }

    fn build(&self, files: Vec<DiscoveredFile>, generation: u64) -> Catalog {
        info!("Scanning app catalog ({} desktop files)...", files.len());
        self.parse_passes.fetch_add(1, Ordering::SeqCst);

        let parsed = parse_files(&files, &self.search_path.exec_dirs);
        let generated_at = SystemTime::now();

        info!(
            "App catalog generation {} ready: {} apps, {} files skipped",
            generation,
            parsed.entries.len(),
            parsed.skipped.len()
        );

        Catalog {
            entries: parsed.entries,
            source_files: files.into_iter().map(|f| f.path).collect(),
            generated_at,
            generation,
        }
    }
}
