//! Desktop file discovery.

use log::debug;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Suffix every desktop entry file carries.
pub const DESKTOP_SUFFIX: &str = ".desktop";

/// Separator replacing `/` when building a desktop file id.
const KEY_DELIMITER: &str = "-";

/// A desktop file found on disk, with its desktop file id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiscoveredFile {
    /// Path relative to the search dir, `/` replaced by `-` (e.g. "kde-konsole.desktop").
    pub key: String,
    pub path: PathBuf,
}

/// Walk `app_dirs` in order and collect readable desktop files.
///
/// Missing directories contribute nothing. When two directories hold the same
/// key the earlier directory wins. Within a directory entries are visited in
/// file name order so repeated scans of an unchanged tree are identical.
pub fn discover(app_dirs: &[PathBuf]) -> Vec<DiscoveredFile> {
    let mut seen = HashSet::new();
    let mut found = Vec::new();

    for dir in app_dirs {
        if !dir.is_dir() {
            continue;
        }

        let walker = walkdir::WalkDir::new(dir)
            .follow_links(true)
            .sort_by_file_name();

        for entry in walker.into_iter().filter_map(|e| e.ok()) {
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let Some(key) = desktop_file_key(dir, path) else {
                continue;
            };

            if fs::File::open(path).is_err() {
                debug!("Skipping unreadable desktop file {}", path.display());
                continue;
            }

            if seen.insert(key.clone()) {
                found.push(DiscoveredFile {
                    key,
                    path: path.to_path_buf(),
                });
            }
        }
    }

    found
}

/// Desktop file id for `path` relative to `root`, or `None` if it is not a desktop file.
pub fn desktop_file_key(root: &Path, path: &Path) -> Option<String> {
    let file_name = path.file_name()?.to_str()?;
    if file_name.len() <= DESKTOP_SUFFIX.len() || !file_name.ends_with(DESKTOP_SUFFIX) {
        return None;
    }

    let relative = path.strip_prefix(root).ok()?;
    let parts = relative
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<Vec<&str>>>()?;

    Some(parts.join(KEY_DELIMITER))
}
