//! Search path helpers for XDG application and executable directories.

use std::env;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Ordered directories the catalog reads from, highest priority first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchPath {
    /// Directories scanned for `.desktop` files.
    pub app_dirs: Vec<PathBuf>,
    /// Directories searched when resolving a bare `TryExec` name.
    pub exec_dirs: Vec<PathBuf>,
}

impl SearchPath {
    pub fn new(app_dirs: Vec<PathBuf>, exec_dirs: Vec<PathBuf>) -> Self {
        Self {
            app_dirs,
            exec_dirs,
        }
    }

    /// Build the search path from `XDG_DATA_HOME`, `XDG_DATA_DIRS` and `PATH`.
    pub fn from_env() -> Self {
        Self {
            app_dirs: application_directories(),
            exec_dirs: executable_directories(),
        }
    }
}

/// Fallback for an unset or empty `XDG_DATA_DIRS`.
const DEFAULT_DATA_DIRS: &str = "/usr/local/share:/usr/share";

/// Get all application .desktop file directories.
pub fn application_directories() -> Vec<PathBuf> {
    application_directories_from(
        &dirs::home_dir().unwrap_or_default(),
        dirs::data_dir(),
        env::var("XDG_DATA_DIRS").ok(),
    )
}

/// Application directories for the given home, data home and `XDG_DATA_DIRS`.
/// The user data dir comes first so local overrides shadow system entries.
pub fn application_directories_from(
    home: &Path,
    data_home: Option<PathBuf>,
    data_dirs: Option<String>,
) -> Vec<PathBuf> {
    let mut dirs = Vec::new();

    if let Some(data_home) = data_home {
        dirs.push(data_home.join("applications"));
    }

    let data_dirs = data_dirs
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_DATA_DIRS.to_string());
    for data_dir in data_dirs.split(':') {
        if !data_dir.is_empty() {
            dirs.push(PathBuf::from(data_dir).join("applications"));
        }
    }

    dirs.push(PathBuf::from("/var/lib/flatpak/exports/share/applications"));
    dirs.push(home.join(".local/share/flatpak/exports/share/applications"));
    dirs.push(PathBuf::from("/var/lib/snapd/desktop/applications"));

    dirs
}

/// Directories listed in `PATH`, in order.
pub fn executable_directories() -> Vec<PathBuf> {
    executable_directories_from(env::var_os("PATH").as_deref())
}

/// Split a `PATH`-style value into directories, dropping empty segments.
pub fn executable_directories_from(path: Option<&OsStr>) -> Vec<PathBuf> {
    path.map(|path| {
        env::split_paths(path)
            .filter(|dir| !dir.as_os_str().is_empty())
            .collect()
    })
    .unwrap_or_default()
}

/// Locate `program` as an executable file.
///
/// Values containing a `/` are checked as given (relative ones against the
/// process cwd); bare names are looked up in `exec_dirs` in order.
pub fn find_executable(program: &str, exec_dirs: &[PathBuf]) -> Option<PathBuf> {
    if program.is_empty() {
        return None;
    }

    let is_path = program.contains('/');
    if !is_path && exec_dirs.is_empty() {
        return None;
    }

    let search = if is_path {
        None
    } else {
        Some(env::join_paths(exec_dirs).ok()?)
    };
    let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("/"));

    which::which_in(program, search, cwd).ok()
}
