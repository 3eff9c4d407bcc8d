//! Desktop entry parsing.

use crate::discovery::DiscoveredFile;
use crate::paths::find_executable;
use log::{Level, log};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

const MAIN_GROUP: &str = "[Desktop Entry]";

/// An application parsed from a .desktop file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AppEntry {
    /// Human readable `Name`, also the catalog key.
    pub name: String,
    /// Raw `Exec` template, never empty.
    pub exec: String,
    pub working_dir: Option<String>,
    pub comment: Option<String>,
    /// False when the entry sets `Hidden` or `NoDisplay`.
    pub visible: bool,
    /// Desktop file id the entry was read from (e.g. "firefox.desktop").
    pub id: String,
    pub source: PathBuf,
}

/// Why a desktop file did not make it into the catalog.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Skip {
    Unreadable(String),
    MissingMainGroup,
    NotApplication(Option<String>),
    MissingName,
    MissingExec,
    TryExecNotFound(String),
}

impl Skip {
    /// Whether the skip is worth telling the user about.
    /// Entries without `Exec` or with an uninstalled `TryExec` are routine.
    pub fn is_diagnostic(&self) -> bool {
        matches!(
            self,
            Skip::Unreadable(_) | Skip::MissingMainGroup | Skip::MissingName
        )
    }

    /// Log level a skip is reported at.
    pub fn level(&self) -> Level {
        if self.is_diagnostic() {
            Level::Warn
        } else {
            Level::Debug
        }
    }
}

/// Outcome of one parse pass.
#[derive(Debug, Default)]
pub struct ParsedFiles {
    /// Entries keyed by `Name`.
    pub entries: BTreeMap<String, AppEntry>,
    /// Files left out of the catalog, in discovery order.
    pub skipped: Vec<(PathBuf, Skip)>,
}

/// Key/value pairs of the main group, first occurrence of each key kept.
pub fn main_group_fields(content: &str) -> Option<HashMap<&str, &str>> {
    let mut lines = content.lines().map(|line| line.trim_end_matches('\r'));
    lines.by_ref().find(|line| *line == MAIN_GROUP)?;

    let mut fields = HashMap::new();
    for line in lines {
        if line.starts_with('[') {
            break;
        }
        if let Some((key, value)) = line.split_once('=') {
            fields.entry(key.trim()).or_insert(value.trim());
        }
    }

    Some(fields)
}

fn non_empty(value: Option<&&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(|v| v.to_string())
}

fn is_true(value: Option<&&str>) -> bool {
    matches!(value, Some(&"true") | Some(&"1"))
}

/// Parse desktop file content.
///
/// `TryExec` is resolved against `exec_dirs`; an entry whose program is not
/// installed is skipped.
pub fn parse_entry(
    id: &str,
    path: &Path,
    content: &str,
    exec_dirs: &[PathBuf],
) -> Result<AppEntry, Skip> {
    let fields = main_group_fields(content).ok_or(Skip::MissingMainGroup)?;

    match fields.get("Type") {
        Some(&"Application") => {}
        other => return Err(Skip::NotApplication(other.map(|t| t.to_string()))),
    }

    let name = non_empty(fields.get("Name")).ok_or(Skip::MissingName)?;
    let exec = non_empty(fields.get("Exec")).ok_or(Skip::MissingExec)?;

    if let Some(try_exec) = non_empty(fields.get("TryExec")) {
        if find_executable(&try_exec, exec_dirs).is_none() {
            return Err(Skip::TryExecNotFound(try_exec));
        }
    }

    let hidden = is_true(fields.get("Hidden")) || is_true(fields.get("NoDisplay"));

    Ok(AppEntry {
        name,
        exec,
        working_dir: non_empty(fields.get("Path")),
        comment: non_empty(fields.get("Comment")),
        visible: !hidden,
        id: id.to_string(),
        source: path.to_path_buf(),
    })
}

/// Parse a discovered desktop file from disk.
pub fn parse_desktop_file(file: &DiscoveredFile, exec_dirs: &[PathBuf]) -> Result<AppEntry, Skip> {
    let content = fs::read_to_string(&file.path).map_err(|e| Skip::Unreadable(e.to_string()))?;
    parse_entry(&file.key, &file.path, &content, exec_dirs)
}

/// Parse `files` in order into entries keyed by `Name`.
///
/// A later file declaring an existing `Name` replaces the earlier entry.
/// Skipped files are logged at [`Skip::level`] and returned alongside.
pub fn parse_files(files: &[DiscoveredFile], exec_dirs: &[PathBuf]) -> ParsedFiles {
    let mut parsed = ParsedFiles::default();

    for file in files {
        match parse_desktop_file(file, exec_dirs) {
            Ok(app) => {
                parsed.entries.insert(app.name.clone(), app);
            }
            Err(skip) => {
                log!(skip.level(), "Skipping {}: {:?}", file.path.display(), skip);
                parsed.skipped.push((file.path.clone(), skip));
            }
        }
    }

    parsed
}
