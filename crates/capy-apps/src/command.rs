//! Launch command synthesis from `Exec` templates.

use crate::desktop_entry::AppEntry;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Field codes substituted with file or URL arguments. Nothing is ever
/// passed to a launched app, so these are dropped.
pub const FILE_FIELD_CODES: [&str; 4] = ["%f", "%F", "%u", "%U"];

/// A shell command line ready to run, plus where to run it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LaunchCommand {
    pub command: String,
    pub working_dir: PathBuf,
}

/// Strip file field codes from an `Exec` template.
///
/// The template is split on whitespace and re-joined with single spaces.
/// Anything else, shell metacharacters included, passes through untouched.
pub fn strip_field_codes(exec: &str) -> String {
    exec.split_whitespace()
        .filter(|token| !FILE_FIELD_CODES.contains(token))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Build the command for `entry`, falling back to `cwd` when it sets no `Path`.
pub fn build(entry: &AppEntry, cwd: &Path) -> LaunchCommand {
    LaunchCommand {
        command: strip_field_codes(&entry.exec),
        working_dir: entry
            .working_dir
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| cwd.to_path_buf()),
    }
}

/// Build the command for `entry` relative to the process working directory.
pub fn build_in_current_dir(entry: &AppEntry) -> LaunchCommand {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    build(entry, &cwd)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(exec: &str, working_dir: Option<&str>) -> AppEntry {
        AppEntry {
            name: "App".into(),
            exec: exec.into(),
            working_dir: working_dir.map(String::from),
            comment: None,
            visible: true,
            id: "app.desktop".into(),
            source: PathBuf::from("/apps/app.desktop"),
        }
    }

    #[test]
    fn test_strip_field_codes_table() {
        let cases = [
            ("app %U --flag %f", "app --flag"),
            ("app", "app"),
            ("%u app", "app"),
            ("app %F", "app"),
            ("app %f %F %u %U", "app"),
            ("  app   --a  %u   --b  ", "app --a --b"),
            ("%f %U", ""),
            ("app %i %c %k", "app %i %c %k"),
            ("app --file=%f", "app --file=%f"),
            ("app %%f", "app %%f"),
            ("app %x", "app %x"),
            ("app\t%U\t--tab", "app --tab"),
            ("sh -c 'echo $HOME | cat' %U", "sh -c 'echo $HOME | cat'"),
        ];

        for (input, expected) in cases {
            assert_eq!(strip_field_codes(input), expected, "input: {input:?}");
        }
    }

    #[test]
    fn test_field_codes_case_sensitive() {
        assert_eq!(strip_field_codes("app %d %D %n %N"), "app %d %D %n %N");
    }

    #[test]
    fn test_build_uses_entry_working_dir() {
        let cmd = build(&entry("game %U", Some("/opt/game")), Path::new("/home/user"));
        assert_eq!(
            cmd,
            LaunchCommand {
                command: "game".into(),
                working_dir: PathBuf::from("/opt/game"),
            }
        );
    }

    #[test]
    fn test_build_falls_back_to_cwd() {
        let cmd = build(&entry("editor %f", None), Path::new("/home/user"));
        assert_eq!(cmd.command, "editor");
        assert_eq!(cmd.working_dir, PathBuf::from("/home/user"));
    }

    #[test]
    fn test_build_in_current_dir() {
        let cmd = build_in_current_dir(&entry("editor", None));
        assert_eq!(cmd.working_dir, std::env::current_dir().unwrap());
    }
}
