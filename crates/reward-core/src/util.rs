//! Small helpers shared by the command layer

use crate::{CoreError, Result};
use std::path::{Path, PathBuf};

/// Insert `insert` immediately before every occurrence of `search`, or append
/// it when `search` is absent
pub fn insert_before_occurrence(args: &[String], insert: &str, search: &str) -> Vec<String> {
    insert_around(args, insert, search, true)
}

/// Insert `insert` immediately after every occurrence of `search`, or append
/// it when `search` is absent
pub fn insert_after_occurrence(args: &[String], insert: &str, search: &str) -> Vec<String> {
    insert_around(args, insert, search, false)
}

fn insert_around(args: &[String], insert: &str, search: &str, before: bool) -> Vec<String> {
    let mut out = Vec::with_capacity(args.len() + 1);
    let mut found = false;

    for arg in args {
        let hit = arg == search;
        found |= hit;

        if hit && before {
            out.push(insert.to_string());
        }
        out.push(arg.clone());
        if hit && !before {
            out.push(insert.to_string());
        }
    }

    if !found {
        out.push(insert.to_string());
    }
    out
}

/// Expand `~` and environment variables in a user-supplied path
pub fn expand_path(path: &str) -> Result<PathBuf> {
    let expanded = shellexpand::full(path).map_err(|e| {
        CoreError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("Cannot expand {}: {}", path, e),
        ))
    })?;
    Ok(PathBuf::from(expanded.into_owned()))
}

/// Per-user application data directory, where helper binaries are installed
pub fn app_home_dir() -> Result<PathBuf> {
    Ok(reward_config::GlobalConfig::data_dir()?)
}

/// Whether `name` resolves to an executable on `PATH`
pub fn is_command_available(name: &str) -> bool {
    find_in_path(name, std::env::var_os("PATH").as_deref()).is_some()
}

fn find_in_path(name: &str, path: Option<&std::ffi::OsStr>) -> Option<PathBuf> {
    let candidate = Path::new(name);
    if candidate.components().count() > 1 {
        return is_executable(candidate).then(|| candidate.to_path_buf());
    }

    std::env::split_paths(path?).find_map(|dir| {
        let full = dir.join(name);
        if is_executable(&full) {
            return Some(full);
        }
        if cfg!(windows) {
            let exe = dir.join(format!("{}.exe", name));
            if exe.is_file() {
                return Some(exe);
            }
        }
        None
    })
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Quote an argument for a shell command line: double-quoted with `"`, `\`
/// and control characters escaped on Unix, unchanged on Windows
pub fn quote(s: &str) -> String {
    if cfg!(windows) {
        return s.to_string();
    }

    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_insert_before_occurrence() {
        let out = insert_before_occurrence(&args(&["compose", "up", "-d"]), "--remove-orphans", "-d");
        assert_eq!(out, args(&["compose", "up", "--remove-orphans", "-d"]));
    }

    #[test]
    fn test_insert_after_occurrence() {
        let out = insert_after_occurrence(&args(&["compose", "up"]), "-d", "up");
        assert_eq!(out, args(&["compose", "up", "-d"]));
    }

    #[test]
    fn test_insert_appends_when_absent() {
        assert_eq!(
            insert_before_occurrence(&args(&["a", "b"]), "x", "z"),
            args(&["a", "b", "x"])
        );
        assert_eq!(
            insert_after_occurrence(&args(&["a", "b"]), "x", "z"),
            args(&["a", "b", "x"])
        );
        assert_eq!(insert_after_occurrence(&[], "x", "z"), args(&["x"]));
    }

    #[test]
    fn test_insert_at_every_occurrence() {
        assert_eq!(
            insert_before_occurrence(&args(&["-f", "a.yml", "-f", "b.yml"]), "--x", "-f"),
            args(&["--x", "-f", "a.yml", "--x", "-f", "b.yml"])
        );
        assert_eq!(
            insert_after_occurrence(&args(&["up", "up"]), "-d", "up"),
            args(&["up", "-d", "up", "-d"])
        );
    }

    #[test]
    fn test_expand_path() {
        std::env::set_var("REWARD_TEST_EXPAND_DIR", "/srv/reward");
        assert_eq!(
            expand_path("$REWARD_TEST_EXPAND_DIR/bin").unwrap(),
            PathBuf::from("/srv/reward/bin")
        );
        assert_eq!(expand_path("plain/dir").unwrap(), PathBuf::from("plain/dir"));
        assert!(expand_path("$REWARD_TEST_SURELY_UNSET_VAR/x").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_find_in_path() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::tempdir().unwrap();
        let tool = tmp.path().join("reward-tool");
        std::fs::write(&tool, "#!/bin/sh\n").unwrap();
        std::fs::set_permissions(&tool, std::fs::Permissions::from_mode(0o755)).unwrap();
        std::fs::write(tmp.path().join("not-executable"), "data").unwrap();

        let path = std::env::join_paths([tmp.path()]).unwrap();
        assert_eq!(find_in_path("reward-tool", Some(path.as_os_str())), Some(tool));
        assert_eq!(find_in_path("not-executable", Some(path.as_os_str())), None);
        assert_eq!(find_in_path("missing", Some(path.as_os_str())), None);
        assert_eq!(find_in_path("reward-tool", None), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_is_command_available() {
        assert!(is_command_available("sh"));
        assert!(!is_command_available("reward-test-no-such-program"));
    }

    #[test]
    fn test_quote() {
        if cfg!(windows) {
            assert_eq!(quote("a b"), "a b");
        } else {
            assert_eq!(quote("a b"), "\"a b\"");
            assert_eq!(quote("a\"b"), r#""a\"b""#);
            assert_eq!(quote(r"C:\tmp"), r#""C:\\tmp""#);
            assert_eq!(quote("line\nnext"), r#""line\nnext""#);
        }
    }

    #[test]
    fn test_app_home_dir_is_config_data_dir() {
        assert_eq!(
            app_home_dir().ok(),
            reward_config::GlobalConfig::data_dir().ok()
        );
    }
}
