//! Environment configuration
//!
//! `UGM_DATABASE_PATH` picks the database file, `UGM_USER` the user every
//! tool acts on behalf of.

use std::path::{Path, PathBuf};

pub const DATABASE_PATH_VAR: &str = "UGM_DATABASE_PATH";
pub const USER_VAR: &str = "UGM_USER";
pub const DEFAULT_USERNAME: &str = "default";

/// Get the database path from environment or use default
pub fn database_path() -> PathBuf {
    std::env::var(DATABASE_PATH_VAR)
        .ok()
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            let exe_dir = std::env::current_exe()
                .ok()
                .and_then(|p| p.parent().map(|p| p.to_path_buf()))
                .unwrap_or_else(|| PathBuf::from("."));
            default_database_path(&exe_dir)
        })
}

/// `<project root>/data/ugm.db`, stepping out of target/debug or target/release
fn default_database_path(exe_dir: &Path) -> PathBuf {
    let mut path = exe_dir.to_path_buf();

    if path.ends_with("release") || path.ends_with("debug") {
        if let Some(grandparent) = path.parent().and_then(Path::parent) {
            path = grandparent.to_path_buf();
        }
    }

    path.push("data");
    path.push("ugm.db");
    path
}

/// Username of the active user
pub fn active_username() -> String {
    username_or_default(std::env::var(USER_VAR).ok())
}

fn username_or_default(value: Option<String>) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_USERNAME.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_path_steps_out_of_target() {
        let path = default_database_path(Path::new("/home/me/ugm/target/release"));
        assert_eq!(path, PathBuf::from("/home/me/ugm/data/ugm.db"));

        let path = default_database_path(Path::new("/opt/ugm/bin"));
        assert_eq!(path, PathBuf::from("/opt/ugm/bin/data/ugm.db"));
    }

    #[test]
    fn test_username_fallback() {
        assert_eq!(username_or_default(None), "default");
        assert_eq!(username_or_default(Some("  ".to_string())), "default");
        assert_eq!(username_or_default(Some(" hiker ".to_string())), "hiker");
    }
}
