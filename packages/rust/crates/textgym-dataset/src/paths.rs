//! Output path helpers.

use std::path::{Path, PathBuf};

/// Default output directory (before `~` expansion).
pub const DEFAULT_OUTPUT_DIR: &str = "~/data/textarena";

/// Expand a leading `~` or `~/` to the home directory.
///
/// Other paths, `~user` forms, and paths on systems without a home directory
/// are returned unchanged.
#[must_use]
pub fn expand_home(path: &str) -> PathBuf {
    expand_with_home(path, dirs::home_dir().as_deref())
}

fn expand_with_home(path: &str, home: Option<&Path>) -> PathBuf {
    let Some(home) = home else {
        return PathBuf::from(path);
    };
    if path == "~" {
        return home.to_path_buf();
    }
    match path.strip_prefix("~/") {
        Some(rest) => home.join(rest),
        None => PathBuf::from(path),
    }
}
