//! Path normalization utilities.
//!
//! - `normalize_path` - file system paths (canonicalize + fallback)
//! - `join_site_path` - map a site URL path (`/css/a.css`) under a directory

use std::path::{Component, Path, PathBuf};

/// Normalize a file system path to absolute form.
///
/// Tries `canonicalize()` first (resolves symlinks, `.`, `..`).
/// Falls back to:
/// - Return as-is if already absolute
/// - Join with current directory if relative
#[inline]
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
        }
    })
}

/// Join a site-relative URL path onto `root`.
///
/// Leading slashes, query strings and fragments are dropped, and `.`/`..`
/// segments are folded lexically without escaping `root`.
///
/// ```ignore
/// join_site_path(Path::new("/site/build"), "/css/main.css?v=2")
///     == PathBuf::from("/site/build/css/main.css")
/// ```
pub fn join_site_path(root: &Path, url_path: &str) -> PathBuf {
    let path = url_path
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .trim_start_matches('/');

    let mut parts: Vec<&std::ffi::OsStr> = Vec::new();
    for component in Path::new(path).components() {
        match component {
            Component::Normal(part) => parts.push(part),
            Component::ParentDir => {
                parts.pop();
            }
            _ => {}
        }
    }

    let mut joined = root.to_path_buf();
    joined.extend(parts);
    joined
}
