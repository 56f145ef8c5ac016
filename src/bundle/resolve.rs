//! Module resolution for inline ES module scripts.
//!
//! Rules, first match wins:
//!
//! 1. [`ENTRY_ID`] is the script text itself.
//! 2. A specifier under the JS root (`/js/...`) maps onto the build tree.
//! 3. With a non-empty `relative` attribute, the specifier is joined onto
//!    that file's directory, if the result exists.
//! 4. A `./` or `../` specifier inside a file module is joined onto the
//!    importing file's directory, if the result exists.
//!
//! Anything else is a resolution error. A path without a `.js` extension
//! also tries `<path>.js`.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::pipeline::PipelineError;
use crate::utils::path::join_site_path;

/// Identifier of the synthetic entry module.
pub const ENTRY_ID: &str = "inline-script";

/// A module in the bundle graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ModuleId {
    /// The inline script being compiled.
    Entry,
    File(PathBuf),
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Entry => f.write_str(ENTRY_ID),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Resolves import specifiers for one script tag.
#[derive(Debug, Clone, Copy)]
pub struct ModuleResolver<'a> {
    build_root: &'a Path,
    js_root: &'a str,
    relative: Option<&'a str>,
}

impl<'a> ModuleResolver<'a> {
    /// `relative` is the tag's `relative` attribute; empty means absent.
    pub fn new(build_root: &'a Path, js_root: &'a str, relative: Option<&'a str>) -> Self {
        Self {
            build_root,
            js_root,
            relative: relative.filter(|r| !r.is_empty()),
        }
    }

    pub fn resolve(&self, specifier: &str, importer: &ModuleId) -> Result<ModuleId, PipelineError> {
        if specifier == ENTRY_ID {
            return Ok(ModuleId::Entry);
        }

        if specifier.starts_with(self.js_root) {
            let path = join_site_path(self.build_root, specifier);
            return Ok(ModuleId::File(existing(&path).unwrap_or(path)));
        }

        if let Some(relative) = self.relative {
            let dir = relative.rsplit_once('/').map_or("", |(dir, _)| dir);
            if let Some(path) = self.join_existing(dir, specifier) {
                return Ok(ModuleId::File(path));
            }
        }

        if let ModuleId::File(importer_path) = importer
            && (specifier.starts_with("./") || specifier.starts_with("../"))
            && let Some(dir) = self.site_dir_of(importer_path)
            && let Some(path) = self.join_existing(&dir, specifier)
        {
            return Ok(ModuleId::File(path));
        }

        Err(PipelineError::Resolution {
            specifier: specifier.to_string(),
            importer: importer.to_string(),
        })
    }

    /// Join `specifier` onto the site directory `dir`, if the file exists.
    fn join_existing(&self, dir: &str, specifier: &str) -> Option<PathBuf> {
        let joined = format!("{}/{}", dir.trim_end_matches('/'), specifier);
        existing(&join_site_path(self.build_root, &joined))
    }

    /// Site-relative directory of a file inside the build root.
    fn site_dir_of(&self, file: &Path) -> Option<String> {
        let relative = file.strip_prefix(self.build_root).ok()?;
        let dir = relative.parent()?;
        Some(dir.to_string_lossy().replace('\\', "/"))
    }
}

fn existing(path: &Path) -> Option<PathBuf> {
    if path.is_file() {
        return Some(path.to_path_buf());
    }
    if path.extension().is_none() {
        let with_ext = path.with_extension("js");
        if with_ext.is_file() {
            return Some(with_ext);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn site() -> TempDir {
        let dir = TempDir::new().unwrap();
        for file in ["js/util.js", "pages/js/util.js", "pages/helper.js", "js/lib/math.js"] {
            let path = dir.path().join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, "export const x = 1;").unwrap();
        }
        dir
    }

    #[test]
    fn test_entry() {
        let dir = site();
        let resolver = ModuleResolver::new(dir.path(), "/js/", None);
        assert_eq!(resolver.resolve(ENTRY_ID, &ModuleId::Entry).unwrap(), ModuleId::Entry);
    }

    #[test]
    fn test_js_root_wins_over_relative() {
        let dir = site();
        let resolver = ModuleResolver::new(dir.path(), "/js/", Some("/pages/home.js"));
        assert_eq!(
            resolver.resolve("/js/util.js", &ModuleId::Entry).unwrap(),
            ModuleId::File(dir.path().join("js/util.js"))
        );
    }

    #[test]
    fn test_js_root_missing_file_still_maps() {
        let dir = site();
        let resolver = ModuleResolver::new(dir.path(), "/js/", None);
        assert_eq!(
            resolver.resolve("/js/none.js", &ModuleId::Entry).unwrap(),
            ModuleId::File(dir.path().join("js/none.js"))
        );
    }

    #[test]
    fn test_relative_to_tag() {
        let dir = site();
        let resolver = ModuleResolver::new(dir.path(), "/js/", Some("/pages/home.js"));
        assert_eq!(
            resolver.resolve("./helper.js", &ModuleId::Entry).unwrap(),
            ModuleId::File(dir.path().join("pages/helper.js"))
        );
        assert_eq!(
            resolver.resolve("./helper", &ModuleId::Entry).unwrap(),
            ModuleId::File(dir.path().join("pages/helper.js"))
        );
    }

    #[test]
    fn test_empty_relative_is_absent() {
        let dir = site();
        let resolver = ModuleResolver::new(dir.path(), "/js/", Some(""));
        assert!(matches!(
            resolver.resolve("./helper.js", &ModuleId::Entry),
            Err(PipelineError::Resolution { .. })
        ));
    }

    #[test]
    fn test_relative_to_importing_file() {
        let dir = site();
        let resolver = ModuleResolver::new(dir.path(), "/js/", None);
        let importer = ModuleId::File(dir.path().join("js/lib/math.js"));
        assert_eq!(
            resolver.resolve("../util.js", &importer).unwrap(),
            ModuleId::File(dir.path().join("js/util.js"))
        );
    }

    #[test]
    fn test_unresolvable() {
        let dir = site();
        let resolver = ModuleResolver::new(dir.path(), "/js/", None);
        let err = resolver.resolve("lodash", &ModuleId::Entry).unwrap_err();
        assert_eq!(
            err.to_string(),
            "cannot resolve import `lodash` from `inline-script`"
        );
    }
}
