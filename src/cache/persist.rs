//! Optional on-disk persistence of the transform cache.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::TransformCache;

/// Bumped when the stored text of any stage changes shape.
const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Default, Serialize, Deserialize)]
struct PersistedCache {
    version: u32,
    entries: BTreeMap<String, String>,
}

/// Restore cache entries from `path` into `cache`.
///
/// A missing file is an empty cache. A file written by another format
/// version is ignored. Returns the number of restored entries.
pub fn load_cache(cache: &TransformCache, path: &Path) -> Result<usize> {
    if !path.exists() {
        return Ok(0);
    }
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let persisted: PersistedCache = serde_json::from_str(&content)
        .with_context(|| format!("invalid cache file {}", path.display()))?;

    if persisted.version != FORMAT_VERSION {
        crate::debug!("cache"; "ignoring cache file with version {}", persisted.version);
        return Ok(0);
    }

    let count = persisted.entries.len();
    cache.extend(persisted.entries);
    Ok(count)
}

/// Write all cache entries to `path` (pretty JSON, sorted keys).
pub fn persist_cache(cache: &TransformCache, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let persisted = PersistedCache {
        version: FORMAT_VERSION,
        entries: cache.entries().into_iter().collect(),
    };
    let json = serde_json::to_string_pretty(&persisted)?;
    fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))
}
