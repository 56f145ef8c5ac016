//! `[cache]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [cache]
//! persist = true                      # Keep transform results between runs
//! path = ".pressline/cache.json"      # Cache file (relative to project root, `~` expanded)
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Load the cache before a run and store it afterwards.
    pub persist: bool,
    /// Cache file location.
    pub path: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            persist: false,
            path: ".pressline/cache.json".into(),
        }
    }
}
