//! `[build.css]` section: selector pruning and vendor prefixing.
//!
//! # Example
//!
//! ```toml
//! [build.css]
//! browsers = ["> 1%", "last 2 versions"]   # Browserslist queries for prefixing and JS lowering
//! ignore = ['\.navbar-menu\.is-active']     # Selectors that are never pruned (regex)
//! ```

use crate::asset::{DEFAULT_BROWSERS, browser_targets};
use crate::config::{ConfigDiagnostics, FieldPath};
use lightningcss::targets::Targets;
use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CssConfig {
    /// Browser support matrix (browserslist queries).
    pub browsers: Vec<String>,
    /// Regexes of selectors toggled only at runtime; matching selectors are kept.
    pub ignore: Vec<String>,
}

pub struct CssConfigFields {
    pub browsers: FieldPath,
    pub ignore: FieldPath,
}

impl CssConfig {
    pub const FIELDS: CssConfigFields = CssConfigFields {
        browsers: FieldPath::new("build.css.browsers"),
        ignore: FieldPath::new("build.css.ignore"),
    };

    /// Compile the ignore patterns.
    pub fn ignore_patterns(&self) -> Result<Vec<Regex>, regex::Error> {
        self.ignore.iter().map(|p| Regex::new(p)).collect()
    }

    pub fn targets(&self) -> Result<Targets, String> {
        browser_targets(&self.browsers)
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        for pattern in &self.ignore {
            if let Err(e) = Regex::new(pattern) {
                diag.error(
                    Self::FIELDS.ignore,
                    format!("invalid pattern `{pattern}`: {e}"),
                );
            }
        }

        if let Err(e) = self.targets() {
            diag.error_with_hint(
                Self::FIELDS.browsers,
                format!("invalid browser query: {e}"),
                "see https://browsersl.ist for the query syntax",
            );
        }
    }
}

impl Default for CssConfig {
    fn default() -> Self {
        Self {
            browsers: DEFAULT_BROWSERS.map(String::from).to_vec(),
            ignore: vec![
                r"\.navbar-menu\.is-active".into(),
                r"\.navbar-burger\.is-active".into(),
                r"\.fd-.*\.is-active".into(),
            ],
        }
    }
}
