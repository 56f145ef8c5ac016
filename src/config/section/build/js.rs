//! `[build.js]` section: module resolution and bundle output.
//!
//! # Example
//!
//! ```toml
//! [build.js]
//! root = "/js/"               # Site prefix of JavaScript modules
//! target = "es2015"           # Optional; overrides lowering for `[build.css] browsers`
//! bundle_name = "bundle"      # Global variable the bundle is assigned to
//! ```

use crate::bundle::{BundleOptions, validate_target};
use crate::config::{ConfigDiagnostics, FieldPath};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JsConfig {
    /// Absolute site prefix; imports starting with it map onto the build directory.
    pub root: String,
    /// Lowering target (`es2015`, `es2020`, `chrome80`, ...). Without one,
    /// bundles are lowered for the `[build.css]` browsers.
    pub target: Option<String>,
    /// Name of the global the entry module's exports are assigned to.
    pub bundle_name: String,
}

pub struct JsConfigFields {
    pub root: FieldPath,
    pub target: FieldPath,
    pub bundle_name: FieldPath,
}

impl JsConfig {
    pub const FIELDS: JsConfigFields = JsConfigFields {
        root: FieldPath::new("build.js.root"),
        target: FieldPath::new("build.js.target"),
        bundle_name: FieldPath::new("build.js.bundle_name"),
    };

    pub fn bundle_options(&self, browsers: &[String]) -> BundleOptions {
        BundleOptions {
            browsers: browsers.to_vec(),
            target: self.target.clone(),
            name: self.bundle_name.clone(),
        }
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if !self.root.starts_with('/') || !self.root.ends_with('/') {
            diag.error_with_hint(
                Self::FIELDS.root,
                format!("`{}` is not an absolute site prefix", self.root),
                "use a value like \"/js/\"",
            );
        }

        if let Some(target) = &self.target
            && let Err(e) = validate_target(target)
        {
            diag.error_with_hint(
                Self::FIELDS.target,
                format!("invalid target `{target}`: {e}"),
                "use an ECMAScript version like \"es2015\" or browsers like \"chrome80\"",
            );
        }

        if !is_identifier(&self.bundle_name) {
            diag.error(
                Self::FIELDS.bundle_name,
                format!("`{}` is not a valid JavaScript identifier", self.bundle_name),
            );
        }
    }
}

impl Default for JsConfig {
    fn default() -> Self {
        Self {
            root: "/js/".into(),
            target: None,
            bundle_name: "bundle".into(),
        }
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}
