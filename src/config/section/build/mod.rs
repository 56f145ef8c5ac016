//! `[build]` section configuration.
//!
//! Contains the build paths, markup minification and sub-configurations.
//!
//! # Example
//!
//! ```toml
//! [build]
//! input = "build"             # Build directory with HTML and referenced assets
//! output = "publish"          # Publish directory
//! minify = true               # Minify the final HTML markup
//! clean = false               # Remove the publish directory before writing
//! images = ["png"]            # Image extensions copied verbatim
//!
//! [build.js]
//! root = "/js/"
//! target = "es2015"          # Optional, defaults to lowering for [build.css] browsers
//! bundle_name = "bundle"
//!
//! [build.css]
//! browsers = ["> 1%", "last 2 versions"]
//! ignore = ['\.navbar-menu\.is-active']
//! ```
//!
//! See submodules for detailed options: [`js`], [`css`].

mod css;
mod js;

pub use css::CssConfig;
pub use js::JsConfig;

use crate::config::{ConfigDiagnostics, FieldPath};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildSectionConfig {
    /// Build directory the pipeline reads from.
    pub input: PathBuf,

    /// Publish directory the pipeline writes to.
    pub output: PathBuf,

    /// Minify the final HTML markup.
    pub minify: bool,

    /// Clean the publish directory before building.
    pub clean: bool,

    /// Extensions of images copied byte-for-byte (without the dot).
    pub images: Vec<String>,

    /// JavaScript bundling settings.
    pub js: JsConfig,

    /// CSS cleaning settings.
    pub css: CssConfig,
}

pub struct BuildSectionFields {
    pub input: FieldPath,
    pub output: FieldPath,
    pub images: FieldPath,
}

impl Default for BuildSectionConfig {
    fn default() -> Self {
        Self {
            input: "build".into(),
            output: "publish".into(),
            minify: true,
            clean: false,
            images: vec!["png".into()],
            js: JsConfig::default(),
            css: CssConfig::default(),
        }
    }
}

impl BuildSectionConfig {
    pub const FIELDS: BuildSectionFields = BuildSectionFields {
        input: FieldPath::new("build.input"),
        output: FieldPath::new("build.output"),
        images: FieldPath::new("build.images"),
    };

    /// Validate build configuration (expects normalized paths).
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if !self.input.is_dir() {
            diag.error_with_hint(
                Self::FIELDS.input,
                format!("directory `{}` not found", self.input.display()),
                "set `[build] input` or pass `--input`",
            );
        }

        if self.output == self.input || self.input.starts_with(&self.output) {
            diag.error(
                Self::FIELDS.output,
                format!(
                    "`{}` would overwrite the build directory",
                    self.output.display()
                ),
            );
        }

        for ext in &self.images {
            if ext.is_empty() || ext.starts_with('.') {
                diag.error_with_hint(
                    Self::FIELDS.images,
                    format!("invalid extension `{ext}`"),
                    "write extensions without the dot, e.g. \"png\"",
                );
            }
        }

        self.js.validate(diag);
        self.css.validate(diag);
    }

    /// Whether `path` has one of the configured image extensions.
    pub fn is_image(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.images.iter().any(|i| i.eq_ignore_ascii_case(ext)))
    }
}
