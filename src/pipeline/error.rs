//! Errors raised while transforming one document.

use std::path::PathBuf;
use thiserror::Error;

/// Failure of a stage or capability on a single document.
///
/// A failure aborts the document it occurred in; sibling documents are
/// unaffected.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to read `{}`", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot resolve import `{specifier}` from `{importer}`")]
    Resolution { specifier: String, importer: String },

    #[error("failed to bundle module `{module}`: {message}")]
    Bundle { module: String, message: String },

    #[error("failed to lower bundle to `{target}`: {message}")]
    Transpile { target: String, message: String },

    #[error("css minification failed: {0}")]
    MinifyCss(String),

    #[error("css cleaning failed: {0}")]
    CleanCss(String),

    #[error("html parsing failed: {0}")]
    Parse(String),

    #[error("`<{tag}>` is missing the `{attribute}` attribute")]
    MissingAttribute {
        tag: &'static str,
        attribute: &'static str,
    },
}

impl PipelineError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
