//! The fixed sequence of tag-driven document transforms.
//!
//! ```text
//! inlinecss → inlinejs → compilejs → cleancss → cleanjs → minifycss → minifyjs → cachekeyclean
//! ```
//!
//! Each stage selects the tags it acts on, transforms them and commits the
//! results to the tree before the next stage starts. Stages with expensive
//! per-tag work fan out over rayon and join before committing.

mod clean;
mod compile;
mod inline;
mod minify;
mod strip;

use std::fs;
use std::path::{Path, PathBuf};

use lightningcss::targets::Targets;
use rayon::prelude::*;
use regex::Regex;

use crate::bundle::BundleOptions;
use crate::cache::TransformCache;
use crate::document::{Document, ElementPath, ResourceTag};
use crate::pipeline::PipelineError;
use crate::utils::path::join_site_path;

pub use clean::clean_css;
pub use compile::compile_js;
pub use inline::{inline_css, inline_js};
pub use minify::{minify_css, minify_js};
pub use strip::{clean_js, strip_cache_keys};

/// A named document transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    InlineCss,
    InlineJs,
    CompileJs,
    CleanCss,
    CleanJs,
    MinifyCss,
    MinifyJs,
    CacheKeyStrip,
}

impl Stage {
    /// Every stage, in execution order.
    pub const ALL: [Stage; 8] = [
        Stage::InlineCss,
        Stage::InlineJs,
        Stage::CompileJs,
        Stage::CleanCss,
        Stage::CleanJs,
        Stage::MinifyCss,
        Stage::MinifyJs,
        Stage::CacheKeyStrip,
    ];

    /// Name used in cache keys and logs.
    pub const fn name(self) -> &'static str {
        match self {
            Self::InlineCss => "inlinecss",
            Self::InlineJs => "inlinejs",
            Self::CompileJs => "compilejs",
            Self::CleanCss => "cleancss",
            Self::CleanJs => "cleanjs",
            Self::MinifyCss => "minifycss",
            Self::MinifyJs => "minifyjs",
            Self::CacheKeyStrip => "cachekeyclean",
        }
    }

    pub fn apply(
        self,
        doc: &mut Document,
        cache: &TransformCache,
        ctx: &StageContext,
    ) -> Result<(), PipelineError> {
        match self {
            Self::InlineCss => inline_css(doc, cache, ctx),
            Self::InlineJs => inline_js(doc, cache, ctx),
            Self::CompileJs => compile_js(doc, cache, ctx),
            Self::CleanCss => clean_css(doc, cache, ctx),
            Self::CleanJs => {
                clean_js(doc);
                Ok(())
            }
            Self::MinifyCss => minify_css(doc, cache),
            Self::MinifyJs => {
                minify_js(doc, cache);
                Ok(())
            }
            Self::CacheKeyStrip => {
                strip_cache_keys(doc);
                Ok(())
            }
        }
    }
}

/// Run every stage on `doc` in order, stopping at the first failure.
pub fn run_stages(
    doc: &mut Document,
    cache: &TransformCache,
    ctx: &StageContext,
) -> Result<(), PipelineError> {
    for stage in Stage::ALL {
        crate::debug!("stage"; "{}", stage.name());
        stage.apply(doc, cache, ctx)?;
    }
    Ok(())
}

/// Run-wide settings the stages read.
#[derive(Debug, Clone)]
pub struct StageContext {
    /// Directory that `href`/`src` site paths resolve against.
    pub build_root: PathBuf,
    /// Absolute site prefix of JavaScript modules (`/js/`).
    pub js_root: String,
    pub bundle: BundleOptions,
    /// Selectors matching any of these are never pruned.
    pub ignore: Vec<Regex>,
    /// Browser support matrix for vendor prefixing.
    pub targets: Targets,
}

impl StageContext {
    pub fn new(build_root: impl Into<PathBuf>) -> Self {
        Self {
            build_root: build_root.into(),
            js_root: "/js/".to_string(),
            bundle: BundleOptions::default(),
            ignore: Vec::new(),
            targets: Targets::default(),
        }
    }
}

/// A selected tag, detached from the tree for transformation.
struct Job {
    path: ElementPath,
    tag: ResourceTag,
    text: String,
}

/// Extract every resource tag matching `pred`, in document order.
fn collect_jobs(doc: &Document, pred: impl Fn(&ResourceTag) -> bool) -> Vec<Job> {
    doc.select(|el| ResourceTag::from_element(el).is_some_and(|tag| pred(&tag)))
        .into_iter()
        .filter_map(|path| {
            let el = doc.get(&path)?;
            let tag = ResourceTag::from_element(el)?;
            Some(Job {
                text: el.text(),
                tag,
                path,
            })
        })
        .collect()
}

/// Transform all jobs concurrently and wait for every one of them.
///
/// Results come back in job order.
fn fan_out<F>(jobs: &[Job], transform: F) -> Vec<Result<String, PipelineError>>
where
    F: Fn(&Job) -> Result<String, PipelineError> + Sync + Send,
{
    jobs.par_iter().map(transform).collect()
}

/// Read a file referenced by a site path (`/css/a.css`) under `root`.
fn read_site_file(root: &Path, url: &str) -> Result<String, PipelineError> {
    let path = join_site_path(root, url);
    fs::read_to_string(&path).map_err(|e| PipelineError::io(path, e))
}
