//! Document processing: one HTML file in, one published file out.
//!
//! ```text
//! read ──▶ parse ──▶ 8 stages ──▶ render ──▶ minify markup ──▶ canonical name ──▶ write
//! ```
//!
//! Every failure is scoped to the document being processed.

mod error;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::asset::minify_markup;
use crate::cache::TransformCache;
use crate::document::Document;
use crate::stage::{StageContext, run_stages};

pub use error::PipelineError;

/// Everything a document needs besides its own source.
#[derive(Debug, Clone, Copy)]
pub struct ProcessContext<'a> {
    pub stages: &'a StageContext,
    pub cache: &'a TransformCache,
    /// Publish root the canonical names are joined onto.
    pub output_root: &'a Path,
    /// Minify the final markup.
    pub minify: bool,
}

/// Run the stages over one HTML source and return the final markup.
pub fn transform_document(html: &str, ctx: &ProcessContext) -> Result<String, PipelineError> {
    let mut doc = Document::parse(html)?;
    run_stages(&mut doc, ctx.cache, ctx.stages)?;
    let rendered = doc.render();
    if ctx.minify {
        minify_markup(&rendered)
    } else {
        Ok(rendered)
    }
}

/// Transform the HTML file at `path` and write it under the publish root.
///
/// Returns the written path.
pub fn process_document(path: &Path, ctx: &ProcessContext) -> Result<PathBuf> {
    let html =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let output = transform_document(&html, ctx)
        .with_context(|| format!("failed to process {}", path.display()))?;

    let relative = path
        .strip_prefix(&ctx.stages.build_root)
        .with_context(|| format!("{} is outside the build root", path.display()))?;
    let target = ctx.output_root.join(canonical_name(relative));
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(&target, output).with_context(|| format!("failed to write {}", target.display()))?;

    crate::debug!("html"; "{} -> {}", relative.display(), target.display());
    Ok(target)
}

/// Clean-URL name of a document: `about.html` → `about`.
///
/// `index.html` keeps its extension in every directory.
pub fn canonical_name(relative: &Path) -> PathBuf {
    let is_html = relative.extension().is_some_and(|ext| ext == "html");
    let is_index = relative.file_stem().is_some_and(|stem| stem == "index");
    if is_html && !is_index {
        relative.with_extension("")
    } else {
        relative.to_path_buf()
    }
}
