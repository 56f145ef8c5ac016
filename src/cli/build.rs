//! Build orchestration.
//!
//! Build phases:
//! - **Init** - Clean the publish directory, restore the transform cache
//! - **Collect** - Walk the build directory for documents and images
//! - **Process** - Documents through the stages, images copied, in parallel
//! - **Finalize** - Persist the cache, report failures

use crate::{
    cache::{TransformCache, load_cache, persist_cache},
    config::PresslineConfig,
    log,
    logger::ProgressLine,
    pipeline::{ProcessContext, process_document},
    utils::plural_count,
};
use anyhow::{Context, Result};
use jwalk::WalkDir;
use rayon::prelude::*;
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Outcome of one build run.
#[derive(Debug, Default)]
pub struct BuildReport {
    /// Published document paths.
    pub written: Vec<PathBuf>,
    /// Documents that failed, with their rendered error chain.
    pub failed: Vec<(PathBuf, String)>,
    /// Number of images copied.
    pub images: usize,
    /// Transform cache size at the end of the run.
    pub cache_entries: usize,
}

impl BuildReport {
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

/// Files to publish, in path order.
struct BuildFiles {
    documents: Vec<PathBuf>,
    images: Vec<PathBuf>,
}

/// Run the pipeline over every document of the build directory.
///
/// A failing document is recorded in the report and does not stop the
/// others. Only setup errors (output directory, cache file, image copy)
/// abort the build.
pub fn build(config: &PresslineConfig, quiet: bool) -> Result<BuildReport> {
    let build = &config.build;

    prepare_output(&build.output, build.clean)?;

    let cache = TransformCache::new();
    if config.cache.persist {
        let restored = load_cache(&cache, &config.cache.path)?;
        crate::debug!("cache"; "restored {} entries", restored);
    }

    let files = collect_build_files(config);
    let progress = create_progress(&files, quiet);

    let stages = config.stage_context()?;
    let ctx = ProcessContext {
        stages: &stages,
        cache: &cache,
        output_root: &build.output,
        minify: build.minify,
    };

    let ((written, failed), images) = rayon::join(
        || process_documents(&files.documents, &ctx, progress.as_ref()),
        || copy_images(&files.images, &build.input, &build.output, progress.as_ref()),
    );

    if let Some(p) = progress {
        p.finish();
    }

    let report = BuildReport {
        written,
        failed,
        images: images?,
        cache_entries: cache.len(),
    };

    for (path, error) in &report.failed {
        log!("error"; "{}: {}", path.display(), error);
    }

    if config.cache.persist {
        persist_cache(&cache, &config.cache.path)?;
    }

    if !quiet {
        log_build_result(&report);
    }

    Ok(report)
}

/// Ensure the publish directory exists, emptying it first when `clean` is set.
fn prepare_output(output: &Path, clean: bool) -> Result<()> {
    if clean && output.exists() {
        fs::remove_dir_all(output)
            .with_context(|| format!("Failed to clear output directory: {}", output.display()))?;
    }
    fs::create_dir_all(output)
        .with_context(|| format!("Failed to create output directory: {}", output.display()))
}

/// Collect documents and images under the build directory.
fn collect_build_files(config: &PresslineConfig) -> BuildFiles {
    let build = &config.build;
    let mut files: Vec<PathBuf> = WalkDir::new(&build.input)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path())
        .filter(|p| !p.starts_with(&build.output))
        .collect();
    files.sort();

    let (documents, rest): (Vec<_>, Vec<_>) = files
        .into_iter()
        .partition(|p| p.extension().is_some_and(|ext| ext == "html"));
    let images = rest.into_iter().filter(|p| build.is_image(p)).collect();

    BuildFiles { documents, images }
}

/// Create progress display if not quiet
fn create_progress(files: &BuildFiles, quiet: bool) -> Option<ProgressLine> {
    if quiet {
        return None;
    }
    Some(ProgressLine::new(&[
        ("html", files.documents.len()),
        ("images", files.images.len()),
    ]))
}

/// Process every document in parallel, splitting successes from failures.
fn process_documents(
    documents: &[PathBuf],
    ctx: &ProcessContext,
    progress: Option<&ProgressLine>,
) -> (Vec<PathBuf>, Vec<(PathBuf, String)>) {
    let results: Vec<_> = documents
        .par_iter()
        .map(|path| {
            let result = process_document(path, ctx).map_err(|e| (path.clone(), format!("{e:#}")));
            if let Some(p) = progress {
                p.inc("html");
            }
            result
        })
        .collect();

    let mut written = Vec::new();
    let mut failed = Vec::new();
    for result in results {
        match result {
            Ok(path) => written.push(path),
            Err(failure) => failed.push(failure),
        }
    }
    (written, failed)
}

/// Copy images byte-for-byte, keeping their relative paths.
fn copy_images(
    images: &[PathBuf],
    input: &Path,
    output: &Path,
    progress: Option<&ProgressLine>,
) -> Result<usize> {
    images.par_iter().try_for_each(|path| -> Result<()> {
        let relative = path.strip_prefix(input).unwrap_or(path);
        let target = output.join(relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(path, &target).with_context(|| {
            format!(
                "Failed to copy image from {} to {}",
                path.display(),
                target.display()
            )
        })?;
        if let Some(p) = progress {
            p.inc("images");
        }
        Ok(())
    })?;
    Ok(images.len())
}

fn log_build_result(report: &BuildReport) {
    if report.has_failures() {
        log!(
            "build";
            "{} written, {} failed",
            plural_count(report.written.len(), "document"),
            report.failed.len()
        );
    } else if report.written.is_empty() && report.images == 0 {
        log!("warning"; "nothing to publish, check the build directory");
    } else {
        log!(
            "done";
            "{}, {}",
            plural_count(report.written.len(), "document"),
            plural_count(report.images, "image")
        );
    }
}
