//! Clean-CSS: prune unused selectors from `<style clean>` and vendor-prefix.

use std::sync::OnceLock;

use super::{Stage, StageContext, collect_jobs, fan_out};
use crate::asset::{prune_unused_selectors, vendor_prefix};
use crate::cache::TransformCache;
use crate::document::{Document, attr};
use crate::pipeline::PipelineError;

/// Clean every `<style clean>` against the document's own markup.
///
/// Selector usage is judged on the document rendered without any
/// `<script>`, taken once per document and only on a cache miss.
pub fn clean_css(
    doc: &mut Document,
    cache: &TransformCache,
    ctx: &StageContext,
) -> Result<(), PipelineError> {
    let jobs = collect_jobs(doc, |tag| tag.is_cleanable_style());
    if jobs.is_empty() {
        return Ok(());
    }

    let snapshot = OnceLock::new();
    let shared: &Document = doc;
    let results = fan_out(&jobs, |job| {
        cache.get_or_try_insert(Stage::CleanCss, job.tag.cache_key.as_deref(), || {
            let snapshot = snapshot.get_or_init(|| shared.render_without_scripts());
            let pruned = prune_unused_selectors(&job.text, snapshot, &ctx.ignore)?;
            vendor_prefix(&pruned, ctx.targets)
        })
    });

    for (job, result) in jobs.iter().zip(results) {
        let css = result?;
        if let Some(el) = doc.get_mut(&job.path) {
            el.set_text(css);
            el.attrs.remove(attr::CLEAN);
        }
    }
    Ok(())
}
