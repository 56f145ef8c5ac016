//! Compile-JS: bundle `<script type="module" es6>` tags into classic scripts.

use super::{Stage, StageContext, collect_jobs, fan_out};
use crate::bundle::{ModuleResolver, bundle_modules};
use crate::cache::TransformCache;
use crate::document::{Document, attr};
use crate::pipeline::PipelineError;

/// Replace each module script's text with its bundle.
///
/// All tags are bundled concurrently; results are committed in document
/// order once every bundle has finished. `type` and `es6` are cleared.
pub fn compile_js(
    doc: &mut Document,
    cache: &TransformCache,
    ctx: &StageContext,
) -> Result<(), PipelineError> {
    let jobs = collect_jobs(doc, |tag| tag.is_es6_module());
    if jobs.is_empty() {
        return Ok(());
    }

    let results = fan_out(&jobs, |job| {
        cache.get_or_try_insert(Stage::CompileJs, job.tag.cache_key.as_deref(), || {
            let resolver =
                ModuleResolver::new(&ctx.build_root, &ctx.js_root, job.tag.relative.as_deref());
            bundle_modules(&job.text, &resolver, &ctx.bundle)
        })
    });

    for (job, result) in jobs.iter().zip(results) {
        let code = result?;
        if let Some(el) = doc.get_mut(&job.path) {
            el.set_text(code);
            el.attrs.remove(attr::TYPE);
            el.attrs.remove(attr::ES6);
        }
    }
    Ok(())
}
