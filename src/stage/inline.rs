//! Inline-CSS and Inline-JS: embed referenced files into the document.

use super::{Stage, StageContext, collect_jobs, read_site_file};
use crate::cache::TransformCache;
use crate::document::{Document, Element, attr};
use crate::pipeline::PipelineError;

/// Replace `<link rel="stylesheet" inline>` with a `<style>` holding the file.
///
/// The new element keeps `clean`, `minify` and `cachekey` so later stages
/// still see them.
pub fn inline_css(
    doc: &mut Document,
    cache: &TransformCache,
    ctx: &StageContext,
) -> Result<(), PipelineError> {
    for job in collect_jobs(doc, |tag| tag.is_inline_stylesheet()) {
        let href = job.tag.source.ok_or(PipelineError::MissingAttribute {
            tag: "link",
            attribute: attr::HREF,
        })?;
        let body = cache.get_or_try_insert(Stage::InlineCss, job.tag.cache_key.as_deref(), || {
            read_site_file(&ctx.build_root, &href)
        })?;

        let mut style = Element::new("style");
        if job.tag.clean {
            style.attrs.set_flag(attr::CLEAN);
        }
        if job.tag.minify {
            style.attrs.set_flag(attr::MINIFY);
        }
        if let Some(key) = &job.tag.cache_key {
            style.attrs.set(attr::CACHE_KEY, key.as_str());
        }
        style.set_text(body);

        if let Some(el) = doc.get_mut(&job.path) {
            *el = style;
        }
    }
    Ok(())
}

/// Load `<script inline src>` bodies into the tag.
///
/// `src` moves to `relative` so module imports can resolve against it. A
/// script marked `inline` without `src` only loses the marker.
pub fn inline_js(
    doc: &mut Document,
    cache: &TransformCache,
    ctx: &StageContext,
) -> Result<(), PipelineError> {
    for job in collect_jobs(doc, |tag| tag.is_inline_script()) {
        let body = match &job.tag.source {
            Some(src) => Some(cache.get_or_try_insert(
                Stage::InlineJs,
                job.tag.cache_key.as_deref(),
                || read_site_file(&ctx.build_root, src),
            )?),
            None => None,
        };

        let Some(el) = doc.get_mut(&job.path) else {
            continue;
        };
        el.attrs.remove(attr::INLINE);
        if let (Some(src), Some(body)) = (job.tag.source, body) {
            el.attrs.remove(attr::SRC);
            el.attrs.set(attr::RELATIVE, src);
            el.set_text(body);
        }
    }
    Ok(())
}
