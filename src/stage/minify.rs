//! Minify-CSS and Minify-JS over `<style minify>` and `<script minify>`.

use super::{Stage, collect_jobs, fan_out};
use crate::asset;
use crate::cache::TransformCache;
use crate::document::{Document, TagKind, attr};
use crate::pipeline::PipelineError;

/// Minify every `<style minify>`. A CSS error fails the document.
pub fn minify_css(doc: &mut Document, cache: &TransformCache) -> Result<(), PipelineError> {
    let jobs = collect_jobs(doc, |tag| tag.is_minifiable(TagKind::Style));
    let results = fan_out(&jobs, |job| {
        cache.get_or_try_insert(Stage::MinifyCss, job.tag.cache_key.as_deref(), || {
            asset::minify_css(&job.text)
        })
    });

    for (job, result) in jobs.iter().zip(results) {
        let css = result?;
        if let Some(el) = doc.get_mut(&job.path) {
            el.set_text(css);
            el.attrs.remove(attr::MINIFY);
        }
    }
    Ok(())
}

/// Minify every `<script minify>`.
///
/// A script that fails to minify keeps its source; the failure is logged
/// and nothing is cached for it.
pub fn minify_js(doc: &mut Document, cache: &TransformCache) {
    let jobs = collect_jobs(doc, |tag| tag.is_minifiable(TagKind::Script));
    for job in jobs {
        let result = cache.get_or_try_insert(Stage::MinifyJs, job.tag.cache_key.as_deref(), || {
            asset::minify_js(&job.text, job.tag.module)
        });

        let Some(el) = doc.get_mut(&job.path) else {
            continue;
        };
        match result {
            Ok(code) => el.set_text(code),
            Err(e) => crate::log!("minify"; "keeping unminified script: {}", e),
        }
        el.attrs.remove(attr::MINIFY);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_text(doc: &Document, tag: &str) -> String {
        let path = doc.select(|el| el.tag == tag).remove(0);
        doc.get(&path).unwrap().text()
    }

    #[test]
    fn test_minify_css() {
        let mut doc = Document::parse("<style minify>a {\n  color: red;\n}</style>").unwrap();
        minify_css(&mut doc, &TransformCache::new()).unwrap();
        assert_eq!(doc.render(), "<style>a{color:red}</style>");
    }

    #[test]
    fn test_minify_css_error_fails_document() {
        let mut doc = Document::parse("<style minify>a { color: red; }}}{</style>").unwrap();
        assert!(matches!(
            minify_css(&mut doc, &TransformCache::new()),
            Err(PipelineError::MinifyCss(_))
        ));
    }

    #[test]
    fn test_minify_css_shared_key_reuses_output() {
        let cache = TransformCache::new();
        cache.insert(Stage::MinifyCss, "k", "b{}");
        let mut doc =
            Document::parse(r#"<style minify cachekey="k">a { color: red }</style>"#).unwrap();
        minify_css(&mut doc, &cache).unwrap();
        assert_eq!(first_text(&doc, "style"), "b{}");
    }

    #[test]
    fn test_minify_js() {
        let mut doc = Document::parse(
            "<script minify cachekey=\"s\">function twice(value) {\n  return value * 2;\n}\nconsole.log(twice(4));\n</script>",
        )
        .unwrap();
        let cache = TransformCache::new();
        minify_js(&mut doc, &cache);

        let text = first_text(&doc, "script");
        assert!(!text.contains('\n'));
        assert!(text.contains("console.log"));
        assert_eq!(cache.get(Stage::MinifyJs, "s"), Some(text));
        assert!(doc.select(|el| el.attrs.has(attr::MINIFY)).is_empty());
    }

    #[test]
    fn test_minify_js_failure_keeps_source() {
        let source = "function ( { broken";
        let mut doc =
            Document::parse(&format!("<script minify cachekey=\"b\">{source}</script>")).unwrap();
        let cache = TransformCache::new();
        minify_js(&mut doc, &cache);

        assert_eq!(first_text(&doc, "script"), source);
        assert!(doc.select(|el| el.attrs.has(attr::MINIFY)).is_empty());
        assert_eq!(cache.get(Stage::MinifyJs, "b"), None);
    }

    #[test]
    fn test_minify_js_module_script() {
        let mut doc = Document::parse(
            "<script type=\"module\" minify>import { a } from './a.js';\na();\n</script>",
        )
        .unwrap();
        minify_js(&mut doc, &TransformCache::new());
        let text = first_text(&doc, "script");
        assert!(text.starts_with("import"));
        assert!(!text.contains('\n'));
    }
}
