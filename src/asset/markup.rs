//! Markup minification.
//!
//! This module uses [`minify_html`] under the hood. Script and style bodies
//! are already processed by the stages, so they pass through unchanged.

use minify_html::{Cfg, minify};

use crate::pipeline::PipelineError;

/// Minify an HTML document.
pub fn minify_markup(html: &str) -> Result<String, PipelineError> {
    let cfg = Cfg {
        keep_closing_tags: true,
        keep_html_and_head_opening_tags: true,
        ..Cfg::new()
    };
    String::from_utf8(minify(html.as_bytes(), &cfg))
        .map_err(|e| PipelineError::Parse(format!("minified markup is not utf-8: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_whitespace_removed() {
        let html = "<div>\n  <p>Hello   world</p>\n</div>\n";
        let out = minify_markup(html).unwrap();
        assert!(out.contains("<p>Hello world</p>"));
        assert!(!out.contains('\n'));
    }

    #[test]
    fn test_comments_dropped() {
        let out = minify_markup("<p>a<!-- note -->b</p>").unwrap();
        assert!(!out.contains("note"));
        assert!(out.contains("ab"));
    }

    #[test]
    fn test_script_body_untouched() {
        let html = "<script>for(i=0;i<n;i++){document.write(\"<div>\")}</script><p>after</p>";
        let out = minify_markup(html).unwrap();
        assert!(out.contains("for(i=0;i<n;i++){document.write(\"<div>\")}"));
        assert!(out.contains("<p>after</p>"));
    }

    #[test]
    fn test_preformatted_whitespace_kept() {
        let out = minify_markup("<div>\n<pre>  a\n    b</pre>\n</div>").unwrap();
        assert!(out.contains("<pre>  a\n    b</pre>"));
    }
}
