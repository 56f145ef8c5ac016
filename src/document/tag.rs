//! Typed view of the resource tags the pipeline acts on.
//!
//! | attribute        | meaning                                         |
//! |------------------|-------------------------------------------------|
//! | `rel=stylesheet` | link is CSS                                     |
//! | `inline`         | embed the referenced file                       |
//! | `cachekey`       | reuse transformed text across tags and runs     |
//! | `clean`          | prune unused selectors and vendor-prefix        |
//! | `minify`         | minify text                                     |
//! | `type=module es6`| bundle ES modules into one script               |
//! | `relative`       | original `src`, import context for bundling     |

use super::Element;

/// Recognized attribute names.
pub mod attr {
    pub const REL: &str = "rel";
    pub const HREF: &str = "href";
    pub const SRC: &str = "src";
    pub const TYPE: &str = "type";
    pub const INLINE: &str = "inline";
    pub const CACHE_KEY: &str = "cachekey";
    pub const CLEAN: &str = "clean";
    pub const MINIFY: &str = "minify";
    pub const ES6: &str = "es6";
    pub const RELATIVE: &str = "relative";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    /// `<link rel="stylesheet">`
    Stylesheet,
    /// `<style>`
    Style,
    /// `<script>`
    Script,
}

/// The pipeline-relevant state of a `link`/`style`/`script` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceTag {
    pub kind: TagKind,
    /// `href` of a stylesheet link or `src` of a script.
    pub source: Option<String>,
    pub inline: bool,
    pub cache_key: Option<String>,
    pub clean: bool,
    pub minify: bool,
    /// `type="module"`
    pub module: bool,
    pub es6: bool,
    pub relative: Option<String>,
}

impl ResourceTag {
    /// Read the typed view of an element, if it is a resource tag.
    pub fn from_element(el: &Element) -> Option<Self> {
        let attrs = &el.attrs;
        let kind = match el.tag.as_str() {
            "link" if attrs.value(attr::REL) == Some("stylesheet") => TagKind::Stylesheet,
            "style" => TagKind::Style,
            "script" => TagKind::Script,
            _ => return None,
        };

        let source = match kind {
            TagKind::Stylesheet => attrs.value(attr::HREF),
            TagKind::Script => attrs.value(attr::SRC),
            TagKind::Style => None,
        };

        Some(Self {
            kind,
            source: source.map(str::to_owned),
            inline: attrs.has(attr::INLINE),
            cache_key: attrs.value(attr::CACHE_KEY).map(str::to_owned),
            clean: attrs.has(attr::CLEAN),
            minify: attrs.has(attr::MINIFY),
            module: attrs.value(attr::TYPE) == Some("module"),
            es6: attrs.has(attr::ES6),
            relative: attrs.value(attr::RELATIVE).map(str::to_owned),
        })
    }

    pub fn is_inline_stylesheet(&self) -> bool {
        self.kind == TagKind::Stylesheet && self.inline
    }

    pub fn is_inline_script(&self) -> bool {
        self.kind == TagKind::Script && self.inline
    }

    pub fn is_es6_module(&self) -> bool {
        self.kind == TagKind::Script && self.module && self.es6
    }

    pub fn is_cleanable_style(&self) -> bool {
        self.kind == TagKind::Style && self.clean
    }

    pub fn is_minifiable(&self, kind: TagKind) -> bool {
        self.kind == kind && kind != TagKind::Stylesheet && self.minify
    }
}
