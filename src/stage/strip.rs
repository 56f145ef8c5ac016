//! Clean-JS and Cache-Key-Strip: drop pipeline bookkeeping attributes.

use crate::document::{Document, attr};

/// Remove the transient `relative` marker from every script.
pub fn clean_js(doc: &mut Document) {
    doc.for_each_element_mut(|el| {
        if el.tag == "script" {
            el.attrs.remove(attr::RELATIVE);
        }
    });
}

/// Remove `cachekey` from every style and script.
pub fn strip_cache_keys(doc: &mut Document) {
    doc.for_each_element_mut(|el| {
        if matches!(el.tag.as_str(), "style" | "script") {
            el.attrs.remove(attr::CACHE_KEY);
        }
    });
}
