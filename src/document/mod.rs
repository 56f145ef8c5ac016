//! Mutable markup tree for one HTML document.
//!
//! ```text
//! source ──parse (tl)──▶ Document ──stages mutate──▶ Document ──render──▶ markup
//! ```
//!
//! Elements are addressed by [`ElementPath`] (child indices from the root),
//! so a stage can select targets with a shared borrow, compute replacements
//! in parallel, and commit them afterwards with `get_mut`.

mod parse;
mod render;
mod tag;

pub use tag::{ResourceTag, TagKind, attr};

// =============================================================================
// Types
// =============================================================================

/// A parsed HTML document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    /// Leading `<!doctype ...>` declaration, verbatim.
    pub doctype: Option<String>,
    /// Top-level nodes.
    pub children: Vec<Node>,
}

/// A node in the markup tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    /// Raw text, kept in source form (entities are not decoded).
    Text(String),
    Comment(String),
}

/// An element with ordered attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Lowercase tag name.
    pub tag: String,
    pub attrs: Attrs,
    pub children: Vec<Node>,
}

/// Ordered attribute list. `None` values are boolean attributes (`<x inline>`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attrs(Vec<(String, Option<String>)>);

/// Location of an element: child indices from the document root.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementPath(Vec<usize>);

// =============================================================================
// Attrs
// =============================================================================

impl Attrs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the attribute is present (with or without a value).
    pub fn has(&self, name: &str) -> bool {
        self.0.iter().any(|(k, _)| k == name)
    }

    /// Attribute value; boolean attributes read as `""`.
    pub fn value(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_deref().unwrap_or_default())
    }

    /// Set a valued attribute, replacing an existing one in place.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        self.put(name, Some(value.into()));
    }

    /// Set a boolean attribute.
    pub fn set_flag(&mut self, name: &str) {
        self.put(name, None);
    }

    /// Remove an attribute. Returns whether it was present.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|(k, _)| k != name);
        self.0.len() != before
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_deref()))
    }

    fn put(&mut self, name: &str, value: Option<String>) {
        match self.0.iter_mut().find(|(k, _)| k == name) {
            Some(slot) => slot.1 = value,
            None => self.0.push((name.to_owned(), value)),
        }
    }
}

impl FromIterator<(String, Option<String>)> for Attrs {
    fn from_iter<I: IntoIterator<Item = (String, Option<String>)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

// =============================================================================
// Element
// =============================================================================

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Attrs::new(),
            children: Vec::new(),
        }
    }

    /// Concatenated text of the direct text children.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                Node::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Replace all children with a single text node.
    pub fn set_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.children.clear();
        if !text.is_empty() {
            self.children.push(Node::Text(text));
        }
    }
}

// =============================================================================
// Document
// =============================================================================

impl Document {
    /// Paths of all elements matching `pred`, in document order.
    pub fn select(&self, mut pred: impl FnMut(&Element) -> bool) -> Vec<ElementPath> {
        fn walk(
            nodes: &[Node],
            trail: &mut Vec<usize>,
            pred: &mut dyn FnMut(&Element) -> bool,
            out: &mut Vec<ElementPath>,
        ) {
            for (i, node) in nodes.iter().enumerate() {
                if let Node::Element(el) = node {
                    trail.push(i);
                    if pred(el) {
                        out.push(ElementPath(trail.clone()));
                    }
                    walk(&el.children, trail, pred, out);
                    trail.pop();
                }
            }
        }

        let mut out = Vec::new();
        walk(&self.children, &mut Vec::new(), &mut pred, &mut out);
        out
    }

    pub fn get(&self, path: &ElementPath) -> Option<&Element> {
        let (first, rest) = path.0.split_first()?;
        let Node::Element(root) = self.children.get(*first)? else {
            return None;
        };
        let mut el = root;
        for i in rest {
            match el.children.get(*i)? {
                Node::Element(child) => el = child,
                _ => return None,
            }
        }
        Some(el)
    }

    pub fn get_mut(&mut self, path: &ElementPath) -> Option<&mut Element> {
        let (first, rest) = path.0.split_first()?;
        let Node::Element(root) = self.children.get_mut(*first)? else {
            return None;
        };
        let mut el = root;
        for i in rest {
            match el.children.get_mut(*i)? {
                Node::Element(child) => el = child,
                _ => return None,
            }
        }
        Some(el)
    }

    /// Visit every element, parents before children.
    pub fn for_each_element(&self, mut f: impl FnMut(&Element)) {
        fn walk(nodes: &[Node], f: &mut dyn FnMut(&Element)) {
            for node in nodes {
                if let Node::Element(el) = node {
                    f(el);
                    walk(&el.children, f);
                }
            }
        }
        walk(&self.children, &mut f);
    }

    /// Visit every element mutably, parents before children.
    pub fn for_each_element_mut(&mut self, mut f: impl FnMut(&mut Element)) {
        fn walk(nodes: &mut [Node], f: &mut dyn FnMut(&mut Element)) {
            for node in nodes {
                if let Node::Element(el) = node {
                    f(el);
                    walk(&mut el.children, f);
                }
            }
        }
        walk(&mut self.children, &mut f);
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Document {
        Document::parse(
            "<html><head><style clean>a{}</style></head>\
             <body><p>x</p><script src=\"/a.js\"></script></body></html>",
        )
        .unwrap()
    }

    #[test]
    fn test_attrs_set_replaces_in_place() {
        let mut attrs: Attrs = [
            ("a".to_string(), Some("1".to_string())),
            ("b".to_string(), None),
        ]
        .into_iter()
        .collect();
        attrs.set("a", "2");
        attrs.set_flag("c");
        let collected: Vec<_> = attrs.iter().collect();
        assert_eq!(collected, vec![("a", Some("2")), ("b", None), ("c", None)]);
        assert_eq!(attrs.value("b"), Some(""));
        assert!(attrs.remove("b"));
        assert!(!attrs.remove("b"));
    }

    #[test]
    fn test_select_in_document_order() {
        let doc = sample();
        let paths = doc.select(|el| matches!(el.tag.as_str(), "style" | "script"));
        let tags: Vec<_> = paths
            .iter()
            .map(|p| doc.get(p).unwrap().tag.as_str())
            .collect();
        assert_eq!(tags, vec!["style", "script"]);
    }

    #[test]
    fn test_get_mut_commits() {
        let mut doc = sample();
        let path = doc.select(|el| el.tag == "style").remove(0);
        doc.get_mut(&path).unwrap().set_text("b{}");
        assert_eq!(doc.get(&path).unwrap().text(), "b{}");
    }

    #[test]
    fn test_set_text_empty_clears_children() {
        let mut el = Element::new("script");
        el.set_text("x");
        el.set_text("");
        assert!(el.children.is_empty());
    }
}
