//! HTML source → [`Document`] via `tl`.
//!
//! `tl` provides the element structure. Attributes and raw-text bodies are
//! read back from each tag's source span so attribute order is preserved
//! and `script`/`style` contents are taken verbatim. Those bodies are masked
//! before `tl` sees the source, and optional end tags (`<p>`, `<li>`, ...)
//! are closed the way a browser closes them.

use super::{Document, Element, Node};
use crate::pipeline::PipelineError;
use crate::utils::html::{
    implicitly_closes, is_raw_text_element, is_void_element, mask_raw_text, parse_attributes,
    raw_text_body, split_start_tag, unmask_raw_text,
};

impl Document {
    /// Parse HTML source into a mutable tree.
    pub fn parse(source: &str) -> Result<Self, PipelineError> {
        let (masked, bodies) = mask_raw_text(source);
        let dom = tl::parse(&masked, tl::ParserOptions::default())
            .map_err(|e| PipelineError::Parse(format!("{e:?}")))?;
        let parser = dom.parser();

        let children = dom
            .children()
            .iter()
            .flat_map(|handle| convert(*handle, parser, &bodies))
            .collect();

        Ok(Self {
            doctype: leading_doctype(source),
            children,
        })
    }
}

/// Convert a tl node into zero or more tree nodes.
///
/// Void elements never own children; anything tl nested under one is
/// hoisted back to sibling position. The same happens to children from the
/// first one that implicitly closes the element onwards.
fn convert(handle: tl::NodeHandle, parser: &tl::Parser, bodies: &[String]) -> Vec<Node> {
    let Some(node) = handle.get(parser) else {
        return Vec::new();
    };

    match node {
        tl::Node::Tag(tag) => {
            let name = tag.name().as_utf8_str().to_ascii_lowercase();
            // Markup declarations (doctype) are kept separately.
            if name.starts_with('!') {
                return Vec::new();
            }

            let raw = tag.raw().as_utf8_str();
            let mut element = Element::new(name.as_str());
            if let Some((attrs, _)) = split_start_tag(&raw) {
                element.attrs = parse_attributes(attrs).into_iter().collect();
            }

            let nested: Vec<Node> = tag
                .children()
                .top()
                .iter()
                .flat_map(|child| convert(*child, parser, bodies))
                .collect();

            if is_raw_text_element(&name) {
                element.set_text(unmask_raw_text(raw_text_body(&raw, &name), bodies));
                vec![Node::Element(element)]
            } else if is_void_element(&name) {
                let mut out = vec![Node::Element(element)];
                out.extend(nested);
                out
            } else {
                let mut nested = nested;
                let split = nested
                    .iter()
                    .position(|node| {
                        matches!(node, Node::Element(child) if implicitly_closes(&name, &child.tag))
                    })
                    .unwrap_or(nested.len());
                let siblings = nested.split_off(split);
                element.children = nested;

                let mut out = vec![Node::Element(element)];
                out.extend(siblings);
                out
            }
        }
        tl::Node::Raw(bytes) => vec![Node::Text(bytes.as_utf8_str().into_owned())],
        tl::Node::Comment(bytes) => vec![Node::Comment(bytes.as_utf8_str().into_owned())],
    }
}

/// Extract a leading `<!doctype ...>` declaration, if any.
fn leading_doctype(source: &str) -> Option<String> {
    let trimmed = source.trim_start_matches('\u{feff}').trim_start();
    if !trimmed
        .get(..9)
        .is_some_and(|head| head.eq_ignore_ascii_case("<!doctype"))
    {
        return None;
    }
    let end = trimmed.find('>')?;
    Some(trimmed[..=end].to_string())
}
