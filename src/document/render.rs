//! [`Document`] → HTML source.

use std::fmt::Write;

use super::{Document, Element, Node};
use crate::utils::html::{escape_attr, is_void_element};

impl Document {
    /// Serialize the whole document.
    pub fn render(&self) -> String {
        self.render_filtered(|_| true)
    }

    /// Serialize with every `<script>` element dropped.
    ///
    /// Used as the selector-usage snapshot for CSS pruning.
    pub fn render_without_scripts(&self) -> String {
        self.render_filtered(|el| el.tag != "script")
    }

    fn render_filtered(&self, keep: impl Fn(&Element) -> bool) -> String {
        let mut out = String::new();
        if let Some(doctype) = &self.doctype {
            out.push_str(doctype);
        }
        for node in &self.children {
            write_node(&mut out, node, &keep);
        }
        out
    }
}

fn write_node(out: &mut String, node: &Node, keep: &dyn Fn(&Element) -> bool) {
    match node {
        Node::Text(text) => out.push_str(text),
        Node::Comment(comment) if comment.starts_with("<!--") => out.push_str(comment),
        Node::Comment(comment) => {
            let _ = write!(out, "<!--{comment}-->");
        }
        Node::Element(el) if keep(el) => write_element(out, el, keep),
        Node::Element(_) => {}
    }
}

fn write_element(out: &mut String, el: &Element, keep: &dyn Fn(&Element) -> bool) {
    out.push('<');
    out.push_str(&el.tag);
    for (name, value) in el.attrs.iter() {
        match value {
            Some(value) => {
                let _ = write!(out, " {name}=\"{}\"", escape_attr(value));
            }
            None => {
                let _ = write!(out, " {name}");
            }
        }
    }
    out.push('>');

    if is_void_element(&el.tag) {
        return;
    }

    for child in &el.children {
        write_node(out, child, keep);
    }
    let _ = write!(out, "</{}>", el.tag);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_roundtrips_simple_markup() {
        let source = r#"<!DOCTYPE html><html><head><link rel="stylesheet" href="/a.css"></head><body class="x"><p>hi &amp; bye</p></body></html>"#;
        let doc = Document::parse(source).unwrap();
        assert_eq!(doc.render(), source);
    }

    #[test]
    fn test_render_boolean_attribute() {
        let doc = Document::parse("<script inline src=\"/a.js\"></script>").unwrap();
        assert_eq!(doc.render(), "<script inline src=\"/a.js\"></script>");
    }

    #[test]
    fn test_render_without_scripts() {
        let doc =
            Document::parse("<div class=\"a\"><script>var x = '<b class=\"c\">';</script></div>")
                .unwrap();
        assert_eq!(doc.render_without_scripts(), "<div class=\"a\"></div>");
    }
}
