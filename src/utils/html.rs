//! HTML utility functions.
//!
//! Provides the low-level helpers the document tree is built on:
//! - `escape_attr()` - attribute value quoting
//! - `is_void_element()` - Self-closing elements (br, img, link, etc.)
//! - `is_raw_text_element()` - Raw text elements (script, style)
//! - `implicitly_closes()` - optional end tags (p, li, td, etc.)
//! - `split_start_tag()` - locate the end of an opening tag in raw markup
//! - `mask_raw_text()` - hide script/style bodies from the tree parser
//! - `parse_attributes()` - ordered HTML attribute parsing

use std::borrow::Cow;

// =============================================================================
// HTML Escaping
// =============================================================================

/// Escape an attribute value for a double-quoted context.
///
/// Values are kept in their source form (entities untouched), so only the
/// quote character itself needs replacing.
#[inline]
pub fn escape_attr(s: &str) -> Cow<'_, str> {
    if !s.contains('"') {
        return Cow::Borrowed(s);
    }
    Cow::Owned(s.replace('"', "&quot;"))
}

// =============================================================================
// Element Classification
// =============================================================================

/// Check if an HTML tag is a void element (self-closing).
///
/// Void elements cannot have children and never get a closing tag.
#[inline]
pub fn is_void_element(tag: &str) -> bool {
    matches!(
        tag,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "source"
            | "track"
            | "wbr"
    )
}

/// Check if tag is a raw text element (content should not be HTML-escaped).
///
/// Script and style content is "raw text" in HTML.
#[inline]
pub fn is_raw_text_element(tag: &str) -> bool {
    matches!(tag, "script" | "style")
}

/// Check if a start tag for `next` ends an open `open` element without an
/// explicit end tag (`<p>one<p>two`, `<li>a<li>b`).
pub fn implicitly_closes(open: &str, next: &str) -> bool {
    match open {
        "p" => matches!(
            next,
            "address"
                | "article"
                | "aside"
                | "blockquote"
                | "div"
                | "dl"
                | "fieldset"
                | "figcaption"
                | "figure"
                | "footer"
                | "form"
                | "h1"
                | "h2"
                | "h3"
                | "h4"
                | "h5"
                | "h6"
                | "header"
                | "hr"
                | "main"
                | "nav"
                | "ol"
                | "p"
                | "pre"
                | "section"
                | "table"
                | "ul"
        ),
        "li" => next == "li",
        "dt" | "dd" => matches!(next, "dt" | "dd"),
        "option" => matches!(next, "option" | "optgroup"),
        "tr" => next == "tr",
        "td" | "th" => matches!(next, "td" | "th" | "tr"),
        _ => false,
    }
}

// =============================================================================
// Raw Tag Splitting
// =============================================================================

/// Split raw element markup into `(attribute_source, remainder)`.
///
/// `raw` starts at `<name`. The attribute source is everything between the
/// tag name and the closing `>` of the start tag (a trailing `/` is
/// dropped); the remainder starts right after that `>`. Quoted attribute
/// values may contain `>`.
pub fn split_start_tag(raw: &str) -> Option<(&str, &str)> {
    let body = raw.strip_prefix('<')?;
    let name_end = body
        .find(|c: char| c.is_whitespace() || c == '>' || c == '/')
        .unwrap_or(body.len());

    let mut quote = None;
    for (i, c) in body.char_indices().skip(name_end) {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '>') => {
                let attrs = body[name_end..i].trim_end();
                let attrs = attrs.strip_suffix('/').unwrap_or(attrs);
                return Some((attrs, &body[i + 1..]));
            }
            _ => {}
        }
    }
    None
}

/// Extract the raw text body of a `script`/`style` element from its markup.
///
/// Returns the text between the start tag and the first `</tag` occurrence,
/// which is where an HTML raw text element ends.
pub fn raw_text_body<'a>(raw: &'a str, tag: &str) -> &'a str {
    let Some((_, rest)) = split_start_tag(raw) else {
        return "";
    };
    let close = format!("</{tag}");
    let lower = rest.to_ascii_lowercase();
    match lower.find(&close) {
        Some(end) => &rest[..end],
        None => rest,
    }
}

/// Marks a masked raw text body; a private-use character never written by
/// hand.
const MASK: char = '\u{e000}';

/// Replace every `script`/`style` body with a numbered placeholder.
///
/// Raw text may hold an unescaped `<` (`i<n`, `"<div>"`) that a tree parser
/// would read as markup. Returns the masked source and the original bodies
/// in placeholder order; [`unmask_raw_text`] maps a body back.
pub fn mask_raw_text(source: &str) -> (String, Vec<String>) {
    // ASCII lowercasing keeps every byte offset valid for `source`.
    let lower = source.to_ascii_lowercase();
    let mut masked = String::with_capacity(source.len());
    let mut bodies = Vec::new();
    let mut cursor = 0;
    let mut pos = 0;

    while let Some(offset) = lower[pos..].find('<') {
        let start = pos + offset;
        let rest = &lower[start..];
        if rest.starts_with("<!--") {
            match rest.find("-->") {
                Some(end) => pos = start + end + 3,
                None => break,
            }
            continue;
        }

        let tag = ["script", "style"].into_iter().find(|tag| {
            rest[1..].strip_prefix(tag).is_some_and(|after| {
                after.starts_with(|c: char| c.is_ascii_whitespace() || c == '>' || c == '/')
            })
        });
        let Some(tag) = tag else {
            pos = start + 1;
            continue;
        };
        let Some((_, after)) = split_start_tag(&source[start..]) else {
            break;
        };

        let body_start = source.len() - after.len();
        let close = format!("</{tag}");
        let body_end = lower[body_start..]
            .find(&close)
            .map_or(source.len(), |end| body_start + end);
        if body_end > body_start {
            masked.push_str(&source[cursor..body_start]);
            masked.push(MASK);
            masked.push_str(&bodies.len().to_string());
            masked.push(MASK);
            bodies.push(source[body_start..body_end].to_string());
            cursor = body_end;
        }
        pos = body_end;
    }

    masked.push_str(&source[cursor..]);
    (masked, bodies)
}

/// The original body for a placeholder left by [`mask_raw_text`], or `text`
/// itself when it is not one.
pub fn unmask_raw_text<'a>(text: &'a str, bodies: &'a [String]) -> &'a str {
    text.strip_prefix(MASK)
        .and_then(|t| t.strip_suffix(MASK))
        .and_then(|index| index.parse::<usize>().ok())
        .and_then(|index| bodies.get(index))
        .map_or(text, String::as_str)
}

// =============================================================================
// Attribute Parsing
// =============================================================================

/// Parse HTML-style attributes from a string, preserving source order.
///
/// Input: `rel="stylesheet" href='/a.css' inline`
/// Output: `[("rel", Some("stylesheet")), ("href", Some("/a.css")), ("inline", None)]`
///
/// Attribute names are lowercased; values are kept verbatim.
pub fn parse_attributes(s: &str) -> Vec<(String, Option<String>)> {
    let mut attrs = Vec::new();
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c.is_whitespace() || c == '/' {
            continue;
        }

        // Read attribute name
        let mut name = String::new();
        name.push(c);
        while let Some(&next) = chars.peek() {
            if next == '=' || next.is_whitespace() {
                break;
            }
            name.push(next);
            chars.next();
        }

        // Skip whitespace
        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }

        if chars.peek() != Some(&'=') {
            // Boolean attribute (no value)
            attrs.push((name.to_ascii_lowercase(), None));
            continue;
        }
        chars.next(); // consume '='

        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }

        let mut value = String::new();
        match chars.peek().copied() {
            Some(quote @ ('"' | '\'')) => {
                chars.next();
                for c in chars.by_ref() {
                    if c == quote {
                        break;
                    }
                    value.push(c);
                }
            }
            _ => {
                // Unquoted value (read until whitespace)
                while let Some(&c) = chars.peek() {
                    if c.is_whitespace() {
                        break;
                    }
                    value.push(c);
                    chars.next();
                }
            }
        }

        attrs.push((name.to_ascii_lowercase(), Some(value)));
    }

    attrs
}

// =============================================================================
// Tests
// =============================================================================
