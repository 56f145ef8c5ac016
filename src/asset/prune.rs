//! Unused selector pruning.
//!
//! The stylesheet is parsed with lightningcss and each selector of every
//! style rule (inside `@media`, `@supports`, `@container` and `@layer`
//! blocks too) is checked against an HTML snapshot. A selector survives
//! when it matches an `ignore` pattern or when every class and id it
//! requires is present in the snapshot. Rules left without selectors are
//! dropped.

use lightningcss::printer::PrinterOptions;
use lightningcss::rules::{CssRule, CssRuleList};
use lightningcss::selector::{Component, Selector};
use lightningcss::stylesheet::{ParserOptions, StyleSheet};
use lightningcss::traits::ToCss;
use regex::Regex;
use rustc_hash::FxHashSet;

use crate::document::Document;
use crate::pipeline::PipelineError;

/// Remove the rules of `css` whose selectors are not used by `snapshot`.
///
/// Selectors matching any `ignore` pattern are never pruned.
pub fn prune_unused_selectors(
    css: &str,
    snapshot: &str,
    ignore: &[Regex],
) -> Result<String, PipelineError> {
    let used = used_symbols(snapshot)?;
    let mut sheet = StyleSheet::parse(css, ParserOptions::default())
        .map_err(|e| PipelineError::CleanCss(e.to_string()))?;

    let pruner = Pruner { used: &used, ignore };
    let dropped = pruner.prune(&mut sheet.rules);
    if dropped == 0 {
        return Ok(css.to_string());
    }
    crate::debug!("clean"; "pruned {} unused selectors", dropped);

    let result = sheet
        .to_css(PrinterOptions::default())
        .map_err(|e| PipelineError::CleanCss(e.to_string()))?;
    Ok(result.code)
}

struct Pruner<'a> {
    used: &'a FxHashSet<String>,
    ignore: &'a [Regex],
}

impl Pruner<'_> {
    /// Drop unused selectors and emptied rules; returns the selectors dropped.
    fn prune(&self, rules: &mut CssRuleList) -> usize {
        let mut dropped = 0;
        rules.0.retain_mut(|rule| match rule {
            CssRule::Style(style) => {
                let before = style.selectors.0.len();
                style.selectors.0.retain(|selector| self.keeps(selector));
                dropped += before - style.selectors.0.len();
                if style.selectors.0.is_empty() {
                    return false;
                }
                dropped += self.prune(&mut style.rules);
                true
            }
            CssRule::Media(media) => self.prune_block(&mut media.rules, &mut dropped),
            CssRule::Supports(supports) => self.prune_block(&mut supports.rules, &mut dropped),
            CssRule::Container(container) => {
                self.prune_block(&mut container.rules, &mut dropped)
            }
            CssRule::LayerBlock(layer) => self.prune_block(&mut layer.rules, &mut dropped),
            _ => true,
        });
        dropped
    }

    /// Prune a conditional block; it is kept while it still holds rules.
    fn prune_block(&self, rules: &mut CssRuleList, dropped: &mut usize) -> bool {
        let pruned = self.prune(rules);
        *dropped += pruned;
        pruned == 0 || !rules.0.is_empty()
    }

    fn keeps(&self, selector: &Selector) -> bool {
        let ignored = selector
            .to_css_string(PrinterOptions::default())
            .is_ok_and(|text| self.ignore.iter().any(|re| re.is_match(&text)));
        ignored || required_symbols(selector).all(|symbol| self.used.contains(symbol))
    }
}

/// Classes and ids the selector's own compounds require.
///
/// Arguments of functional pseudo-classes (`:not()`, `:is()`, ...) are not
/// requirements and are skipped.
fn required_symbols<'a>(selector: &'a Selector) -> impl Iterator<Item = &'a str> {
    selector
        .iter_raw_match_order()
        .filter_map(|component| match component {
            Component::Class(name) | Component::ID(name) => Some(&*name.0),
            _ => None,
        })
}

/// Class names and ids present on any element of the snapshot.
fn used_symbols(snapshot: &str) -> Result<FxHashSet<String>, PipelineError> {
    let doc = Document::parse(snapshot)?;
    let mut used = FxHashSet::default();
    doc.for_each_element(|el| {
        if let Some(classes) = el.attrs.value("class") {
            used.extend(classes.split_whitespace().map(str::to_owned));
        }
        if let Some(id) = el.attrs.value("id") {
            used.insert(id.trim().to_owned());
        }
    });
    Ok(used)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ignore() -> Vec<Regex> {
        vec![Regex::new(r"\.navbar-menu\.is-active").unwrap()]
    }

    #[test]
    fn test_prune_drops_unused_rules() {
        let css = ".used { color: red }\n.unused { color: blue }\n#main { margin: 0 }";
        let html = r#"<div class="used other" id="main"></div>"#;
        let pruned = prune_unused_selectors(css, html, &[]).unwrap();
        assert!(pruned.contains(".used"));
        assert!(pruned.contains("#main"));
        assert!(!pruned.contains(".unused"));
    }

    #[test]
    fn test_prune_keeps_allow_listed_selectors() {
        let css = ".navbar-menu.is-active { display: block }\n.gone { color: red }";
        let pruned = prune_unused_selectors(css, "<nav></nav>", &ignore()).unwrap();
        assert!(pruned.contains(".navbar-menu.is-active"));
        assert!(!pruned.contains(".gone"));
    }

    #[test]
    fn test_allow_list_protects_selectors_not_symbols() {
        let css = ".navbar-menu.is-active { display: block }\n\
                   .navbar-menu { color: red }\n\
                   .is-active { color: blue }";
        let pruned = prune_unused_selectors(css, "<p></p>", &ignore()).unwrap();
        assert!(pruned.contains(".navbar-menu.is-active"));
        assert!(!pruned.contains(".navbar-menu {"));
        assert!(!pruned.contains("color: red"));
        assert!(!pruned.contains("color: #00f") && !pruned.contains("color: blue"));
    }

    #[test]
    fn test_prune_selector_list_members() {
        let css = ".a, .b { color: red }";
        let pruned = prune_unused_selectors(css, r#"<p class="a"></p>"#, &[]).unwrap();
        assert!(pruned.contains(".a"));
        assert!(!pruned.contains(".b"));
    }

    #[test]
    fn test_prune_inside_media_and_supports() {
        let css = "@media (max-width: 10px) { .gone { top: 0 } .kept { top: 1px } }\n\
                   @supports (display: grid) { .gone { display: grid } }";
        let pruned = prune_unused_selectors(css, r#"<p class="kept"></p>"#, &[]).unwrap();
        assert!(pruned.contains("@media"));
        assert!(pruned.contains(".kept"));
        assert!(!pruned.contains(".gone"));
        assert!(!pruned.contains("@supports"));
    }

    #[test]
    fn test_negated_classes_are_not_required() {
        let css = "p:not(.hidden) { color: red }";
        let pruned = prune_unused_selectors(css, "<p></p>", &[]).unwrap();
        assert_eq!(pruned, css);
    }

    #[test]
    fn test_prune_nothing_unused_returns_input() {
        let css = ".a{color:red}";
        assert_eq!(prune_unused_selectors(css, r#"<p class="a"></p>"#, &[]).unwrap(), css);
    }

    #[test]
    fn test_used_symbols() {
        let used = used_symbols(r#"<p class=" a  b" id="x"><span class="c"></span></p>"#).unwrap();
        for symbol in ["a", "b", "c", "x"] {
            assert!(used.contains(symbol), "{symbol}");
        }
    }
}
