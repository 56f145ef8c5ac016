//! Text transforms applied to inline code and whole documents.
//!
//! These are pure functions: source text in, transformed text out.

mod markup;
mod minify;
mod prefix;
mod prune;

pub use markup::minify_markup;
pub use minify::{minify_css, minify_js};
pub use prefix::{DEFAULT_BROWSERS, browser_targets, vendor_prefix};
pub use prune::prune_unused_selectors;
