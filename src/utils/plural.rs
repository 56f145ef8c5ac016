//! Pluralization for log summaries.

/// Format count with noun, handling pluralization
///
/// - `plural_count(0, "document")` -> `"0 documents"`
/// - `plural_count(1, "image")` -> `"1 image"`
#[inline]
pub fn plural_count(count: usize, noun: &str) -> String {
    let suffix = if count == 1 { "" } else { "s" };
    format!("{count} {noun}{suffix}")
}
