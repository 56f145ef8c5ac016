//! Type-safe config field path.

/// A dotted path to a config field, used to label diagnostics.
///
/// Each section exposes its paths through a `FIELDS` constant:
///
/// ```ignore
/// diag.error(JsConfig::FIELDS.target, "unknown target");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldPath(pub &'static str);

impl FieldPath {
    #[inline]
    pub const fn new(path: &'static str) -> Self {
        Self(path)
    }

    #[inline]
    pub const fn as_str(&self) -> &'static str {
        self.0
    }
}
