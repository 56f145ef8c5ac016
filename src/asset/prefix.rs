//! Vendor prefixing for a browser support matrix.

use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use lightningcss::targets::{Browsers, Targets};

use crate::pipeline::PipelineError;

/// Browserslist queries used when none are configured.
pub const DEFAULT_BROWSERS: [&str; 2] = ["> 1%", "last 2 versions"];

/// Resolve browserslist queries into lightningcss targets.
///
/// An empty query list yields default targets (no prefixing).
pub fn browser_targets(queries: &[String]) -> Result<Targets, String> {
    if queries.is_empty() {
        return Ok(Targets::default());
    }
    let browsers = Browsers::from_browserslist(queries).map_err(|e| e.to_string())?;
    Ok(Targets {
        browsers,
        ..Targets::default()
    })
}

/// Add the vendor prefixes `targets` need. Output is not minified.
pub fn vendor_prefix(css: &str, targets: Targets) -> Result<String, PipelineError> {
    let mut sheet = StyleSheet::parse(css, ParserOptions::default())
        .map_err(|e| PipelineError::CleanCss(e.to_string()))?;
    sheet
        .minify(MinifyOptions {
            targets,
            ..MinifyOptions::default()
        })
        .map_err(|e| PipelineError::CleanCss(e.to_string()))?;
    let result = sheet
        .to_css(PrinterOptions {
            targets,
            ..PrinterOptions::default()
        })
        .map_err(|e| PipelineError::CleanCss(e.to_string()))?;
    Ok(result.code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_browser_targets() {
        let targets = browser_targets(&["safari 10".to_string()]).unwrap();
        assert!(targets.browsers.is_some());
        assert!(browser_targets(&[]).unwrap().browsers.is_none());
        assert!(browser_targets(&["not a browser 99".to_string()]).is_err());
    }

    #[test]
    fn test_vendor_prefix_for_old_safari() {
        let targets = browser_targets(&["safari 10".to_string()]).unwrap();
        let css = vendor_prefix(".a { user-select: none }", targets).unwrap();
        assert!(css.contains("-webkit-user-select"));
    }

    #[test]
    fn test_vendor_prefix_without_targets_is_plain() {
        let css = vendor_prefix(".a { user-select: none }", Targets::default()).unwrap();
        assert!(!css.contains("-webkit-"));
    }

    #[test]
    fn test_vendor_prefix_parse_error() {
        assert!(matches!(
            vendor_prefix("a { color: red; }}}{", Targets::default()),
            Err(PipelineError::CleanCss(_))
        ));
    }
}
