//! Syntax lowering of a finished bundle for the configured browsers.
//!
//! The environment comes from the browserslist queries shared with CSS
//! prefixing, unless an explicit ECMAScript/engine target overrides it.
//! Lowering stops at what oxc's transformer implements: ES2015 output is
//! the floor, so destructuring, classes and `let`/`const` are never
//! rewritten for ES5 engines.

use std::path::Path;

use oxc::allocator::Allocator;
use oxc::codegen::Codegen;
use oxc::parser::Parser;
use oxc::semantic::SemanticBuilder;
use oxc::span::SourceType;
use oxc::transformer::{EnvOptions, TransformOptions, Transformer};

use crate::pipeline::PipelineError;

use super::BundleOptions;

/// Check that `target` is a lowering target (`es2015`, `chrome80,firefox70`, ...).
pub fn validate_target(target: &str) -> Result<(), String> {
    EnvOptions::from_target(target).map(|_| ())
}

/// Transform options for `options`; the explicit target wins over browsers.
fn transform_options(options: &BundleOptions) -> Result<TransformOptions, String> {
    let env = match (&options.target, options.browsers.is_empty()) {
        (Some(target), _) => EnvOptions::from_target(target)?,
        (None, false) => EnvOptions::from_browserslist_query(&options.browsers.join(", "))?,
        (None, true) => EnvOptions::default(),
    };
    Ok(TransformOptions {
        env,
        ..TransformOptions::default()
    })
}

/// Lower classic-script `code` for the environment `options` describe.
pub fn lower(code: &str, options: &BundleOptions) -> Result<String, PipelineError> {
    let fail = |message: String| PipelineError::Transpile {
        target: options
            .target
            .clone()
            .unwrap_or_else(|| options.browsers.join(", ")),
        message,
    };

    let transform = transform_options(options).map_err(fail)?;

    let allocator = Allocator::default();
    let source_type = SourceType::mjs().with_module(false);
    let ret = Parser::new(&allocator, code, source_type).parse();
    if let Some(error) = ret.errors.first() {
        return Err(fail(error.to_string()));
    }
    let mut program = ret.program;

    let scoping = SemanticBuilder::new()
        .build(&program)
        .semantic
        .into_scoping();
    let ret = Transformer::new(&allocator, Path::new("bundle.js"), &transform)
        .build_with_scoping(scoping, &mut program);
    if let Some(error) = ret.errors.first() {
        return Err(fail(error.to_string()));
    }

    Ok(Codegen::new().build(&program).code)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn browsers(queries: &[&str]) -> BundleOptions {
        BundleOptions {
            browsers: queries.iter().map(|q| q.to_string()).collect(),
            ..BundleOptions::default()
        }
    }

    fn target(target: &str) -> BundleOptions {
        BundleOptions {
            target: Some(target.to_string()),
            ..BundleOptions::default()
        }
    }

    #[test]
    fn test_validate_target() {
        assert!(validate_target("es2015").is_ok());
        assert!(validate_target("es2020").is_ok());
        assert!(validate_target("not-a-target").is_err());
    }

    #[test]
    fn test_lower_for_old_browsers() {
        let code = "var pick = ({ a, b }) => a + b;\nvar x = 2 ** 3;\n";
        let lowered = lower(code, &browsers(&["ie 11"])).unwrap();
        assert!(!lowered.contains("=>"));
        assert!(lowered.contains("Math.pow"));
    }

    #[test]
    fn test_default_browsers_lower_arrows() {
        let lowered = lower("var f = (a) => a * 2;", &BundleOptions::default()).unwrap();
        assert!(!lowered.contains("=>"));
    }

    #[test]
    fn test_modern_browsers_keep_syntax() {
        let lowered = lower("var f = (a) => a ** 2;", &browsers(&["chrome 120"])).unwrap();
        assert!(lowered.contains("=>"));
        assert!(lowered.contains("**"));
    }

    #[test]
    fn test_target_overrides_browsers() {
        let options = BundleOptions {
            target: Some("es2020".to_string()),
            ..browsers(&["ie 11"])
        };
        let lowered = lower("var x = 2 ** 3;", &options).unwrap();
        assert!(lowered.contains("**"));

        let lowered = lower("var x = 2 ** 3;", &target("es2015")).unwrap();
        assert!(lowered.contains("Math.pow"));
    }

    #[test]
    fn test_lower_syntax_error() {
        assert!(matches!(
            lower("var = ;", &target("es2015")),
            Err(PipelineError::Transpile { .. })
        ));
    }
}
