//! Text minification for inline scripts and stylesheets.
//!
//! Uses oxc for JavaScript and lightningcss for CSS.

use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};
use oxc::allocator::Allocator;
use oxc::codegen::{Codegen, CodegenOptions, CommentOptions};
use oxc::mangler::MangleOptions;
use oxc::minifier::{CompressOptions, Minifier, MinifierOptions};
use oxc::parser::Parser;
use oxc::span::SourceType;

use crate::pipeline::PipelineError;

/// Minify JavaScript source code.
///
/// `module` selects ES module parsing (`type="module"` scripts); classic
/// scripts are parsed as scripts so their top-level names stay global.
/// On failure the first parser diagnostic is returned.
pub fn minify_js(source: &str, module: bool) -> Result<String, String> {
    let allocator = Allocator::default();
    let source_type = SourceType::mjs().with_module(module);
    let ret = Parser::new(&allocator, source, source_type).parse();
    if let Some(error) = ret.errors.first() {
        return Err(error.to_string());
    }
    if ret.panicked {
        return Err("parser aborted".to_string());
    }

    let mut program = ret.program;
    let options = MinifierOptions {
        mangle: Some(MangleOptions::default()),
        compress: Some(CompressOptions::smallest()),
    };
    let ret = Minifier::new(options).minify(&allocator, &mut program);
    let code = Codegen::new()
        .with_options(CodegenOptions {
            minify: true,
            comments: CommentOptions::disabled(),
            ..CodegenOptions::default()
        })
        .with_scoping(ret.scoping)
        .build(&program)
        .code;
    Ok(code)
}

/// Minify CSS source code.
pub fn minify_css(source: &str) -> Result<String, PipelineError> {
    let stylesheet = StyleSheet::parse(source, ParserOptions::default())
        .map_err(|e| PipelineError::MinifyCss(e.to_string()))?;
    let result = stylesheet
        .to_css(PrinterOptions {
            minify: true,
            ..PrinterOptions::default()
        })
        .map_err(|e| PipelineError::MinifyCss(e.to_string()))?;
    Ok(result.code)
}
