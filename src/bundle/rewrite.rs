//! Per-module import/export analysis and source rewriting.
//!
//! A module's top-level `import`/`export` syntax is removed from its source
//! and described as data, so the bundler can wire modules together through
//! a runtime registry:
//!
//! ```text
//! import { a as b } from './x.js';   →  binding b = <x>["a"]     (removed)
//! export const c = 1;                →  export c → c             ("export " dropped)
//! export default 1 + 2;              →  var __default = 1 + 2;
//! export * from './y.js';            →  star <y>                 (removed)
//! ```
//!
//! Imports stay live: every reference to an imported binding is rewritten to
//! read the dependency's export object (`b` → `__dep0["a"]`), so a later
//! assignment in the exporting module is visible to importers.

use oxc::allocator::Allocator;
use oxc::ast::AstKind;
use oxc::ast::ast::{
    BindingIdentifier, Declaration, ExportDefaultDeclarationKind, ImportDeclarationSpecifier,
    ModuleExportName, Statement,
};
use oxc::parser::Parser;
use oxc::semantic::{Semantic, SemanticBuilder};
use oxc::span::{GetSpan, SourceType, Span};

/// Local name given to an anonymous default export.
pub const DEFAULT_LOCAL: &str = "__default";

/// An imported binding: `local` is read from request `request`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportBinding {
    pub local: String,
    pub request: usize,
    /// Export name read from the dependency; `None` binds the namespace.
    pub imported: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportEntry {
    /// `exported` reads the module's own `local` binding.
    Local { exported: String, local: String },
    /// `exported` forwards a dependency's export (or its namespace).
    ReExport {
        exported: String,
        request: usize,
        imported: Option<String>,
    },
    /// `export * from ...`
    Star { request: usize },
}

/// Rewritten module source plus its module-level links.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleAnalysis {
    /// Source with all module syntax removed.
    pub body: String,
    /// Dependency specifiers, deduplicated, in order of appearance.
    pub requests: Vec<String>,
    pub bindings: Vec<ImportBinding>,
    pub exports: Vec<ExportEntry>,
}

/// Parse `source` as an ES module and strip its import/export syntax.
///
/// On failure the first parser diagnostic is returned.
pub fn analyze_module(source: &str) -> Result<ModuleAnalysis, String> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, source, SourceType::mjs()).parse();
    if let Some(error) = ret.errors.first() {
        return Err(error.to_string());
    }
    let semantic = SemanticBuilder::new().build(&ret.program).semantic;

    let mut rewriter = Rewriter::default();
    for stmt in &ret.program.body {
        match stmt {
            Statement::ImportDeclaration(decl) => {
                let request = rewriter.request(decl.source.value.as_str());
                for specifier in decl.specifiers.iter().flatten() {
                    let (local, imported) = match specifier {
                        ImportDeclarationSpecifier::ImportSpecifier(s) => {
                            (&s.local, Some(export_name(&s.imported)))
                        }
                        ImportDeclarationSpecifier::ImportDefaultSpecifier(s) => {
                            (&s.local, Some("default".to_string()))
                        }
                        ImportDeclarationSpecifier::ImportNamespaceSpecifier(s) => {
                            (&s.local, None)
                        }
                    };
                    rewriter.redirect(&semantic, local, &member(request, imported.as_deref()));
                    rewriter.analysis.bindings.push(ImportBinding {
                        local: local.name.to_string(),
                        request,
                        imported,
                    });
                }
                rewriter.remove(decl.span);
            }

            Statement::ExportNamedDeclaration(decl) => {
                if let Some(source) = &decl.source {
                    let request = rewriter.request(source.value.as_str());
                    for spec in &decl.specifiers {
                        rewriter.analysis.exports.push(ExportEntry::ReExport {
                            exported: export_name(&spec.exported),
                            request,
                            imported: Some(export_name(&spec.local)),
                        });
                    }
                    rewriter.remove(decl.span);
                } else if let Some(declaration) = &decl.declaration {
                    for name in declared_names(declaration) {
                        rewriter.analysis.exports.push(ExportEntry::Local {
                            exported: name.clone(),
                            local: name,
                        });
                    }
                    rewriter.replace(decl.span.start, declaration.span().start, "");
                } else {
                    for spec in &decl.specifiers {
                        rewriter.analysis.exports.push(ExportEntry::Local {
                            exported: export_name(&spec.exported),
                            local: export_name(&spec.local),
                        });
                    }
                    rewriter.remove(decl.span);
                }
            }

            Statement::ExportDefaultDeclaration(decl) => {
                let named = match &decl.declaration {
                    ExportDefaultDeclarationKind::FunctionDeclaration(f) => {
                        f.id.as_ref().map(|id| id.name.to_string())
                    }
                    ExportDefaultDeclarationKind::ClassDeclaration(c) => {
                        c.id.as_ref().map(|id| id.name.to_string())
                    }
                    _ => None,
                };
                let start = decl.declaration.span().start;
                let local = match named {
                    Some(local) => {
                        rewriter.replace(decl.span.start, start, "");
                        local
                    }
                    None => {
                        rewriter.replace(decl.span.start, start, "var __default = ");
                        rewriter.replace(decl.span.end, decl.span.end, ";");
                        DEFAULT_LOCAL.to_string()
                    }
                };
                rewriter.analysis.exports.push(ExportEntry::Local {
                    exported: "default".to_string(),
                    local,
                });
            }

            Statement::ExportAllDeclaration(decl) => {
                let request = rewriter.request(decl.source.value.as_str());
                let entry = match &decl.exported {
                    Some(name) => ExportEntry::ReExport {
                        exported: export_name(name),
                        request,
                        imported: None,
                    },
                    None => ExportEntry::Star { request },
                };
                rewriter.analysis.exports.push(entry);
                rewriter.remove(decl.span);
            }

            _ => {}
        }
    }

    Ok(rewriter.finish(source))
}

#[derive(Default)]
struct Rewriter {
    analysis: ModuleAnalysis,
    edits: Vec<(u32, u32, String)>,
}

impl Rewriter {
    /// Index of `specifier` in the request list, adding it if new.
    fn request(&mut self, specifier: &str) -> usize {
        let requests = &mut self.analysis.requests;
        match requests.iter().position(|r| r == specifier) {
            Some(index) => index,
            None => {
                requests.push(specifier.to_string());
                requests.len() - 1
            }
        }
    }

    fn remove(&mut self, span: Span) {
        self.replace(span.start, span.end, "");
    }

    fn replace(&mut self, start: u32, end: u32, with: impl Into<String>) {
        self.edits.push((start, end, with.into()));
    }

    /// Rewrite every reference to the imported `local` into `target`.
    fn redirect(&mut self, semantic: &Semantic, local: &BindingIdentifier, target: &str) {
        let Some(symbol_id) = local.symbol_id.get() else {
            return;
        };
        let nodes = semantic.nodes();
        for reference in semantic.scoping().get_resolved_references(symbol_id) {
            let node_id = reference.node_id();
            let span = nodes.kind(node_id).span();
            let with = match nodes.parent_kind(node_id) {
                AstKind::ObjectProperty(prop) if prop.shorthand => {
                    format!("{}: {target}", local.name)
                }
                // Imported functions are called without a receiver.
                AstKind::CallExpression(call) if call.callee.span() == span => {
                    format!("(0, {target})")
                }
                _ => target.to_string(),
            };
            self.replace(span.start, span.end, with);
        }
    }

    fn finish(mut self, source: &str) -> ModuleAnalysis {
        self.edits.sort_by_key(|&(start, end, _)| (start, end));

        let mut body = String::with_capacity(source.len());
        let mut cursor = 0;
        for (start, end, with) in self.edits {
            let (start, end) = (start as usize, end as usize);
            // Inside a span an earlier edit already replaced.
            if start < cursor {
                continue;
            }
            body.push_str(&source[cursor..start]);
            body.push_str(&with);
            cursor = end;
        }
        body.push_str(&source[cursor..]);

        // `export { imported }` forwards the dependency's binding.
        let bindings = &self.analysis.bindings;
        for entry in &mut self.analysis.exports {
            if let ExportEntry::Local { exported, local } = entry
                && let Some(binding) = bindings.iter().find(|b| b.local == *local)
            {
                *entry = ExportEntry::ReExport {
                    exported: std::mem::take(exported),
                    request: binding.request,
                    imported: binding.imported.clone(),
                };
            }
        }

        self.analysis.body = body;
        self.analysis
    }
}

/// `__depN["name"]`, or the whole namespace `__depN`.
pub(super) fn member(request: usize, name: Option<&str>) -> String {
    match name {
        Some(name) => format!("__dep{request}[{}]", quote(name)),
        None => format!("__dep{request}"),
    }
}

pub(super) fn quote(name: &str) -> String {
    serde_json::to_string(name).unwrap_or_else(|_| format!("\"{name}\""))
}

fn export_name(name: &ModuleExportName) -> String {
    match name {
        ModuleExportName::IdentifierName(id) => id.name.to_string(),
        ModuleExportName::IdentifierReference(id) => id.name.to_string(),
        ModuleExportName::StringLiteral(lit) => lit.value.to_string(),
    }
}

/// Names bound by an exported declaration.
fn declared_names(declaration: &Declaration) -> Vec<String> {
    match declaration {
        Declaration::VariableDeclaration(var) => var
            .declarations
            .iter()
            .flat_map(|declarator| declarator.id.get_binding_identifiers())
            .map(|id| id.name.to_string())
            .collect(),
        Declaration::FunctionDeclaration(f) => {
            f.id.iter().map(|id| id.name.to_string()).collect()
        }
        Declaration::ClassDeclaration(c) => c.id.iter().map(|id| id.name.to_string()).collect(),
        _ => Vec::new(),
    }
}
