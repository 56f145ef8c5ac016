//! ES module bundling for `<script type="module" es6>` tags.
//!
//! ```text
//! entry text ──analyze──▶ requests ──resolve──▶ files ──analyze──▶ ...
//!                                   │
//!                                   ▼
//!        var bundle = (function () { registry; modules; return __require(0); })();
//!                                   │
//!                                   ▼
//!                  lower for browsers or target (oxc)
//! ```
//!
//! Modules are numbered in discovery order (breadth-first, the entry is 0)
//! and each becomes a function in a small CommonJS-style registry. Imported
//! bindings read the dependency's export getters on every use, so they stay
//! live across cycles and later assignments.
//! Every reachable module is included whether or not its exports are used.

mod lower;
mod resolve;
mod rewrite;

use std::fmt::Write;
use std::fs;

use rustc_hash::FxHashMap;

use crate::asset::DEFAULT_BROWSERS;
use crate::pipeline::PipelineError;

use lower::lower;
use resolve::ModuleId;
use rewrite::{ExportEntry, ModuleAnalysis, analyze_module, member, quote};

pub use lower::validate_target;
pub use resolve::ModuleResolver;

/// How bundles are emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleOptions {
    /// Browserslist queries the bundle is lowered for.
    pub browsers: Vec<String>,
    /// Explicit lowering target, overriding `browsers`.
    pub target: Option<String>,
    /// Global variable the entry's exports are assigned to.
    pub name: String,
}

impl Default for BundleOptions {
    fn default() -> Self {
        Self {
            browsers: DEFAULT_BROWSERS.map(String::from).to_vec(),
            target: None,
            name: "bundle".to_string(),
        }
    }
}

const RUNTIME: &str = r#"'use strict';
var __modules = [];
var __cache = [];
function __require(id) {
  var cached = __cache[id];
  if (cached) return cached;
  var exports = __cache[id] = {};
  __modules[id](exports);
  return exports;
}
function __export(target, getters) {
  Object.keys(getters).forEach(function (name) {
    Object.defineProperty(target, name, { enumerable: true, get: getters[name] });
  });
}
function __exportStar(target, source) {
  Object.keys(source).forEach(function (name) {
    if (name !== 'default' && !Object.prototype.hasOwnProperty.call(target, name)) {
      Object.defineProperty(target, name, { enumerable: true, get: function () { return source[name]; } });
    }
  });
}
"#;

/// Bundle `entry` and everything it imports into one lowered IIFE script.
pub fn bundle_modules(
    entry: &str,
    resolver: &ModuleResolver<'_>,
    options: &BundleOptions,
) -> Result<String, PipelineError> {
    let mut order = vec![ModuleId::Entry];
    let mut index: FxHashMap<ModuleId, usize> = FxHashMap::default();
    index.insert(ModuleId::Entry, 0);

    let mut modules = String::new();
    let mut next = 0;
    while next < order.len() {
        let id = order[next].clone();
        let source = match &id {
            ModuleId::Entry => entry.to_string(),
            ModuleId::File(path) => {
                fs::read_to_string(path).map_err(|e| PipelineError::io(path, e))?
            }
        };
        let analysis = analyze_module(&source).map_err(|message| PipelineError::Bundle {
            module: id.to_string(),
            message,
        })?;

        let mut deps = Vec::with_capacity(analysis.requests.len());
        for request in &analysis.requests {
            let dep = resolver.resolve(request, &id)?;
            let dep_index = *index.entry(dep.clone()).or_insert_with(|| {
                order.push(dep);
                order.len() - 1
            });
            deps.push(dep_index);
        }

        render_module(&mut modules, next, &analysis, &deps);
        next += 1;
    }
    crate::debug!("bundle"; "{} modules", order.len());

    let code = format!(
        "var {} = (function () {{\n{RUNTIME}{modules}return __require(0);\n}})();\n",
        options.name
    );
    lower(&code, options)
}

fn render_module(out: &mut String, index: usize, analysis: &ModuleAnalysis, deps: &[usize]) {
    let _ = writeln!(out, "__modules[{index}] = function (exports) {{");

    let getters: Vec<String> = analysis
        .exports
        .iter()
        .filter_map(|entry| {
            let (exported, value) = match entry {
                ExportEntry::Local { exported, local } => (exported, local.clone()),
                ExportEntry::ReExport {
                    exported,
                    request,
                    imported,
                } => (exported, member(*request, imported.as_deref())),
                ExportEntry::Star { .. } => return None,
            };
            Some(format!(
                "{}: function () {{ return {value}; }}",
                quote(exported)
            ))
        })
        .collect();
    if !getters.is_empty() {
        let _ = writeln!(out, "__export(exports, {{ {} }});", getters.join(", "));
    }

    for (request, dep) in deps.iter().enumerate() {
        let _ = writeln!(out, "var __dep{request} = __require({dep});");
    }
    for entry in &analysis.exports {
        if let ExportEntry::Star { request } = entry {
            let _ = writeln!(out, "__exportStar(exports, __dep{request});");
        }
    }

    out.push_str(&analysis.body);
    out.push_str("\n};\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_bundle_single_entry() {
        let dir = TempDir::new().unwrap();
        let resolver = ModuleResolver::new(dir.path(), "/js/", None);
        let code = bundle_modules("console.log('hi');", &resolver, &BundleOptions::default()).unwrap();
        assert!(code.contains("var bundle ="));
        assert!(code.contains("console.log(\"hi\")") || code.contains("console.log('hi')"));
        assert!(!code.contains("import "));
    }

    #[test]
    fn test_bundle_wires_dependencies() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "js/math.js", "export function add(a, b) { return a + b; }\n");
        write(
            dir.path(),
            "js/app.js",
            "import { add } from './math.js';\nexport const total = add(1, 2);\n",
        );
        let resolver = ModuleResolver::new(dir.path(), "/js/", None);
        let entry = "import { total } from '/js/app.js';\nexport { total };\n";
        let code = bundle_modules(entry, &resolver, &BundleOptions::default()).unwrap();

        assert!(code.contains("__modules[0]"));
        assert!(code.contains("__modules[1]"));
        assert!(code.contains("__modules[2]"));
        assert!(code.contains("function add(a, b)"));
        assert!(code.contains("__require(0)"));
    }

    #[test]
    fn test_bundle_name_and_target() {
        let dir = TempDir::new().unwrap();
        let resolver = ModuleResolver::new(dir.path(), "/js/", None);
        let options = BundleOptions {
            target: Some("es2015".into()),
            name: "site".into(),
            ..BundleOptions::default()
        };
        let code = bundle_modules("export const x = 2 ** 8;", &resolver, &options).unwrap();
        assert!(code.contains("var site ="));
        assert!(code.contains("Math.pow"));
    }

    #[test]
    fn test_bundle_is_deterministic() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "js/a.js", "export const a = 1;\n");
        write(dir.path(), "js/b.js", "export const b = 2;\n");
        let resolver = ModuleResolver::new(dir.path(), "/js/", None);
        let entry = "import { a } from '/js/a.js';\nimport { b } from '/js/b.js';\nconsole.log(a + b);";
        let first = bundle_modules(entry, &resolver, &BundleOptions::default()).unwrap();
        let second = bundle_modules(entry, &resolver, &BundleOptions::default()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_bundle_cycle_terminates() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "js/a.js", "import { b } from './b.js';\nexport const a = 1;\n");
        write(dir.path(), "js/b.js", "import { a } from './a.js';\nexport const b = 2;\n");
        let resolver = ModuleResolver::new(dir.path(), "/js/", None);
        let code = bundle_modules("import '/js/a.js';", &resolver, &BundleOptions::default()).unwrap();
        assert!(code.contains("__modules[2]"));
        assert!(!code.contains("__modules[3]"));
    }

    #[test]
    fn test_bundle_imports_read_live_exports() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "js/counter.js",
            "export let count = 0;\nexport function inc() { count++; }\n",
        );
        let resolver = ModuleResolver::new(dir.path(), "/js/", None);
        let entry = "import { count, inc } from '/js/counter.js';\ninc();\nexport const seen = count;\n";
        let options = BundleOptions {
            target: Some("es2020".into()),
            ..BundleOptions::default()
        };
        let code = bundle_modules(entry, &resolver, &options).unwrap();

        assert!(code.contains("count++"));
        assert!(code.contains(r#"seen = __dep0["count"]"#));
        assert!(!code.contains("var count ="));
        assert!(!code.contains("var inc ="));
    }

    #[test]
    fn test_bundle_cycle_reads_through_exports() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "js/a.js",
            "import { b } from './b.js';\nexport const a = 1;\nexport function readB() { return b; }\n",
        );
        write(
            dir.path(),
            "js/b.js",
            "import { a } from './a.js';\nexport const b = 2;\nexport function readA() { return a; }\n",
        );
        let resolver = ModuleResolver::new(dir.path(), "/js/", None);
        let options = BundleOptions {
            target: Some("es2020".into()),
            ..BundleOptions::default()
        };
        let code = bundle_modules("export * from '/js/a.js';", &resolver, &options).unwrap();

        assert!(code.contains(r#"return __dep0["b"]"#));
        assert!(code.contains(r#"return __dep0["a"]"#));
        assert!(!code.contains("var a = __dep"));
        assert!(!code.contains("var b = __dep"));
    }

    #[test]
    fn test_bundle_missing_file() {
        let dir = TempDir::new().unwrap();
        let resolver = ModuleResolver::new(dir.path(), "/js/", None);
        let err = bundle_modules("import '/js/none.js';", &resolver, &BundleOptions::default())
            .unwrap_err();
        assert!(matches!(err, PipelineError::Io { .. }));
    }

    #[test]
    fn test_bundle_unresolvable_import() {
        let dir = TempDir::new().unwrap();
        let resolver = ModuleResolver::new(dir.path(), "/js/", None);
        let err = bundle_modules("import 'lodash';", &resolver, &BundleOptions::default())
            .unwrap_err();
        assert!(matches!(err, PipelineError::Resolution { .. }));
    }
}
