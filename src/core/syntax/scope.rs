//! Name resolution for a single source file.
//!
//! Qualified names have the form `module#Name`, where `module` is either a project module id
//! (the extension-less path relative to the source root) or a package specifier kept verbatim
//! (`@acme/i18n`).

use std::collections::{HashMap, HashSet};

use crate::core::syntax::TypeGraph;

/// Owner used for calls to functions that resolve to nothing in the file's scope.
pub const GLOBAL_OWNER: &str = "globalThis";

const SOURCE_EXTENSIONS: &[&str] = &["tsx", "ts", "jsx", "js", "mjs", "cjs", "mts", "cts"];

/// One import binding of a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportInfo {
    /// Local name in the importing file (e.g., "i18n").
    pub local_name: String,
    /// Exported name (e.g., "Translator", "default", or "*" for namespace imports).
    pub imported_name: String,
    /// Resolved module (project module id or package specifier).
    pub module: String,
}

impl ImportInfo {
    pub fn is_namespace(&self) -> bool {
        self.imported_name == "*"
    }
}

/// All imports of a single file.
pub type FileImports = Vec<ImportInfo>;

/// Name-resolution capability offered by the source frontend.
pub trait SymbolLookup {
    /// Resolve a written (possibly dotted) name to its qualified name.
    fn resolve_name(&self, written: &str) -> Option<String>;

    /// The project type hierarchy.
    fn types(&self) -> &TypeGraph;
}

pub fn qualify(module: &str, name: &str) -> String {
    format!("{}#{}", module, name)
}

/// Module id for a source file path relative to the source root.
///
/// `src/app/page.tsx` -> `src/app/page`, `src/i18n/index.ts` -> `src/i18n`.
pub fn module_id(relative_path: &str) -> String {
    let normalized = relative_path.replace('\\', "/");
    let normalized = normalized.strip_prefix("./").unwrap_or(&normalized);
    strip_index(strip_extension(normalized)).to_string()
}

/// Resolve an import specifier as seen from `importer` (a relative file path).
///
/// Relative specifiers become module ids, package specifiers are returned unchanged.
pub fn resolve_module_specifier(importer: &str, specifier: &str) -> String {
    if !specifier.starts_with('.') {
        return specifier.to_string();
    }

    let importer = importer.replace('\\', "/");
    let mut segments: Vec<&str> = importer.split('/').collect();
    segments.pop();

    for part in specifier.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                if segments.last().is_some_and(|s| *s != "..") {
                    segments.pop();
                } else {
                    segments.push("..");
                }
            }
            other => segments.push(other),
        }
    }

    let joined = segments
        .into_iter()
        .filter(|s| !s.is_empty() && *s != ".")
        .collect::<Vec<_>>()
        .join("/");
    strip_index(strip_extension(&joined)).to_string()
}

fn strip_extension(path: &str) -> &str {
    match path.rsplit_once('.') {
        Some((stem, ext))
            if !stem.is_empty() && !ext.contains('/') && SOURCE_EXTENSIONS.contains(&ext) =>
        {
            stem
        }
        _ => path,
    }
}

fn strip_index(path: &str) -> &str {
    if path == "index" {
        return path;
    }
    path.strip_suffix("/index").unwrap_or(path)
}

/// Names visible at module level in one file.
#[derive(Debug, Clone, Copy)]
pub struct ModuleNames<'a> {
    pub module: &'a str,
    pub imports: &'a [ImportInfo],
    /// Names declared at module level in this file.
    pub locals: &'a HashSet<String>,
    /// Default export name per module (`module -> Name`).
    pub default_exports: &'a HashMap<String, String>,
}

impl ModuleNames<'_> {
    fn qualify_import(&self, import: &ImportInfo) -> String {
        if import.imported_name == "default"
            && let Some(name) = self.default_exports.get(&import.module)
        {
            return qualify(&import.module, name);
        }
        qualify(&import.module, &import.imported_name)
    }

    /// Find the import that introduced `local`.
    pub fn import_for(&self, local: &str) -> Option<&ImportInfo> {
        self.imports.iter().find(|i| i.local_name == local)
    }

    /// Resolve a written (possibly dotted) name.
    ///
    /// Explicit imports win over namespace imports, which win over same-file declarations.
    /// A namespace import on its own resolves to the bare module.
    pub fn resolve(&self, written: &str) -> Option<String> {
        let (head, rest) = match written.split_once('.') {
            Some((head, rest)) => (head, Some(rest)),
            None => (written, None),
        };

        // 1. Explicit imports
        if let Some(import) = self
            .imports
            .iter()
            .find(|i| !i.is_namespace() && i.local_name == head)
        {
            let base = self.qualify_import(import);
            return Some(match rest {
                Some(rest) => format!("{}.{}", base, rest),
                None => base,
            });
        }

        // 2. Namespace (wildcard) imports
        if let Some(import) = self
            .imports
            .iter()
            .find(|i| i.is_namespace() && i.local_name == head)
        {
            return Some(match rest {
                Some(rest) => qualify(&import.module, rest),
                None => import.module.clone(),
            });
        }

        // 3. Same-file declarations
        if self.locals.contains(head) {
            return Some(qualify(self.module, written));
        }

        None
    }
}

/// Per-file scope backed by the project declaration index.
pub struct FileScope<'a> {
    pub names: ModuleNames<'a>,
    pub types: &'a TypeGraph,
}

impl SymbolLookup for FileScope<'_> {
    fn resolve_name(&self, written: &str) -> Option<String> {
        self.names.resolve(written)
    }

    fn types(&self) -> &TypeGraph {
        self.types
    }
}
