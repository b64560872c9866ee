//! Source frontend: lowers swc's JS/TS AST into the generic syntax model.
//!
//! Lowering runs in two passes over the project:
//!
//! 1. `declarations`: collect what every file declares and imports
//! 2. `index`: merge declarations into a [`ProjectIndex`] (type graph, constants, value types)
//! 3. `lowering`: lower each file's call sites and constant initializers against that index

pub mod declarations;
pub mod index;
pub mod lowering;
pub mod types;

use swc_ecma_visit::VisitWith;

pub use declarations::{FileDeclarations, scan_module};
pub use index::ProjectIndex;
pub use lowering::ConstantInit;

use crate::core::parsers::source::ParsedSource;
use crate::core::syntax::{ModuleNames, SourceTree};

/// Result of lowering one file.
#[derive(Debug, Clone, Default)]
pub struct LoweredFile {
    pub tree: SourceTree,
    pub constants: Vec<ConstantInit>,
}

pub fn lower_file(
    parsed: ParsedSource,
    decls: &FileDeclarations,
    index: &ProjectIndex,
) -> LoweredFile {
    let names = ModuleNames {
        module: &decls.module,
        imports: &decls.imports,
        locals: &decls.locals,
        default_exports: &index.default_exports,
    };

    let mut lowerer = lowering::Lowerer::new(&parsed.source_map, names, index);
    parsed.module.visit_with(&mut lowerer);
    let (sites, constants) = lowerer.finish();

    LoweredFile {
        tree: SourceTree {
            path: decls.path.clone(),
            module: decls.module.clone(),
            sites,
            imports: decls.imports.clone(),
            locals: decls.locals.clone(),
            comments: parsed.comments,
            lines: parsed.lines,
        },
        constants,
    }
}
