//! Generic syntax model shared by the frontend and the extraction core.
//!
//! ## Module Structure
//!
//! - `node`: `SyntaxNode` and its closed set of kinds
//! - `scope`: qualified names, module ids and per-file name resolution
//! - `types`: project type hierarchy arena

pub mod node;
pub mod scope;
pub mod types;

use std::collections::{BTreeMap, HashSet};

pub use node::{
    BinaryOp, Construction, FieldRef, Invocation, Literal, NodeKind, Position, SyntaxNode,
    TagUse, UnaryOp,
};
pub use scope::{FileImports, FileScope, ImportInfo, ModuleNames, SymbolLookup};
pub use types::{MethodSig, TypeGraph, TypeId, TypeNode};

/// A `//` comment as found in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineComment {
    /// Comment text without the leading `//`, trimmed.
    pub text: String,
    /// 0-based column of the `//`.
    pub column: usize,
    /// True when only whitespace precedes the comment on its line.
    pub own_line: bool,
}

/// Line comments of one file, keyed by 1-based line.
pub type LineComments = BTreeMap<usize, LineComment>;

/// Lowered view of one source file: the sites offered to the rule registry.
#[derive(Debug, Clone, Default)]
pub struct SourceTree {
    /// Path relative to the source root, `/`-separated.
    pub path: String,
    /// Module id of the file (see [`scope::module_id`]).
    pub module: String,
    /// Calls, constructions and tag uses in source order.
    pub sites: Vec<SyntaxNode>,
    pub imports: FileImports,
    /// Names declared at module level.
    pub locals: HashSet<String>,
    pub comments: LineComments,
    /// Source lines, used for report context.
    pub lines: Vec<String>,
}

impl SourceTree {
    pub fn source_line(&self, line: usize) -> &str {
        line.checked_sub(1)
            .and_then(|idx| self.lines.get(idx))
            .map(String::as_str)
            .unwrap_or_default()
    }
}
