//! Extraction engine.
//!
//! ## Module Structure
//!
//! - `syntax`: generic syntax tree, name resolution and type hierarchy
//! - `parsers`: swc source parsing and the PO catalog reader/writer
//! - `lower`: declaration index and lowering of swc ASTs into `syntax` nodes
//! - `rules`: extraction rules and the rule registry
//! - `eval`: constant-folding expression evaluator
//! - `collect`: message collector and message store
//! - `catalog`: catalog model, read and atomic commit
//! - `reconcile`: merge of extracted messages into the committed catalog
//! - `file_scanner`: source file discovery
//! - `pipeline`: end-to-end `extract` and `run`

pub mod catalog;
pub mod collect;
pub mod error;
pub mod eval;
pub mod file_scanner;
pub mod lower;
pub mod parsers;
pub mod pipeline;
pub mod reconcile;
pub mod rules;
pub mod syntax;

pub use error::ExtractError;
pub use pipeline::{Extraction, RunMode, RunReport, extract, run};
