//! glotpo - gettext message extraction for JavaScript and TypeScript
//!
//! glotpo finds calls, constructions and decorators that match configured extraction
//! rules, folds their message arguments to literal strings, and reconciles the result
//! with a committed `.pot` catalog: renamed messages keep their history, vanished ones
//! become obsolete, and an unchanged catalog is never rewritten.
//!
//! ## Module Structure
//!
//! - `cli`: Command-line interface (`extract`, `check`, `init`)
//! - `config`: `.glotporc.json` loading and validation
//! - `core`: Extraction engine and catalog reconciliation
//! - `issues`: Recoverable problems and their report view

pub mod cli;
pub mod config;
pub mod core;
pub mod issues;
