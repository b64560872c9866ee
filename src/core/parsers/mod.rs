//! File parsers for source code and catalog files.
//!
//! This module provides parsers for different file types:
//! - `po`: gettext PO template reader and writer
//! - `source`: JS/TS/JSX/TSX source file parser (uses swc for AST generation)

pub mod po;
pub mod source;
