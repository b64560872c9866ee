use anyhow::{Result, anyhow};
use std::sync::Arc;
use swc_common::{
    FileName, Globals, SourceMap,
    comments::{CommentKind, SingleThreadedComments},
};
use swc_ecma_ast::Module;
use swc_ecma_parser::{Parser, StringInput, Syntax, TsSyntax};

use crate::core::syntax::{LineComment, LineComments};

pub struct ParsedSource {
    pub module: Module,
    pub source_map: Arc<SourceMap>,
    pub comments: LineComments,
    pub lines: Vec<String>,
}

/// `.ts`, `.mts` and `.cts` files parse without JSX so `<T>expr` assertions stay valid.
fn syntax_for(file_path: &str) -> Syntax {
    let extension = file_path.rsplit_once('.').map(|(_, ext)| ext).unwrap_or("");
    Syntax::Typescript(TsSyntax {
        tsx: !matches!(extension, "ts" | "mts" | "cts"),
        decorators: true,
        ..Default::default()
    })
}

/// Parse JS/TS source code into an AST plus its `//` comment map.
///
/// Accepts a shared SourceMap for thread-safe parallel parsing.
pub fn parse_source(
    code: String,
    file_path: &str,
    source_map: Arc<SourceMap>,
) -> Result<ParsedSource> {
    use swc_common::GLOBALS;

    let lines: Vec<String> = code.lines().map(str::to_string).collect();

    // Wrap in GLOBALS.set() for thread safety
    GLOBALS.set(&Globals::new(), || {
        let source_file = source_map.new_source_file(FileName::Real(file_path.into()).into(), code);

        let comments = SingleThreadedComments::default();
        let mut parser = Parser::new(
            syntax_for(file_path),
            StringInput::from(&*source_file),
            Some(&comments),
        );

        let module = parser
            .parse_module()
            .map_err(|e| anyhow!("{:?}", e.kind()))?;

        // Collect line comments before SingleThreadedComments drops
        let mut line_comments = LineComments::new();
        let (leading, trailing) = comments.borrow_all();
        for comment in leading.values().chain(trailing.values()).flatten() {
            if !matches!(comment.kind, CommentKind::Line) {
                continue;
            }
            let loc = source_map.lookup_char_pos(comment.span.lo);
            let column = loc.col.0;
            let own_line = lines
                .get(loc.line - 1)
                .is_some_and(|line| line.chars().take(column).all(char::is_whitespace));
            line_comments.insert(
                loc.line,
                LineComment {
                    text: comment.text.trim().to_string(),
                    column,
                    own_line,
                },
            );
        }

        Ok(ParsedSource {
            module,
            source_map: source_map.clone(),
            comments: line_comments,
            lines,
        })
    })
}
