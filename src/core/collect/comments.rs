//! Extracted-comment lookup for a site.
//!
//! A `//` comment to the right of the construct on its last line wins. Otherwise the block of
//! own-line `//` comments directly above the construct is used, read bottom-up until the
//! first line that is not a matching comment, and returned top-down.

use crate::core::syntax::{LineComments, Position};

pub fn comments_for(
    comments: &LineComments,
    position: Position,
    comment_tag: Option<&str>,
) -> Vec<String> {
    let matches = |text: &str| comment_tag.is_none_or(|tag| text.starts_with(tag));

    if let Some(trailing) = comments.get(&position.end_line)
        && !trailing.own_line
        && trailing.column >= position.end_column
        && matches(&trailing.text)
    {
        return vec![trailing.text.clone()];
    }

    let mut above = Vec::new();
    let mut line = position.line;
    while line > 1 {
        line -= 1;
        match comments.get(&line) {
            Some(comment) if comment.own_line && matches(&comment.text) => {
                above.push(comment.text.clone());
            }
            _ => break,
        }
    }
    above.reverse();
    above
}
