use thiserror::Error;

use crate::core::rules::RuleError;

/// Errors that abort an extraction run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("no extraction rules configured")]
    EmptyRegistry,

    #[error("rule #{index} ('{name}') is invalid: {reason}")]
    InvalidRule {
        index: usize,
        name: String,
        reason: RuleError,
    },

    #[error(
        "{path}:{line}: plural rule '{rule}' needs exactly one singular and one plural value, \
         found {singular} singular and {plural} plural candidates"
    )]
    AmbiguousPlural {
        path: String,
        line: usize,
        rule: String,
        singular: usize,
        plural: usize,
    },
}
