//! Recoverable problems found during extraction.
//!
//! None of these stop a run: the offending occurrence (or file) is skipped, the issue is
//! logged and collected, and the CLI reports it cargo-style at the end.

use enum_dispatch::enum_dispatch;

// ============================================================
// Severity and Kind
// ============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum IssueKind {
    EvaluationFailed,
    EmptyMessage,
    UnresolvedTagField,
    ParseError,
}

impl std::fmt::Display for IssueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IssueKind::EvaluationFailed => write!(f, "evaluation-failed"),
            IssueKind::EmptyMessage => write!(f, "empty-message"),
            IssueKind::UnresolvedTagField => write!(f, "unresolved-tag-field"),
            IssueKind::ParseError => write!(f, "parse-error"),
        }
    }
}

// ============================================================
// Source Context
// ============================================================

/// Where in the source an issue was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceContext {
    pub file_path: String,
    /// 1-based line.
    pub line: usize,
    /// 1-based column.
    pub col: usize,
    /// The full source line, for context display.
    pub source_line: String,
}

impl SourceContext {
    pub fn new(
        file_path: impl Into<String>,
        line: usize,
        col: usize,
        source_line: impl Into<String>,
    ) -> Self {
        Self {
            file_path: file_path.into(),
            line,
            col,
            source_line: source_line.into(),
        }
    }
}

// ============================================================
// Issue Types
// ============================================================

/// A message argument that could not be folded to literal strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationFailedIssue {
    pub context: SourceContext,
    /// Name of the matching extraction rule.
    pub rule: String,
    pub expression: String,
    pub reason: String,
}

/// A message that folded to the empty string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmptyMessageIssue {
    pub context: SourceContext,
    pub rule: String,
}

/// A decorator field that could not be folded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedTagFieldIssue {
    pub context: SourceContext,
    pub rule: String,
    pub field: String,
    pub expression: String,
    pub reason: String,
}

/// File could not be read or parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseErrorIssue {
    pub file_path: String,
    pub error: String,
}

// ============================================================
// Issue Enum
// ============================================================

#[enum_dispatch(Report)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Issue {
    EvaluationFailed(EvaluationFailedIssue),
    EmptyMessage(EmptyMessageIssue),
    UnresolvedTagField(UnresolvedTagFieldIssue),
    ParseError(ParseErrorIssue),
}

impl Issue {
    pub fn severity(&self) -> Severity {
        self.report_severity()
    }

    pub fn kind(&self) -> IssueKind {
        self.report_kind()
    }
}

// ============================================================
// Report Trait (for CLI output)
// ============================================================

pub enum ReportLocation<'a> {
    Source(&'a SourceContext),
    /// File-level only (no line context).
    File { path: &'a str },
}

/// Uniform view of an issue for the reporter.
#[enum_dispatch]
pub trait Report {
    fn location(&self) -> ReportLocation<'_>;

    /// Primary message to display.
    fn message(&self) -> String;

    fn report_severity(&self) -> Severity {
        Severity::Warning
    }

    fn report_kind(&self) -> IssueKind;

    /// Optional details for the "= note:" line.
    fn details(&self) -> Option<String> {
        None
    }

    fn hint(&self) -> Option<&str> {
        None
    }
}

impl Report for EvaluationFailedIssue {
    fn location(&self) -> ReportLocation<'_> {
        ReportLocation::Source(&self.context)
    }

    fn message(&self) -> String {
        self.expression.clone()
    }

    fn report_kind(&self) -> IssueKind {
        IssueKind::EvaluationFailed
    }

    fn details(&self) -> Option<String> {
        Some(format!("{} (rule '{}')", self.reason, self.rule))
    }

    fn hint(&self) -> Option<&str> {
        Some("messages must be literals, constants or concatenations of them")
    }
}

impl Report for EmptyMessageIssue {
    fn location(&self) -> ReportLocation<'_> {
        ReportLocation::Source(&self.context)
    }

    fn message(&self) -> String {
        String::new()
    }

    fn report_kind(&self) -> IssueKind {
        IssueKind::EmptyMessage
    }

    fn details(&self) -> Option<String> {
        Some(format!("empty message skipped (rule '{}')", self.rule))
    }
}

impl Report for UnresolvedTagFieldIssue {
    fn location(&self) -> ReportLocation<'_> {
        ReportLocation::Source(&self.context)
    }

    fn message(&self) -> String {
        self.expression.clone()
    }

    fn report_kind(&self) -> IssueKind {
        IssueKind::UnresolvedTagField
    }

    fn details(&self) -> Option<String> {
        Some(format!(
            "field '{}' of '{}': {}",
            self.field, self.rule, self.reason
        ))
    }
}

impl Report for ParseErrorIssue {
    fn location(&self) -> ReportLocation<'_> {
        ReportLocation::File {
            path: &self.file_path,
        }
    }

    fn message(&self) -> String {
        self.error.clone()
    }

    fn report_severity(&self) -> Severity {
        Severity::Error
    }

    fn report_kind(&self) -> IssueKind {
        IssueKind::ParseError
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::issues::*;

    #[test]
    fn test_dispatch_through_enum() {
        let issue = Issue::EvaluationFailed(EvaluationFailedIssue {
            context: SourceContext::new("src/a.ts", 3, 5, "t.tr(name)"),
            rule: "tr".to_string(),
            expression: "name".to_string(),
            reason: "name cannot be evaluated".to_string(),
        });

        assert_eq!(issue.severity(), Severity::Warning);
        assert_eq!(issue.kind().to_string(), "evaluation-failed");
        assert_eq!(issue.message(), "name");
        assert_eq!(
            issue.details().as_deref(),
            Some("name cannot be evaluated (rule 'tr')")
        );
    }

    #[test]
    fn test_parse_error_is_an_error() {
        let issue = Issue::ParseError(ParseErrorIssue {
            file_path: "src/broken.ts".to_string(),
            error: "unexpected token".to_string(),
        });
        assert_eq!(issue.severity(), Severity::Error);
        assert!(matches!(
            issue.location(),
            ReportLocation::File { path: "src/broken.ts" }
        ));
    }
}
