use chrono::{DateTime, Local};
use indexmap::IndexMap;

use crate::core::catalog::Header;

pub const CREATION_DATE_FIELD: &str = "POT-Creation-Date";
const DATE_FORMAT: &str = "%Y-%m-%d %H:%M%z";

/// Header fields written into every new catalog before configured fields apply.
const DEFAULT_FIELDS: &[(&str, &str)] = &[
    ("Project-Id-Version", "PACKAGE VERSION"),
    ("MIME-Version", "1.0"),
    ("Content-Type", "text/plain; charset=UTF-8"),
    ("Content-Transfer-Encoding", "8bit"),
];

/// Configured header of the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderTemplate {
    pub comments: Vec<String>,
    pub fields: IndexMap<String, String>,
    /// Fields regenerated on every run and ignored when comparing catalogs.
    pub variable_fields: Vec<String>,
}

impl Default for HeaderTemplate {
    fn default() -> Self {
        Self {
            comments: Vec::new(),
            fields: IndexMap::new(),
            variable_fields: vec![CREATION_DATE_FIELD.to_string()],
        }
    }
}

impl HeaderTemplate {
    pub fn is_variable(&self, field: &str) -> bool {
        self.variable_fields.iter().any(|f| f == field)
    }

    /// Header of the merged catalog.
    ///
    /// An existing header keeps its comments and fields. Configured comments (when any) and
    /// configured fields override them, and the creation date is refreshed.
    pub fn build(&self, existing: Option<&Header>, now: DateTime<Local>) -> Header {
        let mut header = match existing {
            Some(existing) if !existing.is_empty() => existing.clone(),
            _ => {
                let mut fields = IndexMap::new();
                for (key, value) in DEFAULT_FIELDS {
                    fields.insert(key.to_string(), value.to_string());
                }
                Header {
                    comments: Vec::new(),
                    fields,
                }
            }
        };

        if !self.comments.is_empty() {
            header.comments = self.comments.clone();
        }
        for (key, value) in &self.fields {
            header.fields.insert(key.clone(), value.clone());
        }
        header.fields.insert(
            CREATION_DATE_FIELD.to_string(),
            now.format(DATE_FORMAT).to_string(),
        );
        header
    }
}
