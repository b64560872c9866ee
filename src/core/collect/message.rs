use std::{cmp::Ordering, collections::BTreeSet, fmt};

use indexmap::IndexMap;

/// Identity of a message inside a [`MessageStore`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageKey {
    pub context: Option<String>,
    pub singular: String,
    pub plural_present: bool,
}

/// One occurrence of a message in the source.
///
/// Equality and ordering only consider `(path, line)`, with the path compared
/// case-insensitively, so re-adding an occurrence is a no-op.
#[derive(Debug, Clone)]
pub struct SourceReference {
    pub path: String,
    pub line: usize,
    /// Name of the rule that matched the site.
    pub rule: String,
    /// Extracted comments attached to the site.
    pub comments: Vec<String>,
}

impl SourceReference {
    pub fn new(path: impl Into<String>, line: usize, rule: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            line,
            rule: rule.into(),
            comments: Vec::new(),
        }
    }

    fn sort_key(&self) -> (String, usize) {
        (self.path.to_lowercase(), self.line)
    }
}

impl PartialEq for SourceReference {
    fn eq(&self, other: &Self) -> bool {
        self.sort_key() == other.sort_key()
    }
}

impl Eq for SourceReference {}

impl PartialOrd for SourceReference {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SourceReference {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl fmt::Display for SourceReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.path, self.line)
    }
}

/// A message extracted from the source. Created on first occurrence; later occurrences only
/// add references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatableMessage {
    pub context: Option<String>,
    pub singular: String,
    pub plural: Option<String>,
    pub references: BTreeSet<SourceReference>,
}

impl TranslatableMessage {
    pub fn key(&self) -> MessageKey {
        MessageKey {
            context: self.context.clone(),
            singular: self.singular.clone(),
            plural_present: self.plural.is_some(),
        }
    }

    /// References rendered as `path:line`, in reference order.
    pub fn reference_strings(&self) -> Vec<String> {
        self.references.iter().map(ToString::to_string).collect()
    }

    /// Comments of all references, in reference order, without repeats.
    pub fn extracted_comments(&self) -> Vec<String> {
        let mut comments: Vec<String> = Vec::new();
        for comment in self.references.iter().flat_map(|r| r.comments.iter()) {
            if !comments.contains(comment) {
                comments.push(comment.clone());
            }
        }
        comments
    }
}

/// Messages keyed by [`MessageKey`], in first-extraction order.
#[derive(Debug, Clone, Default)]
pub struct MessageStore {
    messages: IndexMap<MessageKey, TranslatableMessage>,
}

impl MessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert the message or add `reference` to the existing one.
    ///
    /// Returns true when a new message was created.
    pub fn upsert(
        &mut self,
        context: Option<String>,
        singular: String,
        plural: Option<String>,
        reference: SourceReference,
    ) -> bool {
        let key = MessageKey {
            context: context.clone(),
            singular: singular.clone(),
            plural_present: plural.is_some(),
        };

        match self.messages.get_mut(&key) {
            Some(existing) => {
                existing.references.insert(reference);
                false
            }
            None => {
                self.messages.insert(
                    key,
                    TranslatableMessage {
                        context,
                        singular,
                        plural,
                        references: BTreeSet::from([reference]),
                    },
                );
                true
            }
        }
    }

    pub fn get(&self, key: &MessageKey) -> Option<&TranslatableMessage> {
        self.messages.get(key)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TranslatableMessage> {
        self.messages.values()
    }

    pub fn into_messages(self) -> Vec<TranslatableMessage> {
        self.messages.into_values().collect()
    }
}
