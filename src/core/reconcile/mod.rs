//! Catalog reconciliation: merge freshly extracted messages into the committed catalog.
//!
//! ## Module Structure
//!
//! - `header`: header template and defaults
//! - `previous`: previous-identity lineage of renamed messages
//! - `unchanged`: no-op detection before writing

pub mod header;
pub mod previous;
pub mod unchanged;

use std::collections::HashSet;

use chrono::Local;

pub use header::HeaderTemplate;

use crate::core::{
    catalog::{Catalog, CatalogEntry, Header, LegacyEntry, PreviousId},
    collect::{MessageStore, TranslatableMessage},
};

#[derive(Debug, Clone, Default)]
pub struct ReconcileOptions {
    /// Drop legacy entries no longer extracted instead of marking them obsolete.
    pub remove_unused: bool,
    /// Write a catalog even when no message was extracted.
    pub create_empty_template: bool,
    pub header: HeaderTemplate,
}

/// What happens to the catalog file at the end of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogOutcome {
    Written,
    UnchangedSkipped,
    EmptySkipped,
}

impl CatalogOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            CatalogOutcome::Written => "written",
            CatalogOutcome::UnchangedSkipped => "unchanged",
            CatalogOutcome::EmptySkipped => "empty",
        }
    }
}

#[derive(Debug, Clone)]
pub struct MergedCatalog {
    pub header: Header,
    /// Legacy-derived entries in their original order, then new entries in extraction order.
    pub entries: Vec<CatalogEntry>,
    /// False when writing would only refresh variable header fields.
    pub changed: bool,
}

impl MergedCatalog {
    pub fn to_catalog(&self) -> Catalog {
        Catalog {
            header: self.header.clone(),
            entries: self.entries.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    pub kept: usize,
    pub renamed: usize,
    pub added: usize,
    pub obsoleted: usize,
    pub removed: usize,
}

#[derive(Debug, Clone)]
pub struct Reconciled {
    pub catalog: MergedCatalog,
    pub stats: ReconcileStats,
    pub outcome: CatalogOutcome,
}

/// Fill the source-derived fields of an entry from a fresh message.
fn refresh(entry: &mut CatalogEntry, message: &TranslatableMessage) {
    entry.plural = message.plural.clone();
    entry.references = message.reference_strings();
    entry.extracted_comments = message.extracted_comments();
    entry.obsolete = false;
}

/// Pick the legacy entry a message was most likely renamed from.
///
/// Candidates are live legacy entries sharing a raw `path:line` reference with the message.
/// Each preference narrows the candidates only when some remain; ties go to the lowest
/// ordinal.
fn rename_candidate<'a>(
    legacy: &'a [LegacyEntry],
    exact_matched: &HashSet<usize>,
    message: &TranslatableMessage,
) -> Option<&'a LegacyEntry> {
    let references = message.reference_strings();
    let mut candidates: Vec<&LegacyEntry> = legacy
        .iter()
        .enumerate()
        .filter(|(ordinal, _)| !exact_matched.contains(ordinal))
        .map(|(_, entry)| entry)
        .filter(|entry| !entry.obsolete)
        .filter(|entry| entry.references.iter().any(|r| references.contains(r)))
        .collect();

    let mut prefer = |keep: &dyn Fn(&LegacyEntry) -> bool| {
        if candidates.iter().any(|entry| keep(*entry)) {
            candidates.retain(|entry| keep(*entry));
        }
    };
    prefer(&|entry: &LegacyEntry| entry.plural.is_some() == message.plural.is_some());
    if message.plural.is_some() {
        prefer(&|entry: &LegacyEntry| entry.plural == message.plural);
    }
    prefer(&|entry: &LegacyEntry| entry.context.is_some() == message.context.is_some());

    candidates.first().copied()
}

/// Merge `store` into the `legacy` catalog.
pub fn reconcile(
    legacy: Option<Catalog>,
    store: MessageStore,
    options: &ReconcileOptions,
) -> Reconciled {
    let header = options
        .header
        .build(legacy.as_ref().map(|catalog| &catalog.header), Local::now());
    let legacy_entries: &[LegacyEntry] = legacy
        .as_ref()
        .map(|catalog| catalog.entries.as_slice())
        .unwrap_or_default();

    let messages = store.into_messages();
    let exact: Vec<Option<usize>> = messages
        .iter()
        .map(|message| {
            let key = message.key();
            legacy_entries
                .iter()
                .position(|entry| entry.matches_key(&key))
        })
        .collect();
    let exact_matched: HashSet<usize> = exact.iter().flatten().copied().collect();

    let mut stats = ReconcileStats::default();
    let mut merged: Vec<Option<CatalogEntry>> = vec![None; legacy_entries.len()];
    let mut appended = Vec::new();

    for (message, exact) in messages.iter().zip(exact) {
        if let Some(ordinal) = exact {
            let mut entry = legacy_entries[ordinal].clone();
            refresh(&mut entry, message);
            merged[ordinal] = Some(entry);
            stats.kept += 1;
            continue;
        }

        let mut entry = CatalogEntry::new(
            message.context.clone(),
            message.singular.clone(),
            message.plural.clone(),
        );
        refresh(&mut entry, message);
        if let Some(candidate) = rename_candidate(legacy_entries, &exact_matched, message) {
            entry.previous = PreviousId::derive(candidate, message);
            tracing::debug!(
                from = %candidate.singular,
                to = %message.singular,
                "message renamed"
            );
            stats.renamed += 1;
        } else {
            stats.added += 1;
        }
        appended.push(entry);
    }

    let mut entries = Vec::with_capacity(legacy_entries.len() + appended.len());
    for (slot, legacy_entry) in merged.into_iter().zip(legacy_entries) {
        match slot {
            Some(entry) => entries.push(entry),
            None if options.remove_unused => stats.removed += 1,
            None => {
                if !legacy_entry.obsolete {
                    tracing::info!(
                        msgid = %legacy_entry.singular,
                        "message no longer extracted, marked obsolete"
                    );
                    stats.obsoleted += 1;
                }
                let mut entry = legacy_entry.clone();
                entry.obsolete = true;
                entries.push(entry);
            }
        }
    }
    entries.extend(appended);

    let changed = match &legacy {
        Some(legacy) => !unchanged::is_unchanged(legacy, &header, &entries, &options.header),
        None => true,
    };
    let outcome = if entries.is_empty() && !options.create_empty_template {
        CatalogOutcome::EmptySkipped
    } else if !changed {
        CatalogOutcome::UnchangedSkipped
    } else {
        CatalogOutcome::Written
    };

    Reconciled {
        catalog: MergedCatalog {
            header,
            entries,
            changed,
        },
        stats,
        outcome,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::core::collect::SourceReference;
    use crate::core::parsers::po::{parse_catalog, write_catalog};
    use crate::core::reconcile::*;

    fn store(messages: &[(Option<&str>, &str, Option<&str>, &str, usize)]) -> MessageStore {
        let mut store = MessageStore::new();
        for (context, singular, plural, path, line) in messages {
            store.upsert(
                context.map(str::to_string),
                singular.to_string(),
                plural.map(str::to_string),
                SourceReference::new(*path, *line, "tr"),
            );
        }
        store
    }

    fn legacy(entries: &[(&str, &str, &str)]) -> Catalog {
        Catalog {
            header: Header::default(),
            entries: entries
                .iter()
                .map(|(singular, reference, translation)| {
                    let mut entry = CatalogEntry::new(None, singular.to_string(), None);
                    entry.references = vec![reference.to_string()];
                    entry.translations = vec![translation.to_string()];
                    entry
                })
                .collect(),
        }
    }

    fn singulars(reconciled: &Reconciled) -> Vec<(&str, bool)> {
        reconciled
            .catalog
            .entries
            .iter()
            .map(|entry| (entry.singular.as_str(), entry.obsolete))
            .collect()
    }

    #[test]
    fn test_exact_match_keeps_translation_and_position() {
        let old = legacy(&[("Open", "a.ts:1", "Öffnen"), ("Save", "a.ts:2", "Speichern")]);
        let fresh = store(&[
            (None, "Save", None, "a.ts", 7),
            (None, "Open", None, "b.ts", 3),
        ]);
        let reconciled = reconcile(Some(old), fresh, &ReconcileOptions::default());

        assert_eq!(singulars(&reconciled), vec![("Open", false), ("Save", false)]);
        let open = &reconciled.catalog.entries[0];
        assert_eq!(open.translations, vec!["Öffnen"]);
        assert_eq!(open.references, vec!["b.ts:3"]);
        assert_eq!(reconciled.stats.kept, 2);
        assert_eq!(reconciled.outcome, CatalogOutcome::Written);
    }

    #[test]
    fn test_rename_lineage_marks_the_old_entry_obsolete() {
        let old = legacy(&[("Old Name", "x.src:5", "Alter Name")]);
        let fresh = store(&[(None, "New Name", None, "x.src", 5)]);
        let reconciled = reconcile(Some(old), fresh, &ReconcileOptions::default());

        assert_eq!(
            singulars(&reconciled),
            vec![("Old Name", true), ("New Name", false)]
        );
        let renamed = &reconciled.catalog.entries[1];
        assert_eq!(renamed.previous.singular.as_deref(), Some("Old Name"));
        assert_eq!(renamed.translations, vec![""]);
        assert_eq!(
            reconciled.stats,
            ReconcileStats {
                renamed: 1,
                obsoleted: 1,
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_rename_lineage_with_remove_unused() {
        let old = legacy(&[("Old Name", "x.src:5", "Alter Name")]);
        let fresh = store(&[(None, "New Name", None, "x.src", 5)]);
        let options = ReconcileOptions {
            remove_unused: true,
            ..Default::default()
        };
        let reconciled = reconcile(Some(old), fresh, &options);

        assert_eq!(singulars(&reconciled), vec![("New Name", false)]);
        assert_eq!(
            reconciled.catalog.entries[0].previous.singular.as_deref(),
            Some("Old Name")
        );
        assert_eq!(reconciled.stats.removed, 1);
    }

    #[test]
    fn test_second_rename_records_the_latest_name() {
        let round_trip = |reconciled: Reconciled| {
            let written = write_catalog(&reconciled.catalog.header, &reconciled.catalog.entries);
            parse_catalog(&written).unwrap()
        };
        let options = ReconcileOptions::default();

        let old = legacy(&[("A", "x.src:5", "")]);
        let first = reconcile(Some(old), store(&[(None, "B", None, "x.src", 5)]), &options);
        let second = reconcile(
            Some(round_trip(first)),
            store(&[(None, "C", None, "x.src", 5)]),
            &options,
        );

        assert_eq!(
            singulars(&second),
            vec![("A", true), ("B", true), ("C", false)]
        );
        let renamed = &second.catalog.entries[2];
        assert_eq!(renamed.previous.singular.as_deref(), Some("B"));
        assert_eq!(second.stats.renamed, 1);
        assert_eq!(second.stats.obsoleted, 1);
    }

    #[test]
    fn test_rename_candidate_prefers_plural_state_then_lowest_ordinal() {
        let mut old = legacy(&[("one", "a.ts:1", ""), ("two", "a.ts:1", "")]);
        let mut plural = CatalogEntry::new(None, "file".to_string(), Some("files".to_string()));
        plural.references = vec!["a.ts:1".to_string()];
        old.entries.push(plural);

        let fresh = store(&[
            (None, "one file", Some("many files"), "a.ts", 1),
            (None, "three", None, "a.ts", 1),
        ]);
        let reconciled = reconcile(Some(old), fresh, &ReconcileOptions::default());
        let entries = &reconciled.catalog.entries;

        assert_eq!(entries[3].singular, "one file");
        assert_eq!(entries[3].previous.singular.as_deref(), Some("file"));
        assert_eq!(entries[3].previous.plural.as_deref(), Some("files"));
        assert_eq!(entries[4].singular, "three");
        assert_eq!(entries[4].previous.singular.as_deref(), Some("one"));
    }

    #[test]
    fn test_exact_matched_entries_are_not_rename_candidates() {
        let old = legacy(&[("Save", "a.ts:1", "Speichern")]);
        let fresh = store(&[
            (None, "Save", None, "a.ts", 1),
            (None, "Cancel", None, "a.ts", 1),
        ]);
        let reconciled = reconcile(Some(old), fresh, &ReconcileOptions::default());

        assert!(reconciled.catalog.entries[1].previous.is_empty());
        assert_eq!(reconciled.stats.added, 1);
    }

    #[test]
    fn test_reextraction_is_a_no_op() {
        let fresh = || {
            store(&[
                (Some("menu"), "Open", None, "src/app.ts", 3),
                (None, "file", Some("files"), "src/app.ts", 9),
            ])
        };
        let first = reconcile(None, fresh(), &ReconcileOptions::default());
        assert_eq!(first.outcome, CatalogOutcome::Written);

        let written = write_catalog(&first.catalog.header, &first.catalog.entries);
        let read = parse_catalog(&written).unwrap();
        let second = reconcile(Some(read), fresh(), &ReconcileOptions::default());

        assert!(!second.catalog.changed);
        assert_eq!(second.outcome, CatalogOutcome::UnchangedSkipped);
    }

    #[test]
    fn test_empty_store() {
        let skipped = reconcile(None, MessageStore::new(), &ReconcileOptions::default());
        assert_eq!(skipped.outcome, CatalogOutcome::EmptySkipped);

        let options = ReconcileOptions {
            create_empty_template: true,
            ..Default::default()
        };
        let written = reconcile(None, MessageStore::new(), &options);
        assert_eq!(written.outcome, CatalogOutcome::Written);
        assert!(written.catalog.header.fields.contains_key("Content-Type"));
    }
}
