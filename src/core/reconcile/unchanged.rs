use crate::core::{
    catalog::{Catalog, CatalogEntry, Header},
    reconcile::header::HeaderTemplate,
};

/// References in order with repeats removed.
fn dedup_references(references: &[String]) -> Vec<&str> {
    let mut seen: Vec<&str> = Vec::new();
    for reference in references {
        if !seen.contains(&reference.as_str()) {
            seen.push(reference);
        }
    }
    seen
}

fn same_entry(old: &CatalogEntry, new: &CatalogEntry) -> bool {
    old.context == new.context
        && old.singular == new.singular
        && old.plural == new.plural
        && old.obsolete == new.obsolete
        && old.previous == new.previous
        && old.translations == new.translations
        && dedup_references(&old.references) == dedup_references(&new.references)
        && old.extracted_comments == new.extracted_comments
}

fn same_header(old: &Header, new: &Header, template: &HeaderTemplate) -> bool {
    let fixed = |header: &Header| -> Vec<(String, String)> {
        header
            .fields
            .iter()
            .filter(|(key, _)| !template.is_variable(key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    };
    old.comments == new.comments && fixed(old) == fixed(new)
}

/// Whether writing `merged` over `legacy` would only change variable header fields.
pub fn is_unchanged(
    legacy: &Catalog,
    header: &Header,
    entries: &[CatalogEntry],
    template: &HeaderTemplate,
) -> bool {
    same_header(&legacy.header, header, template)
        && legacy.entries.len() == entries.len()
        && legacy
            .entries
            .iter()
            .zip(entries)
            .all(|(old, new)| same_entry(old, new))
}
