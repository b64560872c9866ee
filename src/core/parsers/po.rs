//! Gettext PO template reader and writer.
//!
//! The reader is a line-based state machine: comment lines and keyword lines accumulate
//! into the current entry, a blank line (or the start of the next entry) flushes it.
//! The first entry with an empty `msgid` and no `msgctxt` is the header.

use std::sync::LazyLock;

use regex::Regex;

use crate::core::catalog::{Catalog, CatalogEntry, CatalogError, Header};

static KEYWORD_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^(msgctxt|msgid_plural|msgid|msgstr)(?:\[(\d+)\])?\s+(".*)$"#).unwrap()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Context,
    Id,
    Plural,
    Str(usize),
    PreviousContext,
    PreviousId,
    PreviousPlural,
}

#[derive(Debug, Default)]
struct PendingEntry {
    entry: CatalogEntry,
    has_id: bool,
    has_str: bool,
    has_content: bool,
    last: Option<Field>,
}

impl PendingEntry {
    fn append(&mut self, field: Field, text: &str) {
        let entry = &mut self.entry;
        match field {
            Field::Context => entry.context.get_or_insert_default().push_str(text),
            Field::Id => entry.singular.push_str(text),
            Field::Plural => entry.plural.get_or_insert_default().push_str(text),
            Field::Str(index) => {
                if entry.translations.len() <= index {
                    entry.translations.resize(index + 1, String::new());
                }
                entry.translations[index].push_str(text);
            }
            Field::PreviousContext => entry.previous.context.get_or_insert_default().push_str(text),
            Field::PreviousId => entry.previous.singular.get_or_insert_default().push_str(text),
            Field::PreviousPlural => entry.previous.plural.get_or_insert_default().push_str(text),
        }
        self.last = Some(field);
        self.has_content = true;
    }

    fn finish(mut self) -> CatalogEntry {
        let forms = if self.entry.plural.is_some() { 2 } else { 1 };
        if self.entry.translations.len() < forms {
            self.entry.translations.resize(forms, String::new());
        }
        self.entry
    }
}

struct Reader {
    header: Option<Header>,
    entries: Vec<CatalogEntry>,
    pending: PendingEntry,
}

impl Reader {
    fn new() -> Self {
        Self {
            header: None,
            entries: Vec::new(),
            pending: PendingEntry::default(),
        }
    }

    fn flush(&mut self, line: usize) -> Result<(), CatalogError> {
        let pending = std::mem::take(&mut self.pending);
        if !pending.has_id {
            if pending.has_str {
                return Err(syntax(line, "msgstr without msgid"));
            }
            return Ok(());
        }

        let entry = pending.finish();
        if self.header.is_none()
            && !entry.obsolete
            && entry.context.is_none()
            && entry.singular.is_empty()
        {
            self.header = Some(parse_header(&entry));
        } else {
            self.entries.push(entry);
        }
        Ok(())
    }

    fn comment_line(&mut self, line_no: usize, line: &str) -> Result<(), CatalogError> {
        if self.pending.has_id {
            self.flush(line_no)?;
        }
        let pending = &mut self.pending;

        if let Some(rest) = line.strip_prefix("#.") {
            pending.entry.extracted_comments.push(strip_space(rest).to_string());
        } else if let Some(rest) = line.strip_prefix("#:") {
            pending
                .entry
                .references
                .extend(rest.split_whitespace().map(str::to_string));
        } else if let Some(rest) = line.strip_prefix("#,") {
            pending.entry.flags.extend(
                rest.split(',')
                    .map(str::trim)
                    .filter(|flag| !flag.is_empty())
                    .map(str::to_string),
            );
        } else if let Some(rest) = line.strip_prefix("#|") {
            return self.previous_line(line_no, rest.trim());
        } else if let Some(rest) = line.strip_prefix('#') {
            pending.entry.translator_comments.push(strip_space(rest).to_string());
        }
        pending.has_content = true;
        Ok(())
    }

    fn previous_line(&mut self, line_no: usize, rest: &str) -> Result<(), CatalogError> {
        let (field, quoted) = if let Some(quoted) = rest.strip_prefix("msgctxt ") {
            (Field::PreviousContext, quoted)
        } else if let Some(quoted) = rest.strip_prefix("msgid_plural ") {
            (Field::PreviousPlural, quoted)
        } else if let Some(quoted) = rest.strip_prefix("msgid ") {
            (Field::PreviousId, quoted)
        } else if rest.starts_with('"') {
            match self.pending.last {
                Some(
                    field @ (Field::PreviousContext | Field::PreviousId | Field::PreviousPlural),
                ) => (field, rest),
                _ => return Err(syntax(line_no, "continuation without a previous keyword")),
            }
        } else {
            return Err(syntax(line_no, format!("unexpected previous line `{}`", rest)));
        };
        let text = unquote(line_no, quoted)?;
        self.pending.append(field, &text);
        Ok(())
    }

    fn keyword_line(&mut self, line_no: usize, line: &str, obsolete: bool) -> Result<(), CatalogError> {
        if line.starts_with('"') {
            let Some(field) = self.pending.last else {
                return Err(syntax(line_no, "continuation without a keyword"));
            };
            let text = unquote(line_no, line)?;
            self.pending.append(field, &text);
            return Ok(());
        }

        let Some(caps) = KEYWORD_REGEX.captures(line) else {
            return Err(syntax(line_no, format!("unexpected line `{}`", line)));
        };
        let keyword = &caps[1];
        let index = caps.get(2).map(|m| m.as_str());
        let text = unquote(line_no, &caps[3])?;

        let field = match (keyword, index) {
            ("msgctxt", None) => Field::Context,
            ("msgid", None) => Field::Id,
            ("msgid_plural", None) => Field::Plural,
            ("msgstr", None) => Field::Str(0),
            ("msgstr", Some(index)) => Field::Str(
                index
                    .parse()
                    .map_err(|_| syntax(line_no, format!("invalid plural index `{}`", index)))?,
            ),
            _ => return Err(syntax(line_no, format!("unexpected index on `{}`", keyword))),
        };

        if matches!(field, Field::Context | Field::Id) && self.pending.has_str {
            self.flush(line_no)?;
        }
        if matches!(field, Field::Id) && self.pending.has_id {
            return Err(syntax(line_no, "duplicate msgid"));
        }
        if matches!(field, Field::Str(_)) && !self.pending.has_id {
            return Err(syntax(line_no, "msgstr without msgid"));
        }

        match field {
            Field::Id => self.pending.has_id = true,
            Field::Str(_) => self.pending.has_str = true,
            _ => {}
        }
        if obsolete {
            self.pending.entry.obsolete = true;
        }
        self.pending.append(field, &text);
        Ok(())
    }
}

fn syntax(line: usize, message: impl Into<String>) -> CatalogError {
    CatalogError::Syntax {
        line,
        message: message.into(),
    }
}

fn strip_space(text: &str) -> &str {
    text.strip_prefix(' ').unwrap_or(text)
}

fn parse_header(entry: &CatalogEntry) -> Header {
    let msgstr = entry.translations.first().map(String::as_str).unwrap_or("");
    let fields = msgstr
        .lines()
        .filter_map(|line| line.split_once(':'))
        .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
        .collect();
    Header {
        comments: entry.translator_comments.clone(),
        fields,
    }
}

/// Parse a catalog.
pub fn parse_catalog(content: &str) -> Result<Catalog, CatalogError> {
    let mut reader = Reader::new();
    let mut last_line = 0;

    for (index, raw) in content.lines().enumerate() {
        let line_no = index + 1;
        last_line = line_no;
        let line = raw.trim();

        if line.is_empty() {
            reader.flush(line_no)?;
        } else if let Some(rest) = line.strip_prefix("#~") {
            let rest = rest.trim_start();
            match rest.strip_prefix('|') {
                Some(previous) => {
                    if reader.pending.has_id {
                        reader.flush(line_no)?;
                    }
                    reader.previous_line(line_no, previous.trim())?;
                }
                None => reader.keyword_line(line_no, rest, true)?,
            }
        } else if line.starts_with('#') {
            reader.comment_line(line_no, line)?;
        } else {
            reader.keyword_line(line_no, line, false)?;
        }
    }
    reader.flush(last_line)?;

    Ok(Catalog {
        header: reader.header.unwrap_or_default(),
        entries: reader.entries,
    })
}

/// Remove the surrounding quotes and resolve C escapes in a single pass.
fn unquote(line: usize, quoted: &str) -> Result<String, CatalogError> {
    let quoted = quoted.trim();
    let inner = quoted
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .filter(|_| quoted.len() >= 2)
        .ok_or_else(|| syntax(line, format!("expected a quoted string, found `{}`", quoted)))?;

    let mut result = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => result.push('\n'),
            Some('t') => result.push('\t'),
            Some('r') => result.push('\r'),
            Some('"') => result.push('"'),
            Some('\\') => result.push('\\'),
            Some(other) => return Err(syntax(line, format!("unknown escape `\\{}`", other))),
            None => return Err(syntax(line, "dangling backslash")),
        }
    }
    Ok(result)
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + 2);
    for c in text.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\t' => escaped.push_str("\\t"),
            '\r' => escaped.push_str("\\r"),
            c => escaped.push(c),
        }
    }
    escaped
}

fn write_string(out: &mut String, prefix: &str, keyword: &str, value: &str) {
    let parts: Vec<&str> = value.split_inclusive('\n').collect();
    if parts.len() <= 1 {
        out.push_str(&format!("{}{} \"{}\"\n", prefix, keyword, escape(value)));
        return;
    }
    out.push_str(&format!("{}{} \"\"\n", prefix, keyword));
    for part in parts {
        out.push_str(&format!("{}\"{}\"\n", prefix, escape(part)));
    }
}

fn write_comment(out: &mut String, marker: &str, text: &str) {
    if text.is_empty() {
        out.push_str(&format!("{}\n", marker));
    } else {
        out.push_str(&format!("{} {}\n", marker, text));
    }
}

fn write_header(header: &Header) -> String {
    let mut out = String::new();
    for comment in &header.comments {
        write_comment(&mut out, "#", comment);
    }
    out.push_str("msgid \"\"\n");
    write_string(&mut out, "", "msgstr", &header.to_msgstr());
    out
}

fn write_entry(entry: &CatalogEntry) -> String {
    let mut out = String::new();
    for comment in &entry.translator_comments {
        write_comment(&mut out, "#", comment);
    }
    for comment in &entry.extracted_comments {
        write_comment(&mut out, "#.", comment);
    }
    for reference in &entry.references {
        out.push_str(&format!("#: {}\n", reference));
    }
    if !entry.flags.is_empty() {
        out.push_str(&format!("#, {}\n", entry.flags.join(", ")));
    }

    let (keyword_prefix, previous_prefix) = if entry.obsolete {
        ("#~ ", "#~| ")
    } else {
        ("", "#| ")
    };
    if let Some(context) = &entry.previous.context {
        write_string(&mut out, previous_prefix, "msgctxt", context);
    }
    if let Some(singular) = &entry.previous.singular {
        write_string(&mut out, previous_prefix, "msgid", singular);
    }
    if let Some(plural) = &entry.previous.plural {
        write_string(&mut out, previous_prefix, "msgid_plural", plural);
    }

    if let Some(context) = &entry.context {
        write_string(&mut out, keyword_prefix, "msgctxt", context);
    }
    write_string(&mut out, keyword_prefix, "msgid", &entry.singular);
    match &entry.plural {
        Some(plural) => {
            write_string(&mut out, keyword_prefix, "msgid_plural", plural);
            for (index, translation) in entry.translations.iter().enumerate() {
                write_string(
                    &mut out,
                    keyword_prefix,
                    &format!("msgstr[{}]", index),
                    translation,
                );
            }
        }
        None => {
            let translation = entry.translations.first().map(String::as_str).unwrap_or("");
            write_string(&mut out, keyword_prefix, "msgstr", translation);
        }
    }
    out
}

/// Render a catalog. Blocks are separated by one blank line.
pub fn write_catalog(header: &Header, entries: &[CatalogEntry]) -> String {
    let mut blocks = Vec::with_capacity(entries.len() + 1);
    if !header.is_empty() {
        blocks.push(write_header(header));
    }
    blocks.extend(entries.iter().map(write_entry));
    blocks.join("\n")
}

#[cfg(test)]
mod tests {
    use insta::assert_snapshot;
    use pretty_assertions::assert_eq;

    use crate::core::catalog::{CatalogEntry, CatalogError, Header, PreviousId};
    use crate::core::parsers::po::*;

    #[test]
    fn test_parse_entries_and_comments() {
        let content = r#"# Project header
msgid ""
msgstr ""
"Project-Id-Version: demo\n"
"Content-Type: text/plain; charset=UTF-8\n"

# reviewed
#. Toolbar button
#: src/app.ts:3 src/menu.ts:10
#, fuzzy, c-format
msgctxt "menu"
msgid "Save"
msgstr "Enregistrer"

msgid "file"
msgid_plural "files"
msgstr[0] "fichier"
msgstr[1] "fichiers"
"#;
        let catalog = parse_catalog(content).unwrap();

        assert_eq!(catalog.header.comments, vec!["Project header"]);
        assert_eq!(
            catalog.header.fields.get("Project-Id-Version").map(String::as_str),
            Some("demo")
        );
        assert_eq!(catalog.entries.len(), 2);

        let save = &catalog.entries[0];
        assert_eq!(save.context.as_deref(), Some("menu"));
        assert_eq!(save.singular, "Save");
        assert_eq!(save.translations, vec!["Enregistrer"]);
        assert_eq!(save.translator_comments, vec!["reviewed"]);
        assert_eq!(save.extracted_comments, vec!["Toolbar button"]);
        assert_eq!(save.references, vec!["src/app.ts:3", "src/menu.ts:10"]);
        assert_eq!(save.flags, vec!["fuzzy", "c-format"]);

        let file = &catalog.entries[1];
        assert_eq!(file.plural.as_deref(), Some("files"));
        assert_eq!(file.translations, vec!["fichier", "fichiers"]);
    }

    #[test]
    fn test_parse_previous_and_obsolete() {
        let content = r#"#| msgid "Open"
msgid "Open file"
msgstr ""

#: src/old.ts:1
#~| msgid "Gone"
#~ msgid "Removed"
#~ msgstr "Supprimé"
"#;
        let catalog = parse_catalog(content).unwrap();
        assert_eq!(
            catalog.entries[0].previous,
            PreviousId {
                singular: Some("Open".to_string()),
                ..Default::default()
            }
        );
        assert!(!catalog.entries[0].obsolete);

        let removed = &catalog.entries[1];
        assert!(removed.obsolete);
        assert_eq!(removed.singular, "Removed");
        assert_eq!(removed.references, vec!["src/old.ts:1"]);
        assert_eq!(removed.previous.singular.as_deref(), Some("Gone"));
    }

    #[test]
    fn test_parse_escapes_and_continuations() {
        let content = "msgid \"\"\n\"Line one\\n\"\n\"say \\\"hi\\\" \\\\ done\"\nmsgstr \"\"\n";
        let catalog = parse_catalog(content).unwrap();
        assert_eq!(catalog.entries[0].singular, "Line one\nsay \"hi\" \\ done");
    }

    #[test]
    fn test_unknown_escape_is_an_error() {
        let err = parse_catalog("msgid \"bad \\q\"\nmsgstr \"\"\n").unwrap_err();
        assert!(matches!(err, CatalogError::Syntax { line: 1, .. }));
    }

    #[test]
    fn test_unexpected_line_is_an_error() {
        let err = parse_catalog("msgid \"ok\"\nmsgstr \"\"\nnonsense\n").unwrap_err();
        assert!(matches!(err, CatalogError::Syntax { line: 3, .. }));
    }

    #[test]
    fn test_msgstr_without_msgid_is_an_error() {
        assert!(parse_catalog("msgstr \"orphan\"\n").is_err());
    }

    #[test]
    fn test_write_catalog() {
        let mut header = Header::default();
        header.comments.push("Demo catalog".to_string());
        header
            .fields
            .insert("Project-Id-Version".to_string(), "demo".to_string());
        header.fields.insert(
            "Content-Type".to_string(),
            "text/plain; charset=UTF-8".to_string(),
        );

        let mut save = CatalogEntry::new(Some("menu".to_string()), "Save".to_string(), None);
        save.extracted_comments.push("Toolbar button".to_string());
        save.references = vec!["src/app.ts:3".to_string(), "src/menu.ts:10".to_string()];
        save.translations = vec!["Enregistrer".to_string()];

        let mut files = CatalogEntry::new(
            None,
            "One file".to_string(),
            Some("Many files".to_string()),
        );
        files.previous.singular = Some("A file".to_string());

        let mut gone = CatalogEntry::new(None, "Line one\nLine two".to_string(), None);
        gone.obsolete = true;

        assert_snapshot!(write_catalog(&header, &[save, files, gone]), @r#"
        # Demo catalog
        msgid ""
        msgstr ""
        "Project-Id-Version: demo\n"
        "Content-Type: text/plain; charset=UTF-8\n"

        #. Toolbar button
        #: src/app.ts:3
        #: src/menu.ts:10
        msgctxt "menu"
        msgid "Save"
        msgstr "Enregistrer"

        #| msgid "A file"
        msgid "One file"
        msgid_plural "Many files"
        msgstr[0] ""
        msgstr[1] ""

        #~ msgid ""
        #~ "Line one\n"
        #~ "Line two"
        #~ msgstr ""
        "#);
    }

    #[test]
    fn test_written_catalog_reads_back() {
        let mut header = Header::default();
        header
            .fields
            .insert("MIME-Version".to_string(), "1.0".to_string());

        let mut entry = CatalogEntry::new(
            Some("a \"quoted\" context".to_string()),
            "tab\there".to_string(),
            Some("plural\n".to_string()),
        );
        entry.translator_comments = vec![String::new(), "second".to_string()];
        entry.flags = vec!["fuzzy".to_string()];
        entry.previous = PreviousId {
            context: Some("old".to_string()),
            singular: Some("before\nafter".to_string()),
            plural: None,
        };
        let mut obsolete = CatalogEntry::new(None, "stale".to_string(), None);
        obsolete.obsolete = true;
        obsolete.previous.singular = Some("older".to_string());
        let entries = vec![entry, obsolete];

        let written = write_catalog(&header, &entries);
        let read = parse_catalog(&written).unwrap();
        assert_eq!(read.header, header);
        assert_eq!(read.entries, entries);
    }
}
