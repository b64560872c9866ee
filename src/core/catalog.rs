//! The persisted message catalog (a gettext PO template) and its atomic commit.

use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use indexmap::IndexMap;
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::core::{
    collect::MessageKey,
    parsers::po::{parse_catalog, write_catalog},
};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl CatalogError {
    fn io(path: &Path, source: io::Error) -> Self {
        CatalogError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Identity an entry had before it was renamed (`#|` lines).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreviousId {
    pub context: Option<String>,
    pub singular: Option<String>,
    pub plural: Option<String>,
}

impl PreviousId {
    pub fn is_empty(&self) -> bool {
        self.context.is_none() && self.singular.is_none() && self.plural.is_none()
    }
}

/// The header entry: `#` comment lines and `Key: Value` fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Header {
    pub comments: Vec<String>,
    pub fields: IndexMap<String, String>,
}

impl Header {
    pub fn is_empty(&self) -> bool {
        self.comments.is_empty() && self.fields.is_empty()
    }

    /// Header fields serialized as a `msgstr` value.
    pub fn to_msgstr(&self) -> String {
        self.fields
            .iter()
            .map(|(key, value)| format!("{}: {}\n", key, value))
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogEntry {
    pub context: Option<String>,
    pub singular: String,
    pub plural: Option<String>,
    /// One `msgstr` per plural form; a single element for non-plural entries.
    pub translations: Vec<String>,
    pub translator_comments: Vec<String>,
    pub extracted_comments: Vec<String>,
    /// Raw `path:line` references as written in the file.
    pub references: Vec<String>,
    pub flags: Vec<String>,
    pub previous: PreviousId,
    pub obsolete: bool,
}

/// An entry of the catalog read from disk. Its ordinal is its index in [`Catalog::entries`].
pub type LegacyEntry = CatalogEntry;

impl CatalogEntry {
    /// A fresh, untranslated entry.
    pub fn new(context: Option<String>, singular: String, plural: Option<String>) -> Self {
        let forms = if plural.is_some() { 2 } else { 1 };
        Self {
            context,
            singular,
            plural,
            translations: vec![String::new(); forms],
            ..Default::default()
        }
    }

    pub fn matches_key(&self, key: &MessageKey) -> bool {
        self.context == key.context
            && self.singular == key.singular
            && self.plural.is_some() == key.plural_present
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    pub header: Header,
    pub entries: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn parse(content: &str) -> Result<Self, CatalogError> {
        parse_catalog(content)
    }

    pub fn render(&self) -> String {
        write_catalog(&self.header, &self.entries)
    }
}

/// Read the committed catalog. A missing file is `Ok(None)`.
pub fn read_catalog(path: &Path) -> Result<Option<Catalog>, CatalogError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(CatalogError::io(path, err)),
    };
    Catalog::parse(&content).map(Some)
}

/// Stage the rendered catalog next to `path` and move it over `path` only on success.
pub fn commit_catalog(path: &Path, catalog: &Catalog) -> Result<(), CatalogError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir).map_err(|err| CatalogError::io(&dir, err))?;

    let mut staged = NamedTempFile::new_in(&dir).map_err(|err| CatalogError::io(&dir, err))?;
    staged
        .write_all(catalog.render().as_bytes())
        .and_then(|()| staged.as_file().sync_all())
        .map_err(|err| CatalogError::io(staged.path(), err))?;
    staged
        .persist(path)
        .map_err(|err| CatalogError::io(path, err.error))?;

    tracing::debug!(path = %path.display(), "catalog committed");
    Ok(())
}
