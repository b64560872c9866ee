//! End-to-end run: scan, parse, lower, match, collect, then reconcile with the catalog on disk.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use rayon::prelude::*;
use swc_common::SourceMap;
use thiserror::Error;

use crate::{
    config::Config,
    core::{
        catalog::{CatalogError, commit_catalog, read_catalog},
        collect::{MessageCollector, MessageStore},
        error::ExtractError,
        eval::constants::ProjectConstants,
        file_scanner::{relative_path, scan_files},
        lower::{FileDeclarations, LoweredFile, ProjectIndex, lower_file, scan_module},
        parsers::source::{ParsedSource, parse_source},
        reconcile::{CatalogOutcome, ReconcileStats, reconcile},
        rules::RuleRegistry,
        syntax::{FileScope, ModuleNames},
    },
    issues::{Issue, ParseErrorIssue},
};

#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    pub comment_tag: Option<String>,
}

/// Messages and recoverable issues of one extraction pass.
#[derive(Debug)]
pub struct Extraction {
    pub store: MessageStore,
    pub issues: Vec<Issue>,
    /// Files parsed and searched for sites.
    pub files: usize,
    pub parse_errors: usize,
}

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error("failed to read catalog: {0}")]
    ReadCatalog(#[source] CatalogError),

    #[error("failed to write catalog: {0}")]
    WriteCatalog(#[source] CatalogError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Write the catalog when it changed.
    Extract,
    /// Only report whether the catalog is up to date.
    Check,
}

#[derive(Debug)]
pub struct RunReport {
    pub outcome: CatalogOutcome,
    pub stats: ReconcileStats,
    pub catalog_path: PathBuf,
    pub committed: bool,
    pub messages: usize,
    pub files: usize,
    pub parse_errors: usize,
    pub issues: Vec<Issue>,
}

impl RunReport {
    /// The committed catalog differs from what extraction produces.
    pub fn is_outdated(&self) -> bool {
        self.outcome == CatalogOutcome::Written && !self.committed
    }
}

struct ScannedFile {
    parsed: ParsedSource,
    decls: FileDeclarations,
}

fn parse_file(
    root: &Path,
    file: &Path,
    source_map: Arc<SourceMap>,
) -> Result<ScannedFile, ParseErrorIssue> {
    let relative = relative_path(root, file);
    let failed = |error: String| ParseErrorIssue {
        file_path: relative.clone(),
        error,
    };

    let code = fs::read_to_string(file).map_err(|e| failed(e.to_string()))?;
    let parsed = parse_source(code, &relative, source_map).map_err(|e| failed(e.to_string()))?;
    let decls = scan_module(&parsed.module, &relative);
    Ok(ScannedFile { parsed, decls })
}

/// Extract every message matched by `registry` in `files`.
///
/// Files parse and lower in parallel; sites are matched and collected sequentially, in
/// relative-path order, so the store order is deterministic.
pub fn extract(
    root: &Path,
    files: &[PathBuf],
    registry: &RuleRegistry,
    options: &ExtractOptions,
) -> Result<Extraction, ExtractError> {
    let source_map: Arc<SourceMap> = Default::default();

    let results: Vec<Result<ScannedFile, ParseErrorIssue>> = files
        .par_iter()
        .map(|file| parse_file(root, file, source_map.clone()))
        .collect();

    let mut issues = Vec::new();
    let mut scanned = Vec::new();
    for result in results {
        match result {
            Ok(file) => scanned.push(file),
            Err(issue) => {
                tracing::warn!(path = %issue.file_path, error = %issue.error, "file skipped");
                issues.push(Issue::ParseError(issue));
            }
        }
    }
    let parse_errors = issues.len();
    scanned.sort_by(|a, b| a.decls.path.cmp(&b.decls.path));

    let (parsed, decls): (Vec<_>, Vec<_>) = scanned
        .into_iter()
        .map(|file| (file.parsed, file.decls))
        .unzip();
    let index = ProjectIndex::build(&decls);

    let lowered: Vec<LoweredFile> = parsed
        .into_par_iter()
        .zip(decls.par_iter())
        .map(|(parsed, decls)| lower_file(parsed, decls, &index))
        .collect();

    let mut constants = ProjectConstants::new();
    let mut trees = Vec::with_capacity(lowered.len());
    for file in lowered {
        for (owner, name, init) in file.constants {
            constants.insert(owner, name, init);
        }
        trees.push(file.tree);
    }
    tracing::debug!(constants = constants.len(), "constant table built");

    let mut collector = MessageCollector::new(&constants, options.comment_tag.clone());
    for tree in &trees {
        let scope = FileScope {
            names: ModuleNames {
                module: &tree.module,
                imports: &tree.imports,
                locals: &tree.locals,
                default_exports: &index.default_exports,
            },
            types: &index.types,
        };
        for site in &tree.sites {
            if let Some(rule) = registry.find(site, &scope) {
                collector.visit(tree, site, rule)?;
            }
        }
    }

    let (store, found) = collector.finish();
    issues.extend(found);
    tracing::info!(
        files = trees.len(),
        messages = store.len(),
        issues = issues.len(),
        "extraction finished"
    );

    Ok(Extraction {
        store,
        issues,
        files: trees.len(),
        parse_errors,
    })
}

/// Extract messages under `root` and reconcile them with the configured catalog.
pub fn run(root: &Path, config: &Config, mode: RunMode) -> Result<RunReport, RunError> {
    let registry = RuleRegistry::new(config.rules.clone())?;

    let scan = scan_files(
        &root.to_string_lossy(),
        &config.includes,
        &config.ignores,
        config.ignore_test_files,
    );
    let files: Vec<PathBuf> = scan.files.iter().map(PathBuf::from).collect();

    let options = ExtractOptions {
        comment_tag: config.comment_tag.clone(),
    };
    let extraction = extract(root, &files, &registry, &options)?;
    let messages = extraction.store.len();

    let catalog_path = root.join(&config.output);
    let legacy = read_catalog(&catalog_path).map_err(RunError::ReadCatalog)?;
    let reconciled = reconcile(legacy, extraction.store, &config.reconcile_options());

    let committed = mode == RunMode::Extract && reconciled.outcome == CatalogOutcome::Written;
    if committed {
        commit_catalog(&catalog_path, &reconciled.catalog.to_catalog())
            .map_err(RunError::WriteCatalog)?;
    }
    tracing::info!(
        outcome = reconciled.outcome.as_str(),
        path = %catalog_path.display(),
        "catalog reconciled"
    );

    Ok(RunReport {
        outcome: reconciled.outcome,
        stats: reconciled.stats,
        catalog_path,
        committed,
        messages,
        files: extraction.files,
        parse_errors: extraction.parse_errors,
        issues: extraction.issues,
    })
}
