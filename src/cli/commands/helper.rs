use std::{env, path::PathBuf};

use anyhow::{Context, Result};

use super::{CommandKind, CommandResult, CommandSummary};
use crate::{
    cli::args::CommonArgs,
    config::{Config, load_config},
    core::RunReport,
    issues::Severity,
};

/// Source root and effective configuration: the config file found from the root, with
/// command-line flags applied on top.
pub fn prepare(args: &CommonArgs) -> Result<(PathBuf, Config)> {
    let root = match &args.source_root {
        Some(root) => root.clone(),
        None => env::current_dir().context("Failed to get current directory")?,
    };

    let mut config = load_config(&root)?.config;
    if let Some(output) = &args.output {
        config.output = output.clone();
    }
    if let Some(tag) = &args.comment_tag {
        config.comment_tag = Some(tag.clone());
    }
    config.remove_unused |= args.remove_unused;
    config.create_empty_template |= args.create_empty_template;

    Ok((root, config))
}

pub fn finish(kind: CommandKind, mut report: RunReport) -> CommandResult {
    report.issues.sort_by_key(|issue| issue.severity());

    let error_count = report
        .issues
        .iter()
        .filter(|i| i.severity() == Severity::Error)
        .count();
    let warning_count = report.issues.len() - error_count;

    CommandResult {
        kind,
        summary: CommandSummary::Run(report),
        error_count,
        warning_count,
    }
}
