//! CLI argument definitions using clap.
//!
//! ## Commands
//!
//! - `extract`: Extract messages and update the catalog
//! - `check`: Fail when the committed catalog is out of date
//! - `init`: Write a `.glotporc.json` with an example rule set

use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Arguments {
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Arguments {
    /// Check if a command was provided, otherwise print help and return None.
    pub fn with_command_or_help(self) -> Option<Self> {
        if self.command.is_none() {
            Self::command().print_help().ok();
            None
        } else {
            Some(self)
        }
    }

    /// Get the verbose flag from the command's common args.
    pub fn verbose(&self) -> bool {
        match &self.command {
            Some(Command::Extract(cmd)) => cmd.common.verbose,
            Some(Command::Check(cmd)) => cmd.common.verbose,
            Some(Command::Init) | None => false,
        }
    }
}

/// Common arguments shared by `extract` and `check`.
#[derive(Debug, Clone, Args)]
pub struct CommonArgs {
    /// Source root directory (defaults to the current directory)
    #[arg(long)]
    pub source_root: Option<PathBuf>,

    /// Catalog path relative to the source root (overrides config file)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Drop messages that are no longer extracted instead of marking them obsolete
    #[arg(long)]
    pub remove_unused: bool,

    /// Write the catalog even when no message is found
    #[arg(long)]
    pub create_empty_template: bool,

    /// Only keep extracted comments starting with this tag (overrides config file)
    #[arg(long)]
    pub comment_tag: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Args)]
pub struct ExtractCommand {
    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Args)]
pub struct CheckCommand {
    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract translatable messages and update the catalog
    Extract(ExtractCommand),
    /// Check that the committed catalog is up to date (nothing is written)
    Check(CheckCommand),
    /// Initialize a new .glotporc.json configuration file
    Init,
}
