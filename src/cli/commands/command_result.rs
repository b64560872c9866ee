use crate::cli::exit_status::ExitStatus;
use crate::core::RunReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Extract,
    Check,
    Init,
}

#[derive(Debug)]
pub enum CommandSummary {
    Run(RunReport),
    Init(InitSummary),
}

#[derive(Debug)]
pub struct InitSummary {
    pub created: bool,
    /// Set when the config file already exists.
    pub error: Option<String>,
}

/// Result of running glotpo commands
#[derive(Debug)]
pub struct CommandResult {
    pub kind: CommandKind,
    pub summary: CommandSummary,
    pub error_count: usize,
    pub warning_count: usize,
}

impl CommandResult {
    /// `check` also fails when the catalog is out of date.
    pub fn exit_status(&self) -> ExitStatus {
        let outdated = match &self.summary {
            CommandSummary::Run(report) => self.kind == CommandKind::Check && report.is_outdated(),
            CommandSummary::Init(_) => false,
        };
        if self.error_count > 0 || outdated {
            ExitStatus::Failure
        } else {
            ExitStatus::Success
        }
    }
}
