use anyhow::Result;

use super::{CommandKind, CommandResult, helper};
use crate::{
    cli::args::ExtractCommand,
    core::{RunMode, run},
};

pub fn extract(cmd: ExtractCommand) -> Result<CommandResult> {
    let (root, config) = helper::prepare(&cmd.common)?;
    let report = run(&root, &config, RunMode::Extract)?;
    Ok(helper::finish(CommandKind::Extract, report))
}
