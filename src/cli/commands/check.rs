use anyhow::Result;

use super::{CommandKind, CommandResult, helper};
use crate::{
    cli::args::CheckCommand,
    core::{RunMode, run},
};

pub fn check(cmd: CheckCommand) -> Result<CommandResult> {
    let (root, config) = helper::prepare(&cmd.common)?;
    let report = run(&root, &config, RunMode::Check)?;
    Ok(helper::finish(CommandKind::Check, report))
}
