use anyhow::Result;

use crate::common::CmdContext;

pub fn rm_command(ctx: &CmdContext, locator: &str, handler: Option<&str>) -> Result<()> {
    ctx.provider()?.acquire(locator, handler)?.remove()?;
    Ok(())
}
