use std::io::Write;

use anyhow::Result;

use crate::common::CmdContext;

/// Print whether the resource exists and return the answer
pub fn exists_command(
    ctx: &CmdContext,
    locator: &str,
    handler: Option<&str>,
    out: &mut (dyn Write + Send),
) -> Result<bool> {
    let found = ctx.provider()?.acquire(locator, handler)?.exists()?;
    writeln!(out, "{found}")?;
    Ok(found)
}
