use std::io::Write;

use anyhow::Result;

use crate::common::CmdContext;

/// Show which handler and backend a locator resolves to, without touching it
pub fn which_command(
    ctx: &CmdContext,
    locator: &str,
    handler: Option<&str>,
    out: &mut (dyn Write + Send),
) -> Result<()> {
    let bound = ctx.provider()?.acquire(locator, handler)?;
    let resource = bound.resource();
    write!(out, "{}\t{}", bound.name(), resource.backend_name())?;
    if let Some(path) = resource.local_path() {
        write!(out, "\t{}", path.display())?;
    }
    writeln!(out)?;
    Ok(())
}
