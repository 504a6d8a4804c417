use std::io::Write;

use anyhow::Result;

use crate::common::{CmdContext, render};

/// Read a locator and render its content
pub fn cat_command(
    ctx: &CmdContext,
    locator: &str,
    handler: Option<&str>,
    out: &mut (dyn Write + Send),
) -> Result<()> {
    let provider = ctx.provider()?;
    let content = provider.read(locator, handler, &ctx.options()?)?;
    diagnostics::debug!("cat {locator}: {kind}", locator: locator, kind: content.kind_name());
    render(&content, out)
}
