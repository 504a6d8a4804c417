use anyhow::Result;

use crate::common::CmdContext;

/// Read `source` with one handler and write it to `dest` with another.
/// Command-line options go to both sides; each format ignores keys it
/// doesn't know.
pub fn copy_command(
    ctx: &CmdContext,
    source: &str,
    dest: &str,
    from: Option<&str>,
    to: Option<&str>,
    overwrite: bool,
) -> Result<()> {
    let provider = ctx.provider()?;
    let options = ctx.options()?;

    let content = provider.read(source, from, &options)?;
    provider.write(&content, dest, to, overwrite, &options)?;

    diagnostics::info!(
        "copied {source} to {dest} ({kind})",
        source: source,
        dest: dest,
        kind: content.kind_name()
    );
    Ok(())
}
