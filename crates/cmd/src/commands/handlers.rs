use std::io::Write;

use anyhow::Result;
use provider::Mode;

use crate::common::CmdContext;

/// List registered handlers with their aliases and inference keys
pub fn handlers_command(ctx: &CmdContext, out: &mut (dyn Write + Send)) -> Result<()> {
    let provider = ctx.provider()?;
    for entry in provider.registry().list() {
        let schemes: Vec<String> = entry.schemes().iter().map(ToString::to_string).collect();
        let mode = match entry.kind().format(provider.models()).map(|f| f.mode()) {
            Some(Mode::Text) => "text",
            Some(Mode::Binary) => "binary",
            None => "object",
        };
        writeln!(
            out,
            "{name:<12} {mode:<6} aliases=[{aliases}] extensions=[{extensions}] schemes=[{schemes}]{ro}",
            name = entry.name(),
            mode = mode,
            aliases = entry.aliases().join(","),
            extensions = entry.extensions().join(","),
            schemes = schemes.join(","),
            ro = if entry.is_read_only() { " read-only" } else { "" },
        )?;
    }
    Ok(())
}
