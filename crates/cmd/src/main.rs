use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use cmd::commands;
use cmd::common::CmdContext;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "swark")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Provider configuration file (YAML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Handler option as key=value; repeatable
    #[arg(short = 'o', long = "option", global = true)]
    options: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Read a locator and print its content
    Cat {
        locator: String,
        /// Handler name or alias instead of inference
        #[arg(long)]
        handler: Option<String>,
    },
    /// Read one locator and write its content to another
    Copy {
        source: String,
        dest: String,
        /// Handler for reading the source
        #[arg(long)]
        from: Option<String>,
        /// Handler for writing the destination
        #[arg(long)]
        to: Option<String>,
        /// Replace an existing destination
        #[arg(long)]
        overwrite: bool,
    },
    /// Show the handler and backend a locator resolves to
    Which {
        locator: String,
        #[arg(long)]
        handler: Option<String>,
    },
    /// Check whether a resource exists; exits 1 if it does not
    Exists {
        locator: String,
        #[arg(long)]
        handler: Option<String>,
    },
    /// Delete a resource
    Rm {
        locator: String,
        #[arg(long)]
        handler: Option<String>,
    },
    /// List registered handlers
    Handlers,
}

fn run(cli: Cli) -> Result<ExitCode> {
    let ctx = CmdContext::new(cli.config, cli.options);
    let mut stdout = std::io::stdout();

    match cli.command {
        Commands::Cat { locator, handler } => {
            commands::cat_command(&ctx, &locator, handler.as_deref(), &mut stdout)?;
        }
        Commands::Copy {
            source,
            dest,
            from,
            to,
            overwrite,
        } => commands::copy_command(
            &ctx,
            &source,
            &dest,
            from.as_deref(),
            to.as_deref(),
            overwrite,
        )?,
        Commands::Which { locator, handler } => {
            commands::which_command(&ctx, &locator, handler.as_deref(), &mut stdout)?;
        }
        Commands::Exists { locator, handler } => {
            if !commands::exists_command(&ctx, &locator, handler.as_deref(), &mut stdout)? {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Rm { locator, handler } => {
            commands::rm_command(&ctx, &locator, handler.as_deref())?;
        }
        Commands::Handlers => commands::handlers_command(&ctx, &mut stdout)?,
    }
    stdout.flush()?;
    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    diagnostics::init();
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            diagnostics::error!("swark failed: {error}", error: format!("{err:#}"));
            let _ = writeln!(std::io::stderr(), "Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
