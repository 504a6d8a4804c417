use std::io::Write;
use std::path::PathBuf;

use anyhow::{Result, anyhow};
use provider::format::YamlDocsFormat;
use provider::{Content, Format, Options, Provider, ProviderConfig, load_config};

/// Settings shared by every subcommand
#[derive(Debug, Clone, Default)]
pub struct CmdContext {
    /// YAML provider configuration; defaults apply when absent
    pub config: Option<PathBuf>,
    /// `key=value` handler options from the command line
    pub options: Vec<String>,
}

impl CmdContext {
    #[must_use]
    pub fn new(config: Option<PathBuf>, options: Vec<String>) -> Self {
        Self { config, options }
    }

    /// Build the provider: config file (if any), then environment overrides.
    pub fn provider(&self) -> Result<Provider> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => ProviderConfig::default(),
        };
        config.apply_env()?;
        diagnostics::debug!(
            "package root {root}",
            root: config.package_root().display().to_string()
        );
        Ok(Provider::new(&config)?)
    }

    /// Handler options collected from `--option key=value`
    pub fn options(&self) -> Result<Options> {
        let mut options = Options::new();
        for assignment in &self.options {
            let (key, value) = Options::parse_assignment(assignment).map_err(|e| anyhow!(e))?;
            options.set(&key, value);
        }
        Ok(options)
    }
}

/// Human-readable rendering of any content kind
pub fn render(content: &Content, out: &mut (dyn Write + Send)) -> Result<()> {
    match content {
        Content::Table(table) => {
            let pretty = arrow::util::pretty::pretty_format_batches(&[table.batch().clone()])?;
            writeln!(out, "{pretty}")?;
        }
        Content::Json(value) => {
            writeln!(out, "{}", serde_json::to_string_pretty(value)?)?;
        }
        Content::Documents(_) => {
            YamlDocsFormat.encode(content, out, &Options::new())?;
        }
        Content::Text(text) => out.write_all(text.as_bytes())?,
        Content::Bytes(bytes) => out.write_all(bytes)?,
        Content::Model(model) => {
            writeln!(out, "{}", serde_json::to_string_pretty(&model.to_envelope()?)?)?;
        }
        Content::Object(object) => match object.as_namespace() {
            Some(namespace) => {
                for name in namespace.names() {
                    writeln!(out, "{}.{name}", object.path())?;
                }
            }
            None => writeln!(out, "<object {}>", object.path())?,
        },
    }
    Ok(())
}
