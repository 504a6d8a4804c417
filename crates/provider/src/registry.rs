// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Handler registration and inference
//!
//! Every handler has a unique name plus aliases (one shared namespace),
//! and claims file extensions and schemes. Inference tries the full
//! extension, then the last extension token, then the scheme. All
//! collisions are rejected at registration time, before any table is
//! touched.

use crate::format::{
    BytesFormat, CsvFormat, Format, JsonFormat, ParquetFormat, StringFormat, TextFormat,
    TypedJsonFormat, YamlDocFormat, YamlDocsFormat,
};
use crate::glue::GLUE_TAG;
use crate::model::ModelRegistry;
use crate::{Error, Result};
use locator::{Scheme, Uri};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// What a handler does with its resource
#[derive(Clone)]
pub enum HandlerKind {
    CsvTable,
    CsvGzipTable,
    ParquetTable,
    Json,
    TypedJson,
    GlueDb,
    YamlDoc,
    YamlDocs,
    Text,
    /// Resolves a `python:` dotted path through the object loader
    PythonObject,
    /// Raw body of an HTTP GET
    Url,
    /// Bound to a literal string instead of a locator
    StringContent,
    /// Externally supplied codec
    Custom(Arc<dyn Format>),
}

impl fmt::Debug for HandlerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandlerKind::CsvTable => f.write_str("CsvTable"),
            HandlerKind::CsvGzipTable => f.write_str("CsvGzipTable"),
            HandlerKind::ParquetTable => f.write_str("ParquetTable"),
            HandlerKind::Json => f.write_str("Json"),
            HandlerKind::TypedJson => f.write_str("TypedJson"),
            HandlerKind::GlueDb => f.write_str("GlueDb"),
            HandlerKind::YamlDoc => f.write_str("YamlDoc"),
            HandlerKind::YamlDocs => f.write_str("YamlDocs"),
            HandlerKind::Text => f.write_str("Text"),
            HandlerKind::PythonObject => f.write_str("PythonObject"),
            HandlerKind::Url => f.write_str("Url"),
            HandlerKind::StringContent => f.write_str("StringContent"),
            HandlerKind::Custom(format) => f.debug_tuple("Custom").field(format).finish(),
        }
    }
}

impl HandlerKind {
    /// Codec for stream-backed kinds; `None` for the object loader
    #[must_use]
    pub fn format(&self, models: &Arc<ModelRegistry>) -> Option<Arc<dyn Format>> {
        let format: Arc<dyn Format> = match self {
            HandlerKind::CsvTable => Arc::new(CsvFormat::plain()),
            HandlerKind::CsvGzipTable => Arc::new(CsvFormat::gzip()),
            HandlerKind::ParquetTable => Arc::new(ParquetFormat),
            HandlerKind::Json => Arc::new(JsonFormat),
            HandlerKind::TypedJson => Arc::new(TypedJsonFormat::new(models.clone())),
            HandlerKind::GlueDb => Arc::new(TypedJsonFormat::restricted_to(
                models.clone(),
                GLUE_TAG,
            )),
            HandlerKind::YamlDoc => Arc::new(YamlDocFormat),
            HandlerKind::YamlDocs => Arc::new(YamlDocsFormat),
            HandlerKind::Text => Arc::new(TextFormat),
            HandlerKind::Url => Arc::new(BytesFormat),
            HandlerKind::StringContent => Arc::new(StringFormat),
            HandlerKind::Custom(format) => format.clone(),
            HandlerKind::PythonObject => return None,
        };
        Some(format)
    }

    /// Kinds that can never be written
    #[must_use]
    pub fn is_read_only(&self) -> bool {
        matches!(
            self,
            HandlerKind::PythonObject | HandlerKind::Url | HandlerKind::StringContent
        )
    }
}

/// Registration request built with chained calls
#[derive(Debug, Clone)]
pub struct HandlerSpec {
    name: String,
    kind: HandlerKind,
    aliases: Vec<String>,
    extensions: Vec<String>,
    schemes: Vec<Scheme>,
    read_only: bool,
}

impl HandlerSpec {
    pub fn new<N: Into<String>>(name: N, kind: HandlerKind) -> Self {
        let read_only = kind.is_read_only();
        Self {
            name: name.into(),
            kind,
            aliases: Vec::new(),
            extensions: Vec::new(),
            schemes: Vec::new(),
            read_only,
        }
    }

    #[must_use]
    pub fn aliases(mut self, aliases: &[&str]) -> Self {
        self.aliases.extend(aliases.iter().map(|a| (*a).to_string()));
        self
    }

    #[must_use]
    pub fn extensions(mut self, extensions: &[&str]) -> Self {
        self.extensions
            .extend(extensions.iter().map(|e| e.trim_start_matches('.').to_ascii_lowercase()));
        self
    }

    #[must_use]
    pub fn schemes(mut self, schemes: &[Scheme]) -> Self {
        self.schemes.extend_from_slice(schemes);
        self
    }

    #[must_use]
    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only || self.kind.is_read_only();
        self
    }
}

/// A registered handler
#[derive(Debug, Clone)]
pub struct HandlerEntry {
    name: String,
    kind: HandlerKind,
    aliases: Vec<String>,
    extensions: Vec<String>,
    schemes: Vec<Scheme>,
    read_only: bool,
}

impl HandlerEntry {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn kind(&self) -> &HandlerKind {
        &self.kind
    }

    #[must_use]
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    #[must_use]
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    #[must_use]
    pub fn schemes(&self) -> &[Scheme] {
        &self.schemes
    }

    #[must_use]
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }
}

fn key(name: &str) -> String {
    name.trim().to_ascii_lowercase()
}

#[derive(Debug, Default)]
pub struct HandlerRegistry {
    entries: Vec<Arc<HandlerEntry>>,
    by_name: HashMap<String, Arc<HandlerEntry>>,
    by_extension: HashMap<String, Arc<HandlerEntry>>,
    by_scheme: HashMap<Scheme, Arc<HandlerEntry>>,
}

impl HandlerRegistry {
    /// Registry with no handlers
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry with the built-in handlers
    pub fn with_defaults() -> Result<Self> {
        let mut registry = Self::empty();
        for spec in default_handlers() {
            registry.register(spec)?;
        }
        Ok(registry)
    }

    /// Add a handler. Fails without changing anything if its name, an
    /// alias, an extension or a scheme is already taken.
    pub fn register(&mut self, spec: HandlerSpec) -> Result<()> {
        let mut names: Vec<String> = Vec::with_capacity(spec.aliases.len() + 1);
        for alias in std::iter::once(&spec.name).chain(&spec.aliases) {
            let alias = key(alias);
            if let Some(existing) = self.by_name.get(&alias) {
                return Err(Error::DuplicateAlias {
                    alias,
                    existing: existing.name.clone(),
                });
            }
            if names.contains(&alias) {
                return Err(Error::DuplicateAlias {
                    alias,
                    existing: spec.name.clone(),
                });
            }
            names.push(alias);
        }

        let mut extensions: Vec<String> = Vec::with_capacity(spec.extensions.len());
        for extension in &spec.extensions {
            if let Some(existing) = self.by_extension.get(extension) {
                return Err(Error::DuplicateMapping {
                    kind: "extension",
                    key: extension.clone(),
                    existing: existing.name.clone(),
                });
            }
            if !extensions.contains(extension) {
                extensions.push(extension.clone());
            }
        }

        for scheme in &spec.schemes {
            if let Some(existing) = self.by_scheme.get(scheme) {
                return Err(Error::DuplicateMapping {
                    kind: "scheme",
                    key: scheme.to_string(),
                    existing: existing.name.clone(),
                });
            }
        }

        let entry = Arc::new(HandlerEntry {
            name: key(&spec.name),
            kind: spec.kind,
            aliases: names[1..].to_vec(),
            extensions,
            schemes: spec.schemes,
            read_only: spec.read_only,
        });

        for name in names {
            let _ = self.by_name.insert(name, entry.clone());
        }
        for extension in &entry.extensions {
            let _ = self.by_extension.insert(extension.clone(), entry.clone());
        }
        for scheme in &entry.schemes {
            let _ = self.by_scheme.insert(*scheme, entry.clone());
        }
        diagnostics::debug!("registered handler {name}", name: entry.name.as_str());
        self.entries.push(entry);
        Ok(())
    }

    /// Handler by name or alias
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<Arc<HandlerEntry>> {
        self.by_name.get(&key(name)).cloned()
    }

    /// Handler by extension (`csv.gz`, `yaml`, ...)
    #[must_use]
    pub fn for_extension(&self, extension: &str) -> Option<Arc<HandlerEntry>> {
        self.by_extension.get(&key(extension)).cloned()
    }

    #[must_use]
    pub fn for_scheme(&self, scheme: Scheme) -> Option<Arc<HandlerEntry>> {
        self.by_scheme.get(&scheme).cloned()
    }

    /// Pick the handler for a URI: full extension, then last extension
    /// token, then scheme.
    pub fn infer(&self, uri: &Uri) -> Result<Arc<HandlerEntry>> {
        if let Some(extension) = uri.extension() {
            for candidate in [extension.full(), extension.absolute()] {
                if let Some(entry) = self.for_extension(candidate) {
                    diagnostics::debug!(
                        "{locator} -> {handler} by extension {extension}",
                        locator: uri.locator(),
                        handler: entry.name.as_str(),
                        extension: candidate
                    );
                    return Ok(entry);
                }
            }
        }
        if let Some(entry) = self.for_scheme(uri.scheme()) {
            diagnostics::debug!(
                "{locator} -> {handler} by scheme {scheme}",
                locator: uri.locator(),
                handler: entry.name.as_str(),
                scheme: uri.scheme().as_str()
            );
            return Ok(entry);
        }
        Err(Error::HandlerNotFound {
            locator: uri.locator().to_string(),
        })
    }

    /// Resolve an explicit handler name for `uri`. The name must be known
    /// and the handler must be able to serve the URI's scheme.
    pub fn resolve_override(&self, name: &str, uri: &Uri) -> Result<Arc<HandlerEntry>> {
        let entry = self
            .lookup(name)
            .ok_or_else(|| Error::invalid_override(uri.locator(), name, "unknown handler"))?;

        let scheme = uri.scheme();
        let reason = match entry.kind {
            HandlerKind::PythonObject if scheme != Scheme::Python => {
                Some("requires a python: locator")
            }
            HandlerKind::Url if !scheme.is_network() => Some("requires an http or https locator"),
            HandlerKind::StringContent => Some("string content is not addressed by a locator"),
            HandlerKind::PythonObject => None,
            _ if scheme == Scheme::Python => Some("python locators name objects, not files"),
            _ => None,
        };
        match reason {
            Some(reason) => Err(Error::invalid_override(uri.locator(), name, reason)),
            None => Ok(entry),
        }
    }

    /// Registered handlers in registration order
    #[must_use]
    pub fn list(&self) -> Vec<Arc<HandlerEntry>> {
        self.entries.clone()
    }
}

/// Built-in handler table
fn default_handlers() -> Vec<HandlerSpec> {
    vec![
        HandlerSpec::new("df.csv", HandlerKind::CsvTable)
            .aliases(&["csv"])
            .extensions(&["csv"]),
        HandlerSpec::new("df.csv.gz", HandlerKind::CsvGzipTable)
            .aliases(&["csv.gz"])
            .extensions(&["csv.gz"]),
        HandlerSpec::new("df.parquet", HandlerKind::ParquetTable)
            .aliases(&["parquet"])
            .extensions(&["parquet"]),
        HandlerSpec::new("json", HandlerKind::Json)
            .aliases(&["json.doc"])
            .extensions(&["json"]),
        HandlerSpec::new("pjson", HandlerKind::TypedJson)
            .aliases(&["typed.json"])
            .extensions(&["pjson"]),
        HandlerSpec::new("gluedb", HandlerKind::GlueDb)
            .aliases(&["glue"])
            .extensions(&["gluedb"]),
        HandlerSpec::new("doc.yaml", HandlerKind::YamlDoc)
            .aliases(&["yaml", "yml", "doc.yml"])
            .extensions(&["yaml", "yml", "doc.yaml", "doc.yml"]),
        HandlerSpec::new("docs.yaml", HandlerKind::YamlDocs)
            .aliases(&["docs.yml"])
            .extensions(&["docs.yaml", "docs.yml"]),
        HandlerSpec::new("file.text", HandlerKind::Text)
            .aliases(&["text", "txt"])
            .extensions(&["html", "shtml", "py", "txt", "text", "tex"]),
        HandlerSpec::new("python", HandlerKind::PythonObject)
            .aliases(&["pyobj"])
            .schemes(&[Scheme::Python]),
        HandlerSpec::new("url", HandlerKind::Url)
            .aliases(&["http", "https"])
            .schemes(&[Scheme::Http, Scheme::Https]),
        HandlerSpec::new("string", HandlerKind::StringContent).aliases(&["str"]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use locator::parse;

    fn registry() -> HandlerRegistry {
        HandlerRegistry::with_defaults().unwrap()
    }

    fn inferred(locator: &str) -> String {
        registry()
            .infer(&parse(locator).unwrap())
            .unwrap()
            .name()
            .to_string()
    }

    #[test]
    fn test_extension_inference() {
        assert_eq!(inferred("data/frame.csv"), "df.csv");
        assert_eq!(inferred("data/frame.csv.gz"), "df.csv.gz");
        assert_eq!(inferred("/x/t.parquet"), "df.parquet");
        assert_eq!(inferred("a.json"), "json");
        assert_eq!(inferred("m.pjson"), "pjson");
        assert_eq!(inferred("db.gluedb"), "gluedb");
        assert_eq!(inferred("c.yml"), "doc.yaml");
        assert_eq!(inferred("c.doc.yaml"), "doc.yaml");
        assert_eq!(inferred("c.docs.yaml"), "docs.yaml");
        assert_eq!(inferred("page.html"), "file.text");
        assert_eq!(inferred("FRAME.CSV"), "df.csv");
    }

    #[test]
    fn test_absolute_extension_fallback() {
        assert_eq!(inferred("report.v2.json"), "json");
        assert_eq!(inferred("notes.final.txt"), "file.text");
    }

    #[test]
    fn test_scheme_inference() {
        assert_eq!(inferred("https://example.com/page"), "url");
        assert_eq!(inferred("http://example.com/data.csv"), "df.csv");
        assert_eq!(inferred("python:pkg.mod.attr"), "python");
        assert_eq!(inferred("python:pkg.mod.csv"), "python");
    }

    #[test]
    fn test_no_handler() {
        let err = registry()
            .infer(&parse("archive.tar.bz2").unwrap())
            .unwrap_err();
        assert!(
            matches!(err, Error::HandlerNotFound { ref locator } if locator == "archive.tar.bz2")
        );
        assert!(registry().infer(&parse("Makefile").unwrap()).is_err());
    }

    #[test]
    fn test_aliases_resolve_to_same_entry() {
        let registry = registry();
        for entry in registry.list() {
            for alias in entry.aliases() {
                let resolved = registry.lookup(alias).unwrap();
                assert!(Arc::ptr_eq(&resolved, &entry), "alias {alias}");
            }
            assert!(Arc::ptr_eq(&registry.lookup(entry.name()).unwrap(), &entry));
        }
        assert_eq!(registry.lookup("YAML").unwrap().name(), "doc.yaml");
    }

    #[test]
    fn test_override() {
        let registry = registry();
        let uri = parse("notes.weird").unwrap();
        assert_eq!(registry.resolve_override("txt", &uri).unwrap().name(), "file.text");

        let err = registry.resolve_override("nope", &uri).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidHandlerOverride { ref handler, .. } if handler == "nope"
        ));
        assert!(registry.resolve_override("url", &uri).is_err());
        assert!(registry.resolve_override("python", &uri).is_err());

        let py = parse("python:pkg.attr").unwrap();
        assert!(registry.resolve_override("pyobj", &py).is_ok());
        assert!(registry.resolve_override("json", &py).is_err());
    }

    #[test]
    fn test_duplicate_alias_rejected_atomically() {
        let mut registry = registry();
        let before = registry.list().len();
        let err = registry
            .register(
                HandlerSpec::new("tsv", HandlerKind::Text)
                    .aliases(&["tab"])
                    .extensions(&["tsv"])
                    .aliases(&["csv"]),
            )
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateAlias { ref existing, .. } if existing == "df.csv"));
        assert_eq!(registry.list().len(), before);
        assert!(registry.lookup("tab").is_none());
        assert!(registry.for_extension("tsv").is_none());
    }

    #[test]
    fn test_duplicate_extension_rejected() {
        let mut registry = registry();
        let err = registry
            .register(HandlerSpec::new("other.json", HandlerKind::Json).extensions(&["json"]))
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateMapping { kind: "extension", .. }));
        assert!(registry.lookup("other.json").is_none());
    }

    #[test]
    fn test_duplicate_scheme_rejected_atomically() {
        let mut registry = registry();
        let before = registry.list().len();
        let err = registry
            .register(
                HandlerSpec::new("mirror", HandlerKind::Url)
                    .aliases(&["mirror.http"])
                    .extensions(&["mirror"])
                    .schemes(&[Scheme::Https]),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            Error::DuplicateMapping { kind: "scheme", ref existing, .. } if existing == "url"
        ));
        assert_eq!(registry.list().len(), before);
        assert!(registry.lookup("mirror").is_none());
        assert!(registry.lookup("mirror.http").is_none());
        assert!(registry.for_extension("mirror").is_none());
        assert_eq!(registry.for_scheme(Scheme::Https).unwrap().name(), "url");
    }

    #[test]
    fn test_read_only_kinds() {
        let registry = registry();
        assert!(registry.lookup("url").unwrap().is_read_only());
        assert!(registry.lookup("python").unwrap().is_read_only());
        assert!(registry.lookup("string").unwrap().is_read_only());
        assert!(!registry.lookup("df.csv").unwrap().is_read_only());
    }
}
