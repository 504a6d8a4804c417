//! Provider API: locator-based reads and writes
//!
//! Ties the pieces together:
//! - locator parsing (the `locator` crate)
//! - handler inference or explicit override (the registry)
//! - backend selection: local file, package data, web, in-process object
//!
//! A [`Provider`] is configured once, then shared. The module-level
//! functions use a process-wide provider built from the environment on
//! first use, unless one was [`install`]ed earlier.

use crate::config::ProviderConfig;
use crate::content::Content;
use crate::handler::Handler;
use crate::loader::ObjectLoader;
use crate::model::ModelRegistry;
use crate::registry::{HandlerKind, HandlerRegistry, HandlerSpec};
use crate::resource::{Resource, Target};
use crate::{Error, Options, Result};
use locator::{FixedRoot, PackageRoot, Scheme, Uri};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

pub struct Provider {
    registry: HandlerRegistry,
    models: Arc<ModelRegistry>,
    loader: Arc<ObjectLoader>,
    root: Arc<dyn PackageRoot>,
    client: reqwest::blocking::Client,
}

impl std::fmt::Debug for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Provider")
            .field("registry", &self.registry)
            .field("models", &self.models)
            .field("loader", &self.loader)
            .field("root", &self.root.root())
            .finish_non_exhaustive()
    }
}

impl Provider {
    /// Provider with the built-in handlers and models
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| Error::Config(format!("cannot build HTTP client: {e}")))?;

        Ok(Self {
            registry: HandlerRegistry::with_defaults()?,
            models: Arc::new(ModelRegistry::with_defaults()?),
            loader: Arc::new(ObjectLoader::new()),
            root: Arc::new(FixedRoot::new(config.package_root())),
            client,
        })
    }

    /// Provider configured from defaults and environment overrides
    pub fn from_env() -> Result<Self> {
        Self::new(&ProviderConfig::from_env()?)
    }

    /// Replace the resolver behind `swark:` locators
    #[must_use]
    pub fn with_package_root(mut self, root: Arc<dyn PackageRoot>) -> Self {
        self.root = root;
        self
    }

    /// Register an additional handler, typically a custom format
    pub fn register_handler(&mut self, spec: HandlerSpec) -> Result<()> {
        self.registry.register(spec)
    }

    #[must_use]
    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    #[must_use]
    pub fn models(&self) -> &Arc<ModelRegistry> {
        &self.models
    }

    #[must_use]
    pub fn loader(&self) -> &Arc<ObjectLoader> {
        &self.loader
    }

    fn target_for(&self, uri: &Uri) -> Result<Target> {
        match uri.scheme() {
            Scheme::Python => Ok(Target::Object {
                path: uri.object_path().unwrap_or_default(),
                loader: self.loader.clone(),
            }),
            Scheme::Http | Scheme::Https => Ok(Target::Http {
                url: uri.to_url()?,
                client: self.client.clone(),
            }),
            Scheme::File | Scheme::FileAbsolute | Scheme::FileRelative | Scheme::Package => uri
                .local_path(self.root.as_ref())
                .map(Target::Local)
                .ok_or_else(|| Error::HandlerNotFound {
                    locator: uri.locator().to_string(),
                }),
        }
    }

    /// Bind a handler to `locator` without touching the resource.
    ///
    /// With `handler` set, that name or alias is used instead of inference.
    /// The `string` handler binds to `locator` itself as literal content.
    pub fn acquire(&self, locator: &str, handler: Option<&str>) -> Result<Handler> {
        if let Some(entry) = handler.and_then(|name| self.registry.lookup(name)) {
            if matches!(entry.kind(), HandlerKind::StringContent) {
                let resource = Resource::new(locator, Target::Literal(locator.to_string()));
                return Ok(Handler::new(entry, resource, self.models.clone()));
            }
        }

        let uri = locator::parse(locator)?;
        let entry = match handler {
            Some(name) => self.registry.resolve_override(name, &uri)?,
            None => self.registry.infer(&uri)?,
        };
        let resource = Resource::new(locator, self.target_for(&uri)?);
        Ok(Handler::new(entry, resource, self.models.clone()))
    }

    pub fn read(&self, locator: &str, handler: Option<&str>, options: &Options) -> Result<Content> {
        self.acquire(locator, handler)?.read(options)
    }

    pub fn write(
        &self,
        content: &Content,
        locator: &str,
        handler: Option<&str>,
        overwrite: bool,
        options: &Options,
    ) -> Result<()> {
        self.acquire(locator, handler)?
            .write(content, overwrite, options)
    }

    /// True iff `candidate` resolves to a handler
    #[must_use]
    pub fn is_locator(&self, candidate: &str) -> bool {
        self.acquire(candidate, None).is_ok()
    }
}

static GLOBAL: OnceLock<Provider> = OnceLock::new();

/// Make `provider` the process-wide provider. Fails, handing the provider
/// back, if one is already in place.
pub fn install(provider: Provider) -> std::result::Result<(), Provider> {
    GLOBAL.set(provider)
}

/// The process-wide provider, built from the environment on first use
pub fn global() -> Result<&'static Provider> {
    if let Some(provider) = GLOBAL.get() {
        return Ok(provider);
    }
    let provider = Provider::from_env()?;
    Ok(GLOBAL.get_or_init(|| provider))
}

pub fn read(locator: &str, handler: Option<&str>, options: &Options) -> Result<Content> {
    global()?.read(locator, handler, options)
}

pub fn write(
    content: &Content,
    locator: &str,
    handler: Option<&str>,
    overwrite: bool,
    options: &Options,
) -> Result<()> {
    global()?.write(content, locator, handler, overwrite, options)
}

pub fn acquire(locator: &str, handler: Option<&str>) -> Result<Handler> {
    global()?.acquire(locator, handler)
}

#[must_use]
pub fn is_locator(candidate: &str) -> bool {
    global().is_ok_and(|provider| provider.is_locator(candidate))
}
