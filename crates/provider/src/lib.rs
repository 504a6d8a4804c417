//! Provider: locator-based data access for swark
//!
//! Give it a locator, get back typed content. The handler is inferred from
//! the locator's extension or scheme, or named explicitly.
//!
//! ```no_run
//! use provider::{Content, Options, Provider, ProviderConfig};
//!
//! let provider = Provider::new(&ProviderConfig::default()).unwrap();
//! let doc = provider.read("config/site.yaml", None, &Options::new()).unwrap();
//! provider
//!     .write(&doc, "out/site.json", None, true, &Options::new().with("pretty", true))
//!     .unwrap();
//! ```

pub mod compression;
mod config;
mod content;
mod error;
pub mod format;
mod glue;
mod handler;
pub mod loader;
mod model;
mod options;
mod provider_api;
mod registry;
mod resource;

pub use config::{
    HTTP_TIMEOUT_ENV, PACKAGE_ROOT_ENV, ProviderConfig, default_package_root, load_config,
};
pub use content::{Content, Table};
pub use error::{Error, Result};
pub use format::{Format, FormatError, FormatResult, Mode, Source};
pub use glue::{DuplicateRecord, GLUE_TAG, GlueDb, Record};
pub use handler::Handler;
pub use loader::{LoadedObject, Namespace, ObjectLoader};
pub use model::{Envelope, Model, ModelRegistry, TypedModel};
pub use options::Options;
pub use provider_api::{Provider, acquire, global, install, is_locator, read, write};
pub use registry::{HandlerEntry, HandlerKind, HandlerRegistry, HandlerSpec};
pub use resource::{Resource, Target};

pub use locator::{PackageRoot, Scheme, Uri};
