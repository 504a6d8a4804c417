/// Provider error types
///
/// Every variant raised while handling a resource names the locator, and
/// the handler when one had been chosen.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed locator or no scheme rule matched
    #[error(transparent)]
    Locator(#[from] locator::Error),

    /// Neither the extension nor the scheme maps to a handler
    #[error("No handler for '{locator}': no extension or scheme match")]
    HandlerNotFound { locator: String },

    /// Explicit handler name is unknown or cannot serve this locator
    #[error("Handler override '{handler}' cannot be used for '{locator}': {reason}")]
    InvalidHandlerOverride {
        locator: String,
        handler: String,
        reason: String,
    },

    /// Resource does not exist
    #[error("Resource '{locator}' not found (handler {handler})")]
    NotFound { locator: String, handler: String },

    /// Write onto an existing resource without the overwrite flag
    #[error("Refusing to overwrite '{locator}' (handler {handler}); pass overwrite to replace it")]
    OverwriteConflict { locator: String, handler: String },

    /// Format-specific parse failure
    #[error("Cannot decode '{locator}' with handler {handler}: {message}")]
    Decode {
        locator: String,
        handler: String,
        message: String,
    },

    /// Format-specific serialization failure
    #[error("Cannot encode '{locator}' with handler {handler}: {message}")]
    Encode {
        locator: String,
        handler: String,
        message: String,
    },

    /// Typed-JSON envelope names a model that is not registered
    #[error("Unknown model tag '{tag}' in '{locator}'")]
    UnknownTag { locator: String, tag: String },

    /// Operation not available for this handler or payload
    #[error("Handler {handler} does not support {operation} on '{locator}'")]
    UnsupportedOperation {
        locator: String,
        handler: String,
        operation: String,
    },

    /// Options could not be interpreted by the handler
    #[error("Invalid options for handler {handler} on '{locator}': {message}")]
    InvalidOptions {
        locator: String,
        handler: String,
        message: String,
    },

    /// Handler name or alias registered twice
    #[error("Handler alias '{alias}' is already registered to {existing}")]
    DuplicateAlias { alias: String, existing: String },

    /// Extension or scheme mapped twice
    #[error("{kind} '{key}' is already mapped to handler {existing}")]
    DuplicateMapping {
        kind: &'static str,
        key: String,
        existing: String,
    },

    /// Model tag registered twice
    #[error("Model tag '{tag}' is already registered")]
    DuplicateModel { tag: String },

    /// Filesystem failure
    #[error("IO error on '{locator}': {source}")]
    Io {
        locator: String,
        #[source]
        source: std::io::Error,
    },

    /// Network failure
    #[error("Transport error on '{locator}': {source}")]
    Transport {
        locator: String,
        #[source]
        source: reqwest::Error,
    },

    /// Bad configuration file or environment override
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    pub fn io<L: AsRef<str>>(locator: L, source: std::io::Error) -> Self {
        Error::Io {
            locator: locator.as_ref().to_string(),
            source,
        }
    }

    pub fn transport<L: AsRef<str>>(locator: L, source: reqwest::Error) -> Self {
        Error::Transport {
            locator: locator.as_ref().to_string(),
            source,
        }
    }

    pub fn unsupported<L: AsRef<str>, H: AsRef<str>, O: Into<String>>(
        locator: L,
        handler: H,
        operation: O,
    ) -> Self {
        Error::UnsupportedOperation {
            locator: locator.as_ref().to_string(),
            handler: handler.as_ref().to_string(),
            operation: operation.into(),
        }
    }

    pub fn invalid_override<L: AsRef<str>, H: AsRef<str>, R: Into<String>>(
        locator: L,
        handler: H,
        reason: R,
    ) -> Self {
        Error::InvalidHandlerOverride {
            locator: locator.as_ref().to_string(),
            handler: handler.as_ref().to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type for provider operations
pub type Result<T> = std::result::Result<T, Error>;
