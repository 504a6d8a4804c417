/// Locator error types
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The locator could not be decomposed into URI components
    #[error("Cannot parse locator '{locator}': {reason}")]
    Parse { locator: String, reason: String },

    /// No scheme rule accepted the locator
    #[error("Cannot resolve a scheme for locator '{locator}': {reason}")]
    UnresolvedScheme { locator: String, reason: String },
}

impl Error {
    pub fn parse<L: AsRef<str>, R: Into<String>>(locator: L, reason: R) -> Self {
        Error::Parse {
            locator: locator.as_ref().to_string(),
            reason: reason.into(),
        }
    }

    pub fn unresolved<L: AsRef<str>, R: Into<String>>(locator: L, reason: R) -> Self {
        Error::UnresolvedScheme {
            locator: locator.as_ref().to_string(),
            reason: reason.into(),
        }
    }

    /// The locator string the error is about
    #[must_use]
    pub fn locator(&self) -> &str {
        match self {
            Error::Parse { locator, .. } | Error::UnresolvedScheme { locator, .. } => locator,
        }
    }
}

/// Result type for locator operations
pub type Result<T> = std::result::Result<T, Error>;
