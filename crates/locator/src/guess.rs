//! Scheme guessing for locators written without a scheme
//!
//! Purely structural, never touches the network or the filesystem. The
//! suffix list is intentionally short: a relative path whose name happens to
//! end in one of these suffixes is classified as a web address, and callers
//! that need certainty must write an explicit scheme.

use crate::parse::has_drive_prefix;
use crate::{Error, Result, Scheme};

/// Suffixes that mark a bare string as a web address
pub const WEB_SUFFIXES: [&str; 7] = [".com", ".net", ".org", ".gov", ".edu", ".html", ".shtml"];

/// Outcome of [`guess_scheme`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guess {
    Https,
    Http,
    FileAbsolute,
    FileRelative,
}

impl Guess {
    #[must_use]
    pub fn scheme(self) -> Scheme {
        match self {
            Guess::Https => Scheme::Https,
            Guess::Http => Scheme::Http,
            Guess::FileAbsolute => Scheme::FileAbsolute,
            Guess::FileRelative => Scheme::FileRelative,
        }
    }
}

fn starts_with_ignore_case(text: &str, prefix: &str) -> bool {
    text.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

fn looks_like_web_address(text: &str) -> bool {
    let lower = text.to_ascii_lowercase();
    WEB_SUFFIXES
        .iter()
        .any(|suffix| lower.ends_with(suffix) || lower.contains(&format!("{suffix}/")))
}

/// Classify a locator that carries no explicit scheme. First match wins.
pub fn guess_scheme(locator: &str) -> Result<Guess> {
    let text = locator.replace('\\', "/");

    let guess = if starts_with_ignore_case(&text, "www.")
        || starts_with_ignore_case(&text, "https:")
    {
        Guess::Https
    } else if starts_with_ignore_case(&text, "http:") {
        Guess::Http
    } else if looks_like_web_address(&text) {
        Guess::Https
    } else if text.starts_with('/') || has_drive_prefix(&text) {
        Guess::FileAbsolute
    } else if !text.contains(':') {
        Guess::FileRelative
    } else {
        return Err(Error::unresolved(
            locator,
            "does not look like a recognized form",
        ));
    };
    Ok(guess)
}
