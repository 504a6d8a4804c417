//! Locator: canonical URIs for the swark data-access layer
//!
//! A locator is any string naming a resource: an absolute or relative file
//! path, a web address with or without `https://`, a `python:` object path,
//! or a `swark:` path inside the package data directory. [`parse`] turns it
//! into a [`Uri`] with exactly one [`Scheme`].
//!
//! ```
//! use locator::{Scheme, parse};
//!
//! let uri = parse("data/table.csv.gz").unwrap();
//! assert_eq!(uri.scheme(), Scheme::FileRelative);
//! assert_eq!(uri.extension().unwrap().full(), "csv.gz");
//! ```

mod error;
pub mod guess;
mod parse;
mod root;
mod scheme;
mod uri;

pub use error::{Error, Result};
pub use guess::{Guess, guess_scheme};
pub use parse::{Components, decompose, parse};
pub use root::{FixedRoot, PackageRoot};
pub use scheme::{PACKAGE_SCHEME, Scheme};
pub use uri::{Authority, Extension, Uri, UriPath};
