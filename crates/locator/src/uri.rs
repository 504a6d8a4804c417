use crate::parse::has_drive_prefix;
use crate::{Error, PackageRoot, Result, Scheme};
use std::fmt;
use std::path::PathBuf;

/// Host part of a network locator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authority {
    pub username: Option<String>,
    pub password: Option<String>,
    pub host: String,
    pub port: Option<u16>,
}

impl fmt::Display for Authority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(user) = &self.username {
            f.write_str(user)?;
            if let Some(password) = &self.password {
                write!(f, ":{password}")?;
            }
            f.write_str("@")?;
        }
        f.write_str(&self.host)?;
        if let Some(port) = self.port {
            write!(f, ":{port}")?;
        }
        Ok(())
    }
}

/// Normalized path: no empty or `.` components
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UriPath {
    absolute: bool,
    segments: Vec<String>,
}

impl UriPath {
    /// Split `raw` on slashes, dropping empty and `.` components.
    #[must_use]
    pub fn from_str_parts(raw: &str, absolute: bool) -> Self {
        let segments = raw
            .split('/')
            .filter(|seg| !seg.is_empty() && *seg != ".")
            .map(str::to_string)
            .collect();
        Self { absolute, segments }
    }

    #[must_use]
    pub fn relative(segments: Vec<String>) -> Self {
        Self {
            absolute: false,
            segments,
        }
    }

    #[must_use]
    pub fn is_absolute(&self) -> bool {
        self.absolute
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Final component, if any
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// Slash-joined form; absolute paths get a leading slash unless they
    /// start with a drive letter.
    #[must_use]
    pub fn joined(&self) -> String {
        let body = self.segments.join("/");
        let drive = self
            .segments
            .first()
            .is_some_and(|first| has_drive_prefix(first));
        if self.absolute && !drive {
            format!("/{body}")
        } else {
            body
        }
    }
}

impl fmt::Display for UriPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.joined())
    }
}

/// Dotted suffix of a file name, e.g. `csv.gz` for `table.csv.gz`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Extension {
    full: String,
}

impl Extension {
    /// Extension of a single file name. Leading dots belong to the stem, so
    /// `.profile` has no extension and `.env.yaml` has `yaml`.
    #[must_use]
    pub fn of(file_name: &str) -> Option<Self> {
        let stem_start = file_name.len() - file_name.trim_start_matches('.').len();
        let name = &file_name[stem_start..];
        let (_, full) = name.split_once('.')?;
        if full.is_empty() || full.split('.').any(str::is_empty) {
            return None;
        }
        Some(Self {
            full: full.to_ascii_lowercase(),
        })
    }

    /// Everything after the first dot: `csv.gz`
    #[must_use]
    pub fn full(&self) -> &str {
        &self.full
    }

    /// Token before the first dot of `full`: `csv`
    #[must_use]
    pub fn root(&self) -> &str {
        self.full.split('.').next().unwrap_or(&self.full)
    }

    /// Token after the last dot of `full`: `gz`
    #[must_use]
    pub fn absolute(&self) -> &str {
        self.full.rsplit('.').next().unwrap_or(&self.full)
    }
}

impl fmt::Display for Extension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full)
    }
}

/// Canonical, scheme-qualified form of a locator.
///
/// Built by [`crate::parse`]; immutable afterwards. Equality ignores the
/// original locator text.
#[derive(Debug, Clone)]
pub struct Uri {
    locator: String,
    scheme: Scheme,
    authority: Option<Authority>,
    path: UriPath,
    query: Option<String>,
    fragment: Option<String>,
}

impl PartialEq for Uri {
    fn eq(&self, other: &Self) -> bool {
        self.scheme == other.scheme
            && self.authority == other.authority
            && self.path == other.path
            && self.query == other.query
            && self.fragment == other.fragment
    }
}

impl Eq for Uri {}

impl Uri {
    pub(crate) fn new(
        locator: &str,
        scheme: Scheme,
        authority: Option<Authority>,
        path: UriPath,
        query: Option<String>,
        fragment: Option<String>,
    ) -> Self {
        Self {
            locator: locator.to_string(),
            scheme,
            authority,
            path,
            query,
            fragment,
        }
    }

    /// The string this URI was parsed from
    #[must_use]
    pub fn locator(&self) -> &str {
        &self.locator
    }

    #[must_use]
    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    #[must_use]
    pub fn authority(&self) -> Option<&Authority> {
        self.authority.as_ref()
    }

    #[must_use]
    pub fn path(&self) -> &UriPath {
        &self.path
    }

    #[must_use]
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    #[must_use]
    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }

    /// Extension of the final path component. Python object paths never
    /// have one.
    #[must_use]
    pub fn extension(&self) -> Option<Extension> {
        match self.scheme {
            Scheme::Python => None,
            _ => self.path.file_name().and_then(Extension::of),
        }
    }

    /// Dotted object path of a `python:` locator
    #[must_use]
    pub fn object_path(&self) -> Option<String> {
        (self.scheme == Scheme::Python).then(|| self.path.segments().join("."))
    }

    fn suffix(&self) -> String {
        let mut out = String::new();
        if let Some(query) = &self.query {
            out.push('?');
            out.push_str(query);
        }
        if let Some(fragment) = &self.fragment {
            out.push('#');
            out.push_str(fragment);
        }
        out
    }

    /// String handed to the stream layer: a plain path for files, a URL for
    /// network resources, `scheme://...` for the in-process schemes.
    #[must_use]
    pub fn fsspec(&self) -> String {
        match self.scheme {
            Scheme::File | Scheme::FileAbsolute | Scheme::FileRelative => self.path.joined(),
            Scheme::Python => format!("python://{}", self.path.segments().join(".")),
            Scheme::Package => format!("{}://{}", self.scheme, self.path.joined()),
            Scheme::Http | Scheme::Https => {
                let authority = self
                    .authority
                    .as_ref()
                    .map(ToString::to_string)
                    .unwrap_or_default();
                format!("{}://{authority}{}{}", self.scheme, self.path.joined(), self.suffix())
            }
        }
    }

    /// Filesystem path for file-like schemes. Relative files stay relative
    /// to the working directory; package files resolve under `root`.
    #[must_use]
    pub fn local_path(&self, root: &dyn PackageRoot) -> Option<PathBuf> {
        match self.scheme {
            Scheme::File | Scheme::FileAbsolute | Scheme::FileRelative => {
                Some(PathBuf::from(self.path.joined()))
            }
            Scheme::Package => Some(
                self.path
                    .segments()
                    .iter()
                    .fold(root.root(), |acc, seg| acc.join(seg)),
            ),
            Scheme::Python | Scheme::Http | Scheme::Https => None,
        }
    }

    /// Network URL for `http`/`https` locators
    pub fn to_url(&self) -> Result<url::Url> {
        if !self.scheme.is_network() {
            return Err(Error::parse(
                &self.locator,
                format!("{} locators have no network address", self.scheme),
            ));
        }
        url::Url::parse(&self.fsspec()).map_err(|e| Error::parse(&self.locator, e.to_string()))
    }
}

impl fmt::Display for Uri {
    /// Canonical locator; parsing it yields an equal `Uri`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.scheme {
            Scheme::Http | Scheme::Https => f.write_str(&self.fsspec()),
            Scheme::File | Scheme::FileAbsolute => {
                write!(f, "file:///{}{}", self.path.segments().join("/"), self.suffix())
            }
            Scheme::FileRelative => {
                write!(f, "{}:{}{}", self.scheme, self.path.joined(), self.suffix())
            }
            Scheme::Python | Scheme::Package => write!(f, "{}{}", self.fsspec(), self.suffix()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_views() {
        let ext = Extension::of("table.csv.gz").unwrap();
        assert_eq!(ext.full(), "csv.gz");
        assert_eq!(ext.root(), "csv");
        assert_eq!(ext.absolute(), "gz");

        let ext = Extension::of("notes.txt").unwrap();
        assert_eq!(ext.root(), "txt");
        assert_eq!(ext.absolute(), "txt");
    }

    #[test]
    fn test_extension_edge_cases() {
        assert_eq!(Extension::of("Makefile"), None);
        assert_eq!(Extension::of(".profile"), None);
        assert_eq!(Extension::of("trailing."), None);
        assert_eq!(Extension::of(".env.yaml").unwrap().full(), "yaml");
        assert_eq!(Extension::of("DATA.CSV").unwrap().full(), "csv");
    }

    #[test]
    fn test_path_collapses_slashes() {
        let path = UriPath::from_str_parts("///path/to///file//", true);
        assert_eq!(path.joined(), "/path/to/file");
        assert_eq!(path.file_name(), Some("file"));

        let path = UriPath::from_str_parts("./data/x.csv", false);
        assert_eq!(path.joined(), "data/x.csv");
    }

    #[test]
    fn test_drive_paths_keep_no_leading_slash() {
        let path = UriPath::from_str_parts("C:/data/x.csv", true);
        assert_eq!(path.joined(), "C:/data/x.csv");
    }

    #[test]
    fn test_authority_display() {
        let authority = Authority {
            username: Some("u".into()),
            password: Some("p".into()),
            host: "example.com".into(),
            port: Some(8080),
        };
        assert_eq!(authority.to_string(), "u:p@example.com:8080");
    }
}
