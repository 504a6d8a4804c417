use std::fmt;
use std::str::FromStr;

/// Name of the package-internal scheme (`swark:data/example.csv`)
pub const PACKAGE_SCHEME: &str = "swark";

/// Resource category of a locator.
///
/// `File` only appears while parsing: a resolved [`crate::Uri`] always
/// carries `FileAbsolute` or `FileRelative` instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Scheme {
    File,
    FileAbsolute,
    FileRelative,
    Python,
    Http,
    Https,
    Package,
}

impl Scheme {
    /// Every scheme accepted as an explicit prefix
    pub const ALL: [Scheme; 7] = [
        Scheme::File,
        Scheme::FileAbsolute,
        Scheme::FileRelative,
        Scheme::Python,
        Scheme::Http,
        Scheme::Https,
        Scheme::Package,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Scheme::File => "file",
            Scheme::FileAbsolute => "file-absolute",
            Scheme::FileRelative => "file-relative",
            Scheme::Python => "python",
            Scheme::Http => "http",
            Scheme::Https => "https",
            Scheme::Package => PACKAGE_SCHEME,
        }
    }

    /// Schemes whose path names something on a filesystem
    #[must_use]
    pub fn is_file_like(self) -> bool {
        matches!(
            self,
            Scheme::File | Scheme::FileAbsolute | Scheme::FileRelative | Scheme::Package
        )
    }

    /// Schemes addressed through a host
    #[must_use]
    pub fn is_network(self) -> bool {
        matches!(self, Scheme::Http | Scheme::Https)
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scheme {
    type Err = String;

    /// Scheme names are case-insensitive, as in RFC 3986.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        Scheme::ALL
            .into_iter()
            .find(|scheme| scheme.as_str() == lower)
            .ok_or_else(|| format!("unknown scheme '{s}'"))
    }
}
