//! Connection identity as reported by the driver.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::probe::ProbeQuery;

/// Pre-fetched metadata that can answer refinement probes without a round
/// trip.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataSnapshot {
    /// Output of the server's version function (e.g. `SELECT version()`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_banner: Option<String>,

    /// Server variables (e.g. `version_comment`), keyed by lower-case name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub variables: BTreeMap<String, String>,
}

impl MetadataSnapshot {
    /// Answer a probe from the snapshot, if it holds the information.
    pub fn answer(&self, query: &ProbeQuery) -> Option<&str> {
        match query {
            ProbeQuery::VersionBanner => self.version_banner.as_deref(),
            ProbeQuery::ServerVariable(name) => {
                self.variables.get(&name.to_lowercase()).map(String::as_str)
            }
        }
    }
}

/// The product identity a connection reports. Read-only input to resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionIdentity {
    /// Driver-reported product name (e.g. "MySQL", "Microsoft SQL Server").
    pub product_name: String,

    /// Driver-reported product version string.
    #[serde(default)]
    pub product_version: String,

    /// Optional richer metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<MetadataSnapshot>,
}

impl ConnectionIdentity {
    pub fn new(product_name: impl Into<String>, product_version: impl Into<String>) -> Self {
        Self {
            product_name: product_name.into(),
            product_version: product_version.into(),
            snapshot: None,
        }
    }

    pub fn with_snapshot(mut self, snapshot: MetadataSnapshot) -> Self {
        self.snapshot = Some(snapshot);
        self
    }

    /// Record the version banner in the snapshot.
    pub fn with_version_banner(mut self, banner: impl Into<String>) -> Self {
        self.snapshot.get_or_insert_with(Default::default).version_banner = Some(banner.into());
        self
    }

    /// Record a server variable in the snapshot.
    pub fn with_variable(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.snapshot
            .get_or_insert_with(Default::default)
            .variables
            .insert(name.as_ref().to_lowercase(), value.into());
        self
    }

    /// Parsed product version, if the version string starts with digits.
    pub fn version(&self) -> Option<ProductVersion> {
        ProductVersion::parse(&self.product_version)
    }

    /// Answer a probe from the snapshot.
    pub fn snapshot_answer(&self, query: &ProbeQuery) -> Option<&str> {
        self.snapshot.as_ref().and_then(|s| s.answer(query))
    }
}

/// Leading numeric components of a product version string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ProductVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl ProductVersion {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self {
            major,
            minor,
            patch: 0,
        }
    }

    /// Parse the first run of dot-separated digits in `s`.
    ///
    /// `"5.5.5-10.6.12-MariaDB"` → 5.5.5, `"Oracle Database 19c"` → 19.0.0.
    pub fn parse(s: &str) -> Option<Self> {
        let start = s.find(|c: char| c.is_ascii_digit())?;
        let run: String = s[start..]
            .chars()
            .take_while(|c| c.is_ascii_digit() || *c == '.')
            .collect();

        let mut parts = run
            .split('.')
            .filter(|p| !p.is_empty())
            .map(|p| p.parse::<u32>().ok());

        let major = parts.next()??;
        let minor = parts.next().flatten().unwrap_or(0);
        let patch = parts.next().flatten().unwrap_or(0);

        Some(Self {
            major,
            minor,
            patch,
        })
    }
}

impl fmt::Display for ProductVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_parse() {
        assert_eq!(
            ProductVersion::parse("5.5.5-10.6.12-MariaDB"),
            Some(ProductVersion {
                major: 5,
                minor: 5,
                patch: 5
            })
        );
        assert_eq!(ProductVersion::parse("9.6"), Some(ProductVersion::new(9, 6)));
        assert_eq!(
            ProductVersion::parse("Oracle Database 19c Enterprise Edition"),
            Some(ProductVersion::new(19, 0))
        );
        assert_eq!(ProductVersion::parse("INFORMIX"), None);
        assert_eq!(ProductVersion::parse(""), None);
    }

    #[test]
    fn test_version_ordering() {
        assert!(ProductVersion::new(4, 0) < ProductVersion::new(4, 1));
        assert!(ProductVersion::parse("10.50.1600").unwrap() < ProductVersion::new(11, 0));
    }

    #[test]
    fn test_snapshot_answers() {
        let identity = ConnectionIdentity::new("MySQL", "8.0.36")
            .with_version_banner("8.0.36")
            .with_variable("Version_Comment", "MySQL Community Server - GPL");

        assert_eq!(
            identity.snapshot_answer(&ProbeQuery::VersionBanner),
            Some("8.0.36")
        );
        assert_eq!(
            identity.snapshot_answer(&ProbeQuery::variable("version_comment")),
            Some("MySQL Community Server - GPL")
        );
        assert_eq!(
            identity.snapshot_answer(&ProbeQuery::variable("version")),
            None
        );
    }

    #[test]
    fn test_no_snapshot_answers_nothing() {
        let identity = ConnectionIdentity::new("PostgreSQL", "16.2");
        assert_eq!(identity.snapshot_answer(&ProbeQuery::VersionBanner), None);
    }
}
