//! Configuration type definitions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Identity the connection reports.
    #[serde(default)]
    pub connection: ConnectionConfig,

    /// Recorded answers to refinement probes.
    #[serde(default)]
    pub probe: ProbeConfig,

    /// Resolution behavior.
    #[serde(default)]
    pub resolver: ResolverConfig,
}

/// Driver-reported identity plus any pre-fetched metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Product name (e.g. "MySQL", "Microsoft SQL Server").
    #[serde(default)]
    pub product_name: String,

    /// Product version string.
    #[serde(default)]
    pub product_version: String,

    /// Version banner already fetched by the caller.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_banner: Option<String>,

    /// Server variables already fetched by the caller.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub variables: BTreeMap<String, String>,
}

/// Canned probe responses, standing in for a live connection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Answers keyed by probe name: `version_banner` or `variable:<name>`.
    #[serde(default)]
    pub responses: BTreeMap<String, String>,

    /// When set, every probe fails with this message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fail_with: Option<String>,
}

/// Resolution behavior configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Use this registered dialect instead of matching the product name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub force_dialect: Option<String>,

    /// Run identity refinement after matching (default: true).
    #[serde(default = "default_true")]
    pub refine_identity: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            force_dialect: None,
            refine_identity: true,
        }
    }
}

fn default_true() -> bool {
    true
}
