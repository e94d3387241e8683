//! Configuration loading and validation.

mod types;
mod validation;

pub use types::*;

use std::path::Path;

use crate::core::{ConnectionIdentity, MetadataSnapshot, ProbeQuery, RecordedProbe};
use crate::error::Result;

impl Config {
    /// Load configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        validation::validate(self)
    }

    /// A probe answering from the recorded responses.
    pub fn recorded_probe(&self) -> Result<RecordedProbe> {
        let mut probe = match self.probe.fail_with {
            Some(ref message) => RecordedProbe::failing(message.clone()),
            None => RecordedProbe::new(),
        };
        for (key, answer) in &self.probe.responses {
            probe = probe.with_response(key.parse::<ProbeQuery>()?, answer.clone());
        }
        Ok(probe)
    }
}

impl ConnectionConfig {
    /// The connection identity described by this section.
    pub fn identity(&self) -> ConnectionIdentity {
        let identity = ConnectionIdentity::new(&self.product_name, &self.product_version);
        if self.version_banner.is_none() && self.variables.is_empty() {
            return identity;
        }
        identity.with_snapshot(MetadataSnapshot {
            version_banner: self.version_banner.clone(),
            variables: self
                .variables
                .iter()
                .map(|(k, v)| (k.to_lowercase(), v.clone()))
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MetadataProbe;
    use crate::error::DialectError;

    const SAMPLE: &str = r#"
connection:
  product_name: MySQL
  product_version: 5.5.5-10.6.12-MariaDB
  variables:
    Version_Comment: mariadb.org binary distribution
probe:
  responses:
    "variable:version": 10.6.12-MariaDB-log
resolver:
  refine_identity: true
"#;

    #[test]
    fn test_from_yaml() {
        let config = Config::from_yaml(SAMPLE).unwrap();
        assert_eq!(config.connection.product_name, "MySQL");
        assert!(config.resolver.force_dialect.is_none());

        let identity = config.connection.identity();
        assert_eq!(
            identity.snapshot_answer(&ProbeQuery::variable("version_comment")),
            Some("mariadb.org binary distribution")
        );
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_yaml("connection:\n  product_name: Oracle\n").unwrap();
        assert!(config.resolver.refine_identity);
        assert!(config.probe.responses.is_empty());
        assert!(config.connection.identity().snapshot.is_none());
    }

    #[tokio::test]
    async fn test_recorded_probe_from_config() {
        let config = Config::from_yaml(SAMPLE).unwrap();
        let probe = config.recorded_probe().unwrap();
        let answer = probe.probe(&ProbeQuery::variable("version")).await.unwrap();
        assert_eq!(answer.as_deref(), Some("10.6.12-MariaDB-log"));
    }

    #[test]
    fn test_invalid_yaml() {
        let err = Config::from_yaml("connection: [").unwrap_err();
        assert!(matches!(err, DialectError::Yaml(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load("/nonexistent/dialect.yaml").unwrap_err();
        assert!(matches!(err, DialectError::Io(_)));
    }
}
