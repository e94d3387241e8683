//! Metadata probes issued against a live connection during refinement.
//!
//! Connection management is owned by the caller: it implements
//! [`MetadataProbe`] on top of whatever client it uses. This layer never
//! retries and imposes no timeout; a failed probe surfaces as
//! [`DialectError::Connection`].

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{DialectError, Result};

/// A single piece of server metadata a refinement rule can ask for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeQuery {
    /// Result of the server's version function.
    VersionBanner,
    /// Value of a named server variable.
    ServerVariable(String),
}

impl ProbeQuery {
    pub fn variable(name: impl Into<String>) -> Self {
        ProbeQuery::ServerVariable(name.into())
    }

    /// SQL a probe implementation would typically run to answer this query.
    pub fn sql(&self) -> String {
        match self {
            ProbeQuery::VersionBanner => "SELECT version()".to_string(),
            ProbeQuery::ServerVariable(name) => {
                format!("SHOW VARIABLES LIKE '{}'", name.replace('\'', "''"))
            }
        }
    }
}

impl fmt::Display for ProbeQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeQuery::VersionBanner => f.write_str("version_banner"),
            ProbeQuery::ServerVariable(name) => write!(f, "variable:{}", name),
        }
    }
}

impl FromStr for ProbeQuery {
    type Err = DialectError;

    /// Parses the [`Display`](fmt::Display) form: `version_banner` or
    /// `variable:<name>`.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s == "version_banner" {
            return Ok(ProbeQuery::VersionBanner);
        }
        match s.strip_prefix("variable:") {
            Some(name) if !name.is_empty() => Ok(ProbeQuery::variable(name.to_lowercase())),
            _ => Err(DialectError::Config(format!(
                "unknown probe '{}' (expected 'version_banner' or 'variable:<name>')",
                s
            ))),
        }
    }
}

/// Answers metadata probes against a live connection.
#[async_trait]
pub trait MetadataProbe: Send + Sync {
    /// Fetch one piece of metadata. `Ok(None)` means the server has no
    /// answer (e.g. unknown variable); errors mean the round trip failed.
    async fn probe(&self, query: &ProbeQuery) -> Result<Option<String>>;
}

/// A [`MetadataProbe`] backed by canned responses.
#[derive(Debug, Default)]
pub struct RecordedProbe {
    responses: HashMap<ProbeQuery, String>,
    failure: Option<String>,
    calls: AtomicUsize,
}

impl RecordedProbe {
    pub fn new() -> Self {
        Self::default()
    }

    /// A probe whose every call fails with a connection error.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn with_response(mut self, query: ProbeQuery, answer: impl Into<String>) -> Self {
        self.responses.insert(query, answer.into());
        self
    }

    /// Number of probes issued so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MetadataProbe for RecordedProbe {
    async fn probe(&self, query: &ProbeQuery) -> Result<Option<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(ref message) = self.failure {
            return Err(DialectError::Connection(format!(
                "probe '{}' failed: {}",
                query, message
            )));
        }
        Ok(self.responses.get(query).cloned())
    }
}
