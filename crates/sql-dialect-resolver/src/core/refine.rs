//! Identity refinement: detecting an engine that rides on another's driver.
//!
//! Some products speak another engine's wire protocol and report that
//! engine's product name (Greenplum and Redshift through the PostgreSQL
//! driver, MariaDB and Infobright through the MySQL driver). Refinement runs
//! once, right after the matched factory builds its descriptor:
//!
//! 1. rules are evaluated in declaration order (nearest overlay first);
//! 2. each rule's probe is answered from the identity snapshot when it can
//!    be, otherwise by one probe against the live connection;
//! 3. the first rule whose answer contains its needle (case-insensitively)
//!    wins and names the engine to re-tag to.
//!
//! Each distinct probe is issued at most once per refinement.

use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use super::identity::ConnectionIdentity;
use super::probe::{MetadataProbe, ProbeQuery};
use crate::error::Result;

/// "If `probe` mentions `needle`, the engine is really `detected`."
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImpersonationRule {
    pub probe: ProbeQuery,
    pub needle: &'static str,
    pub detected: &'static str,
}

impl ImpersonationRule {
    pub fn new(probe: ProbeQuery, needle: &'static str, detected: &'static str) -> Self {
        Self {
            probe,
            needle,
            detected,
        }
    }

    /// Whether a probe answer identifies the detected engine.
    pub fn matches(&self, answer: &str) -> bool {
        answer.to_lowercase().contains(&self.needle.to_lowercase())
    }
}

/// Evaluate `rules` using only the identity's snapshot.
pub(crate) fn detect_from_snapshot<'a>(
    rules: &'a [ImpersonationRule],
    identity: &ConnectionIdentity,
) -> Option<&'a ImpersonationRule> {
    rules.iter().find(|rule| {
        let hit = identity
            .snapshot_answer(&rule.probe)
            .is_some_and(|answer| rule.matches(answer));
        debug!(probe = %rule.probe, needle = rule.needle, hit, "snapshot refinement rule");
        hit
    })
}

/// Evaluate `rules`, probing the live connection for answers the snapshot
/// lacks. Probe failures propagate unchanged.
pub(crate) async fn detect_with_probe<'a>(
    rules: &'a [ImpersonationRule],
    identity: &ConnectionIdentity,
    probe: &dyn MetadataProbe,
) -> Result<Option<&'a ImpersonationRule>> {
    let mut answers: HashMap<&ProbeQuery, Option<String>> = HashMap::new();

    for rule in rules {
        let answer = match identity.snapshot_answer(&rule.probe) {
            Some(answer) => Some(answer.to_string()),
            None => {
                if !answers.contains_key(&rule.probe) {
                    debug!(probe = %rule.probe, sql = %rule.probe.sql(), "probing connection");
                    let fetched = probe.probe(&rule.probe).await?;
                    answers.insert(&rule.probe, fetched);
                }
                answers.get(&rule.probe).cloned().flatten()
            }
        };

        let hit = answer.as_deref().is_some_and(|a| rule.matches(a));
        debug!(probe = %rule.probe, needle = rule.needle, hit, "refinement rule");
        if hit {
            return Ok(Some(rule));
        }
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::probe::RecordedProbe;
    use crate::error::DialectError;

    fn pg_rules() -> Vec<ImpersonationRule> {
        vec![
            ImpersonationRule::new(ProbeQuery::VersionBanner, "Greenplum", "greenplum"),
            ImpersonationRule::new(ProbeQuery::VersionBanner, "Redshift", "redshift"),
        ]
    }

    #[test]
    fn test_rule_match_is_case_insensitive() {
        let rule = ImpersonationRule::new(ProbeQuery::VersionBanner, "MariaDB", "mariadb");
        assert!(rule.matches("5.5.5-10.6.12-mariadb-log"));
        assert!(!rule.matches("8.0.36"));
    }

    #[test]
    fn test_snapshot_detection() {
        let rules = pg_rules();
        let identity = ConnectionIdentity::new("PostgreSQL", "8.0.2")
            .with_version_banner("PostgreSQL 8.0.2 on i686-pc-linux-gnu, Redshift 1.0.77467");
        let hit = detect_from_snapshot(&rules, &identity).unwrap();
        assert_eq!(hit.detected, "redshift");

        let plain = ConnectionIdentity::new("PostgreSQL", "16.2");
        assert!(detect_from_snapshot(&rules, &plain).is_none());
    }

    #[tokio::test]
    async fn test_probe_issued_once_per_query() {
        let rules = pg_rules();
        let identity = ConnectionIdentity::new("PostgreSQL", "16.2");
        let probe =
            RecordedProbe::new().with_response(ProbeQuery::VersionBanner, "PostgreSQL 16.2");

        let hit = detect_with_probe(&rules, &identity, &probe).await.unwrap();
        assert!(hit.is_none());
        assert_eq!(probe.call_count(), 1);
    }

    #[tokio::test]
    async fn test_snapshot_wins_over_probe() {
        let rules = pg_rules();
        let identity = ConnectionIdentity::new("PostgreSQL", "8.2.15")
            .with_version_banner("PostgreSQL 8.2.15 (Greenplum Database 4.3.8.1 build 1)");
        let probe = RecordedProbe::failing("must not be called");

        let hit = detect_with_probe(&rules, &identity, &probe).await.unwrap();
        assert_eq!(hit.unwrap().detected, "greenplum");
        assert_eq!(probe.call_count(), 0);
    }

    #[tokio::test]
    async fn test_probe_failure_propagates() {
        let rules = pg_rules();
        let identity = ConnectionIdentity::new("PostgreSQL", "16.2");
        let probe = RecordedProbe::failing("broken pipe");

        let err = detect_with_probe(&rules, &identity, &probe).await.unwrap_err();
        assert!(matches!(err, DialectError::Connection(_)));
        assert_eq!(probe.call_count(), 1);
    }
}
