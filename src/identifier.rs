//! Cluster references
//!
//! Users name clusters either fully qualified as `<project-id>:<name>` or
//! bare as `<name>`. A bare name is only usable when it is unique across
//! the organization; resolution against a topology snapshot either fills in
//! the one owning project or reports every candidate.

use std::fmt;

use crate::error::{Error, Result};
use crate::topology::TopologyCache;

/// Project ids are 24-character hexadecimal tokens.
pub const PROJECT_ID_LEN: usize = 24;

/// Exactly 24 hexadecimal characters, upper or lower case.
pub fn validate_project_id(project_id: &str) -> Result<()> {
    if project_id.len() != PROJECT_ID_LEN
        || !project_id.chars().all(|c| c.is_ascii_hexdigit())
    {
        return Err(Error::InvalidProjectId(project_id.to_string()));
    }
    Ok(())
}

/// ASCII letters, digits and '-', at least one character.
pub fn validate_cluster_name(cluster_name: &str) -> Result<()> {
    if cluster_name.is_empty()
        || !cluster_name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
    {
        return Err(Error::InvalidClusterName(cluster_name.to_string()));
    }
    Ok(())
}

/// A parsed, validated user reference; the project id may still be missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterRef {
    pub project_id: Option<String>,
    pub name: String,
}

/// A fully qualified `(project-id, cluster-name)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterId {
    pub project_id: String,
    pub name: String,
}

impl fmt::Display for ClusterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.project_id, self.name)
    }
}

impl ClusterRef {
    /// Split on the first ':'. With a separator the left part must be a
    /// project id and the right a cluster name; without, the whole input is
    /// a cluster name. Validation happens here, before any lookup.
    pub fn parse(input: &str) -> Result<Self> {
        match input.split_once(':') {
            Some((project_id, name)) => {
                validate_project_id(project_id)?;
                validate_cluster_name(name)?;
                Ok(Self {
                    project_id: Some(project_id.to_string()),
                    name: name.to_string(),
                })
            }
            None => {
                validate_cluster_name(input)?;
                Ok(Self {
                    project_id: None,
                    name: input.to_string(),
                })
            }
        }
    }

    /// Resolve against a snapshot. Pure function of the snapshot and the
    /// reference: the same inputs always produce the same outcome.
    ///
    /// Qualified references are confirmed (known project, cluster present in
    /// that project). Bare names resolve through the snapshot's candidate
    /// set: zero candidates is unknown, one resolves, several is ambiguous
    /// and the error carries them all.
    pub fn resolve(&self, topology: &TopologyCache) -> Result<ClusterId> {
        match &self.project_id {
            Some(project_id) => {
                if !topology.is_project_id(project_id) {
                    return Err(Error::ProjectNotFound(project_id.clone()));
                }
                if topology.clusters_named(&self.name, Some(project_id)).is_empty() {
                    return Err(Error::ClusterNotFoundInProject {
                        project_id: project_id.clone(),
                        name: self.name.clone(),
                    });
                }
                Ok(ClusterId {
                    project_id: project_id.clone(),
                    name: self.name.clone(),
                })
            }
            None => {
                let mut candidates = topology.cluster_project_ids(&self.name);
                match candidates.len() {
                    0 => Err(Error::ClusterNotFound(self.name.clone())),
                    1 => Ok(ClusterId {
                        project_id: candidates.remove(0),
                        name: self.name.clone(),
                    }),
                    _ => Err(Error::Ambiguous {
                        name: self.name.clone(),
                        project_ids: candidates,
                    }),
                }
            }
        }
    }

    /// Parse and resolve in one step.
    pub fn resolve_str(input: &str, topology: &TopologyCache) -> Result<ClusterId> {
        Self::parse(input)?.resolve(topology)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::test_support::{cluster, project};

    const P1: &str = "5a0a1e7e0f2912c554080adc";
    const P2: &str = "6c819f1b87d9d6037bc2cdb1";

    fn snapshot() -> TopologyCache {
        TopologyCache::from_parts(
            vec![project(P1, "dev"), project(P2, "prod")],
            vec![
                cluster(P1, "Demo"),
                cluster(P1, "Analytics"),
                cluster(P2, "Demo"),
            ],
        )
    }

    #[test]
    fn project_id_validation_boundary() {
        assert!(validate_project_id(P1).is_ok());
        assert!(validate_project_id("5A0A1E7E0F2912C554080ADC").is_ok());
        // one short, one long, non-hex character
        assert!(validate_project_id(&P1[..23]).is_err());
        assert!(validate_project_id(&format!("{P1}f")).is_err());
        assert!(validate_project_id("5a0a1e7e0f2912c554080adg").is_err());
        assert!(validate_project_id("").is_err());
    }

    #[test]
    fn cluster_name_validation_boundary() {
        assert!(validate_cluster_name("Demo-Cluster-01").is_ok());
        assert!(validate_cluster_name("").is_err());
        assert!(validate_cluster_name("demo_cluster").is_err());
        assert!(validate_cluster_name("demo cluster").is_err());
        assert!(validate_cluster_name("demo:cluster").is_err());
    }

    #[test]
    fn parse_splits_on_the_first_colon() {
        let parsed = ClusterRef::parse(&format!("{P1}:Demo")).unwrap();
        assert_eq!(parsed.project_id.as_deref(), Some(P1));
        assert_eq!(parsed.name, "Demo");

        let bare = ClusterRef::parse("Demo").unwrap();
        assert_eq!(bare.project_id, None);
        assert_eq!(bare.name, "Demo");
    }

    #[test]
    fn parse_rejects_malformed_forms() {
        // qualified form with a bad project id
        assert!(matches!(
            ClusterRef::parse("deadbeef:Demo"),
            Err(Error::InvalidProjectId(_))
        ));
        // a second colon lands in the cluster name
        assert!(matches!(
            ClusterRef::parse(&format!("{P1}:Demo:extra")),
            Err(Error::InvalidClusterName(_))
        ));
        assert!(matches!(
            ClusterRef::parse(&format!("{P1}:")),
            Err(Error::InvalidClusterName(_))
        ));
        assert!(matches!(
            ClusterRef::parse(":Demo"),
            Err(Error::InvalidProjectId(_))
        ));
    }

    #[test]
    fn qualified_reference_resolves_directly() {
        let topo = snapshot();
        let resolved = ClusterRef::resolve_str(&format!("{P1}:Demo"), &topo).unwrap();
        assert_eq!(resolved.project_id, P1);
        assert_eq!(resolved.name, "Demo");
        assert_eq!(resolved.to_string(), format!("{P1}:Demo"));
    }

    #[test]
    fn qualified_reference_checks_project_then_cluster() {
        let topo = snapshot();
        assert!(matches!(
            ClusterRef::resolve_str("599eed989f78f769464d175c:Demo", &topo),
            Err(Error::ProjectNotFound(_))
        ));
        assert!(matches!(
            ClusterRef::resolve_str(&format!("{P2}:Analytics"), &topo),
            Err(Error::ClusterNotFoundInProject { .. })
        ));
    }

    #[test]
    fn unique_bare_name_auto_resolves() {
        let topo = snapshot();
        let resolved = ClusterRef::resolve_str("Analytics", &topo).unwrap();
        assert_eq!(resolved.project_id, P1);
        assert_eq!(resolved.name, "Analytics");
    }

    #[test]
    fn unknown_bare_name_is_not_found() {
        let topo = snapshot();
        assert!(matches!(
            ClusterRef::resolve_str("Missing", &topo),
            Err(Error::ClusterNotFound(_))
        ));
    }

    #[test]
    fn shared_bare_name_is_ambiguous_with_all_candidates() {
        let topo = snapshot();
        match ClusterRef::resolve_str("Demo", &topo) {
            Err(Error::Ambiguous { name, project_ids }) => {
                assert_eq!(name, "Demo");
                assert_eq!(project_ids, vec![P1.to_string(), P2.to_string()]);
            }
            other => panic!("expected Ambiguous, got {other:?}"),
        }
    }

    #[test]
    fn resolution_is_deterministic_over_an_unchanged_snapshot() {
        let topo = snapshot();
        let first = ClusterRef::resolve_str(&format!("{P2}:Demo"), &topo).unwrap();
        let second = ClusterRef::resolve_str(&format!("{P2}:Demo"), &topo).unwrap();
        assert_eq!(first, second);

        let bare_first = ClusterRef::resolve_str("Analytics", &topo).unwrap();
        let bare_second = ClusterRef::resolve_str("Analytics", &topo).unwrap();
        assert_eq!(bare_first, bare_second);
    }
}
