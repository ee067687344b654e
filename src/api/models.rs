//! Typed wire records
//!
//! Listing items are validated into these structures at the fetch boundary
//! rather than passed around as loose JSON. Unknown cluster attributes are
//! kept in a flattened map so a fetched document can be re-serialized
//! losslessly (for display, or to seed a create config).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// Top-level tenant scope. Exactly one organization is visible per key pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organization {
    pub id: String,
    pub name: String,
}

/// A project (the API also calls these "groups"). Owns clusters; cluster
/// names are unique only within a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(rename = "orgId")]
    pub org_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ClusterState {
    Creating,
    Idle,
    Repairing,
    Deleting,
    /// States this client does not model; kept so new server-side states
    /// do not break deserialization.
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cluster {
    #[serde(rename = "groupId")]
    pub project_id: String,
    pub name: String,
    #[serde(rename = "stateName")]
    pub state: ClusterState,
    #[serde(default)]
    pub paused: bool,
    /// Remaining cluster attributes, passed through untouched.
    #[serde(flatten)]
    pub attributes: serde_json::Map<String, Value>,
}

impl Cluster {
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// `<project-id>:<name>`, the fully qualified form.
    pub fn qualified_name(&self) -> String {
        format!("{}:{}", self.project_id, self.name)
    }

    /// Human-readable state. While REPAIRING the state alone cannot tell
    /// pause from resume; the `paused` flag names the transition in flight,
    /// and callers poll until the state leaves REPAIRING.
    pub fn status_label(&self) -> &'static str {
        match self.state {
            ClusterState::Creating => "Creating...",
            ClusterState::Deleting => "Deleting...",
            ClusterState::Repairing => {
                if self.paused {
                    "Pausing..."
                } else {
                    "Resuming..."
                }
            }
            ClusterState::Idle => {
                if self.paused {
                    "Paused"
                } else {
                    "Running"
                }
            }
            ClusterState::Unknown => "Unknown",
        }
    }
}

/// Validate a wire document into a typed record. A document that does not
/// fit the record is a protocol mismatch, reported with the document itself.
pub(crate) fn record<T: serde::de::DeserializeOwned>(doc: Value) -> Result<T> {
    serde_json::from_value(doc.clone()).map_err(|_| Error::MalformedResponse { document: doc })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn demo_cluster(state: &str, paused: bool) -> Cluster {
        record(json!({
            "groupId": "5a0a1e7e0f2912c554080adc",
            "name": "Demo",
            "stateName": state,
            "paused": paused,
            "diskSizeGB": 100.0
        }))
        .unwrap()
    }

    #[test]
    fn cluster_deserializes_wire_names() {
        let cluster = demo_cluster("IDLE", false);
        assert_eq!(cluster.project_id, "5a0a1e7e0f2912c554080adc");
        assert_eq!(cluster.state, ClusterState::Idle);
        assert!(!cluster.is_paused());
        // extra attributes survive the round trip
        assert_eq!(cluster.attributes.get("diskSizeGB"), Some(&json!(100.0)));
    }

    #[test]
    fn repairing_label_follows_the_paused_flag() {
        assert_eq!(demo_cluster("REPAIRING", true).status_label(), "Pausing...");
        assert_eq!(demo_cluster("REPAIRING", false).status_label(), "Resuming...");
        assert_eq!(demo_cluster("IDLE", true).status_label(), "Paused");
        assert_eq!(demo_cluster("IDLE", false).status_label(), "Running");
    }

    #[test]
    fn unrecognized_states_deserialize_as_unknown() {
        let cluster = demo_cluster("UPDATING", false);
        assert_eq!(cluster.state, ClusterState::Unknown);
    }

    #[test]
    fn missing_paused_defaults_to_running() {
        let cluster: Cluster = record(json!({
            "groupId": "5a0a1e7e0f2912c554080adc",
            "name": "Demo",
            "stateName": "IDLE"
        }))
        .unwrap();
        assert!(!cluster.is_paused());
    }

    #[test]
    fn unfit_documents_report_as_malformed() {
        let err = record::<Cluster>(json!({"name": "Demo"})).unwrap_err();
        assert!(matches!(err, Error::MalformedResponse { .. }));
    }
}
