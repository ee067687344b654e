//! Topology snapshot
//!
//! A point-in-time view of every project and cluster reachable from the
//! organization, built by full enumeration and queried offline. The
//! snapshot is never updated incrementally: a mutation performed through
//! the API is invisible here until the caller populates a fresh snapshot.
//! That staleness is the documented contract.

use std::collections::BTreeMap;

use crate::api::models::{Cluster, Project};
use crate::api::ApiClient;
use crate::error::Result;

#[derive(Debug)]
pub struct TopologyCache {
    projects: BTreeMap<String, Project>,
    clusters: BTreeMap<String, Vec<Cluster>>,
}

impl TopologyCache {
    /// Build a snapshot: one paged listing for the projects, then one paged
    /// listing per project for its clusters, strictly sequential. Cost is
    /// O(projects) listing calls.
    pub async fn populate(client: &ApiClient) -> Result<Self> {
        let mut projects = BTreeMap::new();
        for project in client.projects().await? {
            projects.insert(project.id.clone(), project);
        }

        let mut clusters = BTreeMap::new();
        for project_id in projects.keys() {
            clusters.insert(project_id.clone(), client.clusters(project_id).await?);
        }

        let snapshot = Self { projects, clusters };
        tracing::debug!(
            projects = snapshot.project_count(),
            clusters = snapshot.cluster_count(),
            "topology snapshot populated"
        );
        Ok(snapshot)
    }

    /// Assemble a snapshot from already-fetched records. Used for offline
    /// queries and by tests.
    pub fn from_parts(projects: Vec<Project>, clusters: Vec<Cluster>) -> Self {
        let mut project_index = BTreeMap::new();
        let mut cluster_index: BTreeMap<String, Vec<Cluster>> = BTreeMap::new();
        for project in projects {
            cluster_index.entry(project.id.clone()).or_default();
            project_index.insert(project.id.clone(), project);
        }
        for cluster in clusters {
            cluster_index
                .entry(cluster.project_id.clone())
                .or_default()
                .push(cluster);
        }
        Self {
            projects: project_index,
            clusters: cluster_index,
        }
    }

    pub fn is_project_id(&self, project_id: &str) -> bool {
        self.projects.contains_key(project_id)
    }

    /// True if any project in the snapshot contains a cluster so named.
    pub fn is_cluster_name(&self, cluster_name: &str) -> bool {
        self.all_clusters().any(|c| c.name == cluster_name)
    }

    /// Clusters with the given name. With a project id at most one match;
    /// without, every project's match (cluster names are unique only within
    /// a project).
    pub fn clusters_named(&self, cluster_name: &str, project_id: Option<&str>) -> Vec<&Cluster> {
        self.all_clusters()
            .filter(|c| c.name == cluster_name)
            .filter(|c| project_id.is_none_or(|id| c.project_id == id))
            .collect()
    }

    /// Distinct project ids containing a cluster with the given name, in
    /// stable (lexicographic) order. Drives bare-name disambiguation.
    pub fn cluster_project_ids(&self, cluster_name: &str) -> Vec<String> {
        self.clusters
            .iter()
            .filter(|(_, clusters)| clusters.iter().any(|c| c.name == cluster_name))
            .map(|(project_id, _)| project_id.clone())
            .collect()
    }

    pub fn project_id(&self, project_name: &str) -> Option<&str> {
        self.projects
            .values()
            .find(|p| p.name == project_name)
            .map(|p| p.id.as_str())
    }

    pub fn project_name(&self, project_id: &str) -> Option<&str> {
        self.projects.get(project_id).map(|p| p.name.as_str())
    }

    pub fn projects(&self) -> impl Iterator<Item = &Project> {
        self.projects.values()
    }

    /// Clusters of one project; empty when the project is absent.
    pub fn clusters_in(&self, project_id: &str) -> &[Cluster] {
        self.clusters
            .get(project_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn all_clusters(&self) -> impl Iterator<Item = &Cluster> {
        self.clusters.values().flatten()
    }

    pub fn project_count(&self) -> usize {
        self.projects.len()
    }

    pub fn cluster_count(&self) -> usize {
        self.clusters.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use serde_json::Map;

    use crate::api::models::{Cluster, ClusterState, Project};

    pub fn project(id: &str, name: &str) -> Project {
        Project {
            id: id.to_string(),
            name: name.to_string(),
            org_id: "599eed989f78f769464d175c".to_string(),
        }
    }

    pub fn cluster(project_id: &str, name: &str) -> Cluster {
        Cluster {
            project_id: project_id.to_string(),
            name: name.to_string(),
            state: ClusterState::Idle,
            paused: false,
            attributes: Map::new(),
        }
    }
}
