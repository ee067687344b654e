//! Atlas API client
//!
//! Typed resource operations over [`HttpTransport`]: organizations at
//! `/orgs`, projects at `/groups`, clusters at `/groups/{id}/clusters`.
//! Listings go through [`Pager`]; single-resource lookups can be memoized
//! through [`LookupCache`] with its valid-until-clear contract.

use serde_json::{json, Value};

use super::auth::ApiKey;
use super::cache::LookupCache;
use super::http::{HttpTransport, DEFAULT_BASE_URL};
use super::models::{record, Cluster, Organization, Project};
use super::pager::{Pager, DEFAULT_ITEMS_PER_PAGE};
use crate::error::{Error, Result};

/// Fields the API owns and refuses on create: stripped when replaying a
/// fetched cluster document as a create config.
const SERVER_OWNED_FIELDS: &[&str] = &[
    "connectionStrings",
    "replicationSpecs",
    "mongoURI",
    "mongoURIWithOptions",
    "mongoURIUpdated",
    "paused",
    "stateName",
    "id",
    "links",
];

pub struct ApiClient {
    transport: HttpTransport,
    cache: LookupCache,
    page_size: usize,
}

impl ApiClient {
    pub fn new(key: ApiKey) -> Result<Self> {
        Self::with_base_url(key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(key: ApiKey, base_url: &str) -> Result<Self> {
        Ok(Self {
            transport: HttpTransport::with_base_url(key, base_url)?,
            cache: LookupCache::new(),
            page_size: DEFAULT_ITEMS_PER_PAGE,
        })
    }

    /// Items requested per listing page. The API caps this at 500.
    pub fn with_page_size(mut self, page_size: usize) -> Result<Self> {
        if !(1..=500).contains(&page_size) {
            return Err(Error::Config(format!(
                "page size must be between 1 and 500, got {page_size}"
            )));
        }
        self.page_size = page_size;
        Ok(self)
    }

    pub fn transport(&self) -> &HttpTransport {
        &self.transport
    }

    fn project_path(project_id: &str) -> String {
        format!("/groups/{project_id}")
    }

    fn clusters_path(project_id: &str) -> String {
        format!("/groups/{project_id}/clusters")
    }

    fn cluster_path(project_id: &str, cluster_name: &str) -> String {
        format!("/groups/{project_id}/clusters/{cluster_name}")
    }

    fn pager(&self, path: String) -> Pager<'_> {
        Pager::new(&self.transport, path).with_items_per_page(self.page_size)
    }

    // =========================================================================
    // Organizations
    // =========================================================================

    /// The organization associated with the key pair. The API restricts one
    /// organization per programmatic key, so the first listed entry is it.
    pub async fn organization(&self) -> Result<Organization> {
        let mut pager = self.pager("/orgs".to_string());
        match pager.try_next().await? {
            Some(doc) => record(doc),
            None => Err(Error::NoOrganization),
        }
    }

    // =========================================================================
    // Projects
    // =========================================================================

    /// All projects in the organization, across however many pages the
    /// listing spans.
    pub async fn projects(&self) -> Result<Vec<Project>> {
        let mut pager = self.pager("/groups".to_string());
        let mut projects = Vec::new();
        while let Some(doc) = pager.try_next().await? {
            projects.push(record(doc)?);
        }
        Ok(projects)
    }

    pub async fn project(&self, project_id: &str) -> Result<Project> {
        record(self.transport.get(&Self::project_path(project_id)).await?)
    }

    pub async fn create_project(&self, org_id: &str, name: &str) -> Result<Project> {
        record(
            self.transport
                .post("/groups", &json!({"name": name, "orgId": org_id}))
                .await?,
        )
    }

    pub async fn delete_project(&self, project_id: &str) -> Result<Value> {
        self.transport.delete(&Self::project_path(project_id)).await
    }

    // =========================================================================
    // Clusters
    // =========================================================================

    /// All clusters in one project, across pages.
    pub async fn clusters(&self, project_id: &str) -> Result<Vec<Cluster>> {
        let mut pager = self.pager(Self::clusters_path(project_id));
        let mut clusters = Vec::new();
        while let Some(doc) = pager.try_next().await? {
            clusters.push(record(doc)?);
        }
        Ok(clusters)
    }

    pub async fn cluster(&self, project_id: &str, cluster_name: &str) -> Result<Cluster> {
        record(
            self.transport
                .get(&Self::cluster_path(project_id, cluster_name))
                .await?,
        )
    }

    pub async fn create_cluster(&self, project_id: &str, config: &Value) -> Result<Cluster> {
        record(
            self.transport
                .post(&Self::clusters_path(project_id), config)
                .await?,
        )
    }

    pub async fn modify_cluster(
        &self,
        project_id: &str,
        cluster_name: &str,
        modifications: &Value,
    ) -> Result<Cluster> {
        record(
            self.transport
                .patch(&Self::cluster_path(project_id, cluster_name), modifications)
                .await?,
        )
    }

    pub async fn delete_cluster(&self, project_id: &str, cluster_name: &str) -> Result<Value> {
        self.transport
            .delete(&Self::cluster_path(project_id, cluster_name))
            .await
    }

    pub async fn pause(&self, project_id: &str, cluster_name: &str) -> Result<Cluster> {
        self.modify_cluster(project_id, cluster_name, &json!({"paused": true}))
            .await
    }

    pub async fn resume(&self, project_id: &str, cluster_name: &str) -> Result<Cluster> {
        self.modify_cluster(project_id, cluster_name, &json!({"paused": false}))
            .await
    }

    // =========================================================================
    // Memoized lookups
    // =========================================================================

    /// Like [`ApiClient::project`], but served from the lookup cache after
    /// the first fetch. Stale until [`ApiClient::clear_cache`].
    pub async fn cached_project(&self, project_id: &str) -> Result<Project> {
        record(self.cached_get(&Self::project_path(project_id)).await?)
    }

    /// Like [`ApiClient::cluster`], but served from the lookup cache after
    /// the first fetch. Stale until [`ApiClient::clear_cache`].
    pub async fn cached_cluster(&self, project_id: &str, cluster_name: &str) -> Result<Cluster> {
        record(
            self.cached_get(&Self::cluster_path(project_id, cluster_name))
                .await?,
        )
    }

    async fn cached_get(&self, path: &str) -> Result<Value> {
        if let Some(doc) = self.cache.get(path) {
            return Ok(doc);
        }
        let doc = self.transport.get(path).await?;
        self.cache.insert(path.to_string(), doc.clone());
        Ok(doc)
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    // =========================================================================
    // Config helpers
    // =========================================================================

    /// Strip the server-owned fields from a fetched cluster document so it
    /// can be replayed as a create config.
    pub fn strip_cluster_config(config: &Value) -> Value {
        match config {
            Value::Object(map) => {
                let stripped = map
                    .iter()
                    .filter(|(key, _)| !SERVER_OWNED_FIELDS.contains(&key.as_str()))
                    .map(|(key, value)| (key.clone(), value.clone()))
                    .collect();
                Value::Object(stripped)
            }
            other => other.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_removes_server_owned_fields() {
        let fetched = json!({
            "name": "Demo",
            "diskSizeGB": 100.0,
            "paused": true,
            "stateName": "IDLE",
            "mongoURI": "mongodb://demo.example.net",
            "connectionStrings": {"standard": "mongodb://demo.example.net"},
            "links": []
        });
        let config = ApiClient::strip_cluster_config(&fetched);
        assert_eq!(
            config,
            json!({"name": "Demo", "diskSizeGB": 100.0})
        );
    }

    #[test]
    fn page_size_bounds_are_enforced() {
        let client = ApiClient::new(ApiKey::new("pub", "priv")).unwrap();
        assert!(matches!(
            client.with_page_size(0),
            Err(Error::Config(_))
        ));
        let client = ApiClient::new(ApiKey::new("pub", "priv")).unwrap();
        assert!(matches!(
            client.with_page_size(501),
            Err(Error::Config(_))
        ));
        let client = ApiClient::new(ApiKey::new("pub", "priv")).unwrap();
        assert!(client.with_page_size(500).is_ok());
    }

    #[test]
    fn cluster_paths_are_scoped_by_project() {
        assert_eq!(
            ApiClient::cluster_path("5a0a1e7e0f2912c554080adc", "Demo"),
            "/groups/5a0a1e7e0f2912c554080adc/clusters/Demo"
        );
    }
}
