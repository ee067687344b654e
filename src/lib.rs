//! atlasctl — manage MongoDB Atlas organizations, projects and clusters
//!
//! The hierarchy is organization → projects → clusters. Listings come back
//! through a paginated, link-annotated protocol ([`api::Pager`]); a
//! [`topology::TopologyCache`] snapshot makes the hierarchy queryable
//! offline; [`identifier::ClusterRef`] turns user-supplied cluster
//! references into fully qualified `(project-id, cluster-name)` pairs.
//!
//! ```ignore
//! use atlasctl::api::{ApiClient, ApiKey};
//! use atlasctl::identifier::ClusterRef;
//! use atlasctl::topology::TopologyCache;
//!
//! async fn example() -> atlasctl::Result<()> {
//!     let client = ApiClient::new(ApiKey::from_env()?)?;
//!     let topology = TopologyCache::populate(&client).await?;
//!     let id = ClusterRef::resolve_str("Demo", &topology)?;
//!     client.pause(&id.project_id, &id.name).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod identifier;
pub mod topology;

pub use error::{Error, Result};
