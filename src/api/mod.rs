//! Atlas API interaction module
//!
//! Everything needed to talk to the management API: digest-authenticated
//! transport, the paginated listing protocol, typed records and the
//! resource-level client.
//!
//! # Module Structure
//!
//! - [`auth`] - API key pair handling
//! - [`http`] - one authenticated HTTP call per method
//! - [`pager`] - lazy enumeration across `results`/`links` pages
//! - [`cache`] - memoizing lookup cache (valid until cleared)
//! - [`models`] - typed Organization / Project / Cluster records
//! - [`client`] - resource operations over the transport

pub mod auth;
pub mod cache;
pub mod client;
pub mod http;
pub mod models;
pub mod pager;

pub use auth::ApiKey;
pub use client::ApiClient;
pub use http::HttpTransport;
pub use models::{Cluster, ClusterState, Organization, Project};
pub use pager::Pager;
