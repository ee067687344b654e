//! Error taxonomy for the Atlas client
//!
//! Validation and ambiguity errors are pre-conditions the caller must fix;
//! transport and protocol errors are surfaced unmodified, with no retry.
//! Nothing here exits the process; that decision belongs to the binary.

use serde_json::Value;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Raised before any network call is made.
    #[error("'{0}' is not a valid project id: expected exactly 24 hexadecimal characters")]
    InvalidProjectId(String),

    /// Raised before any network call is made.
    #[error("'{0}' is not a valid cluster name: ASCII letters, digits and '-' only")]
    InvalidClusterName(String),

    /// A listing page or resource document did not match the protocol.
    /// Carries the offending document.
    #[error("malformed response from the management API: {document}")]
    MalformedResponse { document: Value },

    /// Non-success status from the remote API, with the structured
    /// `detail` message from the response body when one was present.
    #[error("{method} {path} failed with status {status}: {detail}")]
    Transport {
        method: &'static str,
        path: String,
        status: u16,
        detail: String,
    },

    /// Connection-level failure before a status was received.
    #[error("http transport failure: {0}")]
    Http(#[from] reqwest::Error),

    #[error("digest authentication failure: {0}")]
    Auth(#[from] diqwest::error::Error),

    #[error("response body was not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("no organization is visible to this key pair")]
    NoOrganization,

    #[error("{0} is not a project id in this organization")]
    ProjectNotFound(String),

    #[error("'{0}' is not a cluster name in this organization")]
    ClusterNotFound(String),

    #[error("no cluster named '{name}' in project {project_id}")]
    ClusterNotFoundInProject { project_id: String, name: String },

    /// A bare cluster name matched more than one project. Carries every
    /// candidate so the caller can qualify the reference.
    #[error("cluster name '{name}' is not unique in this organization, qualify it with one of the project ids: {}", .project_ids.join(", "))]
    Ambiguous {
        name: String,
        project_ids: Vec<String>,
    },

    /// The caller-supplied safety bound on page following was exceeded.
    #[error("listing exceeded the page limit of {limit} pages")]
    TooManyPages { limit: usize },

    #[error("configuration error: {0}")]
    Config(String),
}
