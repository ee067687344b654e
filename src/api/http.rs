//! HTTP transport for the Atlas management API
//!
//! One authenticated call per method, digest-signed with the client's key
//! pair. The transport knows nothing about pagination; it returns the parsed
//! response body or a typed error.

use diqwest::WithDigestAuth;
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use url::Url;

use super::auth::ApiKey;
use crate::error::{Error, Result};

/// Production endpoint of the management API.
pub const DEFAULT_BASE_URL: &str = "https://cloud.mongodb.com/api/atlas/v1.0";

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Sanitize response body for logging
/// Truncates long responses and strips non-printable characters.
/// Truncation counts chars, not bytes, so multibyte bodies cannot split.
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.chars().count() > MAX_LOG_BODY_LENGTH {
        let head: String = body.chars().take(MAX_LOG_BODY_LENGTH).collect();
        format!("{}... [truncated, {} bytes total]", head, body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// Pull the structured `detail` message out of an error body, falling back
/// to the sanitized raw body.
fn error_detail(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|doc| {
            doc.get("detail")
                .and_then(|d| d.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| sanitize_for_log(body))
}

/// HTTP client wrapper for Atlas API calls
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    key: ApiKey,
    base_url: String,
}

impl HttpTransport {
    /// Create a transport against the production API.
    pub fn new(key: ApiKey) -> Result<Self> {
        Self::with_base_url(key, DEFAULT_BASE_URL)
    }

    /// Create a transport against an alternate endpoint (used by tests).
    pub fn with_base_url(key: ApiKey, base_url: &str) -> Result<Self> {
        Url::parse(base_url)
            .map_err(|e| Error::Config(format!("invalid API base url '{base_url}': {e}")))?;

        let client = Client::builder()
            .user_agent(concat!("atlasctl/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET an API path relative to the base URL.
    pub async fn get(&self, path: &str) -> Result<Value> {
        self.get_url(&self.endpoint(path)).await
    }

    /// GET a raw URL, as handed out by a listing's `next` link.
    pub async fn get_url(&self, url: &str) -> Result<Value> {
        self.execute("GET", self.client.get(url), url).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> Result<Value> {
        let url = self.endpoint(path);
        self.execute("POST", self.client.post(&url).json(body), &url)
            .await
    }

    pub async fn patch(&self, path: &str, body: &Value) -> Result<Value> {
        let url = self.endpoint(path);
        self.execute("PATCH", self.client.patch(&url).json(body), &url)
            .await
    }

    pub async fn delete(&self, path: &str) -> Result<Value> {
        let url = self.endpoint(path);
        self.execute("DELETE", self.client.delete(&url), &url).await
    }

    async fn execute(&self, method: &'static str, request: RequestBuilder, url: &str) -> Result<Value> {
        tracing::debug!("{} {}", method, url);

        let response = request
            .send_with_digest_auth(&self.key.public_key, &self.key.private_key)
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            // Only log sanitized/truncated error bodies
            tracing::error!("API error: {} - {}", status, sanitize_for_log(&body));
            return Err(Error::Transport {
                method,
                path: url.to_string(),
                status: status.as_u16(),
                detail: error_detail(&body),
            });
        }

        if body.is_empty() {
            return Ok(Value::Null);
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_truncates_long_bodies() {
        let body = "x".repeat(500);
        let logged = sanitize_for_log(&body);
        assert!(logged.contains("truncated, 500 bytes total"));
        assert!(logged.len() < body.len());
    }

    #[test]
    fn sanitize_truncates_multibyte_bodies_on_char_boundaries() {
        // a two-byte char straddling the byte-200 mark must not panic
        let body = format!("{}é{}", "a".repeat(199), "b".repeat(50));
        let logged = sanitize_for_log(&body);
        assert!(logged.contains(&format!("truncated, {} bytes total", body.len())));

        // all-multibyte bodies truncate cleanly too
        let body = "é".repeat(300);
        let logged = sanitize_for_log(&body);
        assert!(logged.contains("truncated, 600 bytes total"));
    }

    #[test]
    fn error_detail_prefers_the_structured_message() {
        let body = r#"{"error": 404, "detail": "No cluster named Demo"}"#;
        assert_eq!(error_detail(body), "No cluster named Demo");
    }

    #[test]
    fn error_detail_falls_back_to_the_raw_body() {
        assert_eq!(error_detail("gateway timeout"), "gateway timeout");
    }

    #[test]
    fn base_url_drops_trailing_slash() {
        let transport =
            HttpTransport::with_base_url(ApiKey::new("pub", "priv"), "http://127.0.0.1:9999/")
                .unwrap();
        assert_eq!(transport.endpoint("/groups"), "http://127.0.0.1:9999/groups");
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let err = HttpTransport::with_base_url(ApiKey::new("pub", "priv"), "not a url");
        assert!(matches!(err, Err(Error::Config(_))));
    }
}
