//! Paginated listing
//!
//! Listing endpoints return documents of the form
//! `{"results": [...], "links": [{"rel": ..., "href": ...}, ...]}`.
//! The last link descriptor decides continuation: a `rel` of `next` names
//! the URL of the following page, its absence ends the listing.
//!
//! A [`Pager`] yields items one at a time, in page order then within-page
//! order, exactly as received. It is pull-based and not restartable:
//! re-listing means constructing a new pager, which re-issues every page
//! request from page one.

use std::collections::VecDeque;

use serde_json::Value;

use super::http::HttpTransport;
use crate::error::{Error, Result};

/// Default number of items requested per page, matching the API default.
pub const DEFAULT_ITEMS_PER_PAGE: usize = 100;

enum PageRequest {
    /// First page, addressed relative to the API base URL.
    Path(String),
    /// Continuation page, addressed by the raw `next` href.
    Url(String),
}

pub struct Pager<'a> {
    transport: &'a HttpTransport,
    next: Option<PageRequest>,
    buffer: VecDeque<Value>,
    pages_fetched: usize,
    page_limit: Option<usize>,
    items_per_page: usize,
}

impl<'a> Pager<'a> {
    pub fn new(transport: &'a HttpTransport, path: impl Into<String>) -> Self {
        Self {
            transport,
            next: Some(PageRequest::Path(path.into())),
            buffer: VecDeque::new(),
            pages_fetched: 0,
            page_limit: None,
            items_per_page: DEFAULT_ITEMS_PER_PAGE,
        }
    }

    /// Safety bound on the number of pages fetched. The default imposes no
    /// ceiling; the remote decides when the listing ends. With a limit set,
    /// a listing that would need a further page fails with
    /// [`Error::TooManyPages`].
    pub fn with_page_limit(mut self, limit: usize) -> Self {
        self.page_limit = Some(limit);
        self
    }

    pub fn with_items_per_page(mut self, items_per_page: usize) -> Self {
        self.items_per_page = items_per_page;
        self
    }

    /// Yield the next item, fetching further pages as needed. Returns
    /// `Ok(None)` when the listing is exhausted. A failure on a page fetch
    /// surfaces here even if earlier pages' items were already yielded.
    pub async fn try_next(&mut self) -> Result<Option<Value>> {
        loop {
            if let Some(item) = self.buffer.pop_front() {
                return Ok(Some(item));
            }

            let Some(request) = self.next.take() else {
                return Ok(None);
            };

            if let Some(limit) = self.page_limit {
                if self.pages_fetched >= limit {
                    return Err(Error::TooManyPages { limit });
                }
            }

            let doc = match request {
                PageRequest::Path(path) => {
                    let path = with_paging_params(&path, self.items_per_page);
                    self.transport.get(&path).await?
                }
                PageRequest::Url(url) => self.transport.get_url(&url).await?,
            };
            self.pages_fetched += 1;

            let (items, next) = parse_page(doc)?;
            tracing::debug!(
                page = self.pages_fetched,
                items = items.len(),
                has_next = next.is_some(),
                "listing page fetched"
            );
            self.buffer.extend(items);
            self.next = next.map(PageRequest::Url);
        }
    }

    /// Drain the whole listing into a vector, preserving order.
    pub async fn collect_all(mut self) -> Result<Vec<Value>> {
        let mut items = Vec::new();
        while let Some(item) = self.try_next().await? {
            items.push(item);
        }
        Ok(items)
    }
}

/// Split a page document into its items and the optional next-page URL.
/// A document without a `results` array violates the protocol.
fn parse_page(doc: Value) -> Result<(Vec<Value>, Option<String>)> {
    let next = doc
        .get("links")
        .and_then(Value::as_array)
        .and_then(|links| links.last())
        .and_then(|last| {
            if last.get("rel").and_then(Value::as_str) == Some("next") {
                last.get("href").and_then(Value::as_str).map(str::to_string)
            } else {
                None
            }
        });

    match doc.get("results").and_then(Value::as_array).cloned() {
        Some(items) => Ok((items, next)),
        None => Err(Error::MalformedResponse { document: doc }),
    }
}

/// Append `itemsPerPage` and `pageNum` query parameters when the path does
/// not already carry them.
fn with_paging_params(path: &str, items_per_page: usize) -> String {
    let mut path = path.to_string();
    if !path.contains("itemsPerPage") {
        path.push(if path.contains('?') { '&' } else { '?' });
        path.push_str(&format!("itemsPerPage={items_per_page}"));
    }
    if !path.contains("pageNum") {
        path.push(if path.contains('?') { '&' } else { '?' });
        path.push_str("pageNum=1");
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn paging_params_are_appended_when_absent() {
        assert_eq!(
            with_paging_params("/groups", 100),
            "/groups?itemsPerPage=100&pageNum=1"
        );
    }

    #[test]
    fn paging_params_respect_existing_query() {
        assert_eq!(
            with_paging_params("/groups?envelope=false", 50),
            "/groups?envelope=false&itemsPerPage=50&pageNum=1"
        );
        assert_eq!(
            with_paging_params("/groups?itemsPerPage=5&pageNum=3", 50),
            "/groups?itemsPerPage=5&pageNum=3"
        );
    }

    #[test]
    fn parse_page_reads_items_and_next_link() {
        let doc = json!({
            "results": [{"name": "a"}, {"name": "b"}],
            "links": [
                {"rel": "self", "href": "http://example/groups?pageNum=1"},
                {"rel": "next", "href": "http://example/groups?pageNum=2"}
            ]
        });
        let (items, next) = parse_page(doc).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(next.as_deref(), Some("http://example/groups?pageNum=2"));
    }

    #[test]
    fn parse_page_only_inspects_the_last_link() {
        // A next relation anywhere but last does not continue the listing
        let doc = json!({
            "results": [],
            "links": [
                {"rel": "next", "href": "http://example/groups?pageNum=2"},
                {"rel": "self", "href": "http://example/groups?pageNum=1"}
            ]
        });
        let (_, next) = parse_page(doc).unwrap();
        assert!(next.is_none());
    }

    #[test]
    fn parse_page_without_results_is_malformed() {
        let doc = json!({"totalCount": 0, "links": []});
        let err = parse_page(doc).unwrap_err();
        assert!(matches!(err, Error::MalformedResponse { .. }));
    }

    #[test]
    fn parse_page_tolerates_missing_links() {
        let doc = json!({"results": [{"name": "only"}]});
        let (items, next) = parse_page(doc).unwrap();
        assert_eq!(items.len(), 1);
        assert!(next.is_none());
    }
}
