//! Offset/limit pagination over JSON:API collections
//!
//! Pages are requested one after another. A page with fewer raw items than
//! the page size is the last one. A failed page ends the walk but keeps what
//! was already collected.

use crate::auth::SessionToken;
use crate::transport::HttpTransport;
use serde::Deserialize;
use serde_json::Value;
use std::fmt;

/// How a page request URL is built
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageUrl {
    /// Base URL plus `page[limit]` / `page[offset]` query parameters
    Query(String),
    /// URL template with `{offset}` (and optionally `{limit}`) placeholders
    Template(String),
}

impl PageUrl {
    /// URL and query parameters for the page starting at `offset`
    #[must_use]
    pub fn page(&self, offset: usize, limit: usize) -> (String, Vec<(String, String)>) {
        match self {
            Self::Query(base) => (
                base.clone(),
                vec![
                    ("page[limit]".to_string(), limit.to_string()),
                    ("page[offset]".to_string(), offset.to_string()),
                ],
            ),
            Self::Template(template) => (
                template
                    .replace("{offset}", &offset.to_string())
                    .replace("{limit}", &limit.to_string()),
                Vec::new(),
            ),
        }
    }
}

/// Why pagination stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageStop {
    /// A page came back shorter than the page size
    ShortPage,
    /// The server answered with a non-success status
    Status(u16),
    /// The request failed after all retries
    Transport(String),
    /// The body was not a JSON:API document
    Decode(String),
    /// The page ceiling was reached
    PageCap,
}

impl PageStop {
    /// Whether the collection is known to be complete
    #[must_use]
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::ShortPage)
    }
}

impl fmt::Display for PageStop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShortPage => f.write_str("last page reached"),
            Self::Status(status) => write!(f, "HTTP {status}"),
            Self::Transport(e) => write!(f, "transport error: {e}"),
            Self::Decode(e) => write!(f, "decode error: {e}"),
            Self::PageCap => f.write_str("page limit reached"),
        }
    }
}

/// Items collected across all pages
#[derive(Debug, Clone)]
pub struct Paged<T> {
    pub items: Vec<T>,
    /// Pages successfully read
    pub pages: usize,
    pub stop: PageStop,
}

#[derive(Deserialize)]
struct Document {
    #[serde(default)]
    data: Vec<Value>,
}

/// Walks a paginated collection
#[derive(Debug, Clone, Copy)]
pub struct Pager<'a> {
    pub transport: &'a HttpTransport,
    pub token: &'a SessionToken,
    pub max_pages: usize,
}

impl Pager<'_> {
    /// Fetch every page and normalize each raw item
    ///
    /// Items the normalizer rejects are skipped; they still count toward the
    /// page length used to detect the last page.
    pub async fn fetch_all<T, F>(&self, url: &PageUrl, page_size: usize, normalize: F) -> Paged<T>
    where
        F: Fn(Value) -> Option<T>,
    {
        let mut items = Vec::new();
        let mut offset = 0;
        let mut pages = 0;

        let stop = loop {
            if pages >= self.max_pages {
                tracing::warn!(max_pages = self.max_pages, "Page limit reached, stopping");
                break PageStop::PageCap;
            }

            let (request_url, query) = url.page(offset, page_size);
            let response = match self.transport.get(&request_url, self.token, &query).await {
                Ok(response) => response,
                Err(e) => {
                    tracing::error!(url = %request_url, offset, error = %e, "Page request failed");
                    break PageStop::Transport(e.to_string());
                }
            };

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                tracing::error!(url = %request_url, offset, %status, body = %body, "Page request rejected");
                break PageStop::Status(status.as_u16());
            }

            let document: Document = match response.json().await {
                Ok(document) => document,
                Err(e) => {
                    tracing::error!(url = %request_url, offset, error = %e, "Page was not a JSON:API document");
                    break PageStop::Decode(e.to_string());
                }
            };
            pages += 1;

            let raw_count = document.data.len();
            for raw in document.data {
                match normalize(raw) {
                    Some(item) => items.push(item),
                    None => tracing::debug!(offset, "Skipped malformed record"),
                }
            }
            tracing::debug!(url = %request_url, offset, raw_count, "Fetched page");

            if raw_count < page_size {
                break PageStop::ShortPage;
            }
            offset += page_size;
        };

        if !stop.is_complete() {
            tracing::warn!(collected = items.len(), pages, reason = %stop, "Pagination ended early, keeping partial results");
        }

        Paged { items, pages, stop }
    }
}
