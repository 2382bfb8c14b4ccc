//! Page sources: where pages and bulk "first N" slices come from.
//!
//! The tracker and the table never talk to the network directly. They go
//! through a [`PageSource`], which is implemented over HTTP by
//! [`ArticClient`](crate::client::ArticClient) and in memory by [`MemorySource`].

use crate::artwork::{Identified, Page};
use async_trait::async_trait;
use std::sync::Mutex;
use thiserror::Error;

/// Failure of a page or bulk fetch.
///
/// Fetch failures are never fatal: callers keep their prior state and the
/// same request can simply be issued again.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The request itself was malformed (page 0, empty page size, ...).
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// The request never produced a response.
    #[error("request failed: {0}")]
    Transport(String),
    /// The server answered with a non-success status.
    #[error("server returned HTTP {0}")]
    Status(u16),
    /// The response body could not be decoded.
    #[error("could not decode response: {0}")]
    Decode(String),
}

/// A lazily paginated remote collection.
///
/// # Contract
///
/// - `fetch_page` takes a 1-based page number and a non-zero page size and
///   returns that slice together with the collection's total count. Pages past
///   the end come back empty rather than failing.
/// - `fetch_first_n` returns the first `min(n, total)` records in the
///   collection's natural order, regardless of any page size.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Record type served by this source.
    type Record: Identified + Clone + Send + Sync + 'static;

    /// Fetches one page.
    async fn fetch_page(
        &self,
        page_number: usize,
        page_size: usize,
    ) -> Result<Page<Self::Record>, FetchError>;

    /// Fetches the first `n` records of the collection.
    async fn fetch_first_n(&self, n: usize) -> Result<Vec<Self::Record>, FetchError>;

    /// Short human-readable name, used in logs and the status line.
    fn source_name(&self) -> &str;
}

/// Checks the arguments shared by every [`PageSource::fetch_page`] implementation.
pub fn validate_page_request(page_number: usize, page_size: usize) -> Result<(), FetchError> {
    if page_number == 0 {
        return Err(FetchError::InvalidRequest(
            "page numbers start at 1".to_string(),
        ));
    }
    if page_size == 0 {
        return Err(FetchError::InvalidRequest(
            "page size must be positive".to_string(),
        ));
    }
    Ok(())
}

/// A request received by a [`MemorySource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceRequest {
    /// `fetch_page(page_number, page_size)`.
    Page {
        /// Requested page number.
        page_number: usize,
        /// Requested page size.
        page_size: usize,
    },
    /// `fetch_first_n(n)`.
    FirstN(usize),
}

/// A [`PageSource`] over an in-memory list of records.
///
/// Besides serving records it keeps a log of the requests it received and can
/// be told to fail, which makes it the test double for the rest of the crate.
///
/// ```rust
/// use artworks_table::artwork::Artwork;
/// use artworks_table::source::{MemorySource, PageSource};
///
/// # tokio_test_block(async {
/// let source = MemorySource::new((1..=25).map(Artwork::sample).collect());
/// let page = source.fetch_page(3, 10).await.unwrap();
/// assert_eq!(page.records.len(), 5);
/// assert_eq!(page.total_count, 25);
/// # });
/// # fn tokio_test_block<F: std::future::Future>(f: F) {
/// #     tokio::runtime::Runtime::new().unwrap().block_on(f);
/// # }
/// ```
#[derive(Debug)]
pub struct MemorySource<R> {
    name: String,
    records: Vec<R>,
    failure: Mutex<Option<FetchError>>,
    requests: Mutex<Vec<SourceRequest>>,
}

impl<R> MemorySource<R> {
    /// Creates a source serving `records` in order.
    pub fn new(records: Vec<R>) -> Self {
        Self {
            name: "memory".to_string(),
            records,
            failure: Mutex::new(None),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Sets the name reported by [`PageSource::source_name`].
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Makes every following request fail with `error`, or succeed again when
    /// given `None`.
    pub fn set_failure(&self, error: Option<FetchError>) {
        if let Ok(mut failure) = self.failure.lock() {
            *failure = error;
        }
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<SourceRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    /// Number of records served.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the source serves no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn record_request(&self, request: SourceRequest) -> Result<(), FetchError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }
        match self.failure.lock() {
            Ok(failure) => failure.clone().map_or(Ok(()), Err),
            Err(_) => Ok(()),
        }
    }
}

#[async_trait]
impl<R> PageSource for MemorySource<R>
where
    R: Identified + Clone + Send + Sync + 'static,
{
    type Record = R;

    async fn fetch_page(&self, page_number: usize, page_size: usize) -> Result<Page<R>, FetchError> {
        self.record_request(SourceRequest::Page {
            page_number,
            page_size,
        })?;
        validate_page_request(page_number, page_size)?;

        let start = (page_number - 1).saturating_mul(page_size);
        let records = self
            .records
            .iter()
            .skip(start)
            .take(page_size)
            .cloned()
            .collect();
        Ok(Page::new(page_number, page_size, records, self.records.len()))
    }

    async fn fetch_first_n(&self, n: usize) -> Result<Vec<R>, FetchError> {
        self.record_request(SourceRequest::FirstN(n))?;
        if n == 0 {
            return Err(FetchError::InvalidRequest(
                "bulk count must be positive".to_string(),
            ));
        }
        Ok(self.records.iter().take(n).cloned().collect())
    }

    fn source_name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artwork::{Artwork, RecordId};

    fn source(count: u64) -> MemorySource<Artwork> {
        MemorySource::new((1..=count).map(Artwork::sample).collect())
    }

    #[tokio::test]
    async fn test_fetch_page_slices_in_order() {
        let source = source(25);
        let page = source.fetch_page(2, 10).await.unwrap();
        assert_eq!(page.number, 2);
        assert_eq!(page.size, 10);
        assert_eq!(page.total_count, 25);
        assert_eq!(page.ids(), (11..=20).collect::<Vec<RecordId>>());
    }

    #[tokio::test]
    async fn test_fetch_page_past_end_is_empty() {
        let source = source(25);
        let page = source.fetch_page(9, 10).await.unwrap();
        assert!(page.is_empty());
        assert_eq!(page.total_count, 25);
    }

    #[tokio::test]
    async fn test_fetch_page_rejects_bad_arguments() {
        let source = source(5);
        assert!(matches!(
            source.fetch_page(0, 10).await,
            Err(FetchError::InvalidRequest(_))
        ));
        assert!(matches!(
            source.fetch_page(1, 0).await,
            Err(FetchError::InvalidRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_first_n_caps_at_total() {
        let source = source(12);
        let first = source.fetch_first_n(5).await.unwrap();
        assert_eq!(first.len(), 5);
        assert_eq!(first[0].id, 1);

        let all = source.fetch_first_n(50).await.unwrap();
        assert_eq!(all.len(), 12);
    }

    #[tokio::test]
    async fn test_failure_injection_and_request_log() {
        let source = source(12);
        source.set_failure(Some(FetchError::Status(503)));
        assert_eq!(
            source.fetch_page(1, 10).await.unwrap_err(),
            FetchError::Status(503)
        );

        source.set_failure(None);
        assert!(source.fetch_first_n(3).await.is_ok());
        assert_eq!(
            source.requests(),
            vec![
                SourceRequest::Page {
                    page_number: 1,
                    page_size: 10
                },
                SourceRequest::FirstN(3),
            ]
        );
    }

    #[test]
    fn test_source_name() {
        let source = source(1).with_name("offline sample");
        assert_eq!(source.source_name(), "offline sample");
        assert_eq!(source.len(), 1);
        assert!(!source.is_empty());
    }
}
