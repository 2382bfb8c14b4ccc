//! HTTP page source for the Art Institute of Chicago artworks API.
//!
//! Every request is a `GET` on the listing endpoint with `page`, `limit` and
//! `fields` query parameters:
//!
//! ```text
//! GET https://api.artic.edu/api/v1/artworks?page=2&limit=10&fields=id,title,...
//! ```
//!
//! The API refuses a `limit` above [`MAX_PAGE_SIZE`], so a bulk "first N" larger
//! than that is served by walking consecutive pages.

use crate::artwork::{Artwork, ArtworksResponse, Page};
use crate::config::{Config, MAX_PAGE_SIZE};
use crate::source::{validate_page_request, FetchError, PageSource};
use async_trait::async_trait;
use reqwest::Url;
use tracing::{debug, warn};

/// [`PageSource`] backed by the artworks REST API.
#[derive(Debug, Clone)]
pub struct ArticClient {
    base_url: Url,
    client: reqwest::Client,
}

impl ArticClient {
    /// Builds a client from `config`'s endpoint, timeout and user agent.
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        let base_url = Url::parse(&config.api_url)
            .map_err(|e| FetchError::InvalidRequest(format!("api url: {}", e)))?;
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        Ok(Self { base_url, client })
    }

    /// URL for one page of `limit` records.
    pub fn page_url(&self, page_number: usize, limit: usize) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("page", &page_number.to_string())
            .append_pair("limit", &limit.to_string())
            .append_pair("fields", Artwork::FIELDS);
        url
    }

    async fn get_listing(
        &self,
        page_number: usize,
        limit: usize,
    ) -> Result<ArtworksResponse, FetchError> {
        let url = self.page_url(page_number, limit);
        debug!(%url, "requesting artworks");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), page = page_number, "artworks request rejected");
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        decode_listing(&body)
    }
}

/// Decodes a listing body.
pub fn decode_listing(body: &str) -> Result<ArtworksResponse, FetchError> {
    serde_json::from_str(body).map_err(|e| FetchError::Decode(e.to_string()))
}

/// Plans the page requests that cover the first `n` records.
///
/// Returns `(limit, pages)`: request pages `1..=pages` with that `limit` and
/// keep the first `n` records of their concatenation.
pub fn first_n_plan(n: usize) -> (usize, usize) {
    let limit = n.clamp(1, MAX_PAGE_SIZE);
    (limit, n.div_ceil(limit))
}

#[async_trait]
impl PageSource for ArticClient {
    type Record = Artwork;

    async fn fetch_page(
        &self,
        page_number: usize,
        page_size: usize,
    ) -> Result<Page<Artwork>, FetchError> {
        validate_page_request(page_number, page_size)?;
        if page_size > MAX_PAGE_SIZE {
            return Err(FetchError::InvalidRequest(format!(
                "page size {} exceeds the API limit of {}",
                page_size, MAX_PAGE_SIZE
            )));
        }
        let listing = self.get_listing(page_number, page_size).await?;
        Ok(listing.into_page(page_number, page_size))
    }

    async fn fetch_first_n(&self, n: usize) -> Result<Vec<Artwork>, FetchError> {
        if n == 0 {
            return Err(FetchError::InvalidRequest(
                "bulk count must be positive".to_string(),
            ));
        }

        let (limit, pages) = first_n_plan(n);
        // `n` is user input, so capacity follows what the server reports.
        let mut records: Vec<Artwork> = Vec::new();
        for page_number in 1..=pages {
            let listing = self.get_listing(page_number, limit).await?;
            let total = listing.pagination.total;
            let received = listing.data.len();
            if records.is_empty() {
                records.reserve(n.min(total).max(received));
            }
            records.extend(listing.data);

            if received < limit || records.len() >= n || records.len() >= total {
                break;
            }
        }
        records.truncate(n);
        debug!(requested = n, received = records.len(), "bulk records fetched");
        Ok(records)
    }

    fn source_name(&self) -> &str {
        self.base_url.host_str().unwrap_or("artworks api")
    }
}
