//! Runtime configuration for the artworks table.

use std::time::Duration;
use thiserror::Error;

/// Public artworks listing endpoint of the Art Institute of Chicago.
pub const DEFAULT_API_URL: &str = "https://api.artic.edu/api/v1/artworks";

/// Largest `limit` the artworks API accepts for a single request.
pub const MAX_PAGE_SIZE: usize = 100;

/// Invalid configuration values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The API URL is empty.
    #[error("api url must not be empty")]
    EmptyApiUrl,
    /// A page size is zero or above [`MAX_PAGE_SIZE`].
    #[error("page size {0} is outside 1..={max}", max = MAX_PAGE_SIZE)]
    PageSize(usize),
    /// No page sizes to cycle through.
    #[error("at least one page size option is required")]
    NoPageSizeOptions,
    /// The paginator would show no page links.
    #[error("page link size must be positive")]
    PageLinkSize,
}

/// Settings shared by the HTTP client and the table model.
///
/// ```rust
/// use artworks_table::config::Config;
/// use std::time::Duration;
///
/// let config = Config::default()
///     .with_page_size(20)
///     .with_request_timeout(Duration::from_secs(3));
/// assert!(config.validate().is_ok());
/// assert!(config.page_size_options.contains(&20));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Artworks listing endpoint.
    pub api_url: String,
    /// Rows per page on start-up.
    pub page_size: usize,
    /// Page sizes the user can cycle through, ascending.
    pub page_size_options: Vec<usize>,
    /// Number of numbered page links shown by the paginator.
    pub page_link_size: usize,
    /// Timeout applied to each HTTP request.
    pub request_timeout: Duration,
    /// `User-Agent` header sent with requests.
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            page_size: 10,
            page_size_options: vec![5, 10, 20, 50, 100],
            page_link_size: 5,
            request_timeout: Duration::from_secs(10),
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Config {
    /// Sets the API endpoint.
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    /// Sets the start-up page size, adding it to the options if missing.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        if !self.page_size_options.contains(&page_size) {
            self.page_size_options.push(page_size);
            self.page_size_options.sort_unstable();
        }
        self
    }

    /// Sets the paginator's link count.
    pub fn with_page_link_size(mut self, links: usize) -> Self {
        self.page_link_size = links;
        self
    }

    /// Sets the per-request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Checks every value, returning the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_url.trim().is_empty() {
            return Err(ConfigError::EmptyApiUrl);
        }
        if self.page_size_options.is_empty() {
            return Err(ConfigError::NoPageSizeOptions);
        }
        for size in std::iter::once(&self.page_size).chain(&self.page_size_options) {
            if *size == 0 || *size > MAX_PAGE_SIZE {
                return Err(ConfigError::PageSize(*size));
            }
        }
        if self.page_link_size == 0 {
            return Err(ConfigError::PageLinkSize);
        }
        Ok(())
    }

    /// The option after `current`, wrapping around.
    pub fn next_page_size(&self, current: usize) -> usize {
        self.page_size_options
            .iter()
            .copied()
            .find(|size| *size > current)
            .or_else(|| self.page_size_options.first().copied())
            .unwrap_or(current)
    }

    /// The option before `current`, wrapping around.
    pub fn prev_page_size(&self, current: usize) -> usize {
        self.page_size_options
            .iter()
            .rev()
            .copied()
            .find(|size| *size < current)
            .or_else(|| self.page_size_options.last().copied())
            .unwrap_or(current)
    }
}
