use thiserror::Error;

/// Errors from the enrichment fetcher's internals. Callers of
/// [`crate::EmailScraper::scrape_email`] never see these; per-page failures
/// are swallowed and folded into the scrape outcome.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}
