//! Best-effort contact-email scraping from business websites.
//!
//! Tries a small set of well-known pages in order and stops at the first
//! non-fake email. Every per-page failure is swallowed; enrichment never
//! fails a candidate or a job.

use std::time::Duration;

use bizgrid_core::validate::extract_emails;

use crate::error::ScrapeError;

/// Sub-paths tried after the root page, in order.
const CONTACT_PATHS: &[&str] = &["/contact", "/about"];

/// What a scrape attempt learned. `NoEmail` and `Unreachable` are
/// indistinguishable to the pipeline (no email either way); the split
/// exists so logs can tell a dead site from one that publishes no address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScrapeOutcome {
    Email(String),
    NoEmail,
    Unreachable,
}

impl ScrapeOutcome {
    /// The scraped email, if any — the only part the pipeline consumes.
    #[must_use]
    pub fn into_email(self) -> Option<String> {
        match self {
            ScrapeOutcome::Email(email) => Some(email),
            ScrapeOutcome::NoEmail | ScrapeOutcome::Unreachable => None,
        }
    }
}

/// Fetches candidate contact pages and extracts the first usable email.
pub struct EmailScraper {
    client: reqwest::Client,
}

impl EmailScraper {
    /// Creates a scraper with the given per-request timeout and user agent.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self, ScrapeError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(5))
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client })
    }

    /// Tries the root page, then `/contact`, then `/about`, returning the
    /// first non-fake email found in any 200 response body.
    pub async fn scrape_email(&self, website: &str) -> ScrapeOutcome {
        if website.trim().is_empty() {
            return ScrapeOutcome::NoEmail;
        }

        let base = normalize_website(website);
        let mut any_reachable = false;

        for page in candidate_pages(&base) {
            match self.fetch_page(&page).await {
                Ok(Some(body)) => {
                    any_reachable = true;
                    if let Some(email) = extract_emails(&body).into_iter().next() {
                        return ScrapeOutcome::Email(email);
                    }
                }
                Ok(None) => {
                    // Non-200: the site answered, this page just has nothing
                    // for us.
                    any_reachable = true;
                }
                Err(e) => {
                    tracing::debug!(page = %page, error = %e, "enrichment page fetch failed");
                }
            }
        }

        if any_reachable {
            ScrapeOutcome::NoEmail
        } else {
            ScrapeOutcome::Unreachable
        }
    }

    /// Fetches one page; `Ok(Some(body))` on 200, `Ok(None)` on any other
    /// status.
    async fn fetch_page(&self, url: &str) -> Result<Option<String>, ScrapeError> {
        let response = self.client.get(url).send().await?;
        if response.status() != reqwest::StatusCode::OK {
            return Ok(None);
        }
        let body = response.text().await?;
        Ok(Some(body))
    }
}

/// Ensures the website has a scheme; bare domains default to HTTPS.
fn normalize_website(website: &str) -> String {
    let trimmed = website.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_owned()
    } else {
        format!("https://{trimmed}")
    }
}

/// The ordered page list for one site: root first, then contact paths.
fn candidate_pages(base: &str) -> Vec<String> {
    let root = base.trim_end_matches('/');
    let mut pages = vec![base.to_owned()];
    for path in CONTACT_PATHS {
        pages.push(format!("{root}{path}"));
    }
    pages
}
