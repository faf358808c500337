//! The discovery loop: paginated searches across (keyword × location)
//! pairs, the per-candidate validation/dedup/enrichment pipeline, and the
//! stop-condition logic.
//!
//! One engine instance drives exactly one job, sequentially. Keyword-major,
//! location-minor ordering is deliberate: a partially completed run covers
//! every location for its leading keywords rather than every keyword for a
//! few locations.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bizgrid_core::validate::{
    completeness_score, extract_city_state, is_fake_email, is_fake_phone,
};
use bizgrid_core::{Business, Location, RunStats, SearchJobConfig, StopReason};
use bizgrid_places::{PlaceSummary, PlacesClient, SearchStatus};
use bizgrid_scraper::{EmailScraper, ScrapeOutcome};

use crate::registry::JobRegistry;

/// A business must populate at least this many of {phone, email, website,
/// address} to enter the result set.
const MIN_COMPLETENESS: u8 = 2;

/// Engine pacing knobs, derived from app config.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Delay before requesting a token-continuation page. The provider's
    /// pagination tokens need a consistency window before they are valid.
    pub page_delay_ms: u64,
    /// Cooldown before the single post-rate-limit retry of a location.
    pub quota_cooldown_secs: u64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            page_delay_ms: 2_000,
            quota_cooldown_secs: 60,
        }
    }
}

/// What a finished run produced. `businesses` is already sorted.
#[derive(Debug)]
pub struct EngineOutcome {
    pub businesses: Vec<Business>,
    pub stats: RunStats,
    pub reason: StopReason,
    pub detail: String,
}

/// Drives one discovery job to a terminal stop reason.
pub struct DiscoveryEngine {
    places: PlacesClient,
    scraper: EmailScraper,
    registry: JobRegistry,
    job_id: String,
    config: SearchJobConfig,
    locations: Vec<Location>,
    settings: EngineSettings,
    cancel: Arc<AtomicBool>,
    businesses: HashMap<String, Business>,
    seen_domains: HashMap<String, String>,
    stats: RunStats,
}

impl DiscoveryEngine {
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        places: PlacesClient,
        scraper: EmailScraper,
        registry: JobRegistry,
        job_id: String,
        config: SearchJobConfig,
        locations: Vec<Location>,
        settings: EngineSettings,
        cancel: Arc<AtomicBool>,
    ) -> Self {
        Self {
            places,
            scraper,
            registry,
            job_id,
            config,
            locations,
            settings,
            cancel,
            businesses: HashMap::new(),
            seen_domains: HashMap::new(),
            stats: RunStats::default(),
        }
    }

    /// Runs the full keyword × location sweep and returns the terminal
    /// outcome. Never errors: every network-level failure degrades to "no
    /// data" and the loop carries on.
    pub async fn run(mut self) -> EngineOutcome {
        if self.locations.is_empty() {
            let state = self.config.state.clone();
            return self.finish(
                StopReason::NoCitiesConfigured,
                format!("No cities configured for region {state}."),
            );
        }

        let keywords = self.config.keywords.clone();
        let locations = self.locations.clone();
        let total_pairs = keywords.len() * locations.len();
        let mut completed_pairs = 0usize;

        for keyword in &keywords {
            for location in &locations {
                if self.cancelled() {
                    return self.finish_default(StopReason::Cancelled);
                }

                self.registry
                    .update(&self.job_id, |job| {
                        job.current_keyword = keyword.clone();
                        job.current_city = location.name.clone();
                    })
                    .await;
                tracing::info!(
                    job_id = %self.job_id,
                    keyword = %keyword,
                    city = %location.name,
                    "searching location"
                );

                // Once the quota latch trips, stop touching the network and
                // let the sweep run out.
                if !self.places.quota_exhausted() {
                    self.search_location(location, keyword).await;
                }

                completed_pairs += 1;
                let progress = progress_percent(completed_pairs, total_pairs);
                let stats = self.stats;
                let valid = self.businesses.len() as u64;
                self.registry
                    .update(&self.job_id, |job| {
                        job.progress = progress;
                        job.stats = stats;
                        job.valid_count = valid;
                    })
                    .await;

                if self.businesses.len() >= self.config.min_results as usize {
                    return self.finish_default(StopReason::TargetReached);
                }
            }
        }

        if self.places.quota_exhausted() {
            self.finish_default(StopReason::QuotaExceeded)
        } else {
            self.finish_default(StopReason::LocationsExhausted)
        }
    }

    fn finish_default(self, reason: StopReason) -> EngineOutcome {
        let detail = reason.default_detail().to_owned();
        self.finish(reason, detail)
    }

    fn finish(self, reason: StopReason, detail: String) -> EngineOutcome {
        let businesses = sort_businesses(self.businesses.into_values().collect());
        EngineOutcome {
            businesses,
            stats: self.stats,
            reason,
            detail,
        }
    }

    fn cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    /// Paginates one (location, keyword) pair until the provider runs out
    /// of pages or the location is abandoned.
    async fn search_location(&mut self, location: &Location, keyword: &str) {
        let mut page_token: Option<String> = None;
        let mut retried_after_cooldown = false;

        loop {
            if self.cancelled() {
                return;
            }
            // The details lookups inside the previous page may have tripped
            // the quota latch; once set, no further network calls. The
            // post-cooldown retry only reaches here with the latch clear.
            if self.places.quota_exhausted() {
                return;
            }

            let page = self
                .places
                .nearby_search(location.lat, location.lng, keyword, page_token.as_deref())
                .await;

            match page.status {
                SearchStatus::OverQueryLimit => {
                    if retried_after_cooldown {
                        return;
                    }
                    self.quota_cooldown().await;
                    if self.places.quota_exhausted() {
                        tracing::warn!(
                            job_id = %self.job_id,
                            city = %location.name,
                            "quota still exhausted after cooldown; abandoning location"
                        );
                        return;
                    }
                    retried_after_cooldown = true;
                    continue;
                }
                ref status if !status.is_processable() => {
                    tracing::debug!(
                        job_id = %self.job_id,
                        city = %location.name,
                        status = ?page.status,
                        "abandoning location on non-retryable status"
                    );
                    return;
                }
                _ => {}
            }

            for summary in &page.results {
                self.stats.total_searched += 1;
                if let Some(business) = self.process_candidate(summary, keyword).await {
                    if let Some(domain) = website_domain(&business.website) {
                        self.seen_domains.insert(domain, business.place_id.clone());
                    }
                    self.businesses
                        .insert(business.place_id.clone(), business);
                }
            }

            page_token = page.next_page_token;
            if page_token.is_none() {
                return;
            }
            // Continuation tokens are not immediately valid; wait out the
            // provider's pagination consistency window.
            tokio::time::sleep(Duration::from_millis(self.settings.page_delay_ms)).await;
        }
    }

    /// Validates, dedupes, enriches, and scores one raw search hit.
    /// Returns the accepted business, or `None` with the relevant stat
    /// counter bumped.
    async fn process_candidate(
        &mut self,
        summary: &PlaceSummary,
        keyword: &str,
    ) -> Option<Business> {
        let place_id = summary.place_id.as_str();
        if place_id.is_empty() || self.businesses.contains_key(place_id) {
            self.stats.duplicates += 1;
            return None;
        }

        let details = self.places.place_details(place_id).await;

        // Domain identity outranks listing identity: two listings pointing
        // at the same site are the same business.
        if let Some(domain) = website_domain(&details.website) {
            if let Some(existing) = self.seen_domains.get(&domain) {
                if existing != place_id {
                    self.stats.duplicates += 1;
                    return None;
                }
            }
        }

        let mut business = Business {
            name: if details.name.is_empty() {
                summary.name.clone()
            } else {
                details.name.clone()
            },
            phone: details.formatted_phone_number.clone(),
            address: if details.formatted_address.is_empty() {
                summary.vicinity.clone()
            } else {
                details.formatted_address.clone()
            },
            website: details.website.clone(),
            search_keyword: keyword.to_owned(),
            place_id: place_id.to_owned(),
            ..Business::default()
        };
        let (city, state) = extract_city_state(&business.address);
        business.city = city;
        business.state = state;

        if is_fake_phone(&business.phone) {
            self.stats.fake_phones += 1;
            business.phone.clear();
        }

        if !business.website.is_empty() {
            match self.scraper.scrape_email(&business.website).await {
                ScrapeOutcome::Email(email) => {
                    business.email = email;
                    business.email_source = "website_scrape".to_owned();
                    self.stats.emails_scraped += 1;
                }
                ScrapeOutcome::NoEmail => {}
                ScrapeOutcome::Unreachable => {
                    tracing::debug!(
                        place_id,
                        website = %business.website,
                        "enrichment site unreachable"
                    );
                }
            }
        }

        if is_fake_email(&business.email) {
            self.stats.fake_emails += 1;
            business.email.clear();
            business.email_source.clear();
        }

        business.completeness_score = completeness_score(&business);
        if business.completeness_score < MIN_COMPLETENESS {
            self.stats.validation_failed += 1;
            return None;
        }

        Some(business)
    }

    async fn quota_cooldown(&self) {
        let base_ms = self.settings.quota_cooldown_secs.saturating_mul(1_000);
        #[allow(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            clippy::cast_precision_loss
        )]
        let delay_ms = (base_ms as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
        tracing::warn!(
            job_id = %self.job_id,
            delay_ms,
            "rate limited; cooling down before one retry"
        );
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }
}

/// Integer progress percentage for `completed` of `total` pairs.
fn progress_percent(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    u8::try_from((completed * 100) / total).unwrap_or(100)
}

/// Final result ordering: best completeness first, then case-insensitive
/// name. Independent of discovery order.
#[must_use]
pub(crate) fn sort_businesses(mut businesses: Vec<Business>) -> Vec<Business> {
    businesses.sort_by(|a, b| {
        b.completeness_score
            .cmp(&a.completeness_score)
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
    });
    businesses
}

/// Normalized dedup key for a website: lower-cased host with any `www.`
/// prefix stripped. `None` for empty or unparseable URLs.
pub(crate) fn website_domain(website: &str) -> Option<String> {
    let trimmed = website.trim();
    if trimmed.is_empty() {
        return None;
    }

    let candidate = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_owned()
    } else {
        format!("https://{trimmed}")
    };

    let url = reqwest::Url::parse(&candidate).ok()?;
    let host = url.host_str()?.to_lowercase();
    Some(host.strip_prefix("www.").unwrap_or(&host).to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn website_domain_strips_scheme_and_www() {
        assert_eq!(
            website_domain("http://www.acme.com"),
            Some("acme.com".to_owned())
        );
        assert_eq!(
            website_domain("https://ACME.com/contact"),
            Some("acme.com".to_owned())
        );
    }

    #[test]
    fn website_domain_handles_bare_domains() {
        assert_eq!(website_domain("acme.com"), Some("acme.com".to_owned()));
        assert_eq!(
            website_domain("www.acme.com/about"),
            Some("acme.com".to_owned())
        );
    }

    #[test]
    fn website_domain_empty_is_none() {
        assert_eq!(website_domain(""), None);
        assert_eq!(website_domain("   "), None);
    }

    fn business(name: &str, score: u8) -> Business {
        Business {
            name: name.to_owned(),
            completeness_score: score,
            ..Business::default()
        }
    }

    #[test]
    fn sort_puts_higher_scores_first() {
        let sorted = sort_businesses(vec![business("Alpha", 2), business("Beta", 4)]);
        assert_eq!(sorted[0].name, "Beta");
        assert_eq!(sorted[1].name, "Alpha");
    }

    #[test]
    fn sort_breaks_ties_by_case_insensitive_name() {
        let sorted = sort_businesses(vec![
            business("zeta plumbing", 3),
            business("Acme Plumbing", 3),
        ]);
        assert_eq!(sorted[0].name, "Acme Plumbing");
        assert_eq!(sorted[1].name, "zeta plumbing");
    }

    #[test]
    fn progress_percent_clamps_and_rounds_down() {
        assert_eq!(progress_percent(0, 4), 0);
        assert_eq!(progress_percent(1, 4), 25);
        assert_eq!(progress_percent(1, 3), 33);
        assert_eq!(progress_percent(4, 4), 100);
        assert_eq!(progress_percent(0, 0), 100);
    }
}
