//! HTTP client for the Places API.
//!
//! Wraps `reqwest` with typed response deserialization, a permanent quota
//! latch, and a courtesy delay after detail lookups. The engine-facing
//! calls are fail-open: a transport failure becomes a synthetic error
//! status (search) or empty fields (details), never an `Err` — the engine
//! treats both as "no data this call".

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use reqwest::{Client, Url};

use crate::error::PlacesError;
use crate::types::{
    DetailsResponse, NearbySearchResponse, PlaceDetails, SearchPage, SearchStatus,
};

const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com";
const NEARBY_PATH: &str = "/maps/api/place/nearbysearch/json";
const DETAILS_PATH: &str = "/maps/api/place/details/json";
const DETAILS_FIELDS: &str = "name,formatted_phone_number,formatted_address,website";

/// Client for the Places nearby-search and details endpoints.
///
/// Use [`PlacesClient::new`] for production or
/// [`PlacesClient::with_base_url`] to point at a mock server in tests.
pub struct PlacesClient {
    client: Client,
    api_key: String,
    base_url: Url,
    radius_meters: u32,
    details_delay_ms: u64,
    quota_exceeded: AtomicBool,
}

impl PlacesClient {
    /// Creates a new client pointed at the production Places API.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        api_key: &str,
        timeout_secs: u64,
        radius_meters: u32,
        details_delay_ms: u64,
    ) -> Result<Self, PlacesError> {
        Self::with_base_url(
            api_key,
            timeout_secs,
            radius_meters,
            details_delay_ms,
            DEFAULT_BASE_URL,
        )
    }

    /// Creates a new client with a custom base URL (for testing with
    /// wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`PlacesError::InvalidBaseUrl`] if
    /// `base_url` does not parse.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        radius_meters: u32,
        details_delay_ms: u64,
        base_url: &str,
    ) -> Result<Self, PlacesError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("bizgrid/0.1 (business-discovery)")
            .build()?;

        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|_| PlacesError::InvalidBaseUrl(base_url.to_owned()))?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
            radius_meters,
            details_delay_ms,
            quota_exceeded: AtomicBool::new(false),
        })
    }

    /// `true` once any response has signalled `OVER_QUERY_LIMIT`. The flag
    /// never resets within a client's lifetime; callers must stop issuing
    /// requests for the remainder of the job once it is set.
    #[must_use]
    pub fn quota_exhausted(&self) -> bool {
        self.quota_exceeded.load(Ordering::Relaxed)
    }

    /// Fetches one page of nearby results for a keyword around a point.
    ///
    /// Transport failures and unparseable bodies yield a synthetic
    /// [`SearchStatus::Transport`] page with no results — callers stop
    /// paginating this location but the job continues.
    pub async fn nearby_search(
        &self,
        lat: f64,
        lng: f64,
        keyword: &str,
        page_token: Option<&str>,
    ) -> SearchPage {
        match self.try_nearby_search(lat, lng, keyword, page_token).await {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!(keyword, error = %e, "nearby search failed; returning empty page");
                SearchPage::transport_failure()
            }
        }
    }

    async fn try_nearby_search(
        &self,
        lat: f64,
        lng: f64,
        keyword: &str,
        page_token: Option<&str>,
    ) -> Result<SearchPage, PlacesError> {
        let url = self.nearby_request_url(lat, lng, keyword, page_token);
        let body = self.request_json(&url).await?;

        let parsed: NearbySearchResponse =
            serde_json::from_value(body).map_err(|e| PlacesError::Deserialize {
                context: format!("nearbySearch(keyword={keyword})"),
                source: e,
            })?;

        let status = SearchStatus::parse(&parsed.status);
        if status == SearchStatus::OverQueryLimit {
            self.quota_exceeded.store(true, Ordering::Relaxed);
        }

        Ok(SearchPage {
            status,
            results: parsed.results,
            next_page_token: parsed.next_page_token,
        })
    }

    /// Looks up contact fields for a place id, then pauses the configured
    /// courtesy delay so consecutive detail lookups stay spaced out.
    ///
    /// Any failure degrades to empty fields; the engine falls back to the
    /// search snippet.
    pub async fn place_details(&self, place_id: &str) -> PlaceDetails {
        let details = match self.try_place_details(place_id).await {
            Ok(details) => details,
            Err(e) => {
                tracing::warn!(place_id, error = %e, "details lookup failed; using empty fields");
                PlaceDetails::default()
            }
        };

        if self.details_delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.details_delay_ms)).await;
        }

        details
    }

    async fn try_place_details(&self, place_id: &str) -> Result<PlaceDetails, PlacesError> {
        let url = self.details_request_url(place_id);
        let body = self.request_json(&url).await?;

        let parsed: DetailsResponse =
            serde_json::from_value(body).map_err(|e| PlacesError::Deserialize {
                context: format!("placeDetails(id={place_id})"),
                source: e,
            })?;

        if SearchStatus::parse(&parsed.status) == SearchStatus::OverQueryLimit {
            self.quota_exceeded.store(true, Ordering::Relaxed);
        }

        Ok(parsed.result.unwrap_or_default())
    }

    /// Builds the nearby-search URL with properly percent-encoded query
    /// parameters.
    fn nearby_request_url(
        &self,
        lat: f64,
        lng: f64,
        keyword: &str,
        page_token: Option<&str>,
    ) -> Url {
        let mut url = self.base_url.clone();
        url.set_path(NEARBY_PATH);
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("key", &self.api_key);
            pairs.append_pair("location", &format!("{lat},{lng}"));
            pairs.append_pair("radius", &self.radius_meters.to_string());
            pairs.append_pair("keyword", keyword);
            if let Some(token) = page_token {
                pairs.append_pair("pagetoken", token);
            }
        }
        url
    }

    /// Builds the details URL restricted to the contact fields the engine
    /// consumes.
    fn details_request_url(&self, place_id: &str) -> Url {
        let mut url = self.base_url.clone();
        url.set_path(DETAILS_PATH);
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("key", &self.api_key);
            pairs.append_pair("place_id", place_id);
            pairs.append_pair("fields", DETAILS_FIELDS);
        }
        url
    }

    /// Sends a GET request, asserts a 2xx HTTP status, and parses the
    /// response body as JSON.
    async fn request_json(&self, url: &Url) -> Result<serde_json::Value, PlacesError> {
        let response = self.client.get(url.clone()).send().await?;
        let response = response.error_for_status()?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| PlacesError::Deserialize {
            context: url.path().to_owned(),
            source: e,
        })
    }
}
