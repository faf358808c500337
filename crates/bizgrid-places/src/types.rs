//! Typed response shapes for the Places API.

use serde::Deserialize;

/// Wire shape of one nearby-search page.
#[derive(Debug, Clone, Deserialize)]
pub struct NearbySearchResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub results: Vec<PlaceSummary>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// One raw search hit before validation: the opaque id plus whatever the
/// search page already knows about the listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlaceSummary {
    #[serde(default)]
    pub place_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub vicinity: String,
}

/// Wire shape of a details lookup.
#[derive(Debug, Clone, Deserialize)]
pub struct DetailsResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub result: Option<PlaceDetails>,
}

/// Contact fields from a details lookup. All fields default to empty so a
/// failed or partial lookup degrades to "no data" rather than an error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlaceDetails {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub formatted_phone_number: String,
    #[serde(default)]
    pub formatted_address: String,
    #[serde(default)]
    pub website: String,
}

/// Search page status as the engine sees it. `Transport` is synthesized by
/// the client when the request itself failed; the provider never sends it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchStatus {
    Ok,
    ZeroResults,
    OverQueryLimit,
    Transport,
    Other(String),
}

impl SearchStatus {
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw {
            "OK" => SearchStatus::Ok,
            "ZERO_RESULTS" => SearchStatus::ZeroResults,
            "OVER_QUERY_LIMIT" => SearchStatus::OverQueryLimit,
            other => SearchStatus::Other(other.to_owned()),
        }
    }

    /// `true` for statuses whose results (possibly empty) are safe to
    /// process and paginate past.
    #[must_use]
    pub fn is_processable(&self) -> bool {
        matches!(self, SearchStatus::Ok | SearchStatus::ZeroResults)
    }
}

/// One page of nearby-search results, post-status-triage.
#[derive(Debug, Clone)]
pub struct SearchPage {
    pub status: SearchStatus,
    pub results: Vec<PlaceSummary>,
    pub next_page_token: Option<String>,
}

impl SearchPage {
    /// The synthetic page returned when the request never produced a
    /// parseable response.
    #[must_use]
    pub fn transport_failure() -> Self {
        Self {
            status: SearchStatus::Transport,
            results: Vec::new(),
            next_page_token: None,
        }
    }
}
