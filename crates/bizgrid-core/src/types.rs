//! Shared domain types for discovery jobs.

use serde::{Deserialize, Serialize};

/// A named search origin with coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
}

/// How a job's search locations are chosen: the curated city list for a
/// state, or an explicit caller-supplied city list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeographyMode {
    State,
    City,
}

impl Default for GeographyMode {
    fn default() -> Self {
        GeographyMode::State
    }
}

/// Immutable configuration for one discovery job.
///
/// `keywords` order is significant: the engine exhausts one keyword across
/// all locations before moving to the next.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchJobConfig {
    pub keywords: Vec<String>,
    #[serde(default)]
    pub geography_mode: GeographyMode,
    pub state: String,
    #[serde(default)]
    pub cities: Option<Vec<Location>>,
    pub min_results: u32,
}

/// Lifecycle of a discovery job. `Completed`, `Failed`, and `Cancelled`
/// are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl JobStatus {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled
        )
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Pending => write!(f, "pending"),
            JobStatus::Running => write!(f, "running"),
            JobStatus::Completed => write!(f, "completed"),
            JobStatus::Failed => write!(f, "failed"),
            JobStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Why a job's search loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    TargetReached,
    LocationsExhausted,
    QuotaExceeded,
    NoCitiesConfigured,
    ApiKeyMissing,
    Cancelled,
    Error,
}

impl StopReason {
    /// The short reason label shown to callers.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            StopReason::TargetReached => "Target reached",
            StopReason::LocationsExhausted => "All locations exhausted",
            StopReason::QuotaExceeded => "API quota exceeded",
            StopReason::NoCitiesConfigured => "No cities configured",
            StopReason::ApiKeyMissing => "API key not configured",
            StopReason::Cancelled => "Cancelled by caller",
            StopReason::Error => "Error",
        }
    }

    /// Human-readable explanation with an actionable hint where one exists.
    #[must_use]
    pub fn default_detail(self) -> &'static str {
        match self {
            StopReason::TargetReached => "Found enough valid businesses to meet your target.",
            StopReason::LocationsExhausted => {
                "All cities searched. Try different keywords or state."
            }
            StopReason::QuotaExceeded => "Places API rate limit reached. Wait and retry.",
            StopReason::NoCitiesConfigured => "No cities are configured for this region.",
            StopReason::ApiKeyMissing => "Set the GOOGLE_PLACES_API_KEY environment variable.",
            StopReason::Cancelled => "The job was cancelled before it finished.",
            StopReason::Error => "The job ended with an unexpected error.",
        }
    }
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A validated, deduplicated output record.
///
/// Never stored with a completeness score below 2; unique per `place_id`
/// and per normalized website domain within a job.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Business {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub website: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub search_keyword: String,
    pub place_id: String,
    pub email_source: String,
    pub completeness_score: u8,
}

/// Running counters the engine accumulates as it processes candidates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    pub total_searched: u64,
    pub duplicates: u64,
    pub fake_phones: u64,
    pub fake_emails: u64,
    pub validation_failed: u64,
    pub emails_scraped: u64,
}
