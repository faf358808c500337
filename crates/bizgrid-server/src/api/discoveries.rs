//! Discovery job endpoints: submit, status/preview, cancel, CSV export.

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderName, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use bizgrid_core::{Business, GeographyMode, Location, SearchJobConfig, StopReason};
use bizgrid_engine::JobRecord;

use super::{ApiError, ApiResponse, AppState, ResponseMeta};
use crate::middleware::RequestId;

/// Completed jobs with fewer rows than this carry a soft warning.
const LOW_RESULT_THRESHOLD: usize = 10;

const DEFAULT_PREVIEW: usize = 10;

/// Export column order is part of the external contract.
const CSV_HEADERS: &[&str] = &[
    "Business Name",
    "Phone Number",
    "Email",
    "Website",
    "Address",
    "City",
    "State",
    "Search Keyword",
    "Place ID",
    "Email Source",
    "Data Completeness Score",
];

// ---------------------------------------------------------------------------
// Submit
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(super) struct SubmitDiscoveryRequest {
    keywords: Vec<String>,
    #[serde(default)]
    geography_mode: GeographyMode,
    state: String,
    #[serde(default)]
    cities: Option<Vec<Location>>,
    #[serde(default)]
    min_results: Option<u32>,
}

impl SubmitDiscoveryRequest {
    /// Validates the request and lifts it into an immutable job config.
    fn into_config(self, default_min_results: u32) -> Result<SearchJobConfig, String> {
        let keywords: Vec<String> = self
            .keywords
            .into_iter()
            .map(|k| k.trim().to_owned())
            .filter(|k| !k.is_empty())
            .collect();
        if keywords.is_empty() {
            return Err("at least one non-empty keyword is required".to_owned());
        }

        let state = self.state.trim().to_ascii_uppercase();
        if state.len() != 2 || !state.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err("state must be a two-letter code".to_owned());
        }

        let min_results = self.min_results.unwrap_or(default_min_results);
        if !(1..=5000).contains(&min_results) {
            return Err("min_results must be between 1 and 5000".to_owned());
        }

        Ok(SearchJobConfig {
            keywords,
            geography_mode: self.geography_mode,
            state,
            cities: self.cities,
            min_results,
        })
    }
}

#[derive(Debug, Serialize)]
pub(super) struct SubmitData {
    job_id: String,
    status: &'static str,
    message: String,
}

pub(super) async fn submit_discovery(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(request): Json<SubmitDiscoveryRequest>,
) -> Response {
    let config = match request.into_config(state.config.default_min_results) {
        Ok(config) => config,
        Err(message) => {
            return ApiError::new(req_id.0, "validation_error", message).into_response();
        }
    };

    let keywords_summary = config.keywords.join(", ");
    let region = config.state.clone();
    let job_id = state.registry.create(config).await;
    bizgrid_engine::spawn_job(&state.registry, &state.config, &job_id);
    tracing::info!(job_id = %job_id, state = %region, "discovery job submitted");

    (
        StatusCode::OK,
        Json(ApiResponse {
            data: SubmitData {
                job_id,
                status: "started",
                message: format!("Discovery started for {keywords_summary} in {region}"),
            },
            meta: ResponseMeta::new(req_id.0),
        }),
    )
        .into_response()
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(super) struct StatusQuery {
    preview: Option<usize>,
}

#[derive(Debug, Serialize)]
pub(super) struct DiscoveryStatusData {
    job_id: String,
    status: bizgrid_core::JobStatus,
    progress: u8,
    current_keyword: String,
    current_city: String,
    total_valid: u64,
    preview_count: usize,
    preview: Vec<Business>,
    counts: StatusCounts,
    stop_reason: Option<&'static str>,
    stop_reason_detail: Option<String>,
    low_result_warning: Option<LowResultWarning>,
}

#[derive(Debug, Serialize)]
struct StatusCounts {
    with_phone: usize,
    with_email: usize,
    with_website: usize,
    states_covered: usize,
    total_searched: u64,
    duplicates_removed: u64,
    fake_phones_filtered: u64,
    fake_emails_filtered: u64,
    validation_failed: u64,
    emails_scraped: u64,
}

#[derive(Debug, Serialize)]
struct LowResultWarning {
    message: String,
    suggestions: Vec<&'static str>,
}

pub(super) async fn get_discovery(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
    Query(query): Query<StatusQuery>,
    Extension(req_id): Extension<RequestId>,
) -> Response {
    let Some(record) = state.registry.snapshot(&job_id).await else {
        return job_not_found(req_id.0, &job_id);
    };

    let preview_limit = query.preview.unwrap_or(DEFAULT_PREVIEW).clamp(1, 100);
    let preview: Vec<Business> = record
        .businesses
        .iter()
        .take(preview_limit)
        .cloned()
        .collect();

    let total = record.businesses.len();
    let low_result_warning = (record.status == bizgrid_core::JobStatus::Completed
        && total < LOW_RESULT_THRESHOLD)
        .then(|| LowResultWarning {
            message: format!("Fewer than {LOW_RESULT_THRESHOLD} valid businesses found."),
            suggestions: vec![
                "Try broader keywords",
                "Select a different state",
                "Some industries have fewer listings",
            ],
        });

    let states_covered = {
        let mut states: Vec<&str> = record
            .businesses
            .iter()
            .map(|b| b.state.as_str())
            .filter(|s| !s.is_empty())
            .collect();
        states.sort_unstable();
        states.dedup();
        states.len()
    };

    let data = DiscoveryStatusData {
        job_id: record.job_id.clone(),
        status: record.status,
        progress: record.progress,
        current_keyword: record.current_keyword.clone(),
        current_city: record.current_city.clone(),
        total_valid: record.valid_count,
        preview_count: preview.len(),
        preview,
        counts: StatusCounts {
            with_phone: record.businesses.iter().filter(|b| !b.phone.is_empty()).count(),
            with_email: record.businesses.iter().filter(|b| !b.email.is_empty()).count(),
            with_website: record
                .businesses
                .iter()
                .filter(|b| !b.website.is_empty())
                .count(),
            states_covered,
            total_searched: record.stats.total_searched,
            duplicates_removed: record.stats.duplicates,
            fake_phones_filtered: record.stats.fake_phones,
            fake_emails_filtered: record.stats.fake_emails,
            validation_failed: record.stats.validation_failed,
            emails_scraped: record.stats.emails_scraped,
        },
        stop_reason: record.stop_reason.map(StopReason::as_str),
        stop_reason_detail: (!record.stop_detail.is_empty()).then(|| record.stop_detail.clone()),
        low_result_warning,
    };

    (
        StatusCode::OK,
        Json(ApiResponse {
            data,
            meta: ResponseMeta::new(req_id.0),
        }),
    )
        .into_response()
}

// ---------------------------------------------------------------------------
// Cancel
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub(super) struct CancelData {
    job_id: String,
    cancelling: bool,
}

pub(super) async fn cancel_discovery(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
    Extension(req_id): Extension<RequestId>,
) -> Response {
    let Some(record) = state.registry.snapshot(&job_id).await else {
        return job_not_found(req_id.0, &job_id);
    };

    if record.status.is_terminal() {
        return ApiError::new(
            req_id.0,
            "conflict",
            format!("job already finished ({})", record.status),
        )
        .into_response();
    }

    state.registry.cancel(&job_id).await;
    tracing::info!(job_id = %job_id, "cancellation requested");

    (
        StatusCode::OK,
        Json(ApiResponse {
            data: CancelData {
                job_id,
                cancelling: true,
            },
            meta: ResponseMeta::new(req_id.0),
        }),
    )
        .into_response()
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

pub(super) async fn export_discovery(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
    Extension(req_id): Extension<RequestId>,
) -> Response {
    let Some(record) = state.registry.snapshot(&job_id).await else {
        return job_not_found(req_id.0, &job_id);
    };

    if record.status != bizgrid_core::JobStatus::Completed {
        return ApiError::new(
            req_id.0,
            "bad_request",
            format!("job not completed ({})", record.status),
        )
        .into_response();
    }

    let csv = render_csv(&record.businesses);
    let filename = export_filename(&record);
    let headers = [
        (
            header::CONTENT_TYPE,
            "text/csv; charset=utf-8".to_owned(),
        ),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        ),
        (
            HeaderName::from_static("x-total-rows"),
            record.businesses.len().to_string(),
        ),
    ];

    (StatusCode::OK, headers, csv).into_response()
}

fn job_not_found(request_id: String, job_id: &str) -> Response {
    ApiError::new(
        request_id,
        "not_found",
        format!("job '{job_id}' not found"),
    )
    .into_response()
}

/// RFC-4180 field quoting: quote when the value carries a comma, quote, or
/// newline; embedded quotes double.
fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_owned()
    }
}

fn render_csv(businesses: &[Business]) -> String {
    let mut out = String::new();
    out.push_str(&CSV_HEADERS.join(","));
    out.push('\n');

    for business in businesses {
        let score = business.completeness_score.to_string();
        let fields = [
            business.name.as_str(),
            business.phone.as_str(),
            business.email.as_str(),
            business.website.as_str(),
            business.address.as_str(),
            business.city.as_str(),
            business.state.as_str(),
            business.search_keyword.as_str(),
            business.place_id.as_str(),
            business.email_source.as_str(),
            score.as_str(),
        ];
        let row: Vec<String> = fields.iter().map(|f| csv_field(f)).collect();
        out.push_str(&row.join(","));
        out.push('\n');
    }

    out
}

/// URL-safe slug of `text`, capped at `max_len`; "search" when nothing
/// survives.
fn slugify(text: &str, max_len: usize) -> String {
    let mut slug = String::new();
    let mut pending_dash = false;
    for c in text.to_lowercase().chars() {
        if slug.len() >= max_len {
            break;
        }
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
                if slug.len() >= max_len {
                    break;
                }
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }

    let slug = slug.trim_end_matches('-');
    if slug.is_empty() {
        "search".to_owned()
    } else {
        slug.to_owned()
    }
}

fn export_filename(record: &JobRecord) -> String {
    let timestamp = Utc::now().format("%Y-%m-%d_%H-%M");
    let keyword = record
        .config
        .keywords
        .first()
        .map_or("search", String::as_str);
    let slug = slugify(keyword, 30);
    let state = &record.config.state;
    let geo = if record.config.geography_mode == GeographyMode::City {
        format!("{state}_multi-city")
    } else {
        state.clone()
    };
    format!(
        "business_discovery_{timestamp}_{slug}_{geo}_{}rows.csv",
        record.businesses.len()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    // -----------------------------------------------------------------------
    // Request validation
    // -----------------------------------------------------------------------

    fn request(keywords: &[&str], state: &str, min_results: Option<u32>) -> SubmitDiscoveryRequest {
        SubmitDiscoveryRequest {
            keywords: keywords.iter().map(|k| (*k).to_owned()).collect(),
            geography_mode: GeographyMode::State,
            state: state.to_owned(),
            cities: None,
            min_results,
        }
    }

    #[test]
    fn into_config_uppercases_state_and_applies_default_min() {
        let config = request(&["plumber"], "tx", None)
            .into_config(500)
            .expect("valid request");
        assert_eq!(config.state, "TX");
        assert_eq!(config.min_results, 500);
    }

    #[test]
    fn into_config_drops_blank_keywords() {
        let config = request(&["  plumber  ", "", "   "], "TX", Some(10))
            .into_config(500)
            .expect("valid request");
        assert_eq!(config.keywords, vec!["plumber".to_owned()]);
    }

    #[test]
    fn into_config_rejects_all_blank_keywords() {
        let err = request(&["", "  "], "TX", None).into_config(500).unwrap_err();
        assert!(err.contains("keyword"));
    }

    #[test]
    fn into_config_rejects_long_state() {
        let err = request(&["plumber"], "Texas", None)
            .into_config(500)
            .unwrap_err();
        assert!(err.contains("two-letter"));
    }

    #[test]
    fn into_config_rejects_min_results_bounds() {
        assert!(request(&["plumber"], "TX", Some(0)).into_config(500).is_err());
        assert!(request(&["plumber"], "TX", Some(5001))
            .into_config(500)
            .is_err());
        assert!(request(&["plumber"], "TX", Some(5000))
            .into_config(500)
            .is_ok());
    }

    // -----------------------------------------------------------------------
    // CSV rendering
    // -----------------------------------------------------------------------

    #[test]
    fn csv_field_quotes_only_when_needed() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(csv_field("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn render_csv_emits_header_for_empty_list() {
        let csv = render_csv(&[]);
        assert_eq!(csv.lines().count(), 1);
        assert!(csv.starts_with("Business Name,Phone Number,"));
    }

    #[test]
    fn render_csv_emits_one_row_per_business() {
        let businesses = vec![
            Business {
                name: "Acme".to_owned(),
                phone: "(512) 837-0134".to_owned(),
                completeness_score: 2,
                ..Business::default()
            },
            Business {
                name: "Beta, Inc".to_owned(),
                completeness_score: 3,
                ..Business::default()
            },
        ];
        let csv = render_csv(&businesses);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("Acme,"));
        assert!(lines[2].starts_with("\"Beta, Inc\","));
        assert!(lines[1].ends_with(",2"));
    }

    // -----------------------------------------------------------------------
    // Filenames
    // -----------------------------------------------------------------------

    #[test]
    fn slugify_flattens_non_alphanumerics() {
        assert_eq!(slugify("HVAC Repair & Install", 30), "hvac-repair-install");
        assert_eq!(slugify("plumber", 30), "plumber");
        assert_eq!(slugify("!!!", 30), "search");
        assert_eq!(slugify("", 30), "search");
    }

    #[test]
    fn slugify_respects_max_len() {
        let slug = slugify("a very long keyword phrase that keeps going", 10);
        assert!(slug.len() <= 10);
        assert!(!slug.ends_with('-'));
    }

    #[test]
    fn export_filename_carries_keyword_geo_and_rowcount() {
        let record = JobRecord {
            job_id: "abc12345".to_owned(),
            status: bizgrid_core::JobStatus::Completed,
            progress: 100,
            config: SearchJobConfig {
                keywords: vec!["HVAC Repair".to_owned()],
                geography_mode: GeographyMode::City,
                state: "TX".to_owned(),
                cities: None,
                min_results: 10,
            },
            businesses: vec![Business::default()],
            stats: bizgrid_core::RunStats::default(),
            valid_count: 1,
            stop_reason: Some(StopReason::TargetReached),
            stop_detail: String::new(),
            current_keyword: String::new(),
            current_city: String::new(),
            created_at: Utc::now(),
        };
        let filename = export_filename(&record);
        assert!(filename.starts_with("business_discovery_"));
        assert!(filename.contains("_hvac-repair_"));
        assert!(filename.contains("_TX_multi-city_"));
        assert!(filename.ends_with("_1rows.csv"));
    }
}
