//! Reference-data endpoints: supported states and their search cities.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Serialize;

use bizgrid_core::regions;

use super::{ApiError, ApiResponse, AppState, ResponseMeta};
use crate::middleware::RequestId;

#[derive(Debug, Serialize)]
pub(super) struct StateItem {
    code: &'static str,
    name: &'static str,
}

pub(super) async fn list_states(Extension(req_id): Extension<RequestId>) -> impl IntoResponse {
    let data: Vec<StateItem> = regions::all_states()
        .into_iter()
        .map(|(code, name)| StateItem { code, name })
        .collect();
    (
        StatusCode::OK,
        Json(ApiResponse {
            data,
            meta: ResponseMeta::new(req_id.0),
        }),
    )
}

#[derive(Debug, Serialize)]
pub(super) struct CitiesData {
    state: String,
    cities: Vec<String>,
}

pub(super) async fn list_cities(
    State(state): State<AppState>,
    Path(region): Path<String>,
    Extension(req_id): Extension<RequestId>,
) -> Response {
    let upper = region.to_ascii_uppercase();
    if regions::state_name(&upper).is_none() {
        return ApiError::new(
            req_id.0,
            "not_found",
            format!("unknown state '{region}'"),
        )
        .into_response();
    }

    let overrides = state
        .config
        .regions_path
        .as_deref()
        .and_then(|path| regions::load_regions(path).ok());
    let cities: Vec<String> = overrides
        .as_ref()
        .and_then(|file| file.cities_for_state(&upper))
        .map(|cities| cities.iter().map(|c| c.name.clone()).collect())
        .unwrap_or_else(|| {
            regions::cities_for_state(&upper)
                .into_iter()
                .map(|l| l.name)
                .collect()
        });

    (
        StatusCode::OK,
        Json(ApiResponse {
            data: CitiesData {
                state: upper,
                cities,
            },
            meta: ResponseMeta::new(req_id.0),
        }),
    )
        .into_response()
}
