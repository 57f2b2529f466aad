//! Request handler for `POST /flights/search`. Admission strictly precedes
//! validation; validation strictly precedes the cache lookup — `spec.md`
//! §5, "Ordering guarantees".

use std::sync::Arc;

use axum::extract::{rejection::JsonRejection, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::error;

use crate::domain;

use super::responses::{SearchCriteria, SearchMetadata, SearchResponse};
use super::AppState;

const SEARCH_URI: &str = "/flights/search";

pub async fn search_flights(
    State(state): State<Arc<AppState>>,
    body: Result<Json<domain::GetFlightsParams>, JsonRejection>,
) -> (StatusCode, Json<SearchResponse>) {
    if state.limiter.is_exceeded(SEARCH_URI).await {
        return (StatusCode::TOO_MANY_REQUESTS, Json(SearchResponse::rejected("Too many requests")));
    }

    let Json(params) = match body {
        Ok(json) => json,
        Err(rejection) => {
            return (StatusCode::BAD_REQUEST, Json(SearchResponse::rejected(rejection.body_text())));
        }
    };

    if let Err(message) = domain::validate(&params) {
        return (StatusCode::BAD_REQUEST, Json(SearchResponse::rejected(message)));
    }

    match state.coordinator.search(&params).await {
        Ok(outcome) => {
            let response = SearchResponse {
                search_criteria: Some(SearchCriteria::from(&params)),
                metadata: SearchMetadata {
                    total_results: outcome.flights.len(),
                    providers_queried: outcome.provider_count,
                    providers_succeeded: outcome.succeeded_provider,
                    providers_failed: outcome.provider_count.saturating_sub(outcome.succeeded_provider),
                    search_time_ms: outcome.search_time_ms,
                    cache_hit: outcome.is_cache,
                },
                message: "success".to_string(),
                flights: outcome.flights,
            };
            (StatusCode::OK, Json(response))
        }
        Err(err) => {
            error!(error = %err, "search failed");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(SearchResponse::rejected(err.to_string())))
        }
    }
}
