//! HTTP response envelope for `POST /flights/search`. One shape, `spec.md`
//! §6: the same `SearchResponse` is returned on success, validation
//! failure, and admission rejection, with `message`/`flights` adjusted.

use serde::Serialize;

use crate::domain::{Flight, FilterFlightParams, GetFlightsParams};

#[derive(Debug, Serialize)]
pub struct SearchCriteria {
    pub origin: String,
    pub destination: String,
    pub departure_date: String,
    pub passengers: i32,
    pub cabin_class: String,
    pub sort_type: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<FilterFlightParams>,
}

impl From<&GetFlightsParams> for SearchCriteria {
    fn from(params: &GetFlightsParams) -> Self {
        Self {
            origin: params.origin.clone(),
            destination: params.destination.clone(),
            departure_date: params.departure_date.clone(),
            passengers: params.passenger,
            cabin_class: params.cabin_class.clone(),
            sort_type: params.sort_type,
            filter: params.filter.clone(),
        }
    }
}

#[derive(Debug, Default, Serialize)]
pub struct SearchMetadata {
    pub total_results: usize,
    pub providers_queried: u32,
    pub providers_succeeded: u32,
    pub providers_failed: u32,
    pub search_time_ms: u64,
    pub cache_hit: bool,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_criteria: Option<SearchCriteria>,
    pub metadata: SearchMetadata,
    pub message: String,
    pub flights: Vec<Flight>,
}

impl SearchResponse {
    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            search_criteria: None,
            metadata: SearchMetadata::default(),
            message: message.into(),
            flights: vec![],
        }
    }
}
