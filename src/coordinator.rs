//! Search coordinator (C4): the per-request algorithm in `spec.md` §4.4 —
//! cache lookup, fall back to the fetcher on a miss, sort, detach a
//! write-back, apply the filter, and assemble the response metadata.

use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;
use tracing::error;

use crate::cache::{self, Cache, CacheError};
use crate::domain::{Flight, GetFlightsParams, SortType};
use crate::fetcher::Fetcher;
use crate::filter;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("cache read failed: {0}")]
    CacheRead(#[from] CacheError),
}

pub struct SearchOutcome {
    pub flights: Vec<Flight>,
    pub provider_count: u32,
    pub succeeded_provider: u32,
    pub search_time_ms: u64,
    pub is_cache: bool,
}

pub struct Coordinator {
    cache: Arc<dyn Cache>,
    fetcher: Fetcher,
}

impl Coordinator {
    pub fn new(cache: Arc<dyn Cache>, fetcher: Fetcher) -> Self {
        Self { cache, fetcher }
    }

    pub async fn search(&self, params: &GetFlightsParams) -> Result<SearchOutcome, SearchError> {
        let started = Instant::now();

        let (mut flights, provider_count, succeeded_provider, is_cache) =
            match self.cache.get_sorted_flights(params).await? {
                Some(flights) => (flights, 0, 0, true),
                None => {
                    let result = self.fetcher.fetch(&params.origin, &params.destination, &params.departure_date).await;
                    let mut flights = result.flights;
                    sort_in_place(&mut flights, params.sort_type());
                    self.spawn_write_back(flights.clone(), params);
                    let succeeded = result.provider_count.saturating_sub(result.failed_count);
                    (flights, result.provider_count, succeeded, false)
                }
            };

        if let Some(filter) = &params.filter {
            flights = filter::apply(flights, filter);
        }

        Ok(SearchOutcome {
            flights,
            provider_count,
            succeeded_provider,
            search_time_ms: started.elapsed().as_millis() as u64,
            is_cache,
        })
    }

    /// Writes the unfiltered, sorted slice back to the cache on a task that
    /// outlives the response. Must not share the request's cancellation
    /// scope — `spec.md` §5, "Cancellation".
    fn spawn_write_back(&self, flights: Vec<Flight>, params: &GetFlightsParams) {
        let cache = self.cache.clone();
        let origin = params.origin.clone();
        let destination = params.destination.clone();
        let departure_date = params.departure_date.clone();
        tokio::spawn(async move {
            if let Err(err) = cache.write_back(&flights, &origin, &destination, &departure_date).await {
                cache::warn_write_back_failure(&origin, &destination, &departure_date, &err);
                error!(origin, destination, departure_date, error = %err, "write-back failed");
            }
        });
    }
}

/// Sorts the merged, cache-miss slice according to the requested sort kind.
/// Ties break on `id` for a deterministic, stable ordering.
fn sort_in_place(flights: &mut [Flight], sort_type: Option<SortType>) {
    let Some(sort_type) = sort_type else {
        return;
    };
    match sort_type {
        SortType::LowestPrice => {
            flights.sort_by(|a, b| a.price.amount_in_idr().cmp(&b.price.amount_in_idr()).then_with(|| a.id.cmp(&b.id)))
        }
        SortType::HighestPrice => {
            flights.sort_by(|a, b| b.price.amount_in_idr().cmp(&a.price.amount_in_idr()).then_with(|| a.id.cmp(&b.id)))
        }
        SortType::ShortestDuration => flights
            .sort_by(|a, b| a.duration.total_minutes.cmp(&b.duration.total_minutes).then_with(|| a.id.cmp(&b.id))),
        SortType::LongestDuration => flights
            .sort_by(|a, b| b.duration.total_minutes.cmp(&a.duration.total_minutes).then_with(|| a.id.cmp(&b.id))),
        SortType::Departure => flights.sort_by(|a, b| {
            a.departure.unix_timestamp_seconds.cmp(&b.departure.unix_timestamp_seconds).then_with(|| a.id.cmp(&b.id))
        }),
        SortType::Arrival => flights.sort_by(|a, b| {
            a.arrival.unix_timestamp_seconds.cmp(&b.arrival.unix_timestamp_seconds).then_with(|| a.id.cmp(&b.id))
        }),
        SortType::BestValue => flights
            .sort_by(|a, b| cache::best_value_score(a).cmp(&cache::best_value_score(b)).then_with(|| a.id.cmp(&b.id))),
    }
}
