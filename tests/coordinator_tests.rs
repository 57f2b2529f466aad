//! Exercises the search coordinator's cache-hit and cache-miss branches
//! against an in-memory `Cache` double, without a live Redis instance.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use flight_search::cache::{Cache, CacheError};
use flight_search::config::Config;
use flight_search::coordinator::Coordinator;
use flight_search::domain::{
    Airline, Airport, Baggage, CabinClass, Currency, Flight, FlightDuration, GetFlightsParams, Price, SortType,
};
use flight_search::fetcher::Fetcher;

fn sample_flight(id: &str) -> Flight {
    Flight {
        id: id.to_string(),
        provider: "airasia".to_string(),
        airline: Airline { code: "airasia".to_string(), name: "AirAsia Indonesia".to_string() },
        flight_number: id.to_string(),
        departure: Airport {
            airport_code: "CGK".to_string(),
            city_name: "Jakarta".to_string(),
            iso_datetime: "2025-12-15T06:00:00+07:00".to_string(),
            unix_timestamp_seconds: 1_765_767_600,
        },
        arrival: Airport {
            airport_code: "DPS".to_string(),
            city_name: "Denpasar".to_string(),
            iso_datetime: "2025-12-15T08:50:00+08:00".to_string(),
            unix_timestamp_seconds: 1_765_778_400,
        },
        duration: FlightDuration::from_minutes(170),
        stops: 0,
        price: Price { amount: 1_000_000, currency: Currency::Idr },
        available_seats: 10,
        cabin_class: CabinClass::Economy,
        aircraft: None,
        amenities: vec![],
        baggage: Baggage { carry_on: "7kg".to_string(), checked: "20kg".to_string() },
        layover: 0,
    }
}

fn search_params(sort_type: i64) -> GetFlightsParams {
    GetFlightsParams {
        origin: "CGK".to_string(),
        destination: "DPS".to_string(),
        departure_date: "2025-12-15".to_string(),
        passenger: 1,
        return_date: None,
        sort_type,
        cabin_class: "economy".to_string(),
        filter: None,
    }
}

/// An in-memory stand-in for `CacheService`: pre-seeded orderings serve
/// `get_sorted_flights` as a hit; `write_back` records what it was asked to
/// persist so a miss path can be asserted on without a real backing store.
#[derive(Default)]
struct FakeCache {
    seeded: Mutex<Option<Vec<Flight>>>,
    written: Mutex<Vec<Flight>>,
}

#[async_trait]
impl Cache for FakeCache {
    async fn get_sorted_flights(&self, _params: &GetFlightsParams) -> Result<Option<Vec<Flight>>, CacheError> {
        Ok(self.seeded.lock().unwrap().clone())
    }

    async fn write_back(
        &self,
        flights: &[Flight],
        _origin: &str,
        _destination: &str,
        _departure_date: &str,
    ) -> Result<(), CacheError> {
        self.written.lock().unwrap().extend_from_slice(flights);
        Ok(())
    }
}

#[tokio::test]
async fn cache_hit_short_circuits_the_fetcher() {
    let fake = Arc::new(FakeCache::default());
    *fake.seeded.lock().unwrap() = Some(vec![sample_flight("seeded_1"), sample_flight("seeded_2")]);

    let coordinator = Coordinator::new(fake, Fetcher::new(Config::for_tests()));
    let outcome = coordinator.search(&search_params(SortType::LowestPrice as i64)).await.unwrap();

    assert!(outcome.is_cache);
    assert_eq!(outcome.provider_count, 0);
    assert_eq!(outcome.succeeded_provider, 0);
    assert_eq!(outcome.flights.len(), 2);
    assert_eq!(outcome.flights[0].id, "seeded_1");
}

#[tokio::test]
async fn cache_miss_falls_back_to_the_fetcher_and_reports_provider_counts() {
    let fake = Arc::new(FakeCache::default());

    let coordinator = Coordinator::new(fake, Fetcher::new(Config::for_tests()));
    let outcome = coordinator.search(&search_params(SortType::LowestPrice as i64)).await.unwrap();

    assert!(!outcome.is_cache);
    assert_eq!(outcome.provider_count, 4);
    assert!(outcome.succeeded_provider <= outcome.provider_count);
    assert!(!outcome.flights.is_empty());
}

#[tokio::test]
async fn cache_miss_response_is_sorted_before_filter_is_applied() {
    let fake = Arc::new(FakeCache::default());
    let coordinator = Coordinator::new(fake, Fetcher::new(Config::for_tests()));

    let outcome = coordinator.search(&search_params(SortType::LowestPrice as i64)).await.unwrap();
    let prices: Vec<i64> = outcome.flights.iter().map(|f| f.price.amount_in_idr()).collect();
    let mut sorted = prices.clone();
    sorted.sort();
    assert_eq!(prices, sorted);
}
