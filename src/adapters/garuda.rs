//! Garuda Indonesia adapter. Cabin class rule: `"economy"` maps to economy,
//! every other fare class maps to business. Flattens multi-segment
//! itineraries: the arrival endpoint is the last segment's, and layover is
//! the sum of each segment's layover.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::warn;

use crate::domain::{Airline, Airport, Baggage, CabinClass, Currency, Flight, FlightDuration, Price};

use super::common::{self, GARUDA};
use super::{Adapter, AdapterError};

const FIXTURE: &str = include_str!("fixtures/garuda.json");
const MOCK_ORIGIN: &str = "CGK";
const MOCK_DESTINATION: &str = "DPS";
const MOCK_DATE: &str = "2025-12-15";

#[derive(Debug, Deserialize, Clone)]
struct GaAirport {
    airport: String,
    time: String,
}

#[derive(Debug, Deserialize)]
struct GaPrice {
    amount: i64,
    currency: String,
}

#[derive(Debug, Deserialize)]
struct GaBag {
    carry_on: i32,
    checked: i32,
}

#[derive(Debug, Deserialize)]
struct GaSegment {
    arrival: GaAirport,
    #[serde(default)]
    layover_minutes: i32,
}

#[derive(Debug, Deserialize)]
struct GarudaFlight {
    flight_id: String,
    departure: GaAirport,
    arrival: GaAirport,
    stops: i32,
    aircraft: String,
    price: GaPrice,
    available_seats: i32,
    fare_class: String,
    baggage: GaBag,
    #[serde(default)]
    amenities: Vec<String>,
    #[serde(default)]
    segments: Vec<GaSegment>,
}

impl GarudaFlight {
    fn is_valid(&self) -> bool {
        !self.flight_id.is_empty()
            && !self.departure.airport.is_empty()
            && !self.arrival.airport.is_empty()
            && self.price.amount > 0
    }
}

#[derive(Debug, Deserialize)]
pub struct GarudaResponse {
    #[allow(dead_code)]
    status: String,
    flights: Vec<GarudaFlight>,
}

pub struct GarudaAir;

#[async_trait]
impl Adapter for GarudaAir {
    type Raw = GarudaResponse;

    fn provider_key(&self) -> &'static str {
        GARUDA
    }

    async fn fetch_raw(
        &self,
        origin: &str,
        destination: &str,
        departure_date: &str,
    ) -> Result<Self::Raw, AdapterError> {
        common::simulate_delay(50, 150).await;
        if origin != MOCK_ORIGIN || destination != MOCK_DESTINATION || departure_date != MOCK_DATE {
            return Ok(GarudaResponse { status: "success".into(), flights: vec![] });
        }
        serde_json::from_str(FIXTURE).map_err(|_| AdapterError::Unavailable)
    }

    fn normalize(&self, raw: Self::Raw) -> Vec<Flight> {
        let mut flights = Vec::new();
        for row in raw.flights {
            if !row.is_valid() {
                warn!(provider = GARUDA, flight = %row.flight_id, "invalid flight data");
                continue;
            }

            let (arrival_airport, arrival_time) = match row.segments.last() {
                Some(last) => (last.arrival.airport.clone(), last.arrival.time.clone()),
                None => (row.arrival.airport.clone(), row.arrival.time.clone()),
            };

            let Some((departure_city, arrival_city)) =
                common::resolve_cities(&row.departure.airport, &arrival_airport)
            else {
                warn!(provider = GARUDA, flight = %row.flight_id, "fail to map origin/destination airport code");
                continue;
            };
            let Some(schedule) = common::parse_offset_schedule(&row.departure.time, &arrival_time)
            else {
                warn!(provider = GARUDA, flight = %row.flight_id, "fail to parse departure/arrival time");
                continue;
            };

            let cabin_class =
                if row.fare_class == "economy" { CabinClass::Economy } else { CabinClass::Business };
            let layover: i32 = row.segments.iter().map(|s| s.layover_minutes).sum();
            let airline_name = common::AIRLINE_NAMES[GARUDA];
            let currency = if row.price.currency == "USD" { Currency::Usd } else { Currency::Idr };

            flights.push(Flight {
                id: format!("{}_{}", row.flight_id, GARUDA),
                provider: GARUDA.to_string(),
                airline: Airline { code: GARUDA.to_string(), name: airline_name.to_string() },
                flight_number: row.flight_id,
                departure: Airport {
                    airport_code: row.departure.airport,
                    city_name: departure_city,
                    iso_datetime: schedule.departure_iso,
                    unix_timestamp_seconds: schedule.departure_unix,
                },
                arrival: Airport {
                    airport_code: arrival_airport,
                    city_name: arrival_city,
                    iso_datetime: schedule.arrival_iso,
                    unix_timestamp_seconds: schedule.arrival_unix,
                },
                duration: FlightDuration::from_minutes(schedule.total_minutes),
                stops: row.stops,
                price: Price { amount: row.price.amount, currency },
                available_seats: row.available_seats,
                cabin_class,
                aircraft: Some(row.aircraft),
                amenities: row.amenities,
                baggage: Baggage {
                    carry_on: common::baggage_label(row.baggage.carry_on),
                    checked: common::baggage_label(row.baggage.checked),
                },
                layover,
            });
        }
        flights
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn normalizes_multi_segment_itinerary() {
        let adapter = GarudaAir;
        let raw: GarudaResponse = serde_json::from_str(FIXTURE).unwrap();
        let flights = adapter.normalize(raw);
        assert_eq!(flights.len(), 2);
        let connecting = &flights[1];
        assert_eq!(connecting.arrival.airport_code, "DPS");
        assert_eq!(connecting.layover, 65);
        assert_eq!(connecting.price.currency, Currency::Usd);
        for f in &flights {
            assert!(f.validate().is_ok());
        }
    }

    #[tokio::test]
    async fn returns_empty_for_unknown_route() {
        let adapter = GarudaAir;
        let raw = adapter.fetch_raw("AAA", "BBB", MOCK_DATE).await.unwrap();
        assert!(raw.flights.is_empty());
    }
}
