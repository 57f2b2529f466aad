//! Batik Air adapter. Cabin class rule: fare class `"Y"` maps to economy,
//! every other fare class maps to business.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::warn;

use crate::domain::{Airline, Airport, Baggage, CabinClass, Currency, Flight, FlightDuration, Price};

use super::common::{self, BATIK};
use super::{Adapter, AdapterError};

const FIXTURE: &str = include_str!("fixtures/batik.json");
const MOCK_ORIGIN: &str = "CGK";
const MOCK_DESTINATION: &str = "DPS";
const MOCK_DATE: &str = "2025-12-15";

#[derive(Debug, Deserialize)]
struct IdFare {
    #[serde(rename = "totalPrice")]
    total_price: i64,
    #[serde(rename = "currencyCode")]
    currency_code: String,
    class: String,
}

#[derive(Debug, Deserialize)]
struct IdTransit {
    #[serde(rename = "stopDuration")]
    stop_duration: String,
}

#[derive(Debug, Deserialize)]
struct BatikFlight {
    #[serde(rename = "flightNumber")]
    flight_number: String,
    origin: String,
    destination: String,
    #[serde(rename = "departureDateTime")]
    departure_date_time: String,
    #[serde(rename = "arrivalDateTime")]
    arrival_date_time: String,
    #[serde(rename = "numberOfStops")]
    number_of_stops: i32,
    fare: IdFare,
    #[serde(rename = "seatAvailable")]
    seat_available: i32,
    #[serde(rename = "aircraftModel")]
    aircraft_model: String,
    #[serde(rename = "baggageInfo")]
    baggage_info: String,
    #[serde(default, rename = "onBoardServices")]
    on_board_services: Vec<String>,
    #[serde(default)]
    connections: Vec<IdTransit>,
}

impl BatikFlight {
    fn is_valid(&self) -> bool {
        !self.flight_number.is_empty()
            && !self.origin.is_empty()
            && !self.destination.is_empty()
            && self.fare.total_price > 0
    }
}

#[derive(Debug, Deserialize)]
pub struct BatikResponse {
    #[allow(dead_code)]
    code: i32,
    #[serde(rename = "results")]
    flights: Vec<BatikFlight>,
}

pub struct BatikAir;

#[async_trait]
impl Adapter for BatikAir {
    type Raw = BatikResponse;

    fn provider_key(&self) -> &'static str {
        BATIK
    }

    async fn fetch_raw(
        &self,
        origin: &str,
        destination: &str,
        departure_date: &str,
    ) -> Result<Self::Raw, AdapterError> {
        common::simulate_delay(200, 400).await;
        if origin != MOCK_ORIGIN || destination != MOCK_DESTINATION || departure_date != MOCK_DATE {
            return Ok(BatikResponse { code: 200, flights: vec![] });
        }
        serde_json::from_str(FIXTURE).map_err(|_| AdapterError::Unavailable)
    }

    fn normalize(&self, raw: Self::Raw) -> Vec<Flight> {
        let mut flights = Vec::new();
        for row in raw.flights {
            if !row.is_valid() {
                warn!(provider = BATIK, flight = %row.flight_number, "invalid flight data");
                continue;
            }
            let Some((departure_city, arrival_city)) =
                common::resolve_cities(&row.origin, &row.destination)
            else {
                warn!(provider = BATIK, flight = %row.flight_number, "fail to map origin/destination airport code");
                continue;
            };
            let Some(schedule) =
                common::parse_offset_schedule(&row.departure_date_time, &row.arrival_date_time)
            else {
                warn!(provider = BATIK, flight = %row.flight_number, "fail to parse departure/arrival time");
                continue;
            };

            let cabin_class = if row.fare.class == "Y" { CabinClass::Economy } else { CabinClass::Business };

            let mut layover = 0;
            for stop in &row.connections {
                match common::parse_minutes_duration(&stop.stop_duration) {
                    Some(minutes) => layover += minutes,
                    None => {
                        warn!(provider = BATIK, flight = %row.flight_number, duration = %stop.stop_duration, "fail to convert stop duration");
                    }
                }
            }

            let currency = if row.fare.currency_code == "USD" { Currency::Usd } else { Currency::Idr };
            let airline_name = common::AIRLINE_NAMES[BATIK];

            flights.push(Flight {
                id: format!("{}_{}", row.flight_number, BATIK),
                provider: BATIK.to_string(),
                airline: Airline { code: BATIK.to_string(), name: airline_name.to_string() },
                flight_number: row.flight_number,
                departure: Airport {
                    airport_code: row.origin,
                    city_name: departure_city,
                    iso_datetime: schedule.departure_iso,
                    unix_timestamp_seconds: schedule.departure_unix,
                },
                arrival: Airport {
                    airport_code: row.destination,
                    city_name: arrival_city,
                    iso_datetime: schedule.arrival_iso,
                    unix_timestamp_seconds: schedule.arrival_unix,
                },
                duration: FlightDuration::from_minutes(schedule.total_minutes),
                stops: row.number_of_stops,
                price: Price { amount: row.fare.total_price, currency },
                available_seats: row.seat_available,
                cabin_class,
                aircraft: Some(row.aircraft_model),
                amenities: row.on_board_services,
                baggage: baggage_from_info(&row.baggage_info),
                layover,
            });
        }
        flights
    }
}

fn baggage_from_info(info: &str) -> Baggage {
    let mut parts = info.split(',');
    let carry_on = parts.next().map(str::trim).unwrap_or("7kg").to_string();
    let checked = parts.next().map(str::trim).unwrap_or("20kg").to_string();
    Baggage { carry_on, checked }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn normalizes_fixture_with_connection_layover() {
        let adapter = BatikAir;
        let raw: BatikResponse = serde_json::from_str(FIXTURE).unwrap();
        let flights = adapter.normalize(raw);
        assert_eq!(flights.len(), 2);
        assert_eq!(flights[0].cabin_class, CabinClass::Economy);
        assert_eq!(flights[1].cabin_class, CabinClass::Business);
        assert_eq!(flights[1].layover, 65);
        for f in &flights {
            assert!(f.validate().is_ok());
        }
    }

    #[tokio::test]
    async fn returns_empty_for_unknown_date() {
        let adapter = BatikAir;
        let raw = adapter.fetch_raw(MOCK_ORIGIN, MOCK_DESTINATION, "2030-01-01").await.unwrap();
        assert!(raw.flights.is_empty());
    }
}
