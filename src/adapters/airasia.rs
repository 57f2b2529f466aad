//! AirAsia adapter. Cabin class rule: `"business"` maps to business, every
//! other value maps to economy.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::warn;

use crate::domain::{Airline, Airport, Baggage, CabinClass, Currency, Flight, FlightDuration, Price};

use super::common::{self, AIRASIA};
use super::{Adapter, AdapterError};

const FIXTURE: &str = include_str!("fixtures/airasia.json");
const MOCK_ORIGIN: &str = "CGK";
const MOCK_DESTINATION: &str = "DPS";
const MOCK_DATE: &str = "2025-12-15";

#[derive(Debug, Deserialize)]
struct QzTransit {
    #[serde(default)]
    wait_time_minutes: i32,
}

#[derive(Debug, Deserialize)]
struct AirAsiaFlight {
    flight_code: String,
    from_airport: String,
    to_airport: String,
    depart_time: String,
    arrive_time: String,
    price_idr: i64,
    seats: i32,
    cabin_class: String,
    baggage_note: String,
    #[serde(default)]
    stops: Vec<QzTransit>,
}

impl AirAsiaFlight {
    fn is_valid(&self) -> bool {
        !self.flight_code.is_empty()
            && !self.from_airport.is_empty()
            && !self.to_airport.is_empty()
            && self.price_idr > 0
    }
}

#[derive(Debug, Deserialize)]
pub struct AirAsiaResponse {
    #[allow(dead_code)]
    status: String,
    flights: Vec<AirAsiaFlight>,
}

pub struct AirAsia;

#[async_trait]
impl Adapter for AirAsia {
    type Raw = AirAsiaResponse;

    fn provider_key(&self) -> &'static str {
        AIRASIA
    }

    async fn fetch_raw(
        &self,
        origin: &str,
        destination: &str,
        departure_date: &str,
    ) -> Result<Self::Raw, AdapterError> {
        common::simulate_delay(50, 150).await;
        if origin != MOCK_ORIGIN || destination != MOCK_DESTINATION || departure_date != MOCK_DATE {
            return Ok(AirAsiaResponse { status: "success".into(), flights: vec![] });
        }
        if common::simulate_random_error(10) {
            return Err(AdapterError::Unavailable);
        }
        serde_json::from_str(FIXTURE).map_err(|_| AdapterError::Unavailable)
    }

    fn normalize(&self, raw: Self::Raw) -> Vec<Flight> {
        let mut flights = Vec::new();
        for row in raw.flights {
            if !row.is_valid() {
                warn!(provider = AIRASIA, flight = %row.flight_code, "invalid flight data");
                continue;
            }
            let Some((departure_city, arrival_city)) =
                common::resolve_cities(&row.from_airport, &row.to_airport)
            else {
                warn!(provider = AIRASIA, flight = %row.flight_code, "fail to map origin/destination airport code");
                continue;
            };
            let Some(schedule) = common::parse_offset_schedule(&row.depart_time, &row.arrive_time)
            else {
                warn!(provider = AIRASIA, flight = %row.flight_code, "fail to parse departure/arrival time");
                continue;
            };

            let cabin_class =
                if row.cabin_class == "business" { CabinClass::Business } else { CabinClass::Economy };
            let layover: i32 = row.stops.iter().map(|s| s.wait_time_minutes).sum();
            let airline_name = common::AIRLINE_NAMES[AIRASIA];

            flights.push(Flight {
                id: format!("{}_{}", row.flight_code, AIRASIA),
                provider: AIRASIA.to_string(),
                airline: Airline { code: AIRASIA.to_string(), name: airline_name.to_string() },
                flight_number: row.flight_code,
                departure: Airport {
                    airport_code: row.from_airport,
                    city_name: departure_city,
                    iso_datetime: schedule.departure_iso,
                    unix_timestamp_seconds: schedule.departure_unix,
                },
                arrival: Airport {
                    airport_code: row.to_airport,
                    city_name: arrival_city,
                    iso_datetime: schedule.arrival_iso,
                    unix_timestamp_seconds: schedule.arrival_unix,
                },
                duration: FlightDuration::from_minutes(schedule.total_minutes),
                stops: row.stops.len() as i32,
                price: Price { amount: row.price_idr, currency: Currency::Idr },
                available_seats: row.seats,
                cabin_class,
                aircraft: None,
                amenities: vec![],
                baggage: baggage_from_note(&row.baggage_note),
                layover,
            });
        }
        flights
    }
}

fn baggage_from_note(note: &str) -> Baggage {
    let mut parts = note.split(',');
    let carry_on = parts.next().map(str::trim).unwrap_or("7kg").to_string();
    let checked = parts.next().map(str::trim).unwrap_or("20kg").to_string();
    Baggage { carry_on, checked }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_empty_for_unknown_route() {
        let adapter = AirAsia;
        let raw = adapter.fetch_raw("AAA", "BBB", MOCK_DATE).await.unwrap();
        assert!(raw.flights.is_empty());
    }

    #[tokio::test]
    async fn normalizes_known_route_fixture() {
        let adapter = AirAsia;
        let raw: AirAsiaResponse = serde_json::from_str(FIXTURE).unwrap();
        let flights = adapter.normalize(raw);
        assert_eq!(flights.len(), 2);
        for f in &flights {
            assert!(f.validate().is_ok());
            assert_eq!(f.provider, AIRASIA);
        }
        assert_eq!(flights[1].cabin_class, CabinClass::Business);
        assert_eq!(flights[1].stops, 1);
        assert_eq!(flights[1].layover, 55);
    }

    #[test]
    fn baggage_note_splits_carry_on_and_checked() {
        let bag = baggage_from_note("7kg cabin, 20kg checked");
        assert_eq!(bag.carry_on, "7kg cabin");
        assert_eq!(bag.checked, "20kg checked");
    }
}
