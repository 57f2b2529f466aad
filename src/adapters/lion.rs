//! Lion Air adapter. The one provider `fetcher` retries on failure — see
//! `retry_policy`. Schedule fields are bare local timestamps paired with an
//! IANA zone name rather than a fixed offset, so parsing goes through
//! `common::parse_zoned_schedule` instead of `common::parse_offset_schedule`.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::warn;

use crate::domain::{Airline, Airport, Baggage, CabinClass, Currency, Flight, FlightDuration, Price};

use super::common::{self, LION};
use super::{Adapter, AdapterError, RetryPolicy};

const FIXTURE: &str = include_str!("fixtures/lion.json");
const MOCK_ORIGIN: &str = "CGK";
const MOCK_DESTINATION: &str = "DPS";
const MOCK_DATE: &str = "2025-12-15";

#[derive(Debug, Deserialize)]
struct JtCarrier {
    #[allow(dead_code)]
    name: String,
    #[allow(dead_code)]
    iata: String,
}

#[derive(Debug, Deserialize)]
struct JtEndpoint {
    code: String,
    #[allow(dead_code)]
    name: String,
    #[allow(dead_code)]
    city: String,
}

#[derive(Debug, Deserialize)]
struct JtRoute {
    from: JtEndpoint,
    to: JtEndpoint,
}

#[derive(Debug, Deserialize)]
struct JtSchedule {
    departure: String,
    departure_timezone: String,
    arrival: String,
    arrival_timezone: String,
}

#[derive(Debug, Deserialize)]
struct JtLayover {
    #[allow(dead_code)]
    airport: String,
    duration_minutes: i32,
}

#[derive(Debug, Deserialize)]
struct JtPricing {
    total: i64,
    currency: String,
    fare_type: String,
}

#[derive(Debug, Deserialize)]
struct JtBaggageAllowance {
    cabin: String,
    hold: String,
}

#[derive(Debug, Deserialize)]
struct JtServices {
    wifi_available: bool,
    meals_included: bool,
    baggage_allowance: JtBaggageAllowance,
}

#[derive(Debug, Deserialize)]
struct LionFlight {
    id: String,
    #[allow(dead_code)]
    carrier: JtCarrier,
    route: JtRoute,
    schedule: JtSchedule,
    #[serde(default)]
    #[allow(dead_code)]
    flight_time: i32,
    #[allow(dead_code)]
    is_direct: bool,
    stop_count: i32,
    #[serde(default)]
    layovers: Vec<JtLayover>,
    pricing: JtPricing,
    seats_left: i32,
    plane_type: String,
    services: JtServices,
}

impl LionFlight {
    fn is_valid(&self) -> bool {
        !self.id.is_empty()
            && !self.route.from.code.is_empty()
            && !self.route.to.code.is_empty()
            && self.pricing.total > 0
    }
}

#[derive(Debug, Deserialize)]
struct LionData {
    available_flights: Vec<LionFlight>,
}

#[derive(Debug, Deserialize)]
pub struct LionResponse {
    #[allow(dead_code)]
    success: bool,
    data: LionData,
}

pub struct LionAir;

#[async_trait]
impl Adapter for LionAir {
    type Raw = LionResponse;

    fn provider_key(&self) -> &'static str {
        LION
    }

    fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::Fixed
    }

    async fn fetch_raw(
        &self,
        origin: &str,
        destination: &str,
        departure_date: &str,
    ) -> Result<Self::Raw, AdapterError> {
        common::simulate_delay(200, 400).await;
        if origin != MOCK_ORIGIN || destination != MOCK_DESTINATION || departure_date != MOCK_DATE {
            return Ok(LionResponse { success: true, data: LionData { available_flights: vec![] } });
        }
        if common::simulate_random_error(10) {
            return Err(AdapterError::Unavailable);
        }
        serde_json::from_str(FIXTURE).map_err(|_| AdapterError::Unavailable)
    }

    fn normalize(&self, raw: Self::Raw) -> Vec<Flight> {
        let mut flights = Vec::new();
        for row in raw.data.available_flights {
            if !row.is_valid() {
                warn!(provider = LION, flight = %row.id, "invalid flight data");
                continue;
            }
            let Some((departure_city, arrival_city)) =
                common::resolve_cities(&row.route.from.code, &row.route.to.code)
            else {
                warn!(provider = LION, flight = %row.id, "fail to map origin/destination airport code");
                continue;
            };
            let Some(schedule) = common::parse_zoned_schedule(
                &row.schedule.departure,
                &row.schedule.departure_timezone,
                &row.schedule.arrival,
                &row.schedule.arrival_timezone,
            ) else {
                warn!(provider = LION, flight = %row.id, "fail to parse departure/arrival time");
                continue;
            };

            let cabin_class =
                if row.pricing.fare_type == "ECONOMY" { CabinClass::Economy } else { CabinClass::Business };
            let layover: i32 = row.layovers.iter().map(|l| l.duration_minutes).sum();
            let currency = if row.pricing.currency == "USD" { Currency::Usd } else { Currency::Idr };
            let airline_name = common::AIRLINE_NAMES[LION];

            let mut amenities = Vec::new();
            if row.services.wifi_available {
                amenities.push("wifi".to_string());
            }
            if row.services.meals_included {
                amenities.push("meal".to_string());
            }

            flights.push(Flight {
                id: format!("{}_{}", row.id, LION),
                provider: LION.to_string(),
                airline: Airline { code: LION.to_string(), name: airline_name.to_string() },
                flight_number: row.id,
                departure: Airport {
                    airport_code: row.route.from.code,
                    city_name: departure_city,
                    iso_datetime: schedule.departure_iso,
                    unix_timestamp_seconds: schedule.departure_unix,
                },
                arrival: Airport {
                    airport_code: row.route.to.code,
                    city_name: arrival_city,
                    iso_datetime: schedule.arrival_iso,
                    unix_timestamp_seconds: schedule.arrival_unix,
                },
                duration: FlightDuration::from_minutes(schedule.total_minutes),
                stops: row.stop_count,
                price: Price { amount: row.pricing.total, currency },
                available_seats: row.seats_left,
                cabin_class,
                aircraft: Some(row.plane_type),
                amenities,
                baggage: Baggage {
                    carry_on: row.services.baggage_allowance.cabin,
                    checked: row.services.baggage_allowance.hold,
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
    async fn normalizes_fixture_amenities_in_declared_order() {
        let adapter = LionAir;
        let raw: LionResponse = serde_json::from_str(FIXTURE).unwrap();
        let flights = adapter.normalize(raw);
        assert_eq!(flights.len(), 2);
        assert!(flights[0].amenities.is_empty());
        assert_eq!(flights[1].amenities, vec!["wifi".to_string(), "meal".to_string()]);
        for f in &flights {
            assert!(f.validate().is_ok());
        }
    }

    #[test]
    fn retry_policy_is_fixed() {
        let adapter = LionAir;
        assert!(matches!(adapter.retry_policy(), RetryPolicy::Fixed));
    }

    #[tokio::test]
    async fn returns_empty_for_unknown_route() {
        let adapter = LionAir;
        let raw = adapter.fetch_raw("AAA", "BBB", MOCK_DATE).await.unwrap();
        assert!(raw.data.available_flights.is_empty());
    }
}
