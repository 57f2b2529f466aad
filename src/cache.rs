//! Sort/cache engine (C3): a Redis-backed store that pre-materializes every
//! sort ordering for a route/date as a scored set, plus the flight bodies
//! themselves as plain string values. Mirrors the key schema and scoring
//! rules of `spec.md` §4.3.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, RedisError};
use thiserror::Error;
use tracing::{info, warn};

use crate::domain::{Flight, GetFlightsParams, SortType};

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache backend error: {0}")]
    Backend(#[from] RedisError),
    #[error("fail to encode flight: {0}")]
    Encode(#[from] serde_json::Error),
}

/// The sort/cache engine's capability surface, extracted so the search
/// coordinator can be exercised in tests against an in-memory double
/// instead of a live Redis instance.
#[async_trait]
pub trait Cache: Send + Sync {
    async fn get_sorted_flights(&self, params: &GetFlightsParams) -> Result<Option<Vec<Flight>>, CacheError>;

    async fn write_back(
        &self,
        flights: &[Flight],
        origin: &str,
        destination: &str,
        departure_date: &str,
    ) -> Result<(), CacheError>;
}

#[derive(Clone)]
pub struct CacheService {
    conn: ConnectionManager,
    ttl_seconds: u64,
}

impl CacheService {
    /// Builds a cache service on top of an already-connected manager, so it
    /// can share one pool with `AdmissionLimiter` against the same backing
    /// store — `spec.md` §5, "the backing key-value store is the only
    /// shared mutable resource; it is accessed via a thread-safe client
    /// pool" (singular).
    pub fn new(conn: ConnectionManager, ttl_seconds: u64) -> Self {
        Self { conn, ttl_seconds }
    }

    pub async fn connect(redis_url: &str, ttl_seconds: u64) -> Result<Self, CacheError> {
        let client = redis::Client::open(redis_url)?;
        let conn = ConnectionManager::new(client).await?;
        Ok(Self::new(conn, ttl_seconds))
    }

    async fn construct_by_ids(&self, ids: &[String]) -> Result<Vec<Flight>, CacheError> {
        let mut conn = self.conn.clone();
        let bodies: Vec<Option<String>> = conn.mget(ids).await?;
        let mut flights = Vec::with_capacity(bodies.len());
        for body in bodies.into_iter().flatten() {
            flights.push(serde_json::from_str(&body)?);
        }
        Ok(flights)
    }
}

#[async_trait]
impl Cache for CacheService {
    /// Reads the ordering for `params.sort_type`, reconstructing flight
    /// bodies in the order the scored set returns their ids. `Ok(None)`
    /// signals a cache miss (empty ordering), matching the original's
    /// `redis.Nil` sentinel.
    async fn get_sorted_flights(&self, params: &GetFlightsParams) -> Result<Option<Vec<Flight>>, CacheError> {
        let Some(sort_type) = params.sort_type() else {
            return Ok(None);
        };
        let key = make_key(&params.origin, &params.destination, &params.departure_date, sort_type);

        let mut conn = self.conn.clone();
        let ids: Vec<String> = if sort_type.is_ascending() {
            conn.zrangebyscore(&key, "-inf", "+inf").await?
        } else {
            conn.zrevrangebyscore(&key, "+inf", "-inf").await?
        };

        if ids.is_empty() {
            return Ok(None);
        }
        Ok(Some(self.construct_by_ids(&ids).await?))
    }

    /// Writes every flight's body plus its membership in all five ordering
    /// sets, pairing each ordering set with an `EXPIRE` so stale orderings
    /// don't accumulate indefinitely (`spec.md` §9 open question 3).
    ///
    /// `ttl_seconds == 0` means no expiry, matching the Go original's
    /// `Set(ctx, key, val, 0)` — `SETEX key 0` and `EXPIRE key 0` don't mean
    /// that to Redis (the former errors, the latter deletes the key
    /// immediately), so a zero TTL instead falls back to a plain `SET`/no
    /// `EXPIRE` call.
    async fn write_back(
        &self,
        flights: &[Flight],
        origin: &str,
        destination: &str,
        departure_date: &str,
    ) -> Result<(), CacheError> {
        info!(count = flights.len(), origin, destination, departure_date, "writing flights back to cache");
        let mut conn = self.conn.clone();
        for flight in flights {
            let body = serde_json::to_string(flight)?;
            if self.ttl_seconds == 0 {
                conn.set::<_, _, ()>(&flight.id, body).await?;
            } else {
                conn.set_ex::<_, _, ()>(&flight.id, body, self.ttl_seconds).await?;
            }

            for sort_type in [
                SortType::LowestPrice,
                SortType::Departure,
                SortType::Arrival,
                SortType::ShortestDuration,
                SortType::BestValue,
            ] {
                let key = make_key(origin, destination, departure_date, sort_type);
                let score = score_for(flight, sort_type) as f64;
                conn.zadd::<_, _, _, ()>(&key, &flight.id, score).await?;
                if self.ttl_seconds > 0 {
                    conn.expire::<_, ()>(&key, self.ttl_seconds as i64).await?;
                }
            }
        }
        Ok(())
    }
}

fn make_key(origin: &str, destination: &str, departure_date: &str, sort_type: SortType) -> String {
    format!("flights:{origin}:{destination}:{departure_date}:{}", sort_type.cache_suffix())
}

/// Score for the ordering set a given sort kind belongs to. `HighestPrice`
/// and `LongestDuration` read the same ascending-scored set in reverse, so
/// they never need their own write.
fn score_for(flight: &Flight, sort_type: SortType) -> i64 {
    match sort_type {
        SortType::LowestPrice | SortType::HighestPrice => flight.price.amount_in_idr(),
        SortType::ShortestDuration | SortType::LongestDuration => flight.duration.total_minutes as i64,
        SortType::Departure => flight.departure.unix_timestamp_seconds,
        SortType::Arrival => flight.arrival.unix_timestamp_seconds,
        SortType::BestValue => best_value_score(flight),
    }
}

/// `price_idr + floor((total_minutes * 10000) / class_multiplier)`. Lower
/// is better; business halves the duration penalty at equal money-time.
pub fn best_value_score(flight: &Flight) -> i64 {
    let duration_term = (flight.duration.total_minutes as i64 * 10_000) / flight.cabin_class.best_value_divisor();
    flight.price.amount_in_idr() + duration_term
}

pub fn warn_write_back_failure(origin: &str, destination: &str, departure_date: &str, err: &CacheError) {
    warn!(origin, destination, departure_date, error = %err, "cache write-back failed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Airline, Airport, Baggage, CabinClass, Currency, FlightDuration, Price};

    fn sample_flight(price: i64, minutes: i32, class: CabinClass) -> Flight {
        Flight {
            id: "JT1_lion".to_string(),
            provider: "lion".to_string(),
            airline: Airline { code: "lion".to_string(), name: "Lion Air".to_string() },
            flight_number: "JT1".to_string(),
            departure: Airport {
                airport_code: "CGK".to_string(),
                city_name: "Jakarta".to_string(),
                iso_datetime: "2025-12-15T05:00:00+07:00".to_string(),
                unix_timestamp_seconds: 1_765_767_600,
            },
            arrival: Airport {
                airport_code: "DPS".to_string(),
                city_name: "Denpasar".to_string(),
                iso_datetime: "2025-12-15T08:00:00+08:00".to_string(),
                unix_timestamp_seconds: 1_765_778_400,
            },
            duration: FlightDuration::from_minutes(minutes),
            stops: 0,
            price: Price { amount: price, currency: Currency::Idr },
            available_seats: 10,
            cabin_class: class,
            aircraft: None,
            amenities: vec![],
            baggage: Baggage { carry_on: "7kg".to_string(), checked: "20kg".to_string() },
            layover: 0,
        }
    }

    #[test]
    fn best_value_prefers_business_at_equal_money_time() {
        let economy = sample_flight(1_000_000, 120, CabinClass::Economy);
        let business = sample_flight(1_000_000, 120, CabinClass::Business);
        assert!(best_value_score(&business) < best_value_score(&economy));
    }

    #[test]
    fn key_uses_sort_suffix() {
        let key = make_key("CGK", "DPS", "2025-12-15", SortType::LowestPrice);
        assert_eq!(key, "flights:CGK:DPS:2025-12-15:price");
        let key = make_key("CGK", "DPS", "2025-12-15", SortType::HighestPrice);
        assert_eq!(key, "flights:CGK:DPS:2025-12-15:price");
    }
}
