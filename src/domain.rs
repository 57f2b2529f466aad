//! Canonical data model shared by every provider adapter, the fetcher, the
//! cache, and the HTTP layer.

use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};

/// An operating carrier, as normalized by an adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Airline {
    pub code: String,
    pub name: String,
}

/// A single endpoint (departure or arrival) of a normalized flight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Airport {
    pub airport_code: String,
    pub city_name: String,
    pub iso_datetime: String,
    pub unix_timestamp_seconds: i64,
}

/// Formats total minutes as `"HhMm"` when the flight spans an hour or more,
/// else `"Mm"`.
pub fn format_duration(total_minutes: i32) -> String {
    let h = total_minutes / 60;
    let m = total_minutes % 60;
    if h > 0 {
        format!("{h}h{m}m")
    } else {
        format!("{m}m")
    }
}

/// ISO currency code accepted for `Price::amount`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Idr,
    Usd,
}

/// A fixed USD→IDR rate. Isolated here so a future FX source can replace it
/// without touching scoring/sorting call sites.
pub const USD_TO_IDR_RATE: i64 = 15_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    pub amount: i64,
    pub currency: Currency,
}

impl Price {
    /// The price converted to IDR, the currency every score is computed in.
    pub fn amount_in_idr(&self) -> i64 {
        match self.currency {
            Currency::Idr => self.amount,
            Currency::Usd => self.amount * USD_TO_IDR_RATE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Baggage {
    pub carry_on: String,
    pub checked: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CabinClass {
    Economy,
    Business,
}

impl CabinClass {
    /// Duration divisor used by the best-value score: business halves the
    /// time penalty relative to economy.
    pub fn best_value_divisor(&self) -> i64 {
        match self {
            CabinClass::Business => 2,
            CabinClass::Economy => 1,
        }
    }
}

/// A single canonical flight, normalized from one provider's wire format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flight {
    pub id: String,
    pub provider: String,
    pub airline: Airline,
    pub flight_number: String,
    pub departure: Airport,
    pub arrival: Airport,
    pub duration: FlightDuration,
    pub stops: i32,
    pub price: Price,
    pub available_seats: i32,
    pub cabin_class: CabinClass,
    pub aircraft: Option<String>,
    #[serde(default)]
    pub amenities: Vec<String>,
    pub baggage: Baggage,
    pub layover: i32,
}

/// `Duration` as it appears on the wire: both fields are serialized, unlike
/// the bare `Duration` helper above which derives `formatted` on read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlightDuration {
    pub total_minutes: i32,
    pub formatted: String,
}

impl FlightDuration {
    pub fn from_minutes(total_minutes: i32) -> Self {
        Self { total_minutes, formatted: format_duration(total_minutes) }
    }
}

impl Flight {
    /// The invariants every flight emitted downstream must satisfy
    /// (duplicated structurally rather than via an external validation
    /// crate since each check needs a distinct skip reason for logging).
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.id.is_empty() {
            return Err("missing id");
        }
        if self.flight_number.is_empty() {
            return Err("missing flight number");
        }
        if self.departure.airport_code.is_empty() || self.arrival.airport_code.is_empty() {
            return Err("missing airport code");
        }
        if self.price.amount <= 0 {
            return Err("non-positive price");
        }
        if self.departure.city_name.is_empty() || self.arrival.city_name.is_empty() {
            return Err("unmapped airport city");
        }
        if self.stops < 0 {
            return Err("negative stops");
        }
        if self.layover < 0 {
            return Err("negative layover");
        }
        Ok(())
    }
}

/// Sort kinds, enumerated in the exact order the wire protocol expects
/// (`BEST_VALUE` is `0`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
#[repr(u8)]
pub enum SortType {
    BestValue = 0,
    LowestPrice = 1,
    HighestPrice = 2,
    ShortestDuration = 3,
    LongestDuration = 4,
    Departure = 5,
    Arrival = 6,
}

impl SortType {
    pub fn from_i64(v: i64) -> Option<Self> {
        match v {
            0 => Some(SortType::BestValue),
            1 => Some(SortType::LowestPrice),
            2 => Some(SortType::HighestPrice),
            3 => Some(SortType::ShortestDuration),
            4 => Some(SortType::LongestDuration),
            5 => Some(SortType::Departure),
            6 => Some(SortType::Arrival),
            _ => None,
        }
    }

    /// Cache key suffix shared by sort kinds in the same scored-set family.
    pub fn cache_suffix(&self) -> &'static str {
        match self {
            SortType::LowestPrice | SortType::HighestPrice => "price",
            SortType::ShortestDuration | SortType::LongestDuration => "duration",
            SortType::Departure => "departure",
            SortType::Arrival => "arrival",
            SortType::BestValue => "best",
        }
    }

    /// Whether a cache range-read for this sort kind should be ascending.
    pub fn is_ascending(&self) -> bool {
        !matches!(self, SortType::HighestPrice | SortType::LongestDuration)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeRangeField {
    Departure,
    Arrival,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterFlightPriceParams {
    pub lo: i64,
    pub hi: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterFlightTimeParams {
    #[serde(rename = "type")]
    pub kind: TimeRangeField,
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterFlightParams {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub airline: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<FilterFlightPriceParams>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stops: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_range: Option<FilterFlightTimeParams>,
}

/// One incoming search request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetFlightsParams {
    pub origin: String,
    pub destination: String,
    pub departure_date: String,
    pub passenger: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_date: Option<String>,
    /// Raw wire value; validated and narrowed to `SortType` by `validate`
    /// plus `SortType::from_i64` rather than rejected at JSON-decode time,
    /// so an out-of-range value produces the spec's own error message
    /// instead of a generic deserialization failure.
    pub sort_type: i64,
    pub cabin_class: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<FilterFlightParams>,
}

impl GetFlightsParams {
    pub fn sort_type(&self) -> Option<SortType> {
        SortType::from_i64(self.sort_type)
    }
}

/// Rejects malformed search params before any provider or cache work
/// happens. First-failing rule wins; later rules are not evaluated.
pub fn validate(params: &GetFlightsParams) -> Result<(), &'static str> {
    if params.origin.is_empty() {
        return Err("origin must be filled");
    }
    if params.destination.is_empty() {
        return Err("destination must be filled");
    }
    if params.departure_date.is_empty() {
        return Err("departure date must be filled");
    }
    if params.cabin_class != "economy" && params.cabin_class != "business" {
        return Err("cabin class is invalid");
    }
    if params.sort_type().is_none() {
        return Err("sort type is invalid");
    }
    if let Some(filter) = &params.filter {
        if let Some(tr) = &filter.time_range {
            if tr.from.is_empty() || tr.to.is_empty() {
                return Err("time range type, from, and to is invalid");
            }
        }
        if let Some(price) = &filter.price {
            if price.lo < 0 || price.hi < 0 || price.lo > price.hi {
                return Err("lowest price and highest price is invalid");
            }
        }
        if let Some(stops) = filter.stops {
            if stops < 0 {
                return Err("stops is invalid");
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_params() -> GetFlightsParams {
        GetFlightsParams {
            origin: "CGK".into(),
            destination: "DPS".into(),
            departure_date: "2025-12-15".into(),
            passenger: 1,
            return_date: None,
            sort_type: SortType::LowestPrice as i64,
            cabin_class: "economy".into(),
            filter: None,
        }
    }

    #[test]
    fn rejects_empty_origin() {
        let mut p = base_params();
        p.origin = String::new();
        assert_eq!(validate(&p), Err("origin must be filled"));
    }

    #[test]
    fn rejects_unknown_cabin_class() {
        let mut p = base_params();
        p.cabin_class = "first".into();
        assert_eq!(validate(&p), Err("cabin class is invalid"));
    }

    #[test]
    fn rejects_inverted_price_bounds() {
        let mut p = base_params();
        p.filter = Some(FilterFlightParams {
            price: Some(FilterFlightPriceParams { lo: 100, hi: 50 }),
            ..Default::default()
        });
        assert_eq!(validate(&p), Err("lowest price and highest price is invalid"));
    }

    #[test]
    fn rejects_negative_stops_filter() {
        let mut p = base_params();
        p.filter = Some(FilterFlightParams { stops: Some(-1), ..Default::default() });
        assert_eq!(validate(&p), Err("stops is invalid"));
    }

    #[test]
    fn rejects_out_of_range_sort_type() {
        let mut p = base_params();
        p.sort_type = 7;
        assert_eq!(validate(&p), Err("sort type is invalid"));
    }

    #[test]
    fn sort_type_cache_suffix_and_direction() {
        assert_eq!(SortType::LowestPrice.cache_suffix(), "price");
        assert!(SortType::LowestPrice.is_ascending());
        assert_eq!(SortType::HighestPrice.cache_suffix(), "price");
        assert!(!SortType::HighestPrice.is_ascending());
        assert!(SortType::BestValue.is_ascending());
    }

    #[test]
    fn accepts_well_formed_params() {
        assert_eq!(validate(&base_params()), Ok(()));
    }

    #[test]
    fn price_amount_in_idr_converts_usd() {
        let price = Price { amount: 10, currency: Currency::Usd };
        assert_eq!(price.amount_in_idr(), 150_000);
    }

    #[test]
    fn duration_formats_hours_and_minutes() {
        assert_eq!(format_duration(125), "2h5m");
        assert_eq!(format_duration(45), "45m");
    }

    #[test]
    fn flight_validate_rejects_non_positive_price() {
        let mut f = sample_flight();
        f.price.amount = 0;
        assert!(f.validate().is_err());
    }

    #[test]
    fn flight_validate_accepts_well_formed_flight() {
        assert!(sample_flight().validate().is_ok());
    }

    fn sample_flight() -> Flight {
        Flight {
            id: "QZ123_airasia".into(),
            provider: "airasia".into(),
            airline: Airline { code: "airasia".into(), name: "AirAsia".into() },
            flight_number: "QZ123".into(),
            departure: Airport {
                airport_code: "CGK".into(),
                city_name: "Jakarta".into(),
                iso_datetime: "2025-12-15T08:00:00Z".into(),
                unix_timestamp_seconds: 1_765_800_000,
            },
            arrival: Airport {
                airport_code: "DPS".into(),
                city_name: "Denpasar".into(),
                iso_datetime: "2025-12-15T10:50:00Z".into(),
                unix_timestamp_seconds: 1_765_810_200,
            },
            duration: FlightDuration::from_minutes(170),
            stops: 0,
            price: Price { amount: 1_200_000, currency: Currency::Idr },
            available_seats: 12,
            cabin_class: CabinClass::Economy,
            aircraft: Some("A320".into()),
            amenities: vec![],
            baggage: Baggage { carry_on: "7kg".into(), checked: "20kg".into() },
            layover: 0,
        }
    }
}
