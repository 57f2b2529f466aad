//! Shared lookup tables and helpers used by every provider adapter:
//! airport→city resolution, provider code→display-name mapping, baggage
//! code→label mapping, and the provider-declared-format datetime parser.

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use rand::Rng;

/// Canonical provider keys, used both as the `Flight::provider` value and as
/// the cache-member `id` suffix.
pub const AIRASIA: &str = "airasia";
pub const GARUDA: &str = "garuda";
pub const LION: &str = "lion";
pub const BATIK: &str = "batik";

/// Provider key → airline display name.
pub static AIRLINE_NAMES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        (AIRASIA, "AirAsia Indonesia"),
        (GARUDA, "Garuda Indonesia"),
        (LION, "Lion Air"),
        (BATIK, "Batik Air"),
    ])
});

/// Static airport code → city name table. A missing mapping invalidates the
/// flight per `spec.md` §3.
pub static AIRPORT_CITY: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("CGK", "Jakarta"),
        ("DPS", "Denpasar"),
        ("SUB", "Surabaya"),
        ("MES", "Medan"),
        ("UPG", "Makassar"),
        ("BDO", "Bandung"),
        ("JOG", "Yogyakarta"),
        ("BPN", "Balikpapan"),
        ("PKU", "Pekanbaru"),
        ("PNK", "Pontianak"),
    ])
});

/// Resolves both endpoints of a route in one call, per the original's
/// `GetCityNameFromAirportCode` — either both resolve or neither does,
/// since a flight with only one known city is still invalid.
pub fn resolve_cities(origin: &str, destination: &str) -> Option<(String, String)> {
    let from = AIRPORT_CITY.get(origin)?;
    let to = AIRPORT_CITY.get(destination)?;
    Some((from.to_string(), to.to_string()))
}

/// Shared carry-on/checked baggage code→label table, for providers that
/// report integer allowance codes rather than free-form strings.
pub static BAGGAGE_LABELS: Lazy<HashMap<i32, &'static str>> = Lazy::new(|| {
    HashMap::from([(0, "0kg"), (1, "7kg"), (2, "15kg"), (3, "20kg"), (4, "30kg"), (5, "40kg")])
});

pub fn baggage_label(code: i32) -> String {
    BAGGAGE_LABELS.get(&code).map(|s| s.to_string()).unwrap_or_else(|| format!("{code}kg"))
}

/// The result of parsing a provider's departure/arrival pair: both instants
/// plus the derived duration, ready to drop into a `Flight`.
pub struct ParsedSchedule {
    pub departure_iso: String,
    pub departure_unix: i64,
    pub arrival_iso: String,
    pub arrival_unix: i64,
    pub total_minutes: i32,
}

/// Parses a departure/arrival pair under the given fixed-offset format
/// (RFC3339, with or without a colon in the offset). Returns `None` on any
/// parse failure — the caller skips the row rather than propagating.
pub fn parse_offset_schedule(departure: &str, arrival: &str) -> Option<ParsedSchedule> {
    let dep = parse_fixed_offset(departure)?;
    let arr = parse_fixed_offset(arrival)?;
    schedule_from(dep, arr)
}

fn parse_fixed_offset(s: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(s)
        .or_else(|_| DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%z"))
        .ok()
}

/// Parses a bare local timestamp (no offset) combined with an IANA zone
/// name, mirroring Go's `time.LoadLocation` + `time.ParseInLocation`. This
/// crate only resolves the zones the mock fixtures use (`UTC` and fixed
/// `Etc/GMT*` offsets) rather than pulling in a full tz-database crate —
/// see `DESIGN.md` for the scope decision.
pub fn parse_zoned_schedule(
    departure: &str,
    departure_tz: &str,
    arrival: &str,
    arrival_tz: &str,
) -> Option<ParsedSchedule> {
    let dep = parse_in_named_zone(departure, departure_tz)?;
    let arr = parse_in_named_zone(arrival, arrival_tz)?;
    schedule_from(dep, arr)
}

fn parse_in_named_zone(naive: &str, tz: &str) -> Option<DateTime<FixedOffset>> {
    let naive = NaiveDateTime::parse_from_str(naive, "%Y-%m-%dT%H:%M:%S").ok()?;
    let offset_seconds = named_zone_offset_seconds(tz)?;
    let offset = FixedOffset::east_opt(offset_seconds)?;
    Some(offset.from_local_datetime(&naive).single()?.fixed_offset())
}

/// Resolves the small set of zone names the mock fixtures use.
fn named_zone_offset_seconds(tz: &str) -> Option<i32> {
    match tz {
        "UTC" | "Etc/UTC" | "GMT" => Some(0),
        "Asia/Jakarta" | "WIB" => Some(7 * 3600),
        "Asia/Makassar" | "WITA" => Some(8 * 3600),
        "Asia/Jayapura" | "WIT" => Some(9 * 3600),
        _ => None,
    }
}

fn schedule_from(dep: DateTime<FixedOffset>, arr: DateTime<FixedOffset>) -> Option<ParsedSchedule> {
    let total_minutes = (arr.with_timezone(&Utc) - dep.with_timezone(&Utc)).num_minutes();
    Some(ParsedSchedule {
        departure_iso: dep.to_rfc3339(),
        departure_unix: dep.timestamp(),
        arrival_iso: arr.to_rfc3339(),
        arrival_unix: arr.timestamp(),
        total_minutes: total_minutes.max(0) as i32,
    })
}

/// Parses a short duration string of the form `"1h30m"`, `"45m"`, or `"2h"`
/// into whole minutes. Mirrors the subset of Go's `time.ParseDuration`
/// syntax the Batik Air fixture uses for connection wait times.
pub fn parse_minutes_duration(s: &str) -> Option<i32> {
    let mut total = 0i32;
    let mut num = String::new();
    for c in s.chars() {
        if c.is_ascii_digit() {
            num.push(c);
        } else if c == 'h' {
            total += num.parse::<i32>().ok()? * 60;
            num.clear();
        } else if c == 'm' {
            total += num.parse::<i32>().ok()?;
            num.clear();
        } else {
            return None;
        }
    }
    if !num.is_empty() {
        return None;
    }
    Some(total)
}

/// Simulates network latency for a mock adapter. Documented as mock-only;
/// a real adapter would have no equivalent call site.
pub async fn simulate_delay(min_ms: u64, max_ms: u64) {
    let ms = rand::thread_rng().gen_range(min_ms..=max_ms);
    tokio::time::sleep(std::time::Duration::from_millis(ms)).await;
}

/// Simulates a provider-level failure `chance_pct` percent of the time.
pub fn simulate_random_error(chance_pct: u8) -> bool {
    rand::thread_rng().gen_range(0..100) < chance_pct
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_known_route() {
        let (from, to) = resolve_cities("CGK", "DPS").unwrap();
        assert_eq!(from, "Jakarta");
        assert_eq!(to, "Denpasar");
    }

    #[test]
    fn rejects_unknown_airport() {
        assert!(resolve_cities("CGK", "XXX").is_none());
    }

    #[test]
    fn parses_rfc3339_schedule() {
        let parsed =
            parse_offset_schedule("2025-12-15T08:00:00+07:00", "2025-12-15T10:50:00+08:00").unwrap();
        assert_eq!(parsed.total_minutes, 110);
    }

    #[test]
    fn parses_zoned_schedule_in_known_zone() {
        let parsed = parse_zoned_schedule(
            "2025-12-15T08:00:00",
            "Asia/Jakarta",
            "2025-12-15T10:50:00",
            "Asia/Jakarta",
        )
        .unwrap();
        assert_eq!(parsed.total_minutes, 170);
    }

    #[test]
    fn baggage_label_falls_back_to_raw_code() {
        assert_eq!(baggage_label(3), "20kg");
        assert_eq!(baggage_label(99), "99kg");
    }

    #[test]
    fn parses_minutes_duration_variants() {
        assert_eq!(parse_minutes_duration("45m"), Some(45));
        assert_eq!(parse_minutes_duration("1h30m"), Some(90));
        assert_eq!(parse_minutes_duration("2h"), Some(120));
        assert_eq!(parse_minutes_duration("bogus"), None);
    }
}
