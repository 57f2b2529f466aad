//! Filter (part of C4, `spec.md` §4.6). Applied after sorting, preserving
//! input order.
//!
//! **Divergence from the source this was distilled from:** the original
//! inverts the price, stops, and time-range predicates (it *excludes*
//! matches rather than keeping them). This crate ships the conventional
//! keep-in-range interpretation instead — see `DESIGN.md` open question 1.

use chrono::DateTime;

use crate::domain::{Flight, FilterFlightParams, TimeRangeField};

pub fn apply(flights: Vec<Flight>, filter: &FilterFlightParams) -> Vec<Flight> {
    flights
        .into_iter()
        .filter(|flight| matches_airline(flight, filter))
        .filter(|flight| matches_price(flight, filter))
        .filter(|flight| matches_stops(flight, filter))
        .filter(|flight| matches_time_range(flight, filter))
        .collect()
}

fn matches_airline(flight: &Flight, filter: &FilterFlightParams) -> bool {
    filter.airline.is_empty() || filter.airline.iter().any(|code| code == &flight.airline.code)
}

fn matches_price(flight: &Flight, filter: &FilterFlightParams) -> bool {
    match &filter.price {
        Some(bounds) => {
            let amount = flight.price.amount_in_idr();
            amount >= bounds.lo && amount <= bounds.hi
        }
        None => true,
    }
}

fn matches_stops(flight: &Flight, filter: &FilterFlightParams) -> bool {
    match filter.stops {
        Some(stops) => flight.stops == stops,
        None => true,
    }
}

fn matches_time_range(flight: &Flight, filter: &FilterFlightParams) -> bool {
    let Some(range) = &filter.time_range else {
        return true;
    };
    let Ok(from) = DateTime::parse_from_rfc3339(&range.from) else {
        return true;
    };
    let Ok(to) = DateTime::parse_from_rfc3339(&range.to) else {
        return true;
    };
    let field = match range.kind {
        TimeRangeField::Departure => &flight.departure,
        TimeRangeField::Arrival => &flight.arrival,
    };
    let Ok(instant) = DateTime::parse_from_rfc3339(&field.iso_datetime) else {
        return true;
    };
    instant >= from && instant <= to
}
