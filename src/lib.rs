//! A multi-provider flight search aggregator: four concurrent airline
//! adapters, a Redis-backed sort/cache engine that pre-materializes every
//! sort ordering, an admission limiter, and a single HTTP search endpoint.

pub mod adapters;
pub mod cache;
pub mod config;
pub mod coordinator;
pub mod domain;
pub mod fetcher;
pub mod filter;
pub mod http;
pub mod limiter;
