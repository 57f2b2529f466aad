//! Provider adapters (C1): one module per airline, each translating a
//! provider-specific wire format into the canonical [`crate::domain::Flight`].
//!
//! Every adapter implements [`Adapter`], a small capability pair —
//! `fetch_raw` (call the provider, or in this crate's case simulate it) and
//! `normalize` (validate + map to the canonical record) — composed by the
//! default `get_flights` method. [`RetryPolicy`] is a field on the adapter
//! rather than a branch in the fetcher, so adding a provider with its own
//! retry behavior never touches `fetcher.rs`.

pub mod airasia;
pub mod batik;
pub mod common;
pub mod garuda;
pub mod lion;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::Flight;

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("provider request failed")]
    Unavailable,
}

/// A provider's retry behavior, declared once per adapter. The default is
/// no retry; Lion Air opts into `Fixed`, whose attempt count and backoff are
/// read from `Config` (`MAX_RETRY_COUNT`/`RETRY_BACKOFF`) rather than
/// hardcoded here, so those two environment variables stay authoritative —
/// mirroring the Go original's `fetcher.go`, which sleeps `f.Cfg.RetryBackOff`
/// directly.
#[derive(Debug, Clone, Copy)]
pub enum RetryPolicy {
    None,
    Fixed,
}

#[async_trait]
pub trait Adapter: Send + Sync + 'static {
    type Raw: Send;

    /// Canonical provider key, used as `Flight::provider` and the cache-id
    /// suffix.
    fn provider_key(&self) -> &'static str;

    fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::None
    }

    /// Calls the provider (or, for these mock adapters, simulates latency
    /// and failure and returns a fixture). Returns `Err` only for a
    /// provider-level failure — a malformed or absent payload is still
    /// `Ok`, carrying zero rows, per `spec.md` §4.1.2.
    async fn fetch_raw(
        &self,
        origin: &str,
        destination: &str,
        departure_date: &str,
    ) -> Result<Self::Raw, AdapterError>;

    /// Validates and maps each raw row to a canonical `Flight`, skipping
    /// (and logging) any row that fails `Flight::validate` or whose
    /// airport/datetime/cabin-class data doesn't resolve.
    fn normalize(&self, raw: Self::Raw) -> Vec<Flight>;

    /// Default composition of the two capabilities above. Adapters never
    /// need to override this.
    async fn get_flights(
        &self,
        origin: &str,
        destination: &str,
        departure_date: &str,
    ) -> Result<Vec<Flight>, AdapterError> {
        let raw = self.fetch_raw(origin, destination, departure_date).await?;
        Ok(self.normalize(raw))
    }
}
