//! Fetcher (C2): fans out one concurrent task per adapter and joins their
//! results through a bounded channel. Every task sends exactly one message —
//! including Lion Air's retry task once it exhausts `MAX_RETRY_COUNT` — so
//! the drain loop always sees `PROVIDER_COUNT` messages and never blocks.
//! See `spec.md` §4.2, design note "retry send hazard".

use std::time::Duration;

use tokio::sync::mpsc;
use tracing::warn;

use crate::adapters::airasia::AirAsia;
use crate::adapters::batik::BatikAir;
use crate::adapters::garuda::GarudaAir;
use crate::adapters::lion::LionAir;
use crate::adapters::{Adapter, RetryPolicy};
use crate::config::Config;
use crate::domain::Flight;

pub const PROVIDER_COUNT: u32 = 4;

pub struct FetchResult {
    pub provider_count: u32,
    pub failed_count: u32,
    pub flights: Vec<Flight>,
}

struct TaskResult {
    flights: Vec<Flight>,
    failed: bool,
}

pub struct Fetcher {
    config: Config,
}

impl Fetcher {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub async fn fetch(&self, origin: &str, destination: &str, departure_date: &str) -> FetchResult {
        let (tx, mut rx) = mpsc::channel::<TaskResult>(PROVIDER_COUNT as usize);

        let origin = origin.to_string();
        let destination = destination.to_string();
        let departure_date = departure_date.to_string();
        let cfg = self.config.clone();

        spawn_once(tx.clone(), AirAsia, origin.clone(), destination.clone(), departure_date.clone());
        spawn_once(tx.clone(), GarudaAir, origin.clone(), destination.clone(), departure_date.clone());
        spawn_once(tx.clone(), BatikAir, origin.clone(), destination.clone(), departure_date.clone());
        spawn_with_retry(tx.clone(), LionAir, origin, destination, departure_date, cfg);
        drop(tx);

        let mut flights = Vec::new();
        let mut failed = 0u32;
        while let Some(result) = rx.recv().await {
            if result.failed {
                failed += 1;
            }
            flights.extend(result.flights);
        }

        FetchResult { provider_count: PROVIDER_COUNT, failed_count: failed, flights }
    }
}

fn spawn_once<A: Adapter>(
    tx: mpsc::Sender<TaskResult>,
    adapter: A,
    origin: String,
    destination: String,
    departure_date: String,
) {
    tokio::spawn(async move {
        let result = adapter.get_flights(&origin, &destination, &departure_date).await;
        let task_result = match result {
            Ok(flights) => TaskResult { flights, failed: false },
            Err(err) => {
                warn!(provider = adapter.provider_key(), error = %err, "provider request failed");
                TaskResult { flights: vec![], failed: true }
            }
        };
        // The receiver only drops once every spawned task has sent (or this
        // process is shutting down); a send failure here is not actionable.
        let _ = tx.send(task_result).await;
    });
}

fn spawn_with_retry<A: Adapter>(
    tx: mpsc::Sender<TaskResult>,
    adapter: A,
    origin: String,
    destination: String,
    departure_date: String,
    config: Config,
) {
    tokio::spawn(async move {
        let (max_attempts, backoff) = retry_params(adapter.retry_policy(), &config);

        let mut last_err = None;
        for attempt in 0..max_attempts {
            match adapter.get_flights(&origin, &destination, &departure_date).await {
                Ok(flights) => {
                    let _ = tx.send(TaskResult { flights, failed: false }).await;
                    return;
                }
                Err(err) => {
                    warn!(provider = adapter.provider_key(), attempt, error = %err, "retrying provider fetch");
                    last_err = Some(err);
                    if attempt + 1 < max_attempts {
                        tokio::time::sleep(backoff).await;
                    }
                }
            }
        }
        if let Some(err) = last_err {
            warn!(provider = adapter.provider_key(), error = %err, "provider exhausted retries");
        }
        // Always send a final sentinel, even on exhaustion, so the drain
        // loop's message count matches PROVIDER_COUNT.
        let _ = tx.send(TaskResult { flights: vec![], failed: true }).await;
    });
}

/// `RETRY_BACKOFF`/`MAX_RETRY_COUNT` are authoritative for any adapter
/// declaring `RetryPolicy::Fixed` — the policy only opts an adapter into
/// retrying at all, per `spec.md` §6 and the Go original's `fetcher.go`,
/// which sleeps `f.Cfg.RetryBackOff` as-is rather than a per-adapter value.
fn retry_params(policy: RetryPolicy, config: &Config) -> (u32, Duration) {
    match policy {
        RetryPolicy::Fixed => (config.max_retry_count.max(1), config.retry_backoff),
        RetryPolicy::None => (1, Duration::ZERO),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fetch_reports_provider_count_and_concatenates_flights() {
        let fetcher = Fetcher::new(Config::for_tests());
        let result = fetcher.fetch("CGK", "DPS", "2025-12-15").await;
        assert_eq!(result.provider_count, PROVIDER_COUNT);
        assert!(!result.flights.is_empty());
        assert!(result.failed_count <= PROVIDER_COUNT);
    }

    #[tokio::test]
    async fn fetch_returns_empty_flights_for_unknown_route() {
        let fetcher = Fetcher::new(Config::for_tests());
        let result = fetcher.fetch("AAA", "BBB", "2025-12-15").await;
        assert_eq!(result.provider_count, PROVIDER_COUNT);
        assert!(result.flights.is_empty());
    }

    #[test]
    fn fixed_retry_policy_reads_attempts_and_backoff_from_config() {
        let mut config = Config::for_tests();
        config.max_retry_count = 2;
        config.retry_backoff = Duration::from_millis(450);

        let (max_attempts, backoff) = retry_params(RetryPolicy::Fixed, &config);
        assert_eq!(max_attempts, 2);
        assert_eq!(backoff, Duration::from_millis(450));
    }

    #[test]
    fn none_retry_policy_ignores_config_and_never_retries() {
        let mut config = Config::for_tests();
        config.max_retry_count = 5;
        config.retry_backoff = Duration::from_millis(450);

        let (max_attempts, backoff) = retry_params(RetryPolicy::None, &config);
        assert_eq!(max_attempts, 1);
        assert_eq!(backoff, Duration::ZERO);
    }

    #[test]
    fn fixed_retry_policy_floors_max_attempts_at_one() {
        let mut config = Config::for_tests();
        config.max_retry_count = 0;

        let (max_attempts, _) = retry_params(RetryPolicy::Fixed, &config);
        assert_eq!(max_attempts, 1);
    }
}
