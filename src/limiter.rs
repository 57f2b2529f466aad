//! Admission limiter (C5): a per-URI counter window backed by the same
//! Redis connection the cache engine uses. Mirrors `spec.md` §4.5 exactly,
//! including the deliberate `MAX+1` off-by-one tolerance.

use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tracing::warn;

#[derive(Clone)]
pub struct AdmissionLimiter {
    conn: ConnectionManager,
    ttl_seconds: u64,
    max: i64,
}

impl AdmissionLimiter {
    pub fn new(conn: ConnectionManager, ttl_seconds: u64, max: i64) -> Self {
        Self { conn, ttl_seconds, max }
    }

    /// Atomically increments the counter at `request_limiter:<uri>`, setting
    /// its TTL only on the first increment of the window. Fails open: a
    /// backing-store error allows the request rather than rejecting it.
    pub async fn is_exceeded(&self, uri: &str) -> bool {
        let key = format!("request_limiter:{uri}");
        let mut conn = self.conn.clone();

        let counter: Result<i64, _> = conn.incr(&key, 1).await;
        let counter = match counter {
            Ok(c) => c,
            Err(err) => {
                warn!(uri, error = %err, "admission limiter backend error, failing open");
                return false;
            }
        };

        if counter == 1 {
            if let Err(err) = conn.expire::<_, ()>(&key, self.ttl_seconds as i64).await {
                warn!(uri, error = %err, "fail to set admission limiter TTL");
            }
        }

        counter > self.max + 1
    }
}

#[cfg(test)]
mod tests {
    // `is_exceeded` requires a live Redis connection; its off-by-one
    // semantics are covered by `spec.md` §8's admission property and
    // exercised in `tests/integration_tests.rs` against a real backend.
}
