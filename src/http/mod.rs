//! HTTP layer (`spec.md` §6): a single `POST /flights/search` endpoint over
//! `axum`, sharing one `AppState` across the admission limiter and the
//! search coordinator.

pub mod handler;
pub mod responses;
pub mod routes;

pub use routes::create_router;

use crate::coordinator::Coordinator;
use crate::limiter::AdmissionLimiter;

pub struct AppState {
    pub coordinator: Coordinator,
    pub limiter: AdmissionLimiter,
}
