//! Claims Backend Module - Claim Verification & Trust Engine
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, pure services, repository traits
//! - `application/` - Use cases
//! - `infra/` - PostgreSQL / in-memory repositories, notification dispatch
//! - `presentation/` - HTTP handlers, DTOs, router
//!
//! ## Responsibilities
//! - Rank candidate matches between lost and found reports
//! - Drive a claim through question verification and OTP handover
//! - Keep a bounded trust score per user and derive limits and cooldowns from it
//! - Coach reporters on the strength of their security questions
//! - Redact personal data from item descriptions shown to non-owners
//!
//! ## Consistency Model
//! - Every claim transition is a compare-and-set on the claim version
//! - Trust changes are applied as clamped deltas in the same unit of work
//! - Time-based effects (cooldowns, OTP expiry) are evaluated lazily against "now"

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::ClaimsConfig;
pub use error::{ClaimsError, ClaimsResult, ConflictReason, RateLimitReason};
pub use infra::memory::InMemoryClaimsRepository;
pub use infra::notifier::TracingNotifier;
pub use infra::postgres::PgClaimsRepository;
pub use presentation::router::claims_router;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

pub mod models {
    pub use crate::domain::entities::*;
    pub use crate::domain::value_objects::*;
    pub use crate::presentation::dto::*;
}

#[cfg(test)]
mod tests;
