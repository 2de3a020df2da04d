//! Shared Kernel - Domain-crossing minimal core
//!
//! This crate contains the smallest core of vocabulary shared by every
//! backend crate:
//! - Common error types and result aliases
//! - Typed ID wrappers for users, item reports and claims
//!
//! **Design Principle**: Only include things that are "hard to change"
//! and have consistent meaning across all domains.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
pub mod id;
