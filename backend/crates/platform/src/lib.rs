//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Cryptographic utilities (SHA-256, constant-time comparison, numeric codes)
//! - Rate limiting and cooldown arithmetic
//! - Request identity extraction from trusted gateway headers

pub mod crypto;
pub mod identity;
pub mod rate_limit;
