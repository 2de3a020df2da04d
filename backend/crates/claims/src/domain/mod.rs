//! Domain Layer - Business logic and entities
//!
//! This layer contains:
//! - Domain entities (LostItem, FoundItem, Claim, TrustProfile)
//! - Domain value objects (Category, ClaimStatus, TrustLevel, OtpCode)
//! - Domain services (geo lookup, matching, strength analysis, redaction, cooldowns)
//! - Repository and notifier traits (interfaces)

pub mod entities;
pub mod notification;
pub mod repository;
pub mod services;
pub mod value_objects;
