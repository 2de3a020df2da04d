//! Infrastructure Layer
//!
//! Repository implementations and notification dispatch.

pub mod memory;
pub mod notifier;
pub mod postgres;
