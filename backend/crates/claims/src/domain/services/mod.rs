//! Domain Services
//!
//! Pure domain logic: no I/O, no clock reads. Callers pass "now" in.

pub mod geo;
pub mod keywords;
pub mod matching;
pub mod redaction;
pub mod strength;
pub mod trust;
