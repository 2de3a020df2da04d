//! Rate Limiting Infrastructure
//!
//! Ceiling and cooldown arithmetic shared by the domain crates.
//! Everything here is evaluated lazily against "now": there are no timers.

use chrono::{DateTime, Utc};
use std::time::Duration;

/// Rate limit configuration: at most `max_requests` inside a trailing `window`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Maximum requests allowed in the window. Zero blocks outright.
    pub max_requests: u32,
    /// Time window duration
    pub window: Duration,
}

impl RateLimitConfig {
    pub fn window_ms(&self) -> i64 {
        self.window.as_millis() as i64
    }

    /// Start of the trailing window ending at `now`
    pub fn window_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - chrono::Duration::milliseconds(self.window_ms())
    }

    /// Evaluate a request given how many were already used in the window
    pub fn evaluate(&self, used: u32) -> RateLimitResult {
        check_ceiling(used, self.max_requests)
    }
}

/// Rate limit check result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitResult {
    pub allowed: bool,
    /// Requests still available after this one would be admitted
    pub remaining: u32,
}

/// Compare usage against a ceiling. A ceiling of zero is an absolute block.
pub fn check_ceiling(used: u32, ceiling: u32) -> RateLimitResult {
    if used >= ceiling {
        RateLimitResult {
            allowed: false,
            remaining: 0,
        }
    } else {
        RateLimitResult {
            allowed: true,
            remaining: ceiling - used - 1,
        }
    }
}

/// Remaining wait of a cooldown that started at `started_at`
///
/// Returns `None` once `now >= started_at + cooldown` (or for a zero cooldown).
pub fn cooldown_remaining(
    started_at: DateTime<Utc>,
    cooldown: Duration,
    now: DateTime<Utc>,
) -> Option<Duration> {
    let cooldown = chrono::Duration::from_std(cooldown).ok()?;
    let ends_at = started_at + cooldown;
    if now >= ends_at {
        return None;
    }
    (ends_at - now).to_std().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, hour, minute, 0).unwrap()
    }

    #[test]
    fn test_check_ceiling() {
        assert_eq!(
            check_ceiling(0, 2),
            RateLimitResult {
                allowed: true,
                remaining: 1
            }
        );
        assert!(check_ceiling(1, 2).allowed);
        assert!(!check_ceiling(2, 2).allowed);
        assert!(!check_ceiling(0, 0).allowed);
    }

    #[test]
    fn test_config_window_start() {
        let config = RateLimitConfig {
            max_requests: 3,
            window: Duration::from_secs(3600),
        };
        assert_eq!(config.window_start(at(10, 0)), at(9, 0));
        assert!(config.evaluate(2).allowed);
        assert!(!config.evaluate(3).allowed);
    }

    #[test]
    fn test_cooldown_remaining() {
        let hour = Duration::from_secs(3600);
        assert_eq!(
            cooldown_remaining(at(10, 0), hour, at(10, 15)),
            Some(Duration::from_secs(45 * 60))
        );
        assert_eq!(cooldown_remaining(at(10, 0), hour, at(11, 0)), None);
        assert_eq!(cooldown_remaining(at(10, 0), Duration::ZERO, at(10, 0)), None);
    }
}
