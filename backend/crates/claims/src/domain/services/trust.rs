//! Trust-derived limits and progressive cooldown

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use platform::rate_limit::{RateLimitResult, check_ceiling, cooldown_remaining};
use std::time::Duration;

use crate::domain::entities::TrustProfile;
use crate::error::{ClaimsError, ClaimsResult, RateLimitReason};

/// Cooldown owed after `failures` verification failures in the current window
pub fn cooldown_for(failures: u32) -> Duration {
    let minutes = match failures {
        0 => 0,
        1 => 60,
        2 => 240,
        _ => 1440,
    };
    Duration::from_secs(minutes * 60)
}

/// Remaining cooldown for a profile at `now`, if any
pub fn active_cooldown(profile: &TrustProfile, now: DateTime<Utc>) -> Option<Duration> {
    let failures = profile.failures_in_window(now);
    let last = profile.last_failure_at?;
    cooldown_remaining(last, cooldown_for(failures), now)
}

/// Gate a new claim or verification attempt
///
/// Suspended users are blocked outright; otherwise an active cooldown
/// rejects with the remaining wait.
pub fn ensure_may_attempt(profile: &TrustProfile, now: DateTime<Utc>) -> ClaimsResult<()> {
    if profile.level().is_blocked() {
        return Err(ClaimsError::Suspended);
    }
    if let Some(wait) = active_cooldown(profile, now) {
        return Err(ClaimsError::RateLimited {
            reason: RateLimitReason::Cooldown,
            retry_after: Some(wait),
        });
    }
    Ok(())
}

/// Check the concurrent active-claim ceiling
pub fn check_active_claims(profile: &TrustProfile, active: u32) -> RateLimitResult {
    check_ceiling(active, profile.limits().max_active_claims)
}

/// Account-age fraud signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountAgeSignal {
    pub age_days: i64,
    pub young: bool,
}

pub fn account_age_signal(
    profile: &TrustProfile,
    young_below: ChronoDuration,
    now: DateTime<Utc>,
) -> AccountAgeSignal {
    let age = profile.account_age(now);
    AccountAgeSignal {
        age_days: age.num_days(),
        young: age < young_below,
    }
}
