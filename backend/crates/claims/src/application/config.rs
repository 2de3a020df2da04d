//! Application Configuration
//!
//! Configuration for the claims application layer.

use std::time::Duration;

use crate::domain::services::matching::MatchRules;

/// Claims application configuration
#[derive(Debug, Clone)]
pub struct ClaimsConfig {
    /// Verification attempts per claim before it is rejected
    pub max_verification_attempts: u8,
    /// Correct answers needed to pass
    pub pass_threshold: u8,
    /// Handover code length in digits
    pub otp_digits: usize,
    /// Handover code lifetime
    pub otp_ttl: Duration,
    /// Maximum lost/found date distance that still earns time points
    pub match_window: Duration,
    /// Minimum match score shown to users
    pub match_display_threshold: u32,
    /// Description length kept for ID/WALLET items shown to non-owners
    pub redaction_budget: usize,
    /// Accounts younger than this are flagged in fraud signals
    pub young_account_age: Duration,
    /// Trailing window for the daily report ceiling
    pub report_window: Duration,
}

impl Default for ClaimsConfig {
    fn default() -> Self {
        Self {
            max_verification_attempts: 3,
            pass_threshold: 2,
            otp_digits: 6,
            otp_ttl: Duration::from_secs(10 * 60),
            match_window: Duration::from_secs(72 * 3600),
            match_display_threshold: 5,
            redaction_budget: 120,
            young_account_age: Duration::from_secs(7 * 24 * 3600),
            report_window: Duration::from_secs(24 * 3600),
        }
    }
}

impl ClaimsConfig {
    /// Create config for development (longer handover code lifetime)
    pub fn development() -> Self {
        Self {
            otp_ttl: Duration::from_secs(30 * 60),
            ..Default::default()
        }
    }

    pub fn otp_ttl_ms(&self) -> i64 {
        self.otp_ttl.as_millis() as i64
    }

    pub fn otp_ttl_chrono(&self) -> chrono::Duration {
        chrono::Duration::milliseconds(self.otp_ttl_ms())
    }

    pub fn young_account_chrono(&self) -> chrono::Duration {
        chrono::Duration::milliseconds(self.young_account_age.as_millis() as i64)
    }

    pub fn match_rules(&self) -> MatchRules {
        MatchRules {
            window: chrono::Duration::milliseconds(self.match_window.as_millis() as i64),
            display_threshold: self.match_display_threshold,
        }
    }
}
