//! Outbound notifications
//!
//! Delivery is fire-and-forget. No claim transition depends on it.

use chrono::{DateTime, Utc};
use kernel::id::{ClaimId, UserId};

use crate::domain::value_objects::{ClaimStatus, OtpCode};
use crate::error::ClaimsResult;

#[derive(Debug, Clone)]
pub enum Notification {
    /// Handover code for the claimant to show the finder
    OtpIssued {
        claim_id: ClaimId,
        recipient: UserId,
        code: OtpCode,
        expires_at: DateTime<Utc>,
    },
    ClaimStatusChanged {
        claim_id: ClaimId,
        recipients: Vec<UserId>,
        status: ClaimStatus,
    },
}

/// Notification dispatch trait
#[trait_variant::make(Notifier: Send)]
pub trait LocalNotifier {
    async fn dispatch(&self, notification: Notification) -> ClaimsResult<()>;
}
