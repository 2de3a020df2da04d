//! Notification Dispatch
//!
//! Default notifier that records dispatches in the log. Delivery over
//! SMS/email belongs to an outer service that consumes these events.

use crate::domain::notification::{Notification, Notifier};
use crate::error::ClaimsResult;

/// Notifier that only emits tracing events
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl TracingNotifier {
    pub fn new() -> Self {
        Self
    }
}

impl Notifier for TracingNotifier {
    async fn dispatch(&self, notification: Notification) -> ClaimsResult<()> {
        match notification {
            // The code itself is never logged
            Notification::OtpIssued {
                claim_id,
                recipient,
                expires_at,
                ..
            } => {
                tracing::info!(
                    claim_id = %claim_id,
                    recipient = %recipient,
                    expires_at = %expires_at,
                    "Dispatching handover code"
                );
            }
            Notification::ClaimStatusChanged {
                claim_id,
                recipients,
                status,
            } => {
                tracing::info!(
                    claim_id = %claim_id,
                    recipients = recipients.len(),
                    status = %status,
                    "Dispatching claim status change"
                );
            }
        }
        Ok(())
    }
}
