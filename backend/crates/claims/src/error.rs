//! Claims Error Types
//!
//! This module provides claim/trust-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use std::fmt;
use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use platform::identity::IdentityError;
use thiserror::Error;

/// Claims-specific result type alias
pub type ClaimsResult<T> = Result<T, ClaimsError>;

/// Why a request conflicts with the current state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictReason {
    /// An active claim already exists for this (lost, found) pair
    DuplicateClaim,
    /// The claim is no longer in the state the action requires
    AlreadyResolved,
    /// OTP actions need a verified claim
    NotVerified,
    /// One of the items has already been closed
    ItemClosed,
    /// No OTP has been issued for the claim
    OtpNotIssued,
    /// The latest OTP has expired
    OtpExpired,
    /// The code matches an earlier OTP that a newer one replaced
    OtpSuperseded,
    /// The code does not match
    OtpMismatch,
}

impl ConflictReason {
    pub const fn message(&self) -> &'static str {
        match self {
            Self::DuplicateClaim => "An active claim already exists for these items",
            Self::AlreadyResolved => "Claim already resolved",
            Self::NotVerified => "Claim has not been verified",
            Self::ItemClosed => "Item is already closed",
            Self::OtpNotIssued => "No handover code has been issued",
            Self::OtpExpired => "Handover code expired",
            Self::OtpSuperseded => "Handover code was superseded by a newer one",
            Self::OtpMismatch => "Handover code does not match",
        }
    }
}

impl fmt::Display for ConflictReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Which ceiling or window rejected the request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitReason {
    /// Concurrent active claims reached the trust level ceiling
    ActiveClaimCeiling,
    /// Reports in the trailing day reached the trust level ceiling
    ReportCeiling,
    /// Progressive cooldown after failed verification
    Cooldown,
}

impl fmt::Display for RateLimitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ActiveClaimCeiling => "active claim limit reached",
            Self::ReportCeiling => "daily report limit reached",
            Self::Cooldown => "verification cooldown active",
        })
    }
}

/// Claims-specific error variants
#[derive(Debug, Error)]
pub enum ClaimsError {
    /// Malformed input (wrong answer count, malformed OTP, ...)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Current state does not allow the action
    #[error("{0}")]
    Conflict(ConflictReason),

    /// Ceiling reached or cooldown active
    #[error("Rate limited: {reason}")]
    RateLimited {
        reason: RateLimitReason,
        retry_after: Option<Duration>,
    },

    /// Actor is not a party allowed to perform the action
    #[error("Not allowed to perform this action")]
    Unauthorized,

    /// Trust level blocks the action outright
    #[error("Trust level does not permit this action")]
    Suspended,

    /// No identity on a request that needs one
    #[error("Authentication required")]
    Unauthenticated,

    /// Malformed identity headers
    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error("{0} not found")]
    NotFound(&'static str),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ClaimsError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClaimsError::Validation(_) | ClaimsError::Identity(_) => ErrorKind::BadRequest,
            ClaimsError::Conflict(_) => ErrorKind::Conflict,
            ClaimsError::RateLimited { .. } => ErrorKind::TooManyRequests,
            ClaimsError::Unauthorized | ClaimsError::Suspended => ErrorKind::Forbidden,
            ClaimsError::Unauthenticated => ErrorKind::Unauthorized,
            ClaimsError::NotFound(_) => ErrorKind::NotFound,
            ClaimsError::Database(sqlx::Error::PoolTimedOut) => ErrorKind::ServiceUnavailable,
            ClaimsError::Database(_) | ClaimsError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Remaining wait for rate-limited errors, where computable
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            ClaimsError::RateLimited { retry_after, .. } => *retry_after,
            _ => None,
        }
    }

    /// Convert to AppError
    ///
    /// Server-side details never reach the response body.
    pub fn to_app_error(&self) -> AppError {
        let message = match self {
            ClaimsError::Database(_) | ClaimsError::Internal(_) => "Internal error".to_string(),
            other => other.to_string(),
        };
        let err = AppError::new(self.kind(), message);
        match self.retry_after() {
            Some(wait) => err.with_retry_after(wait),
            None => err,
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            ClaimsError::Database(e) => {
                tracing::error!(error = %e, "Claims database error");
            }
            ClaimsError::Internal(msg) => {
                tracing::error!(message = %msg, "Claims internal error");
            }
            ClaimsError::RateLimited {
                reason,
                retry_after,
            } => {
                tracing::warn!(
                    reason = %reason,
                    retry_after_secs = retry_after.map(|d| d.as_secs()),
                    "Claims request rate limited"
                );
            }
            ClaimsError::Unauthorized | ClaimsError::Suspended => {
                tracing::warn!(error = %self, "Claims action refused");
            }
            _ => {
                tracing::debug!(error = %self, "Claims error");
            }
        }
    }
}

impl From<ClaimsError> for AppError {
    fn from(err: ClaimsError) -> Self {
        err.to_app_error()
    }
}

impl IntoResponse for ClaimsError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}
