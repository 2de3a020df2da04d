//! Identity Middleware
//!
//! Resolves the forwarded identity headers once per request and stores the
//! result as a request extension for the handlers.

use axum::body::Body;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use platform::identity::{Actor, extract_actor};

use crate::error::{ClaimsError, ClaimsResult};

/// Identity resolved for the current request; `None` when anonymous
#[derive(Debug, Clone, Copy)]
pub struct RequestActor(pub Option<Actor>);

impl RequestActor {
    /// The actor, or `Unauthenticated` for anonymous requests
    pub fn require(self) -> ClaimsResult<Actor> {
        self.0.ok_or(ClaimsError::Unauthenticated)
    }
}

/// Middleware that resolves the request actor
///
/// Anonymous requests pass through; malformed identity headers are rejected
/// with 400 before any handler runs.
pub async fn resolve_actor(mut req: Request<Body>, next: Next) -> Result<Response, Response> {
    let actor = match extract_actor(req.headers()) {
        Ok(actor) => actor,
        Err(e) => return Err(ClaimsError::from(e).into_response()),
    };

    req.extensions_mut().insert(RequestActor(actor));

    Ok(next.run(req).await)
}
