//! Request identity
//!
//! Authentication happens upstream. The gateway forwards the authenticated
//! user as `x-user-id` / `x-user-role` headers and this crate trusts them.

use axum::http::HeaderMap;
use kernel::id::UserId;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";

/// Role of the acting user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(i16)]
pub enum Role {
    #[default]
    Citizen = 0,
    CooperativeStaff = 1,
    Admin = 2,
}

impl Role {
    #[inline]
    pub const fn code(&self) -> &'static str {
        match self {
            Role::Citizen => "citizen",
            Role::CooperativeStaff => "cooperative_staff",
            Role::Admin => "admin",
        }
    }

    #[inline]
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "citizen" => Some(Role::Citizen),
            "cooperative_staff" => Some(Role::CooperativeStaff),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }

    #[inline]
    pub const fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Authenticated user performing a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: UserId,
    pub role: Role,
}

impl Actor {
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn citizen(user_id: UserId) -> Self {
        Self::new(user_id, Role::Citizen)
    }
}

/// Error when reading identity headers
#[derive(Debug, Clone, thiserror::Error)]
pub enum IdentityError {
    #[error("Malformed identity header: {0}")]
    InvalidHeader(&'static str),
}

/// Extract the acting user from request headers
///
/// ## Returns
/// * `Ok(Some(actor))` - identity present
/// * `Ok(None)` - anonymous request (no `x-user-id`)
/// * `Err(IdentityError)` - a header is present but malformed
pub fn extract_actor(headers: &HeaderMap) -> Result<Option<Actor>, IdentityError> {
    let Some(raw_id) = headers.get(USER_ID_HEADER) else {
        return Ok(None);
    };

    let user_id = raw_id
        .to_str()
        .ok()
        .and_then(|s| s.trim().parse::<UserId>().ok())
        .ok_or(IdentityError::InvalidHeader(USER_ID_HEADER))?;

    let role = match headers.get(USER_ROLE_HEADER) {
        None => Role::Citizen,
        Some(value) => value
            .to_str()
            .ok()
            .and_then(|s| Role::from_code(s.trim()))
            .ok_or(IdentityError::InvalidHeader(USER_ROLE_HEADER))?,
    };

    tracing::trace!(user_id = %user_id, role = %role, "Resolved request actor");

    Ok(Some(Actor { user_id, role }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_anonymous_request() {
        let headers = HeaderMap::new();
        assert!(extract_actor(&headers).unwrap().is_none());
    }

    #[test]
    fn test_extract_actor_defaults_to_citizen() {
        let user_id = UserId::new();
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_ID_HEADER,
            HeaderValue::from_str(&user_id.to_string()).unwrap(),
        );

        let actor = extract_actor(&headers).unwrap().unwrap();
        assert_eq!(actor.user_id, user_id);
        assert_eq!(actor.role, Role::Citizen);
    }

    #[test]
    fn test_extract_admin_role() {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_ID_HEADER,
            HeaderValue::from_str(&UserId::new().to_string()).unwrap(),
        );
        headers.insert(USER_ROLE_HEADER, HeaderValue::from_static("admin"));

        let actor = extract_actor(&headers).unwrap().unwrap();
        assert!(actor.role.is_admin());
    }

    #[test]
    fn test_malformed_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, HeaderValue::from_static("nope"));
        assert!(extract_actor(&headers).is_err());

        let mut headers = HeaderMap::new();
        headers.insert(
            USER_ID_HEADER,
            HeaderValue::from_str(&UserId::new().to_string()).unwrap(),
        );
        headers.insert(USER_ROLE_HEADER, HeaderValue::from_static("root"));
        assert!(matches!(
            extract_actor(&headers),
            Err(IdentityError::InvalidHeader(USER_ROLE_HEADER))
        ));
    }

    #[test]
    fn test_role_codes() {
        for role in [Role::Citizen, Role::CooperativeStaff, Role::Admin] {
            assert_eq!(Role::from_code(role.code()), Some(role));
        }
        assert_eq!(Role::from_code("super_admin"), None);
    }
}
