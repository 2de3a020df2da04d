//! Get Claim Use Case

use kernel::id::ClaimId;
use platform::identity::Actor;
use std::sync::Arc;

use crate::domain::entities::Claim;
use crate::domain::repository::ClaimRepository;
use crate::error::{ClaimsError, ClaimsResult};

/// Get Claim Use Case
pub struct GetClaimUseCase<C>
where
    C: ClaimRepository,
{
    claim_repo: Arc<C>,
}

impl<C> GetClaimUseCase<C>
where
    C: ClaimRepository,
{
    pub fn new(claim_repo: Arc<C>) -> Self {
        Self { claim_repo }
    }

    /// Claimant, finder and admins may read a claim
    pub async fn execute(&self, actor: &Actor, claim_id: ClaimId) -> ClaimsResult<Claim> {
        let claim = self
            .claim_repo
            .find(claim_id)
            .await?
            .ok_or(ClaimsError::NotFound("Claim"))?;

        if claim.party_of(actor.user_id).is_none() && !actor.role.is_admin() {
            return Err(ClaimsError::Unauthorized);
        }
        Ok(claim)
    }
}
