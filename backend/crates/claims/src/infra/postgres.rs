//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use kernel::id::{ClaimId, FoundItemId, LostItemId, UserId};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::domain::entities::{Claim, ClaimState, FoundItem, IssuedOtp, LostItem, TrustProfile};
use crate::domain::repository::{ClaimRepository, ClaimTransition, ItemRepository, TrustRepository};
use crate::domain::value_objects::{
    Category, ClaimStatus, ItemStatus, QuestionAnswer, TrustEvent, TrustScore,
    VerificationQuestions,
};
use crate::error::{ClaimsError, ClaimsResult, ConflictReason};

/// PostgreSQL-backed claims repository
#[derive(Clone)]
pub struct PgClaimsRepository {
    pool: PgPool,
}

impl PgClaimsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const LOST_ITEM_COLUMNS: &str = r#"
    lost_item_id, owner_id, category, title, description, location_area, lost_date,
    item_status, question_1, answer_1, question_2, answer_2, question_3, answer_3, created_at
"#;

const FOUND_ITEM_COLUMNS: &str = r#"
    found_item_id, reporter_id, category, title, description, location_area, found_date,
    item_status, created_at
"#;

const CLAIM_COLUMNS: &str = r#"
    claim_id, lost_item_id, found_item_id, claimant_id, finder_id, claim_status, attempts,
    last_score, otp_hash, otp_issued_at, otp_expires_at, superseded_otp_hashes,
    verified_at, rejected_at, returned_at, version, created_at, updated_at
"#;

const TRUST_COLUMNS: &str = r#"
    user_id, trust_score, failures_today, last_failure_at, account_created_at, updated_at
"#;

// ============================================================================
// Item Repository Implementation
// ============================================================================

impl ItemRepository for PgClaimsRepository {
    async fn find_lost(&self, id: LostItemId) -> ClaimsResult<Option<LostItem>> {
        let row = sqlx::query_as::<_, LostItemRow>(&format!(
            "SELECT {LOST_ITEM_COLUMNS} FROM lost_items WHERE lost_item_id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(LostItemRow::into_lost_item).transpose()
    }

    async fn find_found(&self, id: FoundItemId) -> ClaimsResult<Option<FoundItem>> {
        let row = sqlx::query_as::<_, FoundItemRow>(&format!(
            "SELECT {FOUND_ITEM_COLUMNS} FROM found_items WHERE found_item_id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(FoundItemRow::into_found_item).transpose()
    }

    async fn list_open_lost(&self) -> ClaimsResult<Vec<LostItem>> {
        sqlx::query_as::<_, LostItemRow>(&format!(
            "SELECT {LOST_ITEM_COLUMNS} FROM lost_items \
             WHERE item_status <> 'closed' ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(LostItemRow::into_lost_item)
        .collect()
    }

    async fn list_open_found(&self) -> ClaimsResult<Vec<FoundItem>> {
        sqlx::query_as::<_, FoundItemRow>(&format!(
            "SELECT {FOUND_ITEM_COLUMNS} FROM found_items \
             WHERE item_status <> 'closed' ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(FoundItemRow::into_found_item)
        .collect()
    }

    async fn count_reports_since(
        &self,
        user_id: UserId,
        since: DateTime<Utc>,
    ) -> ClaimsResult<u32> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM lost_items WHERE owner_id = $1 AND created_at >= $2)
              + (SELECT COUNT(*) FROM found_items WHERE reporter_id = $1 AND created_at >= $2)
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(since)
        .fetch_one(&self.pool)
        .await?;

        Ok(u32::try_from(count).unwrap_or(u32::MAX))
    }
}

// ============================================================================
// Claim Repository Implementation
// ============================================================================

impl ClaimRepository for PgClaimsRepository {
    async fn find(&self, claim_id: ClaimId) -> ClaimsResult<Option<Claim>> {
        let row = sqlx::query_as::<_, ClaimRow>(&format!(
            "SELECT {CLAIM_COLUMNS} FROM claims WHERE claim_id = $1"
        ))
        .bind(claim_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(ClaimRow::into_claim).transpose()
    }

    async fn find_active_for_pair(
        &self,
        lost_item_id: LostItemId,
        found_item_id: FoundItemId,
    ) -> ClaimsResult<Option<Claim>> {
        let row = sqlx::query_as::<_, ClaimRow>(&format!(
            "SELECT {CLAIM_COLUMNS} FROM claims \
             WHERE lost_item_id = $1 AND found_item_id = $2 \
               AND claim_status IN ('pending', 'verified')"
        ))
        .bind(lost_item_id.as_uuid())
        .bind(found_item_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(ClaimRow::into_claim).transpose()
    }

    async fn count_active_for_claimant(&self, claimant_id: UserId) -> ClaimsResult<u32> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM claims
            WHERE claimant_id = $1 AND claim_status IN ('pending', 'verified')
            "#,
        )
        .bind(claimant_id.as_uuid())
        .fetch_one(&self.pool)
        .await?;

        Ok(u32::try_from(count).unwrap_or(u32::MAX))
    }

    async fn insert(&self, claim: &Claim) -> ClaimsResult<()> {
        let columns = ClaimColumns::from_claim(claim);

        let result = sqlx::query(
            r#"
            INSERT INTO claims (
                claim_id,
                lost_item_id,
                found_item_id,
                claimant_id,
                finder_id,
                claim_status,
                attempts,
                last_score,
                version,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(claim.id.as_uuid())
        .bind(claim.lost_item_id.as_uuid())
        .bind(claim.found_item_id.as_uuid())
        .bind(claim.claimant_id.as_uuid())
        .bind(claim.finder_id.as_uuid())
        .bind(columns.status.code())
        .bind(columns.attempts)
        .bind(columns.last_score)
        .bind(claim.version)
        .bind(claim.created_at)
        .bind(claim.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            // Partial unique index on the active pair
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(ClaimsError::Conflict(ConflictReason::DuplicateClaim))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn commit(&self, transition: &ClaimTransition) -> ClaimsResult<bool> {
        let claim = &transition.claim;
        let columns = ClaimColumns::from_claim(claim);
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE claims SET
                claim_status = $3,
                attempts = $4,
                last_score = $5,
                otp_hash = $6,
                otp_issued_at = $7,
                otp_expires_at = $8,
                superseded_otp_hashes = $9,
                verified_at = $10,
                rejected_at = $11,
                returned_at = $12,
                version = $13,
                updated_at = $14
            WHERE claim_id = $1 AND version = $2
            "#,
        )
        .bind(claim.id.as_uuid())
        .bind(transition.expected_version)
        .bind(columns.status.code())
        .bind(columns.attempts)
        .bind(columns.last_score)
        .bind(columns.otp_hash)
        .bind(columns.otp_issued_at)
        .bind(columns.otp_expires_at)
        .bind(columns.superseded)
        .bind(columns.verified_at)
        .bind(columns.rejected_at)
        .bind(columns.returned_at)
        .bind(claim.version)
        .bind(claim.updated_at)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if updated == 0 {
            tx.rollback().await?;
            tracing::debug!(
                claim_id = %claim.id,
                expected_version = transition.expected_version,
                "Claim version moved, transition discarded"
            );
            return Ok(false);
        }

        for (user_id, event) in &transition.trust_events {
            apply_delta(&mut tx, *user_id, *event, transition.at).await?;
        }

        if let Some(user_id) = transition.record_failure_for {
            sqlx::query(
                r#"
                INSERT INTO trust_profiles (
                    user_id, trust_score, failures_today, last_failure_at,
                    account_created_at, updated_at
                ) VALUES ($1, 0, 1, $2, $2, $2)
                ON CONFLICT (user_id) DO UPDATE SET
                    failures_today = CASE
                        WHEN trust_profiles.last_failure_at > $2 - INTERVAL '24 hours'
                        THEN trust_profiles.failures_today + 1
                        ELSE 1
                    END,
                    last_failure_at = $2,
                    updated_at = $2
                "#,
            )
            .bind(user_id.as_uuid())
            .bind(transition.at)
            .execute(&mut *tx)
            .await?;
        }

        if let Some(status) = transition.item_status {
            let lost = sqlx::query(
                "UPDATE lost_items SET item_status = $2 \
                 WHERE lost_item_id = $1 AND item_status <> 'closed'",
            )
            .bind(claim.lost_item_id.as_uuid())
            .bind(status.code())
            .execute(&mut *tx)
            .await?
            .rows_affected();
            let found = sqlx::query(
                "UPDATE found_items SET item_status = $2 \
                 WHERE found_item_id = $1 AND item_status <> 'closed'",
            )
            .bind(claim.found_item_id.as_uuid())
            .bind(status.code())
            .execute(&mut *tx)
            .await?
            .rows_affected();

            if lost == 0 || found == 0 {
                tx.rollback().await?;
                tracing::warn!(
                    claim_id = %claim.id,
                    "Item closed under a pending transition"
                );
                return Err(ClaimsError::Conflict(ConflictReason::ItemClosed));
            }
        }

        tx.commit().await?;

        tracing::debug!(
            claim_id = %claim.id,
            version = claim.version,
            status = %columns.status,
            "Claim transition committed"
        );

        Ok(true)
    }
}

/// Atomic clamped score change inside a transaction
async fn apply_delta(
    tx: &mut Transaction<'_, Postgres>,
    user_id: UserId,
    event: TrustEvent,
    at: DateTime<Utc>,
) -> ClaimsResult<TrustProfile> {
    let row = sqlx::query_as::<_, TrustRow>(&format!(
        r#"
        INSERT INTO trust_profiles (user_id, trust_score, account_created_at, updated_at)
        VALUES ($1, GREATEST($3, LEAST($4, $2)), $5, $5)
        ON CONFLICT (user_id) DO UPDATE SET
            trust_score = GREATEST($3, LEAST($4, trust_profiles.trust_score + $2)),
            updated_at = $5
        RETURNING {TRUST_COLUMNS}
        "#
    ))
    .bind(user_id.as_uuid())
    .bind(event.delta())
    .bind(TrustScore::MIN)
    .bind(TrustScore::MAX)
    .bind(at)
    .fetch_one(&mut **tx)
    .await?;

    tracing::info!(
        user_id = %user_id,
        event = %event,
        delta = event.delta(),
        score = row.trust_score,
        "Trust score adjusted"
    );

    row.into_profile()
}

// ============================================================================
// Trust Repository Implementation
// ============================================================================

impl TrustRepository for PgClaimsRepository {
    async fn get_or_create(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> ClaimsResult<TrustProfile> {
        sqlx::query(
            r#"
            INSERT INTO trust_profiles (user_id, account_created_at, updated_at)
            VALUES ($1, $2, $2)
            ON CONFLICT (user_id) DO NOTHING
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(now)
        .execute(&self.pool)
        .await?;

        sqlx::query_as::<_, TrustRow>(&format!(
            "SELECT {TRUST_COLUMNS} FROM trust_profiles WHERE user_id = $1"
        ))
        .bind(user_id.as_uuid())
        .fetch_one(&self.pool)
        .await?
        .into_profile()
    }

    async fn apply_event(
        &self,
        user_id: UserId,
        event: TrustEvent,
        now: DateTime<Utc>,
    ) -> ClaimsResult<TrustProfile> {
        let mut tx = self.pool.begin().await?;
        let profile = apply_delta(&mut tx, user_id, event, now).await?;
        tx.commit().await?;
        Ok(profile)
    }
}

// ============================================================================
// Row types for sqlx mapping
// ============================================================================

fn corrupt(what: &str, id: Uuid) -> ClaimsError {
    ClaimsError::Internal(format!("corrupt {what} row {id}"))
}

#[derive(sqlx::FromRow)]
struct LostItemRow {
    lost_item_id: Uuid,
    owner_id: Uuid,
    category: String,
    title: String,
    description: String,
    location_area: String,
    lost_date: DateTime<Utc>,
    item_status: String,
    question_1: String,
    answer_1: String,
    question_2: String,
    answer_2: String,
    question_3: String,
    answer_3: String,
    created_at: DateTime<Utc>,
}

impl LostItemRow {
    fn into_lost_item(self) -> ClaimsResult<LostItem> {
        let id = self.lost_item_id;
        let status =
            ItemStatus::from_code(&self.item_status).ok_or_else(|| corrupt("lost item", id))?;
        let verification = VerificationQuestions::new(vec![
            QuestionAnswer::new(self.question_1, self.answer_1),
            QuestionAnswer::new(self.question_2, self.answer_2),
            QuestionAnswer::new(self.question_3, self.answer_3),
        ])
        .map_err(|_| corrupt("lost item", id))?;

        Ok(LostItem {
            id: LostItemId::from_uuid(id),
            owner_id: UserId::from_uuid(self.owner_id),
            category: Category::parse(&self.category),
            title: self.title,
            description: self.description,
            location_area: self.location_area,
            lost_date: self.lost_date,
            status,
            verification,
            created_at: self.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct FoundItemRow {
    found_item_id: Uuid,
    reporter_id: Uuid,
    category: String,
    title: String,
    description: String,
    location_area: String,
    found_date: DateTime<Utc>,
    item_status: String,
    created_at: DateTime<Utc>,
}

impl FoundItemRow {
    fn into_found_item(self) -> ClaimsResult<FoundItem> {
        let status = ItemStatus::from_code(&self.item_status)
            .ok_or_else(|| corrupt("found item", self.found_item_id))?;

        Ok(FoundItem {
            id: FoundItemId::from_uuid(self.found_item_id),
            reporter_id: UserId::from_uuid(self.reporter_id),
            category: Category::parse(&self.category),
            title: self.title,
            description: self.description,
            location_area: self.location_area,
            found_date: self.found_date,
            status,
            created_at: self.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ClaimRow {
    claim_id: Uuid,
    lost_item_id: Uuid,
    found_item_id: Uuid,
    claimant_id: Uuid,
    finder_id: Uuid,
    claim_status: String,
    attempts: i16,
    last_score: Option<i16>,
    otp_hash: Option<Vec<u8>>,
    otp_issued_at: Option<DateTime<Utc>>,
    otp_expires_at: Option<DateTime<Utc>>,
    superseded_otp_hashes: Vec<Vec<u8>>,
    verified_at: Option<DateTime<Utc>>,
    rejected_at: Option<DateTime<Utc>>,
    returned_at: Option<DateTime<Utc>>,
    version: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ClaimRow {
    fn into_claim(self) -> ClaimsResult<Claim> {
        let id = self.claim_id;
        let bad = || corrupt("claim", id);

        let attempts = u8::try_from(self.attempts).map_err(|_| bad())?;
        let last_score = self
            .last_score
            .map(u8::try_from)
            .transpose()
            .map_err(|_| bad())?;
        let hash = |bytes: Vec<u8>| <[u8; 32]>::try_from(bytes).map_err(|_| bad());

        let status = ClaimStatus::from_code(&self.claim_status).ok_or_else(bad)?;
        let state = match status {
            ClaimStatus::Pending => ClaimState::Pending {
                attempts,
                last_score,
            },
            ClaimStatus::Verified => {
                let otp = match (self.otp_hash, self.otp_issued_at, self.otp_expires_at) {
                    (Some(code_hash), Some(issued_at), Some(expires_at)) => Some(IssuedOtp {
                        code_hash: hash(code_hash)?,
                        issued_at,
                        expires_at,
                    }),
                    (None, None, None) => None,
                    _ => return Err(bad()),
                };
                ClaimState::Verified {
                    attempts,
                    score: last_score.ok_or_else(bad)?,
                    verified_at: self.verified_at.ok_or_else(bad)?,
                    otp,
                    superseded: self
                        .superseded_otp_hashes
                        .into_iter()
                        .map(hash)
                        .collect::<ClaimsResult<_>>()?,
                }
            }
            ClaimStatus::Rejected => ClaimState::Rejected {
                attempts,
                last_score: last_score.ok_or_else(bad)?,
                rejected_at: self.rejected_at.ok_or_else(bad)?,
            },
            ClaimStatus::Returned => ClaimState::Returned {
                attempts,
                score: last_score.ok_or_else(bad)?,
                verified_at: self.verified_at.ok_or_else(bad)?,
                returned_at: self.returned_at.ok_or_else(bad)?,
            },
        };

        Ok(Claim {
            id: ClaimId::from_uuid(id),
            lost_item_id: LostItemId::from_uuid(self.lost_item_id),
            found_item_id: FoundItemId::from_uuid(self.found_item_id),
            claimant_id: UserId::from_uuid(self.claimant_id),
            finder_id: UserId::from_uuid(self.finder_id),
            state,
            version: self.version,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Flattened claim state as stored in the `claims` table
struct ClaimColumns {
    status: ClaimStatus,
    attempts: i16,
    last_score: Option<i16>,
    otp_hash: Option<Vec<u8>>,
    otp_issued_at: Option<DateTime<Utc>>,
    otp_expires_at: Option<DateTime<Utc>>,
    superseded: Vec<Vec<u8>>,
    verified_at: Option<DateTime<Utc>>,
    rejected_at: Option<DateTime<Utc>>,
    returned_at: Option<DateTime<Utc>>,
}

impl ClaimColumns {
    fn from_claim(claim: &Claim) -> Self {
        let mut columns = Self {
            status: claim.status(),
            attempts: i16::from(claim.state.attempts()),
            last_score: claim.state.last_score().map(i16::from),
            otp_hash: None,
            otp_issued_at: None,
            otp_expires_at: None,
            superseded: Vec::new(),
            verified_at: None,
            rejected_at: None,
            returned_at: None,
        };

        match &claim.state {
            ClaimState::Pending { .. } => {}
            ClaimState::Verified {
                verified_at,
                otp,
                superseded,
                ..
            } => {
                columns.verified_at = Some(*verified_at);
                if let Some(otp) = otp {
                    columns.otp_hash = Some(otp.code_hash.to_vec());
                    columns.otp_issued_at = Some(otp.issued_at);
                    columns.otp_expires_at = Some(otp.expires_at);
                }
                columns.superseded = superseded.iter().map(|h| h.to_vec()).collect();
            }
            ClaimState::Rejected { rejected_at, .. } => {
                columns.rejected_at = Some(*rejected_at);
            }
            ClaimState::Returned {
                verified_at,
                returned_at,
                ..
            } => {
                columns.verified_at = Some(*verified_at);
                columns.returned_at = Some(*returned_at);
            }
        }
        columns
    }
}

#[derive(sqlx::FromRow)]
struct TrustRow {
    user_id: Uuid,
    trust_score: i32,
    failures_today: i32,
    last_failure_at: Option<DateTime<Utc>>,
    account_created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TrustRow {
    fn into_profile(self) -> ClaimsResult<TrustProfile> {
        Ok(TrustProfile {
            user_id: UserId::from_uuid(self.user_id),
            score: self.trust_score,
            failures_today: u32::try_from(self.failures_today)
                .map_err(|_| corrupt("trust profile", self.user_id))?,
            last_failure_at: self.last_failure_at,
            account_created_at: self.account_created_at,
            updated_at: self.updated_at,
        })
    }
}
