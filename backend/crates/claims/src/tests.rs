//! Crate-level tests for the claims module
//! Use cases run against the in-memory repository with a pinned clock.

#[cfg(test)]
mod fixtures {
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use kernel::id::{FoundItemId, LostItemId, UserId};
    use platform::identity::{Actor, Role};
    use std::sync::{Arc, Mutex};

    use crate::application::config::ClaimsConfig;
    use crate::domain::entities::{FoundItem, LostItem};
    use crate::domain::notification::{Notification, Notifier};
    use crate::domain::value_objects::{
        Category, ItemStatus, QuestionAnswer, VerificationQuestions,
    };
    use crate::error::ClaimsResult;
    use crate::infra::memory::InMemoryClaimsRepository;

    pub fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
    }

    pub fn minutes(n: i64) -> Duration {
        Duration::minutes(n)
    }

    /// Notifier that keeps everything it was asked to send
    #[derive(Default)]
    pub struct RecordingNotifier {
        pub sent: Mutex<Vec<Notification>>,
    }

    impl RecordingNotifier {
        pub fn sent(&self) -> Vec<Notification> {
            self.sent.lock().unwrap().clone()
        }
    }

    impl Notifier for RecordingNotifier {
        async fn dispatch(&self, notification: Notification) -> ClaimsResult<()> {
            self.sent.lock().unwrap().push(notification);
            Ok(())
        }
    }

    pub fn lost_item(owner_id: UserId, at: DateTime<Utc>) -> LostItem {
        LostItem {
            id: LostItemId::new(),
            owner_id,
            category: Category::Phone,
            title: "Black Samsung phone".to_string(),
            description: "Samsung Galaxy with a cracked screen. Call 0788123456".to_string(),
            location_area: "Remera".to_string(),
            lost_date: at - Duration::days(2),
            status: ItemStatus::Active,
            verification: VerificationQuestions::new(vec![
                QuestionAnswer::new("What is the wallpaper?", "My Dog"),
                QuestionAnswer::new("What color is the case?", "blue"),
                QuestionAnswer::new("How many stickers are on the back?", "six"),
            ])
            .unwrap(),
            created_at: at - Duration::hours(1),
        }
    }

    pub fn found_item(reporter_id: UserId, at: DateTime<Utc>) -> FoundItem {
        FoundItem {
            id: FoundItemId::new(),
            reporter_id,
            category: Category::Phone,
            title: "Samsung phone found".to_string(),
            description: "Black samsung with cracked screen near the bus stop".to_string(),
            location_area: "Kacyiru".to_string(),
            found_date: at - Duration::days(1),
            status: ItemStatus::Active,
            created_at: at - Duration::hours(1),
        }
    }

    /// One owner, one finder, and a matching pair of reports
    pub struct World {
        pub repo: Arc<InMemoryClaimsRepository>,
        pub notifier: Arc<RecordingNotifier>,
        pub config: Arc<ClaimsConfig>,
        pub owner: Actor,
        pub finder: Actor,
        pub lost: LostItem,
        pub found: FoundItem,
    }

    impl World {
        pub fn new() -> Self {
            let repo = InMemoryClaimsRepository::new();
            let owner = Actor::citizen(UserId::new());
            let finder = Actor::citizen(UserId::new());
            let lost = lost_item(owner.user_id, t0());
            let found = found_item(finder.user_id, t0());
            repo.insert_lost(lost.clone()).unwrap();
            repo.insert_found(found.clone()).unwrap();

            Self {
                repo: Arc::new(repo),
                notifier: Arc::new(RecordingNotifier::default()),
                config: Arc::new(ClaimsConfig::default()),
                owner,
                finder,
                lost,
                found,
            }
        }

        pub fn stranger(&self) -> Actor {
            Actor::citizen(UserId::new())
        }

        pub fn admin(&self) -> Actor {
            Actor::new(UserId::new(), Role::Admin)
        }
    }
}

#[cfg(test)]
mod lifecycle_tests {
    use super::fixtures::*;
    use crate::application::confirm_otp::{ConfirmOtpInput, ConfirmOtpUseCase};
    use crate::application::create_claim::{CreateClaimInput, CreateClaimUseCase};
    use crate::application::get_claim::GetClaimUseCase;
    use crate::application::issue_otp::IssueOtpUseCase;
    use crate::application::verify_claim::{VerifyClaimInput, VerifyClaimUseCase};
    use crate::domain::entities::Claim;
    use crate::domain::notification::Notification;
    use crate::domain::repository::{
        ClaimRepository, ClaimTransition, ItemRepository, TrustRepository,
    };
    use crate::domain::value_objects::{ClaimStatus, ItemStatus};
    use crate::error::{ClaimsError, ConflictReason, RateLimitReason};
    use chrono::{DateTime, Utc};
    use platform::identity::Actor;
    use std::time::Duration;

    async fn open_claim(world: &World) -> Claim {
        CreateClaimUseCase::new(
            world.repo.clone(),
            world.repo.clone(),
            world.repo.clone(),
            world.config.clone(),
        )
        .execute_at(
            &world.owner,
            CreateClaimInput {
                lost_item_id: world.lost.id,
                found_item_id: world.found.id,
            },
            t0(),
        )
        .await
        .unwrap()
    }

    fn verify_use_case(
        world: &World,
    ) -> VerifyClaimUseCase<
        crate::InMemoryClaimsRepository,
        crate::InMemoryClaimsRepository,
        crate::InMemoryClaimsRepository,
        RecordingNotifier,
    > {
        VerifyClaimUseCase::new(
            world.repo.clone(),
            world.repo.clone(),
            world.repo.clone(),
            world.notifier.clone(),
            world.config.clone(),
        )
    }

    fn answers(a: &str, b: &str, c: &str) -> Vec<String> {
        vec![a.to_string(), b.to_string(), c.to_string()]
    }

    async fn verify(
        world: &World,
        actor: &Actor,
        claim: &Claim,
        given: Vec<String>,
        at: DateTime<Utc>,
    ) -> Result<crate::application::verify_claim::VerifyClaimOutput, ClaimsError> {
        verify_use_case(world)
            .execute_at(
                actor,
                VerifyClaimInput {
                    claim_id: claim.id,
                    answers: given,
                },
                at,
            )
            .await
    }

    #[tokio::test]
    async fn test_create_claim_starts_pending() {
        let world = World::new();
        let claim = open_claim(&world).await;

        assert_eq!(claim.status(), ClaimStatus::Pending);
        assert_eq!(claim.claimant_id, world.owner.user_id);
        assert_eq!(claim.finder_id, world.finder.user_id);
        assert_eq!(claim.state.attempts(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_active_claim_conflicts() {
        let world = World::new();
        open_claim(&world).await;

        let err = CreateClaimUseCase::new(
            world.repo.clone(),
            world.repo.clone(),
            world.repo.clone(),
            world.config.clone(),
        )
        .execute_at(
            &world.owner,
            CreateClaimInput {
                lost_item_id: world.lost.id,
                found_item_id: world.found.id,
            },
            t0(),
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            ClaimsError::Conflict(ConflictReason::DuplicateClaim)
        ));
    }

    #[tokio::test]
    async fn test_only_owner_may_claim() {
        let world = World::new();
        let err = CreateClaimUseCase::new(
            world.repo.clone(),
            world.repo.clone(),
            world.repo.clone(),
            world.config.clone(),
        )
        .execute_at(
            &world.stranger(),
            CreateClaimInput {
                lost_item_id: world.lost.id,
                found_item_id: world.found.id,
            },
            t0(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ClaimsError::Unauthorized));
    }

    #[tokio::test]
    async fn test_verify_pass_marks_items_matched() {
        let world = World::new();
        let claim = open_claim(&world).await;

        let out = verify(
            &world,
            &world.owner,
            &claim,
            answers(" my dog ", "BLUE", "wrong"),
            t0(),
        )
        .await
        .unwrap();

        assert_eq!(out.score, 2);
        assert!(out.passed);
        assert_eq!(out.status, ClaimStatus::Verified);

        let lost = world.repo.find_lost(world.lost.id).await.unwrap().unwrap();
        let found = world.repo.find_found(world.found.id).await.unwrap().unwrap();
        assert_eq!(lost.status, ItemStatus::Matched);
        assert_eq!(found.status, ItemStatus::Matched);

        let sent = world.notifier.sent();
        assert!(matches!(
            sent.as_slice(),
            [Notification::ClaimStatusChanged {
                status: ClaimStatus::Verified,
                ..
            }]
        ));
    }

    #[tokio::test]
    async fn test_failures_penalize_and_reject_at_cap() {
        let world = World::new();
        let claim = open_claim(&world).await;
        let owner = world.owner.user_id;

        let first = verify(&world, &world.owner, &claim, answers("x", "y", "z"), t0())
            .await
            .unwrap();
        assert_eq!(first.status, ClaimStatus::Pending);
        assert_eq!(first.attempts_remaining, 2);
        let profile = world.repo.get_or_create(owner, t0()).await.unwrap();
        assert_eq!(profile.score, -5);
        assert_eq!(profile.failures_today, 1);

        // Second attempt once the one-hour cooldown has passed
        let second_at = t0() + minutes(61);
        let second = verify(&world, &world.owner, &claim, answers("my dog", "y", "z"), second_at)
            .await
            .unwrap();
        assert_eq!(second.score, 1);
        assert_eq!(second.status, ClaimStatus::Pending);
        assert_eq!(second.attempts_remaining, 1);

        // Two failures owe four hours
        let third_at = second_at + minutes(241);
        let third = verify(&world, &world.owner, &claim, answers("x", "y", "z"), third_at)
            .await
            .unwrap();
        assert_eq!(third.status, ClaimStatus::Rejected);
        assert_eq!(third.attempts_remaining, 0);

        let profile = world.repo.get_or_create(owner, third_at).await.unwrap();
        assert_eq!(profile.score, -5 - 5 - 5 - 15);
        assert_eq!(profile.failures_today, 3);

        // Rejected claims take no further attempts
        let later = third_at + chrono::Duration::days(2);
        let err = verify(&world, &world.owner, &claim, answers("my dog", "blue", "six"), later)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ClaimsError::Conflict(ConflictReason::AlreadyResolved)
        ));

        // and cost the claimant nothing more
        let after = world.repo.get_or_create(owner, later).await.unwrap();
        assert_eq!(after.score, profile.score);
        assert_eq!(after.failures_today, profile.failures_today);
        assert_eq!(after.last_failure_at, profile.last_failure_at);
    }

    #[tokio::test]
    async fn test_cooldown_blocks_next_attempt() {
        let world = World::new();
        let claim = open_claim(&world).await;

        verify(&world, &world.owner, &claim, answers("x", "y", "z"), t0())
            .await
            .unwrap();

        let err = verify(
            &world,
            &world.owner,
            &claim,
            answers("my dog", "blue", "six"),
            t0() + minutes(10),
        )
        .await
        .unwrap_err();

        match err {
            ClaimsError::RateLimited {
                reason,
                retry_after,
            } => {
                assert_eq!(reason, RateLimitReason::Cooldown);
                assert_eq!(retry_after, Some(Duration::from_secs(50 * 60)));
            }
            other => panic!("expected cooldown, got {other:?}"),
        }

        // The refused attempt is not counted
        let stored = world.repo.find(claim.id).await.unwrap().unwrap();
        assert_eq!(stored.state.attempts(), 1);
    }

    #[tokio::test]
    async fn test_wrong_answer_count_is_validation_error() {
        let world = World::new();
        let claim = open_claim(&world).await;

        let err = verify(&world, &world.owner, &claim, vec!["my dog".to_string()], t0())
            .await
            .unwrap_err();
        assert!(matches!(err, ClaimsError::Validation(_)));
    }

    #[tokio::test]
    async fn test_finder_cannot_answer_questions() {
        let world = World::new();
        let claim = open_claim(&world).await;

        let err = verify(&world, &world.finder, &claim, answers("my dog", "blue", "six"), t0())
            .await
            .unwrap_err();
        assert!(matches!(err, ClaimsError::Unauthorized));
    }

    #[tokio::test]
    async fn test_otp_before_verification_conflicts() {
        let world = World::new();
        let claim = open_claim(&world).await;

        let err = IssueOtpUseCase::new(
            world.repo.clone(),
            world.repo.clone(),
            world.notifier.clone(),
            world.config.clone(),
        )
        .execute_at(&world.owner, claim.id, t0())
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            ClaimsError::Conflict(ConflictReason::NotVerified)
        ));
    }

    #[tokio::test]
    async fn test_handover_completes_claim() {
        let world = World::new();
        let claim = open_claim(&world).await;
        verify(&world, &world.owner, &claim, answers("my dog", "blue", "six"), t0())
            .await
            .unwrap();

        let issued = IssueOtpUseCase::new(
            world.repo.clone(),
            world.repo.clone(),
            world.notifier.clone(),
            world.config.clone(),
        )
        .execute_at(&world.owner, claim.id, t0() + minutes(1))
        .await
        .unwrap();
        assert_eq!(issued.code.as_str().len(), world.config.otp_digits);
        assert_eq!(issued.expires_at, t0() + minutes(11));
        assert!(world.notifier.sent().iter().any(|n| matches!(
            n,
            Notification::OtpIssued { recipient, .. } if *recipient == world.owner.user_id
        )));

        let out = ConfirmOtpUseCase::new(
            world.repo.clone(),
            world.repo.clone(),
            world.notifier.clone(),
            world.config.clone(),
        )
        .execute_at(
            &world.finder,
            ConfirmOtpInput {
                claim_id: claim.id,
                code: issued.code.as_str().to_string(),
            },
            t0() + minutes(5),
        )
        .await
        .unwrap();
        assert_eq!(out.status, ClaimStatus::Returned);

        let finder = world
            .repo
            .get_or_create(world.finder.user_id, t0())
            .await
            .unwrap();
        let owner = world
            .repo
            .get_or_create(world.owner.user_id, t0())
            .await
            .unwrap();
        assert_eq!(finder.score, 10);
        assert_eq!(owner.score, 5);

        let lost = world.repo.find_lost(world.lost.id).await.unwrap().unwrap();
        let found = world.repo.find_found(world.found.id).await.unwrap().unwrap();
        assert_eq!(lost.status, ItemStatus::Closed);
        assert_eq!(found.status, ItemStatus::Closed);
    }

    #[tokio::test]
    async fn test_superseded_and_expired_codes_are_rejected() {
        let world = World::new();
        let claim = open_claim(&world).await;
        verify(&world, &world.owner, &claim, answers("my dog", "blue", "six"), t0())
            .await
            .unwrap();

        let issue = IssueOtpUseCase::new(
            world.repo.clone(),
            world.repo.clone(),
            world.notifier.clone(),
            world.config.clone(),
        );
        let first = issue.execute_at(&world.owner, claim.id, t0()).await.unwrap();
        let second = issue
            .execute_at(&world.owner, claim.id, t0() + minutes(2))
            .await
            .unwrap();

        let confirm = ConfirmOtpUseCase::new(
            world.repo.clone(),
            world.repo.clone(),
            world.notifier.clone(),
            world.config.clone(),
        );
        let submit = |code: &str, at| {
            confirm.execute_at(
                &world.finder,
                ConfirmOtpInput {
                    claim_id: claim.id,
                    code: code.to_string(),
                },
                at,
            )
        };

        if first.code != second.code {
            let err = submit(first.code.as_str(), t0() + minutes(3)).await.unwrap_err();
            assert!(matches!(
                err,
                ClaimsError::Conflict(ConflictReason::OtpSuperseded)
            ));
        }

        let err = submit(second.code.as_str(), t0() + minutes(30))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ClaimsError::Conflict(ConflictReason::OtpExpired)
        ));

        let err = submit("12ab56", t0() + minutes(3)).await.unwrap_err();
        assert!(matches!(err, ClaimsError::Validation(_)));

        // Nothing above changed the claim or anyone's trust
        let stored = world.repo.find(claim.id).await.unwrap().unwrap();
        assert_eq!(stored.status(), ClaimStatus::Verified);
        let finder = world
            .repo
            .get_or_create(world.finder.user_id, t0())
            .await
            .unwrap();
        assert_eq!(finder.score, 0);
    }

    #[tokio::test]
    async fn test_claimant_cannot_confirm_own_handover() {
        let world = World::new();
        let claim = open_claim(&world).await;
        verify(&world, &world.owner, &claim, answers("my dog", "blue", "six"), t0())
            .await
            .unwrap();
        let issued = IssueOtpUseCase::new(
            world.repo.clone(),
            world.repo.clone(),
            world.notifier.clone(),
            world.config.clone(),
        )
        .execute_at(&world.owner, claim.id, t0())
        .await
        .unwrap();

        let err = ConfirmOtpUseCase::new(
            world.repo.clone(),
            world.repo.clone(),
            world.notifier.clone(),
            world.config.clone(),
        )
        .execute_at(
            &world.owner,
            ConfirmOtpInput {
                claim_id: claim.id,
                code: issued.code.as_str().to_string(),
            },
            t0(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ClaimsError::Unauthorized));
    }

    fn issue_use_case(
        world: &World,
    ) -> IssueOtpUseCase<crate::InMemoryClaimsRepository, crate::InMemoryClaimsRepository, RecordingNotifier>
    {
        IssueOtpUseCase::new(
            world.repo.clone(),
            world.repo.clone(),
            world.notifier.clone(),
            world.config.clone(),
        )
    }

    fn confirm_use_case(
        world: &World,
    ) -> ConfirmOtpUseCase<crate::InMemoryClaimsRepository, crate::InMemoryClaimsRepository, RecordingNotifier>
    {
        ConfirmOtpUseCase::new(
            world.repo.clone(),
            world.repo.clone(),
            world.notifier.clone(),
            world.config.clone(),
        )
    }

    /// Second found report of the same lost item, claimed by the owner
    async fn open_sibling_claim(world: &World) -> (Actor, Claim) {
        let other_finder = world.stranger();
        let other_found = found_item(other_finder.user_id, t0());
        world.repo.insert_found(other_found.clone()).unwrap();

        let claim = CreateClaimUseCase::new(
            world.repo.clone(),
            world.repo.clone(),
            world.repo.clone(),
            world.config.clone(),
        )
        .execute_at(
            &world.owner,
            CreateClaimInput {
                lost_item_id: world.lost.id,
                found_item_id: other_found.id,
            },
            t0(),
        )
        .await
        .unwrap();
        (other_finder, claim)
    }

    async fn hand_over(world: &World, claim: &Claim, at: DateTime<Utc>) {
        let issued = issue_use_case(world)
            .execute_at(&world.owner, claim.id, at)
            .await
            .unwrap();
        confirm_use_case(world)
            .execute_at(
                &world.finder,
                ConfirmOtpInput {
                    claim_id: claim.id,
                    code: issued.code.as_str().to_string(),
                },
                at,
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_returned_item_refuses_pending_sibling() {
        let world = World::new();
        let first = open_claim(&world).await;
        let (_, second) = open_sibling_claim(&world).await;

        verify(&world, &world.owner, &first, answers("my dog", "blue", "six"), t0())
            .await
            .unwrap();
        hand_over(&world, &first, t0() + minutes(5)).await;

        let err = verify(
            &world,
            &world.owner,
            &second,
            answers("my dog", "blue", "six"),
            t0() + minutes(10),
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            ClaimsError::Conflict(ConflictReason::ItemClosed)
        ));

        let lost = world.repo.find_lost(world.lost.id).await.unwrap().unwrap();
        assert_eq!(lost.status, ItemStatus::Closed);
        let stored = world.repo.find(second.id).await.unwrap().unwrap();
        assert_eq!(stored.status(), ClaimStatus::Pending);
        assert_eq!(stored.state.attempts(), 0);

        let err = issue_use_case(&world)
            .execute_at(&world.owner, second.id, t0() + minutes(10))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ClaimsError::Conflict(ConflictReason::ItemClosed)
        ));
    }

    #[tokio::test]
    async fn test_returned_item_refuses_verified_sibling_handover() {
        let world = World::new();
        let first = open_claim(&world).await;
        let (other_finder, second) = open_sibling_claim(&world).await;

        for claim in [&first, &second] {
            verify(&world, &world.owner, claim, answers("my dog", "blue", "six"), t0())
                .await
                .unwrap();
        }
        let pending_code = issue_use_case(&world)
            .execute_at(&world.owner, second.id, t0() + minutes(1))
            .await
            .unwrap();
        hand_over(&world, &first, t0() + minutes(2)).await;

        let err = confirm_use_case(&world)
            .execute_at(
                &other_finder,
                ConfirmOtpInput {
                    claim_id: second.id,
                    code: pending_code.code.as_str().to_string(),
                },
                t0() + minutes(3),
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ClaimsError::Conflict(ConflictReason::ItemClosed)
        ));

        let err = issue_use_case(&world)
            .execute_at(&world.owner, second.id, t0() + minutes(3))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ClaimsError::Conflict(ConflictReason::ItemClosed)
        ));

        // The returned claim itself is finished
        let err = issue_use_case(&world)
            .execute_at(&world.owner, first.id, t0() + minutes(3))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ClaimsError::Conflict(ConflictReason::AlreadyResolved)
        ));

        // One return, credited once
        let owner = world
            .repo
            .get_or_create(world.owner.user_id, t0())
            .await
            .unwrap();
        assert_eq!(owner.score, 5);
        let other = world
            .repo
            .get_or_create(other_finder.user_id, t0())
            .await
            .unwrap();
        assert_eq!(other.score, 0);
        let stored = world.repo.find(second.id).await.unwrap().unwrap();
        assert_eq!(stored.status(), ClaimStatus::Verified);
    }

    #[tokio::test]
    async fn test_commit_refuses_item_status_on_closed_item() {
        let world = World::new();
        let first = open_claim(&world).await;
        let (_, second) = open_sibling_claim(&world).await;

        verify(&world, &world.owner, &first, answers("my dog", "blue", "six"), t0())
            .await
            .unwrap();
        hand_over(&world, &first, t0() + minutes(5)).await;

        // A transition built before the item closed
        let mut stale = second.clone();
        stale.record_attempt(3, 2, 3, t0()).unwrap();
        let transition = ClaimTransition::new(second.version, stale, t0())
            .with_item_status(ItemStatus::Matched);
        assert!(matches!(
            world.repo.commit(&transition).await,
            Err(ClaimsError::Conflict(ConflictReason::ItemClosed))
        ));

        let lost = world.repo.find_lost(world.lost.id).await.unwrap().unwrap();
        assert_eq!(lost.status, ItemStatus::Closed);
        let stored = world.repo.find(second.id).await.unwrap().unwrap();
        assert_eq!(stored.status(), ClaimStatus::Pending);
    }

    #[tokio::test]
    async fn test_get_claim_visibility() {
        let world = World::new();
        let claim = open_claim(&world).await;
        let use_case = GetClaimUseCase::new(world.repo.clone());

        assert!(use_case.execute(&world.owner, claim.id).await.is_ok());
        assert!(use_case.execute(&world.finder, claim.id).await.is_ok());
        assert!(use_case.execute(&world.admin(), claim.id).await.is_ok());
        assert!(matches!(
            use_case.execute(&world.stranger(), claim.id).await,
            Err(ClaimsError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn test_stale_version_commit_is_refused() {
        let world = World::new();
        let claim = open_claim(&world).await;

        let mut first = claim.clone();
        first.record_attempt(3, 2, 3, t0()).unwrap();
        let winner = ClaimTransition::new(claim.version, first, t0());
        assert!(world.repo.commit(&winner).await.unwrap());

        let mut second = claim.clone();
        second.record_attempt(0, 2, 3, t0()).unwrap();
        let loser = ClaimTransition::new(claim.version, second, t0())
            .with_failure(world.owner.user_id);
        assert!(!world.repo.commit(&loser).await.unwrap());

        let stored = world.repo.find(claim.id).await.unwrap().unwrap();
        assert_eq!(stored.status(), ClaimStatus::Verified);
        let profile = world
            .repo
            .get_or_create(world.owner.user_id, t0())
            .await
            .unwrap();
        assert_eq!(profile.failures_today, 0);
    }

    #[tokio::test]
    async fn test_active_claim_ceiling() {
        let world = World::new();
        let create = CreateClaimUseCase::new(
            world.repo.clone(),
            world.repo.clone(),
            world.repo.clone(),
            world.config.clone(),
        );

        // New accounts may hold two active claims
        for _ in 0..2 {
            let found = found_item(world.finder.user_id, t0());
            world.repo.insert_found(found.clone()).unwrap();
            create
                .execute_at(
                    &world.owner,
                    CreateClaimInput {
                        lost_item_id: world.lost.id,
                        found_item_id: found.id,
                    },
                    t0(),
                )
                .await
                .unwrap();
        }

        let err = create
            .execute_at(
                &world.owner,
                CreateClaimInput {
                    lost_item_id: world.lost.id,
                    found_item_id: world.found.id,
                },
                t0(),
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ClaimsError::RateLimited {
                reason: RateLimitReason::ActiveClaimCeiling,
                retry_after: None,
            }
        ));
    }
}

#[cfg(test)]
mod trust_tests {
    use super::fixtures::*;
    use crate::application::record_trust_event::{RecordTrustEventInput, RecordTrustEventUseCase};
    use crate::application::report_allowance::ReportAllowanceUseCase;
    use crate::application::trust_summary::TrustSummaryUseCase;
    use crate::domain::entities::TrustProfile;
    use crate::domain::value_objects::{TrustEvent, TrustLevel};
    use crate::error::ClaimsError;

    #[tokio::test]
    async fn test_admin_records_manual_event() {
        let world = World::new();
        let use_case = RecordTrustEventUseCase::new(world.repo.clone());

        let profile = use_case
            .execute_at(
                &world.admin(),
                RecordTrustEventInput {
                    user_id: world.finder.user_id,
                    event: TrustEvent::ScamConfirmed,
                },
                t0(),
            )
            .await
            .unwrap();
        assert_eq!(profile.score, -50);
        assert_eq!(profile.level(), TrustLevel::Suspended);
    }

    #[tokio::test]
    async fn test_manual_events_need_admin_and_exclude_claim_driven() {
        let world = World::new();
        let use_case = RecordTrustEventUseCase::new(world.repo.clone());

        let err = use_case
            .execute_at(
                &world.owner,
                RecordTrustEventInput {
                    user_id: world.owner.user_id,
                    event: TrustEvent::IdentityVerified,
                },
                t0(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ClaimsError::Unauthorized));

        let err = use_case
            .execute_at(
                &world.admin(),
                RecordTrustEventInput {
                    user_id: world.owner.user_id,
                    event: TrustEvent::SuccessfulReturnFinder,
                },
                t0(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ClaimsError::Validation(_)));
    }

    #[tokio::test]
    async fn test_trust_summary_visibility() {
        let world = World::new();
        let mut aged = TrustProfile::new(world.owner.user_id, t0() - chrono::Duration::days(30));
        aged.score = 25;
        world.repo.insert_profile(aged).unwrap();

        let use_case =
            TrustSummaryUseCase::new(world.repo.clone(), world.repo.clone(), world.config.clone());

        let summary = use_case
            .execute_at(&world.owner, world.owner.user_id, t0())
            .await
            .unwrap();
        assert_eq!(summary.level, TrustLevel::Established);
        assert_eq!(summary.limits.max_active_claims, 5);
        assert_eq!(summary.account_age_days, 30);
        assert!(!summary.young_account);
        assert!(summary.cooldown_remaining.is_none());

        assert!(
            use_case
                .execute_at(&world.admin(), world.owner.user_id, t0())
                .await
                .is_ok()
        );
        assert!(matches!(
            use_case
                .execute_at(&world.finder, world.owner.user_id, t0())
                .await,
            Err(ClaimsError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn test_report_allowance_counts_trailing_day() {
        let world = World::new();
        let use_case =
            ReportAllowanceUseCase::new(world.repo.clone(), world.repo.clone(), world.config.clone());

        // Fixture reports were created an hour before t0
        let allowance = use_case.execute_at(&world.owner, t0()).await.unwrap();
        assert_eq!(allowance.level, TrustLevel::New);
        assert_eq!(allowance.used, 1);
        assert_eq!(allowance.limit, 3);
        assert_eq!(allowance.remaining, 2);
        assert!(allowance.allowed);

        for _ in 0..2 {
            world
                .repo
                .insert_lost(lost_item(world.owner.user_id, t0()))
                .unwrap();
        }
        let allowance = use_case.execute_at(&world.owner, t0()).await.unwrap();
        assert_eq!(allowance.used, 3);
        assert_eq!(allowance.remaining, 0);
        assert!(!allowance.allowed);

        // A day later the window has moved on
        let later = t0() + chrono::Duration::hours(24);
        let allowance = use_case.execute_at(&world.owner, later).await.unwrap();
        assert_eq!(allowance.used, 0);
        assert!(allowance.allowed);
    }
}

#[cfg(test)]
mod item_tests {
    use super::fixtures::*;
    use crate::application::analyze_strength::{AnalyzeStrengthInput, AnalyzeStrengthUseCase};
    use crate::application::find_matches::FindMatchesUseCase;
    use crate::application::view_items::ViewItemsUseCase;
    use crate::domain::services::redaction::RedactionKind;
    use crate::domain::services::strength::Strength;
    use crate::domain::value_objects::Category;
    use crate::error::ClaimsError;
    use platform::identity::{Actor, Role};
    use kernel::id::UserId;

    #[tokio::test]
    async fn test_owner_sees_ranked_matches() {
        let world = World::new();
        let use_case = FindMatchesUseCase::new(world.repo.clone(), world.config.clone());

        let matches = use_case.for_lost(&world.owner, world.lost.id).await.unwrap();
        assert_eq!(matches.len(), 1);

        let top = &matches[0];
        assert_eq!(top.candidate.item.id, world.found.id);
        assert!(top.candidate.score >= 10);
        assert_eq!(top.candidate.reasons[0], "same category");
        assert!(
            top.candidate
                .reasons
                .iter()
                .any(|r| r.starts_with("same district"))
        );
    }

    #[tokio::test]
    async fn test_matches_need_owner_or_staff() {
        let world = World::new();
        let use_case = FindMatchesUseCase::new(world.repo.clone(), world.config.clone());

        assert!(matches!(
            use_case.for_lost(&world.stranger(), world.lost.id).await,
            Err(ClaimsError::Unauthorized)
        ));

        let staff = Actor::new(UserId::new(), Role::CooperativeStaff);
        let matches = use_case.for_found(&staff, world.found.id).await.unwrap();
        assert_eq!(matches.len(), 1);
        // Staff are not the owner, so the lost description is redacted
        assert!(!matches[0].description.text.contains("0788123456"));
    }

    #[tokio::test]
    async fn test_item_views_redact_for_non_owners() {
        let world = World::new();
        let use_case = ViewItemsUseCase::new(world.repo.clone(), world.config.clone());

        let own = use_case
            .lost(Some(world.owner.user_id), world.lost.id)
            .await
            .unwrap();
        assert!(own.is_owner);
        assert!(own.description.text.contains("0788123456"));

        let anonymous = use_case.lost(None, world.lost.id).await.unwrap();
        assert!(!anonymous.is_owner);
        assert!(!anonymous.description.text.contains("0788123456"));
        assert!(anonymous.description.redactions.contains(&RedactionKind::Phone));

        let listed = use_case.list_lost(Some(world.finder.user_id)).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert!(!listed[0].is_owner);
    }

    #[test]
    fn test_strength_use_case_requires_three_pairs() {
        let use_case = AnalyzeStrengthUseCase::new();
        let err = use_case
            .execute(AnalyzeStrengthInput {
                questions: vec!["Is it black?".to_string()],
                answers: vec!["yes".to_string()],
                category: Category::Phone,
                description: String::new(),
            })
            .unwrap_err();
        assert!(matches!(err, ClaimsError::Validation(_)));
    }

    #[test]
    fn test_strength_use_case_flags_weak_questions() {
        let report = AnalyzeStrengthUseCase::new()
            .execute(AnalyzeStrengthInput {
                questions: vec![
                    "Is it black?".to_string(),
                    "Is it a phone?".to_string(),
                    "Does it have a case?".to_string(),
                ],
                answers: vec!["yes".to_string(), "no".to_string(), "y".to_string()],
                category: Category::Phone,
                description: "black phone".to_string(),
            })
            .unwrap();
        assert_eq!(report.overall_strength, Strength::Weak);
    }

    #[test]
    fn test_templates_fall_back_to_other() {
        let use_case = AnalyzeStrengthUseCase::new();
        assert_eq!(use_case.templates("PHONE").len(), 3);
        assert_eq!(use_case.templates("spaceship"), use_case.templates("OTHER"));
    }
}

#[cfg(test)]
mod models_tests {
    use super::fixtures::*;
    use crate::application::view_items::ItemView;
    use crate::domain::entities::Claim;
    use crate::domain::services::redaction::redact_for_viewer;
    use crate::domain::value_objects::OtpCode;
    use crate::presentation::dto::*;

    #[test]
    fn test_claim_response_serialization() {
        let world = World::new();
        let mut claim = Claim::open(&world.lost, &world.found, t0());
        claim.record_attempt(3, 2, 3, t0()).unwrap();
        let code = OtpCode::parse("123456", 6).unwrap();
        claim
            .issue_otp(&code, chrono::Duration::minutes(10), t0())
            .unwrap();

        let json = serde_json::to_value(ClaimResponse::from(claim)).unwrap();
        assert_eq!(json["status"], "VERIFIED");
        assert_eq!(json["attempts"], 1);
        assert_eq!(json["lastScore"], 3);
        assert!(json["otpExpiresAt"].is_string());
        assert!(json["lostItemId"].is_string());
        assert!(json.get("otp").is_none());
        assert!(!json.to_string().contains("123456"));
    }

    #[test]
    fn test_lost_item_response_hides_answers() {
        let world = World::new();
        let description = redact_for_viewer(&world.lost, Some(world.owner.user_id), 120);
        let view = ItemView::new(world.lost.clone(), description, Some(world.owner.user_id));

        let json = serde_json::to_value(LostItemResponse::from(view)).unwrap();
        assert_eq!(json["category"], "PHONE");
        assert_eq!(json["questions"].as_array().unwrap().len(), 3);
        assert_eq!(json["description"]["sensitivityLevel"], "NONE");
        assert!(!json.to_string().contains("My Dog"));

        let description = redact_for_viewer(&world.lost, None, 120);
        let view = ItemView::new(world.lost.clone(), description, None);
        let json = serde_json::to_value(LostItemResponse::from(view)).unwrap();
        assert!(json.get("questions").is_none());
        assert_eq!(json["description"]["redactions"][0], "PHONE");
    }

    #[test]
    fn test_create_claim_request_deserialization() {
        let world = World::new();
        let json = format!(
            r#"{{"lostItemId":"{}","foundItemId":"{}"}}"#,
            world.lost.id, world.found.id
        );
        let req: CreateClaimRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(req.lost_item_id, world.lost.id);
        assert_eq!(req.found_item_id, world.found.id);
    }

    #[test]
    fn test_record_trust_event_request_deserialization() {
        let json = r#"{"userId":"2d1b8f3e-5a7c-4e1f-9b2d-6c8a0e4f1a3b","event":"PHONE_VERIFIED"}"#;
        let req: RecordTrustEventRequest = serde_json::from_str(json).unwrap();
        assert_eq!(
            req.event,
            crate::domain::value_objects::TrustEvent::PhoneVerified
        );
    }

    #[test]
    fn test_otp_code_is_stored_as_sha256() {
        let code = OtpCode::parse(" 123456 ", 6).unwrap();
        assert_eq!(
            hex::encode(code.hash()),
            "8d969eef6ecad3c29a3a629280e686cf0c3f5d5a86aff3ca12020c923adc6c92"
        );
        assert_eq!(format!("{code:?}"), "OtpCode(******)");
        assert!(OtpCode::parse("12345", 6).is_err());
    }

    #[test]
    fn test_trust_summary_rounds_cooldown_up() {
        use crate::application::trust_summary::TrustSummary;
        use crate::domain::value_objects::TrustLevel;
        use kernel::id::UserId;
        use std::time::Duration;

        let summary = TrustSummary {
            user_id: UserId::new(),
            score: -5,
            level: TrustLevel::Restricted,
            limits: TrustLevel::Restricted.limits(),
            active_claims: 1,
            failures_today: 1,
            cooldown_remaining: Some(Duration::from_millis(59_500)),
            account_age_days: 0,
            young_account: true,
        };
        let json = serde_json::to_value(TrustSummaryResponse::from(summary)).unwrap();
        assert_eq!(json["cooldownRemainingSecs"], 60);
        assert_eq!(json["level"], "RESTRICTED");
        assert_eq!(json["limits"]["maxActiveClaims"], 1);
    }
}

#[cfg(test)]
mod error_tests {
    use crate::error::{ClaimsError, ConflictReason, RateLimitReason};
    use axum::http::{StatusCode, header};
    use axum::response::IntoResponse;
    use std::time::Duration;

    #[test]
    fn test_error_into_response_status_codes() {
        let cases = [
            (ClaimsError::validation("bad"), StatusCode::BAD_REQUEST),
            (
                ClaimsError::Conflict(ConflictReason::DuplicateClaim),
                StatusCode::CONFLICT,
            ),
            (ClaimsError::Unauthorized, StatusCode::FORBIDDEN),
            (ClaimsError::Suspended, StatusCode::FORBIDDEN),
            (ClaimsError::Unauthenticated, StatusCode::UNAUTHORIZED),
            (ClaimsError::NotFound("Claim"), StatusCode::NOT_FOUND),
            (
                ClaimsError::Internal("boom".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(err.status_code(), status);
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[test]
    fn test_cooldown_sets_retry_after() {
        let err = ClaimsError::RateLimited {
            reason: RateLimitReason::Cooldown,
            retry_after: Some(Duration::from_secs(240 * 60)),
        };
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers().get(header::RETRY_AFTER).unwrap(), "14400");
    }

    #[test]
    fn test_ceiling_has_no_retry_after() {
        let err = ClaimsError::RateLimited {
            reason: RateLimitReason::ActiveClaimCeiling,
            retry_after: None,
        };
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(response.headers().get(header::RETRY_AFTER).is_none());
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let err = ClaimsError::Internal("connection string leaked".to_string());
        assert!(!err.to_app_error().to_string().contains("leaked"));
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            ClaimsError::Conflict(ConflictReason::OtpExpired).to_string(),
            "Handover code expired"
        );
        assert_eq!(
            ClaimsError::NotFound("Claim").to_string(),
            "Claim not found"
        );
    }
}

#[cfg(test)]
mod router_tests {
    use super::fixtures::*;
    use crate::application::config::ClaimsConfig;
    use crate::infra::memory::InMemoryClaimsRepository;
    use crate::presentation::router::claims_router_generic;
    use axum::Router;
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use chrono::Utc;
    use platform::identity::{USER_ID_HEADER, USER_ROLE_HEADER};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    struct Api {
        router: Router,
        world_owner: String,
        world_finder: String,
        lost_id: String,
        found_id: String,
    }

    fn api() -> Api {
        let repo = InMemoryClaimsRepository::new();
        let owner = kernel::id::UserId::new();
        let finder = kernel::id::UserId::new();
        let lost = lost_item(owner, Utc::now());
        let found = found_item(finder, Utc::now());
        repo.insert_lost(lost.clone()).unwrap();
        repo.insert_found(found.clone()).unwrap();

        Api {
            router: claims_router_generic(
                repo,
                RecordingNotifier::default(),
                ClaimsConfig::default(),
            ),
            world_owner: owner.to_string(),
            world_finder: finder.to_string(),
            lost_id: lost.id.to_string(),
            found_id: found.id.to_string(),
        }
    }

    async fn send(
        router: &Router,
        method: Method,
        uri: &str,
        user: Option<(&str, &str)>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some((id, role)) = user {
            builder = builder
                .header(USER_ID_HEADER, id)
                .header(USER_ROLE_HEADER, role);
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn test_anonymous_claim_is_unauthenticated() {
        let api = api();
        let (status, _) = send(
            &api.router,
            Method::POST,
            "/claims",
            None,
            Some(json!({ "lostItemId": api.lost_id, "foundItemId": api.found_id })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_malformed_identity_is_bad_request() {
        let api = api();
        let (status, _) = send(
            &api.router,
            Method::GET,
            "/trust/me",
            Some(("not-a-uuid", "citizen")),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_claim_and_verify_over_http() {
        let api = api();
        let owner = Some((api.world_owner.as_str(), "citizen"));

        let (status, claim) = send(
            &api.router,
            Method::POST,
            "/claims",
            owner,
            Some(json!({ "lostItemId": api.lost_id, "foundItemId": api.found_id })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(claim["status"], "PENDING");
        let claim_id = claim["id"].as_str().unwrap().to_string();

        let (status, out) = send(
            &api.router,
            Method::POST,
            &format!("/claims/{claim_id}/verify"),
            owner,
            Some(json!({ "answers": ["my dog", "blue", "six"] })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(out["passed"], true);
        assert_eq!(out["status"], "VERIFIED");

        let (status, otp) = send(
            &api.router,
            Method::POST,
            &format!("/claims/{claim_id}/otp"),
            owner,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let code = otp["code"].as_str().unwrap().to_string();

        let finder = Some((api.world_finder.as_str(), "citizen"));
        let (status, done) = send(
            &api.router,
            Method::POST,
            &format!("/claims/{claim_id}/otp/confirm"),
            finder,
            Some(json!({ "code": code })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(done["status"], "RETURNED");

        let (status, trust) = send(&api.router, Method::GET, "/trust/me", finder, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(trust["score"], 10);
    }

    #[tokio::test]
    async fn test_public_item_view_is_redacted() {
        let api = api();
        let (status, item) = send(
            &api.router,
            Method::GET,
            &format!("/items/lost/{}", api.lost_id),
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(
            !item["description"]["text"]
                .as_str()
                .unwrap()
                .contains("0788123456")
        );
        assert!(item.get("questions").is_none());
    }

    #[tokio::test]
    async fn test_strength_and_templates_endpoints() {
        let api = api();
        let (status, report) = send(
            &api.router,
            Method::POST,
            "/items/strength",
            None,
            Some(json!({
                "questions": ["Is it black?", "What is the wallpaper?", "What sticker is on the back?"],
                "answers": ["yes", "my dog", "a red star"],
                "category": "phone",
                "description": "black phone"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(report["questions"].as_array().unwrap().len(), 3);
        assert_eq!(report["questions"][0]["issues"][0], "EASY_TO_GUESS");

        let (status, templates) =
            send(&api.router, Method::GET, "/items/templates/wallet", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(templates["category"], "WALLET");
        assert_eq!(templates["templates"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_admin_endpoint_refuses_citizens() {
        let api = api();
        let (status, _) = send(
            &api.router,
            Method::POST,
            "/admin/trust/events",
            Some((api.world_owner.as_str(), "citizen")),
            Some(json!({ "userId": api.world_finder, "event": "PHONE_VERIFIED" })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }
}
