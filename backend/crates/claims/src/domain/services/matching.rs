//! Match scoring between lost and found reports
//!
//! Pure functions of two item snapshots plus the district table. Calling
//! them never mutates anything, so they can run on every page view.

use chrono::{DateTime, Duration, Utc};
use std::cmp::Ordering;

use crate::domain::entities::{FoundItem, LostItem};
use crate::domain::services::geo::same_district;
use crate::domain::services::keywords::{extract_keywords, shared_keywords};

pub const CATEGORY_POINTS: u32 = 5;
pub const DISTRICT_POINTS: u32 = 3;
pub const TIME_WINDOW_POINTS: u32 = 2;
pub const KEYWORD_POINTS: u32 = 1;

/// Tunables for match scoring
#[derive(Debug, Clone, Copy)]
pub struct MatchRules {
    /// Maximum distance between lost and found dates, inclusive
    pub window: Duration,
    /// Candidates scoring below this are not shown
    pub display_threshold: u32,
}

impl Default for MatchRules {
    fn default() -> Self {
        Self {
            window: Duration::hours(72),
            display_threshold: CATEGORY_POINTS,
        }
    }
}

/// Score of one (lost, found) pair with the reasons that built it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchScore {
    pub score: u32,
    /// Contributing components in evaluation order
    pub reasons: Vec<String>,
}

/// A ranked candidate for the item being matched
#[derive(Debug, Clone)]
pub struct MatchCandidate<T> {
    pub item: T,
    pub score: u32,
    pub reasons: Vec<String>,
}

/// Two timestamps are at most `window` apart, in either direction
pub fn is_within_window(a: DateTime<Utc>, b: DateTime<Utc>, window: Duration) -> bool {
    (a - b).abs() <= window
}

/// Score a pair, or `None` when the categories differ
pub fn score_pair(lost: &LostItem, found: &FoundItem, rules: &MatchRules) -> Option<MatchScore> {
    if lost.category != found.category {
        return None;
    }

    let mut score = CATEGORY_POINTS;
    let mut reasons = vec!["same category".to_string()];

    if let Some(district) = same_district(&lost.location_area, &found.location_area) {
        score += DISTRICT_POINTS;
        reasons.push(format!("same district: {}", district));
    }

    if is_within_window(lost.lost_date, found.found_date, rules.window) {
        score += TIME_WINDOW_POINTS;
        reasons.push(format!("reported within {} hours", rules.window.num_hours()));
    }

    let lost_keywords = extract_keywords(&format!("{} {}", lost.title, lost.description));
    let found_keywords = extract_keywords(&format!("{} {}", found.title, found.description));
    let shared = shared_keywords(&lost_keywords, &found_keywords).len() as u32;
    if shared > 0 {
        score += shared * KEYWORD_POINTS;
        reasons.push(format!("{} shared keywords", shared));
    }

    Some(MatchScore { score, reasons })
}

/// Rank open found reports against a lost report
pub fn find_matches_for_lost(
    lost: &LostItem,
    found_items: &[FoundItem],
    rules: &MatchRules,
) -> Vec<MatchCandidate<FoundItem>> {
    let mut candidates: Vec<_> = found_items
        .iter()
        .filter(|found| found.status.is_open())
        .filter_map(|found| {
            score_pair(lost, found, rules).map(|m| MatchCandidate {
                item: found.clone(),
                score: m.score,
                reasons: m.reasons,
            })
        })
        .filter(|c| c.score >= rules.display_threshold)
        .collect();

    candidates.sort_by(|a, b| {
        rank(a.score, b.score, a.item.created_at, b.item.created_at)
            .then_with(|| a.item.id.cmp(&b.item.id))
    });
    candidates
}

/// Rank open lost reports against a found report
pub fn find_matches_for_found(
    found: &FoundItem,
    lost_items: &[LostItem],
    rules: &MatchRules,
) -> Vec<MatchCandidate<LostItem>> {
    let mut candidates: Vec<_> = lost_items
        .iter()
        .filter(|lost| lost.status.is_open())
        .filter_map(|lost| {
            score_pair(lost, found, rules).map(|m| MatchCandidate {
                item: lost.clone(),
                score: m.score,
                reasons: m.reasons,
            })
        })
        .filter(|c| c.score >= rules.display_threshold)
        .collect();

    candidates.sort_by(|a, b| {
        rank(a.score, b.score, a.item.created_at, b.item.created_at)
            .then_with(|| a.item.id.cmp(&b.item.id))
    });
    candidates
}

/// Higher score first, then the more recent report
fn rank(
    score_a: u32,
    score_b: u32,
    created_a: DateTime<Utc>,
    created_b: DateTime<Utc>,
) -> Ordering {
    score_b.cmp(&score_a).then_with(|| created_b.cmp(&created_a))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::{Category, ItemStatus, QuestionAnswer, VerificationQuestions};
    use chrono::TimeZone;
    use kernel::id::{FoundItemId, LostItemId, UserId};

    fn at(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, day, hour, minute, 0).unwrap()
    }

    fn lost(category: Category, area: &str, date: DateTime<Utc>, text: &str) -> LostItem {
        LostItem {
            id: LostItemId::new(),
            owner_id: UserId::new(),
            category,
            title: text.to_string(),
            description: String::new(),
            location_area: area.to_string(),
            lost_date: date,
            status: ItemStatus::Active,
            verification: VerificationQuestions::new(vec![
                QuestionAnswer::new("a?", "x"),
                QuestionAnswer::new("b?", "y"),
                QuestionAnswer::new("c?", "z"),
            ])
            .unwrap(),
            created_at: date,
        }
    }

    fn found(category: Category, area: &str, date: DateTime<Utc>, text: &str) -> FoundItem {
        FoundItem {
            id: FoundItemId::new(),
            reporter_id: UserId::new(),
            category,
            title: text.to_string(),
            description: String::new(),
            location_area: area.to_string(),
            found_date: date,
            status: ItemStatus::Active,
            created_at: date,
        }
    }

    #[test]
    fn test_window_is_symmetric_and_inclusive() {
        let window = Duration::hours(72);
        let start = at(1, 0, 0);
        assert!(is_within_window(start, start + Duration::hours(72), window));
        assert!(is_within_window(start + Duration::hours(72), start, window));
        assert!(!is_within_window(
            start,
            start + Duration::hours(72) + Duration::minutes(1),
            window
        ));
        assert!(!is_within_window(
            start + Duration::hours(72) + Duration::minutes(1),
            start,
            window
        ));
    }

    #[test]
    fn test_category_mismatch_excluded() {
        let rules = MatchRules::default();
        let l = lost(Category::Phone, "Remera", at(1, 8, 0), "black samsung phone");
        let f = found(Category::Wallet, "Remera", at(1, 9, 0), "black samsung phone");
        assert!(score_pair(&l, &f, &rules).is_none());
        assert!(find_matches_for_lost(&l, &[f], &rules).is_empty());
    }

    #[test]
    fn test_full_score_and_reasons() {
        let rules = MatchRules::default();
        let l = lost(Category::Phone, "Remera", at(1, 8, 0), "black samsung phone");
        let f = found(Category::Phone, "Kimironko", at(2, 8, 0), "samsung phone cracked");

        let m = score_pair(&l, &f, &rules).unwrap();
        assert_eq!(m.score, 5 + 3 + 2 + 2);
        assert_eq!(
            m.reasons,
            vec![
                "same category",
                "same district: Gasabo",
                "reported within 72 hours",
                "2 shared keywords",
            ]
        );
    }

    #[test]
    fn test_category_only_meets_threshold() {
        let rules = MatchRules::default();
        let l = lost(Category::Keys, "Musanze", at(1, 8, 0), "keyring");
        let f = found(Category::Keys, "Huye", at(20, 8, 0), "lanyard");

        let results = find_matches_for_lost(&l, &[f], &rules);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].score, 5);
        assert_eq!(results[0].reasons, vec!["same category"]);
    }

    #[test]
    fn test_ordering_and_closed_items() {
        let rules = MatchRules::default();
        let l = lost(Category::Bag, "Remera", at(10, 8, 0), "red backpack");

        let weak = found(Category::Bag, "Musanze", at(25, 8, 0), "suitcase");
        let strong = found(Category::Bag, "Remera", at(10, 9, 0), "red backpack");
        let older_tie = found(Category::Bag, "Huye", at(1, 8, 0), "duffel");
        let mut closed = found(Category::Bag, "Remera", at(10, 9, 0), "red backpack");
        closed.status = ItemStatus::Closed;

        let results = find_matches_for_lost(
            &l,
            &[older_tie.clone(), weak.clone(), closed, strong.clone()],
            &rules,
        );
        let ids: Vec<_> = results.iter().map(|c| c.item.id).collect();
        assert_eq!(ids, vec![strong.id, weak.id, older_tie.id]);
    }

    #[test]
    fn test_matches_for_found_never_cross_category() {
        let rules = MatchRules::default();
        let f = found(Category::Id, "Gikondo", at(3, 8, 0), "national id card");
        let lost_items = vec![
            lost(Category::Id, "Kanombe", at(3, 7, 0), "id card"),
            lost(Category::Wallet, "Kanombe", at(3, 7, 0), "id card wallet"),
        ];

        let results = find_matches_for_found(&f, &lost_items, &rules);
        assert_eq!(results.len(), 1);
        assert!(results.iter().all(|c| c.item.category == f.category));
    }

    #[test]
    fn test_scoring_is_idempotent() {
        let rules = MatchRules::default();
        let l = lost(Category::Phone, "Remera", at(1, 8, 0), "black samsung phone");
        let f = found(Category::Phone, "Remera", at(1, 9, 0), "black phone");
        assert_eq!(score_pair(&l, &f, &rules), score_pair(&l, &f, &rules));
    }
}
