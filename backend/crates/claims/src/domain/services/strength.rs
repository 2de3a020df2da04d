//! Verification strength analysis
//!
//! Heuristic quality score of the security questions an owner sets when
//! reporting a lost item. Informational only: a weak result never blocks a
//! report.

use serde::Serialize;
use std::collections::BTreeSet;

use crate::domain::services::keywords::{extract_keywords, jaccard};
use crate::domain::value_objects::{Category, QuestionAnswer};

pub const BASELINE_SCORE: i32 = 60;
pub const YES_NO_PENALTY: i32 = 40;
pub const SHORT_ANSWER_PENALTY: i32 = 20;
pub const ANSWER_IN_DESCRIPTION_PENALTY: i32 = 30;
pub const SPECIFICITY_BONUS: i32 = 20;
/// Trimmed answers shorter than this are flagged
pub const MIN_ANSWER_CHARS: usize = 3;
pub const MODERATE_FROM: u8 = 40;
pub const STRONG_FROM: u8 = 70;
/// Key-term overlap at or above which two questions count as redundant
pub const REDUNDANCY_SIMILARITY: f64 = 0.5;

const YES_NO_PREFIXES: &[&str] = &[
    "is it", "was it", "does it", "did it", "has it", "is there", "was there", "are there",
];

const SPECIFICITY_MARKERS: &[&str] = &[
    "how many",
    "describe",
    "what specific",
    "what exactly",
    "which",
    "what brand",
    "what is written",
    "what name",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Strength {
    Weak,
    Moderate,
    Strong,
}

impl Strength {
    pub fn from_score(score: u8) -> Self {
        if score < MODERATE_FROM {
            Strength::Weak
        } else if score < STRONG_FROM {
            Strength::Moderate
        } else {
            Strength::Strong
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StrengthIssue {
    EasyToGuess,
    TooShort,
    AnswerInDescription,
}

impl StrengthIssue {
    pub const fn message(&self) -> &'static str {
        match self {
            StrengthIssue::EasyToGuess => "Yes/no questions are easy to guess",
            StrengthIssue::TooShort => "Answer is too short",
            StrengthIssue::AnswerInDescription => "Answer appears in the item description",
        }
    }

    pub const fn suggestion(&self) -> &'static str {
        match self {
            StrengthIssue::EasyToGuess => {
                "Ask for a detail that cannot be answered with yes or no"
            }
            StrengthIssue::TooShort => "Use an answer of at least 3 characters",
            StrengthIssue::AnswerInDescription => {
                "Ask about something that is not in the public description"
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionStrength {
    pub score: u8,
    pub issues: Vec<StrengthIssue>,
    pub suggestions: Vec<String>,
    pub specific: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StrengthReport {
    pub questions: Vec<QuestionStrength>,
    pub overall_score: u8,
    pub overall_strength: Strength,
    pub redundancy_warning: Option<String>,
}

/// Analyze a set of question/answer pairs for a report
pub fn analyze_strength(
    pairs: &[QuestionAnswer],
    category: Category,
    description: &str,
) -> StrengthReport {
    let description_lc = description.to_lowercase();
    let description_keywords = extract_keywords(description);

    let questions: Vec<QuestionStrength> = pairs
        .iter()
        .map(|pair| analyze_question(pair, category, &description_lc, &description_keywords))
        .collect();

    let overall_score = if questions.is_empty() {
        0
    } else {
        let total: u32 = questions.iter().map(|q| u32::from(q.score)).sum();
        (total as f64 / questions.len() as f64).round() as u8
    };

    StrengthReport {
        overall_strength: Strength::from_score(overall_score),
        overall_score,
        redundancy_warning: redundancy_warning(pairs),
        questions,
    }
}

fn analyze_question(
    pair: &QuestionAnswer,
    category: Category,
    description_lc: &str,
    description_keywords: &BTreeSet<String>,
) -> QuestionStrength {
    let question = pair.question.trim().to_lowercase();
    let answer = pair.answer.trim().to_lowercase();

    let mut score = BASELINE_SCORE;
    let mut issues = Vec::new();

    if YES_NO_PREFIXES.iter().any(|p| question.starts_with(p)) {
        score -= YES_NO_PENALTY;
        issues.push(StrengthIssue::EasyToGuess);
    }

    if answer.chars().count() < MIN_ANSWER_CHARS {
        score -= SHORT_ANSWER_PENALTY;
        issues.push(StrengthIssue::TooShort);
    }

    if answer_in_description(&answer, description_lc, description_keywords) {
        score -= ANSWER_IN_DESCRIPTION_PENALTY;
        issues.push(StrengthIssue::AnswerInDescription);
    }

    let specific = SPECIFICITY_MARKERS.iter().any(|m| question.contains(m))
        || category_nouns(category).iter().any(|n| question.contains(n));
    if specific {
        score += SPECIFICITY_BONUS;
    }

    let mut suggestions: Vec<String> = issues.iter().map(|i| i.suggestion().to_string()).collect();
    if issues.is_empty() && !specific {
        suggestions.push(
            "Ask about a specific, countable detail, for example \"how many ...\"".to_string(),
        );
    }

    QuestionStrength {
        score: score.clamp(0, 100) as u8,
        issues,
        suggestions,
        specific,
    }
}

/// The whole answer, or one of its longer words, is in the description
fn answer_in_description(
    answer: &str,
    description_lc: &str,
    description_keywords: &BTreeSet<String>,
) -> bool {
    if answer.is_empty() {
        return false;
    }
    if answer.chars().count() >= MIN_ANSWER_CHARS && description_lc.contains(answer) {
        return true;
    }
    extract_keywords(answer)
        .iter()
        .filter(|word| word.chars().count() > MIN_ANSWER_CHARS)
        .any(|word| description_keywords.contains(word))
}

fn redundancy_warning(pairs: &[QuestionAnswer]) -> Option<String> {
    let terms: Vec<BTreeSet<String>> = pairs
        .iter()
        .map(|p| extract_keywords(&p.question))
        .collect();

    for i in 0..terms.len() {
        for j in (i + 1)..terms.len() {
            if jaccard(&terms[i], &terms[j]) >= REDUNDANCY_SIMILARITY {
                return Some(format!(
                    "Questions {} and {} ask about the same detail; try covering different features",
                    i + 1,
                    j + 1
                ));
            }
        }
    }
    None
}

/// Nouns that make a question specific for a category
fn category_nouns(category: Category) -> &'static [&'static str] {
    match category {
        Category::Id => &["name", "birth", "photo", "number ends"],
        Category::Wallet => &["card", "receipt", "photo", "compartment", "cash"],
        Category::Phone => &["wallpaper", "lock screen", "case", "sticker", "contact"],
        Category::Keys => &["keychain", "keyring", "tag", "how many keys"],
        Category::Bag => &["pocket", "zipper", "inside", "brand", "patch"],
        Category::Documents => &["title", "stamp", "signature", "page"],
        Category::Electronics => &["serial", "model", "sticker", "scratch"],
        Category::Jewelry => &["engraving", "stone", "clasp", "metal"],
        Category::Clothing => &["size", "label", "stain", "button"],
        Category::Other => &["mark", "scratch", "engraving"],
    }
}

/// Curated example questions for a category code
///
/// Never fails: unknown codes get the generic set.
pub fn templates_for_category(code: &str) -> &'static [&'static str] {
    match Category::parse(code) {
        Category::Id => &[
            "What are the last three digits of the ID number?",
            "What is the date of birth printed on the card?",
            "Which district is printed as the place of issue?",
        ],
        Category::Wallet => &[
            "How many cards were inside the wallet?",
            "Describe any receipts or papers kept inside",
            "What specific photo or note is in the wallet?",
        ],
        Category::Phone => &[
            "What is the lock screen wallpaper?",
            "Describe the phone case",
            "How many apps are in the bottom dock?",
        ],
        Category::Keys => &[
            "How many keys are on the ring?",
            "Describe the keychain attached",
            "What is written on any tag?",
        ],
        Category::Bag => &[
            "What specific items were in the front pocket?",
            "Describe any patch or mark on the bag",
            "How many compartments does it have?",
        ],
        Category::Documents => &[
            "What is the title of the first page?",
            "Which office stamp appears on the documents?",
            "How many pages are there?",
        ],
        Category::Electronics => &[
            "What are the last digits of the serial number?",
            "Describe any scratches or stickers",
            "Which model is it exactly?",
        ],
        Category::Jewelry => &[
            "What engraving is on the piece?",
            "Describe the clasp",
            "How many stones does it have?",
        ],
        Category::Clothing => &[
            "What size is on the label?",
            "Describe any stain or repair",
            "How many buttons does it have?",
        ],
        Category::Other => &[
            "Describe a unique mark on the item",
            "What specific detail would only the owner know?",
            "How many parts or pieces does it have?",
        ],
    }
}
