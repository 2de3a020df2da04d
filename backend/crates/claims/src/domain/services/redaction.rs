//! Sensitive content redaction
//!
//! Masks personal data in item descriptions shown to anyone but the owner.
//! Pattern based: national ID numbers, Rwandan phone numbers and email
//! addresses.

use regex::{Captures, Regex};
use serde::Serialize;
use std::sync::LazyLock;

use kernel::id::UserId;

use crate::domain::entities::{FoundItem, LostItem};
use crate::domain::value_objects::Category;

/// Notice appended to truncated descriptions
pub const TRUNCATION_NOTICE: &str = "… [Full details visible after verification]";

/// 16 digits starting with 1
static NATIONAL_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b1\d{15}\b").expect("invalid national id pattern"));

/// +250 / 250 prefixed or leading-zero local mobile numbers
static PHONE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\+?\b250[\s-]?|\b0)7[2389]\d(?:[\s-]?\d{3}){2}\b")
        .expect("invalid phone pattern")
});

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?P<first>[A-Za-z0-9])[A-Za-z0-9._%+-]*@(?P<domain>[A-Za-z0-9.-]+\.[A-Za-z]{2,})\b")
        .expect("invalid email pattern")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SensitivityLevel {
    None,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RedactionKind {
    NationalId,
    Phone,
    Email,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redacted {
    pub text: String,
    pub redactions: Vec<RedactionKind>,
    pub sensitivity: SensitivityLevel,
    pub truncated: bool,
}

impl Redacted {
    fn unchanged(text: &str) -> Self {
        Self {
            text: text.to_string(),
            redactions: Vec::new(),
            sensitivity: SensitivityLevel::None,
            truncated: false,
        }
    }
}

/// Redact `text` for a viewer
///
/// Owners always see the original. For everyone else each pattern is applied
/// independently, then `ID`/`WALLET` descriptions longer than `budget`
/// characters are cut.
pub fn redact(text: &str, category: Category, is_owner: bool, budget: usize) -> Redacted {
    if is_owner {
        return Redacted::unchanged(text);
    }

    let mut redactions = Vec::new();
    let mut out = text.to_string();

    if NATIONAL_ID.is_match(&out) {
        out = NATIONAL_ID
            .replace_all(&out, |caps: &Captures| mask_national_id(&caps[0]))
            .into_owned();
        redactions.push(RedactionKind::NationalId);
    }

    if PHONE.is_match(&out) {
        out = PHONE
            .replace_all(&out, |caps: &Captures| mask_phone(&caps[0]))
            .into_owned();
        redactions.push(RedactionKind::Phone);
    }

    if EMAIL.is_match(&out) {
        out = EMAIL
            .replace_all(&out, "${first}***@${domain}")
            .into_owned();
        redactions.push(RedactionKind::Email);
    }

    let truncated = category.is_sensitive() && out.chars().count() > budget;
    if truncated {
        out = out.chars().take(budget).collect::<String>();
        out.push_str(TRUNCATION_NOTICE);
    }

    let sensitivity = if redactions.is_empty() {
        SensitivityLevel::None
    } else {
        SensitivityLevel::High
    };

    Redacted {
        text: out,
        redactions,
        sensitivity,
        truncated,
    }
}

/// Keep the first and last digit
fn mask_national_id(id: &str) -> String {
    let len = id.chars().count();
    id.chars()
        .enumerate()
        .map(|(i, c)| if i == 0 || i + 1 == len { c } else { '*' })
        .collect()
}

/// Mask every digit except the last three, keeping separators
fn mask_phone(phone: &str) -> String {
    let digits = phone.chars().filter(char::is_ascii_digit).count();
    let mut seen = 0;
    phone
        .chars()
        .map(|c| {
            if c.is_ascii_digit() {
                seen += 1;
                if seen + 3 <= digits { '*' } else { c }
            } else {
                c
            }
        })
        .collect()
}

/// An item whose description is rendered through redaction
pub trait Redactable {
    fn owner(&self) -> UserId;
    fn category(&self) -> Category;
    fn description(&self) -> &str;
}

impl Redactable for LostItem {
    fn owner(&self) -> UserId {
        self.owner_id
    }

    fn category(&self) -> Category {
        self.category
    }

    fn description(&self) -> &str {
        &self.description
    }
}

impl Redactable for FoundItem {
    fn owner(&self) -> UserId {
        self.reporter_id
    }

    fn category(&self) -> Category {
        self.category
    }

    fn description(&self) -> &str {
        &self.description
    }
}

/// Redact one item for `viewer`; anonymous viewers are never owners
pub fn redact_for_viewer<T: Redactable>(item: &T, viewer: Option<UserId>, budget: usize) -> Redacted {
    let is_owner = viewer.is_some_and(|v| v == item.owner());
    redact(item.description(), item.category(), is_owner, budget)
}

/// Redact a list of items, deciding ownership per item
pub fn redact_batch<T: Redactable>(items: &[T], viewer: Option<UserId>, budget: usize) -> Vec<Redacted> {
    items
        .iter()
        .map(|item| redact_for_viewer(item, viewer, budget))
        .collect()
}
