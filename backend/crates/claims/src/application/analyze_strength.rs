//! Analyze Strength Use Case

use crate::domain::services::strength::{StrengthReport, analyze_strength, templates_for_category};
use crate::domain::value_objects::{Category, QuestionAnswer, VerificationQuestions};
use crate::error::{ClaimsError, ClaimsResult};

/// Input DTO for analyze strength
#[derive(Debug, Clone)]
pub struct AnalyzeStrengthInput {
    pub questions: Vec<String>,
    pub answers: Vec<String>,
    pub category: Category,
    pub description: String,
}

/// Analyze Strength Use Case
///
/// Stateless: coaches a reporter before the report is stored.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnalyzeStrengthUseCase;

impl AnalyzeStrengthUseCase {
    pub fn new() -> Self {
        Self
    }

    pub fn execute(&self, input: AnalyzeStrengthInput) -> ClaimsResult<StrengthReport> {
        if input.questions.len() != VerificationQuestions::COUNT
            || input.answers.len() != VerificationQuestions::COUNT
        {
            return Err(ClaimsError::validation(format!(
                "expected {} questions and {} answers",
                VerificationQuestions::COUNT,
                VerificationQuestions::COUNT
            )));
        }

        let pairs: Vec<QuestionAnswer> = input
            .questions
            .into_iter()
            .zip(input.answers)
            .map(|(q, a)| QuestionAnswer::new(q, a))
            .collect();

        let report = analyze_strength(&pairs, input.category, &input.description);
        tracing::debug!(
            category = %input.category,
            overall_score = report.overall_score,
            "Analyzed question strength"
        );
        Ok(report)
    }

    pub fn templates(&self, category: &str) -> &'static [&'static str] {
        templates_for_category(category)
    }
}
