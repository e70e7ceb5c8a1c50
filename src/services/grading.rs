//! Per-type correctness rules. Everything here is pure; callers load the
//! question's answer set and persist the outcome.

use std::collections::BTreeSet;

use crate::db::models::Answer;
use crate::db::types::{QuestionType, ResponseFamily};
use crate::services::errors::{AssessmentError, AssessmentResult};

/// What a student sent for one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum StudentResponse {
    Choice(BTreeSet<String>),
    Text(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum GradeOutcome {
    Graded { is_correct: bool, score: i32 },
    /// Left for a human reviewer; stored correctness stays as it was.
    Deferred,
}

impl GradeOutcome {
    pub(crate) fn label(self) -> &'static str {
        match self {
            Self::Graded { is_correct: true, .. } => "correct",
            Self::Graded { is_correct: false, .. } => "incorrect",
            Self::Deferred => "deferred",
        }
    }

    pub(crate) fn is_correct(self) -> Option<bool> {
        match self {
            Self::Graded { is_correct, .. } => Some(is_correct),
            Self::Deferred => None,
        }
    }

    pub(crate) fn score(self) -> Option<i32> {
        match self {
            Self::Graded { score, .. } => Some(score),
            Self::Deferred => None,
        }
    }
}

impl StudentResponse {
    pub(crate) fn family(&self) -> ResponseFamily {
        match self {
            Self::Choice(_) => ResponseFamily::Choice,
            Self::Text(_) => ResponseFamily::Text,
        }
    }

    pub(crate) fn validate_for(&self, question_type: QuestionType) -> AssessmentResult<()> {
        if self.family() != question_type.family() {
            let expected = match question_type.family() {
                ResponseFamily::Choice => "selected answer ids",
                ResponseFamily::Text => "a text response",
            };
            return Err(AssessmentError::Validation(format!(
                "{} questions expect {expected}",
                question_type.as_str()
            )));
        }

        if let Self::Choice(selected) = self {
            if selected.is_empty() {
                return Err(AssessmentError::Validation(
                    "at least one answer must be selected".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Choice responses are stored as a sorted JSON array of answer ids.
    pub(crate) fn to_stored(&self) -> String {
        match self {
            Self::Choice(selected) => {
                let ids: Vec<&String> = selected.iter().collect();
                serde_json::to_string(&ids).unwrap_or_else(|_| "[]".to_string())
            }
            Self::Text(text) => text.clone(),
        }
    }

    /// Rebuilds a response from `answer_text`. Rows written before ids were
    /// JSON-encoded hold a comma separated list.
    pub(crate) fn from_stored(question_type: QuestionType, stored: &str) -> Self {
        match question_type.family() {
            ResponseFamily::Text => Self::Text(stored.to_string()),
            ResponseFamily::Choice => {
                let selected = serde_json::from_str::<Vec<String>>(stored)
                    .map(|ids| ids.into_iter().collect())
                    .unwrap_or_else(|_| {
                        stored
                            .split(',')
                            .map(str::trim)
                            .filter(|id| !id.is_empty())
                            .map(str::to_string)
                            .collect()
                    });
                Self::Choice(selected)
            }
        }
    }
}

/// Grades one response. `answers` must be in creation order.
pub(crate) fn grade(
    question_type: QuestionType,
    points: i32,
    answers: &[Answer],
    response: &StudentResponse,
) -> GradeOutcome {
    if !question_type.is_auto_graded() {
        return GradeOutcome::Deferred;
    }

    let is_correct = match (question_type, response) {
        (QuestionType::SingleChoice, StudentResponse::Choice(selected)) => {
            single_choice_correct(answers, selected)
        }
        (QuestionType::MultipleChoice, StudentResponse::Choice(selected)) => {
            multiple_choice_correct(answers, selected)
        }
        (QuestionType::TextInput, StudentResponse::Text(text)) => text_input_correct(answers, text),
        _ => false,
    };

    GradeOutcome::Graded { is_correct, score: if is_correct { points } else { 0 } }
}

fn single_choice_correct(answers: &[Answer], selected: &BTreeSet<String>) -> bool {
    let Some(correct) = answers.iter().find(|answer| answer.is_correct) else {
        return false;
    };

    selected.len() == 1 && selected.contains(&correct.id)
}

fn multiple_choice_correct(answers: &[Answer], selected: &BTreeSet<String>) -> bool {
    let correct: BTreeSet<&str> = answers
        .iter()
        .filter(|answer| answer.is_correct)
        .map(|answer| answer.id.as_str())
        .collect();
    let selected: BTreeSet<&str> = selected.iter().map(String::as_str).collect();

    correct == selected
}

fn text_input_correct(answers: &[Answer], response: &str) -> bool {
    let normalized = normalize_text(response);
    answers
        .iter()
        .filter(|answer| answer.is_correct)
        .any(|answer| normalize_text(&answer.text) == normalized)
}

fn normalize_text(value: &str) -> String {
    value.to_lowercase().trim().to_string()
}
