use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::{Answer, Question};
use crate::db::types::QuestionType;
use crate::services::question_bank::QuestionWithAnswers;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct QuestionCreate {
    #[validate(length(min = 1, message = "text must not be empty"))]
    pub(crate) text: String,
    #[serde(alias = "questionType")]
    pub(crate) question_type: QuestionType,
    /// Missing or non-positive values fall back to one point.
    #[serde(default)]
    pub(crate) points: Option<i32>,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct QuestionUpdate {
    #[validate(length(min = 1, message = "text must not be empty"))]
    pub(crate) text: Option<String>,
    #[serde(default)]
    #[serde(alias = "questionType")]
    pub(crate) question_type: Option<QuestionType>,
    #[serde(default)]
    pub(crate) points: Option<i32>,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct AnswerCreate {
    #[validate(length(min = 1, message = "text must not be empty"))]
    pub(crate) text: String,
    #[serde(default)]
    #[serde(alias = "isCorrect")]
    pub(crate) is_correct: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct AnswerUpdate {
    #[validate(length(min = 1, message = "text must not be empty"))]
    pub(crate) text: Option<String>,
    #[serde(default)]
    #[serde(alias = "isCorrect")]
    pub(crate) is_correct: Option<bool>,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct SingleChoiceAnswersCreate {
    #[validate(length(min = 1, message = "correct answer must not be empty"))]
    pub(crate) correct: String,
    #[serde(default)]
    pub(crate) incorrect: Vec<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct MultipleChoiceAnswersCreate {
    #[validate(length(min = 1, message = "at least one correct answer is required"))]
    pub(crate) correct: Vec<String>,
    #[serde(default)]
    pub(crate) incorrect: Vec<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct AnswerResponse {
    pub(crate) id: String,
    pub(crate) question_id: String,
    pub(crate) text: String,
    pub(crate) is_correct: bool,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl AnswerResponse {
    pub(crate) fn from_db(answer: Answer) -> Self {
        Self {
            id: answer.id,
            question_id: answer.question_id,
            text: answer.text,
            is_correct: answer.is_correct,
            created_at: format_primitive(answer.created_at),
            updated_at: format_primitive(answer.updated_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct QuestionResponse {
    pub(crate) id: String,
    pub(crate) test_id: String,
    pub(crate) text: String,
    pub(crate) question_type: QuestionType,
    pub(crate) points: i32,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
    pub(crate) answers: Vec<AnswerResponse>,
}

impl QuestionResponse {
    pub(crate) fn from_db(question: Question, answers: Vec<Answer>) -> Self {
        Self {
            id: question.id,
            test_id: question.test_id,
            text: question.text,
            question_type: question.question_type,
            points: question.points,
            created_at: format_primitive(question.created_at),
            updated_at: format_primitive(question.updated_at),
            answers: answers.into_iter().map(AnswerResponse::from_db).collect(),
        }
    }

    pub(crate) fn from_view(view: QuestionWithAnswers) -> Self {
        Self::from_db(view.question, view.answers)
    }
}

/// Answer option as a student sees it: no correctness flag.
#[derive(Debug, Serialize)]
pub(crate) struct PublicAnswerResponse {
    pub(crate) id: String,
    pub(crate) text: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct PublicQuestionResponse {
    pub(crate) id: String,
    pub(crate) test_id: String,
    pub(crate) text: String,
    pub(crate) question_type: QuestionType,
    pub(crate) points: i32,
    pub(crate) answers: Vec<PublicAnswerResponse>,
}

impl PublicQuestionResponse {
    pub(crate) fn from_view(view: QuestionWithAnswers) -> Self {
        let QuestionWithAnswers { question, answers } = view;
        Self {
            id: question.id,
            test_id: question.test_id,
            text: question.text,
            question_type: question.question_type,
            points: question.points,
            answers: answers
                .into_iter()
                .map(|answer| PublicAnswerResponse { id: answer.id, text: answer.text })
                .collect(),
        }
    }
}
