use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::{StudentAnswer, StudentSubmission};
use crate::db::types::SubmissionState;
use crate::services::submission_lifecycle::{RegradeSummary, SubmissionView};

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct ChoiceAnswerSubmit {
    #[validate(length(min = 1, message = "question_id must not be empty"))]
    #[serde(alias = "questionId")]
    pub(crate) question_id: String,
    #[validate(length(min = 1, message = "at least one answer must be selected"))]
    #[serde(alias = "answerIds", alias = "selected_answer_ids")]
    pub(crate) answer_ids: Vec<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct TextAnswerSubmit {
    #[validate(length(min = 1, message = "question_id must not be empty"))]
    #[serde(alias = "questionId")]
    pub(crate) question_id: String,
    #[serde(alias = "answerText")]
    pub(crate) answer_text: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ManualGradeRequest {
    #[serde(alias = "isCorrect")]
    pub(crate) is_correct: bool,
}

#[derive(Debug, Deserialize, Default)]
pub(crate) struct MySubmissionsQuery {
    pub(crate) test_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct StudentAnswerResponse {
    pub(crate) id: String,
    pub(crate) submission_id: String,
    pub(crate) question_id: String,
    pub(crate) answer_text: String,
    pub(crate) is_correct: bool,
    pub(crate) score: i32,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl StudentAnswerResponse {
    pub(crate) fn from_db(answer: StudentAnswer) -> Self {
        Self {
            id: answer.id,
            submission_id: answer.submission_id,
            question_id: answer.question_id,
            answer_text: answer.answer_text,
            is_correct: answer.is_correct,
            score: answer.score,
            created_at: format_primitive(answer.created_at),
            updated_at: format_primitive(answer.updated_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct SubmissionResponse {
    pub(crate) id: String,
    pub(crate) student_id: String,
    pub(crate) test_id: String,
    pub(crate) state: SubmissionState,
    pub(crate) start_time: String,
    pub(crate) end_time: Option<String>,
    pub(crate) score: i32,
    pub(crate) reviewed: bool,
}

impl SubmissionResponse {
    pub(crate) fn from_db(submission: StudentSubmission) -> Self {
        Self {
            state: submission.state(),
            id: submission.id,
            student_id: submission.student_id,
            test_id: submission.test_id,
            start_time: format_primitive(submission.start_time),
            end_time: submission.end_time.map(format_primitive),
            score: submission.score,
            reviewed: submission.reviewed,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct SubmissionDetailResponse {
    #[serde(flatten)]
    pub(crate) submission: SubmissionResponse,
    pub(crate) course_id: String,
    pub(crate) answers: Vec<StudentAnswerResponse>,
}

impl SubmissionDetailResponse {
    pub(crate) fn from_view(view: SubmissionView) -> Self {
        Self {
            submission: SubmissionResponse::from_db(view.submission),
            course_id: view.course_id,
            answers: view.answers.into_iter().map(StudentAnswerResponse::from_db).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ScoreResponse {
    pub(crate) submission_id: String,
    pub(crate) score: i32,
}

#[derive(Debug, Serialize)]
pub(crate) struct RegradeResponse {
    pub(crate) submission_id: String,
    pub(crate) regraded: usize,
    pub(crate) deferred: usize,
    pub(crate) score: i32,
}

impl RegradeResponse {
    pub(crate) fn from_summary(submission_id: String, summary: RegradeSummary) -> Self {
        Self {
            submission_id,
            regraded: summary.regraded,
            deferred: summary.deferred,
            score: summary.score,
        }
    }
}
