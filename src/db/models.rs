use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::PrimitiveDateTime;

use crate::db::types::{QuestionType, SubmissionState};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Question {
    pub(crate) id: String,
    pub(crate) test_id: String,
    pub(crate) text: String,
    pub(crate) question_type: QuestionType,
    pub(crate) points: i32,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Answer {
    pub(crate) id: String,
    pub(crate) question_id: String,
    pub(crate) text: String,
    pub(crate) is_correct: bool,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct StudentSubmission {
    pub(crate) id: String,
    pub(crate) student_id: String,
    pub(crate) test_id: String,
    pub(crate) start_time: PrimitiveDateTime,
    pub(crate) end_time: Option<PrimitiveDateTime>,
    pub(crate) score: i32,
    pub(crate) reviewed: bool,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

impl StudentSubmission {
    pub(crate) fn state(&self) -> SubmissionState {
        if self.end_time.is_some() {
            SubmissionState::Completed
        } else {
            SubmissionState::Open
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct StudentAnswer {
    pub(crate) id: String,
    pub(crate) submission_id: String,
    pub(crate) question_id: String,
    pub(crate) answer_text: String,
    pub(crate) is_correct: bool,
    pub(crate) score: i32,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}
