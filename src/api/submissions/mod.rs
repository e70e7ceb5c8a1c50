mod student;
mod teacher;

use axum::{routing::get, routing::post, Router};

use crate::core::state::AppState;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/tests/:test_id/submissions",
            post(student::create_submission).get(teacher::list_test_submissions),
        )
        .route("/submissions/my", get(student::list_my_submissions))
        .route(
            "/submissions/:submission_id",
            get(student::get_submission).delete(teacher::delete_submission),
        )
        .route("/submissions/:submission_id/answers/choice", post(student::submit_choice_answer))
        .route("/submissions/:submission_id/answers/text", post(student::submit_text_answer))
        .route("/submissions/:submission_id/complete", post(student::complete_submission))
        .route("/submissions/:submission_id/score", post(teacher::calculate_score))
        .route("/submissions/:submission_id/regrade", post(teacher::regrade_submission))
        .route("/submissions/:submission_id/review", post(teacher::review_submission))
        .route("/student-answers/:student_answer_id/grade", post(teacher::grade_student_answer))
}
