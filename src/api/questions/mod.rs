mod handlers;

use axum::{routing::get, routing::patch, routing::post, Router};

use crate::core::state::AppState;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/tests/:test_id/questions",
            post(handlers::create_question).get(handlers::list_questions),
        )
        .route("/tests/:test_id/questions/public", get(handlers::list_public_questions))
        .route(
            "/questions/:question_id",
            get(handlers::get_question)
                .patch(handlers::update_question)
                .delete(handlers::delete_question),
        )
        .route(
            "/questions/:question_id/answers",
            get(handlers::list_answers).post(handlers::add_answer),
        )
        .route(
            "/questions/:question_id/answers/single-choice",
            post(handlers::create_single_choice_answers),
        )
        .route(
            "/questions/:question_id/answers/multiple-choice",
            post(handlers::create_multiple_choice_answers),
        )
        .route(
            "/answers/:answer_id",
            patch(handlers::update_answer).delete(handlers::delete_answer),
        )
}
