use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::{require_enrollment, require_test_owner, Caller, CurrentUser};
use crate::core::state::AppState;
use crate::schemas::question::{
    AnswerCreate, AnswerResponse, AnswerUpdate, MultipleChoiceAnswersCreate,
    PublicQuestionResponse, QuestionCreate, QuestionResponse, QuestionUpdate,
    SingleChoiceAnswersCreate,
};
use crate::services::question_bank::{self, NewQuestion, QuestionChanges, QuestionWithAnswers};

async fn owned_question(
    state: &AppState,
    caller: &Caller,
    question_id: &str,
) -> Result<QuestionWithAnswers, ApiError> {
    let view = question_bank::get_question(state.db(), question_id).await?;
    require_test_owner(state, caller, &view.question.test_id).await?;
    Ok(view)
}

pub(super) async fn create_question(
    Path(test_id): Path<String>,
    CurrentUser(caller): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<QuestionCreate>,
) -> Result<(StatusCode, Json<QuestionResponse>), ApiError> {
    require_test_owner(&state, &caller, &test_id).await?;
    payload.validate()?;

    let question = question_bank::create_question(
        state.db(),
        &test_id,
        NewQuestion {
            text: payload.text,
            question_type: payload.question_type,
            points: payload.points,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(QuestionResponse::from_db(question, Vec::new()))))
}

pub(super) async fn list_questions(
    Path(test_id): Path<String>,
    CurrentUser(caller): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<QuestionResponse>>, ApiError> {
    require_test_owner(&state, &caller, &test_id).await?;

    let questions = question_bank::list_questions(state.db(), &test_id).await?;
    Ok(Json(questions.into_iter().map(QuestionResponse::from_view).collect()))
}

pub(super) async fn list_public_questions(
    Path(test_id): Path<String>,
    CurrentUser(caller): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<PublicQuestionResponse>>, ApiError> {
    require_enrollment(&state, &caller, &test_id).await?;

    let questions = question_bank::list_questions(state.db(), &test_id).await?;
    Ok(Json(questions.into_iter().map(PublicQuestionResponse::from_view).collect()))
}

pub(super) async fn get_question(
    Path(question_id): Path<String>,
    CurrentUser(caller): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<QuestionResponse>, ApiError> {
    let view = owned_question(&state, &caller, &question_id).await?;
    Ok(Json(QuestionResponse::from_view(view)))
}

pub(super) async fn update_question(
    Path(question_id): Path<String>,
    CurrentUser(caller): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<QuestionUpdate>,
) -> Result<Json<QuestionResponse>, ApiError> {
    owned_question(&state, &caller, &question_id).await?;
    payload.validate()?;

    question_bank::update_question(
        state.db(),
        &question_id,
        QuestionChanges {
            text: payload.text,
            question_type: payload.question_type,
            points: payload.points,
        },
    )
    .await?;

    let view = question_bank::get_question(state.db(), &question_id).await?;
    Ok(Json(QuestionResponse::from_view(view)))
}

pub(super) async fn delete_question(
    Path(question_id): Path<String>,
    CurrentUser(caller): CurrentUser,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    owned_question(&state, &caller, &question_id).await?;
    question_bank::delete_question(state.db(), &question_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub(super) async fn list_answers(
    Path(question_id): Path<String>,
    CurrentUser(caller): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<AnswerResponse>>, ApiError> {
    owned_question(&state, &caller, &question_id).await?;

    let answers = question_bank::list_answers(state.db(), &question_id).await?;
    Ok(Json(answers.into_iter().map(AnswerResponse::from_db).collect()))
}

pub(super) async fn add_answer(
    Path(question_id): Path<String>,
    CurrentUser(caller): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<AnswerCreate>,
) -> Result<(StatusCode, Json<AnswerResponse>), ApiError> {
    owned_question(&state, &caller, &question_id).await?;
    payload.validate()?;

    let answer =
        question_bank::add_answer(state.db(), &question_id, &payload.text, payload.is_correct)
            .await?;

    Ok((StatusCode::CREATED, Json(AnswerResponse::from_db(answer))))
}

pub(super) async fn create_single_choice_answers(
    Path(question_id): Path<String>,
    CurrentUser(caller): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<SingleChoiceAnswersCreate>,
) -> Result<(StatusCode, Json<Vec<AnswerResponse>>), ApiError> {
    owned_question(&state, &caller, &question_id).await?;
    payload.validate()?;

    let answers = question_bank::create_single_choice_answers(
        state.db(),
        &question_id,
        &payload.correct,
        &payload.incorrect,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(answers.into_iter().map(AnswerResponse::from_db).collect())))
}

pub(super) async fn create_multiple_choice_answers(
    Path(question_id): Path<String>,
    CurrentUser(caller): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<MultipleChoiceAnswersCreate>,
) -> Result<(StatusCode, Json<Vec<AnswerResponse>>), ApiError> {
    owned_question(&state, &caller, &question_id).await?;
    payload.validate()?;

    let answers = question_bank::create_multiple_choice_answers(
        state.db(),
        &question_id,
        &payload.correct,
        &payload.incorrect,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(answers.into_iter().map(AnswerResponse::from_db).collect())))
}

pub(super) async fn update_answer(
    Path(answer_id): Path<String>,
    CurrentUser(caller): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<AnswerUpdate>,
) -> Result<Json<AnswerResponse>, ApiError> {
    let current = question_bank::get_answer(state.db(), &answer_id).await?;
    owned_question(&state, &caller, &current.question_id).await?;
    payload.validate()?;

    let text = payload.text.unwrap_or(current.text);
    let is_correct = payload.is_correct.unwrap_or(current.is_correct);
    let answer = question_bank::update_answer(state.db(), &answer_id, &text, is_correct).await?;

    Ok(Json(AnswerResponse::from_db(answer)))
}

pub(super) async fn delete_answer(
    Path(answer_id): Path<String>,
    CurrentUser(caller): CurrentUser,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    let current = question_bank::get_answer(state.db(), &answer_id).await?;
    owned_question(&state, &caller, &current.question_id).await?;

    question_bank::delete_answer(state.db(), &answer_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
