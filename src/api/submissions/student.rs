use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::{
    require_enrollment, require_submission_reader, require_submission_student, CurrentUser,
};
use crate::core::state::AppState;
use crate::schemas::submission::{
    ChoiceAnswerSubmit, MySubmissionsQuery, StudentAnswerResponse, SubmissionDetailResponse,
    SubmissionResponse, TextAnswerSubmit,
};
use crate::services::grading::StudentResponse;
use crate::services::submission_lifecycle;

pub(super) async fn create_submission(
    Path(test_id): Path<String>,
    CurrentUser(caller): CurrentUser,
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<SubmissionResponse>), ApiError> {
    require_enrollment(&state, &caller, &test_id).await?;

    let submission =
        submission_lifecycle::create_submission(state.db(), &caller.id, &test_id).await?;

    Ok((StatusCode::CREATED, Json(SubmissionResponse::from_db(submission))))
}

pub(super) async fn list_my_submissions(
    CurrentUser(caller): CurrentUser,
    State(state): State<AppState>,
    Query(params): Query<MySubmissionsQuery>,
) -> Result<Json<Vec<SubmissionResponse>>, ApiError> {
    let submissions = submission_lifecycle::list_submissions_for_student(
        state.db(),
        &caller.id,
        params.test_id.as_deref(),
    )
    .await?;

    Ok(Json(submissions.into_iter().map(SubmissionResponse::from_db).collect()))
}

pub(super) async fn get_submission(
    Path(submission_id): Path<String>,
    CurrentUser(caller): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<SubmissionDetailResponse>, ApiError> {
    let context = submission_lifecycle::submission_context(state.db(), &submission_id).await?;
    require_submission_reader(&caller, &context)?;

    let view = submission_lifecycle::get_submission(state.db(), &submission_id).await?;
    Ok(Json(SubmissionDetailResponse::from_view(view)))
}

pub(super) async fn submit_choice_answer(
    Path(submission_id): Path<String>,
    CurrentUser(caller): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<ChoiceAnswerSubmit>,
) -> Result<Json<StudentAnswerResponse>, ApiError> {
    let context = submission_lifecycle::submission_context(state.db(), &submission_id).await?;
    require_submission_student(&caller, &context)?;
    payload.validate()?;

    let response = StudentResponse::Choice(payload.answer_ids.into_iter().collect());
    let answer = submission_lifecycle::record_answer(
        state.db(),
        &submission_id,
        &payload.question_id,
        response,
    )
    .await?;

    Ok(Json(StudentAnswerResponse::from_db(answer)))
}

pub(super) async fn submit_text_answer(
    Path(submission_id): Path<String>,
    CurrentUser(caller): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<TextAnswerSubmit>,
) -> Result<Json<StudentAnswerResponse>, ApiError> {
    let context = submission_lifecycle::submission_context(state.db(), &submission_id).await?;
    require_submission_student(&caller, &context)?;
    payload.validate()?;

    let answer = submission_lifecycle::record_answer(
        state.db(),
        &submission_id,
        &payload.question_id,
        StudentResponse::Text(payload.answer_text),
    )
    .await?;

    Ok(Json(StudentAnswerResponse::from_db(answer)))
}

pub(super) async fn complete_submission(
    Path(submission_id): Path<String>,
    CurrentUser(caller): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<SubmissionResponse>, ApiError> {
    let context = submission_lifecycle::submission_context(state.db(), &submission_id).await?;
    require_submission_student(&caller, &context)?;

    let submission = submission_lifecycle::complete_submission(state.db(), &submission_id).await?;
    Ok(Json(SubmissionResponse::from_db(submission)))
}
