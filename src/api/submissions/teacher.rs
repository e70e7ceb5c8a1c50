use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;

use crate::api::errors::ApiError;
use crate::api::guards::{
    require_course_teacher, require_submission_teacher, require_test_owner, Caller, CurrentUser,
};
use crate::api::pagination::{ListParams, PaginatedResponse};
use crate::core::state::AppState;
use crate::repositories;
use crate::schemas::submission::{
    ManualGradeRequest, RegradeResponse, ScoreResponse, StudentAnswerResponse, SubmissionResponse,
};
use crate::services::errors::AssessmentError;
use crate::services::{score_aggregator, submission_lifecycle};

async fn authorize_teacher(
    state: &AppState,
    caller: &Caller,
    submission_id: &str,
) -> Result<(), ApiError> {
    let context = submission_lifecycle::submission_context(state.db(), submission_id).await?;
    require_submission_teacher(caller, &context)
}

pub(super) async fn list_test_submissions(
    Path(test_id): Path<String>,
    CurrentUser(caller): CurrentUser,
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<PaginatedResponse<SubmissionResponse>>, ApiError> {
    require_test_owner(&state, &caller, &test_id).await?;

    let (items, total_count) = submission_lifecycle::list_submissions_for_test(
        state.db(),
        &test_id,
        params.skip,
        params.limit,
    )
    .await?;

    Ok(Json(PaginatedResponse {
        items: items.into_iter().map(SubmissionResponse::from_db).collect(),
        total_count,
        skip: params.skip,
        limit: params.limit,
    }))
}

pub(super) async fn calculate_score(
    Path(submission_id): Path<String>,
    CurrentUser(caller): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<ScoreResponse>, ApiError> {
    authorize_teacher(&state, &caller, &submission_id).await?;

    let score = score_aggregator::calculate_submission_score(state.db(), &submission_id).await?;
    Ok(Json(ScoreResponse { submission_id, score }))
}

pub(super) async fn regrade_submission(
    Path(submission_id): Path<String>,
    CurrentUser(caller): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<RegradeResponse>, ApiError> {
    authorize_teacher(&state, &caller, &submission_id).await?;

    let summary = submission_lifecycle::regrade_submission(state.db(), &submission_id).await?;
    Ok(Json(RegradeResponse::from_summary(submission_id, summary)))
}

pub(super) async fn review_submission(
    Path(submission_id): Path<String>,
    CurrentUser(caller): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<SubmissionResponse>, ApiError> {
    authorize_teacher(&state, &caller, &submission_id).await?;

    let submission = submission_lifecycle::review_submission(state.db(), &submission_id).await?;
    Ok(Json(SubmissionResponse::from_db(submission)))
}

pub(super) async fn delete_submission(
    Path(submission_id): Path<String>,
    CurrentUser(caller): CurrentUser,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    authorize_teacher(&state, &caller, &submission_id).await?;

    submission_lifecycle::delete_submission(state.db(), &submission_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub(super) async fn grade_student_answer(
    Path(student_answer_id): Path<String>,
    CurrentUser(caller): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<ManualGradeRequest>,
) -> Result<Json<StudentAnswerResponse>, ApiError> {
    let answer_context =
        repositories::student_answers::find_context(state.db(), &student_answer_id)
            .await
            .map_err(AssessmentError::from)?
            .ok_or_else(|| ApiError::NotFound("Student answer not found".to_string()))?;
    require_course_teacher(&caller, &answer_context.teacher_id)?;

    let answer = submission_lifecycle::mark_answer_as_correct(
        state.db(),
        &student_answer_id,
        payload.is_correct,
    )
    .await?;

    Ok(Json(StudentAnswerResponse::from_db(answer)))
}
