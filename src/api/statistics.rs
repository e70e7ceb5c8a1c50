use axum::extract::{Path, Query, State};
use axum::{routing::get, Json, Router};

use crate::api::errors::ApiError;
use crate::api::guards::{require_test_owner, CurrentUser};
use crate::core::state::AppState;
use crate::schemas::statistics::{
    QuestionStatisticsResponse, TestStatisticsQuery, TestStatisticsResponse,
};
use crate::services::{question_bank, statistics};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/tests/:test_id/statistics", get(test_statistics))
        .route("/questions/:question_id/statistics", get(question_statistics))
}

async fn test_statistics(
    Path(test_id): Path<String>,
    CurrentUser(caller): CurrentUser,
    State(state): State<AppState>,
    Query(query): Query<TestStatisticsQuery>,
) -> Result<Json<TestStatisticsResponse>, ApiError> {
    require_test_owner(&state, &caller, &test_id).await?;

    let threshold_percent = match query.threshold_percent {
        Some(value) if (0.0..=100.0).contains(&value) => value,
        Some(_) => {
            return Err(ApiError::BadRequest(
                "threshold_percent must be between 0 and 100".to_string(),
            ))
        }
        None => f64::from(state.settings().statistics().default_success_threshold_percent),
    };

    let stats = statistics::test_statistics(state.db(), &test_id, threshold_percent).await?;
    Ok(Json(TestStatisticsResponse::from_stats(stats)))
}

async fn question_statistics(
    Path(question_id): Path<String>,
    CurrentUser(caller): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<QuestionStatisticsResponse>, ApiError> {
    let view = question_bank::get_question(state.db(), &question_id).await?;
    require_test_owner(&state, &caller, &view.question.test_id).await?;

    let stats = statistics::question_statistics(state.db(), &question_id).await?;
    Ok(Json(QuestionStatisticsResponse::from_stats(stats)))
}
