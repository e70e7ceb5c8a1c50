use sqlx::{PgConnection, PgPool};

use crate::core::time::primitive_now_utc;
use crate::repositories;
use crate::repositories::student_answers::ScoredAnswerRow;
use crate::services::errors::{AssessmentError, AssessmentResult};

/// Sum of question points over correct answers. Unanswered questions have no
/// row and contribute nothing.
pub(crate) fn total_score(rows: &[ScoredAnswerRow]) -> i32 {
    let total: i64 =
        rows.iter().filter(|row| row.is_correct).map(|row| i64::from(row.points)).sum();
    total.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Recomputes and overwrites the stored score inside the caller's transaction.
pub(crate) async fn recalculate(
    conn: &mut PgConnection,
    submission_id: &str,
) -> AssessmentResult<i32> {
    repositories::submissions::lock_by_id(&mut *conn, submission_id)
        .await?
        .ok_or_else(|| AssessmentError::not_found("Submission"))?;

    let rows =
        repositories::student_answers::list_scored_by_submission(&mut *conn, submission_id).await?;
    let score = total_score(&rows);

    repositories::submissions::update_score(&mut *conn, submission_id, score, primitive_now_utc())
        .await?;

    tracing::debug!(
        submission_id,
        score,
        graded_answers = rows.len(),
        "submission score recalculated"
    );
    Ok(score)
}

pub(crate) async fn calculate_submission_score(
    pool: &PgPool,
    submission_id: &str,
) -> AssessmentResult<i32> {
    let mut tx = pool.begin().await?;
    let score = recalculate(&mut *tx, submission_id).await?;
    tx.commit().await?;
    Ok(score)
}
