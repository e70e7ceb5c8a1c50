use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::StudentAnswer;
use crate::db::types::QuestionType;

pub(crate) const COLUMNS: &str = "\
    id, submission_id, question_id, answer_text, is_correct, score, created_at, updated_at";

#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct StudentAnswerContext {
    pub(crate) submission_id: String,
    pub(crate) question_id: String,
    pub(crate) question_type: QuestionType,
    pub(crate) points: i32,
    pub(crate) teacher_id: String,
}

/// Correctness of one stored answer next to the points its question is worth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::FromRow)]
pub(crate) struct ScoredAnswerRow {
    pub(crate) is_correct: bool,
    pub(crate) points: i32,
}

/// `None` outcome fields keep whatever the row already holds, which is how
/// deferred (manually graded) questions survive a re-submitted response.
pub(crate) struct UpsertStudentAnswer<'a> {
    pub(crate) id: &'a str,
    pub(crate) submission_id: &'a str,
    pub(crate) question_id: &'a str,
    pub(crate) answer_text: &'a str,
    pub(crate) is_correct: Option<bool>,
    pub(crate) score: Option<i32>,
    pub(crate) now: PrimitiveDateTime,
}

pub(crate) async fn upsert(
    executor: impl sqlx::PgExecutor<'_>,
    params: UpsertStudentAnswer<'_>,
) -> Result<StudentAnswer, sqlx::Error> {
    sqlx::query_as::<_, StudentAnswer>(&format!(
        "INSERT INTO student_answers (
            id, submission_id, question_id, answer_text, is_correct, score, created_at, updated_at
         ) VALUES ($1,$2,$3,$4,COALESCE($5, FALSE),COALESCE($6, 0),$7,$7)
         ON CONFLICT (submission_id, question_id) DO UPDATE
         SET answer_text = EXCLUDED.answer_text,
             is_correct = COALESCE($5, student_answers.is_correct),
             score = COALESCE($6, student_answers.score),
             updated_at = EXCLUDED.updated_at
         RETURNING {COLUMNS}"
    ))
    .bind(params.id)
    .bind(params.submission_id)
    .bind(params.question_id)
    .bind(params.answer_text)
    .bind(params.is_correct)
    .bind(params.score)
    .bind(params.now)
    .fetch_one(executor)
    .await
}

pub(crate) async fn find_context(
    pool: &PgPool,
    id: &str,
) -> Result<Option<StudentAnswerContext>, sqlx::Error> {
    sqlx::query_as::<_, StudentAnswerContext>(
        "SELECT sa.submission_id,
                sa.question_id,
                q.question_type,
                q.points,
                c.teacher_id
         FROM student_answers sa
         JOIN questions q ON q.id = sa.question_id
         JOIN tests t ON t.id = q.test_id
         JOIN lessons l ON l.id = t.lesson_id
         JOIN courses c ON c.id = l.course_id
         WHERE sa.id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn list_by_submission(
    executor: impl sqlx::PgExecutor<'_>,
    submission_id: &str,
) -> Result<Vec<StudentAnswer>, sqlx::Error> {
    sqlx::query_as::<_, StudentAnswer>(&format!(
        "SELECT {COLUMNS} FROM student_answers WHERE submission_id = $1 ORDER BY created_at, id"
    ))
    .bind(submission_id)
    .fetch_all(executor)
    .await
}

pub(crate) async fn list_scored_by_submission(
    executor: impl sqlx::PgExecutor<'_>,
    submission_id: &str,
) -> Result<Vec<ScoredAnswerRow>, sqlx::Error> {
    sqlx::query_as::<_, ScoredAnswerRow>(
        "SELECT sa.is_correct, q.points
         FROM student_answers sa
         JOIN questions q ON q.id = sa.question_id
         WHERE sa.submission_id = $1",
    )
    .bind(submission_id)
    .fetch_all(executor)
    .await
}

pub(crate) async fn list_by_question(
    pool: &PgPool,
    question_id: &str,
) -> Result<Vec<StudentAnswer>, sqlx::Error> {
    sqlx::query_as::<_, StudentAnswer>(&format!(
        "SELECT {COLUMNS} FROM student_answers WHERE question_id = $1"
    ))
    .bind(question_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn set_outcome(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
    is_correct: bool,
    score: i32,
    now: PrimitiveDateTime,
) -> Result<Option<StudentAnswer>, sqlx::Error> {
    sqlx::query_as::<_, StudentAnswer>(&format!(
        "UPDATE student_answers SET is_correct = $1, score = $2, updated_at = $3
         WHERE id = $4
         RETURNING {COLUMNS}"
    ))
    .bind(is_correct)
    .bind(score)
    .bind(now)
    .bind(id)
    .fetch_optional(executor)
    .await
}

/// Brings stored scores in line with a new point value for the question.
pub(crate) async fn rescore_for_question(
    executor: impl sqlx::PgExecutor<'_>,
    question_id: &str,
    points: i32,
    now: PrimitiveDateTime,
) -> Result<u64, sqlx::Error> {
    let updated = sqlx::query(
        "UPDATE student_answers
         SET score = CASE WHEN is_correct THEN $1 ELSE 0 END,
             updated_at = $2
         WHERE question_id = $3
           AND score <> CASE WHEN is_correct THEN $1 ELSE 0 END",
    )
    .bind(points)
    .bind(now)
    .bind(question_id)
    .execute(executor)
    .await?;
    Ok(updated.rows_affected())
}
