use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::Answer;

pub(crate) const COLUMNS: &str = "id, question_id, text, is_correct, created_at, updated_at";

pub(crate) struct CreateAnswer<'a> {
    pub(crate) id: &'a str,
    pub(crate) question_id: &'a str,
    pub(crate) text: &'a str,
    pub(crate) is_correct: bool,
    pub(crate) created_at: PrimitiveDateTime,
}

pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    params: CreateAnswer<'_>,
) -> Result<Answer, sqlx::Error> {
    sqlx::query_as::<_, Answer>(&format!(
        "INSERT INTO answers (id, question_id, text, is_correct, created_at, updated_at)
         VALUES ($1,$2,$3,$4,$5,$5)
         RETURNING {COLUMNS}"
    ))
    .bind(params.id)
    .bind(params.question_id)
    .bind(params.text)
    .bind(params.is_correct)
    .bind(params.created_at)
    .fetch_one(executor)
    .await
}

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Answer>, sqlx::Error> {
    sqlx::query_as::<_, Answer>(&format!("SELECT {COLUMNS} FROM answers WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Creation order is the tie-break grading relies on for "first correct answer".
pub(crate) async fn list_by_question(
    executor: impl sqlx::PgExecutor<'_>,
    question_id: &str,
) -> Result<Vec<Answer>, sqlx::Error> {
    sqlx::query_as::<_, Answer>(&format!(
        "SELECT {COLUMNS} FROM answers WHERE question_id = $1 ORDER BY created_at, id"
    ))
    .bind(question_id)
    .fetch_all(executor)
    .await
}

pub(crate) async fn list_by_questions(
    executor: impl sqlx::PgExecutor<'_>,
    question_ids: &[String],
) -> Result<Vec<Answer>, sqlx::Error> {
    if question_ids.is_empty() {
        return Ok(Vec::new());
    }

    sqlx::query_as::<_, Answer>(&format!(
        "SELECT {COLUMNS} FROM answers WHERE question_id = ANY($1) ORDER BY created_at, id"
    ))
    .bind(question_ids)
    .fetch_all(executor)
    .await
}

pub(crate) async fn count_correct(
    executor: impl sqlx::PgExecutor<'_>,
    question_id: &str,
    excluding_answer_id: Option<&str>,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*)
         FROM answers
         WHERE question_id = $1
           AND is_correct
           AND ($2::TEXT IS NULL OR id <> $2)",
    )
    .bind(question_id)
    .bind(excluding_answer_id)
    .fetch_one(executor)
    .await
}

pub(crate) async fn update(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
    text: &str,
    is_correct: bool,
    updated_at: PrimitiveDateTime,
) -> Result<Option<Answer>, sqlx::Error> {
    sqlx::query_as::<_, Answer>(&format!(
        "UPDATE answers SET text = $1, is_correct = $2, updated_at = $3
         WHERE id = $4
         RETURNING {COLUMNS}"
    ))
    .bind(text)
    .bind(is_correct)
    .bind(updated_at)
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub(crate) async fn delete_by_id(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
    let deleted = sqlx::query("DELETE FROM answers WHERE id = $1").bind(id).execute(pool).await?;
    Ok(deleted.rows_affected() > 0)
}
