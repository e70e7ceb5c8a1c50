use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::Question;
use crate::db::types::QuestionType;

pub(crate) const COLUMNS: &str =
    "id, test_id, text, question_type, points, created_at, updated_at";

pub(crate) struct CreateQuestion<'a> {
    pub(crate) id: &'a str,
    pub(crate) test_id: &'a str,
    pub(crate) text: &'a str,
    pub(crate) question_type: QuestionType,
    pub(crate) points: i32,
    pub(crate) created_at: PrimitiveDateTime,
}

pub(crate) struct UpdateQuestion {
    pub(crate) text: Option<String>,
    pub(crate) question_type: Option<QuestionType>,
    pub(crate) points: Option<i32>,
    pub(crate) updated_at: PrimitiveDateTime,
}

pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    params: CreateQuestion<'_>,
) -> Result<Question, sqlx::Error> {
    sqlx::query_as::<_, Question>(&format!(
        "INSERT INTO questions (id, test_id, text, question_type, points, created_at, updated_at)
         VALUES ($1,$2,$3,$4,$5,$6,$6)
         RETURNING {COLUMNS}"
    ))
    .bind(params.id)
    .bind(params.test_id)
    .bind(params.text)
    .bind(params.question_type)
    .bind(params.points)
    .bind(params.created_at)
    .fetch_one(executor)
    .await
}

pub(crate) async fn find_by_id(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
) -> Result<Option<Question>, sqlx::Error> {
    sqlx::query_as::<_, Question>(&format!("SELECT {COLUMNS} FROM questions WHERE id = $1"))
        .bind(id)
        .fetch_optional(executor)
        .await
}

/// Row lock that serializes every answer-set mutation of one question.
pub(crate) async fn lock_by_id(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
) -> Result<Option<Question>, sqlx::Error> {
    sqlx::query_as::<_, Question>(&format!(
        "SELECT {COLUMNS} FROM questions WHERE id = $1 FOR UPDATE"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub(crate) async fn list_by_test(
    pool: &PgPool,
    test_id: &str,
) -> Result<Vec<Question>, sqlx::Error> {
    sqlx::query_as::<_, Question>(&format!(
        "SELECT {COLUMNS} FROM questions WHERE test_id = $1 ORDER BY created_at, id"
    ))
    .bind(test_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn list_by_ids(
    executor: impl sqlx::PgExecutor<'_>,
    ids: &[String],
) -> Result<Vec<Question>, sqlx::Error> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    sqlx::query_as::<_, Question>(&format!("SELECT {COLUMNS} FROM questions WHERE id = ANY($1)"))
        .bind(ids)
        .fetch_all(executor)
        .await
}

pub(crate) async fn update(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
    params: UpdateQuestion,
) -> Result<Question, sqlx::Error> {
    sqlx::query_as::<_, Question>(&format!(
        "UPDATE questions SET
            text = COALESCE($1, text),
            question_type = COALESCE($2, question_type),
            points = COALESCE($3, points),
            updated_at = $4
         WHERE id = $5
         RETURNING {COLUMNS}"
    ))
    .bind(params.text)
    .bind(params.question_type)
    .bind(params.points)
    .bind(params.updated_at)
    .bind(id)
    .fetch_one(executor)
    .await
}

pub(crate) async fn delete_by_id(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
    let deleted = sqlx::query("DELETE FROM questions WHERE id = $1").bind(id).execute(pool).await?;
    Ok(deleted.rows_affected() > 0)
}
