use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::StudentSubmission;

pub(crate) const COLUMNS: &str = "\
    id, student_id, test_id, start_time, end_time, score, reviewed, created_at, updated_at";

/// Submission with the course-tree ids the API layer needs for access checks.
#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct SubmissionContext {
    pub(crate) student_id: String,
    pub(crate) course_id: String,
    pub(crate) teacher_id: String,
}

pub(crate) struct CreateSubmission<'a> {
    pub(crate) id: &'a str,
    pub(crate) student_id: &'a str,
    pub(crate) test_id: &'a str,
    pub(crate) start_time: PrimitiveDateTime,
}

pub(crate) async fn create(
    pool: &PgPool,
    params: CreateSubmission<'_>,
) -> Result<StudentSubmission, sqlx::Error> {
    sqlx::query_as::<_, StudentSubmission>(&format!(
        "INSERT INTO student_submissions (
            id, student_id, test_id, start_time, end_time, score, reviewed, created_at, updated_at
         ) VALUES ($1,$2,$3,$4,NULL,0,FALSE,$4,$4)
         RETURNING {COLUMNS}"
    ))
    .bind(params.id)
    .bind(params.student_id)
    .bind(params.test_id)
    .bind(params.start_time)
    .fetch_one(pool)
    .await
}

pub(crate) async fn find_by_id(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
) -> Result<Option<StudentSubmission>, sqlx::Error> {
    sqlx::query_as::<_, StudentSubmission>(&format!(
        "SELECT {COLUMNS} FROM student_submissions WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub(crate) async fn lock_by_id(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
) -> Result<Option<StudentSubmission>, sqlx::Error> {
    sqlx::query_as::<_, StudentSubmission>(&format!(
        "SELECT {COLUMNS} FROM student_submissions WHERE id = $1 FOR UPDATE"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub(crate) async fn find_context(
    pool: &PgPool,
    id: &str,
) -> Result<Option<SubmissionContext>, sqlx::Error> {
    sqlx::query_as::<_, SubmissionContext>(
        "SELECT s.student_id,
                c.id AS course_id,
                c.teacher_id
         FROM student_submissions s
         JOIN tests t ON t.id = s.test_id
         JOIN lessons l ON l.id = t.lesson_id
         JOIN courses c ON c.id = l.course_id
         WHERE s.id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn list_by_test(
    pool: &PgPool,
    test_id: &str,
    skip: i64,
    limit: i64,
) -> Result<Vec<StudentSubmission>, sqlx::Error> {
    sqlx::query_as::<_, StudentSubmission>(&format!(
        "SELECT {COLUMNS}
         FROM student_submissions
         WHERE test_id = $1
         ORDER BY start_time DESC, id
         OFFSET $2 LIMIT $3"
    ))
    .bind(test_id)
    .bind(skip.max(0))
    .bind(limit.clamp(1, 1000))
    .fetch_all(pool)
    .await
}

pub(crate) async fn count_by_test(pool: &PgPool, test_id: &str) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM student_submissions WHERE test_id = $1")
        .bind(test_id)
        .fetch_one(pool)
        .await
}

/// Full scan used by statistics; no pagination on purpose.
pub(crate) async fn list_all_by_test(
    pool: &PgPool,
    test_id: &str,
) -> Result<Vec<StudentSubmission>, sqlx::Error> {
    sqlx::query_as::<_, StudentSubmission>(&format!(
        "SELECT {COLUMNS} FROM student_submissions WHERE test_id = $1"
    ))
    .bind(test_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn list_by_student(
    pool: &PgPool,
    student_id: &str,
    test_id: Option<&str>,
) -> Result<Vec<StudentSubmission>, sqlx::Error> {
    sqlx::query_as::<_, StudentSubmission>(&format!(
        "SELECT {COLUMNS}
         FROM student_submissions
         WHERE student_id = $1
           AND ($2::TEXT IS NULL OR test_id = $2)
         ORDER BY start_time DESC, id"
    ))
    .bind(student_id)
    .bind(test_id)
    .fetch_all(pool)
    .await
}

/// Sets `end_time` only while the submission is open; a completed submission
/// keeps its original end time.
pub(crate) async fn complete(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
    now: PrimitiveDateTime,
) -> Result<Option<StudentSubmission>, sqlx::Error> {
    sqlx::query_as::<_, StudentSubmission>(&format!(
        "UPDATE student_submissions
         SET end_time = COALESCE(end_time, $1),
             updated_at = $1
         WHERE id = $2
         RETURNING {COLUMNS}"
    ))
    .bind(now)
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub(crate) async fn update_score(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
    score: i32,
    now: PrimitiveDateTime,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE student_submissions SET score = $1, updated_at = $2 WHERE id = $3")
        .bind(score)
        .bind(now)
        .bind(id)
        .execute(executor)
        .await?;
    Ok(())
}

pub(crate) async fn mark_reviewed(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
    now: PrimitiveDateTime,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE student_submissions SET reviewed = TRUE, updated_at = $1 WHERE id = $2")
        .bind(now)
        .bind(id)
        .execute(executor)
        .await?;
    Ok(())
}

pub(crate) async fn delete_by_id(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
    let deleted =
        sqlx::query("DELETE FROM student_submissions WHERE id = $1").bind(id).execute(pool).await?;
    Ok(deleted.rows_affected() > 0)
}
