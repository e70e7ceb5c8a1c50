use sqlx::PgPool;

/// Where a test sits in the course tree, resolved in one read.
#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct TestOwnership {
    pub(crate) course_id: String,
    pub(crate) teacher_id: String,
}

pub(crate) async fn exists(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM tests WHERE id = $1)")
        .bind(id)
        .fetch_one(executor)
        .await
}

pub(crate) async fn find_ownership(
    pool: &PgPool,
    test_id: &str,
) -> Result<Option<TestOwnership>, sqlx::Error> {
    sqlx::query_as::<_, TestOwnership>(
        "SELECT c.id AS course_id,
                c.teacher_id
         FROM tests t
         JOIN lessons l ON l.id = t.lesson_id
         JOIN courses c ON c.id = l.course_id
         WHERE t.id = $1",
    )
    .bind(test_id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn max_points(pool: &PgPool, test_id: &str) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COALESCE(SUM(points), 0)::BIGINT FROM questions WHERE test_id = $1",
    )
    .bind(test_id)
    .fetch_one(pool)
    .await
}
