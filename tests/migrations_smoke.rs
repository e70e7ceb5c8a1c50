use sqlx::Row;

fn database_url() -> String {
    dotenvy::dotenv().ok();

    if let Ok(url) = std::env::var("DATABASE_URL") {
        if !url.trim().is_empty() {
            return url;
        }
    }

    let server = std::env::var("POSTGRES_SERVER").unwrap_or_else(|_| "localhost".into());
    let port = std::env::var("POSTGRES_PORT").unwrap_or_else(|_| "5432".into());
    let user = std::env::var("POSTGRES_USER").unwrap_or_else(|_| "assessment".into());
    let password = std::env::var("POSTGRES_PASSWORD").unwrap_or_default();
    let db = std::env::var("POSTGRES_DB").unwrap_or_else(|_| "assessment_db".into());

    format!("postgresql://{user}:{password}@{server}:{port}/{db}")
}

#[tokio::test]
async fn migrations_apply_and_tables_exist() -> anyhow::Result<()> {
    let connected = sqlx::postgres::PgPoolOptions::new()
        .max_connections(1)
        .acquire_timeout(std::time::Duration::from_secs(3))
        .connect(&database_url())
        .await;
    let pool = match connected {
        Ok(pool) => pool,
        Err(err) => {
            eprintln!("skipping migrations smoke test: {err}");
            return Ok(());
        }
    };

    let migrations_dir =
        std::env::var("ASSESSMENT_MIGRATIONS_DIR").unwrap_or_else(|_| "migrations".to_string());
    let migrator = sqlx::migrate::Migrator::new(std::path::Path::new(&migrations_dir)).await?;
    migrator.run(&pool).await?;

    let tables = [
        "courses",
        "lessons",
        "tests",
        "course_enrollments",
        "questions",
        "answers",
        "student_submissions",
        "student_answers",
    ];

    for table in tables {
        let row = sqlx::query("SELECT to_regclass($1)::text").bind(table).fetch_one(&pool).await?;
        let regclass: Option<String> = row.try_get(0)?;
        assert!(regclass.is_some(), "expected table {table} to exist after migrations");
    }

    let question_types: Vec<String> =
        sqlx::query_scalar("SELECT unnest(enum_range(NULL::questiontype))::text")
            .fetch_all(&pool)
            .await?;
    assert_eq!(
        question_types,
        vec!["SINGLE_CHOICE", "MULTIPLE_CHOICE", "TEXT_INPUT", "ESSAY", "CODING"]
    );

    Ok(())
}
