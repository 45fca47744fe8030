use anyhow::{Context, Result};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};
use std::{str::FromStr, time::Duration};

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY,
        email TEXT NOT NULL UNIQUE,
        first_name TEXT NOT NULL,
        last_name TEXT NOT NULL DEFAULT '',
        password_hash TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS todos (
        id TEXT PRIMARY KEY,
        owner_id TEXT NOT NULL REFERENCES users (id),
        title TEXT NOT NULL,
        due_date DATE NOT NULL,
        completed BOOLEAN NOT NULL DEFAULT 0
    )",
    "CREATE INDEX IF NOT EXISTS idx_todos_owner ON todos (owner_id)",
];

/// Connect to the database and apply the schema
/// # Errors
/// Return error if the DSN is invalid or the database is unreachable
pub async fn connect(dsn: &str) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(dsn)
        .with_context(|| format!("Invalid DSN: {dsn}"))?
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .min_connections(1)
        .max_connections(5)
        .max_lifetime(Duration::from_secs(60 * 2))
        .test_before_acquire(true)
        .connect_with(options)
        .await
        .context("Failed to connect to database")?;

    migrate(&pool).await?;

    Ok(pool)
}

/// Apply the schema, idempotent on an existing database
/// # Errors
/// Return error if a DDL statement fails
pub async fn migrate(pool: &SqlitePool) -> Result<()> {
    for statement in SCHEMA {
        sqlx::query(statement)
            .execute(pool)
            .await
            .context("Failed to apply schema")?;
    }

    Ok(())
}
