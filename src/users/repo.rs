use super::User;
use sqlx::SqlitePool;
use tracing::{info_span, Instrument};
use uuid::Uuid;

#[derive(Debug)]
pub struct NewUser {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
}

/// # Errors
/// Return error if the query fails
pub async fn exists(pool: &SqlitePool, email: &str) -> Result<bool, sqlx::Error> {
    let query = "SELECT EXISTS (SELECT 1 FROM users WHERE email = ?)";

    let span = info_span!(
        "db.query",
        db.system = "sqlite",
        db.operation = "SELECT",
        db.statement = query
    );

    sqlx::query_scalar::<_, bool>(query)
        .bind(email)
        .fetch_one(pool)
        .instrument(span)
        .await
}

/// # Errors
/// Return error if the insert fails, unique email violations included
pub async fn insert(pool: &SqlitePool, new_user: NewUser) -> Result<User, sqlx::Error> {
    let query = "INSERT INTO users (id, email, first_name, last_name, password_hash)
        VALUES (?, ?, ?, ?, ?)
        RETURNING id, email, first_name, last_name, password_hash";

    let span = info_span!(
        "db.query",
        db.system = "sqlite",
        db.operation = "INSERT",
        db.statement = query
    );

    sqlx::query_as::<_, User>(query)
        .bind(Uuid::new_v4().to_string())
        .bind(&new_user.email)
        .bind(&new_user.first_name)
        .bind(&new_user.last_name)
        .bind(&new_user.password_hash)
        .fetch_one(pool)
        .instrument(span)
        .await
}

/// # Errors
/// Return error if the query fails
pub async fn find_by_email(pool: &SqlitePool, email: &str) -> Result<Option<User>, sqlx::Error> {
    let query = "SELECT id, email, first_name, last_name, password_hash
        FROM users WHERE email = ?";

    let span = info_span!(
        "db.query",
        db.system = "sqlite",
        db.operation = "SELECT",
        db.statement = query
    );

    sqlx::query_as::<_, User>(query)
        .bind(email)
        .fetch_optional(pool)
        .instrument(span)
        .await
}
