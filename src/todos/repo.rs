use super::Todo;
use chrono::NaiveDate;
use sqlx::SqlitePool;
use tracing::{info_span, Instrument};
use uuid::Uuid;

#[derive(Debug)]
pub struct NewTodo {
    pub owner_id: String,
    pub title: String,
    pub due_date: NaiveDate,
}

/// # Errors
/// Return error if the insert fails
pub async fn insert(pool: &SqlitePool, new_todo: NewTodo) -> Result<Todo, sqlx::Error> {
    let query = "INSERT INTO todos (id, owner_id, title, due_date, completed)
        VALUES (?, ?, ?, ?, 0)
        RETURNING id, owner_id, title, due_date, completed";

    let span = info_span!(
        "db.query",
        db.system = "sqlite",
        db.operation = "INSERT",
        db.statement = query
    );

    sqlx::query_as::<_, Todo>(query)
        .bind(Uuid::new_v4().to_string())
        .bind(&new_todo.owner_id)
        .bind(&new_todo.title)
        .bind(new_todo.due_date)
        .fetch_one(pool)
        .instrument(span)
        .await
}

/// # Errors
/// Return error if the query fails
pub async fn find_by_id(pool: &SqlitePool, id: &str) -> Result<Option<Todo>, sqlx::Error> {
    let query = "SELECT id, owner_id, title, due_date, completed FROM todos WHERE id = ?";

    let span = info_span!(
        "db.query",
        db.system = "sqlite",
        db.operation = "SELECT",
        db.statement = query
    );

    sqlx::query_as::<_, Todo>(query)
        .bind(id)
        .fetch_optional(pool)
        .instrument(span)
        .await
}

/// List a user's todos ordered by due date, insertion order within a day
/// # Errors
/// Return error if the query fails
pub async fn list_for_owner(pool: &SqlitePool, owner_id: &str) -> Result<Vec<Todo>, sqlx::Error> {
    let query = "SELECT id, owner_id, title, due_date, completed
        FROM todos WHERE owner_id = ?
        ORDER BY due_date ASC, rowid ASC";

    let span = info_span!(
        "db.query",
        db.system = "sqlite",
        db.operation = "SELECT",
        db.statement = query
    );

    sqlx::query_as::<_, Todo>(query)
        .bind(owner_id)
        .fetch_all(pool)
        .instrument(span)
        .await
}

/// Flip the completed flag, returns `None` when the row is gone
/// # Errors
/// Return error if the update fails
pub async fn set_completed(
    pool: &SqlitePool,
    id: &str,
    completed: bool,
) -> Result<Option<Todo>, sqlx::Error> {
    let query = "UPDATE todos SET completed = ? WHERE id = ?
        RETURNING id, owner_id, title, due_date, completed";

    let span = info_span!(
        "db.query",
        db.system = "sqlite",
        db.operation = "UPDATE",
        db.statement = query
    );

    sqlx::query_as::<_, Todo>(query)
        .bind(completed)
        .bind(id)
        .fetch_optional(pool)
        .instrument(span)
        .await
}

/// Delete a todo, returns false when the row was already gone
/// # Errors
/// Return error if the delete fails
pub async fn delete(pool: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
    let query = "DELETE FROM todos WHERE id = ?";

    let span = info_span!(
        "db.query",
        db.system = "sqlite",
        db.operation = "DELETE",
        db.statement = query
    );

    let result = sqlx::query(query)
        .bind(id)
        .execute(pool)
        .instrument(span)
        .await?;

    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{db, users, users::repo::NewUser};
    use sqlx::sqlite::SqlitePoolOptions;

    async fn pool_with_owner() -> (SqlitePool, String) {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        db::migrate(&pool).await.unwrap();

        let user = users::repo::insert(
            &pool,
            NewUser {
                email: "ana@example.com".to_string(),
                first_name: "Ana".to_string(),
                last_name: String::new(),
                password_hash: "hash".to_string(),
            },
        )
        .await
        .unwrap();

        (pool, user.id)
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, day).unwrap()
    }

    #[tokio::test]
    async fn test_insert_defaults_incomplete() {
        let (pool, owner) = pool_with_owner().await;

        let todo = insert(
            &pool,
            NewTodo {
                owner_id: owner.clone(),
                title: "buy milk".to_string(),
                due_date: date(10),
            },
        )
        .await
        .unwrap();

        assert_eq!(todo.owner_id, owner);
        assert_eq!(todo.title, "buy milk");
        assert_eq!(todo.due_date, date(10));
        assert!(!todo.completed);
    }

    #[tokio::test]
    async fn test_list_order() {
        let (pool, owner) = pool_with_owner().await;

        for (title, day) in [("later", 12), ("first-today", 10), ("second-today", 10)] {
            insert(
                &pool,
                NewTodo {
                    owner_id: owner.clone(),
                    title: title.to_string(),
                    due_date: date(day),
                },
            )
            .await
            .unwrap();
        }

        let todos = list_for_owner(&pool, &owner).await.unwrap();
        let titles: Vec<&str> = todos.iter().map(|todo| todo.title.as_str()).collect();
        assert_eq!(titles, vec!["first-today", "second-today", "later"]);
    }

    #[tokio::test]
    async fn test_set_completed_round_trip() {
        let (pool, owner) = pool_with_owner().await;

        let todo = insert(
            &pool,
            NewTodo {
                owner_id: owner,
                title: "buy milk".to_string(),
                due_date: date(10),
            },
        )
        .await
        .unwrap();

        let updated = set_completed(&pool, &todo.id, true).await.unwrap().unwrap();
        assert!(updated.completed);

        let reverted = set_completed(&pool, &todo.id, false)
            .await
            .unwrap()
            .unwrap();
        assert!(!reverted.completed);
    }

    #[tokio::test]
    async fn test_set_completed_on_deleted_row() {
        let (pool, owner) = pool_with_owner().await;

        let todo = insert(
            &pool,
            NewTodo {
                owner_id: owner,
                title: "buy milk".to_string(),
                due_date: date(10),
            },
        )
        .await
        .unwrap();

        assert!(delete(&pool, &todo.id).await.unwrap());
        assert!(set_completed(&pool, &todo.id, true).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_reports_missing_rows() {
        let (pool, owner) = pool_with_owner().await;

        let todo = insert(
            &pool,
            NewTodo {
                owner_id: owner,
                title: "buy milk".to_string(),
                due_date: date(10),
            },
        )
        .await
        .unwrap();

        assert!(delete(&pool, &todo.id).await.unwrap());
        assert!(!delete(&pool, &todo.id).await.unwrap());
        assert!(find_by_id(&pool, &todo.id).await.unwrap().is_none());
    }
}
