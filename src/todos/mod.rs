pub mod group;
pub mod guard;
pub mod repo;

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Todo {
    pub id: String,
    #[serde(rename = "ownerId")]
    pub owner_id: String,
    pub title: String,
    #[serde(rename = "dueDate")]
    pub due_date: NaiveDate,
    pub completed: bool,
}
