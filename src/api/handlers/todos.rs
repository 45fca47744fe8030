use crate::{
    api::error::{found, ApiError},
    session::{self, CurrentUser},
    todos::{
        group::{self, TodoGroups},
        guard::{self, Access},
        repo,
        repo::NewTodo,
        Todo,
    },
};
use axum::{
    extract::{Extension, Path},
    http::{header, HeaderMap},
    response::{Html, IntoResponse, Json, Response},
    Form,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;
use tracing::{debug, info, instrument};

#[derive(Deserialize, Debug)]
pub struct CreateTodoForm {
    title: String,
    #[serde(rename = "dueDate")]
    due_date: String,
    #[serde(rename = "_csrf", default)]
    csrf: String,
}

#[derive(Deserialize, Debug)]
pub struct UpdateTodoPayload {
    completed: bool,
    #[serde(rename = "_csrf", default)]
    csrf: String,
}

#[derive(Deserialize, Debug)]
pub struct DeleteTodoPayload {
    #[serde(rename = "_csrf", default)]
    csrf: String,
}

// axum handler for GET /todos
#[instrument(skip(pool, current, headers))]
pub async fn list(
    pool: Extension<SqlitePool>,
    current: CurrentUser,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let todos = repo::list_for_owner(&pool, &current.user_id).await?;
    let groups = group::by_due_date(todos, today());

    let wants_json = headers
        .get(header::ACCEPT)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|accept| accept.contains("application/json"));

    if wants_json {
        return Ok(Json(groups).into_response());
    }

    Ok(Html(render(&groups, &current.csrf_token)).into_response())
}

// axum handler for POST /todos
#[instrument(skip(pool, current, payload))]
pub async fn create(
    pool: Extension<SqlitePool>,
    current: CurrentUser,
    payload: Option<Form<CreateTodoForm>>,
) -> Result<Response, ApiError> {
    let form = match payload {
        Some(Form(payload)) => payload,
        None => return Err(ApiError::Validation("Missing payload".to_string())),
    };

    session::verify_csrf(&current.csrf_token, &form.csrf)?;

    let title = form.title.trim().to_string();
    if title.is_empty() {
        return Err(ApiError::Validation("Title is required".to_string()));
    }

    let due_date = parse_due_date(&form.due_date)
        .ok_or_else(|| ApiError::Validation("Invalid due date".to_string()))?;

    let todo = repo::insert(
        &pool,
        NewTodo {
            owner_id: current.user_id,
            title,
            due_date,
        },
    )
    .await?;

    info!("todo created: {}", todo.id);

    Ok(found("/todos"))
}

// axum handler for PUT /todos/:id
#[instrument(skip(pool, current, payload))]
pub async fn set_completed(
    pool: Extension<SqlitePool>,
    current: CurrentUser,
    Path(id): Path<String>,
    payload: Option<Json<UpdateTodoPayload>>,
) -> Result<Json<Todo>, ApiError> {
    let update = match payload {
        Some(Json(payload)) => payload,
        None => return Err(ApiError::Validation("Missing payload".to_string())),
    };

    session::verify_csrf(&current.csrf_token, &update.csrf)?;

    let todo = repo::find_by_id(&pool, &id)
        .await?
        .ok_or(ApiError::NotFound)?;

    match guard::authorize(&current.user_id, &todo) {
        Access::Allow => {
            // the row can vanish between the lookup and the update
            let updated = repo::set_completed(&pool, &todo.id, update.completed)
                .await?
                .ok_or(ApiError::NotFound)?;

            debug!("todo {} completed={}", updated.id, updated.completed);

            Ok(Json(updated))
        }
        Access::Deny => Err(ApiError::NotOwner),
    }
}

// axum handler for DELETE /todos/:id, deleting an id that is already gone
// is not an error
#[instrument(skip(pool, current, payload))]
pub async fn delete(
    pool: Extension<SqlitePool>,
    current: CurrentUser,
    Path(id): Path<String>,
    payload: Option<Json<DeleteTodoPayload>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let body = match payload {
        Some(Json(payload)) => payload,
        None => return Err(ApiError::Validation("Missing payload".to_string())),
    };

    session::verify_csrf(&current.csrf_token, &body.csrf)?;

    let Some(todo) = repo::find_by_id(&pool, &id).await? else {
        return Ok(Json(json!({"success": false})));
    };

    match guard::authorize(&current.user_id, &todo) {
        Access::Allow => {
            let deleted = repo::delete(&pool, &todo.id).await?;

            info!("todo deleted: {}", todo.id);

            Ok(Json(json!({"success": deleted})))
        }
        Access::Deny => Err(ApiError::NotOwner),
    }
}

/// The grouping boundary is the UTC calendar day. Clients west of UTC see
/// the day roll over before their local midnight.
fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Accept a plain `YYYY-MM-DD` date or an RFC 3339 timestamp from the form
fn parse_due_date(input: &str) -> Option<NaiveDate> {
    let input = input.trim();

    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Some(date);
    }

    DateTime::parse_from_rfc3339(input)
        .ok()
        .map(|timestamp| timestamp.date_naive())
}

fn render(groups: &TodoGroups, csrf_token: &str) -> String {
    let sections = [
        ("Overdue", &groups.overduetodos),
        ("Due today", &groups.duetodaytodos),
        ("Due later", &groups.duelatertodos),
        ("Completed", &groups.completedtodos),
    ];

    let mut lists = String::new();
    for (heading, todos) in sections {
        lists.push_str(&format!("<h2>{heading}</h2>\n<ul>\n"));
        for todo in todos.iter() {
            lists.push_str(&format!(
                r#"<li data-id="{}">{} ({})</li>{}"#,
                todo.id,
                escape(&todo.title),
                todo.due_date,
                "\n"
            ));
        }
        lists.push_str("</ul>\n");
    }

    format!(
        r#"<!DOCTYPE html>
<html>
<head><title>Todos</title></head>
<body>
<h1>Todos</h1>
<form method="post" action="/todos">
<input type="hidden" name="_csrf" value="{csrf_token}"/>
<input type="text" name="title" placeholder="Title"/>
<input type="date" name="dueDate"/>
<button type="submit">Add</button>
</form>
{lists}<p><a href="/signout">Sign out</a></p>
</body>
</html>
"#
    )
}

fn escape(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
