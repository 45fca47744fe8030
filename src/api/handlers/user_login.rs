use crate::{
    api::error::{found, ApiError},
    session::{self, CurrentUser, SessionHandle, SessionStore, SESSION_COOKIE},
    users::{password, repo},
};
use axum::{
    extract::Extension,
    response::{Html, IntoResponse, Response},
    Form,
};
use axum_extra::extract::{cookie::Cookie, CookieJar};
use serde::Deserialize;
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

#[derive(Deserialize, Debug)]
pub struct LoginForm {
    email: String,
    password: String,
    #[serde(rename = "_csrf", default)]
    csrf: String,
}

// axum handler for GET /login
pub async fn login_page(
    sessions: Extension<Arc<SessionStore>>,
    jar: CookieJar,
) -> impl IntoResponse {
    let (jar, session) = session::ensure(&sessions, jar).await;

    (jar, Html(render(&session.csrf_token)))
}

// axum handler for POST /session
#[instrument(skip(pool, sessions, payload))]
pub async fn login(
    pool: Extension<SqlitePool>,
    sessions: Extension<Arc<SessionStore>>,
    handle: SessionHandle,
    payload: Option<Form<LoginForm>>,
) -> Result<Response, ApiError> {
    let form = match payload {
        Some(Form(payload)) => payload,
        None => return Err(ApiError::Validation("Missing payload".to_string())),
    };

    session::verify_csrf(&handle.session.csrf_token, &form.csrf)?;

    let email = form.email.trim().to_lowercase();
    debug!("login attempt for {}", email);

    let Some(user) = repo::find_by_email(&pool, &email).await? else {
        warn!("login failed, unknown email");
        return Err(ApiError::BadCredentials);
    };

    if !password::verify(&form.password, &user.password_hash) {
        warn!("login failed, wrong password");
        return Err(ApiError::BadCredentials);
    }

    sessions.login(handle.id, user.id).await;

    info!("user logged in");

    Ok(found("/todos"))
}

// axum handler for GET /signout
pub async fn signout(
    sessions: Extension<Arc<SessionStore>>,
    current: CurrentUser,
    jar: CookieJar,
) -> impl IntoResponse {
    sessions.destroy(current.session_id).await;

    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));

    (jar, found("/login"))
}

fn render(csrf_token: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head><title>Log in</title></head>
<body>
<h1>Log in</h1>
<form method="post" action="/session">
<input type="hidden" name="_csrf" value="{csrf_token}"/>
<input type="email" name="email" placeholder="Email"/>
<input type="password" name="password" placeholder="Password"/>
<button type="submit">Log in</button>
</form>
<p><a href="/signup">Sign up</a></p>
</body>
</html>
"#
    )
}
