use crate::{
    api::{
        error::{found, ApiError},
        handlers::{valid_email, valid_password},
    },
    session::{self, SessionHandle, SessionStore},
    users::{password, repo, repo::NewUser},
};
use axum::{
    extract::Extension,
    response::{Html, IntoResponse, Response},
    Form,
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

#[derive(Deserialize, Debug)]
pub struct SignupForm {
    #[serde(rename = "firstName")]
    first_name: String,
    #[serde(rename = "lastName", default)]
    last_name: String,
    email: String,
    password: String,
    #[serde(rename = "_csrf", default)]
    csrf: String,
}

// axum handler for GET /signup, issues the session the form's CSRF token
// belongs to
pub async fn signup_page(
    sessions: Extension<Arc<SessionStore>>,
    jar: CookieJar,
) -> impl IntoResponse {
    let (jar, session) = session::ensure(&sessions, jar).await;

    (jar, Html(render(&session.csrf_token)))
}

// axum handler for POST /signup
#[instrument(skip(pool, sessions, payload))]
pub async fn register(
    pool: Extension<SqlitePool>,
    sessions: Extension<Arc<SessionStore>>,
    handle: SessionHandle,
    payload: Option<Form<SignupForm>>,
) -> Result<Response, ApiError> {
    let form = match payload {
        Some(Form(payload)) => payload,
        None => return Err(ApiError::Validation("Missing payload".to_string())),
    };

    session::verify_csrf(&handle.session.csrf_token, &form.csrf)?;

    let email = form.email.trim().to_lowercase();
    debug!("signup attempt for {}", email);

    if !valid_email(&email) {
        return Err(ApiError::Validation("Invalid email".to_string()));
    }

    if !valid_password(&form.password) {
        return Err(ApiError::Validation(
            "Password must be at least 8 characters".to_string(),
        ));
    }

    let first_name = form.first_name.trim().to_string();
    if first_name.is_empty() {
        return Err(ApiError::Validation("First name is required".to_string()));
    }

    if repo::exists(&pool, &email).await? {
        error!("User already exists");
        return Err(ApiError::Conflict("User already exists"));
    }

    let password_hash = password::hash(&form.password)
        .map_err(|_| ApiError::Internal("Failed to hash password"))?;

    let user = repo::insert(
        &pool,
        NewUser {
            email,
            first_name,
            last_name: form.last_name.trim().to_string(),
            password_hash,
        },
    )
    .await?;

    sessions.login(handle.id, user.id).await;

    info!("new user registered");

    Ok(found("/todos"))
}

fn render(csrf_token: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head><title>Sign up</title></head>
<body>
<h1>Sign up</h1>
<form method="post" action="/signup">
<input type="hidden" name="_csrf" value="{csrf_token}"/>
<input type="text" name="firstName" placeholder="First name"/>
<input type="text" name="lastName" placeholder="Last name"/>
<input type="email" name="email" placeholder="Email"/>
<input type="password" name="password" placeholder="Password"/>
<button type="submit">Sign up</button>
</form>
<p><a href="/login">Log in</a></p>
</body>
</html>
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_embeds_csrf_token() {
        let page = render("token-123");

        assert!(page.contains(r#"name="_csrf" value="token-123""#));
        assert!(page.contains(r#"action="/signup""#));
    }
}
