//! In-process sessions backing the cookie/CSRF flow.
//!
//! A session starts anonymous when a pre-auth page (`/signup`, `/login`) is
//! rendered, so the form it serves can embed the per-session CSRF token.
//! Login attaches the user id to that same session. The store is process
//! local, a restart signs everyone out.

use crate::api::error::ApiError;
use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use rand::Rng;
use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::RwLock;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "dafare_session";

/// Sessions older than this are gone, logged in or not. Anonymous sessions
/// piled up by cookie-less page loads are swept on every `create`, so the
/// map stays bounded by the traffic of one TTL window.
const SESSION_TTL: Duration = Duration::from_secs(60 * 60 * 24);

#[derive(Clone, Debug)]
pub struct Session {
    pub user_id: Option<String>,
    pub csrf_token: String,
    created_at: Instant,
}

#[derive(Debug)]
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, Session>>,
    ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::with_ttl(SESSION_TTL)
    }

    #[must_use]
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    fn expired(&self, session: &Session) -> bool {
        session.created_at.elapsed() > self.ttl
    }

    /// Create an anonymous session, sweeping out expired ones
    pub async fn create(&self) -> (Uuid, Session) {
        let id = Uuid::new_v4();
        let session = Session {
            user_id: None,
            csrf_token: csrf_token(),
            created_at: Instant::now(),
        };

        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, session| !self.expired(session));
        sessions.insert(id, session.clone());

        (id, session)
    }

    pub async fn get(&self, id: Uuid) -> Option<Session> {
        self.sessions
            .read()
            .await
            .get(&id)
            .filter(|session| !self.expired(session))
            .cloned()
    }

    /// Attach a user to an existing session, returns false if the session
    /// is unknown or expired
    pub async fn login(&self, id: Uuid, user_id: String) -> bool {
        match self.sessions.write().await.get_mut(&id) {
            Some(session) if session.created_at.elapsed() <= self.ttl => {
                session.user_id = Some(user_id);
                true
            }
            _ => false,
        }
    }

    pub async fn destroy(&self, id: Uuid) {
        self.sessions.write().await.remove(&id);
    }
}

fn csrf_token() -> String {
    let bytes = rand::thread_rng().gen::<[u8; 32]>();

    hex::encode(bytes)
}

/// Compare the token echoed by a form or JSON body against the session's
/// # Errors
/// Return `ApiError::InvalidCsrf` on empty or mismatched tokens
pub fn verify_csrf(expected: &str, provided: &str) -> Result<(), ApiError> {
    if provided.is_empty() || provided != expected {
        return Err(ApiError::InvalidCsrf);
    }

    Ok(())
}

#[must_use]
pub fn session_cookie(id: Uuid) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, id.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

#[must_use]
pub fn session_id_from(jar: &CookieJar) -> Option<Uuid> {
    jar.get(SESSION_COOKIE)
        .and_then(|cookie| Uuid::parse_str(cookie.value()).ok())
}

/// Reuse the session named by the cookie or start an anonymous one,
/// returning the jar to send back alongside the session
pub async fn ensure(store: &SessionStore, jar: CookieJar) -> (CookieJar, Session) {
    if let Some(id) = session_id_from(&jar) {
        if let Some(session) = store.get(id).await {
            return (jar, session);
        }
    }

    let (id, session) = store.create().await;

    (jar.add(session_cookie(id)), session)
}

/// Extractor for handlers that require an authenticated user. Requests
/// without a logged-in session are redirected to `/login`.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub session_id: Uuid,
    pub user_id: String,
    pub csrf_token: String,
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let store = parts
            .extensions
            .get::<Arc<SessionStore>>()
            .ok_or(ApiError::Internal("session store not configured"))?
            .clone();

        let jar = CookieJar::from_headers(&parts.headers);
        let session_id = session_id_from(&jar).ok_or(ApiError::Unauthenticated)?;
        let session = store
            .get(session_id)
            .await
            .ok_or(ApiError::Unauthenticated)?;
        let user_id = session.user_id.ok_or(ApiError::Unauthenticated)?;

        Ok(Self {
            session_id,
            user_id,
            csrf_token: session.csrf_token,
        })
    }
}

/// Extractor for pre-auth form posts: the session may be anonymous but it
/// must exist, otherwise no CSRF token was ever issued for this client.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    pub id: Uuid,
    pub session: Session,
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for SessionHandle
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let store = parts
            .extensions
            .get::<Arc<SessionStore>>()
            .ok_or(ApiError::Internal("session store not configured"))?
            .clone();

        let jar = CookieJar::from_headers(&parts.headers);
        let id = session_id_from(&jar).ok_or(ApiError::InvalidCsrf)?;
        let session = store.get(id).await.ok_or(ApiError::InvalidCsrf)?;

        Ok(Self { id, session })
    }
}
