use crate::{
    api::handlers::{health, todos, user_login, user_register},
    db,
    session::SessionStore,
};
use anyhow::Result;
use axum::{
    body::Body,
    extract::MatchedPath,
    http::{HeaderName, HeaderValue, Request},
    routing::{get, post, put},
    Extension, Router,
};
use sqlx::SqlitePool;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::PropagateRequestIdLayer, set_header::SetRequestHeaderLayer, trace::TraceLayer,
};
use tracing::{info, info_span, Span};
use ulid::Ulid;

pub mod error;
pub mod handlers;

/// Build the application router
#[must_use]
pub fn app(pool: SqlitePool, sessions: Arc<SessionStore>) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route(
            "/signup",
            get(user_register::signup_page).post(user_register::register),
        )
        .route("/login", get(user_login::login_page))
        .route("/session", post(user_login::login))
        .route("/signout", get(user_login::signout))
        .route("/todos", get(todos::list).post(todos::create))
        .route(
            "/todos/:id",
            put(todos::set_completed).delete(todos::delete),
        )
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(Extension(sessions))
                .layer(Extension(pool)),
        )
}

/// Start the server
/// # Errors
/// Return error if failed to start the server
pub async fn new(port: u16, dsn: &str) -> Result<()> {
    let pool = db::connect(dsn).await?;

    let sessions = Arc::new(SessionStore::new());

    let app = app(pool, sessions);

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}
