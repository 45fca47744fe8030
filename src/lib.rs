//! # Dafare (multi-user to-do list service)
//!
//! `dafare` is a small web service for personal to-do lists. Users sign up
//! with an email and password, authenticate through a cookie-backed session,
//! and manage todo items grouped by due date (overdue, due today, due later,
//! completed).
//!
//! ## Ownership model
//!
//! Every todo belongs to the user that created it; `owner_id` is set at
//! creation and never changes. Only the owner may complete or delete a todo.
//! A mutation attempt by any other authenticated user fails with `422` and
//! leaves the record untouched, while a delete of an id that no longer
//! exists reports `{"success": false}` — an idempotent no-op, not an error.
//!
//! ## Sessions and CSRF
//!
//! Sessions live in process, keyed by a random id carried in an `HttpOnly`
//! cookie. Pre-auth pages (`/signup`, `/login`) issue anonymous sessions so
//! their forms can carry a per-session CSRF token; login attaches the user
//! to the same session. Every state-changing request must echo the session
//! token in a `_csrf` field or it is rejected before any business logic.

pub mod api;
pub mod cli;
pub mod db;
pub mod session;
pub mod todos;
pub mod users;
