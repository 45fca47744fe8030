//! Route handlers and the shared validation helpers.

pub mod health;
pub mod todos;
pub mod user_login;
pub mod user_register;

use regex::Regex;

/// Lightweight email sanity check used before persisting data.
pub fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|re| re.is_match(email))
}

/// Passwords must carry at least 8 characters.
pub fn valid_password(password: &str) -> bool {
    password.chars().count() >= 8
}
