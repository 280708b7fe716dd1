//! Session-cookie presence check.
//!
//! The core only consumes "is there a session" as a boolean; issuing,
//! validating, and expiring sessions is the auth collaborator's job. A
//! present cookie that the backend would reject simply yields a stale
//! snapshot, which the 403 re-sync path corrects.

use axum::http::HeaderMap;

pub const SESSION_COOKIE_NAME: &str = "turnstile_session";

#[derive(Clone, Debug)]
pub struct SessionCookie {
    pub session_id: String,
}

impl SessionCookie {
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let cookie_header = headers.get(axum::http::header::COOKIE)?.to_str().ok()?;

        for cookie in cookie_header.split(';') {
            let cookie = cookie.trim();
            if let Some(value) = cookie
                .strip_prefix(SESSION_COOKIE_NAME)
                .and_then(|s| s.strip_prefix('='))
            {
                return Some(Self {
                    session_id: value.to_string(),
                });
            }
        }
        None
    }
}

/// The `isAuthenticated` boolean the guards consume.
pub fn is_authenticated(headers: &HeaderMap) -> bool {
    SessionCookie::from_headers(headers).is_some()
}
