//! Session tokens and the cookies that carry them.

pub mod google;

pub use google::{GoogleOAuth, OAuthError};

use axum::http::{header, HeaderMap};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Cookie holding the email the user last typed on the login form
pub const LOGIN_EMAIL_COOKIE: &str = "loginEmail";
const LOGIN_EMAIL_MAX_AGE_SECS: i64 = 60 * 60;

/// Pending Google sign-in state, checked on the callback
pub const OAUTH_STATE_COOKIE: &str = "oauthState";
const OAUTH_STATE_MAX_AGE_SECS: i64 = 10 * 60;

/// New opaque session token (256 random bits, hex)
pub fn generate_token() -> String {
    format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
}

/// Session ids are stored hashed so a database dump can't be replayed as cookies
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Value of cookie `name` across all Cookie headers
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, value)| *key == name && !value.is_empty())
        .map(|(_, value)| value.trim_matches('"').to_string())
}

#[derive(Debug, Clone)]
pub struct CookieSettings {
    pub name: String,
    pub max_age_secs: i64,
    pub secure: bool,
}

impl CookieSettings {
    pub fn from_config(config: &crate::config::SessionConfig) -> Self {
        Self {
            name: config.cookie_name.clone(),
            max_age_secs: config.max_age_days * 24 * 60 * 60,
            secure: config.secure_cookie,
        }
    }

    /// Set-Cookie value for a fresh session
    pub fn session_cookie(&self, token: &str) -> String {
        let mut cookie = format!(
            "{}={}; Path=/; Max-Age={}; HttpOnly; SameSite=Lax",
            self.name, token, self.max_age_secs
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }

    /// Set-Cookie value that removes the session cookie
    pub fn cleared_cookie(&self) -> String {
        let mut cookie = format!(
            "{}=; Path=/; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT; HttpOnly; SameSite=Lax",
            self.name
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }

    /// HttpOnly cookie holding the OAuth `state` until Google calls back.
    /// SameSite=Lax so it rides along on the top-level redirect.
    pub fn oauth_state_cookie(&self, state: &str) -> String {
        self.with_secure(format!(
            "{}={}; Path=/auth; Max-Age={}; HttpOnly; SameSite=Lax",
            OAUTH_STATE_COOKIE, state, OAUTH_STATE_MAX_AGE_SECS
        ))
    }

    pub fn cleared_oauth_state_cookie(&self) -> String {
        self.with_secure(format!(
            "{}=; Path=/auth; Max-Age=0; HttpOnly; SameSite=Lax",
            OAUTH_STATE_COOKIE
        ))
    }

    pub fn cleared_login_email_cookie(&self) -> String {
        format!("{}=; Path=/; Max-Age=0; SameSite=Lax", LOGIN_EMAIL_COOKIE)
    }

    fn with_secure(&self, mut cookie: String) -> String {
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }

    /// Script-readable cookie so the login form can prefill the email
    pub fn login_email_cookie(&self, email: &str) -> String {
        let encoded: String = url::form_urlencoded::byte_serialize(email.as_bytes()).collect();
        format!(
            "{}={}; Path=/; Max-Age={}; SameSite=Lax",
            LOGIN_EMAIL_COOKIE, encoded, LOGIN_EMAIL_MAX_AGE_SECS
        )
    }
}
