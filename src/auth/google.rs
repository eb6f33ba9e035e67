//! Google sign-in over the OAuth 2.0 authorization code flow.
//!
//! `GET /auth/google` without a code sends the browser to Google with a random
//! `state` that is also kept in a short-lived cookie. Google sends the browser
//! back to the same route with `code` and `state`; the two states must match
//! before the code is exchanged for the account's email.

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::config::GoogleConfig;

const SCOPES: &str = "https://www.googleapis.com/auth/userinfo.email openid";

#[derive(Debug, Error)]
pub enum OAuthError {
    #[error("Invalid OAuth URL '{0}'")]
    InvalidUrl(String),

    #[error("OAuth request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("OAuth provider answered {0}")]
    Rejected(u16),

    #[error("Google account has no email address")]
    MissingEmail,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct UserInfo {
    email: Option<String>,
}

#[derive(Clone)]
pub struct GoogleOAuth {
    http: reqwest::Client,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    auth_url: Url,
    token_url: Url,
    userinfo_url: Url,
}

impl GoogleOAuth {
    /// None when the provider is not configured
    pub fn from_config(config: &GoogleConfig, timeout: Duration) -> Result<Option<Self>, OAuthError> {
        if !config.is_configured() {
            return Ok(None);
        }
        let (Some(client_id), Some(client_secret), Some(api_base_url)) =
            (&config.client_id, &config.client_secret, &config.api_base_url)
        else {
            return Ok(None);
        };

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("search-console/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Some(Self {
            http,
            client_id: client_id.trim().to_string(),
            client_secret: client_secret.trim().to_string(),
            redirect_uri: format!("{}/auth/google", api_base_url.trim().trim_end_matches('/')),
            auth_url: parse_url(&config.auth_url)?,
            token_url: parse_url(&config.token_url)?,
            userinfo_url: parse_url(&config.userinfo_url)?,
        }))
    }

    /// Consent screen URL carrying `state`
    pub fn authorize_url(&self, state: &str) -> Url {
        let mut url = self.auth_url.clone();
        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", &self.redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", SCOPES)
            .append_pair("access_type", "offline")
            .append_pair("state", state);
        url
    }

    /// Trade the callback code for an access token, then read the account email
    pub async fn email_for_code(&self, code: &str) -> Result<String, OAuthError> {
        let response = self
            .http
            .post(self.token_url.clone())
            .form(&[
                ("code", code),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(OAuthError::Rejected(response.status().as_u16()));
        }
        let token: TokenResponse = response.json().await?;

        let response = self
            .http
            .get(self.userinfo_url.clone())
            .bearer_auth(&token.access_token)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(OAuthError::Rejected(response.status().as_u16()));
        }
        let info: UserInfo = response.json().await?;

        info.email
            .map(|email| email.trim().to_string())
            .filter(|email| !email.is_empty())
            .ok_or(OAuthError::MissingEmail)
    }
}

fn parse_url(raw: &str) -> Result<Url, OAuthError> {
    Url::parse(raw).map_err(|_| OAuthError::InvalidUrl(raw.to_string()))
}
