//! Token handling and the refresh flow.
//!
//! Id tokens are short-lived JWTs sent raw in the `Authorization` header.
//! When one is missing or expired, the refresh token is exchanged for a new
//! one at a URL the server hands out from `/auth/refresh_url`.

use crate::client::{ensure_success, send_error};
use crate::error::{ClientError, Result};
use crate::types::{RefreshRequest, RefreshResponse};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, info, warn};

/// Id and refresh tokens for one user session
#[derive(Debug, Clone, Default)]
pub struct TokenStore {
    id_token: Option<String>,
    refresh_token: Option<String>,
}

impl TokenStore {
    /// Create a store from previously saved tokens
    pub fn new(id_token: Option<String>, refresh_token: Option<String>) -> Self {
        Self {
            id_token,
            refresh_token,
        }
    }

    /// Id token that has not expired at `now`
    ///
    /// An expired id token is dropped from the store.
    pub fn valid_id_token(&mut self, now: DateTime<Utc>) -> Option<String> {
        take_if_expired(&mut self.id_token, now);
        self.id_token.clone()
    }

    /// Refresh token that has not expired at `now`
    ///
    /// An expired refresh token is dropped from the store.
    pub fn valid_refresh_token(&mut self, now: DateTime<Utc>) -> Option<String> {
        take_if_expired(&mut self.refresh_token, now);
        self.refresh_token.clone()
    }

    /// Stored id token, expired or not
    pub fn id_token(&self) -> Option<&str> {
        self.id_token.as_deref()
    }

    /// Stored refresh token, expired or not
    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    /// Replace the id token
    pub fn set_id_token(&mut self, token: impl Into<String>) {
        self.id_token = Some(token.into());
    }

    /// Replace the refresh token
    pub fn set_refresh_token(&mut self, token: Option<String>) {
        self.refresh_token = token;
    }

    /// Forget the refresh token (rejected by the server)
    pub fn clear_refresh_token(&mut self) {
        self.refresh_token = None;
    }

    /// Forget both tokens
    pub fn clear(&mut self) {
        self.id_token = None;
        self.refresh_token = None;
    }

    /// Whether any token is present
    pub fn is_empty(&self) -> bool {
        self.id_token.is_none() && self.refresh_token.is_none()
    }
}

fn take_if_expired(slot: &mut Option<String>, now: DateTime<Utc>) {
    if slot.as_deref().is_some_and(|token| is_expired(token, now)) {
        *slot = None;
    }
}

#[derive(Debug, Deserialize)]
struct Claims {
    #[serde(default)]
    exp: Option<i64>,
}

/// Decode the claims segment of a JWT without verifying its signature
pub fn decode_claims(token: &str) -> Result<serde_json::Value> {
    let payload = token
        .split('.')
        .nth(1)
        .ok_or_else(|| ClientError::InvalidToken("missing claims segment".to_string()))?;

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| ClientError::InvalidToken(e.to_string()))?;

    serde_json::from_slice(&bytes).map_err(|e| ClientError::InvalidToken(e.to_string()))
}

/// Whether a token is expired at `now`
///
/// Tokens without an `exp` claim, and tokens that cannot be decoded, count
/// as expired.
pub fn is_expired(token: &str, now: DateTime<Utc>) -> bool {
    let exp = decode_claims(token)
        .ok()
        .and_then(|claims| serde_json::from_value::<Claims>(claims).ok())
        .and_then(|claims| claims.exp);

    match exp {
        Some(exp) => exp.saturating_mul(1000) < now.timestamp_millis(),
        None => true,
    }
}

/// Client for the refresh endpoints.
pub(crate) struct AuthClient<'a> {
    http: &'a Client,
    base_url: &'a str,
}

impl<'a> AuthClient<'a> {
    pub(crate) fn new(http: &'a Client, base_url: &'a str) -> Self {
        Self { http, base_url }
    }

    /// Ask the server where refresh tokens are exchanged.
    pub async fn refresh_url(&self) -> Result<String> {
        let url = format!("{}/auth/refresh_url", self.base_url);
        debug!(url = %url, "Fetching refresh URL");

        let response = self.http.get(&url).send().await.map_err(send_error)?;
        let text = ensure_success(response).await?.text().await?;
        let target = text.trim();

        if target.is_empty() {
            return Err(ClientError::TokenRefreshFailed(
                "server returned an empty refresh URL".to_string(),
            ));
        }

        if target.starts_with("http://") || target.starts_with("https://") {
            Ok(target.to_string())
        } else if target.starts_with('/') {
            Ok(format!("{}{}", self.base_url, target))
        } else {
            Ok(format!("{}/{}", self.base_url, target))
        }
    }

    /// Exchange a refresh token for a new id token.
    ///
    /// A 403 means the refresh token itself was rejected and maps to
    /// `AuthRequired`.
    pub async fn refresh_id_token(&self, refresh_token: &str) -> Result<String> {
        let url = self.refresh_url().await?;
        debug!(url = %url, "Refreshing id token");

        let response = self
            .http
            .post(&url)
            .json(&RefreshRequest { refresh_token })
            .send()
            .await
            .map_err(send_error)?;

        let status = response.status();

        if status == StatusCode::FORBIDDEN {
            warn!("Refresh token rejected");
            return Err(ClientError::AuthRequired);
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ClientError::TokenRefreshFailed(format!(
                "{} {}",
                status.as_u16(),
                error_text
            )));
        }

        let tokens: RefreshResponse = response.json().await.map_err(|e| {
            ClientError::ParseError(format!("Failed to parse refresh response: {}", e))
        })?;

        match tokens.id_token {
            Some(id_token) if !id_token.is_empty() => {
                info!("Id token refreshed");
                Ok(id_token)
            }
            _ => Err(ClientError::TokenRefreshFailed(
                "response has no id_token".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn token_with(claims: &str) -> String {
        format!(
            "{}.{}.signature",
            URL_SAFE_NO_PAD.encode(r#"{"alg":"RS256","typ":"JWT"}"#),
            URL_SAFE_NO_PAD.encode(claims)
        )
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn future_exp_is_valid() {
        let exp = now().timestamp() + 3600;
        let token = token_with(&format!(r#"{{"exp":{exp},"sub":"u1"}}"#));
        assert!(!is_expired(&token, now()));
    }

    #[test]
    fn past_or_missing_exp_is_expired() {
        let exp = now().timestamp() - 1;
        assert!(is_expired(&token_with(&format!(r#"{{"exp":{exp}}}"#)), now()));
        assert!(is_expired(&token_with(r#"{"sub":"u1"}"#), now()));
    }

    #[test]
    fn garbage_is_expired() {
        assert!(is_expired("not-a-jwt", now()));
        assert!(is_expired("a.%%%.c", now()));
        assert!(matches!(
            decode_claims("no-dots"),
            Err(ClientError::InvalidToken(_))
        ));
    }

    #[test]
    fn padded_payload_decodes() {
        let token = format!("h.{}=.s", URL_SAFE_NO_PAD.encode(r#"{"exp":1}"#));
        let claims = decode_claims(&token).unwrap();
        assert_eq!(claims["exp"], 1);
    }

    #[test]
    fn store_drops_expired_tokens() {
        let expired = token_with(r#"{"exp":1}"#);
        let fresh = token_with(&format!(r#"{{"exp":{}}}"#, now().timestamp() + 60));
        let mut store = TokenStore::new(Some(expired), Some(fresh.clone()));

        assert_eq!(store.valid_id_token(now()), None);
        assert!(store.id_token().is_none());
        assert_eq!(store.valid_refresh_token(now()), Some(fresh));

        store.clear_refresh_token();
        assert!(store.is_empty());
    }
}
