//! OAuth 2.0 authorization-code flow against the address-book provider.
//!
//! `authorization_url` → user consents → provider redirects with `code` →
//! [`OAuthClient::exchange_code`] yields a refresh token, which is kept in the
//! token store. Each sync run trades it for a short-lived access token with
//! [`OAuthClient::refresh_access_token`].

use serde::Deserialize;

use crate::client::http_agent;
use crate::config::{Config, GoogleConfig};
use crate::error::{decode_err, http_err, SyncError};

pub const CONTACTS_SCOPE: &str = "https://www.googleapis.com/auth/contacts";

/// Consent URL requesting offline access to contacts.
pub fn authorization_url(config: &Config) -> String {
    let params = [
        ("client_id", config.google.client_id.as_str()),
        ("redirect_uri", config.google.redirect_url.as_str()),
        ("response_type", "code"),
        ("scope", CONTACTS_SCOPE),
        ("access_type", "offline"),
        ("prompt", "consent"),
    ];
    let query = params
        .iter()
        .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");
    format!("{}?{query}", config.endpoints.oauth_authorize)
}

/// Token endpoint response.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub id_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

pub struct OAuthClient {
    agent: ureq::Agent,
    google: GoogleConfig,
    token_endpoint: String,
}

impl OAuthClient {
    pub fn new(config: &Config) -> Self {
        Self {
            agent: http_agent(),
            google: config.google.clone(),
            token_endpoint: config.endpoints.oauth_token.clone(),
        }
    }

    /// Trade an authorization code for tokens. The response must carry a
    /// refresh token, otherwise later runs could not authenticate.
    pub fn exchange_code(&self, code: &str) -> Result<TokenResponse, SyncError> {
        let tokens = self.post_form(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.google.redirect_url.as_str()),
        ])?;
        if tokens.refresh_token.is_none() {
            return Err(SyncError::OAuth(
                "token response has no refresh_token; revoke access and consent again".into(),
            ));
        }
        Ok(tokens)
    }

    /// Trade a stored refresh token for a fresh access token.
    pub fn refresh_access_token(&self, refresh_token: &str) -> Result<String, SyncError> {
        let tokens = self.post_form(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ])?;
        tracing::debug!("refreshed access token (expires in {:?}s)", tokens.expires_in);
        Ok(tokens.access_token)
    }

    fn post_form(&self, fields: &[(&str, &str)]) -> Result<TokenResponse, SyncError> {
        let mut form = vec![
            ("client_id", self.google.client_id.as_str()),
            ("client_secret", self.google.client_secret.as_str()),
        ];
        form.extend_from_slice(fields);

        let endpoint = self.token_endpoint.as_str();
        self.agent
            .post(endpoint)
            .send_form(&form)
            .map_err(|e| http_err(endpoint, e))?
            .into_json()
            .map_err(|e| decode_err(endpoint, e))
    }
}
