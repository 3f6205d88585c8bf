// SPDX-License-Identifier: MIT OR Apache-2.0

//! OAuth2 client-credentials token provider.
//!
//! This module obtains bearer tokens for Config Servers protected by an OAuth2
//! client-credentials grant. Tokens are fetched from the token endpoint on
//! demand, cached, and refreshed shortly before they expire. The Config Server
//! client never inspects tokens beyond attaching them as a header.

use crate::domain::credentials::Credential;
use crate::domain::errors::{ConfigError, Result};
use serde::Deserialize;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Tokens are refreshed this long before their reported expiry.
const EXPIRY_LEEWAY: Duration = Duration::from_secs(30);

/// The relevant fields of an RFC 6749 token response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

struct CachedToken {
    access_token: String,
    expires_at: Option<Instant>,
}

impl CachedToken {
    fn is_valid(&self) -> bool {
        // a token without a reported expiry is reused until a request rejects it
        self.expires_at
            .map_or(true, |expires_at| Instant::now() + EXPIRY_LEEWAY < expires_at)
    }
}

/// Provides bearer tokens via the OAuth2 client-credentials grant.
///
/// The provider POSTs `grant_type=client_credentials` to the token endpoint,
/// authenticating with the client id and secret as basic auth, and caches the
/// returned token until near expiry. It is safe to share across threads; a
/// single lock guards the cached token.
///
/// # Examples
///
/// ```rust,no_run
/// use cloudconfig::adapters::oauth2::ClientCredentialsTokenProvider;
///
/// let provider = ClientCredentialsTokenProvider::new(
///     "client-id",
///     "client-secret",
///     "https://uaa.example.com/oauth/token",
///     reqwest::blocking::Client::new(),
/// );
/// ```
pub struct ClientCredentialsTokenProvider {
    client_id: String,
    client_secret: String,
    access_token_uri: String,
    client: reqwest::blocking::Client,
    cached: Mutex<Option<CachedToken>>,
}

impl ClientCredentialsTokenProvider {
    /// Creates a provider from explicit OAuth2 parameters.
    ///
    /// # Arguments
    ///
    /// * `client_id` - OAuth2 client id
    /// * `client_secret` - OAuth2 client secret
    /// * `access_token_uri` - The token endpoint
    /// * `client` - The blocking HTTP client used for token requests
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        access_token_uri: impl Into<String>,
        client: reqwest::blocking::Client,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            access_token_uri: access_token_uri.into(),
            client,
            cached: Mutex::new(None),
        }
    }

    /// Creates a provider from a discovered bound-service credential.
    pub fn from_credential(credential: &Credential, client: reqwest::blocking::Client) -> Self {
        Self::new(
            credential.client_id.clone(),
            credential.client_secret.clone(),
            credential.access_token_uri.clone(),
            client,
        )
    }

    /// Returns a valid access token, fetching a fresh one if the cached token
    /// is absent or about to expire.
    pub fn token(&self) -> Result<String> {
        let mut cached = self.cached.lock().unwrap();
        if let Some(token) = cached.as_ref() {
            if token.is_valid() {
                return Ok(token.access_token.clone());
            }
        }
        let token = self.request_token()?;
        let access_token = token.access_token.clone();
        *cached = Some(token);
        Ok(access_token)
    }

    fn request_token(&self) -> Result<CachedToken> {
        tracing::debug!(token_uri = %self.access_token_uri, "requesting OAuth2 access token");
        let response = self
            .client
            .post(&self.access_token_uri)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .map_err(|e| ConfigError::TransportError {
                url: self.access_token_uri.clone(),
                source: e,
            })?;
        let status = response.status().as_u16();
        if !(200..300).contains(&status) {
            let mut body = response.text().unwrap_or_default();
            body.truncate(4096);
            return Err(ConfigError::ServerError {
                url: self.access_token_uri.clone(),
                status,
                body,
            });
        }
        let token: TokenResponse =
            response.json().map_err(|e| ConfigError::DecodeError {
                context: format!("token response from {}", self.access_token_uri),
                source: Box::new(e),
            })?;
        let expires_at = token
            .expires_in
            .map(|seconds| Instant::now() + Duration::from_secs(seconds));
        Ok(CachedToken {
            access_token: token.access_token,
            expires_at,
        })
    }
}
