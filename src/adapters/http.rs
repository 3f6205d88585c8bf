// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP transport adapter.
//!
//! This module provides [`HttpFetcher`], the [`ResourceFetcher`] implementation
//! backed by a blocking `reqwest` client, along with pure URL construction and
//! the supported authorization modes.

use crate::adapters::oauth2::ClientCredentialsTokenProvider;
use crate::domain::errors::{ConfigError, Result};
use crate::ports::fetcher::{RawResponse, ResourceFetcher};
use url::Url;

/// How requests to one Config Server are authorized.
pub enum AuthMode {
    /// No authorization header is attached.
    None,
    /// HTTP basic authentication.
    Basic {
        /// The basic-auth username.
        username: String,
        /// The basic-auth password.
        password: String,
    },
    /// OAuth2 client-credentials bearer tokens, refreshed as they expire.
    OAuth2(ClientCredentialsTokenProvider),
}

/// Builds the full request URL from a base URL, path segments, and query
/// parameters.
///
/// Pure and deterministic: segments are joined with single slashes (a trailing
/// slash on the base never doubles up, and an existing path prefix on the base
/// is preserved), and parameters are appended percent-encoded.
///
/// # Examples
///
/// ```
/// use cloudconfig::adapters::http::build_url;
///
/// let url = build_url("http://host:8080/", &["a", "b"], &[("k", "v")]).unwrap();
/// assert_eq!(url.as_str(), "http://host:8080/a/b?k=v");
/// ```
pub fn build_url(base: &str, paths: &[&str], params: &[(&str, &str)]) -> Result<Url> {
    let mut url = Url::parse(base).map_err(|e| ConfigError::InvalidUrl {
        url: base.to_string(),
        source: Some(e),
    })?;
    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|_| ConfigError::InvalidUrl {
                url: base.to_string(),
                source: None,
            })?;
        segments.pop_if_empty();
        for path in paths {
            segments.push(path);
        }
    }
    if !params.is_empty() {
        let mut query = url.query_pairs_mut();
        for (key, value) in params {
            query.append_pair(key, value);
        }
    }
    Ok(url)
}

/// A [`ResourceFetcher`] for one Config Server, backed by a pooled blocking
/// HTTP client.
///
/// The fetcher is immutable after construction; timeouts, pooling, and TLS
/// belong to the `reqwest` client it wraps. Cloning the client is cheap, so
/// one configured client is typically shared across all fetchers.
///
/// # Examples
///
/// ```
/// use cloudconfig::adapters::http::HttpFetcher;
///
/// let fetcher = HttpFetcher::new(
///     "http://localhost:8888",
///     reqwest::blocking::Client::new(),
/// ).unwrap();
/// ```
pub struct HttpFetcher {
    base_url: String,
    client: reqwest::blocking::Client,
    auth: AuthMode,
}

impl HttpFetcher {
    /// Creates an unauthenticated fetcher for `base_url`.
    ///
    /// The base URL is validated eagerly so a malformed server list fails at
    /// construction time rather than on the first request.
    pub fn new(base_url: impl Into<String>, client: reqwest::blocking::Client) -> Result<Self> {
        Self::with_auth(base_url, client, AuthMode::None)
    }

    /// Creates a fetcher for `base_url` with the given authorization mode.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Base URL of the Config Server
    /// * `client` - The blocking HTTP client to issue requests with
    /// * `auth` - How each request is authorized
    pub fn with_auth(
        base_url: impl Into<String>,
        client: reqwest::blocking::Client,
        auth: AuthMode,
    ) -> Result<Self> {
        let base_url = base_url.into();
        let parsed = Url::parse(&base_url).map_err(|e| ConfigError::InvalidUrl {
            url: base_url.clone(),
            source: Some(e),
        })?;
        if parsed.cannot_be_a_base() {
            return Err(ConfigError::InvalidUrl {
                url: base_url,
                source: None,
            });
        }
        Ok(Self {
            base_url,
            client,
            auth,
        })
    }
}

impl ResourceFetcher for HttpFetcher {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn fetch(&self, paths: &[&str], params: &[(&str, &str)]) -> Result<RawResponse> {
        let url = build_url(&self.base_url, paths, params)?;
        let mut request = self.client.get(url.clone());
        request = match &self.auth {
            AuthMode::None => request,
            AuthMode::Basic { username, password } => request.basic_auth(username, Some(password)),
            AuthMode::OAuth2(provider) => request.bearer_auth(provider.token()?),
        };
        tracing::debug!(url = %url, "requesting resource");
        let response = request.send().map_err(|e| ConfigError::TransportError {
            url: url.to_string(),
            source: e,
        })?;
        let status = response.status().as_u16();
        // drain the body here so the pooled connection is always released
        let body = response
            .bytes()
            .map_err(|e| ConfigError::TransportError {
                url: url.to_string(),
                source: e,
            })?
            .to_vec();
        tracing::debug!(url = %url, status, bytes = body.len(), "received response");
        Ok(RawResponse::new(url, status, body))
    }
}
