// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Config Server client.
//!
//! This module defines the error types that can occur when constructing a client,
//! fetching resources from a Config Server, or flattening property sources.
//! All errors use `thiserror` for proper error handling and conversion.

use thiserror::Error;

/// The main error type for Config Server client operations.
///
/// This enum represents all possible errors that can occur when constructing a
/// client, retrieving configurations or files, or decoding responses. It is
/// marked as `#[non_exhaustive]` to allow for future additions without breaking
/// backwards compatibility.
///
/// The only non-fatal variant is [`ConfigError::ResourceNotFound`]: it signals
/// that a single server responded with 404 and the next configured server
/// should be tried. Use [`ConfigError::is_not_found`] to match it.
///
/// # Examples
///
/// ```
/// use cloudconfig::domain::errors::ConfigError;
///
/// fn lookup() -> Result<String, ConfigError> {
///     Err(ConfigError::PropertySourceNotFound {
///         name: "application-foo.yml".to_string(),
///     })
/// }
/// ```
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// A single Config Server responded with 404 for the requested resource.
    ///
    /// This is the fallback trigger: the resolver skips to the next configured
    /// server instead of failing the whole operation.
    #[error("failed to find resource at {url}")]
    ResourceNotFound {
        /// The URL that was requested
        url: String,
    },

    /// Every configured Config Server responded with 404 for the configuration.
    #[error("failed to find configuration for application {application} with profiles [{profiles}]")]
    ConfigurationNotFound {
        /// The application name that was requested
        application: String,
        /// The comma-joined profiles that were requested
        profiles: String,
    },

    /// Every configured Config Server responded with 404 for the file.
    #[error("failed to find file {file} in any Config Server")]
    FileNotFound {
        /// The file name that was requested
        file: String,
    },

    /// A Config Server responded with a non-2xx, non-404 status code.
    ///
    /// This aborts the fallback loop immediately: an unexpected status means
    /// the server is broken or misconfigured, and masking it behind fallback
    /// would hide the failure.
    #[error("server at {url} responded with status code '{status}' and body '{body}'")]
    ServerError {
        /// The URL that was requested
        url: String,
        /// The HTTP status code the server responded with
        status: u16,
        /// The response body, truncated for diagnostics
        body: String,
    },

    /// A network or connection failure occurred while talking to a server.
    #[error("failed to retrieve from {url}")]
    TransportError {
        /// The URL that was requested
        url: String,
        /// The underlying transport error
        #[source]
        source: reqwest::Error,
    },

    /// A response body or flattened tree could not be decoded.
    #[error("failed to decode {context}")]
    DecodeError {
        /// What was being decoded, e.g. `response from <url>`
        context: String,
        /// The underlying parse error
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A configured base URL could not be parsed.
    #[error("invalid Config Server URL '{url}'")]
    InvalidUrl {
        /// The URL that failed to parse
        url: String,
        /// The underlying parse error, if any
        #[source]
        source: Option<url::ParseError>,
    },

    /// Credential discovery from the environment failed.
    #[error("credentials not found: {reason}")]
    CredentialsNotFound {
        /// Why the credentials could not be found
        reason: String,
    },

    /// The client was configured in an unusable way, e.g. with zero servers.
    #[error("invalid client configuration: {message}")]
    InvalidConfiguration {
        /// What was wrong with the configuration
        message: String,
    },

    /// No property source in the response matched the requested file name.
    #[error("property source {name} does not exist")]
    PropertySourceNotFound {
        /// The file name suffix that was searched for
        name: String,
    },

    /// A property key uses a path shape the flattening engine does not support.
    #[error("unsupported property key '{key}'")]
    UnsupportedKey {
        /// The offending key path
        key: String,
    },
}

impl ConfigError {
    /// Returns `true` if this error is the non-fatal "single server responded
    /// with 404" case that drives multi-server fallback.
    ///
    /// # Examples
    ///
    /// ```
    /// use cloudconfig::domain::errors::ConfigError;
    ///
    /// let err = ConfigError::ResourceNotFound {
    ///     url: "http://localhost:8888/app/dev".to_string(),
    /// };
    /// assert!(err.is_not_found());
    /// ```
    pub fn is_not_found(&self) -> bool {
        matches!(self, ConfigError::ResourceNotFound { .. })
    }
}

/// A specialized Result type for Config Server client operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
