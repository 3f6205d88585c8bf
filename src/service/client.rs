// SPDX-License-Identifier: MIT OR Apache-2.0

//! The Config Server client and its builder.
//!
//! This module provides [`ConfigClient`], which holds an ordered list of
//! resource fetchers (one per configured Config Server) and applies the
//! multi-server fallback policy: servers are tried strictly in order, a 404
//! moves on to the next server, any other failure aborts immediately, and
//! exhausting the list is an error of its own. Construction goes through
//! [`ConfigClientBuilder`], which validates every configured source eagerly.

use crate::adapters::environment;
use crate::adapters::http::{AuthMode, HttpFetcher};
use crate::adapters::oauth2::ClientCredentialsTokenProvider;
use crate::domain::credentials::Credential;
use crate::domain::errors::{ConfigError, Result};
use crate::domain::source::Source;
use crate::ports::fetcher::{RawResponse, ResourceFetcher, ResponseFormat};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Application name used for file retrieval paths.
const DEFAULT_APPLICATION_NAME: &str = "default";

/// Profile used for file retrieval paths.
const DEFAULT_APPLICATION_PROFILE: &str = "default";

/// Query parameter selecting the server's default label for file retrieval.
const USE_DEFAULT_LABEL: (&str, &str) = ("useDefaultLabel", "true");

/// A client for one or more Spring Cloud Config Servers.
///
/// The client owns an ordered, non-empty list of fetchers fixed at
/// construction time; the first listed server is the first tried. Calls are
/// synchronous and blocking, allocate fresh results per call, and share no
/// mutable state, so a `ConfigClient` can be used from multiple threads.
///
/// # Examples
///
/// ```rust,no_run
/// use cloudconfig::service::ConfigClient;
///
/// # fn main() -> cloudconfig::domain::Result<()> {
/// let client = ConfigClient::builder()
///     .with_local_urls(["http://localhost:8888"])
///     .build()?;
///
/// let source = client.get_configuration("my-app", &["dev"], None)?;
/// for profile in &source.profiles {
///     println!("active profile: {profile}");
/// }
/// # Ok(())
/// # }
/// ```
pub struct ConfigClient {
    fetchers: Vec<Box<dyn ResourceFetcher>>,
}

impl ConfigClient {
    /// Creates a builder for configuring a client.
    pub fn builder() -> ConfigClientBuilder {
        ConfigClientBuilder::new()
    }

    /// Creates a client directly from resource fetchers.
    ///
    /// The fetchers are tried in the order given. Fails with
    /// [`ConfigError::InvalidConfiguration`] when the list is empty; a client
    /// with no servers must be rejected at construction time, not at the
    /// first call.
    pub fn from_fetchers(fetchers: Vec<Box<dyn ResourceFetcher>>) -> Result<Self> {
        if fetchers.is_empty() {
            return Err(ConfigError::InvalidConfiguration {
                message: "at least one Config Server must be configured".to_string(),
            });
        }
        Ok(Self { fetchers })
    }

    /// Retrieves an application's configuration by name, active profiles, and
    /// optional label.
    ///
    /// The request path is `{application}/{profiles joined with commas}` with
    /// the label appended when given. Servers are tried in order; a server
    /// answering 404 is skipped, any other failure aborts, and exhausting all
    /// servers fails with [`ConfigError::ConfigurationNotFound`].
    ///
    /// # Arguments
    ///
    /// * `application` - The application name
    /// * `profiles` - The active profiles, e.g. `&["dev", "cloud"]`
    /// * `label` - Optional version-control label/branch to serve from
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use cloudconfig::service::ConfigClient;
    ///
    /// # fn main() -> cloudconfig::domain::Result<()> {
    /// let client = ConfigClient::builder()
    ///     .with_local_urls(["http://localhost:8888"])
    ///     .build()?;
    /// let source = client.get_configuration("my-app", &["dev"], Some("main"))?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn get_configuration(
        &self,
        application: &str,
        profiles: &[&str],
        label: Option<&str>,
    ) -> Result<Source> {
        let joined_profiles = profiles.join(",");
        let mut paths = vec![application, joined_profiles.as_str()];
        if let Some(label) = label {
            paths.push(label);
        }
        self.resolve_decoded(&paths, &[])?
            .ok_or_else(|| ConfigError::ConfigurationNotFound {
                application: application.to_string(),
                profiles: joined_profiles,
            })
    }

    /// Retrieves `file` from `directory` on the server's default branch and
    /// decodes it into `T`.
    ///
    /// The request carries `useDefaultLabel=true`; the decoder is chosen from
    /// the file's extension (YAML, XML, or JSON). Exhausting all servers fails
    /// with [`ConfigError::FileNotFound`].
    pub fn get_file<T>(&self, directory: &str, file: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let paths = [
            DEFAULT_APPLICATION_NAME,
            DEFAULT_APPLICATION_PROFILE,
            directory,
            file,
        ];
        self.resolve_decoded(&paths, &[USE_DEFAULT_LABEL])?
            .ok_or_else(|| ConfigError::FileNotFound {
                file: file.to_string(),
            })
    }

    /// Retrieves `file` from `directory` on the given branch and decodes it
    /// into `T`.
    pub fn get_file_from_branch<T>(&self, branch: &str, directory: &str, file: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let paths = [
            DEFAULT_APPLICATION_NAME,
            DEFAULT_APPLICATION_PROFILE,
            branch,
            directory,
            file,
        ];
        self.resolve_decoded(&paths, &[])?
            .ok_or_else(|| ConfigError::FileNotFound {
                file: file.to_string(),
            })
    }

    /// Retrieves `file` from `directory` on the server's default branch as
    /// raw bytes, for file types with no structured decoder.
    pub fn get_file_raw(&self, directory: &str, file: &str) -> Result<Vec<u8>> {
        let paths = [
            DEFAULT_APPLICATION_NAME,
            DEFAULT_APPLICATION_PROFILE,
            directory,
            file,
        ];
        self.resolve_raw(&paths, &[USE_DEFAULT_LABEL])?
            .ok_or_else(|| ConfigError::FileNotFound {
                file: file.to_string(),
            })
    }

    /// Retrieves `file` from `directory` on the given branch as raw bytes.
    pub fn get_file_from_branch_raw(
        &self,
        branch: &str,
        directory: &str,
        file: &str,
    ) -> Result<Vec<u8>> {
        let paths = [
            DEFAULT_APPLICATION_NAME,
            DEFAULT_APPLICATION_PROFILE,
            branch,
            directory,
            file,
        ];
        self.resolve_raw(&paths, &[])?
            .ok_or_else(|| ConfigError::FileNotFound {
                file: file.to_string(),
            })
    }

    /// Tries each server in order and decodes the first non-404 response.
    ///
    /// Returns `Ok(None)` when every server answered 404; the caller supplies
    /// the operation-specific exhaustion error.
    fn resolve_decoded<T>(&self, paths: &[&str], params: &[(&str, &str)]) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        let format = ResponseFormat::for_resource(paths.last().copied().unwrap_or_default());
        for fetcher in &self.fetchers {
            match fetcher
                .fetch(paths, params)
                .and_then(RawResponse::ensure_success)
            {
                Ok(response) => return response.deserialize(format).map(Some),
                Err(e) if e.is_not_found() => {
                    tracing::debug!(
                        base_url = fetcher.base_url(),
                        "resource not found, trying next server"
                    );
                }
                Err(e) => return Err(e),
            }
        }
        Ok(None)
    }

    /// Raw-bytes variant of [`ConfigClient::resolve_decoded`].
    fn resolve_raw(&self, paths: &[&str], params: &[(&str, &str)]) -> Result<Option<Vec<u8>>> {
        for fetcher in &self.fetchers {
            match fetcher
                .fetch(paths, params)
                .and_then(RawResponse::ensure_success)
            {
                Ok(response) => return Ok(Some(response.into_body())),
                Err(e) if e.is_not_found() => {
                    tracing::debug!(
                        base_url = fetcher.base_url(),
                        "resource not found, trying next server"
                    );
                }
                Err(e) => return Err(e),
            }
        }
        Ok(None)
    }
}

/// One way of producing Config Server endpoints, resolved at build time.
enum Strategy {
    LocalUrls(Vec<String>),
    LocalUrlsFromEnv,
    BasicAuth {
        base_url: String,
        username: String,
        password: String,
    },
    CloudServiceDefault,
    CloudServiceNamed(String),
    OAuth2 {
        base_url: String,
        client_id: String,
        client_secret: String,
        access_token_uri: String,
    },
}

/// Builder for [`ConfigClient`].
///
/// Strategies accumulate in order and are validated eagerly by
/// [`ConfigClientBuilder::build`]: a missing environment variable, malformed
/// credential JSON, absent bound service, or unparsable base URL fails the
/// build with a typed error instead of producing a silently broken client.
///
/// # Examples
///
/// ```rust,no_run
/// use cloudconfig::service::ConfigClient;
///
/// # fn main() -> cloudconfig::domain::Result<()> {
/// let client = ConfigClient::builder()
///     .with_local_urls_from_env()
///     .with_oauth2(
///         "https://config.example.com",
///         "client-id",
///         "client-secret",
///         "https://uaa.example.com/oauth/token",
///     )
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct ConfigClientBuilder {
    strategies: Vec<Strategy>,
    http_client: Option<reqwest::blocking::Client>,
}

impl ConfigClientBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds unauthenticated endpoints for the given base URLs, in order.
    pub fn with_local_urls<I, S>(mut self, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.strategies
            .push(Strategy::LocalUrls(urls.into_iter().map(Into::into).collect()));
        self
    }

    /// Adds unauthenticated endpoints for every URL listed in the
    /// `CONFIG_SERVER_URLS` environment variable.
    pub fn with_local_urls_from_env(mut self) -> Self {
        self.strategies.push(Strategy::LocalUrlsFromEnv);
        self
    }

    /// Adds one endpoint authorized with HTTP basic authentication.
    pub fn with_basic_auth(
        mut self,
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.strategies.push(Strategy::BasicAuth {
            base_url: base_url.into(),
            username: username.into(),
            password: password.into(),
        });
        self
    }

    /// Adds OAuth2 endpoints discovered from the bound-services environment
    /// under the default Config Server service names.
    pub fn with_cloud_service(mut self) -> Self {
        self.strategies.push(Strategy::CloudServiceDefault);
        self
    }

    /// Adds OAuth2 endpoints discovered from the bound-services environment
    /// under an explicit service name.
    pub fn with_cloud_service_named(mut self, name: impl Into<String>) -> Self {
        self.strategies.push(Strategy::CloudServiceNamed(name.into()));
        self
    }

    /// Adds one endpoint with explicit OAuth2 client-credentials parameters.
    pub fn with_oauth2(
        mut self,
        base_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        access_token_uri: impl Into<String>,
    ) -> Self {
        self.strategies.push(Strategy::OAuth2 {
            base_url: base_url.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            access_token_uri: access_token_uri.into(),
        });
        self
    }

    /// Overrides the HTTP client shared by all endpoints.
    ///
    /// Timeouts, pooling, and TLS configuration belong to this client; by
    /// default a pooled client with connect and request timeouts is built.
    pub fn with_http_client(mut self, client: reqwest::blocking::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Validates every strategy and builds the client.
    ///
    /// Fails with [`ConfigError::InvalidConfiguration`] when no strategy was
    /// supplied or the strategies produced no endpoints, and propagates any
    /// strategy's own setup failure.
    pub fn build(self) -> Result<ConfigClient> {
        if self.strategies.is_empty() {
            return Err(ConfigError::InvalidConfiguration {
                message: "at least one construction strategy must be provided".to_string(),
            });
        }
        let client = match self.http_client {
            Some(client) => client,
            None => default_http_client()?,
        };
        let mut fetchers: Vec<Box<dyn ResourceFetcher>> = Vec::new();
        for strategy in self.strategies {
            match strategy {
                Strategy::LocalUrls(urls) => {
                    for url in urls {
                        fetchers.push(Box::new(HttpFetcher::new(url, client.clone())?));
                    }
                }
                Strategy::LocalUrlsFromEnv => {
                    for url in environment::local_urls()? {
                        fetchers.push(Box::new(HttpFetcher::new(url, client.clone())?));
                    }
                }
                Strategy::BasicAuth {
                    base_url,
                    username,
                    password,
                } => {
                    fetchers.push(Box::new(HttpFetcher::with_auth(
                        base_url,
                        client.clone(),
                        AuthMode::Basic { username, password },
                    )?));
                }
                Strategy::CloudServiceDefault => {
                    push_oauth2_fetchers(
                        &mut fetchers,
                        environment::default_cloud_credentials()?,
                        &client,
                    )?;
                }
                Strategy::CloudServiceNamed(name) => {
                    push_oauth2_fetchers(
                        &mut fetchers,
                        environment::cloud_credentials(&name)?,
                        &client,
                    )?;
                }
                Strategy::OAuth2 {
                    base_url,
                    client_id,
                    client_secret,
                    access_token_uri,
                } => {
                    let provider = ClientCredentialsTokenProvider::new(
                        client_id,
                        client_secret,
                        access_token_uri,
                        client.clone(),
                    );
                    fetchers.push(Box::new(HttpFetcher::with_auth(
                        base_url,
                        client.clone(),
                        AuthMode::OAuth2(provider),
                    )?));
                }
            }
        }
        ConfigClient::from_fetchers(fetchers)
    }
}

fn push_oauth2_fetchers(
    fetchers: &mut Vec<Box<dyn ResourceFetcher>>,
    credentials: Vec<Credential>,
    client: &reqwest::blocking::Client,
) -> Result<()> {
    for credential in credentials {
        let provider = ClientCredentialsTokenProvider::from_credential(&credential, client.clone());
        fetchers.push(Box::new(HttpFetcher::with_auth(
            credential.uri,
            client.clone(),
            AuthMode::OAuth2(provider),
        )?));
    }
    Ok(())
}

fn default_http_client() -> Result<reqwest::blocking::Client> {
    reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .pool_idle_timeout(Duration::from_secs(90))
        .build()
        .map_err(|e| ConfigError::InvalidConfiguration {
            message: format!("failed to build HTTP client: {e}"),
        })
}
