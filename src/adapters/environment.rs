// SPDX-License-Identifier: MIT OR Apache-2.0

//! Environment-based endpoint and credential discovery.
//!
//! This module reads Config Server locations from the process environment:
//! a comma-separated list of base URLs for locally running servers, and a
//! bound-services JSON blob (the Cloud Foundry `VCAP_SERVICES` convention)
//! carrying OAuth2 credentials for cloud-hosted servers.

use crate::domain::credentials::Credential;
use crate::domain::errors::{ConfigError, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::env;

/// Environment variable holding a comma-separated list of local Config Server
/// base URLs.
pub const ENV_LOCAL_URLS: &str = "CONFIG_SERVER_URLS";

/// Environment variable holding the bound-services credentials JSON blob.
pub const ENV_BOUND_SERVICES: &str = "VCAP_SERVICES";

/// Bound-service name of the Config Server in older marketplace offerings.
pub const CONFIG_SERVER_SERVICE: &str = "p-config-server";

/// Bound-service name of the Spring Cloud Config Server.
pub const SPRING_CLOUD_CONFIG_SERVER_SERVICE: &str = "p.config-server";

/// One entry of a bound-service descriptor; only the credentials are consumed.
#[derive(Debug, Deserialize)]
struct BoundService {
    credentials: Credential,
}

/// Reads local Config Server base URLs from [`ENV_LOCAL_URLS`].
///
/// The variable holds a comma-separated list; blank entries are ignored.
/// Fails with [`ConfigError::CredentialsNotFound`] when the variable is unset
/// or holds no usable URL.
///
/// # Examples
///
/// ```rust,no_run
/// use cloudconfig::adapters::environment;
///
/// let urls = environment::local_urls()?;
/// # Ok::<(), cloudconfig::domain::ConfigError>(())
/// ```
pub fn local_urls() -> Result<Vec<String>> {
    let raw = env::var(ENV_LOCAL_URLS).unwrap_or_default();
    parse_local_urls(&raw).ok_or_else(|| ConfigError::CredentialsNotFound {
        reason: format!(
            "no local Config Server URLs provided in environment variable {ENV_LOCAL_URLS}"
        ),
    })
}

fn parse_local_urls(raw: &str) -> Option<Vec<String>> {
    let urls: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map(String::from)
        .collect();
    if urls.is_empty() {
        None
    } else {
        Some(urls)
    }
}

/// Reads the credentials of the named bound service from
/// [`ENV_BOUND_SERVICES`].
///
/// Fails with [`ConfigError::CredentialsNotFound`] when the variable is unset
/// or the named service has no instances, and with
/// [`ConfigError::DecodeError`] when the blob is not valid JSON.
pub fn cloud_credentials(service: &str) -> Result<Vec<Credential>> {
    let raw = env::var(ENV_BOUND_SERVICES).map_err(|_| ConfigError::CredentialsNotFound {
        reason: format!("environment variable {ENV_BOUND_SERVICES} is not set"),
    })?;
    credentials_from_json(&raw, service)
}

fn credentials_from_json(raw: &str, service: &str) -> Result<Vec<Credential>> {
    let services: HashMap<String, Vec<BoundService>> =
        serde_json::from_str(raw).map_err(|e| ConfigError::DecodeError {
            context: format!("bound services in environment variable {ENV_BOUND_SERVICES}"),
            source: Box::new(e),
        })?;
    let instances = services
        .get(service)
        .filter(|instances| !instances.is_empty())
        .ok_or_else(|| ConfigError::CredentialsNotFound {
            reason: format!(
                "service '{service}' does not exist in environment variable {ENV_BOUND_SERVICES}"
            ),
        })?;
    tracing::debug!(service, instances = instances.len(), "discovered bound service credentials");
    Ok(instances
        .iter()
        .map(|instance| instance.credentials.clone())
        .collect())
}

/// Reads Config Server credentials under the default bound-service names.
///
/// Tries [`SPRING_CLOUD_CONFIG_SERVER_SERVICE`] first and falls back to
/// [`CONFIG_SERVER_SERVICE`]; fails with
/// [`ConfigError::CredentialsNotFound`] naming both when neither exists.
pub fn default_cloud_credentials() -> Result<Vec<Credential>> {
    match cloud_credentials(SPRING_CLOUD_CONFIG_SERVER_SERVICE) {
        Ok(credentials) => Ok(credentials),
        Err(ConfigError::CredentialsNotFound { .. }) => {
            match cloud_credentials(CONFIG_SERVER_SERVICE) {
                Ok(credentials) => Ok(credentials),
                Err(ConfigError::CredentialsNotFound { .. }) => {
                    Err(ConfigError::CredentialsNotFound {
                        reason: format!(
                            "neither {SPRING_CLOUD_CONFIG_SERVER_SERVICE} nor \
                             {CONFIG_SERVER_SERVICE} exist in environment variable \
                             {ENV_BOUND_SERVICES}"
                        ),
                    })
                }
                Err(e) => Err(e),
            }
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Environment variables are process-global; serialize the tests that touch them.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    struct EnvGuard {
        keys: Vec<String>,
    }

    impl EnvGuard {
        fn new() -> Self {
            EnvGuard { keys: Vec::new() }
        }

        fn set(&mut self, key: &str, value: &str) {
            env::set_var(key, value);
            self.keys.push(key.to_string());
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for key in &self.keys {
                env::remove_var(key);
            }
        }
    }

    #[test]
    fn test_parse_local_urls_splits_and_trims() {
        let urls = parse_local_urls("http://a:8888, http://b:8888 ,").unwrap();
        assert_eq!(urls, vec!["http://a:8888", "http://b:8888"]);
    }

    #[test]
    fn test_parse_local_urls_empty() {
        assert!(parse_local_urls("").is_none());
        assert!(parse_local_urls(" , ,").is_none());
    }

    #[test]
    fn test_local_urls_from_environment() {
        let _lock = ENV_LOCK.lock().unwrap();
        let mut guard = EnvGuard::new();
        guard.set(ENV_LOCAL_URLS, "http://localhost:8888,http://localhost:8889");

        let urls = local_urls().unwrap();
        assert_eq!(urls, vec!["http://localhost:8888", "http://localhost:8889"]);
    }

    #[test]
    fn test_local_urls_missing_variable() {
        let _lock = ENV_LOCK.lock().unwrap();
        env::remove_var(ENV_LOCAL_URLS);

        let result = local_urls();
        assert!(matches!(
            result,
            Err(ConfigError::CredentialsNotFound { reason }) if reason.contains(ENV_LOCAL_URLS)
        ));
    }

    const VCAP_BLOB: &str = r#"{
        "p.config-server": [
            {
                "credentials": {
                    "uri": "https://config.example.com",
                    "client_id": "id",
                    "client_secret": "secret",
                    "access_token_uri": "https://uaa.example.com/oauth/token"
                }
            }
        ]
    }"#;

    #[test]
    fn test_credentials_from_json() {
        let credentials = credentials_from_json(VCAP_BLOB, "p.config-server").unwrap();
        assert_eq!(credentials.len(), 1);
        assert_eq!(credentials[0].uri, "https://config.example.com");
        assert_eq!(credentials[0].client_id, "id");
    }

    #[test]
    fn test_credentials_from_json_missing_service() {
        let result = credentials_from_json(VCAP_BLOB, "p-config-server");
        assert!(matches!(
            result,
            Err(ConfigError::CredentialsNotFound { reason }) if reason.contains("p-config-server")
        ));
    }

    #[test]
    fn test_credentials_from_json_empty_instances() {
        let result = credentials_from_json(r#"{"p.config-server": []}"#, "p.config-server");
        assert!(matches!(result, Err(ConfigError::CredentialsNotFound { .. })));
    }

    #[test]
    fn test_credentials_from_json_malformed() {
        let result = credentials_from_json("not json", "p.config-server");
        assert!(matches!(result, Err(ConfigError::DecodeError { .. })));
    }

    #[test]
    fn test_default_cloud_credentials_tries_both_names() {
        let _lock = ENV_LOCK.lock().unwrap();
        let mut guard = EnvGuard::new();
        guard.set(
            ENV_BOUND_SERVICES,
            r#"{"p-config-server": [{"credentials": {"uri": "https://old.example.com"}}]}"#,
        );

        let credentials = default_cloud_credentials().unwrap();
        assert_eq!(credentials[0].uri, "https://old.example.com");
    }

    #[test]
    fn test_default_cloud_credentials_neither_name() {
        let _lock = ENV_LOCK.lock().unwrap();
        let mut guard = EnvGuard::new();
        guard.set(ENV_BOUND_SERVICES, r#"{"other-service": []}"#);

        let result = default_cloud_credentials();
        assert!(matches!(
            result,
            Err(ConfigError::CredentialsNotFound { reason })
                if reason.contains(SPRING_CLOUD_CONFIG_SERVER_SERVICE)
                    && reason.contains(CONFIG_SERVER_SERVICE)
        ));
    }
}
