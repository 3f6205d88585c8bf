// SPDX-License-Identifier: MIT OR Apache-2.0

//! Resource fetcher trait definition and response handling.
//!
//! This module defines the [`ResourceFetcher`] port implemented by transport
//! adapters, together with [`RawResponse`] and the shared status/decoding
//! policy every retrieval operation applies: 404 triggers multi-server
//! fallback, any other non-2xx status aborts, and the response format is
//! chosen from the requested resource's file extension.

use crate::domain::errors::{ConfigError, Result};
use serde::de::DeserializeOwned;

/// Maximum number of response-body bytes included in a `ServerError` message.
const MAX_ERROR_BODY_LEN: usize = 4096;

/// A trait for fetching resources from a single Config Server.
///
/// Implementations wrap one base URL plus whatever transport and
/// authentication that server requires. The client holds an ordered list of
/// fetchers and tries them in sequence; a fetcher itself never implements
/// fallback.
///
/// Implementations must be `Send + Sync`; a fetcher is immutable after
/// construction, so concurrent calls from multiple threads are safe as long
/// as the underlying transport is.
///
/// # Examples
///
/// ```
/// use cloudconfig::ports::fetcher::{RawResponse, ResourceFetcher};
/// use cloudconfig::domain::Result;
///
/// struct CannedFetcher;
///
/// impl ResourceFetcher for CannedFetcher {
///     fn base_url(&self) -> &str {
///         "http://localhost:8888"
///     }
///
///     fn fetch(&self, paths: &[&str], _params: &[(&str, &str)]) -> Result<RawResponse> {
///         let url = format!("{}/{}", self.base_url(), paths.join("/"));
///         Ok(RawResponse::new(url, 200, b"{}".to_vec()))
///     }
/// }
/// ```
pub trait ResourceFetcher: Send + Sync {
    /// Returns the base URL of the Config Server this fetcher targets.
    ///
    /// Used for logging and error messages.
    fn base_url(&self) -> &str;

    /// Performs a GET for `paths` joined onto the base URL with `params` as
    /// the query string, and returns the status and fully-read body.
    ///
    /// Reading the whole body before returning guarantees the underlying
    /// connection is released on every exit path. Transport failures fail
    /// with [`ConfigError::TransportError`] naming the attempted URL; status
    /// handling is left to [`RawResponse`].
    fn fetch(&self, paths: &[&str], params: &[(&str, &str)]) -> Result<RawResponse>;
}

/// The response format a resource decodes with, selected by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    /// JSON body; the default, and always used for configuration queries.
    Json,
    /// YAML body, for resources named `*.yml` or `*.yaml`.
    Yaml,
    /// XML body, for resources named `*.xml`.
    Xml,
}

impl ResponseFormat {
    /// Selects the format for a requested resource name.
    ///
    /// Only the last path segment is considered and any trailing query string
    /// is ignored, so `file.yaml?useDefaultLabel=true` still decodes as YAML.
    ///
    /// # Examples
    ///
    /// ```
    /// use cloudconfig::ports::fetcher::ResponseFormat;
    ///
    /// assert_eq!(ResponseFormat::for_resource("file.yaml"), ResponseFormat::Yaml);
    /// assert_eq!(ResponseFormat::for_resource("file.xml"), ResponseFormat::Xml);
    /// assert_eq!(ResponseFormat::for_resource("dev"), ResponseFormat::Json);
    /// ```
    pub fn for_resource(resource: &str) -> Self {
        let resource = resource.split('?').next().unwrap_or_default();
        if resource.contains(".yml") || resource.contains(".yaml") {
            ResponseFormat::Yaml
        } else if resource.contains(".xml") {
            ResponseFormat::Xml
        } else {
            ResponseFormat::Json
        }
    }
}

/// A fully-read HTTP response from one Config Server.
///
/// The body has already been drained from the transport, so dropping a
/// `RawResponse` never leaks a pooled connection.
#[derive(Debug, Clone)]
pub struct RawResponse {
    url: String,
    status: u16,
    body: Vec<u8>,
}

impl RawResponse {
    /// Creates a response from a requested URL, status code, and body bytes.
    pub fn new(url: impl Into<String>, status: u16, body: Vec<u8>) -> Self {
        Self {
            url: url.into(),
            status,
            body,
        }
    }

    /// Returns the URL the response was fetched from.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the HTTP status code.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Applies the shared status policy.
    ///
    /// * 404 fails with [`ConfigError::ResourceNotFound`], the non-fatal
    ///   signal that the next server should be tried.
    /// * Any other non-2xx status fails with [`ConfigError::ServerError`],
    ///   carrying a bounded copy of the body for diagnostics.
    pub fn ensure_success(self) -> Result<Self> {
        match self.status {
            404 => Err(ConfigError::ResourceNotFound { url: self.url }),
            status if !(200..300).contains(&status) => {
                let end = self.body.len().min(MAX_ERROR_BODY_LEN);
                Err(ConfigError::ServerError {
                    url: self.url,
                    status,
                    body: String::from_utf8_lossy(&self.body[..end]).into_owned(),
                })
            }
            _ => Ok(self),
        }
    }

    /// Consumes the response and returns the raw body bytes.
    pub fn into_body(self) -> Vec<u8> {
        self.body
    }

    /// Decodes the body as `format` into `T`.
    ///
    /// Decode failures fail with [`ConfigError::DecodeError`] naming the
    /// source URL.
    pub fn deserialize<T>(self, format: ResponseFormat) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let context = format!("response from {}", self.url);
        match format {
            ResponseFormat::Json => {
                serde_json::from_slice(&self.body).map_err(|e| ConfigError::DecodeError {
                    context,
                    source: Box::new(e),
                })
            }
            ResponseFormat::Yaml => {
                serde_yaml::from_slice(&self.body).map_err(|e| ConfigError::DecodeError {
                    context,
                    source: Box::new(e),
                })
            }
            ResponseFormat::Xml => {
                let text = String::from_utf8_lossy(&self.body);
                quick_xml::de::from_str(&text).map_err(|e| ConfigError::DecodeError {
                    context,
                    source: Box::new(e),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::collections::BTreeMap;

    #[test]
    fn test_format_dispatch_by_extension() {
        assert_eq!(ResponseFormat::for_resource("file.yml"), ResponseFormat::Yaml);
        assert_eq!(ResponseFormat::for_resource("file.yaml"), ResponseFormat::Yaml);
        assert_eq!(ResponseFormat::for_resource("file.xml"), ResponseFormat::Xml);
        assert_eq!(ResponseFormat::for_resource("file.json"), ResponseFormat::Json);
        assert_eq!(ResponseFormat::for_resource("file.txt"), ResponseFormat::Json);
        assert_eq!(ResponseFormat::for_resource("dev"), ResponseFormat::Json);
    }

    #[test]
    fn test_format_dispatch_ignores_query_string() {
        assert_eq!(
            ResponseFormat::for_resource("file.yaml?useDefaultLabel=true"),
            ResponseFormat::Yaml
        );
        assert_eq!(
            ResponseFormat::for_resource("file?format=.yaml"),
            ResponseFormat::Json
        );
    }

    #[test]
    fn test_ensure_success_passes_2xx() {
        let response = RawResponse::new("http://host/app/dev", 200, b"{}".to_vec());
        assert!(response.ensure_success().is_ok());

        let response = RawResponse::new("http://host/app/dev", 204, Vec::new());
        assert!(response.ensure_success().is_ok());
    }

    #[test]
    fn test_ensure_success_maps_404() {
        let response = RawResponse::new("http://host/app/dev", 404, Vec::new());
        let error = response.ensure_success().unwrap_err();
        assert!(error.is_not_found());
    }

    #[test]
    fn test_ensure_success_maps_server_error_with_body() {
        let response = RawResponse::new("http://host/app/dev", 500, b"boom".to_vec());
        let error = response.ensure_success().unwrap_err();
        assert!(matches!(
            error,
            ConfigError::ServerError { status: 500, ref body, .. } if body == "boom"
        ));
    }

    #[test]
    fn test_ensure_success_truncates_long_body() {
        let response = RawResponse::new("http://host/app/dev", 500, vec![b'x'; 10_000]);
        let error = response.ensure_success().unwrap_err();
        match error {
            ConfigError::ServerError { body, .. } => assert_eq!(body.len(), MAX_ERROR_BODY_LEN),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Payload {
        foo: String,
    }

    #[test]
    fn test_deserialize_json() {
        let response = RawResponse::new("http://host/file.json", 200, b"{\"foo\":\"bar\"}".to_vec());
        let payload: Payload = response.deserialize(ResponseFormat::Json).unwrap();
        assert_eq!(payload.foo, "bar");
    }

    #[test]
    fn test_deserialize_yaml() {
        let response = RawResponse::new("http://host/file.yaml", 200, b"foo: bar".to_vec());
        let payload: Payload = response.deserialize(ResponseFormat::Yaml).unwrap();
        assert_eq!(payload.foo, "bar");
    }

    #[test]
    fn test_deserialize_xml() {
        let response = RawResponse::new(
            "http://host/file.xml",
            200,
            b"<Payload><foo>bar</foo></Payload>".to_vec(),
        );
        let payload: Payload = response.deserialize(ResponseFormat::Xml).unwrap();
        assert_eq!(payload.foo, "bar");
    }

    #[test]
    fn test_deserialize_yaml_and_json_agree() {
        let yaml = RawResponse::new("http://host/file.yaml", 200, b"foo: bar".to_vec());
        let json = RawResponse::new("http://host/file.json", 200, b"{\"foo\":\"bar\"}".to_vec());
        let from_yaml: BTreeMap<String, String> = yaml.deserialize(ResponseFormat::Yaml).unwrap();
        let from_json: BTreeMap<String, String> = json.deserialize(ResponseFormat::Json).unwrap();
        assert_eq!(from_yaml, from_json);
    }

    #[test]
    fn test_deserialize_failure_names_url() {
        let response = RawResponse::new("http://host/file.json", 200, b"not json".to_vec());
        let error = response.deserialize::<Payload>(ResponseFormat::Json).unwrap_err();
        assert!(error.to_string().contains("http://host/file.json"));
    }

    #[test]
    fn test_fetcher_trait_object_is_send_sync() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<Box<dyn ResourceFetcher>>();
    }
}
