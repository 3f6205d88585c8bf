// SPDX-License-Identifier: MIT OR Apache-2.0

//! A hexagonal architecture client for Spring Cloud Config Server.
//!
//! This crate fetches externalized application configuration and arbitrary
//! files from one or more remote Config Server instances over HTTP, with
//! optional OAuth2 client-credential or basic authentication. Multiple
//! property sources returned by a server are flattened into a single nested
//! tree that can be decoded into any `serde`-deserializable type.
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain Layer**: The response model, flattening engine, and errors
//!   (`Source`, `PropertySource`, `TreeValue`, `ConfigError`)
//! - **Ports**: The `ResourceFetcher` trait and shared response policy
//! - **Adapters**: The blocking HTTP fetcher, OAuth2 token provider, and
//!   environment-based credential discovery
//! - **Service**: The `ConfigClient` facade implementing multi-server
//!   fallback
//!
//! # Fallback policy
//!
//! Configured servers are tried strictly in order. A server answering 404 is
//! skipped ("this server doesn't have it, try the next"); any other failure
//! — transport error, unexpected status, malformed body — aborts immediately
//! so real breakage is never masked by fallback. Exhausting every server is
//! its own error.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use cloudconfig::prelude::*;
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct AppConfig {
//!     db: DbConfig,
//! }
//!
//! #[derive(Deserialize)]
//! struct DbConfig {
//!     host: String,
//! }
//!
//! # fn main() -> cloudconfig::domain::Result<()> {
//! let client = ConfigClient::builder()
//!     .with_local_urls(["http://localhost:8888"])
//!     .build()?;
//!
//! let source = client.get_configuration("my-app", &["dev"], None)?;
//! let config: AppConfig = source.unmarshal()?;
//! println!("db host: {}", config.db.host);
//! # Ok(())
//! # }
//! ```
//!
//! # Environment variables
//!
//! - `CONFIG_SERVER_URLS`: comma-separated base URLs of locally running
//!   Config Servers, consumed by `with_local_urls_from_env`
//! - `VCAP_SERVICES`: bound-services credentials JSON, consumed by
//!   `with_cloud_service` / `with_cloud_service_named`

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

/// Commonly used types and traits.
///
/// This module re-exports the most commonly used types and traits for
/// convenient access.
pub mod prelude {
    pub use crate::adapters::{AuthMode, ClientCredentialsTokenProvider, HttpFetcher};
    pub use crate::domain::{ConfigError, Credential, PropertySource, Result, Source, TreeValue};
    pub use crate::ports::{RawResponse, ResourceFetcher, ResponseFormat};
    pub use crate::service::{ConfigClient, ConfigClientBuilder};
}
