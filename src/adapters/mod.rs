// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapters layer containing transport and discovery implementations.
//!
//! This module contains the concrete implementations behind the ports layer:
//! the blocking HTTP fetcher, the OAuth2 client-credentials token provider,
//! and environment-based endpoint/credential discovery.

pub mod environment;
pub mod http;
pub mod oauth2;

// Re-export adapters
pub use http::{build_url, AuthMode, HttpFetcher};
pub use oauth2::ClientCredentialsTokenProvider;
