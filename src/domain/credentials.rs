// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bound-service credential record.
//!
//! This module defines the credential shape produced by environment-based
//! service discovery and consumed when constructing OAuth2-authenticated
//! Config Server endpoints.

use serde::Deserialize;

/// Credentials for one bound Config Server service instance.
///
/// Deserialized from a bound-service JSON descriptor (the `VCAP_SERVICES`
/// environment variable). For a locally running server only [`Credential::uri`]
/// is populated.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Credential {
    /// Base URL of the Config Server instance.
    #[serde(default)]
    pub uri: String,
    /// OAuth2 client id for the client-credentials grant.
    #[serde(default)]
    pub client_id: String,
    /// OAuth2 client secret for the client-credentials grant.
    #[serde(default)]
    pub client_secret: String,
    /// Token endpoint used to obtain bearer tokens.
    #[serde(default)]
    pub access_token_uri: String,
}
