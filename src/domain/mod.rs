// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain layer containing core types and the flattening engine.
//!
//! This module holds the configuration response model, the property-source
//! flattening algorithm, the credential record, and the error taxonomy. It is
//! independent of any transport concern.

pub mod credentials;
pub mod errors;
pub mod source;
pub mod tree;

// Re-export commonly used types
pub use credentials::Credential;
pub use errors::{ConfigError, Result};
pub use source::{PropertySource, Source};
pub use tree::TreeValue;
