// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ports layer containing trait definitions.
//!
//! This module contains the trait seams between the client facade and the
//! transport adapters. The [`fetcher::ResourceFetcher`] trait is implemented
//! by the HTTP adapter and by test doubles.

pub mod fetcher;

// Re-export commonly used types
pub use fetcher::{RawResponse, ResourceFetcher, ResponseFormat};
