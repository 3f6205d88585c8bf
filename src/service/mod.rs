// SPDX-License-Identifier: MIT OR Apache-2.0

//! Service layer containing the client facade.
//!
//! This module provides the [`ConfigClient`] that applications use to
//! retrieve configurations and files, and its eagerly-validated builder.

pub mod client;

pub use client::{ConfigClient, ConfigClientBuilder};
