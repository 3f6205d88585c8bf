// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fetches configuration from a locally running Config Server.
//!
//! Expects `CONFIG_SERVER_URLS` to hold a comma-separated list of base URLs,
//! e.g. `CONFIG_SERVER_URLS=http://localhost:8888`.

use cloudconfig::prelude::*;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct ExampleConfig {
    #[serde(default)]
    example: Example,
}

#[derive(Debug, Default, Deserialize)]
struct Example {
    #[serde(default)]
    field: String,
}

fn main() -> Result<()> {
    // Initialize tracing for logging
    tracing_subscriber::fmt::init();

    let client = ConfigClient::builder().with_local_urls_from_env().build()?;

    let source = client.get_configuration("exampleapp", &["dev"], None)?;
    println!("resolved configuration for {}", source.name);

    source.handle_property_sources(|property_source| {
        println!("  property source: {}", property_source.name);
    });

    let config: ExampleConfig = source.unmarshal()?;
    println!("example.field = {:?}", config.example.field);

    Ok(())
}
