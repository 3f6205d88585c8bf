// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fetches configuration from a Config Server bound via `VCAP_SERVICES`.
//!
//! The bound-service entry supplies the base URL, OAuth2 client credentials,
//! and token endpoint; tokens are obtained and refreshed automatically.

use cloudconfig::prelude::*;

fn main() -> Result<()> {
    // Initialize tracing for logging
    tracing_subscriber::fmt::init();

    let client = ConfigClient::builder().with_cloud_service().build()?;

    let source = client.get_configuration("exampleapp", &["dev", "cloud"], None)?;
    println!(
        "resolved configuration for {} (label {:?}, version {:?})",
        source.name, source.label, source.version
    );

    // files can be fetched from the backing repository as well
    let readme = client.get_file_raw("docs", "README.md")?;
    println!("fetched {} bytes of docs/README.md", readme.len());

    Ok(())
}
