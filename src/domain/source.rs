// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration response model.
//!
//! This module defines [`Source`], the parsed response a Config Server returns
//! for one application/profile/label query, along with the read-only lookup
//! helpers over its property sources and the typed decoding entry point.

use crate::domain::errors::{ConfigError, Result};
use crate::domain::tree::{self, TreeValue};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

/// An application's configuration as returned by a Config Server.
///
/// The ordering of [`Source::property_sources`] is significant: it reflects
/// server-side precedence, with profile-specific files listed before shared
/// defaults. The flattening engine preserves that precedence with a
/// first-write-wins policy.
///
/// A `Source` is created fresh per retrieval call; nothing is cached between
/// calls.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Source {
    /// The application name the configuration was resolved for.
    #[serde(default)]
    pub name: String,
    /// The active profiles the configuration was resolved for.
    #[serde(default)]
    pub profiles: Vec<String>,
    /// The version-control label the configuration was served from.
    #[serde(default)]
    pub label: Option<String>,
    /// The version-control revision the configuration was served from.
    #[serde(default)]
    pub version: Option<String>,
    /// Server-reported state, if any.
    #[serde(default)]
    pub state: Option<String>,
    /// The ordered property sources contributing to this configuration.
    #[serde(default, rename = "propertySources")]
    pub property_sources: Vec<PropertySource>,
}

/// One originating file's flat key-to-value contribution to a configuration.
///
/// The Config Server usually reports [`PropertySource::name`] as a URL of
/// sorts, e.g. `ssh://base-url.com/path/to/repository/application-foo.yml`.
/// An empty [`PropertySource::source`] map is valid and represents a source
/// contributing no properties, such as a credential-store placeholder.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct PropertySource {
    /// The repository-relative path or pseudo-URL of the originating file.
    #[serde(default)]
    pub name: String,
    /// Flat mapping from dotted/indexed key path to value.
    #[serde(default)]
    pub source: BTreeMap<String, Value>,
}

impl Source {
    /// Retrieves the first property source whose name ends with `file_name`.
    ///
    /// The server reports property source names as full repository URLs or
    /// paths, so matching on the ending of the name is the only robust
    /// comparison. Fails with [`ConfigError::PropertySourceNotFound`] when
    /// nothing matches.
    ///
    /// # Arguments
    ///
    /// * `file_name` - The file name with extension, e.g. `application-foo.yml`
    ///
    /// # Examples
    ///
    /// ```
    /// use cloudconfig::domain::source::{PropertySource, Source};
    ///
    /// let source = Source {
    ///     property_sources: vec![PropertySource {
    ///         name: "ssh://host/repo/application-foo.yml".to_string(),
    ///         ..Default::default()
    ///     }],
    ///     ..Default::default()
    /// };
    /// assert!(source.property_source("application-foo.yml").is_ok());
    /// assert!(source.property_source("missing.yml").is_err());
    /// ```
    pub fn property_source(&self, file_name: &str) -> Result<&PropertySource> {
        self.property_sources
            .iter()
            .find(|property_source| property_source.name.ends_with(file_name))
            .ok_or_else(|| ConfigError::PropertySourceNotFound {
                name: file_name.to_string(),
            })
    }

    /// Invokes `handler` once per property source that is backed by a file.
    ///
    /// A Config Server may return property sources that are not configuration
    /// files (e.g. credhub placeholders); those have no file extension in
    /// their name and are skipped. Order is preserved and the handler runs
    /// synchronously.
    ///
    /// # Examples
    ///
    /// ```
    /// use cloudconfig::domain::source::{PropertySource, Source};
    ///
    /// let source = Source {
    ///     property_sources: vec![
    ///         PropertySource { name: "application.yml".to_string(), ..Default::default() },
    ///         PropertySource { name: "credhub-source".to_string(), ..Default::default() },
    ///     ],
    ///     ..Default::default()
    /// };
    ///
    /// let mut seen = Vec::new();
    /// source.handle_property_sources(|ps| seen.push(ps.name.clone()));
    /// assert_eq!(seen, vec!["application.yml".to_string()]);
    /// ```
    pub fn handle_property_sources<F>(&self, mut handler: F)
    where
        F: FnMut(&PropertySource),
    {
        for property_source in &self.property_sources {
            if Path::new(&property_source.name).extension().is_some() {
                handler(property_source);
            }
        }
    }

    /// Returns the value for an exact key path, searching property sources in
    /// precedence order.
    ///
    /// This looks the key up verbatim in each source's flat map; it does not
    /// flatten. Returns `None` when no source carries the key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.property_sources
            .iter()
            .find_map(|property_source| property_source.source.get(key))
    }

    /// Flattens the ordered property sources into a nested configuration tree.
    ///
    /// See [`crate::domain::tree::flatten`] for the algorithm and its
    /// first-write-wins semantics.
    pub fn flatten(&self) -> Result<TreeValue> {
        tree::flatten(&self.property_sources)
    }

    /// Flattens the property sources and decodes the tree into `T`.
    ///
    /// The tree is serialized through `serde_json::Value`, so the destination
    /// type's own serde attributes control field mapping. Numbers are not
    /// coerced on the way through: an integer from the response may surface as
    /// a floating-point value.
    ///
    /// # Examples
    ///
    /// ```
    /// use cloudconfig::domain::source::{PropertySource, Source};
    /// use serde::Deserialize;
    ///
    /// #[derive(Deserialize)]
    /// struct Database {
    ///     host: String,
    /// }
    ///
    /// #[derive(Deserialize)]
    /// struct AppConfig {
    ///     db: Database,
    /// }
    ///
    /// let source = Source {
    ///     property_sources: vec![PropertySource {
    ///         name: "application.yml".to_string(),
    ///         source: [("db.host".to_string(), serde_json::json!("localhost"))]
    ///             .into_iter()
    ///             .collect(),
    ///     }],
    ///     ..Default::default()
    /// };
    ///
    /// let config: AppConfig = source.unmarshal().unwrap();
    /// assert_eq!(config.db.host, "localhost");
    /// ```
    pub fn unmarshal<T>(&self) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let tree = self.flatten()?;
        serde_json::from_value(tree.to_json()).map_err(|e| ConfigError::DecodeError {
            context: format!("configuration for application '{}'", self.name),
            source: Box::new(e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn named(name: &str) -> PropertySource {
        PropertySource {
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_property_source_suffix_match_returns_first() {
        let source = Source {
            property_sources: vec![
                named("ssh://host/path/application-foo.yml"),
                named("application-foo.properties"),
            ],
            ..Default::default()
        };
        let found = source.property_source("application-foo.yml").unwrap();
        assert_eq!(found.name, "ssh://host/path/application-foo.yml");
    }

    #[test]
    fn test_property_source_missing() {
        let source = Source {
            property_sources: vec![named("application-foo.yml")],
            ..Default::default()
        };
        let result = source.property_source("missing.yml");
        assert!(matches!(
            result,
            Err(ConfigError::PropertySourceNotFound { name }) if name == "missing.yml"
        ));
    }

    #[test]
    fn test_handle_property_sources_skips_extensionless() {
        let source = Source {
            property_sources: vec![named("application.yml"), named("credhub-source")],
            ..Default::default()
        };
        let mut invocations = 0;
        source.handle_property_sources(|property_source| {
            invocations += 1;
            assert_eq!(property_source.name, "application.yml");
        });
        assert_eq!(invocations, 1);
    }

    #[test]
    fn test_handle_property_sources_preserves_order() {
        let source = Source {
            property_sources: vec![
                named("application-dev.yml"),
                named("credhub-source"),
                named("application.properties"),
            ],
            ..Default::default()
        };
        let mut seen = Vec::new();
        source.handle_property_sources(|ps| seen.push(ps.name.clone()));
        assert_eq!(seen, vec!["application-dev.yml", "application.properties"]);
    }

    #[test]
    fn test_get_searches_sources_in_order() {
        let source = Source {
            property_sources: vec![
                PropertySource {
                    name: "application-dev.yml".to_string(),
                    source: [("a.b".to_string(), json!("dev"))].into_iter().collect(),
                },
                PropertySource {
                    name: "application.yml".to_string(),
                    source: [("a.b".to_string(), json!("default"))].into_iter().collect(),
                },
            ],
            ..Default::default()
        };
        assert_eq!(source.get("a.b"), Some(&json!("dev")));
        assert_eq!(source.get("missing"), None);
    }

    #[test]
    fn test_unmarshal_into_typed_struct() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct File {
            name: String,
            size: String,
        }

        #[derive(Debug, Deserialize, PartialEq)]
        struct Config {
            files: Vec<File>,
        }

        let source = Source {
            property_sources: vec![PropertySource {
                name: "application.yml".to_string(),
                source: [
                    ("files[0].name".to_string(), json!("f1")),
                    ("files[0].size".to_string(), json!("10")),
                    ("files[1].name".to_string(), json!("f2")),
                    ("files[1].size".to_string(), json!("20")),
                ]
                .into_iter()
                .collect(),
            }],
            ..Default::default()
        };

        let config: Config = source.unmarshal().unwrap();
        assert_eq!(
            config,
            Config {
                files: vec![
                    File {
                        name: "f1".to_string(),
                        size: "10".to_string()
                    },
                    File {
                        name: "f2".to_string(),
                        size: "20".to_string()
                    },
                ]
            }
        );
    }

    #[test]
    fn test_unmarshal_shape_mismatch() {
        #[derive(Debug, Deserialize)]
        struct Config {
            #[allow(dead_code)]
            count: u64,
        }

        let source = Source {
            name: "app".to_string(),
            property_sources: vec![PropertySource {
                name: "application.yml".to_string(),
                source: [("count".to_string(), json!("not a number"))]
                    .into_iter()
                    .collect(),
            }],
            ..Default::default()
        };

        let result = source.unmarshal::<Config>();
        assert!(matches!(result, Err(ConfigError::DecodeError { .. })));
    }

    #[test]
    fn test_deserialize_server_response() {
        let body = json!({
            "name": "exampleapp",
            "profiles": ["dev"],
            "label": null,
            "version": "abc123",
            "state": null,
            "propertySources": [
                {
                    "name": "ssh://host/repo/exampleapp-dev.yml",
                    "source": {"example.field": "value"}
                },
                {
                    "name": "credhub-source",
                    "source": {}
                }
            ]
        });

        let source: Source = serde_json::from_value(body).unwrap();
        assert_eq!(source.name, "exampleapp");
        assert_eq!(source.profiles, vec!["dev"]);
        assert_eq!(source.label, None);
        assert_eq!(source.version.as_deref(), Some("abc123"));
        assert_eq!(source.property_sources.len(), 2);
        assert!(source.property_sources[1].source.is_empty());
    }
}
