// SPDX-License-Identifier: MIT OR Apache-2.0

//! Property-source flattening engine.
//!
//! This module reconstructs a nested configuration tree from the flat,
//! dot-and-bracket-indexed key paths that a Config Server returns in its
//! property sources. The tree is represented as a tagged variant
//! ([`TreeValue`]) so the grow-array/descend/first-wins rules of the
//! algorithm stay explicit instead of hiding behind dynamic type inspection.

use crate::domain::errors::{ConfigError, Result};
use crate::domain::source::PropertySource;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::BTreeMap;

/// Maximum array index accepted in a property key (prevents unbounded growth
/// from a hostile or corrupt response).
const MAX_ARRAY_INDEX: usize = 10_000;

/// Matches a path component addressing an array element, e.g. `files[2]`.
static INDEXED_COMPONENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([^\[\]]+)\[([0-9]+)\]$").unwrap());

/// A node in the flattened configuration tree.
///
/// Property sources arrive as flat maps whose keys are dotted paths such as
/// `spring.datasource.url` or `files[0].name`. Flattening rebuilds the nested
/// structure those paths describe. A node is either a scalar carried through
/// opaquely from the response, a nested object, or an array of nodes.
///
/// The tree is written once during [`flatten`] and only read afterwards.
///
/// # Examples
///
/// ```
/// use cloudconfig::domain::tree::TreeValue;
/// use std::collections::BTreeMap;
///
/// let tree = TreeValue::Object(BTreeMap::new());
/// assert_eq!(tree.to_json(), serde_json::json!({}));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum TreeValue {
    /// A scalar value, passed through from the server response unchanged.
    Scalar(Value),
    /// A nested object keyed by path component.
    Object(BTreeMap<String, TreeValue>),
    /// An ordered array of nodes, grown on demand by indexed components.
    Array(Vec<TreeValue>),
}

impl TreeValue {
    /// Converts the tree into a `serde_json::Value`.
    ///
    /// This is the intermediate exchange representation used to decode the
    /// tree into a caller-supplied typed destination. Values are not coerced:
    /// an integer that arrived as JSON may surface as a floating-point number
    /// after the round-trip, which is an accepted quirk of the representation.
    pub fn to_json(&self) -> Value {
        match self {
            TreeValue::Scalar(value) => value.clone(),
            TreeValue::Object(map) => Value::Object(
                map.iter()
                    .map(|(key, node)| (key.clone(), node.to_json()))
                    .collect(),
            ),
            TreeValue::Array(items) => {
                Value::Array(items.iter().map(TreeValue::to_json).collect())
            }
        }
    }

    /// Returns `true` if this node is an object with no entries.
    ///
    /// Empty objects are the placeholders created when an array is grown to
    /// reach a written index; they are the only positions an indexed write may
    /// still claim.
    fn is_vacant(&self) -> bool {
        matches!(self, TreeValue::Object(map) if map.is_empty())
    }
}

/// Flattens ordered property sources into a single nested tree.
///
/// Sources are visited in input order, which mirrors server precedence
/// (profile-specific files before shared defaults). A value is written to a
/// path only if nothing occupies that path yet, so the first source to write
/// wins. Iteration order within a single source's map is not significant
/// because keys within one map never collide.
///
/// Keys with nested or malformed bracket indexes (e.g. `a[0][1]`) fail with
/// [`ConfigError::UnsupportedKey`] rather than producing a guessed shape.
///
/// # Examples
///
/// ```
/// use cloudconfig::domain::source::PropertySource;
/// use cloudconfig::domain::tree::flatten;
///
/// let source = PropertySource {
///     name: "application.yml".to_string(),
///     source: [("db.host".to_string(), serde_json::json!("localhost"))]
///         .into_iter()
///         .collect(),
/// };
/// let tree = flatten(&[source]).unwrap();
/// assert_eq!(tree.to_json(), serde_json::json!({"db": {"host": "localhost"}}));
/// ```
pub fn flatten(property_sources: &[PropertySource]) -> Result<TreeValue> {
    let mut root = BTreeMap::new();
    for property_source in property_sources {
        for (key, value) in &property_source.source {
            let components: Vec<&str> = key.split('.').collect();
            insert(&mut root, &components, value, key)?;
        }
    }
    tracing::debug!(
        sources = property_sources.len(),
        "flattened property sources into configuration tree"
    );
    Ok(TreeValue::Object(root))
}

/// A single parsed path component.
enum Component<'a> {
    /// A plain map key.
    Plain(&'a str),
    /// An array element, `name[index]`.
    Indexed { name: &'a str, index: usize },
}

fn parse_component<'a>(component: &'a str, key: &str) -> Result<Component<'a>> {
    if !component.contains('[') && !component.contains(']') {
        return Ok(Component::Plain(component));
    }
    let captures =
        INDEXED_COMPONENT
            .captures(component)
            .ok_or_else(|| ConfigError::UnsupportedKey {
                key: key.to_string(),
            })?;
    let name = captures.get(1).map(|m| m.as_str()).unwrap_or_default();
    let index: usize = captures[2]
        .parse()
        .map_err(|_| ConfigError::UnsupportedKey {
            key: key.to_string(),
        })?;
    if index > MAX_ARRAY_INDEX {
        return Err(ConfigError::UnsupportedKey {
            key: key.to_string(),
        });
    }
    Ok(Component::Indexed { name, index })
}

/// Writes `value` at the path described by `components`, creating nested
/// objects and growing arrays as needed. A path already occupied by an
/// earlier write is left untouched.
fn insert(
    current: &mut BTreeMap<String, TreeValue>,
    components: &[&str],
    value: &Value,
    key: &str,
) -> Result<()> {
    let component = components[0];
    let rest = &components[1..];
    match parse_component(component, key)? {
        Component::Indexed { name, index } => {
            let entry = current
                .entry(name.to_string())
                .or_insert_with(|| TreeValue::Array(Vec::new()));
            let TreeValue::Array(items) = entry else {
                // occupied by a scalar or object from an earlier source
                return Ok(());
            };
            while items.len() <= index {
                items.push(TreeValue::Object(BTreeMap::new()));
            }
            if rest.is_empty() {
                if items[index].is_vacant() {
                    items[index] = TreeValue::Scalar(value.clone());
                }
                Ok(())
            } else {
                match &mut items[index] {
                    TreeValue::Object(next) => insert(next, rest, value, key),
                    _ => Ok(()),
                }
            }
        }
        Component::Plain(name) => {
            if rest.is_empty() {
                current
                    .entry(name.to_string())
                    .or_insert_with(|| TreeValue::Scalar(value.clone()));
                Ok(())
            } else {
                let entry = current
                    .entry(name.to_string())
                    .or_insert_with(|| TreeValue::Object(BTreeMap::new()));
                match entry {
                    TreeValue::Object(next) => insert(next, rest, value, key),
                    // a scalar blocks the descent; the earlier write wins
                    _ => Ok(()),
                }
            }
        }
    }
}
