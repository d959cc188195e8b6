//! Environment variable assembly for deployed services
//!
//! Services receive their runtime settings as a flat list of name/value
//! pairs. Values are resolved from the stack settings first, then from the
//! deploying process environment, and default to an empty string so a
//! missing setting never blocks a deployment.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::env;

/// One environment variable injected into a service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvVar {
    /// Variable name
    pub name: String,

    /// Variable value
    pub value: String,
}

impl EnvVar {
    /// Create an environment variable with an explicit value
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Build an environment variable, resolving its value by name
///
/// Resolution order: stack `settings`, then the process environment, then
/// an empty string.
pub fn variable(name: &str, settings: &IndexMap<String, String>) -> EnvVar {
    let value = settings
        .get(name)
        .cloned()
        .or_else(|| env::var(name).ok())
        .unwrap_or_default();

    EnvVar::new(name, value)
}

/// Convert stack settings into the environment list for a service
///
/// Two kinds of keys are picked up, everything else is ignored:
/// - `aws:*` keys become upper-snake-case names (`aws:region` → `AWS_REGION`)
/// - keys prefixed with `{namespace}:` keep the name after the prefix
///
/// ```rust
/// use indexmap::IndexMap;
/// use deploykit_core::vars::stack_variables;
///
/// let mut settings = IndexMap::new();
/// settings.insert("aws:region".to_string(), "us-east-1".to_string());
/// settings.insert("mysite:PUBLIC_URL".to_string(), "https://example.com".to_string());
/// settings.insert("other:ignored".to_string(), "x".to_string());
///
/// let vars = stack_variables(&settings, "mysite");
/// assert_eq!(vars.len(), 2);
/// assert_eq!(vars[0].name, "AWS_REGION");
/// assert_eq!(vars[1].name, "PUBLIC_URL");
/// ```
pub fn stack_variables(settings: &IndexMap<String, String>, namespace: &str) -> Vec<EnvVar> {
    let prefix = format!("{namespace}:");

    settings
        .iter()
        .filter_map(|(key, value)| {
            if key.starts_with("aws:") {
                Some(EnvVar::new(upper_snake(key), value.clone()))
            } else if let Some(name) = key.strip_prefix(&prefix) {
                Some(EnvVar::new(name, value.clone()))
            } else {
                None
            }
        })
        .collect()
}

/// Normalize a settings key into an environment variable name
///
/// Runs of non-word characters collapse into a single underscore.
fn upper_snake(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut in_separator = false;

    for c in key.chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            out.push(c.to_ascii_uppercase());
            in_separator = false;
        } else if !in_separator {
            out.push('_');
            in_separator = true;
        }
    }

    out
}
