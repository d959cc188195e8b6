//! Redirect-rule compiler
//!
//! Translates a human-authored redirect table into the routing directives a
//! static-website hosting backend consumes. The compiler is deliberately
//! permissive: a malformed entry is dropped rather than failing the whole
//! table, so a single bad row cannot block a content deployment.
//!
//! ## Rewrite styles
//!
//! A source key is a path-prefix wildcard (`/docs/*`). The target decides
//! the rewrite style: if it ends with `/$1` the suffix matched by the
//! wildcard is preserved and appended to the replacement prefix, otherwise
//! the whole matched key is replaced with the target path.
//!
//! ```rust
//! use deploykit_core::redirect::{routing_rules, RedirectOptions};
//! use indexmap::IndexMap;
//!
//! let mut redirects = IndexMap::new();
//! redirects.insert("/agora/*".to_string(), "/dao/".to_string());
//! redirects.insert("/docs/*".to_string(), "/documentation/$1".to_string());
//! redirects.insert("/builder/*".to_string(), "https://builder.decentraland.org/$1".to_string());
//!
//! let rules = routing_rules(&redirects, &RedirectOptions::default());
//! assert_eq!(rules.len(), 3);
//! assert_eq!(rules[0].condition.key_prefix_equals, "agora/");
//! assert_eq!(rules[0].redirect.replace_key_with.as_deref(), Some("dao/"));
//! assert_eq!(rules[1].redirect.replace_key_prefix_with.as_deref(), Some("documentation/"));
//! assert_eq!(rules[2].redirect.host_name.as_deref(), Some("builder.decentraland.org"));
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use url::Url;

/// Redirect protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    /// Plain HTTP
    Http,
    /// HTTPS
    Https,
}

/// Defaults applied to rules whose target is a relative path
///
/// Absolute targets carry their own protocol and hostname; these options
/// never override them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedirectOptions {
    /// Default redirect hostname
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,

    /// Default redirect protocol
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<Protocol>,
}

/// One compiled routing directive
///
/// Serializes to the shape static-website hosting expects in its
/// `RoutingRules` document:
///
/// ```json
/// {
///   "Condition": { "KeyPrefixEquals": "docs/" },
///   "Redirect": { "ReplaceKeyPrefixWith": "documentation/" }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RoutingRule {
    /// When the rule applies
    pub condition: Condition,

    /// What the backend rewrites the request to
    pub redirect: Redirect,
}

/// Match condition for a routing rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Condition {
    /// Object key prefix the request path must start with
    pub key_prefix_equals: String,
}

/// Rewrite half of a routing rule
///
/// Exactly one of `replace_key_with` (exact replacement) and
/// `replace_key_prefix_with` (prefix-preserving replacement) is set per
/// compiled rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Redirect {
    /// Redirect protocol, set for absolute targets or from options
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<Protocol>,

    /// Redirect hostname, set for absolute targets or from options
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_name: Option<String>,

    /// Exact replacement: the whole matched key becomes this path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replace_key_with: Option<String>,

    /// Prefix-preserving replacement: only the matched prefix is rewritten
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replace_key_prefix_with: Option<String>,
}

/// Compile a redirect map into an ordered list of routing rules
///
/// Entries are validated independently and malformed ones are dropped:
/// - the source key must start with `/` and end with `/*` (the bare `/*`
///   is rejected, an empty prefix would shadow every request)
/// - the target must start with `/`, `http://`, or `https://`
///
/// Output order follows the insertion order of `redirects`; the consuming
/// backend applies first-match-wins on that order. This function performs
/// no I/O and never fails.
pub fn routing_rules(
    redirects: &IndexMap<String, String>,
    options: &RedirectOptions,
) -> Vec<RoutingRule> {
    redirects
        .iter()
        .filter_map(|(origin, target)| compile_rule(origin, target, options))
        .collect()
}

/// Compile a single redirect entry, or `None` when the entry is malformed
fn compile_rule(origin: &str, target: &str, options: &RedirectOptions) -> Option<RoutingRule> {
    if !origin.starts_with('/') || !origin.ends_with("/*") || origin == "/*" {
        return None;
    }

    let absolute = target.starts_with("http://") || target.starts_with("https://");
    if !absolute && !target.starts_with('/') {
        return None;
    }

    // "/docs/*" -> "docs/"
    let key_prefix_equals = origin[1..origin.len() - 1].to_string();

    let mut redirect = Redirect::default();
    let path: String;

    if absolute {
        let url = Url::parse(target).ok()?;
        redirect.protocol = Some(match url.scheme() {
            "https" => Protocol::Https,
            _ => Protocol::Http,
        });
        redirect.host_name = Some(url.host_str()?.to_string());
        path = url.path().to_string();
    } else {
        redirect.host_name = options.hostname.clone();
        redirect.protocol = options.protocol;
        path = target.to_string();
    }

    if path.ends_with("/$1") {
        // "/documentation/$1" -> "documentation/", "/$1" -> ""
        let prefix = path.strip_suffix("$1").unwrap_or(&path);
        redirect.replace_key_prefix_with =
            Some(prefix.strip_prefix('/').unwrap_or(prefix).to_string());
    } else {
        redirect.replace_key_with = Some(path.strip_prefix('/').unwrap_or(&path).to_string());
    }

    Some(RoutingRule {
        condition: Condition { key_prefix_equals },
        redirect,
    })
}
