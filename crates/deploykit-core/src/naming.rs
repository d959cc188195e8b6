//! Service naming helpers
//!
//! Deployment resources share a naming scheme derived from the service name
//! and the current stack: names are slugged, and when a `STACK_ID` is set
//! every service name is suffixed with it so parallel stacks never collide.

use std::env;

/// Slug a value for use in resource names
///
/// Every character outside `[A-Za-z0-9_]` becomes `-`, and leading/trailing
/// dash runs are trimmed.
///
/// ```rust
/// assert_eq!(deploykit_core::naming::slug("My Service (beta)"), "My-Service--beta");
/// ```
pub fn slug(value: &str) -> String {
    let replaced: String = value
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '-' })
        .collect();
    replaced.trim_matches('-').to_string()
}

/// Resolve the version identifier for the current deployment
///
/// Resolution order: `CI_COMMIT_TAG`, the first 6 characters of
/// `CI_COMMIT_SHA`, `CI_COMMIT_BRANCH`, then the literal `"current"`.
pub fn service_version() -> String {
    if let Ok(tag) = env::var("CI_COMMIT_TAG") {
        if !tag.is_empty() {
            return tag;
        }
    }

    if let Ok(sha) = env::var("CI_COMMIT_SHA") {
        if !sha.is_empty() {
            return sha.chars().take(6).collect();
        }
    }

    if let Ok(branch) = env::var("CI_COMMIT_BRANCH") {
        if !branch.is_empty() {
            return branch;
        }
    }

    "current".to_string()
}

/// Resolve the current stack identifier (`STACK_ID`, default `"default"`)
pub fn stack_id() -> String {
    env::var("STACK_ID")
        .ok()
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| "default".to_string())
}

/// Service name as used in resource identifiers
pub fn service_name(name: &str) -> String {
    slug(name)
}

/// Service name scoped to the current stack
///
/// Returns `{slug(name)}-{slug(stack_id)}` when `STACK_ID` is set, the
/// plain slug otherwise.
pub fn scoped_service_name(name: &str) -> String {
    match env::var("STACK_ID").ok().filter(|id| !id.is_empty()) {
        Some(stack) => format!("{}-{}", slug(name), slug(&stack)),
        None => slug(name),
    }
}

/// Full domain for a service under a top-level domain
///
/// ```rust
/// assert_eq!(deploykit_core::naming::service_subdomain("events", "example.org"), "events.example.org");
/// ```
pub fn service_subdomain(service_name: &str, tld_domain: &str) -> String {
    format!("{service_name}.{tld_domain}")
}
