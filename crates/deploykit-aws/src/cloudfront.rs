//! CDN distribution origins and cache behaviors
//!
//! A distribution is assembled from origins (where content lives) and cache
//! behaviors (which request paths go to which origin, and for how long the
//! edge caches the response). Builders here reproduce the site conventions:
//! static content is cached for ten minutes, immutable content for a year,
//! and anything served by a live process is not cached at all.

use deploykit_core::config::ProxyOrigin;
use deploykit_core::{Error, Result};
use serde::{Deserialize, Serialize};
use url::Url;

/// Protocol the edge uses when talking to an origin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OriginProtocolPolicy {
    /// Plain HTTP only
    HttpOnly,
    /// HTTPS only
    HttpsOnly,
}

/// Protocol policy enforced on viewers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViewerProtocolPolicy {
    /// Redirect HTTP viewers to HTTPS
    RedirectToHttps,
    /// Accept both protocols
    AllowAll,
}

/// Connection settings for a custom origin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomOriginConfig {
    /// Protocol the edge uses towards this origin
    pub origin_protocol_policy: OriginProtocolPolicy,

    /// HTTP port
    pub http_port: u16,

    /// HTTPS port
    pub https_port: u16,

    /// TLS versions accepted towards the origin
    pub origin_ssl_protocols: Vec<String>,
}

impl CustomOriginConfig {
    fn with_policy(origin_protocol_policy: OriginProtocolPolicy) -> Self {
        Self {
            origin_protocol_policy,
            http_port: 80,
            https_port: 443,
            origin_ssl_protocols: vec!["TLSv1.2".to_string()],
        }
    }
}

/// One origin of a distribution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Origin {
    /// Identifier cache behaviors use to reference this origin
    pub origin_id: String,

    /// Domain the edge fetches content from
    pub domain_name: String,

    /// Base path prepended to every forwarded request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_path: Option<String>,

    /// Connection settings
    pub custom_origin_config: CustomOriginConfig,
}

/// Which request values are forwarded to the origin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForwardedValues {
    /// Headers forwarded to the origin
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub headers: Vec<String>,

    /// Whether the query string is forwarded
    pub query_string: bool,

    /// Cookie forwarding mode (`none` for all site content)
    pub cookies: String,
}

impl ForwardedValues {
    /// Forward nothing: static content ignores headers, query, and cookies
    fn none() -> Self {
        Self {
            headers: Vec::new(),
            query_string: false,
            cookies: "none".to_string(),
        }
    }

    /// Forward everything except cookies, for requests served by a process
    fn all_headers() -> Self {
        Self {
            headers: vec!["*".to_string()],
            query_string: true,
            cookies: "none".to_string(),
        }
    }
}

/// One cache behavior of a distribution
///
/// A behavior without a `path_pattern` is the distribution's default,
/// catching every request no other behavior matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheBehavior {
    /// Request path pattern this behavior matches (`/api/*`, `*.gif`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_pattern: Option<String>,

    /// Origin the matched requests go to
    pub target_origin_id: String,

    /// Compress responses at the edge
    pub compress: bool,

    /// Viewer protocol enforcement
    pub viewer_protocol_policy: ViewerProtocolPolicy,

    /// Methods accepted from viewers
    pub allowed_methods: Vec<String>,

    /// Methods whose responses are cached
    pub cached_methods: Vec<String>,

    /// Forwarding configuration
    pub forwarded_values: ForwardedValues,

    /// Minimum cache time in seconds
    pub min_ttl: u64,

    /// Default cache time in seconds
    pub default_ttl: u64,

    /// Maximum cache time in seconds
    pub max_ttl: u64,
}

fn read_only_methods() -> Vec<String> {
    ["GET", "HEAD", "OPTIONS"].iter().map(|m| m.to_string()).collect()
}

fn all_methods() -> Vec<String> {
    ["HEAD", "OPTIONS", "GET", "POST", "DELETE", "PUT", "PATCH"]
        .iter()
        .map(|m| m.to_string())
        .collect()
}

fn cached_read_methods() -> Vec<String> {
    ["HEAD", "OPTIONS", "GET"].iter().map(|m| m.to_string()).collect()
}

/// Origin for a content bucket's website endpoint
///
/// S3 does not support HTTPS for buckets configured as website endpoints,
/// so the edge always talks to it over plain HTTP.
pub fn bucket_origin(origin_id: &str, website_endpoint: &str) -> Origin {
    Origin {
        origin_id: origin_id.to_string(),
        domain_name: website_endpoint.to_string(),
        origin_path: None,
        custom_origin_config: CustomOriginConfig::with_policy(OriginProtocolPolicy::HttpOnly),
    }
}

/// Origin for an application load balancer
pub fn alb_origin(origin_id: &str, dns_name: &str) -> Origin {
    Origin {
        origin_id: origin_id.to_string(),
        domain_name: dns_name.to_string(),
        origin_path: None,
        custom_origin_config: CustomOriginConfig::with_policy(OriginProtocolPolicy::HttpsOnly),
    }
}

/// Origin for an arbitrary HTTP endpoint
///
/// A path in the endpoint becomes the origin base path: with the endpoint
/// `https://docs.example.co/legacy`, a request for `/docs/eth/index.html`
/// is fetched from `https://docs.example.co/legacy/docs/eth/index.html`.
pub fn http_origin(endpoint: &str) -> Result<Origin> {
    let url = Url::parse(endpoint)?;
    let host = url
        .host_str()
        .ok_or_else(|| Error::invalid_input(format!("Endpoint has no host: {endpoint}")))?;
    let path = url.path();

    let policy = if url.scheme() == "https" {
        OriginProtocolPolicy::HttpsOnly
    } else {
        OriginProtocolPolicy::HttpOnly
    };

    Ok(Origin {
        origin_id: format!("{host}{path}"),
        domain_name: host.to_string(),
        origin_path: Some(path.to_string()),
        custom_origin_config: CustomOriginConfig::with_policy(policy),
    })
}

/// Behavior routing a path pattern to static bucket content
///
/// Responses are cached at the edge for ten minutes.
pub fn static_content_behavior(origin_id: &str, path_pattern: &str) -> CacheBehavior {
    CacheBehavior {
        path_pattern: Some(path_pattern.to_string()),
        target_origin_id: origin_id.to_string(),
        compress: true,
        viewer_protocol_policy: ViewerProtocolPolicy::RedirectToHttps,
        allowed_methods: read_only_methods(),
        cached_methods: read_only_methods(),
        forwarded_values: ForwardedValues::none(),
        min_ttl: 0,
        default_ttl: 600,
        max_ttl: 600,
    }
}

/// Behavior for content that never changes, cached for up to a year
pub fn immutable_content_behavior(origin_id: &str, path_pattern: &str) -> CacheBehavior {
    CacheBehavior {
        min_ttl: 1,
        default_ttl: 86_400,
        max_ttl: 31_536_000,
        ..static_content_behavior(origin_id, path_pattern)
    }
}

/// Default behavior serving static bucket content
pub fn default_static_content_behavior(origin_id: &str) -> CacheBehavior {
    CacheBehavior {
        path_pattern: None,
        ..static_content_behavior(origin_id, "/*")
    }
}

/// Behavior routing a path pattern to a live service, uncached
pub fn server_behavior(origin_id: &str, path_pattern: &str) -> CacheBehavior {
    CacheBehavior {
        path_pattern: Some(path_pattern.to_string()),
        target_origin_id: origin_id.to_string(),
        compress: true,
        viewer_protocol_policy: ViewerProtocolPolicy::RedirectToHttps,
        allowed_methods: all_methods(),
        cached_methods: cached_read_methods(),
        forwarded_values: ForwardedValues::all_headers(),
        min_ttl: 0,
        default_ttl: 0,
        max_ttl: 0,
    }
}

/// Default behavior routing everything to a live service
pub fn default_server_behavior(origin_id: &str) -> CacheBehavior {
    CacheBehavior {
        path_pattern: None,
        ..server_behavior(origin_id, "/*")
    }
}

/// Behavior proxying a path pattern to an external HTTP endpoint
///
/// The target origin id matches the one `http_origin` derives for the same
/// endpoint. Cache TTLs come from the proxy configuration and default to
/// uncached.
pub fn http_proxy_behavior(proxy: &ProxyOrigin, path_pattern: &str) -> Result<CacheBehavior> {
    let url = Url::parse(proxy.origin())?;
    let host = url
        .host_str()
        .ok_or_else(|| Error::invalid_input(format!("Endpoint has no host: {}", proxy.origin())))?;

    Ok(CacheBehavior {
        min_ttl: proxy.min_ttl(),
        default_ttl: proxy.default_ttl(),
        max_ttl: proxy.max_ttl(),
        ..server_behavior(&format!("{host}{}", url.path()), path_pattern)
    })
}
