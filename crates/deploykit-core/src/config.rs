//! Configuration types for deployable static sites
//!
//! This module defines the options a site declares for deployment: its
//! redirect table, content proxies, extra domains, and the optional backing
//! service (image, sizing, exposed paths).

use crate::redirect::{RedirectOptions, RoutingRule, routing_rules};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Service name, used to derive resource and domain names
    pub name: String,

    /// Owning team
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<Team>,

    /// Redirect table compiled into website routing rules
    ///
    /// Keys are path-prefix wildcards (`/docs/*`), values are target paths
    /// or absolute URLs. A target ending in `/$1` preserves the wildcard
    /// suffix. Malformed entries are dropped at compile time.
    #[serde(default)]
    pub redirects: IndexMap<String, String>,

    /// Defaults applied to redirect rules with relative targets
    #[serde(default)]
    pub redirect_options: RedirectOptions,

    /// Paths proxied to other hosts through the CDN
    ///
    /// Values are either a bare endpoint URL or an expanded form with cache
    /// TTL overrides.
    #[serde(default)]
    pub content_proxy: IndexMap<String, ProxyOrigin>,

    /// Additional domains accepted as aliases for the site
    #[serde(default)]
    pub additional_domains: Vec<String>,

    /// Docker image backing the site's service, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_image: Option<String>,

    /// Number of service instances to keep running
    #[serde(default = "default_desired_count")]
    pub service_desired_count: u32,

    /// CPU units reserved for the service task
    #[serde(default = "default_cpus")]
    pub service_cpus: u32,

    /// Memory reserved for the service task, in MB
    #[serde(default = "default_memory")]
    pub service_memory: u32,

    /// Port the service listens on
    #[serde(default = "default_port")]
    pub service_port: u16,

    /// Paths routed from the CDN into the service; `None` keeps it private
    #[serde(default = "default_service_paths")]
    pub service_paths: Option<Vec<String>>,

    /// Health check path, expected to answer HTTP 200
    #[serde(default = "default_health_check_path")]
    pub service_health_check_path: String,

    /// Metrics path, expected to answer HTTP 200
    #[serde(default = "default_metrics_path")]
    pub service_metrics_path: String,

    /// Extra environment variables injected into the service
    #[serde(default)]
    pub service_environment: Vec<crate::vars::EnvVar>,

    /// Use the public top-level domain set instead of the internal one
    #[serde(default)]
    pub use_public_tld: bool,
}

impl SiteConfig {
    /// Create a configuration with defaults for a named site
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            team: None,
            redirects: IndexMap::new(),
            redirect_options: RedirectOptions::default(),
            content_proxy: IndexMap::new(),
            additional_domains: Vec::new(),
            service_image: None,
            service_desired_count: default_desired_count(),
            service_cpus: default_cpus(),
            service_memory: default_memory(),
            service_port: default_port(),
            service_paths: default_service_paths(),
            service_health_check_path: default_health_check_path(),
            service_metrics_path: default_metrics_path(),
            service_environment: Vec::new(),
            use_public_tld: false,
        }
    }

    /// Set the redirect table
    pub fn with_redirects(mut self, redirects: IndexMap<String, String>) -> Self {
        self.redirects = redirects;
        self
    }

    /// Set defaults for relative redirect targets
    pub fn with_redirect_options(mut self, options: RedirectOptions) -> Self {
        self.redirect_options = options;
        self
    }

    /// Set the content proxy table
    pub fn with_content_proxy(mut self, proxy: IndexMap<String, ProxyOrigin>) -> Self {
        self.content_proxy = proxy;
        self
    }

    /// Set the backing service image
    pub fn with_service_image(mut self, image: impl Into<String>) -> Self {
        self.service_image = Some(image.into());
        self
    }

    /// Add an additional alias domain
    pub fn with_additional_domain(mut self, domain: impl Into<String>) -> Self {
        self.additional_domains.push(domain.into());
        self
    }

    /// Compile this site's redirect table into routing rules
    pub fn routing_rules(&self) -> Vec<RoutingRule> {
        routing_rules(&self.redirects, &self.redirect_options)
    }

    /// Validate the configuration
    ///
    /// Malformed redirect entries are not errors (the compiler drops them),
    /// but they are logged here so a typo is visible before deployment.
    pub fn validate(&self) -> Result<(), crate::Error> {
        if crate::naming::slug(&self.name).is_empty() {
            return Err(crate::Error::config("Site name cannot be empty"));
        }

        if self.service_image.is_some() && self.service_desired_count == 0 {
            return Err(crate::Error::config(
                "Service desired count must be > 0 when a service image is set",
            ));
        }

        for (pattern, origin) in &self.content_proxy {
            let endpoint = origin.origin();
            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                return Err(crate::Error::config(format!(
                    "Content proxy endpoint for {pattern} must be an absolute URL: {endpoint}"
                )));
            }
        }

        let compiled = self.routing_rules().len();
        if compiled < self.redirects.len() {
            tracing::warn!(
                dropped = self.redirects.len() - compiled,
                "Some redirect entries are malformed and will be ignored"
            );
        }

        Ok(())
    }
}

/// Owning team for a deployed site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Team {
    /// Decentralized applications
    Dapps,
    /// Platform services
    Platform,
    /// Data pipelines
    Data,
    /// Marketing sites
    Marketing,
    /// Infrastructure
    Infra,
}

/// Target of a content proxy entry
///
/// The compact form is just the endpoint URL; the expanded form overrides
/// the CDN cache TTLs, which default to 0 (uncached).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProxyOrigin {
    /// Compact configuration: endpoint URL with uncached TTLs
    Simple(String),

    /// Expanded configuration with cache TTL overrides
    Detailed {
        /// URL to the source of the content
        origin: String,

        /// Minimum time, in seconds, the CDN retains a response
        #[serde(default)]
        min_ttl: u64,

        /// Maximum time, in seconds, the CDN retains a response when the
        /// origin sets no caching headers
        #[serde(default)]
        max_ttl: u64,

        /// Default time, in seconds, the CDN retains a response when the
        /// origin sets no caching headers
        #[serde(default)]
        default_ttl: u64,
    },
}

impl ProxyOrigin {
    /// The endpoint URL of this proxy target
    pub fn origin(&self) -> &str {
        match self {
            ProxyOrigin::Simple(origin) => origin,
            ProxyOrigin::Detailed { origin, .. } => origin,
        }
    }

    /// Minimum cache TTL in seconds
    pub fn min_ttl(&self) -> u64 {
        match self {
            ProxyOrigin::Simple(_) => 0,
            ProxyOrigin::Detailed { min_ttl, .. } => *min_ttl,
        }
    }

    /// Maximum cache TTL in seconds
    pub fn max_ttl(&self) -> u64 {
        match self {
            ProxyOrigin::Simple(_) => 0,
            ProxyOrigin::Detailed { max_ttl, .. } => *max_ttl,
        }
    }

    /// Default cache TTL in seconds
    pub fn default_ttl(&self) -> u64 {
        match self {
            ProxyOrigin::Simple(_) => 0,
            ProxyOrigin::Detailed { default_ttl, .. } => *default_ttl,
        }
    }
}

fn default_desired_count() -> u32 {
    1
}

fn default_cpus() -> u32 {
    256
}

fn default_memory() -> u32 {
    256
}

fn default_port() -> u16 {
    4000
}

fn default_service_paths() -> Option<Vec<String>> {
    Some(vec!["/api/*".to_string()])
}

fn default_health_check_path() -> String {
    "/api/status".to_string()
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}
