//! Content bucket declarations
//!
//! A content bucket serves a site's static files through S3 website
//! hosting. The website configuration embeds the compiled routing rules,
//! which is how the redirect table ends up enforced by the backend.

use crate::iam::{PolicyDocument, public_read_policy};
use deploykit_core::SiteConfig;
use deploykit_core::naming::service_name;
use deploykit_core::redirect::RoutingRule;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Canned ACL applied to a bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CannedAcl {
    /// Owner gets full control, no one else has access (default)
    Private,
    /// Owner gets full control, everyone can read
    PublicRead,
    /// Owner gets full control, everyone can read and write
    PublicReadWrite,
    /// Owner gets full control, EC2 can read AMI bundles
    AwsExecRead,
    /// Owner gets full control, authenticated users can read
    AuthenticatedRead,
    /// Log delivery group gets write access
    LogDeliveryWrite,
}

/// S3 website hosting configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebsiteConfiguration {
    /// Object served for directory requests
    pub index_document: String,

    /// Object served when a key is missing
    pub error_document: String,

    /// Compiled redirect rules, applied first-match-wins
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub routing_rules: Vec<RoutingRule>,
}

impl Default for WebsiteConfiguration {
    fn default() -> Self {
        Self {
            index_document: "index.html".to_string(),
            error_document: "404.html".to_string(),
            routing_rules: Vec::new(),
        }
    }
}

/// CORS rule attached to a bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorsRule {
    /// Allowed HTTP methods
    pub allowed_methods: Vec<String>,

    /// Allowed origins
    pub allowed_origins: Vec<String>,

    /// Headers exposed to the browser
    pub expose_headers: Vec<String>,

    /// How long, in seconds, browsers may cache the preflight response
    pub max_age_seconds: u64,
}

impl CorsRule {
    /// Read-only CORS rule for website content
    ///
    /// GET/HEAD from any origin, with `ETag` exposed so clients can
    /// revalidate cached content.
    pub fn read_only() -> Self {
        Self {
            allowed_methods: vec!["GET".to_string(), "HEAD".to_string()],
            allowed_origins: vec!["*".to_string()],
            expose_headers: vec!["ETag".to_string()],
            max_age_seconds: 3600,
        }
    }
}

/// Desired state of a site's content bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentBucketSpec {
    /// Bucket resource name
    pub name: String,

    /// Canned ACL
    pub acl: CannedAcl,

    /// Resource tags
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub tags: IndexMap<String, String>,

    /// Website hosting configuration, serving bucket contents so that
    /// requests for `foo/` resolve to `foo/index.html`
    pub website: WebsiteConfiguration,

    /// CORS rules
    pub cors_rules: Vec<CorsRule>,

    /// Bucket policy making objects publicly readable
    pub policy: PolicyDocument,
}

/// Declare the content bucket for a site
///
/// The bucket is named `{service}-website`, tagged with the domain it
/// serves, and its website configuration carries the routing rules
/// compiled from the site's redirect table.
pub fn content_bucket(config: &SiteConfig, service_domain: &str) -> ContentBucketSpec {
    let name = format!("{}-website", service_name(&config.name));
    let mut tags = IndexMap::new();
    tags.insert("Name".to_string(), service_domain.to_string());

    ContentBucketSpec {
        policy: public_read_policy(&name),
        name,
        acl: CannedAcl::Private,
        tags,
        website: WebsiteConfiguration {
            routing_rules: config.routing_rules(),
            ..WebsiteConfiguration::default()
        },
        cors_rules: vec![CorsRule::read_only()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    #[test]
    fn bucket_name_and_tags_derive_from_site() {
        let config = SiteConfig::new("My Landing");
        let bucket = content_bucket(&config, "my-landing.example.org");

        assert_eq!(bucket.name, "My-Landing-website");
        assert_eq!(bucket.tags.get("Name").map(String::as_str), Some("my-landing.example.org"));
        assert_eq!(bucket.acl, CannedAcl::Private);
    }

    #[test]
    fn website_configuration_carries_compiled_rules() {
        let mut redirects = IndexMap::new();
        redirects.insert("/docs/*".to_string(), "/documentation/$1".to_string());
        redirects.insert("bad-key".to_string(), "/x/".to_string());

        let config = SiteConfig::new("landing").with_redirects(redirects);
        let bucket = content_bucket(&config, "landing.example.org");

        assert_eq!(bucket.website.index_document, "index.html");
        assert_eq!(bucket.website.error_document, "404.html");
        assert_eq!(bucket.website.routing_rules.len(), 1);
        assert_eq!(bucket.website.routing_rules[0].condition.key_prefix_equals, "docs/");
    }

    #[test]
    fn policy_targets_bucket_objects() {
        let bucket = content_bucket(&SiteConfig::new("landing"), "landing.example.org");
        let json = serde_json::to_value(&bucket.policy).unwrap();
        assert_eq!(
            json["Statement"][0]["Resource"][0],
            "arn:aws:s3:::landing-website/*"
        );
    }
}
