//! Static site plan assembly
//!
//! A [`StaticSitePlan`] is the full desired-state declaration for one site:
//! the content bucket (with compiled routing rules), the CDN origins and
//! cache behaviors, the backing service settings, and the environment
//! injected into that service. The plan is what the CLI serializes and the
//! infrastructure engine consumes.

use crate::alb::{ListenerRuleSpec, host_forward_listener_rule};
use crate::cloudfront::{
    CacheBehavior, Origin, alb_origin, bucket_origin, default_static_content_behavior,
    http_origin, http_proxy_behavior, server_behavior,
};
use crate::iam::{ServiceUserSpec, service_user};
use crate::route53::{AliasTarget, RecordSpec, route_to_target};
use crate::s3::{ContentBucketSpec, content_bucket};
use deploykit_core::naming::{service_name, service_subdomain, service_version};
use deploykit_core::vars::EnvVar;
use deploykit_core::{Result, SiteConfig};
use serde::{Deserialize, Serialize};

/// Settings for the service backing a site, when one is configured
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServicePlan {
    /// Docker image to run
    pub image: String,

    /// Port the service listens on
    pub port: u16,

    /// Number of instances to keep running
    pub desired_count: u32,

    /// CPU units per task
    pub cpus: u32,

    /// Memory per task, in MB
    pub memory: u32,

    /// Health check path
    pub health_check_path: String,

    /// Metrics path
    pub metrics_path: String,

    /// IAM user, access key, and role backing the service
    pub user: ServiceUserSpec,
}

/// Complete desired state for one static site deployment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticSitePlan {
    /// Slugged service name
    pub service_name: String,

    /// Primary domain the site is served from
    pub service_domain: String,

    /// Every domain the site answers on, primary first
    pub domains: Vec<String>,

    /// Content bucket declaration
    pub bucket: ContentBucketSpec,

    /// CDN origins
    pub origins: Vec<Origin>,

    /// CDN cache behaviors; the final entry is the default behavior
    pub behaviors: Vec<CacheBehavior>,

    /// Backing service, when the site has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<ServicePlan>,

    /// Environment injected into the backing service
    pub environment: Vec<EnvVar>,
}

impl StaticSitePlan {
    /// Assemble the plan for a site
    ///
    /// `tld_domain` is the zone the site's subdomain is created under, and
    /// `region` determines the bucket website endpoint the CDN fetches
    /// from. The configuration is validated first, so a plan is only built
    /// from a config that would deploy.
    pub fn new(config: &SiteConfig, tld_domain: &str, region: &str) -> Result<Self> {
        config.validate()?;

        let name = service_name(&config.name);
        let service_domain = service_subdomain(&name, tld_domain);

        let mut domains = vec![service_domain.clone()];
        domains.extend(
            config
                .additional_domains
                .iter()
                .filter(|d| !d.is_empty())
                .cloned(),
        );

        let bucket = content_bucket(config, &service_domain);
        let bucket_origin_id = format!("arn:aws:s3:::{}", bucket.name);
        let website_endpoint = format!("{}.s3-website-{region}.amazonaws.com", bucket.name);

        let mut origins = vec![bucket_origin(&bucket_origin_id, &website_endpoint)];
        let mut behaviors = Vec::new();

        // Proxied paths take precedence over bucket content
        for (pattern, proxy) in &config.content_proxy {
            origins.push(http_origin(proxy.origin())?);
            behaviors.push(http_proxy_behavior(proxy, pattern)?);
        }

        let mut environment = vec![
            EnvVar::new("SERVICE_NAME", &name),
            EnvVar::new("SERVICE_VERSION", service_version()),
            EnvVar::new("SERVICE_TLD", tld_domain),
            EnvVar::new("SERVICE_DOMAIN", &service_domain),
            EnvVar::new("SERVICE_URL", format!("https://{service_domain}")),
        ];

        let service = match &config.service_image {
            Some(image) => {
                // Service paths are routed to the service's own origin,
                // which the engine resolves once the load balancer exists
                let service_origin_id = format!("{name}-service");
                if let Some(paths) = &config.service_paths {
                    for path in paths {
                        behaviors.push(server_behavior(&service_origin_id, path));
                    }
                }

                environment.push(EnvVar::new("PORT", config.service_port.to_string()));
                environment.push(EnvVar::new("IMAGE", image));

                Some(ServicePlan {
                    image: image.clone(),
                    port: config.service_port,
                    desired_count: config.service_desired_count,
                    cpus: config.service_cpus,
                    memory: config.service_memory,
                    health_check_path: config.service_health_check_path.clone(),
                    metrics_path: config.service_metrics_path.clone(),
                    user: service_user(&name),
                })
            }
            None => None,
        };

        environment.extend(config.service_environment.iter().cloned());

        // Everything not matched above falls through to bucket content
        behaviors.push(default_static_content_behavior(&bucket_origin_id));

        tracing::info!(
            site = %name,
            domains = domains.len(),
            routing_rules = bucket.website.routing_rules.len(),
            behaviors = behaviors.len(),
            "Compiled static site plan"
        );

        Ok(Self {
            service_name: name,
            service_domain,
            domains,
            bucket,
            origins,
            behaviors,
            service,
            environment,
        })
    }

    /// Declare the DNS records pointing this site's domains at a target
    pub fn records(&self, target: &impl AliasTarget) -> Result<Vec<RecordSpec>> {
        route_to_target(&self.domains, target)
    }

    /// Declare the CDN origin for this site's service load balancer
    ///
    /// The load balancer's DNS name only exists once the engine has
    /// applied the service resources, so it is passed in here the same
    /// way `records` takes a post-apply target. Returns `None` for sites
    /// without a backing service.
    pub fn service_origin(&self, dns_name: &str) -> Option<Origin> {
        self.service
            .as_ref()
            .map(|_| alb_origin(&format!("{}-service", self.service_name), dns_name))
    }

    /// Declare the listener rule forwarding this site's domains to a
    /// service target group
    pub fn listener_rule(&self, listener_arn: &str, target_group_arn: &str) -> ListenerRuleSpec {
        host_forward_listener_rule(
            &format!("{}-listener-rule", self.service_name),
            listener_arn,
            self.domains.clone(),
            target_group_arn,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route53::DistributionEndpoint;
    use deploykit_core::config::ProxyOrigin;
    use indexmap::IndexMap;

    fn site() -> SiteConfig {
        let mut redirects = IndexMap::new();
        redirects.insert("/agora/*".to_string(), "/dao/".to_string());

        let mut proxy = IndexMap::new();
        proxy.insert(
            "/blog/*".to_string(),
            ProxyOrigin::Simple("https://blog.example.io".to_string()),
        );

        SiteConfig::new("events")
            .with_redirects(redirects)
            .with_content_proxy(proxy)
            .with_additional_domain("events.example.io")
    }

    #[test]
    fn plan_derives_domains_from_name_and_tld() {
        let plan = StaticSitePlan::new(&site(), "example.org", "us-east-1").unwrap();
        assert_eq!(plan.service_domain, "events.example.org");
        assert_eq!(plan.domains, vec!["events.example.org", "events.example.io"]);
    }

    #[test]
    fn plan_routes_bucket_content_by_default() {
        let plan = StaticSitePlan::new(&site(), "example.org", "us-east-1").unwrap();

        assert_eq!(plan.origins[0].domain_name, "events-website.s3-website-us-east-1.amazonaws.com");

        let default = plan.behaviors.last().unwrap();
        assert_eq!(default.path_pattern, None);
        assert_eq!(default.target_origin_id, "arn:aws:s3:::events-website");
    }

    #[test]
    fn proxied_paths_come_before_the_default_behavior() {
        let plan = StaticSitePlan::new(&site(), "example.org", "us-east-1").unwrap();
        assert_eq!(plan.behaviors.len(), 2);
        assert_eq!(plan.behaviors[0].path_pattern.as_deref(), Some("/blog/*"));
        assert_eq!(plan.behaviors[0].target_origin_id, "blog.example.io/");
    }

    #[test]
    fn redirects_end_up_in_the_bucket_website() {
        let plan = StaticSitePlan::new(&site(), "example.org", "us-east-1").unwrap();
        assert_eq!(plan.bucket.website.routing_rules.len(), 1);
        assert_eq!(plan.bucket.website.routing_rules[0].condition.key_prefix_equals, "agora/");
    }

    #[test]
    fn service_adds_behaviors_and_environment() {
        let config = site().with_service_image("registry.example.org/events:1.2.3");
        let plan = StaticSitePlan::new(&config, "example.org", "us-east-1").unwrap();

        let service = plan.service.as_ref().expect("service plan");
        assert_eq!(service.image, "registry.example.org/events:1.2.3");
        assert_eq!(service.port, 4000);

        // default /api/* path routed to the service origin
        assert!(plan.behaviors.iter().any(|b| {
            b.path_pattern.as_deref() == Some("/api/*")
                && b.target_origin_id == "events-service"
        }));

        let names: Vec<_> = plan.environment.iter().map(|v| v.name.as_str()).collect();
        assert!(names.contains(&"SERVICE_NAME"));
        assert!(names.contains(&"PORT"));
        assert!(names.contains(&"IMAGE"));

        assert_eq!(service.user.user_name, "events-user");
        assert_eq!(service.user.role_name, "events-user-role");
    }

    #[test]
    fn service_origin_matches_the_service_behaviors() {
        let config = site().with_service_image("registry.example.org/events:1.2.3");
        let plan = StaticSitePlan::new(&config, "example.org", "us-east-1").unwrap();

        let origin = plan
            .service_origin("events-alb-123.elb.amazonaws.com")
            .expect("service origin");
        assert_eq!(origin.domain_name, "events-alb-123.elb.amazonaws.com");
        assert!(
            plan.behaviors
                .iter()
                .any(|b| b.target_origin_id == origin.origin_id)
        );
    }

    #[test]
    fn sites_without_service_have_no_service_origin() {
        let plan = StaticSitePlan::new(&site(), "example.org", "us-east-1").unwrap();
        assert!(plan.service_origin("unused.elb.amazonaws.com").is_none());
    }

    #[test]
    fn sites_without_service_have_no_port_injected() {
        let plan = StaticSitePlan::new(&site(), "example.org", "us-east-1").unwrap();
        assert!(plan.service.is_none());
        assert!(plan.environment.iter().all(|v| v.name != "PORT"));
    }

    #[test]
    fn records_cover_every_domain() {
        let plan = StaticSitePlan::new(&site(), "example.org", "us-east-1").unwrap();
        let records = plan
            .records(&DistributionEndpoint {
                domain_name: "d1.cloudfront.net".to_string(),
                hosted_zone_id: "Z2FDTNDATAQYW2".to_string(),
            })
            .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].zone, "example.org");
        assert_eq!(records[1].zone, "example.io");
    }

    #[test]
    fn listener_rule_forwards_all_domains() {
        let plan = StaticSitePlan::new(&site(), "example.org", "us-east-1").unwrap();
        let rule = plan.listener_rule("arn:listener", "arn:target-group");
        assert_eq!(rule.name, "events-listener-rule");
    }

    #[test]
    fn invalid_proxy_endpoint_fails_the_plan() {
        let mut proxy = IndexMap::new();
        proxy.insert("/x/*".to_string(), ProxyOrigin::Simple("ftp://files".to_string()));
        let config = SiteConfig::new("events").with_content_proxy(proxy);

        assert!(StaticSitePlan::new(&config, "example.org", "us-east-1").is_err());
    }
}
