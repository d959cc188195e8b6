//! DNS alias record declarations
//!
//! Sites are exposed by pointing their domains at a distribution or a load
//! balancer through zone-apex-capable alias records. Both target kinds are
//! abstracted behind [`AliasTarget`] so routing code does not care which
//! one backs a domain.

use deploykit_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Anything an alias record can point at
pub trait AliasTarget {
    /// DNS name of the target
    fn domain_name(&self) -> &str;

    /// Hosted zone the target lives in
    fn hosted_zone_id(&self) -> &str;
}

/// A CDN distribution as an alias target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionEndpoint {
    /// Distribution domain name
    pub domain_name: String,

    /// Distribution hosted zone id
    pub hosted_zone_id: String,
}

impl AliasTarget for DistributionEndpoint {
    fn domain_name(&self) -> &str {
        &self.domain_name
    }

    fn hosted_zone_id(&self) -> &str {
        &self.hosted_zone_id
    }
}

/// A load balancer as an alias target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadBalancerEndpoint {
    /// Load balancer DNS name
    pub dns_name: String,

    /// Load balancer zone id
    pub zone_id: String,
}

impl AliasTarget for LoadBalancerEndpoint {
    fn domain_name(&self) -> &str {
        &self.dns_name
    }

    fn hosted_zone_id(&self) -> &str {
        &self.zone_id
    }
}

/// Alias half of a record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordAlias {
    /// Target DNS name
    pub name: String,

    /// Target hosted zone id
    pub zone_id: String,

    /// Whether resolution considers target health
    pub evaluate_target_health: bool,
}

/// Desired state of one DNS record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSpec {
    /// Fully qualified record name
    pub name: String,

    /// Zone the record belongs to
    pub zone: String,

    /// Record type
    pub record_type: String,

    /// Alias target
    pub aliases: Vec<RecordAlias>,
}

/// Derive the hosted zone name for a domain
///
/// Uses the last two labels, keeping a third when the second-level label is
/// three characters or shorter so zones like `example.co.uk` resolve
/// correctly. Not perfect for every registry, but covers the domains this
/// tooling manages.
pub fn zone_name(domain: &str) -> Result<String> {
    let parts: Vec<&str> = domain.split('.').collect();
    if parts.len() < 2 || parts.iter().any(|p| p.is_empty()) {
        return Err(Error::invalid_input(format!("Invalid domain name: {domain}")));
    }

    if parts.len() >= 3 && parts[parts.len() - 2].len() <= 3 {
        Ok(format!(
            "{}.{}.{}",
            parts[parts.len() - 3],
            parts[parts.len() - 2],
            parts[parts.len() - 1]
        ))
    } else {
        Ok(format!("{}.{}", parts[parts.len() - 2], parts[parts.len() - 1]))
    }
}

/// Declare an A-record alias pointing a domain at a target
pub fn alias_record(domain: &str, target: &impl AliasTarget) -> Result<RecordSpec> {
    Ok(RecordSpec {
        name: domain.to_string(),
        zone: zone_name(domain)?,
        record_type: "A".to_string(),
        aliases: vec![RecordAlias {
            name: target.domain_name().to_string(),
            zone_id: target.hosted_zone_id().to_string(),
            evaluate_target_health: false,
        }],
    })
}

/// Declare alias records for every domain of a site, in input order
pub fn route_to_target(domains: &[String], target: &impl AliasTarget) -> Result<Vec<RecordSpec>> {
    domains
        .iter()
        .map(|domain| alias_record(domain, target))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn distribution() -> DistributionEndpoint {
        DistributionEndpoint {
            domain_name: "d111111abcdef8.cloudfront.net".to_string(),
            hosted_zone_id: "Z2FDTNDATAQYW2".to_string(),
        }
    }

    #[test]
    fn zone_name_uses_last_two_labels() {
        assert_eq!(zone_name("events.example.org").unwrap(), "example.org");
        assert_eq!(zone_name("example.org").unwrap(), "example.org");
    }

    #[test]
    fn zone_name_keeps_short_second_level_domains() {
        assert_eq!(zone_name("deep.nested.example.co.uk").unwrap(), "example.co.uk");
    }

    #[test]
    fn zone_name_rejects_bare_labels() {
        assert!(zone_name("localhost").is_err());
        assert!(zone_name("trailing.").is_err());
    }

    #[test]
    fn alias_record_points_domain_at_target() {
        let record = alias_record("events.example.org", &distribution()).unwrap();
        assert_eq!(record.name, "events.example.org");
        assert_eq!(record.zone, "example.org");
        assert_eq!(record.record_type, "A");
        assert_eq!(record.aliases[0].name, "d111111abcdef8.cloudfront.net");
        assert!(!record.aliases[0].evaluate_target_health);
    }

    #[test]
    fn route_to_target_preserves_domain_order() {
        let domains = vec![
            "events.example.org".to_string(),
            "events.example.io".to_string(),
        ];
        let records = route_to_target(&domains, &distribution()).unwrap();
        let names: Vec<_> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["events.example.org", "events.example.io"]);
    }
}
