//! Load balancer listener rule declarations

use serde::{Deserialize, Serialize};

/// Condition matched against incoming requests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleCondition {
    /// Match on the request's Host header
    HostHeader {
        /// Accepted host values
        values: Vec<String>,
    },
}

/// Action taken when a rule matches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuleAction {
    /// Forward the request to a target group
    Forward {
        /// Target group ARN
        target_group_arn: String,
    },
}

/// Desired state of a listener rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListenerRuleSpec {
    /// Rule resource name
    pub name: String,

    /// Listener the rule attaches to
    pub listener_arn: String,

    /// Match conditions
    pub conditions: Vec<RuleCondition>,

    /// Actions on match
    pub actions: Vec<RuleAction>,
}

/// Declare a rule forwarding requests for a set of hosts to a target group
pub fn host_forward_listener_rule(
    name: &str,
    listener_arn: &str,
    hosts: Vec<String>,
    target_group_arn: &str,
) -> ListenerRuleSpec {
    ListenerRuleSpec {
        name: name.to_string(),
        listener_arn: listener_arn.to_string(),
        conditions: vec![RuleCondition::HostHeader { values: hosts }],
        actions: vec![RuleAction::Forward {
            target_group_arn: target_group_arn.to_string(),
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_forwards_hosts_to_target_group() {
        let rule = host_forward_listener_rule(
            "site-rule",
            "arn:aws:elasticloadbalancing:listener/1",
            vec!["site.example.org".to_string(), "www.site.example.org".to_string()],
            "arn:aws:elasticloadbalancing:targetgroup/1",
        );

        assert_eq!(
            rule.conditions,
            vec![RuleCondition::HostHeader {
                values: vec![
                    "site.example.org".to_string(),
                    "www.site.example.org".to_string()
                ]
            }]
        );
        assert_eq!(
            rule.actions,
            vec![RuleAction::Forward {
                target_group_arn: "arn:aws:elasticloadbalancing:targetgroup/1".to_string()
            }]
        );
    }
}
