//! IAM policy documents and service users
//!
//! Policy documents serialize to the AWS policy JSON shape (`Version`,
//! `Statement`, PascalCase fields) so they can be embedded verbatim in the
//! emitted manifest.

use deploykit_core::naming::slug;
use serde::{Deserialize, Serialize};

/// Policy language version used for every generated document
const POLICY_VERSION: &str = "2012-10-17";

/// An IAM policy document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    /// Policy language version
    pub version: String,

    /// Policy statements
    pub statement: Vec<Statement>,
}

impl PolicyDocument {
    /// Create a policy document from statements
    pub fn new(statement: Vec<Statement>) -> Self {
        Self {
            version: POLICY_VERSION.to_string(),
            statement,
        }
    }
}

/// One policy statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Statement {
    /// Allow or deny
    pub effect: Effect,

    /// Who the statement applies to, when stated explicitly
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub principal: Option<Principal>,

    /// Granted or denied actions
    pub action: Vec<String>,

    /// Resources the statement covers
    pub resource: Vec<String>,
}

/// Statement effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    /// Grant the listed actions
    Allow,
    /// Deny the listed actions
    Deny,
}

/// Statement principal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Principal {
    /// Anyone (`"*"`)
    Any(String),

    /// Specific AWS principals by ARN
    Aws {
        /// Principal ARNs
        #[serde(rename = "AWS")]
        aws: Vec<String>,
    },
}

impl Principal {
    /// The anonymous principal
    pub fn any() -> Self {
        Principal::Any("*".to_string())
    }

    /// A single AWS principal
    pub fn aws(arn: impl Into<String>) -> Self {
        Principal::Aws {
            aws: vec![arn.into()],
        }
    }
}

/// Declaration of a service user with its access key and role
///
/// The key id/secret produced when the engine applies this declaration are
/// what gets injected into the service as AWS credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceUserSpec {
    /// IAM user name
    pub user_name: String,

    /// Access key resource name
    pub access_key_name: String,

    /// Role resource name
    pub role_name: String,
}

/// Canonical user name for a service
///
/// Kept in one place so every resource derived for the same service agrees
/// on the user name.
pub fn user_name(service: &str) -> String {
    format!("{}-user", slug(service))
}

/// Declare the user, access key, and role backing a service
pub fn service_user(service: &str) -> ServiceUserSpec {
    let name = user_name(service);
    ServiceUserSpec {
        access_key_name: format!("{name}-key"),
        role_name: format!("{name}-role"),
        user_name: name,
    }
}

/// Assume-role policy allowing a user principal to assume the role
pub fn assume_role_policy(user_arn: &str) -> PolicyDocument {
    PolicyDocument::new(vec![Statement {
        effect: Effect::Allow,
        principal: Some(Principal::aws(user_arn)),
        action: vec!["sts:AssumeRole".to_string()],
        resource: vec!["*".to_string()],
    }])
}

/// Bucket policy granting anonymous read access to all objects
pub fn public_read_policy(bucket: &str) -> PolicyDocument {
    PolicyDocument::new(vec![Statement {
        effect: Effect::Allow,
        principal: Some(Principal::any()),
        action: vec!["s3:GetObject".to_string()],
        resource: vec![format!("arn:aws:s3:::{bucket}/*")],
    }])
}

/// Bucket policy granting public reads plus full control to one user
///
/// The user gets every `s3:*` action over both the bucket and its objects;
/// everyone else can only read objects.
pub fn bucket_access_policy(user_arn: &str, bucket: &str) -> PolicyDocument {
    PolicyDocument::new(vec![
        Statement {
            effect: Effect::Allow,
            principal: Some(Principal::any()),
            action: vec!["s3:GetObject".to_string()],
            resource: vec![format!("arn:aws:s3:::{bucket}/*")],
        },
        Statement {
            effect: Effect::Allow,
            principal: Some(Principal::aws(user_arn)),
            action: vec!["s3:*".to_string()],
            resource: vec![
                format!("arn:aws:s3:::{bucket}"),
                format!("arn:aws:s3:::{bucket}/*"),
            ],
        },
    ])
}

/// Policy granting unrestricted email sending through SES
pub fn email_send_policy() -> PolicyDocument {
    PolicyDocument::new(vec![Statement {
        effect: Effect::Allow,
        principal: None,
        action: vec!["ses:*".to_string()],
        resource: vec!["*".to_string()],
    }])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_name_is_slugged() {
        assert_eq!(user_name("my service"), "my-service-user");
    }

    #[test]
    fn service_user_names_derive_from_user_name() {
        let spec = service_user("dapp");
        assert_eq!(spec.user_name, "dapp-user");
        assert_eq!(spec.access_key_name, "dapp-user-key");
        assert_eq!(spec.role_name, "dapp-user-role");
    }

    #[test]
    fn public_read_policy_serializes_to_aws_shape() {
        let json = serde_json::to_value(public_read_policy("my-bucket")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "Version": "2012-10-17",
                "Statement": [
                    {
                        "Effect": "Allow",
                        "Principal": "*",
                        "Action": ["s3:GetObject"],
                        "Resource": ["arn:aws:s3:::my-bucket/*"]
                    }
                ]
            })
        );
    }

    #[test]
    fn assume_role_policy_serializes_to_aws_shape() {
        let json = serde_json::to_value(assume_role_policy("arn:aws:iam::123:user/dapp-user")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "Version": "2012-10-17",
                "Statement": [
                    {
                        "Effect": "Allow",
                        "Principal": { "AWS": ["arn:aws:iam::123:user/dapp-user"] },
                        "Action": ["sts:AssumeRole"],
                        "Resource": ["*"]
                    }
                ]
            })
        );
    }

    #[test]
    fn email_send_policy_has_no_principal() {
        let json = serde_json::to_value(email_send_policy()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "Version": "2012-10-17",
                "Statement": [
                    {
                        "Effect": "Allow",
                        "Action": ["ses:*"],
                        "Resource": ["*"]
                    }
                ]
            })
        );
    }

    #[test]
    fn bucket_access_policy_grants_user_full_control() {
        let doc = bucket_access_policy("arn:aws:iam::123:user/dapp-user", "my-bucket");
        assert_eq!(doc.statement.len(), 2);
        assert_eq!(
            doc.statement[1].principal,
            Some(Principal::aws("arn:aws:iam::123:user/dapp-user"))
        );
        assert_eq!(doc.statement[1].action, vec!["s3:*"]);
        assert_eq!(
            doc.statement[1].resource,
            vec!["arn:aws:s3:::my-bucket", "arn:aws:s3:::my-bucket/*"]
        );
    }
}
