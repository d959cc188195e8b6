// # deploykit-aws
//
// AWS desired-state declaration builders for deploykit.
//
// Every function in this crate produces plain, serializable resource
// declarations. Nothing here talks to an API: the emitted manifest is
// handed to an infrastructure-as-code engine that owns diffing, ordering,
// and applying changes against live cloud accounts.
//
// - **s3**: Content buckets with website hosting and routing rules
// - **cloudfront**: Distribution origins and cache behaviors
// - **alb**: Load balancer listener rules
// - **route53**: Alias records for distributions and load balancers
// - **iam**: Policy documents and service users
// - **plan**: Assembles a full static-site plan from a `SiteConfig`

pub mod alb;
pub mod cloudfront;
pub mod iam;
pub mod plan;
pub mod route53;
pub mod s3;

pub use plan::StaticSitePlan;
