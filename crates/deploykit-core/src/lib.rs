// # deploykit-core
//
// Core library for the deploykit deployment toolkit.
//
// ## Architecture Overview
//
// This library provides the pure, declaration-building half of deploykit:
// - **redirect**: Compiles a redirect map into static-website routing rules
// - **config**: Site configuration (redirects, proxies, service settings)
// - **naming**: Service naming, slugs, stack scoping, version resolution
// - **vars**: Environment variable assembly for deployed services
//
// ## Design Principles
//
// 1. **Pure Transforms**: Every function here maps inputs to declarations;
//    no I/O, no cloud API calls, no hidden state
// 2. **Permissive Compilation**: Malformed redirect entries degrade to
//    missing rules, never to failed deployments
// 3. **Library-First**: The CLI is a thin layer over this crate

pub mod config;
pub mod error;
pub mod naming;
pub mod redirect;
pub mod vars;

// Re-export core types for convenience
pub use config::{ProxyOrigin, SiteConfig, Team};
pub use error::{Error, Result};
pub use redirect::{Protocol, RedirectOptions, RoutingRule, routing_rules};
pub use vars::EnvVar;
