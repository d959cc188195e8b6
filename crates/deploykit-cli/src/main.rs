// # deploykit - manifest compiler
//
// Thin integration layer over deploykit-core and deploykit-aws: it reads a
// site configuration file, compiles the static-site plan, and writes the
// resulting manifest JSON for the infrastructure engine to apply. No
// deployment logic lives here.
//
// ## Configuration
//
// All configuration is done via environment variables:
//
// - `DEPLOYKIT_CONFIG`: Path to the site configuration JSON (required)
// - `DEPLOYKIT_TLD`: Top-level domain sites are served under (required)
// - `DEPLOYKIT_PUBLIC_TLD`: TLD used by sites with `use_public_tld`
//   (defaults to `DEPLOYKIT_TLD`)
// - `DEPLOYKIT_REGION`: AWS region for bucket website endpoints
//   (default: us-east-1)
// - `DEPLOYKIT_OUTPUT`: Manifest output path (default: stdout)
// - `DEPLOYKIT_LOG_LEVEL`: Log level (default: info)
//
// ## Example
//
// ```bash
// export DEPLOYKIT_CONFIG=./site.json
// export DEPLOYKIT_TLD=example.org
// export DEPLOYKIT_OUTPUT=./manifest.json
//
// deploykit
// ```

use anyhow::{Context, Result};
use deploykit_aws::StaticSitePlan;
use deploykit_core::SiteConfig;
use std::env;
use std::fs;
use std::process::ExitCode;
use std::str::FromStr;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Manifest written
/// - 1: Configuration error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum DeploykitExitCode {
    /// Manifest compiled and written
    Success = 0,
    /// Configuration error
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<DeploykitExitCode> for ExitCode {
    fn from(code: DeploykitExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Application configuration
struct Config {
    config_path: String,
    tld: String,
    public_tld: Option<String>,
    region: String,
    output: Option<String>,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Ok(Self {
            config_path: env::var("DEPLOYKIT_CONFIG")
                .context("DEPLOYKIT_CONFIG must point to the site configuration file")?,
            tld: env::var("DEPLOYKIT_TLD")
                .context("DEPLOYKIT_TLD must name the top-level domain")?,
            public_tld: env::var("DEPLOYKIT_PUBLIC_TLD").ok(),
            region: env::var("DEPLOYKIT_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
            output: env::var("DEPLOYKIT_OUTPUT").ok(),
            log_level: env::var("DEPLOYKIT_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        if self.tld.is_empty() || !self.tld.contains('.') {
            anyhow::bail!("DEPLOYKIT_TLD is not a domain: {:?}", self.tld);
        }

        if let Some(public_tld) = &self.public_tld {
            if public_tld.is_empty() || !public_tld.contains('.') {
                anyhow::bail!("DEPLOYKIT_PUBLIC_TLD is not a domain: {public_tld:?}");
            }
        }

        Level::from_str(&self.log_level)
            .map_err(|_| anyhow::anyhow!("Invalid DEPLOYKIT_LOG_LEVEL: {}", self.log_level))?;

        Ok(())
    }

    /// TLD to use for a given site
    fn tld_for(&self, site: &SiteConfig) -> &str {
        if site.use_public_tld {
            self.public_tld.as_deref().unwrap_or(&self.tld)
        } else {
            &self.tld
        }
    }
}

/// Load and parse the site configuration file
fn load_site_config(path: &str) -> Result<SiteConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read site configuration: {path}"))?;
    let config: SiteConfig = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse site configuration: {path}"))?;
    Ok(config)
}

/// Compile the plan and write the manifest
fn run(config: &Config) -> Result<()> {
    let site = load_site_config(&config.config_path)?;
    info!(site = %site.name, "Loaded site configuration");

    let plan = StaticSitePlan::new(&site, config.tld_for(&site), &config.region)?;
    let manifest = serde_json::to_string_pretty(&plan)?;

    match &config.output {
        Some(path) => {
            fs::write(path, manifest)
                .with_context(|| format!("Failed to write manifest: {path}"))?;
            info!(path = %path, "Manifest written");
        }
        None => println!("{manifest}"),
    }

    Ok(())
}

fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Configuration error: {err:#}");
            return DeploykitExitCode::ConfigError.into();
        }
    };

    if let Err(err) = config.validate() {
        eprintln!("Configuration error: {err:#}");
        return DeploykitExitCode::ConfigError.into();
    }

    let level = Level::from_str(&config.log_level).unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("Failed to initialize logging");
        return DeploykitExitCode::RuntimeError.into();
    }

    match run(&config) {
        Ok(()) => DeploykitExitCode::Success.into(),
        Err(err) => {
            error!("Manifest compilation failed: {err:#}");
            DeploykitExitCode::ConfigError.into()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn cli_config(config_path: &str, output: Option<String>) -> Config {
        Config {
            config_path: config_path.to_string(),
            tld: "example.org".to_string(),
            public_tld: Some("example.net".to_string()),
            region: "us-east-1".to_string(),
            output,
            log_level: "info".to_string(),
        }
    }

    #[test]
    fn loads_and_compiles_a_site_configuration() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "name": "events",
                "redirects": {{ "/agora/*": "/dao/" }}
            }}"#
        )
        .unwrap();

        let site = load_site_config(file.path().to_str().unwrap()).unwrap();
        assert_eq!(site.name, "events");
        assert_eq!(site.routing_rules().len(), 1);
    }

    #[test]
    fn missing_configuration_file_is_an_error() {
        assert!(load_site_config("/nonexistent/site.json").is_err());
    }

    #[test]
    fn run_writes_the_manifest_to_the_output_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "name": "events" }}"#).unwrap();
        let out = tempfile::NamedTempFile::new().unwrap();
        let out_path = out.path().to_str().unwrap().to_string();

        let config = cli_config(file.path().to_str().unwrap(), Some(out_path.clone()));
        run(&config).unwrap();

        let manifest: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&out_path).unwrap()).unwrap();
        assert_eq!(manifest["service_domain"], "events.example.org");
        assert_eq!(manifest["bucket"]["name"], "events-website");
    }

    #[test]
    fn public_tld_applies_only_when_requested() {
        let config = cli_config("unused", None);

        let mut site = SiteConfig::new("events");
        assert_eq!(config.tld_for(&site), "example.org");

        site.use_public_tld = true;
        assert_eq!(config.tld_for(&site), "example.net");
    }

    #[test]
    fn validate_rejects_bare_tld() {
        let mut config = cli_config("unused", None);
        config.tld = "org".to_string();
        assert!(config.validate().is_err());
    }
}
