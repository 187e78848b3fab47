//! Application configuration management.
//!
//! Configuration is loaded from a YAML file with environment variable overrides. The configuration
//! file path defaults to `config.yaml` but can be specified via `-f` flag or `IMGCTL_CONFIG`
//! environment variable.
//!
//! ## Loading Priority
//!
//! Configuration sources are merged in the following order (later sources override earlier ones):
//!
//! 1. **YAML config file** - Base configuration (default: `config.yaml`)
//! 2. **Environment variables** - Variables prefixed with `IMGCTL_` override YAML values
//!
//! For nested config values, use double underscores in environment variables. For example,
//! `IMGCTL_LIMITS__MAX_UPLOAD_BYTES=1048576` sets the `limits.max_upload_bytes` field.
//!
//! ## Configuration Structure
//!
//! - **Server**: `host`, `port` - HTTP server binding configuration
//! - **Storage**: `data_dir` - root directory holding one subdirectory per category
//! - **Categories**: `categories` - the ordered category table; each entry names a category and
//!   optionally a cover-fit resize target. Entries without a `resize` block store uploads verbatim.
//! - **Limits**: `limits.max_upload_bytes` - upload body cap
//! - **Security**: `cors` - CORS settings for browser clients on other origins

use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

/// Simple CLI args - just for specifying config file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "IMGCTL_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate configuration and exit without starting the server.
    /// Useful for CI/CD pipelines to catch config errors before deployment.
    #[arg(long)]
    pub validate: bool,
}

/// Main application configuration.
///
/// This is the root configuration structure loaded from YAML and environment variables.
/// All fields have sensible defaults defined in the `Default` implementation.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTTP server host to bind to (e.g., "0.0.0.0" for all interfaces)
    pub host: String,
    /// HTTP server port to bind to
    pub port: u16,
    /// Root directory for stored images; each category owns one subdirectory
    pub data_dir: PathBuf,
    /// Ordered category table. The listing API reports categories in this order.
    pub categories: Vec<CategoryConfig>,
    /// Resource limits for protecting system capacity
    pub limits: LimitsConfig,
    /// CORS configuration for browser clients
    pub cors: CorsConfig,
}

/// One category and its resize behavior.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CategoryConfig {
    /// Category identifier; also the name of its directory under `data_dir`
    pub name: String,
    /// Cover-fit target size. When absent, uploads are stored byte-for-byte.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resize: Option<ResizeConfig>,
}

/// Cover-fit target dimensions.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ResizeConfig {
    pub width: u32,
    pub height: u32,
}

/// Resource limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct LimitsConfig {
    /// Maximum accepted upload body size in bytes (default: 25 MiB)
    pub max_upload_bytes: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: 25 * 1024 * 1024,
        }
    }
}

/// CORS (Cross-Origin Resource Sharing) configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CorsConfig {
    /// Allowed origins for CORS requests
    pub allowed_origins: Vec<CorsOrigin>,
    /// Allow credentials (cookies) in CORS requests
    pub allow_credentials: bool,
    /// Cache preflight requests for this many seconds
    pub max_age: Option<u64>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: Vec::new(),
            allow_credentials: false,
            max_age: Some(3600),
        }
    }
}

/// CORS origin specification.
///
/// Can be either a wildcard (`*`) to allow all origins, or a specific URL.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum CorsOrigin {
    /// Allow all origins (`*`)
    #[serde(deserialize_with = "parse_wildcard")]
    Wildcard,
    /// Specific origin URL (e.g., `https://app.example.com`)
    #[serde(deserialize_with = "parse_url")]
    Url(Url),
}

fn parse_wildcard<'de, D>(deserializer: D) -> Result<(), D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: String = Deserialize::deserialize(deserializer)?;
    if s == "*" {
        Ok(())
    } else {
        Err(serde::de::Error::custom("Expected '*'"))
    }
}

fn parse_url<'de, D>(deserializer: D) -> Result<Url, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: String = Deserialize::deserialize(deserializer)?;
    Url::parse(&s).map_err(serde::de::Error::custom)
}

/// The category table shipped as a default. Matches the site the manager was
/// built for: fixed-size slots for people, client logos, slider backdrops and
/// project shots, plus a free-form `logos` bucket stored verbatim.
fn default_categories() -> Vec<CategoryConfig> {
    let sized = |name: &str, width: u32, height: u32| CategoryConfig {
        name: name.to_string(),
        resize: Some(ResizeConfig { width, height }),
    };
    vec![
        sized("team", 600, 700),
        sized("clients", 200, 200),
        sized("slider", 1920, 1080),
        sized("Nos-projets", 576, 1280),
        CategoryConfig {
            name: "logos".to_string(),
            resize: None,
        },
    ]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            data_dir: PathBuf::from("./img"),
            categories: default_categories(),
            limits: LimitsConfig::default(),
            cors: CorsConfig::default(),
        }
    }
}

impl Config {
    #[allow(clippy::result_large_err)]
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        let config: Self = Self::figment(args).extract()?;
        config
            .validate()
            .map_err(|e| figment::Error::from(e.to_string()))?;
        Ok(config)
    }

    pub fn figment(args: &Args) -> Figment {
        Figment::new()
            // Load base config file
            .merge(Yaml::file(&args.config))
            // Environment variables can still override specific values
            .merge(Env::prefixed("IMGCTL_").split("__"))
    }

    /// Reject category tables the registry would refuse at startup
    fn validate(&self) -> anyhow::Result<()> {
        crate::registry::CategoryRegistry::new(&self.categories).map(|_| ())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Spool directory for in-flight uploads. Hidden under the data root so
    /// category listings never pick it up.
    pub fn spool_dir(&self) -> PathBuf {
        self.data_dir.join(".uploads")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.port, 3000);
        assert_eq!(config.categories.len(), 5);
        assert_eq!(config.categories[0].name, "team");
        assert!(config.categories[4].resize.is_none());
        assert_eq!(config.spool_dir(), PathBuf::from("./img/.uploads"));
    }

    #[test]
    fn test_categories_from_yaml() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "test.yaml",
                r#"
port: 8080
data_dir: /var/lib/imgctl
categories:
  - name: banners
    resize:
      width: 1200
      height: 300
  - name: raw
"#,
            )?;

            let args = Args {
                config: "test.yaml".to_string(),
                validate: false,
            };

            let config = Config::load(&args)?;

            assert_eq!(config.port, 8080);
            assert_eq!(config.categories.len(), 2);
            assert_eq!(
                config.categories[0].resize.as_ref().map(|r| (r.width, r.height)),
                Some((1200, 300))
            );
            assert!(config.categories[1].resize.is_none());
            Ok(())
        });
    }

    #[test]
    fn test_env_override() {
        Jail::expect_with(|jail| {
            jail.create_file("test.yaml", "port: 8080\n")?;
            jail.set_env("IMGCTL_PORT", "9090");
            jail.set_env("IMGCTL_LIMITS__MAX_UPLOAD_BYTES", "1024");

            let args = Args {
                config: "test.yaml".to_string(),
                validate: false,
            };

            let config = Config::load(&args)?;
            assert_eq!(config.port, 9090);
            assert_eq!(config.limits.max_upload_bytes, 1024);
            Ok(())
        });
    }

    #[test]
    fn test_duplicate_category_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "test.yaml",
                r#"
categories:
  - name: team
  - name: team
"#,
            )?;

            let args = Args {
                config: "test.yaml".to_string(),
                validate: false,
            };

            assert!(Config::load(&args).is_err());
            Ok(())
        });
    }

    #[test]
    fn test_zero_dimension_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "test.yaml",
                r#"
categories:
  - name: banners
    resize:
      width: 0
      height: 300
"#,
            )?;

            let args = Args {
                config: "test.yaml".to_string(),
                validate: false,
            };

            assert!(Config::load(&args).is_err());
            Ok(())
        });
    }
}
