//! Configuration module
//!
//! Configuration is read once from the environment at startup and passed explicitly
//! to every component afterwards. Nothing in here is mutated at runtime.

use std::env;
use std::path::PathBuf;

// Common constants
const SERVER_PORT: u16 = 3000;
const UPLOADS_DIR: &str = "./uploads";
const TRANSCODE_TIMEOUT_SECS: u64 = 600;
const MAX_UPLOAD_SIZE_MB: usize = 500;
const DEFAULT_IMAGE_QUALITY: u8 = 80;
const HTTP_CONCURRENCY_LIMIT: usize = 10_000;

/// Base HTTP server configuration
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
    pub http_concurrency_limit: usize,
    /// Bearer tokens accepted on protected routes
    pub api_keys: Vec<String>,
}

/// Media service configuration
#[derive(Clone, Debug)]
pub struct ServiceConfig {
    pub base: BaseConfig,
    pub uploads_dir: PathBuf,
    /// Absolute origin used when building response URLs. Falls back to the request host.
    pub base_url: Option<String>,
    /// Explicit encoder binary, checked before the well-known install locations
    pub ffmpeg_path: Option<String>,
    /// Upper bound for one encoder run. `None` disables the bound.
    pub transcode_timeout_secs: Option<u64>,
    pub max_upload_size_bytes: usize,
    pub default_image_quality: u8,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<ServiceConfig>);

impl Config {
    fn as_service(&self) -> &ServiceConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        is_production_name(&self.as_service().base.environment)
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = ServiceConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.as_service().validate()
    }

    // Convenience getters for common fields
    pub fn server_port(&self) -> u16 {
        self.as_service().base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.as_service().base.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.as_service().base.environment
    }

    pub fn http_concurrency_limit(&self) -> usize {
        self.as_service().base.http_concurrency_limit
    }

    pub fn api_keys(&self) -> &[String] {
        &self.as_service().base.api_keys
    }

    pub fn uploads_dir(&self) -> &PathBuf {
        &self.as_service().uploads_dir
    }

    pub fn base_url(&self) -> Option<&str> {
        self.as_service().base_url.as_deref()
    }

    pub fn ffmpeg_path(&self) -> Option<&str> {
        self.as_service().ffmpeg_path.as_deref()
    }

    pub fn transcode_timeout_secs(&self) -> Option<u64> {
        self.as_service().transcode_timeout_secs
    }

    pub fn max_upload_size_bytes(&self) -> usize {
        self.as_service().max_upload_size_bytes
    }

    pub fn default_image_quality(&self) -> u8 {
        self.as_service().default_image_quality
    }
}

/// `production` or `prod`, case-insensitive.
pub fn is_production_name(environment: &str) -> bool {
    let environment = environment.to_lowercase();
    environment == "production" || environment == "prod"
}

/// Split a comma-separated variable, trimming entries and dropping empty ones.
fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        if is_production_name(&environment) && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let base = BaseConfig {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            cors_origins: split_list(&cors_origins_str),
            environment,
            http_concurrency_limit: env::var("HTTP_CONCURRENCY_LIMIT")
                .ok()
                .and_then(|s| s.parse::<usize>().ok())
                .unwrap_or(HTTP_CONCURRENCY_LIMIT)
                .max(1),
            api_keys: split_list(&env::var("API_KEYS").unwrap_or_default()),
        };

        let max_upload_size_mb = env::var("MAX_UPLOAD_SIZE_MB")
            .unwrap_or_else(|_| MAX_UPLOAD_SIZE_MB.to_string())
            .parse::<usize>()
            .unwrap_or(MAX_UPLOAD_SIZE_MB);

        let transcode_timeout_secs = env::var("TRANSCODE_TIMEOUT_SECS")
            .unwrap_or_else(|_| TRANSCODE_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| anyhow::anyhow!("TRANSCODE_TIMEOUT_SECS must be a valid number"))?;

        let default_image_quality = env::var("DEFAULT_IMAGE_QUALITY")
            .unwrap_or_else(|_| DEFAULT_IMAGE_QUALITY.to_string())
            .parse::<u8>()
            .map_err(|_| anyhow::anyhow!("DEFAULT_IMAGE_QUALITY must be a number between 1 and 100"))?;

        Ok(ServiceConfig {
            base,
            uploads_dir: PathBuf::from(
                env::var("UPLOADS_DIR").unwrap_or_else(|_| UPLOADS_DIR.to_string()),
            ),
            base_url: env::var("BASE_URL")
                .ok()
                .map(|url| url.trim().trim_end_matches('/').to_string())
                .filter(|url| !url.is_empty()),
            ffmpeg_path: env::var("FFMPEG_PATH")
                .ok()
                .filter(|path| !path.trim().is_empty()),
            transcode_timeout_secs: (transcode_timeout_secs > 0).then_some(transcode_timeout_secs),
            max_upload_size_bytes: max_upload_size_mb * 1024 * 1024,
            default_image_quality,
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !(1..=100).contains(&self.default_image_quality) {
            return Err(anyhow::anyhow!(
                "DEFAULT_IMAGE_QUALITY must be between 1 and 100"
            ));
        }

        if self.max_upload_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_UPLOAD_SIZE_MB must be greater than 0"));
        }

        if let Some(base_url) = &self.base_url {
            if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
                return Err(anyhow::anyhow!(
                    "BASE_URL must start with http:// or https://"
                ));
            }
        }

        if is_production_name(&self.base.environment) && self.base.api_keys.is_empty() {
            return Err(anyhow::anyhow!(
                "API_KEYS must contain at least one key in production"
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> ServiceConfig {
        ServiceConfig {
            base: BaseConfig {
                server_port: 3000,
                cors_origins: vec!["*".to_string()],
                environment: "development".to_string(),
                http_concurrency_limit: 16,
                api_keys: vec!["secret".to_string()],
            },
            uploads_dir: PathBuf::from("./uploads"),
            base_url: None,
            ffmpeg_path: None,
            transcode_timeout_secs: Some(600),
            max_upload_size_bytes: 1024,
            default_image_quality: 80,
        }
    }

    #[test]
    fn test_split_list_drops_blanks() {
        assert_eq!(split_list(" a, b ,,c "), vec!["a", "b", "c"]);
        assert!(split_list("").is_empty());
    }

    #[test]
    fn test_validate_ok() {
        assert!(test_config().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_quality_out_of_range() {
        let mut config = test_config();
        config.default_image_quality = 0;
        assert!(config.validate().is_err());
        config.default_image_quality = 101;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_relative_base_url() {
        let mut config = test_config();
        config.base_url = Some("media.example.com".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_requires_api_keys_in_production() {
        let mut config = test_config();
        config.base.environment = "Production".to_string();
        config.base.api_keys.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_is_production() {
        let mut config = test_config();
        config.base.environment = "prod".to_string();
        assert!(Config(Box::new(config)).is_production());
    }
}
