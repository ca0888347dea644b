//! Configuration validation
//!
//! Validates critical configuration values at startup to catch misconfigurations early.

use anyhow::Result;
use mediahub_core::Config;

/// Validate critical configuration values
///
/// Runs the field checks from [`Config::validate`] and then the checks that depend
/// on how the HTTP layer uses the values.
pub fn validate_config(config: &Config) -> Result<()> {
    config.validate()?;

    let is_production = config.is_production();

    // Validate CORS configuration in production
    if is_production && config.cors_origins().iter().any(|o| o == "*") {
        return Err(anyhow::anyhow!(
            "CORS configured to allow all origins (*) in production - this is a security risk. \
            Please set specific allowed origins via CORS_ORIGINS environment variable."
        ));
    }

    // Empty keys in production are already rejected by `Config::validate`
    if config.api_keys().is_empty() {
        tracing::warn!("API_KEYS is empty - every protected route will answer 401");
    }

    if config.base_url().is_none() {
        tracing::warn!("BASE_URL not set - response URLs are built from the request Host header");
    }

    if config.http_concurrency_limit() == 0 {
        return Err(anyhow::anyhow!("HTTP concurrency limit cannot be 0"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mediahub_core::{BaseConfig, ServiceConfig};
    use std::path::PathBuf;

    fn config(environment: &str, cors: &str) -> Config {
        Config(Box::new(ServiceConfig {
            base: BaseConfig {
                server_port: 3000,
                cors_origins: vec![cors.to_string()],
                environment: environment.to_string(),
                http_concurrency_limit: 8,
                api_keys: vec!["key".to_string()],
            },
            uploads_dir: PathBuf::from("./uploads"),
            base_url: None,
            ffmpeg_path: None,
            transcode_timeout_secs: None,
            max_upload_size_bytes: 1024,
            default_image_quality: 80,
        }))
    }

    #[test]
    fn test_wildcard_cors_rejected_in_production() {
        assert!(validate_config(&config("production", "*")).is_err());
        assert!(validate_config(&config("production", "https://app.example.com")).is_ok());
        assert!(validate_config(&config("development", "*")).is_ok());
    }

    #[test]
    fn test_empty_api_keys_only_fatal_in_production() {
        let mut prod = config("production", "https://app.example.com");
        prod.0.base.api_keys.clear();
        assert!(validate_config(&prod).is_err());

        let mut dev = config("development", "*");
        dev.0.base.api_keys.clear();
        assert!(validate_config(&dev).is_ok());
    }
}
