//! Request helpers shared by handlers.

pub mod upload;

use axum::http::{header, HeaderMap};
use mediahub_core::Config;

/// Origin prefixed to response URLs: `BASE_URL` when configured, else `https://{Host}`.
pub fn request_origin(config: &Config, headers: &HeaderMap) -> String {
    if let Some(base_url) = config.base_url() {
        return base_url.to_string();
    }
    let host = headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("localhost");
    format!("https://{}", host)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use mediahub_core::{BaseConfig, ServiceConfig};
    use std::path::PathBuf;

    fn config(base_url: Option<&str>) -> Config {
        Config(Box::new(ServiceConfig {
            base: BaseConfig {
                server_port: 3000,
                cors_origins: vec!["*".to_string()],
                environment: "development".to_string(),
                http_concurrency_limit: 8,
                api_keys: Vec::new(),
            },
            uploads_dir: PathBuf::from("./uploads"),
            base_url: base_url.map(str::to_string),
            ffmpeg_path: None,
            transcode_timeout_secs: None,
            max_upload_size_bytes: 1024,
            default_image_quality: 80,
        }))
    }

    #[test]
    fn test_origin_prefers_base_url() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("media.local:3000"));

        assert_eq!(
            request_origin(&config(Some("https://cdn.example.com")), &headers),
            "https://cdn.example.com"
        );
        assert_eq!(
            request_origin(&config(None), &headers),
            "https://media.local:3000"
        );
    }
}
