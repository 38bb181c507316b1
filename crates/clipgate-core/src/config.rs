//! Configuration module
//!
//! Configuration structures for the gateway: server basics, the streaming
//! backend connection, token signing, and the upload worker pool. Everything
//! is read once at startup from the environment and never mutated.

use std::env;

// Common constants
const SERVER_PORT: u16 = 4000;
const TOKEN_VALIDITY_SECS: u64 = 3600;
const UPLOAD_AUTH_VALIDITY_SECS: u64 = 600;
const UPLOAD_CHUNK_SIZE_BYTES: usize = 5 * 1024 * 1024;
const UPLOAD_MAX_CONCURRENT: usize = 2;
const UPLOAD_QUEUE_SIZE: usize = 1000;
const MAX_VIDEO_SIZE_MB: usize = 500;
const STREAM_REQUEST_TIMEOUT_SECS: u64 = 30;
const STREAM_API_BASE_URL: &str = "https://video.bunnycdn.com/library";
const STREAM_TUS_UPLOAD_URL: &str = "https://video.bunnycdn.com/tusupload";

/// Base configuration shared by every part of the service
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
}

/// Streaming backend connection configuration
#[derive(Clone, Debug)]
pub struct StreamConfig {
    /// Collection base, `{base}/{library_id}/videos` is the video collection.
    pub api_base_url: String,
    /// Resumable upload session-creation endpoint.
    pub tus_upload_url: String,
    pub library_id: String,
    pub api_key: String,
    pub request_timeout_secs: u64,
}

/// Token signing configuration
#[derive(Clone, Debug)]
pub struct SigningConfig {
    /// Hostname of the CDN zone serving playback assets.
    pub cdn_hostname: String,
    /// Shared secret the CDN edge verifies playback tokens against.
    pub security_key: String,
    pub token_validity_secs: u64,
    /// Validity window of per-upload authorization signatures. Short on
    /// purpose; a fresh signature is derived for every attempt.
    pub upload_auth_validity_secs: u64,
}

/// Upload worker pool configuration
#[derive(Clone, Debug)]
pub struct UploadConfig {
    pub chunk_size_bytes: usize,
    pub max_concurrent: usize,
    pub queue_size: usize,
    pub max_video_size_bytes: usize,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub base: BaseConfig,
    pub stream: StreamConfig,
    pub signing: SigningConfig,
    pub upload: UploadConfig,
}

impl Config {
    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.base.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        let base = BaseConfig {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            cors_origins,
            environment,
        };

        let stream = StreamConfig {
            api_base_url: env::var("STREAM_API_BASE_URL")
                .unwrap_or_else(|_| STREAM_API_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            tus_upload_url: env::var("STREAM_TUS_UPLOAD_URL")
                .unwrap_or_else(|_| STREAM_TUS_UPLOAD_URL.to_string()),
            library_id: env::var("STREAM_LIBRARY_ID")
                .map_err(|_| anyhow::anyhow!("STREAM_LIBRARY_ID must be set"))?,
            api_key: env::var("STREAM_API_KEY")
                .map_err(|_| anyhow::anyhow!("STREAM_API_KEY must be set"))?,
            request_timeout_secs: env::var("STREAM_REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|_| STREAM_REQUEST_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(STREAM_REQUEST_TIMEOUT_SECS),
        };

        let signing = SigningConfig {
            cdn_hostname: env::var("CDN_HOSTNAME")
                .map_err(|_| anyhow::anyhow!("CDN_HOSTNAME must be set"))?,
            security_key: env::var("TOKEN_SECURITY_KEY")
                .map_err(|_| anyhow::anyhow!("TOKEN_SECURITY_KEY must be set"))?,
            token_validity_secs: env::var("TOKEN_VALIDITY_SECS")
                .unwrap_or_else(|_| TOKEN_VALIDITY_SECS.to_string())
                .parse()
                .unwrap_or(TOKEN_VALIDITY_SECS),
            upload_auth_validity_secs: env::var("UPLOAD_AUTH_VALIDITY_SECS")
                .unwrap_or_else(|_| UPLOAD_AUTH_VALIDITY_SECS.to_string())
                .parse()
                .unwrap_or(UPLOAD_AUTH_VALIDITY_SECS),
        };

        let upload = UploadConfig {
            chunk_size_bytes: env::var("UPLOAD_CHUNK_SIZE_BYTES")
                .unwrap_or_else(|_| UPLOAD_CHUNK_SIZE_BYTES.to_string())
                .parse()
                .unwrap_or(UPLOAD_CHUNK_SIZE_BYTES),
            max_concurrent: env::var("UPLOAD_MAX_CONCURRENT")
                .unwrap_or_else(|_| UPLOAD_MAX_CONCURRENT.to_string())
                .parse()
                .unwrap_or(UPLOAD_MAX_CONCURRENT)
                .max(1),
            queue_size: env::var("UPLOAD_QUEUE_SIZE")
                .unwrap_or_else(|_| UPLOAD_QUEUE_SIZE.to_string())
                .parse()
                .unwrap_or(UPLOAD_QUEUE_SIZE)
                .max(1),
            max_video_size_bytes: env::var("MAX_VIDEO_SIZE_MB")
                .unwrap_or_else(|_| MAX_VIDEO_SIZE_MB.to_string())
                .parse::<usize>()
                .unwrap_or(MAX_VIDEO_SIZE_MB)
                * 1024
                * 1024,
        };

        Ok(Config {
            base,
            stream,
            signing,
            upload,
        })
    }

    /// Fail fast on configuration that cannot work. Signing inputs are
    /// checked here, at startup, so signing itself stays infallible.
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.is_production() && self.base.cors_origins.iter().any(|o| o.trim() == "*") {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }
        if self.stream.library_id.trim().is_empty() {
            return Err(anyhow::anyhow!("STREAM_LIBRARY_ID cannot be empty"));
        }
        if self.stream.api_key.trim().is_empty() {
            return Err(anyhow::anyhow!("STREAM_API_KEY cannot be empty"));
        }
        if self.signing.security_key.trim().is_empty() {
            return Err(anyhow::anyhow!("TOKEN_SECURITY_KEY cannot be empty"));
        }
        if self.signing.cdn_hostname.trim().is_empty()
            || self.signing.cdn_hostname.contains('/')
        {
            return Err(anyhow::anyhow!(
                "CDN_HOSTNAME must be a bare hostname, got '{}'",
                self.signing.cdn_hostname
            ));
        }
        if self.signing.token_validity_secs == 0 {
            return Err(anyhow::anyhow!("TOKEN_VALIDITY_SECS must be greater than 0"));
        }
        if self.signing.upload_auth_validity_secs == 0 {
            return Err(anyhow::anyhow!(
                "UPLOAD_AUTH_VALIDITY_SECS must be greater than 0"
            ));
        }
        if self.upload.chunk_size_bytes == 0 {
            return Err(anyhow::anyhow!(
                "UPLOAD_CHUNK_SIZE_BYTES must be greater than 0"
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            base: BaseConfig {
                server_port: 4000,
                cors_origins: vec!["*".to_string()],
                environment: "development".to_string(),
            },
            stream: StreamConfig {
                api_base_url: "https://video.bunnycdn.com/library".to_string(),
                tus_upload_url: "https://video.bunnycdn.com/tusupload".to_string(),
                library_id: "42".to_string(),
                api_key: "api-key".to_string(),
                request_timeout_secs: 30,
            },
            signing: SigningConfig {
                cdn_hostname: "vz-test.b-cdn.net".to_string(),
                security_key: "secret".to_string(),
                token_validity_secs: 3600,
                upload_auth_validity_secs: 600,
            },
            upload: UploadConfig {
                chunk_size_bytes: 5 * 1024 * 1024,
                max_concurrent: 2,
                queue_size: 1000,
                max_video_size_bytes: 500 * 1024 * 1024,
            },
        }
    }

    #[test]
    fn valid_development_config_passes() {
        assert!(test_config().validate().is_ok());
    }

    #[test]
    fn production_rejects_wildcard_cors() {
        let mut config = test_config();
        config.base.environment = "production".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn empty_security_key_is_rejected() {
        let mut config = test_config();
        config.signing.security_key = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn cdn_hostname_must_be_bare() {
        let mut config = test_config();
        config.signing.cdn_hostname = "https://vz-test.b-cdn.net".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_validity_windows_are_rejected() {
        let mut config = test_config();
        config.signing.token_validity_secs = 0;
        assert!(config.validate().is_err());

        let mut config = test_config();
        config.signing.upload_auth_validity_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn is_production_matches_both_spellings() {
        let mut config = test_config();
        assert!(!config.is_production());
        config.base.environment = "Production".to_string();
        assert!(config.is_production());
        config.base.environment = "prod".to_string();
        assert!(config.is_production());
    }
}
