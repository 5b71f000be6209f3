//! Configuration module
//!
//! Configuration structures for the API service: server, authentication,
//! metadata store, object store and media tooling settings.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{DEFAULT_MAX_VIDEO_SIZE_BYTES, SIGNED_URL_TTL};
use crate::storage_types::{MetadataBackend, StorageBackend};

const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const SERVER_PORT: u16 = 8091;
const MEDIA_TOOL_TIMEOUT_SECS: u64 = 600;

/// Log output format for the tracing subscriber
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

/// Server-level settings
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub jwt_secret: String,
    pub environment: String,
    pub log_format: LogFormat,
}

/// Video service configuration
#[derive(Clone, Debug)]
pub struct ServiceConfig {
    pub base: BaseConfig,
    // Metadata store
    pub metadata_backend: MetadataBackend,
    pub database_url: Option<String>,
    // Object store
    pub storage_backend: StorageBackend,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (MinIO etc.)
    pub aws_region: Option<String>,
    pub local_storage_path: Option<String>,
    pub media_base_url: Option<String>,
    pub media_signing_secret: Option<String>,
    pub signed_url_ttl_secs: u64,
    // Ingestion
    pub max_video_size_bytes: u64,
    pub staging_dir: Option<String>,
    pub ffprobe_path: String,
    pub ffmpeg_path: String,
    pub media_tool_timeout_secs: u64,
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

    pub fn server_port(&self) -> u16 {
        self.as_service().base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.as_service().base.cors_origins
    }

    pub fn db_max_connections(&self) -> u32 {
        self.as_service().base.db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.as_service().base.db_timeout_seconds
    }

    pub fn jwt_secret(&self) -> &str {
        &self.as_service().base.jwt_secret
    }

    pub fn environment(&self) -> &str {
        &self.as_service().base.environment
    }

    pub fn log_format(&self) -> LogFormat {
        self.as_service().base.log_format
    }

    pub fn metadata_backend(&self) -> MetadataBackend {
        self.as_service().metadata_backend
    }

    pub fn database_url(&self) -> Option<&str> {
        self.as_service().database_url.as_deref()
    }

    pub fn storage_backend(&self) -> StorageBackend {
        self.as_service().storage_backend
    }

    pub fn s3_bucket(&self) -> Option<&str> {
        self.as_service().s3_bucket.as_deref()
    }

    pub fn s3_region(&self) -> Option<&str> {
        self.as_service().s3_region.as_deref()
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.as_service().s3_endpoint.as_deref()
    }

    pub fn aws_region(&self) -> Option<&str> {
        self.as_service().aws_region.as_deref()
    }

    pub fn local_storage_path(&self) -> Option<&str> {
        self.as_service().local_storage_path.as_deref()
    }

    pub fn media_base_url(&self) -> Option<&str> {
        self.as_service().media_base_url.as_deref()
    }

    /// Secret for local/memory signed URLs; falls back to the JWT secret.
    pub fn media_signing_secret(&self) -> &str {
        self.as_service()
            .media_signing_secret
            .as_deref()
            .unwrap_or(&self.as_service().base.jwt_secret)
    }

    pub fn signed_url_ttl(&self) -> Duration {
        Duration::from_secs(self.as_service().signed_url_ttl_secs)
    }

    pub fn max_video_size_bytes(&self) -> u64 {
        self.as_service().max_video_size_bytes
    }

    /// Directory for staged and remuxed scratch files.
    pub fn staging_dir(&self) -> PathBuf {
        self.as_service()
            .staging_dir
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(env::temp_dir)
    }

    pub fn ffprobe_path(&self) -> &str {
        &self.as_service().ffprobe_path
    }

    pub fn ffmpeg_path(&self) -> &str {
        &self.as_service().ffmpeg_path
    }

    pub fn media_tool_timeout(&self) -> Duration {
        Duration::from_secs(self.as_service().media_tool_timeout_secs)
    }
}

fn is_production_name(environment: &str) -> bool {
    let environment = environment.to_lowercase();
    environment == "production" || environment == "prod"
}

/// Upload ceiling in bytes from a `MAX_VIDEO_SIZE_MB` value.
fn parse_max_video_size(raw: Option<&str>) -> Result<u64, anyhow::Error> {
    let Some(raw) = raw else {
        return Ok(DEFAULT_MAX_VIDEO_SIZE_BYTES);
    };
    let mb = raw
        .trim()
        .parse::<u64>()
        .map_err(|_| anyhow::anyhow!("MAX_VIDEO_SIZE_MB must be a whole number of megabytes"))?;
    mb.checked_mul(1024 * 1024)
        .ok_or_else(|| anyhow::anyhow!("MAX_VIDEO_SIZE_MB is too large"))
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

        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        let log_format = match env::var("LOG_FORMAT")
            .unwrap_or_else(|_| "compact".to_string())
            .to_lowercase()
            .as_str()
        {
            "json" => LogFormat::Json,
            _ => LogFormat::Compact,
        };

        let base = BaseConfig {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            cors_origins,
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| MAX_CONNECTIONS.to_string())
                .parse()
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: env::var("DB_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| CONNECTION_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            jwt_secret: env::var("JWT_SECRET")
                .map_err(|_| anyhow::anyhow!("JWT_SECRET must be set for authentication"))?,
            environment,
            log_format,
        };

        let metadata_backend = env::var("METADATA_BACKEND")
            .ok()
            .map(|s| s.parse::<MetadataBackend>())
            .transpose()?
            .unwrap_or(MetadataBackend::Postgres);

        let storage_backend = env::var("STORAGE_BACKEND")
            .ok()
            .map(|s| s.parse::<StorageBackend>())
            .transpose()?
            .unwrap_or(StorageBackend::S3);

        let max_video_size_bytes =
            parse_max_video_size(env::var("MAX_VIDEO_SIZE_MB").ok().as_deref())?;

        Ok(ServiceConfig {
            base,
            metadata_backend,
            database_url: env::var("DATABASE_URL").ok(),
            storage_backend,
            s3_bucket: env::var("S3_BUCKET").ok(),
            s3_region: env::var("S3_REGION").ok(),
            s3_endpoint: env::var("S3_ENDPOINT").ok(),
            aws_region: env::var("AWS_REGION").ok(),
            local_storage_path: env::var("LOCAL_STORAGE_PATH").ok(),
            media_base_url: env::var("MEDIA_BASE_URL").ok(),
            media_signing_secret: env::var("MEDIA_SIGNING_SECRET").ok(),
            signed_url_ttl_secs: env::var("SIGNED_URL_TTL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(SIGNED_URL_TTL.as_secs()),
            max_video_size_bytes,
            staging_dir: env::var("STAGING_DIR").ok(),
            ffprobe_path: env::var("FFPROBE_PATH").unwrap_or_else(|_| "ffprobe".to_string()),
            ffmpeg_path: env::var("FFMPEG_PATH").unwrap_or_else(|_| "ffmpeg".to_string()),
            media_tool_timeout_secs: env::var("MEDIA_TOOL_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(MEDIA_TOOL_TIMEOUT_SECS),
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.base.jwt_secret.len() < 32 {
            return Err(anyhow::anyhow!(
                "JWT_SECRET must be at least 32 characters long"
            ));
        }

        if self.max_video_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_VIDEO_SIZE_MB must be greater than zero"));
        }

        if self.signed_url_ttl_secs == 0 {
            return Err(anyhow::anyhow!(
                "SIGNED_URL_TTL_SECS must be greater than zero"
            ));
        }

        match self.metadata_backend {
            MetadataBackend::Postgres => match self.database_url.as_deref() {
                Some(url) if url.starts_with("postgres://") || url.starts_with("postgresql://") => {}
                _ => {
                    return Err(anyhow::anyhow!(
                        "DATABASE_URL must be a valid PostgreSQL connection string"
                    ))
                }
            },
            MetadataBackend::Memory => {
                if is_production_name(&self.base.environment) {
                    return Err(anyhow::anyhow!(
                        "METADATA_BACKEND=memory is not allowed in production"
                    ));
                }
            }
        }

        match self.storage_backend {
            StorageBackend::S3 => {
                if self.s3_bucket.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_BUCKET must be set when using S3 storage backend"
                    ));
                }
                if self.s3_region.is_none() && self.aws_region.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION must be set when using S3 storage backend"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.local_storage_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set when using local storage backend"
                    ));
                }
                if self.media_base_url.is_none() {
                    return Err(anyhow::anyhow!(
                        "MEDIA_BASE_URL must be set when using local storage backend"
                    ));
                }
            }
            StorageBackend::Memory => {
                if self.media_base_url.is_none() {
                    return Err(anyhow::anyhow!(
                        "MEDIA_BASE_URL must be set when using memory storage backend"
                    ));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> ServiceConfig {
        ServiceConfig {
            base: BaseConfig {
                server_port: 8091,
                cors_origins: vec!["*".to_string()],
                db_max_connections: 5,
                db_timeout_seconds: 5,
                jwt_secret: "a".repeat(32),
                environment: "test".to_string(),
                log_format: LogFormat::Compact,
            },
            metadata_backend: MetadataBackend::Memory,
            database_url: None,
            storage_backend: StorageBackend::Memory,
            s3_bucket: None,
            s3_region: None,
            s3_endpoint: None,
            aws_region: None,
            local_storage_path: None,
            media_base_url: Some("http://localhost:8091/media".to_string()),
            media_signing_secret: None,
            signed_url_ttl_secs: 900,
            max_video_size_bytes: DEFAULT_MAX_VIDEO_SIZE_BYTES,
            staging_dir: None,
            ffprobe_path: "ffprobe".to_string(),
            ffmpeg_path: "ffmpeg".to_string(),
            media_tool_timeout_secs: 60,
        }
    }

    #[test]
    fn test_validate_accepts_memory_backends_outside_production() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_short_jwt_secret() {
        let mut config = base_config();
        config.base.jwt_secret = "short".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_memory_metadata_in_production() {
        let mut config = base_config();
        config.base.environment = "production".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_requires_bucket_for_s3() {
        let mut config = base_config();
        config.storage_backend = StorageBackend::S3;
        config.aws_region = Some("us-east-1".to_string());
        assert!(config.validate().is_err());

        config.s3_bucket = Some("tubely-videos".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_requires_postgres_url() {
        let mut config = base_config();
        config.metadata_backend = MetadataBackend::Postgres;
        config.database_url = Some("mysql://localhost/tubely".to_string());
        assert!(config.validate().is_err());

        config.database_url = Some("postgres://localhost/tubely".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_signing_secret_falls_back_to_jwt_secret() {
        let config = Config(Box::new(base_config()));
        assert_eq!(config.media_signing_secret(), config.jwt_secret());
        assert_eq!(config.signed_url_ttl(), Duration::from_secs(900));
    }

    #[test]
    fn test_max_video_size_parsing() {
        assert_eq!(
            parse_max_video_size(None).unwrap(),
            DEFAULT_MAX_VIDEO_SIZE_BYTES
        );
        assert_eq!(parse_max_video_size(Some("2")).unwrap(), 2 * 1024 * 1024);
        assert!(parse_max_video_size(Some("1GB")).is_err());
        assert!(parse_max_video_size(Some("")).is_err());
        assert!(parse_max_video_size(Some(&u64::MAX.to_string())).is_err());
    }
}
