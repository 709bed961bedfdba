//! Configuration module
//!
//! All environment access happens here, once, at startup. Components receive
//! the resulting `Config` (or the specific paths they need) through their
//! constructors and never reach into ambient process state themselves, which
//! keeps them testable with injected temporary directories.

use std::env;
use std::path::PathBuf;

const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const MAX_FILE_SIZE_MB: usize = 10;
const GALLERY_DEFAULT_LIMIT: i64 = 10;
const GALLERY_HARD_LIMIT: i64 = 100;

/// Application configuration shared by the API server and the CLI.
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    /// Directory original images are written to. Must exist; required.
    pub base_images_path: PathBuf,
    /// Directory thumbnails are written to. Optional: when unset, uploads
    /// proceed without thumbnails (thumbnail_path falls back to full_path).
    pub base_thumbnails_path: Option<PathBuf>,
    pub max_file_size_bytes: usize,
    /// Allowed `image/<subtype>` values for uploads.
    pub allowed_image_types: Vec<String>,
    pub gallery_default_limit: i64,
    pub gallery_hard_limit: i64,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins: Vec<String> = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?;

        let base_images_path = env::var("BASE_IMAGES_PATH")
            .map(PathBuf::from)
            .map_err(|_| anyhow::anyhow!("BASE_IMAGES_PATH must be set"))?;

        let base_thumbnails_path = env::var("BASE_THUMBNAILS_PATH").ok().map(PathBuf::from);
        if base_thumbnails_path.is_none() {
            tracing::warn!(
                "BASE_THUMBNAILS_PATH is not set. Thumbnails will not be generated."
            );
        }

        let max_file_size_mb = env::var("MAX_FILE_SIZE_MB")
            .unwrap_or_else(|_| MAX_FILE_SIZE_MB.to_string())
            .parse::<usize>()
            .unwrap_or(MAX_FILE_SIZE_MB);

        let allowed_image_types = env::var("ALLOWED_IMAGE_TYPES")
            .unwrap_or_else(|_| "jpeg,png,gif,webp".to_string())
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .collect();

        Ok(Config {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| "4000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            cors_origins,
            environment,
            database_url,
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| MAX_CONNECTIONS.to_string())
                .parse()
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: env::var("DB_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| CONNECTION_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            base_images_path,
            base_thumbnails_path,
            max_file_size_bytes: max_file_size_mb * 1024 * 1024,
            allowed_image_types,
            gallery_default_limit: GALLERY_DEFAULT_LIMIT,
            gallery_hard_limit: GALLERY_HARD_LIMIT,
        })
    }

    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            server_port: 4000,
            cors_origins: vec!["*".to_string()],
            environment: "test".to_string(),
            database_url: "postgres://localhost/pixvault_test".to_string(),
            db_max_connections: MAX_CONNECTIONS,
            db_timeout_seconds: CONNECTION_TIMEOUT_SECS,
            base_images_path: PathBuf::from("/tmp/images"),
            base_thumbnails_path: None,
            max_file_size_bytes: MAX_FILE_SIZE_MB * 1024 * 1024,
            allowed_image_types: vec![
                "jpeg".to_string(),
                "png".to_string(),
                "gif".to_string(),
                "webp".to_string(),
            ],
            gallery_default_limit: GALLERY_DEFAULT_LIMIT,
            gallery_hard_limit: GALLERY_HARD_LIMIT,
        }
    }

    #[test]
    fn test_is_production() {
        let mut config = test_config();
        assert!(!config.is_production());
        config.environment = "Production".to_string();
        assert!(config.is_production());
    }

    #[test]
    fn test_defaults() {
        let config = test_config();
        assert_eq!(config.gallery_default_limit, 10);
        assert_eq!(config.gallery_hard_limit, 100);
        assert!(config.allowed_image_types.contains(&"jpeg".to_string()));
    }
}
