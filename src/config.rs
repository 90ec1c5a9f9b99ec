//! Configuration for Storyhouse
//!
//! CLI arguments and environment variable handling using clap.

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Storyhouse - backend for the serialized-fiction platform
#[derive(Parser, Debug, Clone)]
#[command(name = "storyhouse")]
#[command(about = "HTTP backend for works, episodes, comments and engagement")]
pub struct Args {
    /// Address to listen on
    #[arg(long, env = "LISTEN", default_value = "0.0.0.0:5000")]
    pub listen: SocketAddr,

    /// Path to the SQLite database file
    #[arg(long, env = "DATABASE_PATH", default_value = "storyhouse.db")]
    pub database_path: PathBuf,

    /// Directory for uploaded images
    #[arg(long, env = "UPLOAD_DIR", default_value = "uploads")]
    pub upload_dir: PathBuf,

    /// Public base URL used when building upload URLs
    /// (e.g., "https://storyhouse.example.com"). When unset, upload URLs
    /// are returned as absolute paths.
    #[arg(long, env = "PUBLIC_URL")]
    pub public_url: Option<String>,

    /// JWT secret for token signing (required in production)
    #[arg(long, env = "JWT_SECRET")]
    pub jwt_secret: Option<String>,

    /// JWT token expiry in seconds
    #[arg(long, env = "JWT_EXPIRY_SECONDS", default_value = "3600")]
    pub jwt_expiry_seconds: u64,

    /// Enable development mode (permits a default JWT secret)
    #[arg(long, env = "DEV_MODE", default_value = "false")]
    pub dev_mode: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Args {
    /// Get effective JWT secret (uses default in dev mode)
    pub fn jwt_secret(&self) -> String {
        if self.dev_mode {
            self.jwt_secret
                .clone()
                .unwrap_or_else(|| "dev-only-insecure-secret".to_string())
        } else {
            self.jwt_secret
                .clone()
                .expect("JWT_SECRET is required in production mode")
        }
    }

    /// Build the public URL for an uploaded file name
    pub fn upload_url(&self, filename: &str) -> String {
        match &self.public_url {
            Some(base) => format!("{}/uploads/{}", base.trim_end_matches('/'), filename),
            None => format!("/uploads/{}", filename),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !self.dev_mode && self.jwt_secret.is_none() {
            return Err("JWT_SECRET is required in production mode".to_string());
        }

        if self.jwt_expiry_seconds == 0 {
            return Err("JWT_EXPIRY_SECONDS must be greater than zero".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dev_args() -> Args {
        Args::parse_from(["storyhouse", "--dev-mode"])
    }

    #[test]
    fn test_dev_mode_jwt_fallback() {
        let args = dev_args();
        assert!(args.validate().is_ok());
        assert_eq!(args.jwt_secret(), "dev-only-insecure-secret");
    }

    #[test]
    fn test_production_requires_secret() {
        let args = Args::parse_from(["storyhouse"]);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_upload_url_with_and_without_base() {
        let mut args = dev_args();
        assert_eq!(args.upload_url("cover.png"), "/uploads/cover.png");

        args.public_url = Some("https://storyhouse.example.com/".to_string());
        assert_eq!(
            args.upload_url("cover.png"),
            "https://storyhouse.example.com/uploads/cover.png"
        );
    }
}
