use std::path::PathBuf;

use crate::auth::JwtConfig;
use crate::core::{Result, ServerError};

/// Server configuration
///
/// # Environment variables
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | WORK_DIR | ./data | Database, uploaded images, logs |
/// | HTTP_PORT | 5000 | HTTP(S) listen port |
/// | ENVIRONMENT | development | development / staging / production |
/// | LOG_LEVEL | info | Used when RUST_LOG is unset |
/// | LOG_JSON | false | JSON log lines |
/// | PUBLIC_BASE_URL | http://localhost:5000 | Prefix of uploaded image URLs |
/// | MAX_UPLOAD_BYTES | 5242880 | Upload size limit |
/// | REQUEST_TIMEOUT_MS | 30000 | Per-request timeout |
/// | SHUTDOWN_TIMEOUT_MS | 10000 | Graceful shutdown window |
/// | ADMIN_EMAIL / ADMIN_USERNAME / ADMIN_PASSWORD | - | Bootstrap admin account |
/// | SELLER_USER_ID | - | Account that answers buyer chats |
/// | KHALTI_SECRET_KEY | - | Khalti server key |
/// | KHALTI_VERIFY_URL | https://khalti.com/api/v2/payment/verify/ | Khalti verify endpoint |
/// | TLS_CERT_PATH / TLS_KEY_PATH | - | Serve HTTPS when both are set |
///
/// JWT settings are documented on [`JwtConfig`].
///
/// # Example
///
/// ```ignore
/// WORK_DIR=/srv/bookhaul HTTP_PORT=8080 cargo run -p bookhaul-server
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Working directory for the database, images and logs
    pub work_dir: String,
    /// HTTP API port
    pub http_port: u16,
    /// JWT settings
    pub jwt: JwtConfig,
    /// development | staging | production
    pub environment: String,
    pub log_level: String,
    pub log_json: bool,
    /// Public URL prefix used when building image URLs
    pub public_base_url: String,
    pub max_upload_bytes: usize,
    pub request_timeout_ms: u64,
    pub shutdown_timeout_ms: u64,
    /// Bootstrap admin, created on startup when no admin exists
    pub admin: Option<AdminBootstrap>,
    /// Explicit seller account for chats
    pub seller_user_id: Option<String>,
    pub khalti: KhaltiConfig,
    pub tls: Option<TlsPaths>,
}

/// Credentials for the bootstrap admin account
#[derive(Debug, Clone)]
pub struct AdminBootstrap {
    pub email: String,
    pub user_name: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct KhaltiConfig {
    pub secret_key: Option<String>,
    pub verify_url: String,
}

#[derive(Debug, Clone)]
pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

pub const DEFAULT_KHALTI_VERIFY_URL: &str = "https://khalti.com/api/v2/payment/verify/";

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Unset variables fall back to defaults. Fails only when the JWT
    /// secret is unusable.
    pub fn from_env() -> Result<Self> {
        let admin = match (
            env_opt("ADMIN_EMAIL"),
            env_opt("ADMIN_USERNAME"),
            env_opt("ADMIN_PASSWORD"),
        ) {
            (Some(email), Some(user_name), Some(password)) => Some(AdminBootstrap {
                email,
                user_name,
                password,
            }),
            _ => None,
        };

        let tls = match (env_opt("TLS_CERT_PATH"), env_opt("TLS_KEY_PATH")) {
            (Some(cert), Some(key)) => Some(TlsPaths {
                cert: cert.into(),
                key: key.into(),
            }),
            _ => None,
        };

        let jwt = JwtConfig::from_env().map_err(|e| ServerError::Config(e.to_string()))?;

        Ok(Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "./data".into()),
            http_port: env_parse("HTTP_PORT", 5000),
            jwt,
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_json: env_parse("LOG_JSON", false),
            public_base_url: std::env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:5000".into())
                .trim_end_matches('/')
                .to_string(),
            max_upload_bytes: env_parse("MAX_UPLOAD_BYTES", 5 * 1024 * 1024),
            request_timeout_ms: env_parse("REQUEST_TIMEOUT_MS", 30_000),
            shutdown_timeout_ms: env_parse("SHUTDOWN_TIMEOUT_MS", 10_000),
            admin,
            seller_user_id: env_opt("SELLER_USER_ID"),
            khalti: KhaltiConfig {
                secret_key: env_opt("KHALTI_SECRET_KEY"),
                verify_url: env_opt("KHALTI_VERIFY_URL")
                    .unwrap_or_else(|| DEFAULT_KHALTI_VERIFY_URL.into()),
            },
            tls,
        })
    }

    /// Configuration rooted at `work_dir`, for tests and embedding
    ///
    /// Uses a fixed JWT secret and no bootstrap admin.
    pub fn for_work_dir(work_dir: impl Into<String>) -> Self {
        Self {
            work_dir: work_dir.into(),
            http_port: 0,
            jwt: JwtConfig::with_secret("bookhaul-test-secret-with-at-least-32-chars"),
            environment: "development".into(),
            log_level: "info".into(),
            log_json: false,
            public_base_url: "http://localhost:5000".into(),
            max_upload_bytes: 5 * 1024 * 1024,
            request_timeout_ms: 30_000,
            shutdown_timeout_ms: 10_000,
            admin: None,
            seller_user_id: None,
            khalti: KhaltiConfig {
                secret_key: None,
                verify_url: DEFAULT_KHALTI_VERIFY_URL.into(),
            },
            tls: None,
        }
    }

    /// Whether running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Whether running in development
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// `work_dir/database`
    pub fn database_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("database")
    }

    /// `work_dir/images`
    pub fn images_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("images")
    }

    /// `work_dir/logs`
    pub fn logs_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("logs")
    }

    /// Create the working directory layout if missing
    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        for dir in [self.database_dir(), self.images_dir(), self.logs_dir()] {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_work_dir_layout() {
        let tmp = tempfile::tempdir().unwrap();
        let config = Config::for_work_dir(tmp.path().to_string_lossy());
        config.ensure_work_dir_structure().unwrap();

        assert!(tmp.path().join("database").is_dir());
        assert!(tmp.path().join("images").is_dir());
        assert!(tmp.path().join("logs").is_dir());
        assert!(config.is_development());
        assert!(!config.is_production());
    }
}
