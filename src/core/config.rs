use std::env;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub swagger: SwaggerConfig,
    pub minio: MinIOConfig,
    pub email: EmailConfig,
    pub sla: SlaConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub max_request_body_size: usize,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
}

#[derive(Debug, Clone)]
pub struct SwaggerConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub title: String,
    pub version: String,
    pub description: String,
}

/// MinIO/S3 storage configuration for report photos
#[derive(Debug, Clone)]
pub struct MinIOConfig {
    /// MinIO/S3 endpoint URL
    pub endpoint: String,
    /// Endpoint used when building public photo URLs (defaults to endpoint)
    pub public_endpoint: String,
    pub access_key: String,
    pub secret_key: String,
    pub bucket: String,
    /// AWS region (for S3 compatibility)
    pub region: String,
    /// Key prefix every report photo is stored under
    pub photo_prefix: String,
}

/// Transactional email (Resend) configuration
#[derive(Debug, Clone)]
pub struct EmailConfig {
    /// When absent, notifications are logged instead of delivered
    pub api_key: Option<String>,
    pub api_url: String,
    pub from: String,
    /// Supervisor / admin recipient for critical-report and SLA alerts
    pub alert_recipient: String,
}

/// SLA monitor configuration
#[derive(Debug, Clone)]
pub struct SlaConfig {
    pub enabled: bool,
    pub check_interval: Duration,
}

/// Read `key` and parse it, falling back to `default` when the variable is unset
fn env_or<T: FromStr>(key: &str, default: T) -> Result<T, String> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| format!("{} must be a valid value", key)),
        Err(_) => Ok(default),
    }
}

/// Accepts the usual truthy/falsy spellings used in `.env` files
fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if exists, ignore if not found (optional for production)
        if let Err(e) = dotenvy::dotenv() {
            if !e.to_string().contains("not found") {
                eprintln!("Warning: Error loading .env file: {}", e);
            }
        }

        Ok(Config {
            app: AppConfig::from_env()?,
            database: DatabaseConfig::from_env()?,
            swagger: SwaggerConfig::from_env()?,
            minio: MinIOConfig::from_env()?,
            email: EmailConfig::from_env()?,
            sla: SlaConfig::from_env()?,
        })
    }
}

impl AppConfig {
    const DEFAULT_MAX_REQUEST_BODY_SIZE: usize = 10 * 1024 * 1024; // 10MB, base64 photos included

    pub fn from_env() -> Result<Self, String> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env_or("PORT", 3000u16)?;

        let cors_allowed_origins =
            parse_origins(&env::var("CORS_ALLOWED_ORIGINS").unwrap_or_else(|_| "*".to_string()));

        let max_request_body_size =
            env_or("MAX_REQUEST_BODY_SIZE", Self::DEFAULT_MAX_REQUEST_BODY_SIZE)?;

        Ok(Self {
            host,
            port,
            cors_allowed_origins,
            max_request_body_size,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl DatabaseConfig {
    const DEFAULT_MAX_CONNECTIONS: u32 = 10;
    const DEFAULT_MIN_CONNECTIONS: u32 = 1;
    const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;
    const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600; // 10 minutes
    const DEFAULT_MAX_LIFETIME_SECS: u64 = 1800; // 30 minutes

    pub fn from_env() -> Result<Self, String> {
        let url = env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set".to_string())?;

        Ok(Self {
            url,
            max_connections: env_or("DB_MAX_CONNECTIONS", Self::DEFAULT_MAX_CONNECTIONS)?,
            min_connections: env_or("DB_MIN_CONNECTIONS", Self::DEFAULT_MIN_CONNECTIONS)?,
            acquire_timeout_secs: env_or(
                "DB_ACQUIRE_TIMEOUT_SECS",
                Self::DEFAULT_ACQUIRE_TIMEOUT_SECS,
            )?,
            idle_timeout_secs: env_or("DB_IDLE_TIMEOUT_SECS", Self::DEFAULT_IDLE_TIMEOUT_SECS)?,
            max_lifetime_secs: env_or("DB_MAX_LIFETIME_SECS", Self::DEFAULT_MAX_LIFETIME_SECS)?,
        })
    }
}

impl SwaggerConfig {
    pub fn from_env() -> Result<Self, String> {
        // Only use credentials if they are non-empty
        let username = env::var("SWAGGER_USERNAME").ok().filter(|s| !s.is_empty());
        let password = env::var("SWAGGER_PASSWORD").ok().filter(|s| !s.is_empty());
        let title = env::var("SWAGGER_TITLE").unwrap_or_else(|_| "Civic Report API".to_string());
        let version = env::var("SWAGGER_VERSION").unwrap_or_else(|_| "0.1.0".to_string());
        let description = env::var("SWAGGER_DESCRIPTION")
            .unwrap_or_else(|_| "Civic issue reporting, triage and SLA monitoring".to_string());

        Ok(Self {
            username,
            password,
            title,
            version,
            description,
        })
    }

    /// Returns credentials in "username:password" format if auth is enabled
    pub fn credentials(&self) -> Option<String> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some(format!("{}:{}", user, pass)),
            _ => None,
        }
    }
}

impl MinIOConfig {
    pub fn from_env() -> Result<Self, String> {
        let endpoint =
            env::var("MINIO_ENDPOINT").unwrap_or_else(|_| "http://localhost:9000".to_string());
        let public_endpoint =
            env::var("MINIO_PUBLIC_ENDPOINT").unwrap_or_else(|_| endpoint.clone());

        Ok(Self {
            endpoint,
            public_endpoint,
            access_key: env::var("MINIO_ACCESS_KEY").unwrap_or_else(|_| "minioadmin".to_string()),
            secret_key: env::var("MINIO_SECRET_KEY").unwrap_or_else(|_| "minioadmin".to_string()),
            bucket: env::var("MINIO_BUCKET").unwrap_or_else(|_| "civic-report-photos".to_string()),
            region: env::var("MINIO_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
            photo_prefix: env::var("MINIO_PHOTO_PREFIX")
                .unwrap_or_else(|_| "public/reports".to_string()),
        })
    }
}

impl EmailConfig {
    const DEFAULT_API_URL: &'static str = "https://api.resend.com";
    const DEFAULT_FROM: &'static str = "Civic Reports <onboarding@resend.dev>";

    pub fn from_env() -> Result<Self, String> {
        let api_key = env::var("RESEND_API_KEY").ok().filter(|s| !s.is_empty());
        let alert_recipient =
            env::var("ALERT_EMAIL").unwrap_or_else(|_| "admin@example.com".to_string());

        if !alert_recipient.contains('@') {
            return Err("ALERT_EMAIL must be an email address".to_string());
        }

        Ok(Self {
            api_key,
            api_url: env::var("RESEND_API_URL").unwrap_or_else(|_| Self::DEFAULT_API_URL.into()),
            from: env::var("EMAIL_FROM").unwrap_or_else(|_| Self::DEFAULT_FROM.into()),
            alert_recipient,
        })
    }
}

impl SlaConfig {
    const DEFAULT_CHECK_INTERVAL_SECS: u64 = 30 * 60;

    pub fn from_env() -> Result<Self, String> {
        let enabled = match env::var("SLA_MONITOR_ENABLED") {
            Ok(raw) => parse_bool(&raw)
                .ok_or_else(|| "SLA_MONITOR_ENABLED must be true or false".to_string())?,
            Err(_) => true,
        };

        let secs = env_or(
            "SLA_CHECK_INTERVAL_SECS",
            Self::DEFAULT_CHECK_INTERVAL_SECS,
        )?;
        if secs == 0 {
            return Err("SLA_CHECK_INTERVAL_SECS must be greater than zero".to_string());
        }

        Ok(Self {
            enabled,
            check_interval: Duration::from_secs(secs),
        })
    }
}
