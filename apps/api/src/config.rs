use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub s3_bucket: String,
    pub s3_endpoint: String,
    pub s3_region: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    /// Login name accepted by `POST /admin/api/login`.
    pub admin_username: String,
    /// Argon2 PHC string (`$argon2id$v=19$...`) of the admin password.
    pub admin_password_hash: String,
    pub jwt_secret: String,
    pub admin_token_ttl_secs: i64,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            s3_bucket: require_env("S3_BUCKET")?,
            s3_endpoint: require_env("S3_ENDPOINT")?,
            s3_region: std::env::var("S3_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
            aws_access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            admin_username: require_env("ADMIN_USERNAME")?,
            admin_password_hash: require_env("ADMIN_PASSWORD_HASH")?,
            jwt_secret: require_env("JWT_SECRET")?,
            admin_token_ttl_secs: std::env::var("ADMIN_TOKEN_TTL_SECS")
                .unwrap_or_else(|_| "3600".to_string())
                .parse::<i64>()
                .context("ADMIN_TOKEN_TTL_SECS must be a number of seconds")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
