use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_address: String,
    /// Base URL of the frontend reset page; the raw token is appended as a
    /// query parameter.
    pub reset_url_base: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub jwt: JwtConfig,
    pub smtp: SmtpConfig,
    /// Argon2 iteration count for newly hashed passwords. Stored hashes embed
    /// their own params, so changing this never invalidates old credentials.
    pub hash_cost: u32,
    /// CORS origin allow-list; empty means permissive (dev).
    pub allowed_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let host = std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port = std::env::var("APP_PORT")
            .ok()
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(8080);
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "quizcampus".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "quizcampus-users".into()),
            ttl_minutes: std::env::var("JWT_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60 * 24),
        };
        let smtp = SmtpConfig {
            host: std::env::var("SMTP_HOST").unwrap_or_else(|_| "localhost".into()),
            port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|v| v.parse::<u16>().ok())
                .unwrap_or(587),
            username: std::env::var("SMTP_USERNAME").unwrap_or_default(),
            password: std::env::var("SMTP_PASSWORD").unwrap_or_default(),
            from_address: std::env::var("SMTP_FROM_ADDRESS")
                .unwrap_or_else(|_| "noreply@quizcampus.local".into()),
            reset_url_base: std::env::var("RESET_URL_BASE")
                .unwrap_or_else(|_| "http://localhost:5500".into()),
        };
        let hash_cost = std::env::var("HASH_COST")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(10);
        let allowed_origins = std::env::var("ALLOWED_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_default();
        Ok(Self {
            host,
            port,
            database_url,
            jwt,
            smtp,
            hash_cost,
            allowed_origins,
        })
    }
}
