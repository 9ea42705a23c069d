use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct TokenConfig {
    pub secret: String,
    pub reset_ttl_secs: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub ttl_minutes: i64,
    pub remember_ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    pub endpoint: String,
    pub api_token: String,
    pub from: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub endpoint: String,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    /// External base URL used when building links sent by email.
    pub base_url: String,
    pub tokens: TokenConfig,
    pub sessions: SessionConfig,
    pub mail: MailConfig,
    pub storage: StorageConfig,
}

fn env_i64(name: &str, default: i64) -> i64 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse::<i64>().ok())
        .unwrap_or(default)
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let base_url =
            std::env::var("APP_BASE_URL").unwrap_or_else(|_| "http://localhost:8080".into());
        let tokens = TokenConfig {
            secret: std::env::var("SECRET_KEY")?,
            reset_ttl_secs: env_i64("RESET_TOKEN_TTL_SECS", 1800),
        };
        let sessions = SessionConfig {
            ttl_minutes: env_i64("SESSION_TTL_MINUTES", 60 * 24),
            remember_ttl_minutes: env_i64("SESSION_REMEMBER_TTL_MINUTES", 60 * 24 * 14),
        };
        let mail = MailConfig {
            endpoint: std::env::var("MAIL_ENDPOINT")
                .unwrap_or_else(|_| "http://localhost:8025/messages".into()),
            api_token: std::env::var("MAIL_API_TOKEN").unwrap_or_default(),
            from: std::env::var("MAIL_FROM").unwrap_or_else(|_| "noreply@timetrack.local".into()),
        };
        let storage = StorageConfig {
            endpoint: std::env::var("MINIO_ENDPOINT")
                .unwrap_or_else(|_| "http://localhost:9000".into()),
            bucket: std::env::var("MINIO_BUCKET").unwrap_or_else(|_| "timetrack".into()),
            access_key: std::env::var("MINIO_ACCESS_KEY").unwrap_or_default(),
            secret_key: std::env::var("MINIO_SECRET_KEY").unwrap_or_default(),
        };
        Ok(Self {
            database_url,
            base_url,
            tokens,
            sessions,
            mail,
            storage,
        })
    }
}
