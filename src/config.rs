use std::env;

use secrecy::SecretString;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: SecretString,
    pub token_ttl_hours: i64,
    pub max_connections: u32,
    pub upload_dir: String,
    pub public_base_url: String,
    pub object_store_url: Option<String>,
    pub object_store_api_key: Option<SecretString>,
    pub max_upload_bytes: usize,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET is not set"))?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = parse_or("APP_PORT", 5000);
        let public_base_url = env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| format!("http://{host}:{port}"));

        Ok(Self {
            database_url,
            port,
            jwt_secret: SecretString::from(jwt_secret),
            token_ttl_hours: parse_or("TOKEN_TTL_HOURS", 24),
            max_connections: parse_or("DATABASE_MAX_CONNECTIONS", 10),
            upload_dir: env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string()),
            public_base_url,
            object_store_url: env::var("OBJECT_STORE_URL").ok().filter(|v| !v.is_empty()),
            object_store_api_key: env::var("OBJECT_STORE_API_KEY")
                .ok()
                .filter(|v| !v.is_empty())
                .map(SecretString::from),
            max_upload_bytes: parse_or("MAX_UPLOAD_BYTES", 10 * 1024 * 1024),
            host,
        })
    }

    /// Configuration for tests and tooling that never reads the environment.
    pub fn for_tests(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            host: "127.0.0.1".to_string(),
            port: 5000,
            jwt_secret: SecretString::from("test-secret".to_string()),
            token_ttl_hours: 24,
            max_connections: 5,
            upload_dir: std::env::temp_dir()
                .join("secondhand-market-uploads")
                .to_string_lossy()
                .into_owned(),
            public_base_url: "http://127.0.0.1:5000".to_string(),
            object_store_url: None,
            object_store_api_key: None,
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}
