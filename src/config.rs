use std::env;

use crate::registry::DEFAULT_MAX_DEVICES;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_path: String,
    pub base_url: String,
    /// Returned to devices after a successful activation
    pub content_url: Option<String>,
    pub max_devices: usize,
    /// Raw issuer keys; hashed into `IssuerKeys` at startup
    pub issuer_api_keys: Vec<String>,
    pub dev_mode: bool,
}

/// Split a comma-separated key list, dropping blanks.
pub fn parse_key_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(String::from)
        .collect()
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let dev_mode = env::var("DEVICELOCK_ENV")
            .map(|v| v == "dev" || v == "development")
            .unwrap_or(false);

        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port: u16 = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);

        let base_url = env::var("BASE_URL")
            .unwrap_or_else(|_| format!("http://{}:{}", host, port));

        let max_devices = env::var("MAX_DEVICES")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_MAX_DEVICES);

        Self {
            host,
            port,
            database_path: env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "devicelock.db".to_string()),
            base_url,
            content_url: env::var("CONTENT_URL").ok().filter(|v| !v.trim().is_empty()),
            max_devices,
            issuer_api_keys: env::var("ISSUER_API_KEYS")
                .map(|v| parse_key_list(&v))
                .unwrap_or_default(),
            dev_mode,
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
