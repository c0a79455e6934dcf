use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: String,
    /// Prefix for `Location` headers and `_links` hrefs.
    pub base_url: String,
    pub log_format: LogFormat,
    pub db_max_connections: u32,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(value) = std::env::var("DATABASE_URL")
            && !value.trim().is_empty()
        {
            config.database_url = value;
        }
        if let Ok(value) = std::env::var("REGISTRY_BIND_ADDR")
            && !value.trim().is_empty()
        {
            config.bind_addr = value;
        }
        config.base_url = match std::env::var("REGISTRY_BASE_URL") {
            Ok(value) if Url::parse(value.trim()).is_ok_and(|url| !url.cannot_be_a_base()) => {
                value.trim().trim_end_matches('/').to_string()
            }
            _ => format!("http://{}", config.bind_addr),
        };
        if let Ok(value) = std::env::var("REGISTRY_LOG_FORMAT") {
            match value.to_ascii_lowercase().as_str() {
                "json" => config.log_format = LogFormat::Json,
                "pretty" => config.log_format = LogFormat::Pretty,
                _ => {}
            }
        }
        if let Ok(value) = std::env::var("REGISTRY_DB_MAX_CONNECTIONS")
            && let Ok(parsed) = value.parse::<u32>()
        {
            config.db_max_connections = parsed.max(1);
        }

        config
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        let bind_addr = "127.0.0.1:9292".to_string();
        Self {
            database_url: "sqlite:registry.db".to_string(),
            base_url: format!("http://{bind_addr}"),
            bind_addr,
            log_format: LogFormat::Pretty,
            db_max_connections: 5,
        }
    }
}
