use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub mailer: MailerConfig,
    #[serde(default)]
    pub orders: OrdersConfig,
    #[serde(default)]
    pub admin: Option<AdminConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Which persistence backend serves the store.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    /// sea-orm over the URL in `database.url` (PostgreSQL or SQLite).
    #[default]
    Sql,
    /// Process-local store; data is lost on restart.
    Memory,
}

impl std::str::FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sql" | "postgres" | "sqlite" => Ok(StoreBackend::Sql),
            "memory" | "mock" => Ok(StoreBackend::Memory),
            other => Err(format!("unknown store backend: {other}")),
        }
    }
}

impl std::fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreBackend::Sql => write!(f, "sql"),
            StoreBackend::Memory => write!(f, "memory"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_expires_in: i64,  // seconds
    pub refresh_token_expires_in: i64, // seconds
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailerConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub api_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_from_address")]
    pub from_address: String,
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

fn default_from_address() -> String {
    "no-reply@drinkquick.local".to_string()
}

fn default_queue_capacity() -> usize {
    256
}

impl Default for MailerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_url: String::new(),
            api_key: String::new(),
            from_address: default_from_address(),
            queue_capacity: default_queue_capacity(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrdersConfig {
    #[serde(default = "default_order_prefix")]
    pub order_number_prefix: String,
    #[serde(default = "default_receipt_prefix")]
    pub receipt_number_prefix: String,
}

fn default_order_prefix() -> String {
    "ORD".to_string()
}

fn default_receipt_prefix() -> String {
    "RCP".to_string()
}

impl Default for OrdersConfig {
    fn default() -> Self {
        Self {
            order_number_prefix: default_order_prefix(),
            receipt_number_prefix: default_receipt_prefix(),
        }
    }
}

/// Administrator account ensured at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl Config {
    pub fn from_toml() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        // A missing file means the environment supplies everything.
        let config_result = std::fs::read_to_string(&config_path);

        let mut config: Config = match config_result {
            Ok(config_str) => {
                toml::from_str(&config_str).map_err(|e| format!("Failed to parse config file: {e}"))?
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Self::from_env_defaults()?,
            Err(e) => {
                return Err(format!("Unable to read config file {config_path}: {e}").into());
            }
        };

        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    fn from_env_defaults() -> Result<Self, Box<dyn std::error::Error>> {
        let backend = match get_env("DATABASE_BACKEND") {
            Some(v) => v.parse::<StoreBackend>()?,
            None => StoreBackend::Sql,
        };

        Ok(Config {
            server: ServerConfig {
                host: get_env("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: get_env_parse("SERVER_PORT", 8080u16),
            },
            database: DatabaseConfig {
                backend,
                url: get_env("DATABASE_URL").unwrap_or_default(),
                max_connections: get_env_parse("DB_MAX_CONNECTIONS", default_max_connections()),
            },
            jwt: JwtConfig {
                secret: get_env("JWT_SECRET")
                    .unwrap_or_else(|| "change-me-in-production".to_string()),
                access_token_expires_in: get_env_parse("JWT_ACCESS_EXPIRES_IN", 7200i64),
                refresh_token_expires_in: get_env_parse("JWT_REFRESH_EXPIRES_IN", 2_592_000i64),
            },
            mailer: MailerConfig::default(),
            orders: OrdersConfig::default(),
            admin: None,
        })
    }

    fn apply_env_overrides(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        if let Ok(v) = env::var("SERVER_HOST") {
            self.server.host = v;
        }
        if let Ok(v) = env::var("SERVER_PORT")
            && let Ok(p) = v.parse()
        {
            self.server.port = p;
        }
        if let Ok(v) = env::var("DATABASE_BACKEND") {
            self.database.backend = v.parse()?;
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = v;
        }
        if let Ok(v) = env::var("DB_MAX_CONNECTIONS")
            && let Ok(mc) = v.parse()
        {
            self.database.max_connections = mc;
        }
        if let Ok(v) = env::var("JWT_SECRET") {
            self.jwt.secret = v;
        }
        if let Ok(v) = env::var("JWT_ACCESS_EXPIRES_IN")
            && let Ok(n) = v.parse()
        {
            self.jwt.access_token_expires_in = n;
        }
        if let Ok(v) = env::var("JWT_REFRESH_EXPIRES_IN")
            && let Ok(n) = v.parse()
        {
            self.jwt.refresh_token_expires_in = n;
        }

        // Mailer
        if let Ok(v) = env::var("MAILER_ENABLED") {
            self.mailer.enabled = matches!(v.as_str(), "1" | "true" | "yes");
        }
        if let Ok(v) = env::var("MAILER_API_URL") {
            self.mailer.api_url = v;
        }
        if let Ok(v) = env::var("MAILER_API_KEY") {
            self.mailer.api_key = v;
        }
        if let Ok(v) = env::var("MAILER_FROM_ADDRESS") {
            self.mailer.from_address = v;
        }

        if let Ok(v) = env::var("ORDER_NUMBER_PREFIX") {
            self.orders.order_number_prefix = v;
        }
        if let Ok(v) = env::var("RECEIPT_NUMBER_PREFIX") {
            self.orders.receipt_number_prefix = v;
        }

        // Admin bootstrap needs all three values.
        if let (Some(username), Some(email), Some(password)) = (
            get_env("ADMIN_USERNAME"),
            get_env("ADMIN_EMAIL"),
            get_env("ADMIN_PASSWORD"),
        ) {
            self.admin = Some(AdminConfig {
                username,
                email,
                password,
            });
        }

        Ok(())
    }

    fn validate(&self) -> Result<(), Box<dyn std::error::Error>> {
        if self.database.backend == StoreBackend::Sql && self.database.url.is_empty() {
            return Err(
                "DATABASE_URL is required for the sql backend (set DATABASE_BACKEND=memory to run without a database)"
                    .into(),
            );
        }
        if self.mailer.enabled && self.mailer.api_url.is_empty() {
            return Err("mailer.api_url is required when the mailer is enabled".into());
        }
        Ok(())
    }
}

fn get_env(name: &str) -> Option<String> {
    env::var(name).ok()
}

fn get_env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_toml_with_defaults() {
        let raw = r#"
            [server]
            host = "127.0.0.1"
            port = 3000

            [database]
            backend = "memory"

            [jwt]
            secret = "s3cret"
            access_token_expires_in = 60
            refresh_token_expires_in = 120
        "#;
        let config: Config = toml::from_str(raw).unwrap();
        assert_eq!(config.database.backend, StoreBackend::Memory);
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.orders.order_number_prefix, "ORD");
        assert_eq!(config.orders.receipt_number_prefix, "RCP");
        assert!(!config.mailer.enabled);
        assert!(config.admin.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn sql_backend_requires_url() {
        let raw = r#"
            [server]
            host = "127.0.0.1"
            port = 3000

            [database]
            backend = "sql"

            [jwt]
            secret = "s3cret"
            access_token_expires_in = 60
            refresh_token_expires_in = 120
        "#;
        let config: Config = toml::from_str(raw).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn backend_names() {
        assert_eq!("postgres".parse::<StoreBackend>().unwrap(), StoreBackend::Sql);
        assert_eq!("SQLITE".parse::<StoreBackend>().unwrap(), StoreBackend::Sql);
        assert_eq!("mock".parse::<StoreBackend>().unwrap(), StoreBackend::Memory);
        assert!("mongo".parse::<StoreBackend>().is_err());
    }
}
