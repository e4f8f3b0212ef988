use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub wallet: WalletConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_expires_in: i64,  // seconds
    pub refresh_token_expires_in: i64, // seconds
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletConfig {
    /// Smallest cashout a user may request, in minor units.
    #[serde(default = "default_min_cashout_amount")]
    pub min_cashout_amount: i64,
}

fn default_min_cashout_amount() -> i64 {
    500
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            min_cashout_amount: default_min_cashout_amount(),
        }
    }
}

impl Config {
    /// Load from `CONFIG_PATH` (default `config.toml`); fall back to
    /// environment variables when the file is missing. Env vars win over
    /// file values either way.
    pub fn from_toml() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        let mut config: Config = match std::fs::read_to_string(&config_path) {
            Ok(config_str) => {
                toml::from_str(&config_str).map_err(|e| format!("Failed to parse config: {e}"))?
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Config {
                server: ServerConfig {
                    host: "0.0.0.0".to_string(),
                    port: 8080,
                },
                database: DatabaseConfig {
                    url: String::new(),
                    max_connections: 10,
                },
                jwt: JwtConfig {
                    secret: String::new(),
                    access_token_expires_in: 3600,
                    refresh_token_expires_in: 7 * 24 * 3600,
                },
                wallet: WalletConfig::default(),
            },
            Err(e) => return Err(Box::new(e)),
        };

        config.apply_env_overrides();

        if config.database.url.is_empty() {
            return Err("DATABASE_URL is not configured".into());
        }
        if config.jwt.secret.is_empty() {
            return Err("JWT_SECRET is not configured".into());
        }
        if config.wallet.min_cashout_amount <= 0 {
            return Err("MIN_CASHOUT_AMOUNT must be positive".into());
        }

        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(host) = env::var("SERVER_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = env::var("SERVER_PORT") {
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }
        if let Ok(url) = env::var("DATABASE_URL") {
            self.database.url = url;
        }
        if let Ok(max) = env::var("DATABASE_MAX_CONNECTIONS") {
            if let Ok(max) = max.parse() {
                self.database.max_connections = max;
            }
        }
        if let Ok(secret) = env::var("JWT_SECRET") {
            self.jwt.secret = secret;
        }
        if let Ok(v) = env::var("JWT_ACCESS_EXPIRES_IN") {
            if let Ok(v) = v.parse() {
                self.jwt.access_token_expires_in = v;
            }
        }
        if let Ok(v) = env::var("JWT_REFRESH_EXPIRES_IN") {
            if let Ok(v) = v.parse() {
                self.jwt.refresh_token_expires_in = v;
            }
        }
        if let Ok(v) = env::var("MIN_CASHOUT_AMOUNT") {
            if let Ok(v) = v.parse() {
                self.wallet.min_cashout_amount = v;
            }
        }
    }
}
