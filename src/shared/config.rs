use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "INDOWATER_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config/indowater.toml";

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Configs {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub rate_limit: RateLimitSettings,
    pub logging: LoggingConfig,
    pub iot: IotConfig,
    pub mqtt: Option<MqttConfig>,
    pub seed: Option<SeedConfig>,

    #[serde(skip)]
    config_path: PathBuf,
}

impl Configs {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let config_content = fs::read_to_string(&path)?;
        let mut configs = Self::from_toml(&config_content)?;
        configs.config_path = path.as_ref().to_path_buf();
        Ok(configs)
    }

    pub fn from_toml(content: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let configs: Configs = toml::from_str(content)?;
        Ok(configs)
    }

    /// Resolves the file named by `INDOWATER_CONFIG`, falls back to defaults
    /// when it does not exist, then applies the environment overrides.
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let mut configs = if Path::new(&path).exists() {
            Self::load_from_file(&path)?
        } else {
            log::warn!("Config file {} not found, using defaults", path);
            Configs::default()
        };
        configs.apply_overrides(|key| std::env::var(key).ok());
        configs.validate()?;
        Ok(configs)
    }

    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("DATABASE_URL") {
            self.database.url = url;
        }
        if let Some(secret) = lookup("JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }
        if let Some(port) = lookup("INDOWATER_PORT").and_then(|p| p.parse::<u16>().ok()) {
            self.server.port = port;
        }
        if let Some(level) = lookup("INDOWATER_LOG") {
            self.logging.level = level;
        }
    }

    pub fn validate(&self) -> Result<(), Box<dyn std::error::Error>> {
        if self.auth.jwt_secret.trim().is_empty() {
            return Err("auth.jwt_secret must not be empty".into());
        }
        if self.database.max_connections == 0 {
            return Err("database.max_connections must be at least 1".into());
        }
        Ok(())
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: [u8; 4],
    pub port: u16,
    pub cors_origin: Option<String>,
    pub body_limit_bytes: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: [0, 0, 0, 0],
            port: 3030,
            cors_origin: None,
            body_limit_bytes: 1024 * 64,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        DatabaseConfig {
            url: String::from("indowater.db"),
            max_connections: 8,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_secs: u64,
    pub cookie_name: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        AuthConfig {
            jwt_secret: String::from("indowater-secret"),
            token_ttl_secs: 60 * 60 * 24 * 7,
            cookie_name: String::from("session"),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct RateLimitSettings {
    pub enabled: bool,
    pub max_requests: u32,
    pub window_secs: u64,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        RateLimitSettings {
            enabled: true,
            max_requests: 5,
            window_secs: 60,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: String::from("info"),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct IotConfig {
    pub offline_after_secs: i64,
    pub sweep_interval_secs: u64,
    pub leak_flow_threshold: f64,
    pub default_rate_per_unit: f64,
}

impl Default for IotConfig {
    fn default() -> Self {
        IotConfig {
            offline_after_secs: 300,
            sweep_interval_secs: 60,
            leak_flow_threshold: 50.0,
            default_rate_per_unit: 5000.0,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct MqttConfig {
    pub broker: String,
    pub port: u16,
    pub client_id: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub keep_alive: u16,
    pub readings_topic: String,
    pub heartbeat_topic: String,
    pub max_reconnect_attempts: u32,
}

impl Default for MqttConfig {
    fn default() -> Self {
        MqttConfig {
            broker: String::from("localhost"),
            port: 1883,
            client_id: String::from("indowater-api"),
            username: None,
            password: None,
            keep_alive: 30,
            readings_topic: String::from("indowater/readings"),
            heartbeat_topic: String::from("indowater/heartbeat"),
            max_reconnect_attempts: 10,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SeedConfig {
    pub admin_email: String,
    pub admin_password: String,
    #[serde(default = "default_admin_name")]
    pub admin_name: String,
}

fn default_admin_name() -> String {
    String::from("Administrator")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn empty_file_uses_defaults() {
        let configs = Configs::from_toml("").unwrap();
        assert_eq!(configs.server.port, 3030);
        assert_eq!(configs.auth.cookie_name, "session");
        assert_eq!(configs.iot.offline_after_secs, 300);
        assert!(configs.mqtt.is_none());
        assert!(configs.validate().is_ok());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let configs = Configs::from_toml(
            r#"
            [iot]
            leak_flow_threshold = 12.5

            [mqtt]
            broker = "mqtt.local"
            "#,
        )
        .unwrap();
        assert_eq!(configs.iot.leak_flow_threshold, 12.5);
        assert_eq!(configs.iot.sweep_interval_secs, 60);
        let mqtt = configs.mqtt.unwrap();
        assert_eq!(mqtt.broker, "mqtt.local");
        assert_eq!(mqtt.port, 1883);
    }

    #[test]
    fn env_overrides_win() {
        let env: HashMap<&str, &str> = [
            ("DATABASE_URL", "/tmp/other.db"),
            ("JWT_SECRET", "rotated"),
            ("INDOWATER_PORT", "8088"),
            ("INDOWATER_LOG", "debug"),
        ]
        .into_iter()
        .collect();
        let mut configs = Configs::default();
        configs.apply_overrides(|key| env.get(key).map(|v| v.to_string()));
        assert_eq!(configs.database.url, "/tmp/other.db");
        assert_eq!(configs.auth.jwt_secret, "rotated");
        assert_eq!(configs.server.port, 8088);
        assert_eq!(configs.logging.level, "debug");
    }

    #[test]
    fn unparsable_port_override_is_ignored() {
        let mut configs = Configs::default();
        configs.apply_overrides(|key| (key == "INDOWATER_PORT").then(|| "http".to_string()));
        assert_eq!(configs.server.port, 3030);
    }

    #[test]
    fn empty_jwt_secret_is_rejected() {
        let configs = Configs::from_toml("[auth]\njwt_secret = \"\"\n").unwrap();
        assert!(configs.validate().is_err());
    }
}
