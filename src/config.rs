use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub database: DatabaseConfig,

    pub auth: AuthConfig,

    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub log_level: String,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            worker_threads: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,

    pub port: u16,

    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 6400,
            cors_allowed_origins: vec![
                "http://localhost:6400".to_string(),
                "http://127.0.0.1:6400".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,

    /// Maximum database connections (default: 5)
    pub max_connections: u32,

    /// Minimum database connections (default: 1)
    pub min_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:data/waymark.db".to_string(),
            max_connections: 5,
            min_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HMAC secret for signing bearer tokens. The default exists so a dev
    /// instance starts out of the box; `validate()` rejects it unless
    /// explicitly overridden.
    pub jwt_secret: String,

    pub issuer: String,

    /// Token lifetime in seconds (default: 3600)
    pub token_ttl_seconds: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "dev-only-secret-change-me".to_string(),
            issuer: "waymark".to_string(),
            token_ttl_seconds: 3600,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Argon2 memory cost in KiB (default: 8192 = 8MB)
    pub argon2_memory_cost_kib: u32,

    /// Argon2 time cost (iterations) - higher = more CPU work
    pub argon2_time_cost: u32,

    /// Argon2 parallelism (default: 1)
    pub argon2_parallelism: u32,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            argon2_memory_cost_kib: 8192,
            argon2_time_cost: 3,
            argon2_parallelism: 1,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let paths = Self::config_paths();

        for path in &paths {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                return Self::load_from_path(path);
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![];

        paths.push(PathBuf::from("config.toml"));

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("waymark").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".waymark").join("config.toml"));
        }

        paths
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    pub fn create_default_if_missing() -> Result<bool> {
        let path = Self::default_config_path();
        if path.exists() {
            Ok(false)
        } else {
            let config = Self::default();
            config.save_to_path(&path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.database.url.is_empty() {
            anyhow::bail!("Database URL cannot be empty");
        }

        if self.database.max_connections == 0
            || self.database.min_connections > self.database.max_connections
        {
            anyhow::bail!("Database pool bounds are inconsistent");
        }

        if self.auth.jwt_secret.is_empty() {
            anyhow::bail!("JWT secret cannot be empty");
        }

        // Refuse the baked-in secret outside local development.
        if self.auth.jwt_secret == AuthConfig::default().jwt_secret
            && std::env::var("WAYMARK_ALLOW_DEV_SECRET").is_err()
        {
            anyhow::bail!(
                "Default JWT secret in use; set [auth].jwt_secret or WAYMARK_ALLOW_DEV_SECRET=1 for local development"
            );
        }

        if self.auth.token_ttl_seconds == 0 {
            anyhow::bail!("Token TTL must be > 0");
        }

        if self.security.argon2_parallelism == 0 || self.security.argon2_time_cost == 0 {
            anyhow::bail!("Argon2 parameters must be > 0");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 6400);
        assert_eq!(config.database.url, "sqlite:data/waymark.db");
        assert_eq!(config.auth.token_ttl_seconds, 3600);
        assert_eq!(config.security.argon2_time_cost, 3);
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[server]"));
        assert!(toml_str.contains("[auth]"));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [general]
            log_level = "debug"

            [auth]
            jwt_secret = "super-secret"
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.auth.jwt_secret, "super-secret");

        assert_eq!(config.server.port, 6400);
    }

    #[test]
    fn test_validate_rejects_default_secret() {
        let config = Config::default();
        // unless the dev escape hatch is set, keeping the shipped secret fails
        if std::env::var("WAYMARK_ALLOW_DEV_SECRET").is_err() {
            assert!(config.validate().is_err());
        }

        let mut config = Config::default();
        config.auth.jwt_secret = "properly-random".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_pool_bounds() {
        let mut config = Config::default();
        config.auth.jwt_secret = "properly-random".to_string();
        config.database.min_connections = 10;
        assert!(config.validate().is_err());
    }
}
