//! Configuration management with file persistence

use anyhow::{Context, anyhow};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

use crate::storage::default_database_path;
use crate::voxyl::VOXYL_BASE_URL;

/// Upper bound for `api.max_retries`
const MAX_RETRIES_LIMIT: u32 = 10;

/// VoxStats configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub database: DatabaseSettings,
}

/// Stats API settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Only ever set from code; a key found in the file fails validation
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub retry_delay_secs: u64,
    pub cache_ttl_secs: u64,
}

/// Local database settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// Database file; the platform data directory when unset
    pub path: Option<PathBuf>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: VOXYL_BASE_URL.to_string(),
            timeout_secs: 10,
            max_retries: 3,
            retry_delay_secs: 5,
            cache_ttl_secs: 300,
        }
    }
}

impl ApiConfig {
    pub fn resolved_api_key(&self) -> anyhow::Result<Option<String>> {
        self.enforce_env_only()?;

        Ok(pick_api_key(
            env::var("VOXSTATS_API_KEY").ok(),
            env::var("API_KEY").ok(),
        ))
    }

    pub fn redacted_api_key(&self) -> anyhow::Result<Option<String>> {
        self.resolved_api_key().map(|opt| opt.map(|key| redact(&key)))
    }

    pub fn enforce_env_only(&self) -> anyhow::Result<()> {
        if self.api_key.is_some() {
            return Err(anyhow!(
                "Stats API keys must be provided via environment variables, not stored in configuration"
            ));
        }
        Ok(())
    }

    fn validate(&self) -> anyhow::Result<()> {
        self.enforce_env_only()?;
        validate_base_url(&self.base_url)?;
        if self.max_retries > MAX_RETRIES_LIMIT {
            return Err(anyhow!(
                "api.max_retries must be at most {}",
                MAX_RETRIES_LIMIT
            ));
        }
        if self.timeout_secs == 0 {
            return Err(anyhow!("api.timeout_secs must be greater than 0"));
        }
        Ok(())
    }
}

impl DatabaseSettings {
    /// Database file to open: `VOXSTATS_DB_PATH`, then config, then the default
    pub fn resolved_path(&self) -> PathBuf {
        self.resolve_with_override(env::var("VOXSTATS_DB_PATH").ok())
    }

    fn resolve_with_override(&self, env_path: Option<String>) -> PathBuf {
        env_path
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
            .or_else(|| self.path.clone())
            .unwrap_or_else(default_database_path)
    }
}

/// First non-blank key wins
fn pick_api_key(primary: Option<String>, fallback: Option<String>) -> Option<String> {
    primary
        .into_iter()
        .chain(fallback)
        .map(|key| key.trim().to_string())
        .find(|key| !key.is_empty())
}

fn redact(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 4 {
        "***".to_string()
    } else {
        let suffix: String = chars[chars.len() - 4..].iter().collect();
        format!("***{}", suffix)
    }
}

fn validate_base_url(url: &str) -> anyhow::Result<()> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(anyhow!(
            "api.base_url must start with http:// or https://, got: {}",
            url
        ))
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> anyhow::Result<PathBuf> {
        let dir = if let Ok(custom_dir) = env::var("VOXSTATS_CONFIG_DIR") {
            PathBuf::from(custom_dir)
        } else {
            dirs::config_dir()
                .ok_or_else(|| anyhow!("Could not determine config directory"))?
                .join("voxstats")
        };
        Ok(dir)
    }

    /// Get the config file path
    pub fn config_path() -> anyhow::Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from file, or the defaults if it doesn't exist
    pub fn load() -> anyhow::Result<Self> {
        let path = Self::config_path()?;

        if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            Self::from_toml(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Parse and validate a TOML document
    pub fn from_toml(contents: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> anyhow::Result<()> {
        self.validate()?;

        let dir = Self::config_dir()?;
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;

        let path = Self::config_path()?;
        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(&path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        self.api.validate()
    }

    /// Get a configuration value by key
    pub fn get(&self, key: &str) -> anyhow::Result<String> {
        match key {
            "api.base_url" => Ok(self.api.base_url.clone()),
            "api.timeout_secs" => Ok(self.api.timeout_secs.to_string()),
            "api.max_retries" => Ok(self.api.max_retries.to_string()),
            "api.retry_delay_secs" => Ok(self.api.retry_delay_secs.to_string()),
            "api.cache_ttl_secs" => Ok(self.api.cache_ttl_secs.to_string()),

            "database.path" => Ok(self.database.resolved_path().display().to_string()),

            // Shown redacted, never stored
            "api.api_key" | "api_key" => match self.api.redacted_api_key()? {
                Some(redacted) => Ok(redacted),
                None => Ok("(not set - use VOXSTATS_API_KEY or API_KEY env var)".to_string()),
            },

            _ => Err(anyhow!(
                "Unknown configuration key: {}. Use `voxstats config list` to see available keys.",
                key
            )),
        }
    }

    /// Set a configuration value by key
    pub fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        match key {
            "api.base_url" => {
                validate_base_url(value)?;
                self.api.base_url = value.trim_end_matches('/').to_string();
            }
            "api.timeout_secs" => {
                let secs: u64 = value
                    .parse()
                    .with_context(|| format!("Invalid timeout_secs value: {}", value))?;
                if secs == 0 {
                    return Err(anyhow!("Timeout must be greater than 0"));
                }
                self.api.timeout_secs = secs;
            }
            "api.max_retries" => {
                let retries: u32 = value
                    .parse()
                    .with_context(|| format!("Invalid max_retries value: {}", value))?;
                if retries > MAX_RETRIES_LIMIT {
                    return Err(anyhow!("Max retries must be at most {}", MAX_RETRIES_LIMIT));
                }
                self.api.max_retries = retries;
            }
            "api.retry_delay_secs" => {
                self.api.retry_delay_secs = value
                    .parse()
                    .with_context(|| format!("Invalid retry_delay_secs value: {}", value))?;
            }
            "api.cache_ttl_secs" => {
                self.api.cache_ttl_secs = value
                    .parse()
                    .with_context(|| format!("Invalid cache_ttl_secs value: {}", value))?;
            }

            "database.path" => {
                let trimmed = value.trim();
                self.database.path = if trimmed.is_empty() {
                    None
                } else {
                    Some(PathBuf::from(trimmed))
                };
            }

            "api.api_key" | "api_key" => {
                return Err(anyhow!(
                    "API keys cannot be stored in configuration for security. \
                     Set the VOXSTATS_API_KEY or API_KEY environment variable instead."
                ));
            }

            _ => {
                return Err(anyhow!(
                    "Unknown configuration key: {}. Use `voxstats config list` to see available keys.",
                    key
                ));
            }
        }
        Ok(())
    }

    /// List all configuration keys and their values
    pub fn list(&self) -> anyhow::Result<Vec<(String, String)>> {
        let keys = [
            "api.base_url",
            "api.timeout_secs",
            "api.max_retries",
            "api.retry_delay_secs",
            "api.cache_ttl_secs",
            "api.api_key",
            "database.path",
        ];

        keys.into_iter()
            .map(|key| {
                let value = self.get(key)?;
                Ok((key.to_string(), value))
            })
            .collect()
    }

    /// Reset configuration to defaults
    pub fn reset() -> anyhow::Result<()> {
        let path = Self::config_path()?;
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove config file: {}", path.display()))?;
        }
        Ok(())
    }
}
