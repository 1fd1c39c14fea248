//! Configuration file loading with environment variable overrides.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::params::GenerationOptions;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// HTTP server and local storage settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Database connection settings.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Image generation provider settings.
    #[serde(default)]
    pub provider: ProviderConfig,
}

/// HTTP server and local storage settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to listen on.
    pub bind: String,
    /// Directory holding generated image files.
    pub images_dir: PathBuf,
    /// `tracing` filter used when `RUST_LOG` is unset.
    pub log_level: String,
    /// Emit log records as newline-delimited JSON.
    pub log_json: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8000".to_string(),
            images_dir: PathBuf::from("images"),
            log_level: "info".to_string(),
            log_json: false,
        }
    }
}

/// Database connection settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database user.
    pub user: String,
    /// Database password.
    pub password: String,
    /// Database host.
    pub host: String,
    /// Database port.
    pub port: u16,
    /// Schema name.
    pub name: String,
    /// Fixed size of the connection pool.
    pub pool_size: u32,
    /// How long a request waits for a free pooled connection.
    pub acquire_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            user: String::new(),
            password: String::new(),
            host: "localhost".to_string(),
            port: 3306,
            name: "pixyproxy".to_string(),
            pool_size: 10,
            acquire_timeout_secs: 30,
        }
    }
}

/// Image generation provider settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Base URL of the OpenAI-compatible API.
    pub base_url: String,
    /// Bearer token for the API.
    pub api_key: String,
    /// Model name.
    pub model: String,
    /// Style: `vivid` or `natural`.
    pub style: String,
    /// Quality: `standard` or `hd`.
    pub quality: String,
    /// Size, e.g. `1024x1024`.
    pub size: String,
    /// Upper bound on a single provider call.
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "http://aitools.cs.vt.edu:7860/openai/v1".to_string(),
            api_key: "aitools".to_string(),
            model: "dall-e-3".to_string(),
            style: "vivid".to_string(),
            quality: "hd".to_string(),
            size: "1024x1024".to_string(),
            timeout_secs: 120,
        }
    }
}

impl Config {
    /// Load configuration from the given path, or return defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
        toml::from_str(&contents)
            .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))
    }

    /// Overlay values from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric variable cannot be parsed.
    pub fn apply_env(&mut self) -> Result<(), String> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Overlay values from `lookup`, keyed by environment variable name.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), String> {
        let db = &mut self.database;
        if let Some(v) = lookup("DB_USER") {
            db.user = v;
        }
        if let Some(v) = lookup("DB_PASSWORD") {
            db.password = v;
        }
        if let Some(v) = lookup("DB_HOST") {
            db.host = v;
        }
        if let Some(v) = lookup("DB_PORT") {
            db.port = parse_var("DB_PORT", &v)?;
        }
        if let Some(v) = lookup("DB_NAME") {
            db.name = v;
        }
        if let Some(v) = lookup("DB_POOL_SIZE") {
            db.pool_size = parse_var("DB_POOL_SIZE", &v)?;
        }

        if let Some(v) = lookup("OPENAI_BASE_URL") {
            self.provider.base_url = v;
        }
        if let Some(v) = lookup("OPENAI_API_KEY") {
            self.provider.api_key = v;
        }

        if let Some(v) = lookup("PIXY_BIND") {
            self.server.bind = v;
        }
        if let Some(v) = lookup("PIXY_IMAGES_DIR") {
            self.server.images_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup("PIXY_LOG") {
            self.server.log_level = v;
        }
        if let Some(v) = lookup("PIXY_LOG_JSON") {
            self.server.log_json = v == "1" || v.eq_ignore_ascii_case("true");
        }
        Ok(())
    }

    /// Check cross-field constraints and parse the provider options.
    ///
    /// # Errors
    ///
    /// Returns an error describing the first invalid setting.
    pub fn generation_options(&self) -> Result<GenerationOptions, String> {
        if self.database.pool_size == 0 {
            return Err("database.pool_size must be at least 1".to_string());
        }
        if self.provider.timeout_secs == 0 {
            return Err("provider.timeout_secs must be at least 1".to_string());
        }
        let p = &self.provider;
        GenerationOptions::parse(&p.model, &p.style, &p.quality, &p.size)
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, String> {
    value.parse().map_err(|_| format!("{key} has an invalid value '{value}'"))
}

/// Discover the config file path using the resolution order:
/// 1. Explicit path (from `--config` flag)
/// 2. `PIXY_CONFIG` environment variable
/// 3. `pixyproxy.toml` in the working directory
#[must_use]
pub fn discover_config_path(explicit: Option<&str>) -> PathBuf {
    if let Some(p) = explicit {
        return PathBuf::from(p);
    }

    if let Ok(p) = std::env::var("PIXY_CONFIG") {
        return PathBuf::from(p);
    }

    PathBuf::from("pixyproxy.toml")
}
