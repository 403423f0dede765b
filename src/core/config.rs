use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, net::SocketAddr, path::PathBuf};
use tracing::debug;

pub const DEFAULT_FEED_URL: &str = "https://www.ecb.europa.eu/stats/eurofxref/eurofxref-daily.xml";
pub const DEFAULT_FEED_NAMESPACE: &str = "http://www.ecb.int/vocabulary/2002-08-01/eurofxref";
pub const DEFAULT_TABLE_NAME: &str = "exchange_rates";
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8080";

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct FeedConfig {
    pub url: String,
    pub namespace: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        FeedConfig {
            url: DEFAULT_FEED_URL.to_string(),
            namespace: DEFAULT_FEED_NAMESPACE.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct StoreConfig {
    pub table: String,
    pub data_path: Option<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            table: DEFAULT_TABLE_NAME.to_string(),
            data_path: None,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ServerConfig {
    pub listen_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

impl AppConfig {
    /// Loads the default config file (if present) and applies environment overrides.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        let mut config = if config_path.exists() {
            Self::load_file(&config_path)?
        } else {
            debug!("No config file at {}, using defaults", config_path.display());
            Self::default()
        };
        config.apply_env();
        Ok(config)
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let mut config = Self::load_file(path)?;
        config.apply_env();
        Ok(config)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("eu", "eurofx", "eurofx")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.store.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("eu", "eurofx", "eurofx")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.server
            .listen_addr
            .parse()
            .with_context(|| format!("Invalid listen address: {}", self.server.listen_addr))
    }

    fn load_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    fn apply_env(&mut self) {
        dotenvy::dotenv().ok();
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Overrides file values with `FEED_URL`, `FEED_NAMESPACE`, `TABLE_NAME`,
    /// `EUROFX_DATA_PATH` and `EUROFX_LISTEN_ADDR`. Empty values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get("FEED_URL") {
            self.feed.url = url;
        }
        if let Some(namespace) = get("FEED_NAMESPACE") {
            self.feed.namespace = namespace;
        }
        if let Some(table) = get("TABLE_NAME") {
            self.store.table = table;
        }
        if let Some(data_path) = get("EUROFX_DATA_PATH") {
            self.store.data_path = Some(data_path);
        }
        if let Some(addr) = get("EUROFX_LISTEN_ADDR") {
            self.server.listen_addr = addr;
        }
    }
}
