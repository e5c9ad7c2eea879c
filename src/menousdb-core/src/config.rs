use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const ENV_URL: &str = "MENOUSDB_URL";
pub const ENV_KEY: &str = "MENOUSDB_KEY";
pub const ENV_DATABASE: &str = "MENOUSDB_DATABASE";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClientConfig {
    pub url: String,
    pub key: String,
    #[serde(default)]
    pub database: Option<String>,

    /// Request timeout in seconds, 0 disables it
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub insecure_skip_verify: bool,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("menousdb-rs/{}", env!("CARGO_PKG_VERSION"))
}

impl ClientConfig {
    pub fn new(url: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            key: key.into(),
            ..Self::default()
        }
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config: ClientConfig = serde_json::from_str(&contents)
            .with_context(|| format!("invalid config file {}", path.display()))?;
        Ok(config)
    }

    /// Build a config from `MENOUSDB_URL`, `MENOUSDB_KEY` and `MENOUSDB_DATABASE`
    pub fn from_env() -> anyhow::Result<Self> {
        let url = std::env::var(ENV_URL).with_context(|| format!("{} is not set", ENV_URL))?;
        let key = std::env::var(ENV_KEY).with_context(|| format!("{} is not set", ENV_KEY))?;
        let mut config = Self::new(url, key);
        config.database = std::env::var(ENV_DATABASE).ok();
        Ok(config)
    }

    /// Base URL with a guaranteed trailing slash
    pub fn normalized_url(&self) -> String {
        normalize_url(&self.url)
    }

    pub fn database(&self) -> Option<&str> {
        self.database.as_deref().filter(|db| !db.is_empty())
    }

    pub fn timeout(&self) -> Option<Duration> {
        if self.timeout_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.timeout_secs))
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:5555/".to_string(),
            key: String::new(),
            database: None,
            timeout_secs: default_timeout_secs(),
            insecure_skip_verify: false,
            user_agent: default_user_agent(),
        }
    }
}

pub fn normalize_url(url: &str) -> String {
    if url.ends_with('/') {
        url.to_string()
    } else {
        format!("{}/", url)
    }
}
