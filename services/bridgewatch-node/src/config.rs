use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::Context;
use bridgewatch_core::logging::LogFormat;
use bridgewatch_core::MonitorConfig;
use bridgewatch_fleet::DEFAULT_EVENT_BUFFER;
use serde::Deserialize;

pub const ENV_LISTEN: &str = "BRIDGEWATCH_LISTEN";
pub const ENV_FEED_LISTEN: &str = "BRIDGEWATCH_FEED_LISTEN";
pub const ENV_DATA_FILE: &str = "BRIDGEWATCH_DATA_FILE";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    pub listen_addr: SocketAddr,
    pub feed_addr: SocketAddr,
    pub data_file: PathBuf,
    pub log_format: LogFormat,
    pub event_buffer: usize,
    pub monitor: MonitorConfig,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            feed_addr: SocketAddr::from(([0, 0, 0, 0], 3001)),
            data_file: PathBuf::from("data/bridges.json"),
            log_format: LogFormat::default(),
            event_buffer: DEFAULT_EVENT_BUFFER,
            monitor: MonitorConfig::default(),
        }
    }
}

impl NodeConfig {
    /// Defaults, or the TOML file at `path`, then environment overrides.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.with_overrides(|key| std::env::var(key).ok())
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(raw).context("invalid node configuration")?;
        config.monitor.validate()?;
        if config.event_buffer == 0 {
            anyhow::bail!("event_buffer must be greater than zero");
        }
        Ok(config)
    }

    pub fn with_overrides<F>(mut self, lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup(ENV_LISTEN) {
            self.listen_addr = addr
                .parse()
                .with_context(|| format!("{ENV_LISTEN} is not a socket address: {addr}"))?;
        }
        if let Some(addr) = lookup(ENV_FEED_LISTEN) {
            self.feed_addr = addr
                .parse()
                .with_context(|| format!("{ENV_FEED_LISTEN} is not a socket address: {addr}"))?;
        }
        if let Some(path) = lookup(ENV_DATA_FILE) {
            self.data_file = PathBuf::from(path);
        }
        Ok(self)
    }
}
