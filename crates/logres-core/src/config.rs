use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Global configuration loaded from `~/.config/logres/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogresConfig {
    /// Seconds allowed for connection establishment per download.
    pub connect_timeout_secs: u64,
    /// Overall per-download timeout in seconds. Resource payloads can be
    /// large, so the default is generous.
    pub transfer_timeout_secs: u64,
    /// Optional receive-speed cap in bytes per second (None = no cap).
    #[serde(default)]
    pub max_recv_bytes_per_sec: Option<u64>,
    /// Optional receive buffer size in bytes (None = library default).
    #[serde(default)]
    pub recv_buffer_bytes: Option<usize>,
}

impl Default for LogresConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 30,
            transfer_timeout_secs: 3600,
            max_recv_bytes_per_sec: None,
            recv_buffer_bytes: None,
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("logres")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<LogresConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = LogresConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: LogresConfig = toml::from_str(&data)?;
    Ok(cfg)
}
