//! Application configuration: the engine binaries and launch flags, the temp
//! directory override, and an open-ended table of extra engine options.
//!
//! Resolution order: explicit file > `~/.config/pagecap/config.toml` >
//! built-in defaults.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

use crate::engine::EngineOptions;
use crate::error::{PagecapError, Result};

const DEFAULT_NAVIGATION_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    /// Node binary used to run the engine helper.
    pub node_binary: String,
    /// Package-manager binary used to locate the engine's npm module.
    pub npm_binary: String,
    /// Proxy server passed to the browser (e.g. "socks5://127.0.0.1:9050").
    pub proxy_server: Option<String>,
    /// Explicit browser executable; engine default when absent.
    pub chrome_path: Option<PathBuf>,
    /// Disables the browser sandbox (containers without user namespaces).
    pub no_sandbox: bool,
    /// Directory temp artifacts are written to; platform temp dir when absent.
    pub temp_dir: Option<PathBuf>,
    /// Page navigation timeout, forwarded to the engine.
    #[serde(with = "humantime_serde")]
    pub navigation_timeout: Duration,
    /// Extra engine options applied verbatim through the generic option
    /// channel.
    pub additional_options: BTreeMap<String, toml::Value>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            node_binary: "node".to_string(),
            npm_binary: "npm".to_string(),
            proxy_server: None,
            chrome_path: None,
            no_sandbox: false,
            temp_dir: None,
            navigation_timeout: DEFAULT_NAVIGATION_TIMEOUT,
            additional_options: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Loads configuration: the explicit path if given, else the central
    /// config file if present, else defaults. Parse failures name the file.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let candidate = match path {
            Some(explicit) => Some(explicit.to_path_buf()),
            None => Self::central_config_path().filter(|p| p.exists()),
        };

        let config = match candidate {
            Some(file) => {
                let raw = std::fs::read_to_string(&file).map_err(|err| {
                    PagecapError::Config(format!(
                        "Failed to read config {}: {}",
                        file.display(),
                        err
                    ))
                })?;
                toml::from_str(&raw).map_err(|err| {
                    PagecapError::Config(format!(
                        "Invalid config ({}): {}",
                        file.display(),
                        err
                    ))
                })?
            }
            None => Self::default(),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn central_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("pagecap").join("config.toml"))
    }

    pub fn validate(&self) -> Result<()> {
        if self.node_binary.trim().is_empty() {
            return Err(PagecapError::Config(
                "node-binary must not be empty".to_string(),
            ));
        }
        if self.npm_binary.trim().is_empty() {
            return Err(PagecapError::Config(
                "npm-binary must not be empty".to_string(),
            ));
        }
        if self.navigation_timeout.is_zero() {
            return Err(PagecapError::Config(
                "navigation-timeout must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            node_command: self.node_binary.clone(),
            npm_command: self.npm_binary.clone(),
            proxy_server: self.proxy_server.clone(),
            chrome_path: self.chrome_path.clone(),
            no_sandbox: self.no_sandbox,
        }
    }

    pub fn navigation_timeout(&self) -> Duration {
        self.navigation_timeout
    }

    /// The additional options as engine-ready JSON values. Values TOML can
    /// express but JSON cannot are skipped with a warning.
    pub fn additional_options(&self) -> Vec<(String, Value)> {
        self.additional_options
            .iter()
            .filter_map(|(key, value)| match serde_json::to_value(value) {
                Ok(json) => Some((key.clone(), json)),
                Err(err) => {
                    log::warn!("skipping additional option {:?}: {}", key, err);
                    None
                }
            })
            .collect()
    }
}
