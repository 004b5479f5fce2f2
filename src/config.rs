use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::blackduck::Connection;
use crate::cli::Cli;
use crate::document::ident::sanitize;

const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Root configuration structure, deserialized from `.bd-spdx-export/config.toml`.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Server connection.
    #[serde(default)]
    pub blackduck: BlackDuckConfig,
    /// Export behaviour.
    #[serde(default)]
    pub export: ExportConfig,
}

#[derive(Debug, Default, Deserialize)]
pub struct BlackDuckConfig {
    pub url: Option<String>,
    pub api_token: Option<String>,
    #[serde(default)]
    pub trust_certs: bool,
    /// Request timeout in seconds.
    pub timeout: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExportConfig {
    pub output: Option<PathBuf>,
    #[serde(default)]
    pub recursive: bool,
    #[serde(default)]
    pub internal: bool,
    #[serde(default)]
    pub normalize_licenses: bool,
    #[serde(default)]
    pub flat: bool,
}

/// Load the configuration file, searching in order:
///
/// 1. `config_override` — path passed via `--config`
/// 2. `<working_dir>/.bd-spdx-export/config.toml`
/// 3. `~/.config/bd-spdx-export/config.toml`
/// 4. Built-in [`Config::default`]
pub fn load_config(working_dir: &Path, config_override: Option<&Path>) -> Result<Config> {
    if let Some(path) = config_override {
        return read_config(path);
    }

    let local_config = working_dir.join(".bd-spdx-export").join("config.toml");
    if local_config.exists() {
        return read_config(&local_config);
    }

    if let Some(home) = dirs::home_dir() {
        let home_config = home
            .join(".config")
            .join("bd-spdx-export")
            .join("config.toml");
        if home_config.exists() {
            return read_config(&home_config);
        }
    }

    Ok(Config::default())
}

fn read_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("invalid config {}", path.display()))
}

/// A required setting that neither the command line, the environment nor
/// the config file provided.
#[derive(Debug, thiserror::Error)]
#[error("{setting} not set; pass {flag}, set {env}, or add it to the config file")]
pub struct MissingSetting {
    pub setting: &'static str,
    pub flag: &'static str,
    pub env: &'static str,
}

/// Fully resolved run settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub connection: Connection,
    pub output: PathBuf,
    pub recursive: bool,
    pub internal: bool,
    pub normalize_licenses: bool,
    pub flat: bool,
}

impl Settings {
    /// Merge command line (and environment, via clap) over the config file.
    pub fn resolve(cli: &Cli, config: Config) -> Result<Self, MissingSetting> {
        let url = cli
            .blackduck_url
            .clone()
            .or(config.blackduck.url)
            .filter(|u| !u.trim().is_empty())
            .ok_or(MissingSetting {
                setting: "BLACKDUCK_URL",
                flag: "--blackduck-url",
                env: "BLACKDUCK_URL",
            })?;
        let api_token = cli
            .blackduck_api_token
            .clone()
            .or(config.blackduck.api_token)
            .filter(|t| !t.trim().is_empty())
            .ok_or(MissingSetting {
                setting: "BLACKDUCK_API_TOKEN",
                flag: "--blackduck-api-token",
                env: "BLACKDUCK_API_TOKEN",
            })?;
        let timeout = cli
            .blackduck_timeout
            .or(config.blackduck.timeout)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let output = cli
            .output
            .clone()
            .or(config.export.output)
            .unwrap_or_else(|| default_output(&cli.project, &cli.project_version));

        Ok(Settings {
            connection: Connection {
                url,
                api_token,
                trust_certs: cli.blackduck_trust_certs || config.blackduck.trust_certs,
                timeout: Duration::from_secs(timeout),
            },
            output,
            recursive: cli.recursive || config.export.recursive,
            internal: cli.internal || config.export.internal,
            normalize_licenses: cli.normalize_licenses || config.export.normalize_licenses,
            flat: cli.flat || config.export.flat,
        })
    }
}

/// `<project>-<version>.spdx.json`, made filesystem-safe.
pub fn default_output(project: &str, version: &str) -> PathBuf {
    PathBuf::from(format!("{}.spdx.json", sanitize(&format!("{}-{}", project, version))))
}
