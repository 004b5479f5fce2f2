use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "bd-spdx-export",
    about = "Export a Black Duck project version as an SPDX 2.2 JSON document",
    version
)]
pub struct Cli {
    /// Black Duck project name
    pub project: String,

    /// Black Duck project version name
    #[arg(value_name = "VERSION")]
    pub project_version: String,

    /// Output file; `-` writes to stdout [default: <project>-<version>.spdx.json]
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Black Duck server URL
    #[arg(long, env = "BLACKDUCK_URL", value_name = "URL")]
    pub blackduck_url: Option<String>,

    /// Black Duck API token
    #[arg(long, env = "BLACKDUCK_API_TOKEN", value_name = "TOKEN", hide_env_values = true)]
    pub blackduck_api_token: Option<String>,

    /// Accept untrusted TLS certificates from the server
    #[arg(long, env = "BLACKDUCK_TRUST_CERTS")]
    pub blackduck_trust_certs: bool,

    /// Request timeout in seconds
    #[arg(long, env = "BLACKDUCK_TIMEOUT", value_name = "SECS")]
    pub blackduck_timeout: Option<u64>,

    /// Expand components that are Black Duck projects into their own BOMs
    #[arg(long)]
    pub recursive: bool,

    /// Add external references back to the Black Duck records
    #[arg(long)]
    pub internal: bool,

    /// Map common license names (e.g. "MIT License") to SPDX identifiers
    #[arg(long)]
    pub normalize_licenses: bool,

    /// Ignore the dependency hierarchy even when the server provides it
    #[arg(long)]
    pub flat: bool,

    /// Config file [default: ./.bd-spdx-export/config.toml, fallback ~/.config/bd-spdx-export/config.toml]
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Debug logging and a detailed summary
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only print a one-line summary
    #[arg(short, long)]
    pub quiet: bool,
}
