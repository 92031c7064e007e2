//! Host configuration file.
//!
//! The file is the engine's [`TerminalConfig`] plus an optional `[host]`
//! table for settings only the terminal front end cares about:
//!
//! ```toml
//! [host]
//! banner = "Welcome!"
//! allowed_domains = ["docs.google.com"]
//!
//! [filesystem."/README.txt"]
//! content = "hello"
//! ```

use std::fs;
use std::path::Path;

use lineterm_core::TerminalConfig;
use serde::Deserialize;

use crate::error::CliError;

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Printed once when an interactive session starts.
    pub banner: Option<String>,
    /// Hosts that `open` links may point at. Empty allows any http(s) host.
    pub allowed_domains: Vec<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub host: HostConfig,
    #[serde(flatten)]
    pub terminal: TerminalConfig,
}

impl CliConfig {
    pub fn load(path: &Path) -> Result<Self, CliError> {
        let text = fs::read_to_string(path).map_err(|source| CliError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&text).map_err(|source| CliError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!(
            "config: loaded {} ({} filesystem entries, {} commands)",
            path.display(),
            config.terminal.filesystem.len(),
            config.terminal.commands.len()
        );
        Ok(config)
    }

    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}
