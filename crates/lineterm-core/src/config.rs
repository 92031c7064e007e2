//! Engine configuration.
//!
//! Centralizes default constants and the declarative startup configuration
//! ([`TerminalConfig`]) a host deserializes from its own format.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::commands::{CommandSpec, CommandTable, LinkCommand, TextCommand};
use crate::error::ConfigError;
use crate::filesystem::VirtualFs;
use crate::models::Environment;

// =============================================================================
// Session Defaults
// =============================================================================

/// Value of `USER` in a fresh environment.
pub const DEFAULT_USER: &str = "guest";

/// Value of `HOSTNAME` in a fresh environment.
pub const DEFAULT_HOSTNAME: &str = "localhost";

/// Value of `HOME` in a fresh environment.
pub const DEFAULT_HOME: &str = "/";

// =============================================================================
// Command Defaults
// =============================================================================

/// Default number of lines for `head`.
pub const DEFAULT_HEAD_LINES: usize = 10;

/// Default number of lines for `tail`.
pub const DEFAULT_TAIL_LINES: usize = 10;

// =============================================================================
// Startup Configuration
// =============================================================================

/// Declarative description of an emulator session.
///
/// ```toml
/// [filesystem]
/// "/README.txt" = { content = "hello" }
/// "/etc" = {}
///
/// [env]
/// USER = "sysadmin"
///
/// [commands.register]
/// open = "https://example.com/form"
/// summary = "Sign up"
/// ```
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct TerminalConfig {
    /// Absolute path -> node. Nodes without `content` are directories.
    pub filesystem: BTreeMap<String, NodeConfig>,
    /// Variables set on top of the defaults.
    pub env: BTreeMap<String, String>,
    /// Commands added to (or replacing) the default table.
    pub commands: BTreeMap<String, CommandConfig>,
}

/// One filesystem entry: a file when `content` is present, else a directory.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct NodeConfig {
    #[serde(default)]
    pub content: Option<String>,
}

/// A command defined by configuration instead of code.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum CommandConfig {
    /// Prints fixed text.
    Text {
        text: String,
        #[serde(default)]
        summary: Option<String>,
    },
    /// Asks the host to open a URL.
    Link {
        open: String,
        #[serde(default)]
        summary: Option<String>,
    },
}

impl CommandConfig {
    fn into_spec(self) -> CommandSpec {
        match self {
            Self::Text { text, summary } => TextCommand::spec(text, summary),
            Self::Link { open, summary } => LinkCommand::spec(open, summary),
        }
    }
}

impl TerminalConfig {
    pub fn build_fs(&self) -> Result<VirtualFs, ConfigError> {
        VirtualFs::from_entries(
            self.filesystem
                .iter()
                .map(|(path, node)| (path.clone(), node.content.clone())),
        )
    }

    pub fn build_env(&self) -> Result<Environment, ConfigError> {
        self.env
            .iter()
            .try_fold(Environment::new(), |env, (key, value)| {
                env.with_var(key, value).map_err(ConfigError::from)
            })
    }

    /// Default command table with the configured commands merged on top.
    pub fn build_commands(&self) -> CommandTable {
        let overrides = self
            .commands
            .iter()
            .map(|(name, cmd)| (name.clone(), cmd.clone().into_spec()));
        CommandTable::with_defaults().merge(overrides)
    }
}
