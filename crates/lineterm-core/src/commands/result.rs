//! Command execution result type.

use crate::commands::CommandTable;
use crate::filesystem::VirtualFs;
use crate::models::{Environment, OutputRecord};

/// Result of executing a command.
///
/// Commands produce output and optionally replace parts of the state. Parts
/// left as `None` are carried over unchanged.
#[derive(Clone, Debug, Default)]
pub struct CommandResult {
    /// Output records to display
    pub output: Vec<OutputRecord>,
    /// Replacement filesystem (e.g., after `mkdir`)
    pub fs: Option<VirtualFs>,
    /// Replacement environment (e.g., after `cd`)
    pub env: Option<Environment>,
    /// Replacement command table
    pub commands: Option<CommandTable>,
}

impl CommandResult {
    /// Create a result with just output, no state changes.
    pub fn output(records: Vec<OutputRecord>) -> Self {
        Self {
            output: records,
            ..Self::default()
        }
    }

    /// Create a result with a single text record.
    pub fn text(s: impl Into<String>) -> Self {
        Self::output(vec![OutputRecord::text(s)])
    }

    /// Create an empty result (no output, no changes).
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_fs(mut self, fs: VirtualFs) -> Self {
        self.fs = Some(fs);
        self
    }

    pub fn with_env(mut self, env: Environment) -> Self {
        self.env = Some(env);
        self
    }

    pub fn with_commands(mut self, commands: CommandTable) -> Self {
        self.commands = Some(commands);
        self
    }
}
