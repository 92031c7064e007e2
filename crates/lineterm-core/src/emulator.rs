//! Emulator state and the execute step.
//!
//! [`EmulatorState`] is an immutable snapshot. Every operation that changes
//! something returns a new snapshot; callers keep the current one in a
//! variable and reassign it:
//!
//! ```
//! use lineterm_core::{CommandTable, EmulatorState, OutputRecord, VirtualFs};
//!
//! let fs = VirtualFs::from_entries([("/README.txt", Some("hello".to_string()))]).unwrap();
//! let state = EmulatorState::new(fs, CommandTable::with_defaults());
//!
//! let state = state.execute("cat README.txt");
//! assert_eq!(state.outputs()[1], OutputRecord::text("hello"));
//! ```

use std::sync::Arc;

use crate::autocomplete;
use crate::commands::{self, CommandTable};
use crate::config::TerminalConfig;
use crate::error::ConfigError;
use crate::filesystem::VirtualFs;
use crate::history::HistoryBuffer;
use crate::models::{Environment, OutputRecord};

// =============================================================================
// EmulatorState
// =============================================================================

/// Everything a session consists of: filesystem, commands, environment,
/// the latest execution's output, and history.
///
/// Cloning is cheap; all parts share their data behind `Arc`s.
#[derive(Clone, Debug)]
pub struct EmulatorState {
    fs: VirtualFs,
    commands: CommandTable,
    env: Environment,
    outputs: Arc<Vec<OutputRecord>>,
    history: HistoryBuffer,
}

impl EmulatorState {
    /// Fresh session with the default environment and empty history.
    pub fn new(fs: VirtualFs, commands: CommandTable) -> Self {
        Self {
            fs,
            commands,
            env: Environment::new(),
            outputs: Arc::default(),
            history: HistoryBuffer::new(),
        }
    }

    /// Build a session from declarative configuration.
    pub fn from_config(config: &TerminalConfig) -> Result<Self, ConfigError> {
        let state = Self::new(config.build_fs()?, config.build_commands()).with_env(config.build_env()?);
        log::debug!(
            "emulator: {} commands, {} filesystem entries",
            state.commands.len(),
            config.filesystem.len()
        );
        Ok(state)
    }

    pub fn fs(&self) -> &VirtualFs {
        &self.fs
    }

    pub fn commands(&self) -> &CommandTable {
        &self.commands
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    /// Records produced by the most recent [`execute`](Self::execute).
    pub fn outputs(&self) -> &[OutputRecord] {
        &self.outputs
    }

    pub fn history(&self) -> &HistoryBuffer {
        &self.history
    }

    pub fn with_fs(&self, fs: VirtualFs) -> Self {
        Self { fs, ..self.clone() }
    }

    pub fn with_env(&self, env: Environment) -> Self {
        Self { env, ..self.clone() }
    }

    pub fn with_commands(&self, commands: CommandTable) -> Self {
        Self {
            commands,
            ..self.clone()
        }
    }

    pub fn with_history(&self, history: HistoryBuffer) -> Self {
        Self {
            history,
            ..self.clone()
        }
    }

    /// Run one line and return the resulting state.
    ///
    /// The line is always recorded in history, including empty lines and
    /// unknown commands. The new outputs start with a
    /// [`Header`](OutputRecord::Header) echoing the line.
    pub fn execute(&self, line: &str) -> Self {
        let mut history = self.history.clone();
        history.push(line);

        // Handlers see the history with the current line in it
        let before = self.with_history(history);
        let result = commands::dispatch(&before, line);

        let mut outputs = Vec::with_capacity(result.output.len() + 1);
        outputs.push(OutputRecord::header(line));
        outputs.extend(result.output);

        Self {
            fs: result.fs.unwrap_or(before.fs),
            commands: result.commands.unwrap_or(before.commands),
            env: result.env.unwrap_or(before.env),
            outputs: Arc::new(outputs),
            history: before.history,
        }
    }

    /// Move the history cursor towards older entries (up arrow).
    pub fn recall_previous(&self) -> (Self, String) {
        let mut history = self.history.clone();
        let line = history.recall_previous();
        (self.with_history(history), line)
    }

    /// Move the history cursor towards newer entries (down arrow).
    pub fn recall_next(&self) -> (Self, String) {
        let mut history = self.history.clone();
        let line = history.recall_next();
        (self.with_history(history), line)
    }

    /// Tab completion for a partially typed line.
    pub fn complete(&self, partial: &str) -> String {
        autocomplete::complete(self, partial)
    }
}

/// Two states are equal when they would behave the same for built-in
/// commands: same tree, environment, outputs, history and command names.
impl PartialEq for EmulatorState {
    fn eq(&self, other: &Self) -> bool {
        self.fs == other.fs
            && self.env == other.env
            && self.outputs == other.outputs
            && self.history == other.history
            && self.commands.names().eq(other.commands.names())
    }
}

// =============================================================================
// Emulator
// =============================================================================

/// Stateless entry point mirroring the state methods, for callers that
/// prefer `emulator.execute(&state, line)`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Emulator;

impl Emulator {
    pub fn new() -> Self {
        Self
    }

    pub fn execute(&self, state: &EmulatorState, line: &str) -> EmulatorState {
        state.execute(line)
    }

    pub fn complete(&self, state: &EmulatorState, partial: &str) -> String {
        autocomplete::complete(state, partial)
    }

    pub fn candidates(&self, state: &EmulatorState, partial: &str) -> Vec<String> {
        autocomplete::candidates(state, partial)
    }
}
