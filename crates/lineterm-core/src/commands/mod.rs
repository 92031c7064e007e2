//! Command table and dispatch.
//!
//! This module provides:
//! - [`Handler`], the trait every command implements
//! - [`CommandSpec`], a handler plus its option schema
//! - [`CommandTable`], the name -> spec registry
//! - [`dispatch`], which runs one line against a state
//!
//! # Architecture
//!
//! A line is lexed into words, the first word is looked up in the table,
//! the rest is validated against the command's [`OptionSchema`], and only
//! then is the handler invoked. Every failure along the way, a panicking
//! handler included, ends up as an [`OutputRecord::Error`].

mod custom;
mod files;
mod filters;
mod options;
mod result;
mod session;

pub use custom::{LinkCommand, TextCommand};
pub use options::{ArgKind, FlagSpec, OptionSchema, ParsedOptions, ValueKind};
pub use result::CommandResult;

use std::collections::BTreeMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::emulator::EmulatorState;
use crate::error::CommandError;
use crate::models::OutputRecord;
use crate::parser::parse_line;

// =============================================================================
// Handler
// =============================================================================

/// Executable part of a command.
///
/// Handlers are pure: they read the state they are given and describe any
/// change in the returned [`CommandResult`]. Plain functions and closures
/// with the right signature are handlers.
pub trait Handler: Send + Sync {
    fn run(
        &self,
        state: &EmulatorState,
        opts: &ParsedOptions,
    ) -> Result<CommandResult, CommandError>;
}

impl<F> Handler for F
where
    F: Fn(&EmulatorState, &ParsedOptions) -> Result<CommandResult, CommandError> + Send + Sync,
{
    fn run(
        &self,
        state: &EmulatorState,
        opts: &ParsedOptions,
    ) -> Result<CommandResult, CommandError> {
        self(state, opts)
    }
}

// =============================================================================
// Command Spec
// =============================================================================

/// A command's handler plus the options it accepts.
#[derive(Clone)]
pub struct CommandSpec {
    handler: Arc<dyn Handler>,
    schema: OptionSchema,
    summary: String,
}

impl CommandSpec {
    pub fn new(schema: OptionSchema, handler: impl Handler + 'static) -> Self {
        Self {
            handler: Arc::new(handler),
            schema,
            summary: String::new(),
        }
    }

    /// One-line description shown by `help`.
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    pub fn schema(&self) -> &OptionSchema {
        &self.schema
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn handler(&self) -> &dyn Handler {
        self.handler.as_ref()
    }
}

impl fmt::Debug for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandSpec")
            .field("schema", &self.schema)
            .field("summary", &self.summary)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Command Table
// =============================================================================

/// Immutable registry of commands, ordered by name.
#[derive(Clone, Default)]
pub struct CommandTable {
    commands: Arc<BTreeMap<String, CommandSpec>>,
}

impl CommandTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in commands.
    pub fn with_defaults() -> Self {
        Self::new().merge([
            ("cat", files::cat_spec()),
            ("cd", files::cd_spec()),
            ("clear", session::clear_spec()),
            ("cp", files::cp_spec()),
            ("echo", filters::echo_spec()),
            ("export", session::export_spec()),
            ("grep", filters::grep_spec()),
            ("head", filters::head_spec()),
            ("help", session::help_spec()),
            ("history", session::history_spec()),
            ("ls", files::ls_spec()),
            ("mkdir", files::mkdir_spec()),
            ("printenv", session::printenv_spec()),
            ("pwd", files::pwd_spec()),
            ("rm", files::rm_spec()),
            ("rmdir", files::rmdir_spec()),
            ("tail", filters::tail_spec()),
            ("touch", files::touch_spec()),
            ("unset", session::unset_spec()),
            ("wc", filters::wc_spec()),
            ("whoami", session::whoami_spec()),
        ])
    }

    /// Copy with one command added or replaced.
    pub fn with(&self, name: impl Into<String>, spec: CommandSpec) -> Self {
        self.merge([(name.into(), spec)])
    }

    /// Copy with `overrides` added; an override replaces the entry of the
    /// same name.
    pub fn merge<I, N>(&self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (N, CommandSpec)>,
        N: Into<String>,
    {
        let mut commands = Arc::clone(&self.commands);
        let map = Arc::make_mut(&mut commands);
        for (name, spec) in overrides {
            map.insert(name.into(), spec);
        }
        Self { commands }
    }

    /// Copy with one command removed.
    pub fn without(&self, name: &str) -> Self {
        let mut commands = Arc::clone(&self.commands);
        Arc::make_mut(&mut commands).remove(name);
        Self { commands }
    }

    pub fn lookup(&self, name: &str) -> Option<&CommandSpec> {
        self.commands.get(name)
    }

    /// Command names in lexical order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.commands.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CommandSpec)> {
        self.commands.iter().map(|(name, spec)| (name.as_str(), spec))
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl fmt::Debug for CommandTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}

// =============================================================================
// Dispatch
// =============================================================================

/// Run one raw line against `state`.
///
/// Never fails: lookup, option and handler errors are all turned into
/// error records. A whitespace-only line yields an empty result.
pub fn dispatch(state: &EmulatorState, line: &str) -> CommandResult {
    let Some(parsed) = parse_line(line, state.env()) else {
        return CommandResult::empty();
    };

    match run_command(state, &parsed.name, &parsed.args) {
        Ok(result) => result,
        Err(err) => {
            log::debug!("dispatch: {}", err);
            CommandResult::output(vec![OutputRecord::error(err.to_string())])
        }
    }
}

fn run_command(
    state: &EmulatorState,
    name: &str,
    args: &[String],
) -> Result<CommandResult, CommandError> {
    let spec = state
        .commands()
        .lookup(name)
        .ok_or_else(|| CommandError::NotFound(name.to_string()))?;

    let opts = spec
        .schema()
        .parse(name, args)
        .map_err(|source| CommandError::Options {
            command: name.to_string(),
            source,
        })?;

    log::debug!("dispatch: running {} with {} argument(s)", name, opts.args().len());

    match panic::catch_unwind(AssertUnwindSafe(|| spec.handler().run(state, &opts))) {
        Ok(result) => result,
        Err(_) => {
            log::warn!("dispatch: handler for '{}' panicked", name);
            Err(CommandError::failed(name, "command failed unexpectedly"))
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
