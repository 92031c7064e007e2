//! Commands defined by configuration rather than code.

use crate::commands::{CommandResult, CommandSpec, Handler, OptionSchema, ParsedOptions};
use crate::emulator::EmulatorState;
use crate::error::CommandError;
use crate::models::OutputRecord;

/// Prints a fixed block of text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextCommand {
    text: String,
}

impl TextCommand {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Spec taking no arguments, with an optional `help` summary.
    pub fn spec(text: impl Into<String>, summary: Option<String>) -> CommandSpec {
        CommandSpec::new(OptionSchema::none(), Self::new(text)).with_summary(summary.unwrap_or_default())
    }
}

impl Handler for TextCommand {
    fn run(&self, _state: &EmulatorState, _opts: &ParsedOptions) -> Result<CommandResult, CommandError> {
        Ok(CommandResult::text(self.text.clone()))
    }
}

/// Asks the host to open a URL.
///
/// The engine never navigates itself; it only emits
/// [`Effect::Navigate`](crate::models::Effect::Navigate).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkCommand {
    url: String,
}

impl LinkCommand {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    pub fn spec(url: impl Into<String>, summary: Option<String>) -> CommandSpec {
        CommandSpec::new(OptionSchema::none(), Self::new(url)).with_summary(summary.unwrap_or_default())
    }
}

impl Handler for LinkCommand {
    fn run(&self, _state: &EmulatorState, _opts: &ParsedOptions) -> Result<CommandResult, CommandError> {
        Ok(CommandResult::output(vec![OutputRecord::navigate(self.url.clone())]))
    }
}
