//! Session commands: `help`, `history`, `printenv`, `export`, `unset`,
//! `whoami`, `clear`.

use crate::commands::{ArgKind, CommandResult, CommandSpec, OptionSchema, ParsedOptions};
use crate::emulator::EmulatorState;
use crate::error::CommandError;
use crate::models::OutputRecord;

pub(super) fn help_spec() -> CommandSpec {
    CommandSpec::new(OptionSchema::none(), help).with_summary("list available commands")
}

fn help(state: &EmulatorState, _opts: &ParsedOptions) -> Result<CommandResult, CommandError> {
    let width = state.commands().names().map(str::len).max().unwrap_or(0);
    let lines: Vec<String> = state
        .commands()
        .iter()
        .map(|(name, spec)| format!("{:<width$}  {}", name, spec.summary()).trim_end().to_string())
        .collect();

    Ok(CommandResult::text(format!("Commands:\n{}", lines.join("\n"))))
}

pub(super) fn history_spec() -> CommandSpec {
    CommandSpec::new(OptionSchema::none(), history).with_summary("show command history")
}

fn history(state: &EmulatorState, _opts: &ParsedOptions) -> Result<CommandResult, CommandError> {
    let lines: Vec<String> = state
        .history()
        .entries()
        .iter()
        .enumerate()
        .map(|(i, line)| format!("{:>5}  {}", i + 1, line))
        .collect();

    Ok(CommandResult::text(lines.join("\n")))
}

// =============================================================================
// Variables
// =============================================================================

pub(super) fn printenv_spec() -> CommandSpec {
    CommandSpec::new(OptionSchema::none().args(ArgKind::Text, 0, Some(1)), printenv)
        .with_summary("print environment variables")
}

fn printenv(state: &EmulatorState, opts: &ParsedOptions) -> Result<CommandResult, CommandError> {
    match opts.args().first() {
        Some(name) => Ok(state
            .env()
            .get(name)
            .map(CommandResult::text)
            .unwrap_or_default()),
        None => {
            let lines: Vec<String> = state
                .env()
                .vars()
                .into_iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect();
            Ok(CommandResult::text(lines.join("\n")))
        }
    }
}

pub(super) fn export_spec() -> CommandSpec {
    CommandSpec::new(OptionSchema::none().args(ArgKind::Text, 0, None), export)
        .with_summary("set environment variables")
}

fn export(state: &EmulatorState, opts: &ParsedOptions) -> Result<CommandResult, CommandError> {
    if opts.args().is_empty() {
        let lines: Vec<String> = state
            .env()
            .vars()
            .into_iter()
            .map(|(k, v)| format!("export {}=\"{}\"", k, v))
            .collect();
        return Ok(CommandResult::text(lines.join("\n")));
    }

    let mut env = state.env().clone();
    let mut output = Vec::new();

    for arg in opts.args() {
        let (key, value) = match arg.split_once('=') {
            Some((key, value)) => (key, Some(value)),
            None => (arg.as_str(), None),
        };
        let updated = match value {
            Some(value) => env.with_var(key, value),
            // `export NAME` without a value keeps the current one
            None => env.with_var(key, env.get(key).unwrap_or_default()),
        };
        match updated {
            Ok(updated) => env = updated,
            Err(err) => output.push(OutputRecord::error(
                CommandError::failed(opts.command(), err.to_string()).to_string(),
            )),
        }
    }

    Ok(CommandResult::output(output).with_env(env))
}

pub(super) fn unset_spec() -> CommandSpec {
    CommandSpec::new(OptionSchema::none().args(ArgKind::Text, 1, None), unset)
        .with_summary("remove environment variables")
}

fn unset(state: &EmulatorState, opts: &ParsedOptions) -> Result<CommandResult, CommandError> {
    let env = opts
        .args()
        .iter()
        .fold(state.env().clone(), |env, key| env.without_var(key));
    Ok(CommandResult::empty().with_env(env))
}

pub(super) fn whoami_spec() -> CommandSpec {
    CommandSpec::new(OptionSchema::none(), whoami).with_summary("print the current user")
}

fn whoami(state: &EmulatorState, opts: &ParsedOptions) -> Result<CommandResult, CommandError> {
    state
        .env()
        .get("USER")
        .map(CommandResult::text)
        .ok_or_else(|| CommandError::failed(opts.command(), "USER is not set"))
}

// =============================================================================
// Screen
// =============================================================================

pub(super) fn clear_spec() -> CommandSpec {
    CommandSpec::new(OptionSchema::none(), clear).with_summary("clear the screen")
}

fn clear(_state: &EmulatorState, _opts: &ParsedOptions) -> Result<CommandResult, CommandError> {
    Ok(CommandResult::output(vec![OutputRecord::clear_screen()]))
}
