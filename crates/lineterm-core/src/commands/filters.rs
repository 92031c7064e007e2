//! Text commands: `echo`, `head`, `tail`, `grep`, `wc`.
//!
//! All of them read whole files from the virtual filesystem and work line
//! by line. With several files, each file's output is labelled.

use regex::RegexBuilder;

use crate::commands::{ArgKind, CommandResult, CommandSpec, OptionSchema, ParsedOptions, ValueKind};
use crate::config::{DEFAULT_HEAD_LINES, DEFAULT_TAIL_LINES};
use crate::emulator::EmulatorState;
use crate::error::CommandError;
use crate::models::OutputRecord;

/// Run `f` over the content of each file argument from `skip` on.
fn for_each_file<F>(state: &EmulatorState, opts: &ParsedOptions, skip: usize, mut f: F) -> Vec<OutputRecord>
where
    F: FnMut(&str, &str) -> Option<String>,
{
    opts.args()[skip.min(opts.args().len())..]
        .iter()
        .filter_map(|typed| {
            let path = state.env().resolve_path(typed);
            match state.fs().read(&path) {
                Ok(content) => f(typed, content).map(OutputRecord::text),
                Err(err) => Some(OutputRecord::error(
                    CommandError::fs(opts.command(), err.with_path(typed.as_str())).to_string(),
                )),
            }
        })
        .collect()
}

// =============================================================================
// echo
// =============================================================================

pub(super) fn echo_spec() -> CommandSpec {
    CommandSpec::new(OptionSchema::raw(), echo).with_summary("print arguments")
}

fn echo(_state: &EmulatorState, opts: &ParsedOptions) -> Result<CommandResult, CommandError> {
    Ok(CommandResult::text(opts.args().join(" ")))
}

// =============================================================================
// head / tail
// =============================================================================

fn lines_schema() -> OptionSchema {
    OptionSchema::none()
        .value_flag("lines", Some('n'), ValueKind::Number)
        .args(ArgKind::Path, 1, None)
}

fn labelled(label: Option<&str>, body: String) -> String {
    match label {
        Some(name) => format!("==> {} <==\n{}", name, body),
        None => body,
    }
}

pub(super) fn head_spec() -> CommandSpec {
    CommandSpec::new(lines_schema(), head).with_summary("print the first lines of files")
}

fn head(state: &EmulatorState, opts: &ParsedOptions) -> Result<CommandResult, CommandError> {
    let n = opts.number("lines").unwrap_or(DEFAULT_HEAD_LINES);
    let multiple = opts.args().len() > 1;

    Ok(CommandResult::output(for_each_file(state, opts, 0, |name, content| {
        let body = content.lines().take(n).collect::<Vec<_>>().join("\n");
        Some(labelled(multiple.then_some(name), body))
    })))
}

pub(super) fn tail_spec() -> CommandSpec {
    CommandSpec::new(lines_schema(), tail).with_summary("print the last lines of files")
}

fn tail(state: &EmulatorState, opts: &ParsedOptions) -> Result<CommandResult, CommandError> {
    let n = opts.number("lines").unwrap_or(DEFAULT_TAIL_LINES);
    let multiple = opts.args().len() > 1;

    Ok(CommandResult::output(for_each_file(state, opts, 0, |name, content| {
        let lines: Vec<&str> = content.lines().collect();
        let body = lines[lines.len().saturating_sub(n)..].join("\n");
        Some(labelled(multiple.then_some(name), body))
    })))
}

// =============================================================================
// grep
// =============================================================================

pub(super) fn grep_spec() -> CommandSpec {
    CommandSpec::new(
        OptionSchema::none()
            .flag("ignore-case", Some('i'))
            .flag("line-number", Some('n'))
            .flag("invert-match", Some('v'))
            .args(ArgKind::Path, 2, None)
            .first_arg(ArgKind::Text),
        grep,
    )
    .with_summary("print lines matching a pattern")
}

fn grep(state: &EmulatorState, opts: &ParsedOptions) -> Result<CommandResult, CommandError> {
    let pattern = opts
        .args()
        .first()
        .ok_or_else(|| CommandError::failed(opts.command(), "missing pattern"))?;
    let regex = RegexBuilder::new(pattern)
        .case_insensitive(opts.has("ignore-case"))
        .build()
        .map_err(|_| {
            CommandError::failed(opts.command(), format!("invalid regular expression '{}'", pattern))
        })?;

    let invert = opts.has("invert-match");
    let numbered = opts.has("line-number");
    let multiple = opts.args().len() > 2;

    let output = for_each_file(state, opts, 1, |name, content| {
        let matched: Vec<String> = content
            .lines()
            .enumerate()
            .filter(|(_, line)| regex.is_match(line) != invert)
            .map(|(i, line)| {
                let mut prefix = String::new();
                if multiple {
                    prefix.push_str(name);
                    prefix.push(':');
                }
                if numbered {
                    prefix.push_str(&format!("{}:", i + 1));
                }
                format!("{}{}", prefix, line)
            })
            .collect();

        (!matched.is_empty()).then(|| matched.join("\n"))
    });

    Ok(CommandResult::output(output))
}

// =============================================================================
// wc
// =============================================================================

pub(super) fn wc_spec() -> CommandSpec {
    CommandSpec::new(OptionSchema::none().args(ArgKind::Path, 1, None), wc)
        .with_summary("count lines, words and bytes")
}

fn wc(state: &EmulatorState, opts: &ParsedOptions) -> Result<CommandResult, CommandError> {
    Ok(CommandResult::output(for_each_file(state, opts, 0, |name, content| {
        Some(format!(
            "{} {} {} {}",
            content.lines().count(),
            content.split_whitespace().count(),
            content.len(),
            name
        ))
    })))
}
