//! Command line parsing.
//!
//! Quoting rules:
//! - Words are separated by whitespace
//! - `'...'` is taken literally
//! - `"..."` honors `\"`, `\\`, `\$`, `\n`, `\t` and expands variables
//! - `\x` outside quotes escapes `x`
//! - `$VAR` / `${VAR}` expand from the environment (unknown -> empty)
//! - An unclosed quote runs to the end of the line
//! - An unclosed `${` is kept literally and ends at whitespace

mod lexer;

pub use lexer::{Lexer, Word};

use crate::models::Environment;

/// A command line split into name and arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine {
    pub name: String,
    pub args: Vec<String>,
}

/// Split a line into a command name and its arguments.
///
/// Returns `None` for empty or whitespace-only input.
pub fn parse_line(input: &str, env: &Environment) -> Option<ParsedLine> {
    let mut words = Lexer::new(input).with_env(env).map(|w| w.text);
    let name = words.next()?;
    Some(ParsedLine {
        name,
        args: words.collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_line() {
        let env = Environment::new();
        let parsed = parse_line("head -n 2 /etc/hosts", &env).unwrap();
        assert_eq!(parsed.name, "head");
        assert_eq!(parsed.args, vec!["-n", "2", "/etc/hosts"]);
    }

    #[test]
    fn test_parse_empty_line() {
        let env = Environment::new();
        assert_eq!(parse_line("", &env), None);
        assert_eq!(parse_line("  \t", &env), None);
    }

    #[test]
    fn test_parse_expands_variables() {
        let env = Environment::new().with_cwd("/etc");
        let parsed = parse_line("ls $PWD", &env).unwrap();
        assert_eq!(parsed.args, vec!["/etc"]);
    }
}
