//! Declarative option schemas and the token parser that checks them.
//!
//! A schema lists the flags a command accepts and how many positional
//! arguments it takes. Tokens that do not fit are rejected before the
//! handler ever runs.

use std::collections::BTreeMap;

use crate::error::OptionError;

/// Type of a flag's value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueKind {
    Text,
    /// Non-negative integer
    Number,
}

/// What a positional argument holds. Drives path autocompletion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArgKind {
    Path,
    Text,
}

/// One accepted flag: `--name` and optionally `-c`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlagSpec {
    pub name: &'static str,
    pub short: Option<char>,
    pub value: Option<ValueKind>,
}

impl FlagSpec {
    fn display(&self) -> String {
        match self.short {
            Some(c) => format!("-{}", c),
            None => format!("--{}", self.name),
        }
    }
}

/// Accepted flags and positional arguments of a command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptionSchema {
    flags: Vec<FlagSpec>,
    /// Kind of the first positional argument, when it differs from the rest
    first_arg: Option<ArgKind>,
    arg_kind: ArgKind,
    min_args: usize,
    max_args: Option<usize>,
    /// Every token is positional; no flag parsing at all
    raw: bool,
}

impl OptionSchema {
    /// No flags, no arguments.
    pub fn none() -> Self {
        Self {
            flags: Vec::new(),
            first_arg: None,
            arg_kind: ArgKind::Text,
            min_args: 0,
            max_args: Some(0),
            raw: false,
        }
    }

    /// Any number of text arguments, flags included, taken verbatim.
    pub fn raw() -> Self {
        Self {
            max_args: None,
            raw: true,
            ..Self::none()
        }
    }

    /// A boolean flag.
    pub fn flag(mut self, name: &'static str, short: Option<char>) -> Self {
        self.flags.push(FlagSpec {
            name,
            short,
            value: None,
        });
        self
    }

    /// A flag that takes a value (`-n 5`, `-n5`, `--lines=5`, `--lines 5`).
    pub fn value_flag(mut self, name: &'static str, short: Option<char>, kind: ValueKind) -> Self {
        self.flags.push(FlagSpec {
            name,
            short,
            value: Some(kind),
        });
        self
    }

    /// Positional arguments: `min..=max` of the given kind (`None` = unbounded).
    pub fn args(mut self, kind: ArgKind, min: usize, max: Option<usize>) -> Self {
        self.arg_kind = kind;
        self.min_args = min;
        self.max_args = max;
        self
    }

    /// Override the kind of the first positional argument (e.g. grep's pattern).
    pub fn first_arg(mut self, kind: ArgKind) -> Self {
        self.first_arg = Some(kind);
        self
    }

    pub fn flags(&self) -> &[FlagSpec] {
        &self.flags
    }

    /// Kind of the positional argument at `index`, if the schema accepts one.
    pub fn arg_kind_at(&self, index: usize) -> Option<ArgKind> {
        if self.max_args.is_some_and(|max| index >= max) {
            return None;
        }
        match (index, self.first_arg) {
            (0, Some(kind)) => Some(kind),
            _ => Some(self.arg_kind),
        }
    }

    /// Index the next positional argument would get after `tokens`.
    pub fn positional_index(&self, tokens: &[String]) -> usize {
        if self.raw {
            return tokens.len();
        }
        let mut index = 0;
        let mut skip_value = false;
        let mut options_done = false;
        for token in tokens {
            if skip_value {
                skip_value = false;
            } else if options_done || !is_flag_token(token) {
                index += 1;
            } else if token == "--" {
                options_done = true;
            } else {
                skip_value = self.awaits_value(token);
            }
        }
        index
    }

    /// Whether a flag token consumes the following token as its value.
    fn awaits_value(&self, token: &str) -> bool {
        if let Some(long) = token.strip_prefix("--") {
            return !long.contains('=')
                && self.find_long(long).is_some_and(|f| f.value.is_some());
        }
        let shorts: Vec<char> = token.chars().skip(1).collect();
        for (i, c) in shorts.iter().enumerate() {
            if let Some(flag) = self.find_short(*c)
                && flag.value.is_some()
            {
                return i + 1 == shorts.len();
            }
        }
        false
    }

    fn find_long(&self, name: &str) -> Option<&FlagSpec> {
        self.flags.iter().find(|f| f.name == name)
    }

    fn find_short(&self, c: char) -> Option<&FlagSpec> {
        self.flags.iter().find(|f| f.short == Some(c))
    }

    /// Check `tokens` against the schema.
    pub fn parse(&self, command: &str, tokens: &[String]) -> Result<ParsedOptions, OptionError> {
        let mut parsed = ParsedOptions {
            command: command.to_string(),
            flags: BTreeMap::new(),
            args: Vec::new(),
        };

        if self.raw {
            parsed.args = tokens.to_vec();
            return Ok(parsed);
        }

        let mut tokens = tokens.iter();
        let mut options_done = false;

        while let Some(token) = tokens.next() {
            if options_done || !is_flag_token(token) {
                parsed.args.push(token.clone());
            } else if token == "--" {
                options_done = true;
            } else if let Some(long) = token.strip_prefix("--") {
                let (name, inline) = match long.split_once('=') {
                    Some((name, value)) => (name, Some(value.to_string())),
                    None => (long, None),
                };
                let flag = self
                    .find_long(name)
                    .ok_or_else(|| OptionError::UnknownFlag(token.clone()))?;
                let value = match (flag.value, inline) {
                    (None, None) => None,
                    (None, Some(_)) => return Err(OptionError::UnknownFlag(token.clone())),
                    (Some(_), Some(value)) => Some(value),
                    (Some(_), None) => Some(
                        tokens
                            .next()
                            .cloned()
                            .ok_or_else(|| OptionError::MissingValue(flag.display()))?,
                    ),
                };
                parsed.insert(flag, value)?;
            } else {
                let chars: Vec<char> = token.chars().skip(1).collect();
                for (i, c) in chars.iter().enumerate() {
                    let flag = self
                        .find_short(*c)
                        .ok_or_else(|| OptionError::UnknownFlag(format!("-{}", c)))?;
                    if flag.value.is_none() {
                        parsed.insert(flag, None)?;
                        continue;
                    }
                    let rest: String = chars[i + 1..].iter().collect();
                    let value = if rest.is_empty() {
                        tokens
                            .next()
                            .cloned()
                            .ok_or_else(|| OptionError::MissingValue(flag.display()))?
                    } else {
                        rest
                    };
                    parsed.insert(flag, Some(value))?;
                    break;
                }
            }
        }

        if parsed.args.len() < self.min_args {
            return Err(OptionError::MissingArgument {
                expected: self.min_args,
            });
        }
        if let Some(max) = self.max_args
            && parsed.args.len() > max
        {
            return Err(OptionError::TooManyArguments { expected: max });
        }

        Ok(parsed)
    }
}

impl Default for OptionSchema {
    fn default() -> Self {
        Self::none()
    }
}

/// `-x`, `--xyz` and `--` are flag tokens; `-` alone is an argument.
fn is_flag_token(token: &str) -> bool {
    token.starts_with('-') && token.len() > 1
}

/// Tokens that passed schema validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedOptions {
    command: String,
    flags: BTreeMap<&'static str, Option<String>>,
    args: Vec<String>,
}

impl ParsedOptions {
    fn insert(&mut self, flag: &FlagSpec, value: Option<String>) -> Result<(), OptionError> {
        if let (Some(ValueKind::Number), Some(v)) = (flag.value, &value)
            && v.parse::<usize>().is_err()
        {
            return Err(OptionError::InvalidNumber {
                flag: flag.display(),
                value: v.clone(),
            });
        }
        self.flags.insert(flag.name, value);
        Ok(())
    }

    /// Name the command was invoked as.
    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn has(&self, name: &str) -> bool {
        self.flags.contains_key(name)
    }

    pub fn value(&self, name: &str) -> Option<&str> {
        self.flags.get(name)?.as_deref()
    }

    /// Value of a [`ValueKind::Number`] flag.
    pub fn number(&self, name: &str) -> Option<usize> {
        self.value(name)?.parse().ok()
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}
