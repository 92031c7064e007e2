//! Lexer for splitting a command line into words.
//!
//! Handles:
//! - Whitespace word separation
//! - Single quotes (literal) and double quotes (escapes, variables)
//! - Backslash escapes outside quotes
//! - Variable references (`$VAR`, `${VAR}`)
//!
//! Every word keeps the byte span it was read from, so callers such as the
//! autocompleter can replace a word without disturbing the rest of the line.

use std::ops::Range;

use crate::models::Environment;

// =============================================================================
// Word
// =============================================================================

/// A word produced by the lexer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    /// Text after quote removal and expansion
    pub text: String,
    /// Byte range of the raw word in the input
    pub span: Range<usize>,
}

/// Result of reading a variable name after `$`
enum VariableRead {
    /// Successfully read variable name
    Name(String),
    /// Empty variable (just `$` or `${}`)
    Empty,
    /// Unclosed brace `${...` without closing `}`
    UnclosedBrace(String),
}

// =============================================================================
// Lexer
// =============================================================================

/// Lexer for command lines.
///
/// Without an environment, `$VAR` references are kept literally.
pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    env: Option<&'a Environment>,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given input
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            env: None,
        }
    }

    /// Expand variables from `env` while lexing.
    pub fn with_env(mut self, env: &'a Environment) -> Self {
        self.env = Some(env);
        self
    }

    /// Tokenize the entire input into a vector
    pub fn tokenize(self) -> Vec<Word> {
        self.collect()
    }

    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn current_char(&self) -> char {
        self.input[self.pos..].chars().next().unwrap_or('\0')
    }

    /// Consume and return the current character.
    fn bump(&mut self) -> char {
        let c = self.current_char();
        self.pos += c.len_utf8();
        c
    }

    fn skip_whitespace(&mut self) {
        while !self.at_end() && self.current_char().is_whitespace() {
            self.bump();
        }
    }

    fn parse_word(&mut self) -> Word {
        let start = self.pos;
        let mut text = String::new();

        while !self.at_end() {
            match self.current_char() {
                c if c.is_whitespace() => break,
                '\'' => {
                    self.bump();
                    self.read_single_quoted(&mut text);
                }
                '"' => {
                    self.bump();
                    self.read_double_quoted(&mut text);
                }
                '\\' => {
                    self.bump();
                    if self.at_end() {
                        text.push('\\');
                    } else {
                        text.push(self.bump());
                    }
                }
                '$' => {
                    self.bump();
                    self.expand_variable(&mut text);
                }
                _ => text.push(self.bump()),
            }
        }

        Word {
            text,
            span: start..self.pos,
        }
    }

    /// Read up to the closing `'`. An unclosed quote runs to end of input.
    fn read_single_quoted(&mut self, text: &mut String) {
        while !self.at_end() {
            let c = self.bump();
            if c == '\'' {
                return;
            }
            text.push(c);
        }
    }

    /// Read up to the closing `"`, handling escapes and variables.
    fn read_double_quoted(&mut self, text: &mut String) {
        while !self.at_end() {
            let c = self.bump();
            match c {
                '"' => return,
                '\\' if !self.at_end() => match self.bump() {
                    'n' => text.push('\n'),
                    't' => text.push('\t'),
                    escaped @ ('"' | '\\' | '$') => text.push(escaped),
                    other => {
                        text.push('\\');
                        text.push(other);
                    }
                },
                '$' => self.expand_variable(text),
                _ => text.push(c),
            }
        }
    }

    /// Expand a variable reference after the `$` has been consumed.
    fn expand_variable(&mut self, text: &mut String) {
        let used_braces = self.current_char() == '{';
        match self.read_variable_name() {
            VariableRead::Name(name) => match self.env {
                Some(env) => text.push_str(env.get(&name).unwrap_or_default()),
                None if used_braces => text.push_str(&format!("${{{}}}", name)),
                None => {
                    text.push('$');
                    text.push_str(&name);
                }
            },
            VariableRead::Empty => text.push('$'),
            VariableRead::UnclosedBrace(partial) => text.push_str(&format!("${{{}", partial)),
        }
    }

    /// Read a variable name after the `$` has been consumed.
    /// Handles both `$VAR` and `${VAR}` syntax.
    fn read_variable_name(&mut self) -> VariableRead {
        // Handle ${VAR} syntax
        if self.current_char() == '{' {
            self.bump();
            let start = self.pos;
            while !self.at_end() {
                let c = self.current_char();
                if c == '}' {
                    let name = self.input[start..self.pos].to_string();
                    self.bump();
                    return if name.is_empty() {
                        VariableRead::Empty
                    } else {
                        VariableRead::Name(name)
                    };
                }
                // An unclosed brace never swallows the next word
                if c.is_whitespace() {
                    break;
                }
                self.bump();
            }
            return VariableRead::UnclosedBrace(self.input[start..self.pos].to_string());
        }

        // Handle $VAR syntax
        let start = self.pos;
        while !self.at_end() {
            let c = self.current_char();
            if !c.is_ascii_alphanumeric() && c != '_' {
                break;
            }
            self.bump();
        }

        let name = &self.input[start..self.pos];
        if name.is_empty() {
            VariableRead::Empty
        } else {
            VariableRead::Name(name.to_string())
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Word;

    fn next(&mut self) -> Option<Self::Item> {
        self.skip_whitespace();
        if self.at_end() {
            return None;
        }
        Some(self.parse_word())
    }
}

// =============================================================================
// Tests
// =============================================================================
