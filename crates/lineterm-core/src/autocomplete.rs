//! Tab completion for command names and paths.
//!
//! Completion works on the last word of the line (or a new, empty word when
//! the line ends in whitespace):
//! - The first word completes against the command table
//! - Later words complete against the filesystem, but only where the
//!   command's option schema expects a path
//!
//! When several candidates match, the word is extended to their longest
//! common prefix and no candidate is picked. Everything before the word is
//! kept byte for byte, so completing an already completed line returns it
//! unchanged.

use crate::commands::ArgKind;
use crate::emulator::EmulatorState;
use crate::parser::{Lexer, Word};

// ============================================================================
// Completion Target
// ============================================================================

/// The word under the cursor and what it may complete to.
struct Target {
    /// The word as lexed: expanded text plus its raw span in the line.
    word: Word,
    /// Byte length of the directory part (up to the last `/`) of the
    /// expanded text.
    dir_len: usize,
    /// Full replacement words, sorted.
    candidates: Vec<String>,
}

impl Target {
    fn locate(state: &EmulatorState, line: &str) -> Option<Self> {
        let mut words = Lexer::new(line).with_env(state.env()).tokenize();
        let ends_in_word = words.last().is_some_and(|w| w.span.end == line.len());
        let word = if ends_in_word {
            words.pop()?
        } else {
            Word {
                text: String::new(),
                span: line.len()..line.len(),
            }
        };

        let candidates = match words.split_first() {
            None => command_candidates(state, &word.text),
            Some((command, args)) => path_candidates(state, &command.text, args, &word.text)?,
        };
        let dir_len = word.text.rfind('/').map_or(0, |idx| idx + 1);

        Some(Self {
            word,
            dir_len,
            candidates,
        })
    }

    /// Replacement for the raw word that spells `completion`.
    ///
    /// When the name after the last `/` was typed literally, only that name
    /// is replaced and the directory part keeps its original spelling
    /// (quotes, `$VAR`). Otherwise the whole word is rewritten.
    fn replacement(&self, state: &EmulatorState, line: &str, completion: &str) -> String {
        let raw = &line[self.word.span.clone()];
        let name = &self.word.text[self.dir_len..];
        let literal_dir = raw
            .strip_suffix(name)
            .filter(|dir| dir.is_empty() || dir.ends_with('/'));

        if let Some(dir) = literal_dir {
            let spelled = format!("{}{}", dir, quote(&completion[self.dir_len..]));
            // An open quote in the directory part would swallow the name
            let words = Lexer::new(&spelled).with_env(state.env()).tokenize();
            if matches!(words.as_slice(), [word] if word.text == completion) {
                return spelled;
            }
        }
        quote(completion)
    }
}

// ============================================================================
// Public API
// ============================================================================

/// Complete `partial` as far as it is unambiguous.
///
/// - One candidate: the word becomes that candidate
/// - Several: the word becomes their longest common prefix
/// - None, nothing completable, or nothing new to add: `partial` is
///   returned unchanged
pub fn complete(state: &EmulatorState, partial: &str) -> String {
    if partial.trim().is_empty() {
        return partial.to_string();
    }
    let Some(target) = Target::locate(state, partial) else {
        return partial.to_string();
    };

    let completion = find_common_prefix(&target.candidates);
    if target.candidates.is_empty() || completion == target.word.text {
        return partial.to_string();
    }

    format!(
        "{}{}",
        &partial[..target.word.span.start],
        target.replacement(state, partial, &completion)
    )
}

/// Every word the last word of `partial` could complete to, sorted.
pub fn candidates(state: &EmulatorState, partial: &str) -> Vec<String> {
    if partial.trim().is_empty() {
        return Vec::new();
    }
    Target::locate(state, partial)
        .map(|target| target.candidates)
        .unwrap_or_default()
}

// ============================================================================
// Candidates
// ============================================================================

fn command_candidates(state: &EmulatorState, prefix: &str) -> Vec<String> {
    state
        .commands()
        .names()
        .filter(|name| name.starts_with(prefix))
        .map(str::to_string)
        .collect()
}

/// `None` when the word is not in a path position.
fn path_candidates(
    state: &EmulatorState,
    command: &str,
    args: &[Word],
    partial: &str,
) -> Option<Vec<String>> {
    if partial.starts_with('-') {
        return None;
    }
    let schema = state.commands().lookup(command)?.schema();
    let mut tokens: Vec<String> = args.iter().map(|w| w.text.clone()).collect();
    let index = schema.positional_index(&tokens);

    // A word consumed as a flag value (`head -n <word>`) is not positional
    tokens.push(partial.to_string());
    if schema.positional_index(&tokens) == index
        || schema.arg_kind_at(index) != Some(ArgKind::Path)
    {
        return None;
    }

    let (dir_part, name_part) = match partial.rfind('/') {
        Some(idx) => (&partial[..=idx], &partial[idx + 1..]),
        None => ("", partial),
    };
    let search_dir = if dir_part.is_empty() {
        state.env().cwd().to_string()
    } else {
        state.env().resolve_path(dir_part)
    };
    let entries = state.fs().list(&search_dir).ok()?;

    let show_hidden = name_part.starts_with('.');
    Some(
        entries
            .into_iter()
            .filter(|name| name.starts_with(name_part))
            .filter(|name| show_hidden || !name.starts_with('.'))
            .map(|name| format!("{}{}", dir_part, name))
            .collect(),
    )
}

// ============================================================================
// Utilities
// ============================================================================

/// Find the longest common prefix of several strings.
fn find_common_prefix(strings: &[String]) -> String {
    let Some((first, rest)) = strings.split_first() else {
        return String::new();
    };

    let mut prefix_len = first.len();
    for s in rest {
        prefix_len = first
            .char_indices()
            .zip(s.chars())
            .take_while(|((i, a), b)| *i < prefix_len && a == b)
            .map(|((i, a), _)| i + a.len_utf8())
            .last()
            .unwrap_or(0);
    }

    first[..prefix_len].to_string()
}

/// Double-quote a word if the lexer would otherwise split or reinterpret it.
fn quote(word: &str) -> String {
    let needs_quotes = word
        .chars()
        .any(|c| c.is_whitespace() || matches!(c, '"' | '\'' | '\\' | '$'));
    if !needs_quotes {
        return word.to_string();
    }

    let mut quoted = String::with_capacity(word.len() + 2);
    quoted.push('"');
    for c in word.chars() {
        if matches!(c, '"' | '\\' | '$') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{CommandTable, TextCommand};
    use crate::filesystem::VirtualFs;

    fn state() -> EmulatorState {
        let fs = VirtualFs::from_entries([
            ("/README.txt", Some("hello".to_string())),
            ("/.profile", Some(String::new())),
            ("/etc", None),
            ("/etc/hosts", Some(String::new())),
            ("/etc/hostname", Some(String::new())),
            ("/my docs", None),
        ])
        .unwrap();
        EmulatorState::new(fs, CommandTable::with_defaults())
    }

    fn table(names: &[&str]) -> CommandTable {
        names.iter().fold(CommandTable::new(), |table, name| {
            table.with(*name, TextCommand::spec("", None))
        })
    }

    #[test]
    fn test_command_completion_single() {
        let state = state().with_commands(table(&["help", "history"]));
        assert_eq!(complete(&state, "he"), "help");
    }

    #[test]
    fn test_command_completion_ambiguous_keeps_common_prefix() {
        let state = state().with_commands(table(&["ls", "ln"]));
        assert_eq!(complete(&state, "l"), "l");
        assert_eq!(candidates(&state, "l"), vec!["ln", "ls"]);

        let state = state.with_commands(table(&["history", "hist"]));
        assert_eq!(complete(&state, "h"), "hist");
    }

    #[test]
    fn test_no_match_is_unchanged() {
        assert_eq!(complete(&state(), "xyz"), "xyz");
        assert_eq!(complete(&state(), ""), "");
        assert_eq!(complete(&state(), "   "), "   ");
    }

    #[test]
    fn test_leading_whitespace_preserved() {
        assert_eq!(complete(&state(), "  pw"), "  pwd");
    }

    #[test]
    fn test_path_completion() {
        let state = state();
        assert_eq!(complete(&state, "cat R"), "cat README.txt");
        assert_eq!(complete(&state, "cat /etc/ho"), "cat /etc/host");
        assert_eq!(complete(&state, "cat /etc/hostn"), "cat /etc/hostname");
        assert_eq!(
            candidates(&state, "cat /etc/"),
            vec!["/etc/hostname", "/etc/hosts"]
        );
    }

    #[test]
    fn test_path_completion_relative_to_cwd() {
        let state = state().execute("cd /etc");
        assert_eq!(complete(&state, "cat hostn"), "cat hostname");
        assert_eq!(complete(&state, "cat ../R"), "cat ../README.txt");
    }

    #[test]
    fn test_hidden_entries_need_a_dot() {
        let state = state();
        assert!(!candidates(&state, "cat ").contains(&".profile".to_string()));
        assert_eq!(complete(&state, "cat ."), "cat .profile");
    }

    #[test]
    fn test_completion_is_quoted() {
        assert_eq!(complete(&state(), "cd my"), "cd \"my docs\"");
        assert_eq!(complete(&state(), "cd \"my"), "cd \"my docs\"");
    }

    #[test]
    fn test_only_path_positions_complete() {
        let state = state();
        assert_eq!(complete(&state, "echo R"), "echo R");
        assert_eq!(complete(&state, "grep R"), "grep R");
        assert_eq!(complete(&state, "grep x R"), "grep x README.txt");
        assert_eq!(complete(&state, "ls -"), "ls -");
        assert_eq!(complete(&state, "pwd R"), "pwd R");
        assert_eq!(complete(&state, "frobnicate R"), "frobnicate R");
        assert_eq!(complete(&state, "head -n R"), "head -n R");
    }

    #[test]
    fn test_missing_directory_is_unchanged() {
        assert_eq!(complete(&state(), "cat nope/x"), "cat nope/x");
    }

    #[test]
    fn test_idempotent_on_completed_lines() {
        let state = state();
        for line in ["help", "cat README.txt", "cat /etc/host", "cd \"my docs\"", "l"] {
            let once = complete(&state, line);
            assert_eq!(complete(&state, &once), once, "line: {}", line);
        }
    }

    #[test]
    fn test_completed_quoted_word_is_unchanged() {
        let state = state();
        for line in [
            "cat 'README.txt'",
            "cat \"README.txt\"",
            "cat READ\\ME.txt",
            "cat $HOME/README.txt",
            "cat $PWD/etc",
            "cd 'my docs'",
        ] {
            assert_eq!(complete(&state, line), line);
        }
    }

    #[test]
    fn test_variable_directory_keeps_its_spelling() {
        let state = state();
        assert_eq!(complete(&state, "cat $HOME/REA"), "cat $HOME/README.txt");
        assert_eq!(complete(&state, "cat ${PWD}etc/hostn"), "cat ${PWD}etc/hostname");
        assert_eq!(complete(&state, "cat '/etc'/hostn"), "cat '/etc'/hostname");
        assert_eq!(complete(&state, "cd '/my"), "cd \"/my docs\"");
    }

    #[test]
    fn test_common_prefix() {
        let strings = vec![
            "hello".to_string(),
            "help".to_string(),
            "helicopter".to_string(),
        ];
        assert_eq!(find_common_prefix(&strings), "hel");
        assert_eq!(find_common_prefix(&["ab".to_string(), "xy".to_string()]), "");
        assert_eq!(
            find_common_prefix(&["naïve".to_string(), "naïf".to_string()]),
            "naï"
        );
    }
}
