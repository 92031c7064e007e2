//! Line-mode input handling.
//!
//! Ordinary lines go to the engine. A few host-only lines stand in for the
//! keys a graphical terminal would bind:
//!
//! | line | key |
//! |---|---|
//! | `\up` | arrow up (previous history entry) |
//! | `\down` | arrow down (next history entry) |
//! | `\complete <partial>` | tab |
//! | `\candidates <partial>` | double tab |
//! | `exit` | close the session |

use std::io::Write;

use lineterm_core::{EmulatorState, candidates, complete};

use crate::error::CliError;
use crate::render::Renderer;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Control {
    Continue,
    Exit,
}

pub struct Session<W: Write, E: Write> {
    state: EmulatorState,
    renderer: Renderer<W, E>,
}

impl<W: Write, E: Write> Session<W, E> {
    pub fn new(state: EmulatorState, renderer: Renderer<W, E>) -> Self {
        Self { state, renderer }
    }

    pub fn state(&self) -> &EmulatorState {
        &self.state
    }

    /// `user@host:cwd$ `
    pub fn prompt(&self) -> String {
        let env = self.state.env();
        format!(
            "{}@{}:{}$ ",
            env.get("USER").unwrap_or_default(),
            env.get("HOSTNAME").unwrap_or_default(),
            env.cwd()
        )
    }

    pub fn show_prompt(&mut self) -> Result<(), CliError> {
        let prompt = self.prompt();
        Ok(self.renderer.prompt(&prompt)?)
    }

    pub fn handle(&mut self, line: &str) -> Result<Control, CliError> {
        if line.trim() == "exit" {
            return Ok(Control::Exit);
        }

        if let Some(partial) = line.strip_prefix("\\complete ") {
            let completed = complete(&self.state, partial);
            self.renderer.line(&completed)?;
        } else if let Some(partial) = line.strip_prefix("\\candidates ") {
            for candidate in candidates(&self.state, partial) {
                self.renderer.line(&candidate)?;
            }
        } else if line == "\\up" {
            let (state, recalled) = self.state.recall_previous();
            self.state = state;
            self.renderer.line(&recalled)?;
        } else if line == "\\down" {
            let (state, recalled) = self.state.recall_next();
            self.state = state;
            self.renderer.line(&recalled)?;
        } else {
            self.state = self.state.execute(line);
            self.renderer.render(self.state.outputs())?;
        }

        Ok(Control::Continue)
    }
}

#[cfg(test)]
impl Session<Vec<u8>, Vec<u8>> {
    fn into_output(self) -> (String, String) {
        let (out, err) = self.renderer.into_parts();
        (
            String::from_utf8(out).unwrap_or_default(),
            String::from_utf8(err).unwrap_or_default(),
        )
    }
}
