//! Output records emitted by one execution.

use serde::Serialize;

/// A request for the host to do something the engine has no authority to
/// do itself.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum Effect {
    /// Open an external resource.
    Navigate { url: String },
    /// Wipe whatever the host has rendered so far.
    ClearScreen,
}

/// One unit of rendered output.
///
/// Records are plain values: two executions of the same line against the
/// same state produce equal records. JSON form is
/// `{"type": "text", "content": "..."}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "content", rename_all = "snake_case")]
pub enum OutputRecord {
    /// Plain text (may span several lines)
    Text(String),
    /// Error message
    Error(String),
    /// Echo of the submitted command line
    Header { command: String },
    /// External effect signal
    Effect(Effect),
}

impl OutputRecord {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    pub fn error(s: impl Into<String>) -> Self {
        Self::Error(s.into())
    }

    pub fn header(command: impl Into<String>) -> Self {
        Self::Header {
            command: command.into(),
        }
    }

    pub fn navigate(url: impl Into<String>) -> Self {
        Self::Effect(Effect::Navigate { url: url.into() })
    }

    pub fn clear_screen() -> Self {
        Self::Effect(Effect::ClearScreen)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}
