//! Line-terminal emulator engine.
//!
//! This crate provides:
//! - [`VirtualFs`], a persistent in-memory filesystem
//! - [`CommandTable`] and the built-in commands
//! - [`EmulatorState`] and [`Emulator`], the execute step and history recall
//! - [`complete`] and [`candidates`] for tab completion
//! - [`TerminalConfig`], a serde-friendly startup description
//!
//! The engine does no I/O. Hosts feed it lines and render the
//! [`OutputRecord`]s it returns, including [`Effect`]s such as opening a URL.

mod autocomplete;
pub mod commands;
pub mod config;
mod emulator;
pub mod error;
mod filesystem;
mod history;
pub mod models;
pub mod parser;

pub use autocomplete::{candidates, complete};
pub use commands::{CommandResult, CommandSpec, CommandTable, Handler, OptionSchema, ParsedOptions};
pub use config::TerminalConfig;
pub use emulator::{Emulator, EmulatorState};
pub use error::{CommandError, ConfigError, EnvironmentError, FsError, OptionError};
pub use filesystem::{DirEntry, FsNode, VirtualFs};
pub use history::HistoryBuffer;
pub use models::{Effect, Environment, OutputRecord};
