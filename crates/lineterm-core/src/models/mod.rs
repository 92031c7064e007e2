//! Data models shared by the engine and its hosts.
//!
//! - [`OutputRecord`], [`Effect`] - what one execution emits
//! - [`Environment`] - working directory and variables

mod environment;
mod output;

pub use environment::{Environment, is_valid_var_name};
pub use output::{Effect, OutputRecord};
