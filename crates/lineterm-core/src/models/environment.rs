//! Session environment: working directory and string variables.
//!
//! Variables live in the emulator state, so `export` and `unset` return a
//! new [`Environment`] rather than touching any storage.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::{DEFAULT_HOME, DEFAULT_HOSTNAME, DEFAULT_USER};
use crate::error::EnvironmentError;
use crate::filesystem::VirtualFs;

/// Check if a variable name is valid.
///
/// Valid names must:
/// - Not be empty
/// - Start with a letter or underscore
/// - Contain only alphanumeric characters and underscores
pub fn is_valid_var_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };

    if !first.is_ascii_alphabetic() && first != '_' {
        return false;
    }

    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Working directory plus variables.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Environment {
    cwd: String,
    vars: Arc<BTreeMap<String, String>>,
}

impl Environment {
    /// Default session: `/` as working directory and the default
    /// `USER`, `HOSTNAME` and `HOME` variables.
    pub fn new() -> Self {
        let vars = [
            ("HOME", DEFAULT_HOME),
            ("HOSTNAME", DEFAULT_HOSTNAME),
            ("USER", DEFAULT_USER),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Self {
            cwd: "/".to_string(),
            vars: Arc::new(vars),
        }
    }

    pub fn cwd(&self) -> &str {
        &self.cwd
    }

    pub fn home(&self) -> &str {
        self.vars.get("HOME").map(String::as_str).unwrap_or("/")
    }

    /// Look up a variable. `PWD` always reflects the working directory.
    pub fn get(&self, key: &str) -> Option<&str> {
        if key == "PWD" {
            return Some(&self.cwd);
        }
        self.vars.get(key).map(String::as_str)
    }

    /// All variables in name order, `PWD` included.
    pub fn vars(&self) -> Vec<(&str, &str)> {
        let mut all: Vec<_> = self
            .vars
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .chain(std::iter::once(("PWD", self.cwd.as_str())))
            .collect();
        all.sort_by(|a, b| a.0.cmp(b.0));
        all
    }

    /// Copy with the working directory replaced. `path` must already be
    /// absolute.
    pub fn with_cwd(&self, path: &str) -> Self {
        Self {
            cwd: VirtualFs::normalize_path(path),
            vars: Arc::clone(&self.vars),
        }
    }

    /// Copy with one variable set.
    pub fn with_var(&self, key: &str, value: &str) -> Result<Self, EnvironmentError> {
        if !is_valid_var_name(key) {
            return Err(EnvironmentError::InvalidName(key.to_string()));
        }
        if key == "PWD" {
            return Err(EnvironmentError::ReadOnly(key.to_string()));
        }
        let mut vars = Arc::clone(&self.vars);
        Arc::make_mut(&mut vars).insert(key.to_string(), value.to_string());
        Ok(Self {
            cwd: self.cwd.clone(),
            vars,
        })
    }

    /// Copy with one variable removed. Unknown names are a no-op.
    pub fn without_var(&self, key: &str) -> Self {
        if !self.vars.contains_key(key) {
            return self.clone();
        }
        let mut vars = Arc::clone(&self.vars);
        Arc::make_mut(&mut vars).remove(key);
        Self {
            cwd: self.cwd.clone(),
            vars,
        }
    }

    /// Resolve a user-typed path to an absolute one.
    ///
    /// - `~` and `~/...` are relative to `HOME`
    /// - Absolute paths are normalized
    /// - Anything else is relative to the working directory
    pub fn resolve_path(&self, path: &str) -> String {
        if path == "~" {
            return VirtualFs::normalize_path(self.home());
        }
        if let Some(rest) = path.strip_prefix("~/") {
            return VirtualFs::join_path(self.home(), rest);
        }
        VirtualFs::join_path(&self.cwd, path)
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
