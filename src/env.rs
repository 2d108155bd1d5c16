use std::collections::HashMap;
use std::env as stdenv;
use std::path::PathBuf;

/// Mutable, user-level view of the process environment used by the interpreter.
///
/// The environment contains:
/// - `vars`: a map of environment variables that will be visible to executed commands.
/// - `current_dir`: the working directory for command execution.
/// - `previous_dir`: the directory left by the last successful `cd`, if any.
/// - `home_dir`: the resolved home directory used for `~` and bare `cd`.
///
/// Variables are captured once from the process at startup; afterwards this map is
/// the only source of truth and is passed verbatim to spawned children.
#[derive(Debug, Clone)]
pub struct Environment {
    /// Key-value store of environment variables (e.g., PATH, HOME).
    pub vars: HashMap<String, String>,
    /// The current working directory for command execution.
    pub current_dir: PathBuf,
    /// Directory `cd -` returns to.
    pub previous_dir: Option<PathBuf>,
    /// Home directory of the invoking user.
    pub home_dir: PathBuf,
}

impl Environment {
    /// Capture the current process state into a new `Environment` instance.
    ///
    /// This copies variables from `std::env::vars()` and initializes `current_dir`
    /// from `std::env::current_dir()`, falling back to the home directory.
    pub fn new() -> Self {
        let vars: HashMap<String, String> = stdenv::vars().collect();
        let home_dir = dirs::home_dir().unwrap_or_else(|| PathBuf::from("/"));
        let current_dir = stdenv::current_dir().unwrap_or_else(|_| home_dir.clone());
        Self {
            vars,
            current_dir,
            previous_dir: None,
            home_dir,
        }
    }

    /// Empty environment rooted at `dir`, used where inheriting the process
    /// variables would make behavior depend on the caller.
    pub fn isolated(dir: PathBuf, home_dir: PathBuf) -> Self {
        Self {
            vars: HashMap::new(),
            current_dir: dir,
            previous_dir: None,
            home_dir,
        }
    }

    /// Get the value of an environment variable.
    pub fn get_var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }

    /// Set or override an environment variable in `self.vars`.
    pub fn set_var(&mut self, key: impl Into<String>, val: impl Into<String>) {
        self.vars.insert(key.into(), val.into());
    }

    /// Remove a variable; returns whether it was defined.
    pub fn unset_var(&mut self, key: &str) -> bool {
        self.vars.remove(key).is_some()
    }

    /// All variables ordered by name.
    pub fn sorted_vars(&self) -> Vec<(&str, &str)> {
        let mut vars: Vec<(&str, &str)> = self
            .vars
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        vars.sort_unstable_by_key(|(k, _)| *k);
        vars
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
