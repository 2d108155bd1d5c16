use crate::alias::AliasTable;
use crate::command::ExitCode;
use crate::config::ShellConfig;
use crate::env::Environment;
use crate::history::History;
use crate::jobs::{JobTable, SharedJobTable};

/// Everything the interpreter mutates between command lines.
///
/// Only the job table is shared with another thread (the signal relay); it is
/// reached through its mutex. Every other field belongs to the main loop.
pub struct ShellState {
    pub env: Environment,
    pub aliases: AliasTable,
    pub history: History,
    pub jobs: SharedJobTable,
    /// Status of the most recent foreground command or builtin.
    pub last_status: ExitCode,
    /// Set by `exit`; the loop stops and the process exits with this code.
    pub exit_request: Option<ExitCode>,
    pub config: ShellConfig,
}

impl ShellState {
    pub fn new(env: Environment, config: ShellConfig) -> Self {
        let mut aliases = AliasTable::new();
        for (name, value) in &config.aliases {
            aliases.set(name.clone(), value.clone());
        }
        Self {
            env,
            aliases,
            history: History::with_capacity(config.max_history),
            jobs: JobTable::shared(config.max_jobs),
            last_status: 0,
            exit_request: None,
            config,
        }
    }

    pub fn should_exit(&self) -> bool {
        self.exit_request.is_some()
    }

    /// State with the process variables but no aliases, rooted at the current directory.
    #[cfg(test)]
    pub(crate) fn for_tests() -> Self {
        let config = ShellConfig {
            aliases: Default::default(),
            ..ShellConfig::default()
        };
        Self::new(Environment::new(), config)
    }
}

impl Default for ShellState {
    fn default() -> Self {
        Self::new(Environment::new(), ShellConfig::default())
    }
}
