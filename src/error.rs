//! Error types for the interpreter core.

use crate::command::ExitCode;
use std::io;
use std::path::PathBuf;

/// Errors produced while resolving and launching a command line.
///
/// None of these terminate the interpreter: the dispatch boundary reports them
/// and turns them into an exit status via [`ShellError::exit_code`].
#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    #[error("{0}: command not found")]
    CommandNotFound(String),

    #[error("{program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("wait failed for pid {pid}: {source}")]
    Wait {
        pid: u32,
        #[source]
        source: io::Error,
    },

    #[error("job table full ({capacity} jobs), command not started")]
    JobTableFull { capacity: usize },

    #[error("{name}: alias expansion deeper than {depth} levels")]
    AliasDepthExceeded { name: String, depth: usize },

    #[error("cd: OLDPWD not set")]
    OldPwdNotSet,

    #[error("cd: {}: {source}", path.display())]
    ChangeDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("config error: {0}")]
    Config(String),
}

impl ShellError {
    /// Status recorded when this error ends a command.
    pub fn exit_code(&self) -> ExitCode {
        match self {
            ShellError::CommandNotFound(_) => 127,
            ShellError::Spawn { source, .. } => match source.kind() {
                io::ErrorKind::NotFound => 127,
                io::ErrorKind::PermissionDenied => 126,
                _ => 1,
            },
            _ => 1,
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, ShellError>;
