use crate::state::ShellState;
use anyhow::Result;
use std::io::Write;

/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
/// This mirrors the convention used by POSIX shells and many command-line tools.
pub type ExitCode = i32;

/// Whether the interpreter waits for a command before reading the next line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchMode {
    Foreground,
    Background,
}

/// Object-safe trait for any command that can be executed by the shell.
///
/// This is implemented by built-ins via a blanket impl and by external commands.
pub trait ExecutableCommand {
    /// Executes the command.
    ///
    /// `Ok(Some(code))` overwrites the shared exit status, `Ok(None)` leaves it
    /// untouched (background launches, `exit`). Errors are reported by the caller
    /// and recorded as a failure status.
    fn execute(
        self: Box<Self>,
        stdout: &mut dyn Write,
        state: &mut ShellState,
    ) -> Result<Option<ExitCode>>;
}

/// Factory that tries to create a command from an expanded argument sequence.
///
/// Returns `None` when the factory doesn't recognize `argv[0]`.
/// Implementations can use the state to resolve executables (e.g., using PATH).
pub trait CommandFactory {
    /// Attempt to create a command instance for the provided argument sequence.
    fn try_create(
        &self,
        state: &ShellState,
        argv: &[String],
        mode: LaunchMode,
    ) -> Option<Box<dyn ExecutableCommand>>;
}
