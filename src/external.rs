use crate::command::{CommandFactory, ExecutableCommand, ExitCode, LaunchMode};
use crate::display;
use crate::error::ShellError;
use crate::interpreter::Factory;
use crate::jobs;
use crate::state::ShellState;
use anyhow::Result;
use std::borrow::Cow;
use std::ffi::OsStr;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

/// Command that is not a builtin.
pub struct ExternalCommand {
    program: PathBuf,
    argv: Vec<String>,
    mode: LaunchMode,
}

impl ExternalCommand {
    pub fn new(program: PathBuf, argv: Vec<String>, mode: LaunchMode) -> Self {
        Self {
            program,
            argv,
            mode,
        }
    }

    fn name(&self) -> &str {
        self.argv.first().map(String::as_str).unwrap_or_default()
    }

    fn build(&self, state: &ShellState) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(self.argv.iter().skip(1))
            .env_clear()
            .envs(state.env.vars.iter())
            .current_dir(&state.env.current_dir);
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.arg0(self.name());
            restore_default_interrupt(&mut cmd);
        }
        cmd
    }

    fn run_foreground(&self, state: &mut ShellState) -> Result<Option<ExitCode>> {
        let mut child = self
            .build(state)
            .spawn()
            .map_err(|source| ShellError::Spawn {
                program: self.name().to_string(),
                source,
            })?;
        let pid = child.id();
        log::debug!("foreground pid {} for {:?}", pid, self.argv);
        let status = child
            .wait()
            .map_err(|source| ShellError::Wait { pid, source })?;
        Ok(Some(exit_code_of(status)))
    }

    fn run_background(
        &self,
        stdout: &mut dyn Write,
        state: &mut ShellState,
    ) -> Result<Option<ExitCode>> {
        let mut cmd = self.build(state);
        let text = self.argv.join(" ");
        let (id, pid) = {
            let mut table = jobs::lock(&state.jobs);
            let job = table.spawn(&mut cmd, text, self.name())?;
            (job.id, job.pid)
        };
        display::write_job_started(stdout, id, pid)?;
        Ok(None)
    }
}

impl CommandFactory for Factory<ExternalCommand> {
    fn try_create(
        &self,
        state: &ShellState,
        argv: &[String],
        mode: LaunchMode,
    ) -> Option<Box<dyn ExecutableCommand>> {
        let name = argv.first()?;
        let search_paths = state.env.get_var("PATH").unwrap_or_default();
        let executable = find_command_path(OsStr::new(&search_paths), Path::new(name))?;
        Some(Box::new(ExternalCommand::new(
            executable.into_owned(),
            argv.to_vec(),
            mode,
        )))
    }
}

impl ExecutableCommand for ExternalCommand {
    fn execute(
        self: Box<Self>,
        stdout: &mut dyn Write,
        state: &mut ShellState,
    ) -> Result<Option<ExitCode>> {
        // Builtin output written earlier must not be overtaken by the child's.
        stdout.flush()?;
        match self.mode {
            LaunchMode::Foreground => self.run_foreground(state),
            LaunchMode::Background => self.run_background(stdout, state),
        }
    }
}

/// Lets an interrupt terminate the child even though the interpreter catches it.
#[cfg(unix)]
fn restore_default_interrupt(cmd: &mut Command) {
    use std::os::unix::process::CommandExt;
    // SAFETY: the hook only calls signal(2), which is async-signal-safe, and
    // touches no state shared with the parent.
    unsafe {
        cmd.pre_exec(|| {
            libc::signal(libc::SIGINT, libc::SIG_DFL);
            Ok(())
        });
    }
}

/// Status a shell reports for a terminated child.
pub fn exit_code_of(exit_status: ExitStatus) -> ExitCode {
    match exit_status.code() {
        Some(x) => x,
        None => terminated_by_signal(exit_status),
    }
}

#[cfg(unix)]
fn terminated_by_signal(exit_status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    if let Some(signal) = ExitStatusExt::signal(&exit_status) {
        128 + signal
    } else if ExitStatusExt::core_dumped(&exit_status) {
        255
    } else {
        -1
    }
}

#[cfg(not(unix))]
fn terminated_by_signal(_exit_status: ExitStatus) -> i32 {
    -1
}

/// Resolve a command path the way a typical shell would.
///
/// Behavior:
/// - Absolute path: returns it if it exists.
/// - Relative with multiple components (e.g., `bin/sh`): returns it if it exists.
/// - `./foo` on Unix or any `./`-prefixed path on other platforms: returns it if it exists.
/// - Single path component (no separators): search each directory in `search_paths` (PATH)
///   and return the first existing match.
/// - Empty path: returns `None`.
///
/// Returns either a borrowed reference to the provided `path` or an owned `PathBuf`
/// when the result is discovered via PATH lookup.
pub fn find_command_path<'a>(search_paths: &OsStr, path: &'a Path) -> Option<Cow<'a, Path>> {
    if path.is_absolute() {
        return find_by_path(path).map(Cow::Borrowed);
    }

    let search_in_current_dir = cfg!(not(unix)) || path.starts_with("./");
    if search_in_current_dir && path.exists() {
        return Some(Cow::Borrowed(path));
    }

    let mut components = path.components();
    let first = components.next();
    let second = components.next();
    match (first, second) {
        (None, None) => None,
        (Some(x), None) => find_in_path(search_paths, x.as_os_str()).map(Cow::Owned),
        _ => find_by_path(path).map(Cow::Borrowed),
    }
}

fn find_in_path(search_paths: &OsStr, cmd: &OsStr) -> Option<PathBuf> {
    std::env::split_paths(search_paths)
        .map(|dir| dir.join(cmd))
        .find(|candidate| is_program(candidate))
}

fn find_by_path(path: &Path) -> Option<&Path> {
    if path.exists() { Some(path) } else { None }
}

/// PATH entries must be regular files; a directory named like the command is skipped.
fn is_program(path: &Path) -> bool {
    path.metadata().map(|m| m.is_file()).unwrap_or(false)
}
