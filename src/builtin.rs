use crate::command::{CommandFactory, ExecutableCommand, ExitCode, LaunchMode};
use crate::display;
use crate::error::ShellError;
use crate::interpreter::Factory;
use crate::jobs;
use crate::state::ShellState;
use anyhow::{Result, bail};
use argh::{EarlyExit, FromArgs};
use std::env;
use std::io::Write;
use std::path::PathBuf;

/// How finishing a builtin is reflected in the shared exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StatusPolicy {
    /// Status becomes 0 even if the builtin reported an error.
    AlwaysSuccess,
    /// Status becomes 1 on error, 0 otherwise.
    FailureVisible,
    /// Status is left as it was.
    Untouched,
}

impl StatusPolicy {
    fn status(self, failed: bool) -> Option<ExitCode> {
        match self {
            StatusPolicy::AlwaysSuccess => Some(0),
            StatusPolicy::FailureVisible => Some(ExitCode::from(failed)),
            StatusPolicy::Untouched => None,
        }
    }
}

/// Built-in commands known to the shell at compile time.
///
/// Builtins are parsed using the [`argh`] crate (`FromArgs`) and executed directly
/// in-process without spawning a child process.
pub(crate) trait BuiltinCommand: Sized + FromArgs {
    /// Canonical name of the command, e.g. "echo" or "cd".
    fn name() -> &'static str;

    const STATUS: StatusPolicy = StatusPolicy::AlwaysSuccess;

    /// Executes the command using the provided output stream and interpreter state.
    ///
    /// Errors are reported to the user; whether they reach the exit status is
    /// decided by [`BuiltinCommand::STATUS`].
    fn execute(self, stdout: &mut dyn Write, state: &mut ShellState) -> Result<()>;
}

impl<T: BuiltinCommand> ExecutableCommand for T {
    fn execute(
        self: Box<Self>,
        stdout: &mut dyn Write,
        state: &mut ShellState,
    ) -> Result<Option<ExitCode>> {
        let failed = match BuiltinCommand::execute(*self, stdout, state) {
            Ok(()) => false,
            Err(e) => {
                stdout.flush()?;
                eprintln!("{}: {:#}", crate::SHELL_NAME, e);
                true
            }
        };
        Ok(T::STATUS.status(failed))
    }
}

struct InvalidArgs {
    output: String,
    is_error: bool,
    policy: StatusPolicy,
}

impl ExecutableCommand for InvalidArgs {
    fn execute(
        self: Box<Self>,
        stdout: &mut dyn Write,
        _state: &mut ShellState,
    ) -> Result<Option<ExitCode>> {
        if self.is_error {
            eprintln!("{}", self.output.trim_end());
        } else {
            writeln!(stdout, "{}", self.output.trim_end())?;
        }
        Ok(self.policy.status(self.is_error))
    }
}

impl<T: BuiltinCommand + 'static> CommandFactory for Factory<T> {
    fn try_create(
        &self,
        _state: &ShellState,
        argv: &[String],
        _mode: LaunchMode,
    ) -> Option<Box<dyn ExecutableCommand>> {
        let (name, args) = argv.split_first()?;
        if name != T::name() {
            return None;
        }
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        Some(match T::from_args(&[name.as_str()], &args) {
            Ok(cmd) => Box::new(cmd),
            Err(EarlyExit { output, status }) => Box::new(InvalidArgs {
                output,
                is_error: status.is_err(),
                policy: T::STATUS,
            }),
        })
    }
}

/// Usage line and summary of every builtin, in `help` order.
pub(crate) const HELP: &[(&str, &str)] = &[
    ("cd [dir|-|~]", "Change directory"),
    ("pwd", "Print working directory"),
    ("exit [code]", "Exit shell"),
    ("history", "Show command history"),
    ("alias [name=value]", "Set or show aliases"),
    ("unalias name...", "Remove aliases"),
    ("jobs", "Show background jobs"),
    ("help", "Show this help"),
    ("export [VAR=value]", "Set or list environment variables"),
    ("unset VAR...", "Remove environment variables"),
    ("echo [-n] [text]", "Print text"),
];

/// Joins the words of `name=value with spaces` and splits at the first `=`.
fn split_assignment(words: &[String]) -> (String, Option<String>) {
    let joined = words.join(" ");
    match joined.split_once('=') {
        Some((name, value)) => (name.to_string(), Some(value.to_string())),
        None => (joined, None),
    }
}

#[derive(FromArgs)]
/// Print the current working directory to standard output.
pub struct Pwd {}

impl BuiltinCommand for Pwd {
    fn name() -> &'static str {
        "pwd"
    }

    fn execute(self, stdout: &mut dyn Write, state: &mut ShellState) -> Result<()> {
        writeln!(stdout, "{}", state.env.current_dir.to_string_lossy())?;
        Ok(())
    }
}

/// Change the current working directory.
/// With no target or `~`, changes to the home directory; `-` returns to the previous one.
pub struct Cd {
    /// directory to switch to; absolute or relative to the current directory.
    pub target: Option<String>,
}

// Parsed by hand: argh reads a lone `-` as an unknown option.
impl FromArgs for Cd {
    fn from_args(command_name: &[&str], args: &[&str]) -> Result<Self, EarlyExit> {
        let name = command_name.join(" ");
        match args {
            [] => Ok(Cd { target: None }),
            ["--help"] | ["help"] => Err(EarlyExit {
                output: format!("Usage: {name} [dir|-|~]\n\nChange the current working directory."),
                status: Ok(()),
            }),
            [target] => Ok(Cd {
                target: Some(target.to_string()),
            }),
            _ => Err(EarlyExit {
                output: format!("{name}: too many arguments"),
                status: Err(()),
            }),
        }
    }
}

impl Cd {
    fn resolve(&self, state: &ShellState) -> Result<PathBuf, ShellError> {
        let env = &state.env;
        let target = match self.target.as_deref() {
            None | Some("") | Some("~") => env.home_dir.clone(),
            Some("-") => env.previous_dir.clone().ok_or(ShellError::OldPwdNotSet)?,
            Some(path) => PathBuf::from(path),
        };
        Ok(if target.is_absolute() {
            target
        } else {
            env.current_dir.join(target)
        })
    }
}

impl BuiltinCommand for Cd {
    fn name() -> &'static str {
        "cd"
    }

    // A failed directory change stays visible in the status.
    const STATUS: StatusPolicy = StatusPolicy::FailureVisible;

    fn execute(self, _stdout: &mut dyn Write, state: &mut ShellState) -> Result<()> {
        let target = self.resolve(state)?;
        env::set_current_dir(&target).map_err(|source| ShellError::ChangeDir {
            path: target.clone(),
            source,
        })?;

        let new_dir = env::current_dir().unwrap_or(target);
        let old_dir = std::mem::replace(&mut state.env.current_dir, new_dir);
        state
            .env
            .set_var("OLDPWD", old_dir.to_string_lossy().into_owned());
        state
            .env
            .set_var("PWD", state.env.current_dir.to_string_lossy().into_owned());
        log::debug!(
            "cd {} -> {}",
            old_dir.display(),
            state.env.current_dir.display()
        );
        state.env.previous_dir = Some(old_dir);
        Ok(())
    }
}

/// Status requested by `exit` with an operand that is not a number.
const INVALID_EXIT_OPERAND: ExitCode = 2;

/// Exit shell process
pub struct Exit {
    /// exit code; defaults to the status of the last command.
    pub operand: Option<String>,
}

impl FromArgs for Exit {
    fn from_args(command_name: &[&str], args: &[&str]) -> Result<Self, EarlyExit> {
        match args {
            [] => Ok(Exit { operand: None }),
            [operand] => Ok(Exit {
                operand: Some(operand.to_string()),
            }),
            _ => Err(EarlyExit {
                output: format!("{}: too many arguments", command_name.join(" ")),
                status: Err(()),
            }),
        }
    }
}

/// Reduces a requested code to the 0-255 range a process can exit with.
fn wrap_exit_code(code: i64) -> ExitCode {
    // rem_euclid keeps the value in 0..256, which always fits.
    code.rem_euclid(256) as ExitCode
}

impl BuiltinCommand for Exit {
    fn name() -> &'static str {
        "exit"
    }

    const STATUS: StatusPolicy = StatusPolicy::Untouched;

    fn execute(self, stdout: &mut dyn Write, state: &mut ShellState) -> Result<()> {
        writeln!(stdout, "Goodbye!")?;
        let code = match self.operand.as_deref() {
            None => i64::from(state.last_status),
            Some(operand) => match operand.parse::<i64>() {
                Ok(code) => code,
                Err(_) => {
                    state.exit_request = Some(INVALID_EXIT_OPERAND);
                    bail!("exit: {}: numeric argument required", operand);
                }
            },
        };
        state.exit_request = Some(wrap_exit_code(code));
        Ok(())
    }
}

#[derive(FromArgs)]
/// Show the command history.
pub struct History {}

impl BuiltinCommand for History {
    fn name() -> &'static str {
        "history"
    }

    fn execute(self, stdout: &mut dyn Write, state: &mut ShellState) -> Result<()> {
        display::write_history(stdout, state.history.iter())?;
        Ok(())
    }
}

#[derive(FromArgs)]
/// Define or show aliases.
pub struct Alias {
    #[argh(positional, greedy)]
    /// definition: `name=value` to define, `name` to show one alias; lists all when omitted.
    pub definition: Vec<String>,
}

impl BuiltinCommand for Alias {
    fn name() -> &'static str {
        "alias"
    }

    fn execute(self, stdout: &mut dyn Write, state: &mut ShellState) -> Result<()> {
        if self.definition.is_empty() {
            display::write_aliases(stdout, state.aliases.all())?;
            return Ok(());
        }
        match split_assignment(&self.definition) {
            (name, Some(_)) if name.is_empty() => bail!("alias: missing alias name"),
            (name, Some(value)) => state.aliases.set(name, value),
            (name, None) => {
                let Some(alias) = state.aliases.all().iter().find(|a| a.name == name) else {
                    bail!("alias: {}: not found", name);
                };
                display::write_alias(stdout, alias)?;
            }
        }
        Ok(())
    }
}

#[derive(FromArgs)]
/// Remove aliases.
pub struct Unalias {
    #[argh(positional)]
    /// names of the aliases to remove.
    pub names: Vec<String>,
}

impl BuiltinCommand for Unalias {
    fn name() -> &'static str {
        "unalias"
    }

    fn execute(self, _stdout: &mut dyn Write, state: &mut ShellState) -> Result<()> {
        let missing: Vec<&str> = self
            .names
            .iter()
            .filter(|name| !state.aliases.remove(name))
            .map(String::as_str)
            .collect();
        if !missing.is_empty() {
            bail!("unalias: {}: not found", missing.join(", "));
        }
        Ok(())
    }
}

#[derive(FromArgs)]
/// Show running background jobs.
pub struct Jobs {}

impl BuiltinCommand for Jobs {
    fn name() -> &'static str {
        "jobs"
    }

    fn execute(self, stdout: &mut dyn Write, state: &mut ShellState) -> Result<()> {
        let running = jobs::lock(&state.jobs).active();
        display::write_jobs(stdout, &running)?;
        Ok(())
    }
}

#[derive(FromArgs)]
/// Show the builtin commands.
pub struct Help {}

impl BuiltinCommand for Help {
    fn name() -> &'static str {
        "help"
    }

    fn execute(self, stdout: &mut dyn Write, _state: &mut ShellState) -> Result<()> {
        display::write_help(stdout, HELP)?;
        Ok(())
    }
}

#[derive(FromArgs)]
/// Set an environment variable for this shell and its children.
pub struct Export {
    #[argh(positional, greedy)]
    /// `NAME=value`; lists all variables when omitted.
    pub assignment: Vec<String>,
}

impl BuiltinCommand for Export {
    fn name() -> &'static str {
        "export"
    }

    fn execute(self, stdout: &mut dyn Write, state: &mut ShellState) -> Result<()> {
        if self.assignment.is_empty() {
            display::write_variables(stdout, &state.env.sorted_vars())?;
            return Ok(());
        }
        if let (name, Some(value)) = split_assignment(&self.assignment) {
            if !name.is_empty() {
                state.env.set_var(name, value);
            }
        }
        Ok(())
    }
}

#[derive(FromArgs)]
/// Remove environment variables.
pub struct Unset {
    #[argh(positional)]
    /// names of the variables to remove.
    pub names: Vec<String>,
}

impl BuiltinCommand for Unset {
    fn name() -> &'static str {
        "unset"
    }

    fn execute(self, _stdout: &mut dyn Write, state: &mut ShellState) -> Result<()> {
        for name in &self.names {
            state.env.unset_var(name);
        }
        Ok(())
    }
}

/// write the arguments to standard output, separated by spaces.
/// by default, a trailing newline is printed.
pub struct Echo {
    /// do not output the trailing newline.
    pub no_newline: bool,

    /// values to print as-is, separated by spaces.
    pub args: Vec<String>,
}

// Only a leading `-n` is an option; every other word is printed, dashes included.
impl FromArgs for Echo {
    fn from_args(_command_name: &[&str], args: &[&str]) -> Result<Self, EarlyExit> {
        let (no_newline, words) = match args {
            ["-n", rest @ ..] => (true, rest),
            _ => (false, args),
        };
        Ok(Echo {
            no_newline,
            args: words.iter().map(|w| w.to_string()).collect(),
        })
    }
}

impl BuiltinCommand for Echo {
    fn name() -> &'static str {
        "echo"
    }

    fn execute(self, stdout: &mut dyn Write, _state: &mut ShellState) -> Result<()> {
        let s = self.args.join(" ");
        if self.no_newline {
            write!(stdout, "{}", s)?;
        } else {
            writeln!(stdout, "{}", s)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ShellConfig;
    use crate::env::Environment;
    use crate::tests::lock_current_dir;
    use std::env as stdenv;
    use std::fs;

    fn state_in(dir: PathBuf, home: PathBuf) -> ShellState {
        let config = ShellConfig {
            aliases: Default::default(),
            ..ShellConfig::default()
        };
        ShellState::new(Environment::isolated(dir, home), config)
    }

    fn state_here() -> ShellState {
        state_in(stdenv::current_dir().unwrap(), PathBuf::from("/"))
    }

    fn words(ws: &[&str]) -> Vec<String> {
        ws.iter().map(|w| w.to_string()).collect()
    }

    fn output_of(cmd: impl BuiltinCommand, state: &mut ShellState) -> String {
        let mut out = Vec::new();
        cmd.execute(&mut out, state).unwrap();
        String::from_utf8(out).unwrap()
    }

    /// Restores the process working directory when dropped.
    struct CwdGuard(PathBuf);

    impl Drop for CwdGuard {
        fn drop(&mut self) {
            stdenv::set_current_dir(&self.0).ok();
        }
    }

    #[test]
    fn test_pwd_prints_current_dir() {
        let _lock = lock_current_dir();
        let mut state = state_here();
        let expected = format!("{}\n", state.env.current_dir.to_string_lossy());
        assert_eq!(output_of(Pwd {}, &mut state), expected);
    }

    #[test]
    fn test_echo_with_and_without_newline() {
        let mut state = state_here();
        let echo1 = Echo {
            no_newline: false,
            args: words(&["hello", "world"]),
        };
        assert_eq!(output_of(echo1, &mut state), "hello world\n");

        let echo2 = Echo {
            no_newline: true,
            args: words(&["foo", "bar"]),
        };
        assert_eq!(output_of(echo2, &mut state), "foo bar");
    }

    #[test]
    fn test_cd_to_absolute_path() {
        let _lock = lock_current_dir();
        let _restore = CwdGuard(stdenv::current_dir().unwrap());
        let temp = tempfile::tempdir().unwrap();
        let canonical_temp = fs::canonicalize(temp.path()).unwrap();

        let orig = stdenv::current_dir().unwrap();
        let mut state = state_in(orig.clone(), PathBuf::from("/"));

        let cmd = Cd {
            target: Some(canonical_temp.to_string_lossy().to_string()),
        };
        cmd.execute(&mut Vec::new(), &mut state).unwrap();

        assert_eq!(fs::canonicalize(stdenv::current_dir().unwrap()).unwrap(), canonical_temp);
        assert_eq!(state.env.current_dir, canonical_temp);
        assert_eq!(state.env.previous_dir.as_ref(), Some(&orig));
        assert_eq!(
            state.env.get_var("OLDPWD"),
            Some(orig.to_string_lossy().to_string())
        );
        assert_eq!(
            state.env.get_var("PWD"),
            Some(canonical_temp.to_string_lossy().to_string())
        );
    }

    #[test]
    fn test_cd_to_home_when_none() {
        let _lock = lock_current_dir();
        let _restore = CwdGuard(stdenv::current_dir().unwrap());
        let temp = tempfile::tempdir().unwrap();
        let canonical_temp = fs::canonicalize(temp.path()).unwrap();
        let mut state = state_in(stdenv::current_dir().unwrap(), canonical_temp.clone());

        Cd { target: None }.execute(&mut Vec::new(), &mut state).unwrap();
        assert_eq!(state.env.current_dir, canonical_temp);

        state.env.current_dir = PathBuf::from("/");
        stdenv::set_current_dir("/").unwrap();
        Cd {
            target: Some("~".into()),
        }
        .execute(&mut Vec::new(), &mut state)
        .unwrap();
        assert_eq!(state.env.current_dir, canonical_temp);
    }

    #[test]
    fn test_cd_dash_before_any_change_fails() {
        let _lock = lock_current_dir();
        let orig = stdenv::current_dir().unwrap();
        let mut state = state_in(orig.clone(), PathBuf::from("/"));

        let err = Cd {
            target: Some("-".into()),
        }
        .execute(&mut Vec::new(), &mut state)
        .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ShellError>(),
            Some(ShellError::OldPwdNotSet)
        ));
        assert_eq!(stdenv::current_dir().unwrap(), orig);
        assert_eq!(state.env.current_dir, orig);
    }

    #[test]
    fn test_cd_dash_returns_to_previous() {
        let _lock = lock_current_dir();
        let _restore = CwdGuard(stdenv::current_dir().unwrap());
        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();
        let a_path = fs::canonicalize(a.path()).unwrap();
        let b_path = fs::canonicalize(b.path()).unwrap();
        let mut state = state_in(stdenv::current_dir().unwrap(), PathBuf::from("/"));

        for target in [&a_path, &b_path] {
            Cd {
                target: Some(target.to_string_lossy().to_string()),
            }
            .execute(&mut Vec::new(), &mut state)
            .unwrap();
        }
        Cd {
            target: Some("-".into()),
        }
        .execute(&mut Vec::new(), &mut state)
        .unwrap();

        assert_eq!(state.env.current_dir, a_path);
        assert_eq!(state.env.previous_dir, Some(b_path));
    }

    #[test]
    fn test_cd_nonexistent_path_errors() {
        let _lock = lock_current_dir();
        let orig = stdenv::current_dir().unwrap();
        let mut state = state_in(orig.clone(), PathBuf::from("/"));

        let name = format!("nonexistent_dir_for_mysh_test_{}", std::process::id());
        let res = Cd { target: Some(name) }.execute(&mut Vec::new(), &mut state);

        assert!(res.is_err());
        assert_eq!(stdenv::current_dir().unwrap(), orig);
        assert!(state.env.previous_dir.is_none());
    }

    #[test]
    fn test_cd_failure_status_survives() {
        let _lock = lock_current_dir();
        let mut state = state_here();
        let cmd: Box<dyn ExecutableCommand> = Box::new(Cd {
            target: Some("/nonexistent/dir/for/mysh".into()),
        });
        assert_eq!(cmd.execute(&mut Vec::new(), &mut state).unwrap(), Some(1));
    }

    #[test]
    fn test_other_builtin_failures_reset_status() {
        let mut state = state_here();
        let cmd: Box<dyn ExecutableCommand> = Box::new(Unalias {
            names: words(&["never-defined"]),
        });
        assert_eq!(cmd.execute(&mut Vec::new(), &mut state).unwrap(), Some(0));
    }

    #[test]
    fn test_exit_uses_given_or_last_status() {
        let mut state = state_here();
        state.last_status = 3;
        let out = output_of(Exit { operand: None }, &mut state);
        assert_eq!(out, "Goodbye!\n");
        assert_eq!(state.exit_request, Some(3));

        let cmd: Box<dyn ExecutableCommand> = Box::new(Exit {
            operand: Some("9".into()),
        });
        assert_eq!(cmd.execute(&mut Vec::new(), &mut state).unwrap(), None);
        assert_eq!(state.exit_request, Some(9));
    }

    #[test]
    fn test_alias_set_show_and_list() {
        let mut state = state_here();
        output_of(
            Alias {
                definition: words(&["ll=ls", "-la"]),
            },
            &mut state,
        );
        assert_eq!(state.aliases.get("ll"), Some("ls -la"));

        let one = output_of(
            Alias {
                definition: words(&["ll"]),
            },
            &mut state,
        );
        assert_eq!(one, "alias ll='ls -la'\n");

        let all = output_of(Alias { definition: vec![] }, &mut state);
        assert_eq!(all, "Aliases:\nalias ll='ls -la'\n");
    }

    #[test]
    fn test_alias_value_may_contain_equals() {
        let mut state = state_here();
        output_of(
            Alias {
                definition: words(&["grep=grep", "--color=auto"]),
            },
            &mut state,
        );
        assert_eq!(state.aliases.get("grep"), Some("grep --color=auto"));
    }

    #[test]
    fn test_unalias_removes() {
        let mut state = state_here();
        state.aliases.set("l", "ls -l");
        output_of(
            Unalias {
                names: words(&["l"]),
            },
            &mut state,
        );
        assert!(state.aliases.get("l").is_none());
    }

    #[test]
    fn test_export_and_unset() {
        let mut state = state_here();
        output_of(
            Export {
                assignment: words(&["GREETING=hello", "there"]),
            },
            &mut state,
        );
        assert_eq!(state.env.get_var("GREETING"), Some("hello there".into()));

        output_of(
            Export {
                assignment: words(&["NOEQUALS"]),
            },
            &mut state,
        );
        assert_eq!(state.env.get_var("NOEQUALS"), None);

        let listing = output_of(Export { assignment: vec![] }, &mut state);
        assert!(listing.contains("export GREETING=hello there\n"));

        output_of(
            Unset {
                names: words(&["GREETING"]),
            },
            &mut state,
        );
        assert_eq!(state.env.get_var("GREETING"), None);
    }

    #[test]
    fn test_history_lists_entries() {
        let mut state = state_here();
        state.history.push("ls");
        state.history.push("cd /tmp");
        let out = output_of(History {}, &mut state);
        assert_eq!(out, "Command History:\n  1  ls\n  2  cd /tmp\n");
    }

    #[test]
    fn test_jobs_with_empty_table() {
        let mut state = state_here();
        assert_eq!(output_of(Jobs {}, &mut state), "Background Jobs:\n");
    }

    #[test]
    fn test_help_lists_every_builtin() {
        let mut state = state_here();
        let out = output_of(Help {}, &mut state);
        for (usage, _) in HELP {
            assert!(out.contains(usage), "help misses {usage}");
        }
    }

    #[test]
    fn test_factory_matches_exact_name_only() {
        let state = state_here();
        let factory = Factory::<Pwd>::default();
        assert!(
            factory
                .try_create(&state, &words(&["pwd"]), LaunchMode::Foreground)
                .is_some()
        );
        assert!(
            factory
                .try_create(&state, &words(&["pwdx"]), LaunchMode::Foreground)
                .is_none()
        );
        assert!(factory.try_create(&state, &[], LaunchMode::Foreground).is_none());
    }

    #[test]
    fn test_invalid_arguments_follow_status_policy() {
        let mut state = state_here();
        let cd = Factory::<Cd>::default()
            .try_create(&state, &words(&["cd", "a", "b"]), LaunchMode::Foreground)
            .unwrap();
        assert_eq!(cd.execute(&mut Vec::new(), &mut state).unwrap(), Some(1));

        let pwd = Factory::<Pwd>::default()
            .try_create(&state, &words(&["pwd", "extra"]), LaunchMode::Foreground)
            .unwrap();
        assert_eq!(pwd.execute(&mut Vec::new(), &mut state).unwrap(), Some(0));
    }

    #[test]
    fn test_echo_prints_dash_words() {
        let mut state = state_here();
        let echo = Echo::from_args(&["echo"], &["-la", "-", "--color=auto"])
            .ok()
            .unwrap();
        assert!(!echo.no_newline);
        assert_eq!(output_of(echo, &mut state), "-la - --color=auto\n");

        let echo = Echo::from_args(&["echo"], &["--help"]).ok().unwrap();
        assert_eq!(output_of(echo, &mut state), "--help\n");
    }

    #[test]
    fn test_echo_only_leading_n_is_an_option() {
        let mut state = state_here();
        let echo = Echo::from_args(&["echo"], &["-n", "-n", "x"]).ok().unwrap();
        assert!(echo.no_newline);
        assert_eq!(output_of(echo, &mut state), "-n x");

        let echo = Echo::from_args(&["echo"], &["x", "-n"]).ok().unwrap();
        assert_eq!(output_of(echo, &mut state), "x -n\n");
    }

    #[test]
    fn test_exit_code_is_reduced_to_a_byte() {
        let mut state = state_here();
        for (operand, expected) in [("-1", 255), ("300", 44), ("256", 0), ("7", 7)] {
            let exit = Exit::from_args(&["exit"], &[operand]).ok().unwrap();
            output_of(exit, &mut state);
            assert_eq!(state.exit_request, Some(expected), "exit {operand}");
        }
    }

    #[test]
    fn test_exit_with_non_numeric_operand_still_exits() {
        let mut state = state_here();
        state.last_status = 5;
        let cmd: Box<dyn ExecutableCommand> = Box::new(Exit {
            operand: Some("abc".into()),
        });
        let mut out = Vec::new();
        assert_eq!(cmd.execute(&mut out, &mut state).unwrap(), None);
        assert_eq!(out, b"Goodbye!\n");
        assert_eq!(state.exit_request, Some(INVALID_EXIT_OPERAND));
        assert_eq!(state.last_status, 5);
    }

    #[test]
    fn test_exit_with_extra_operands_keeps_running() {
        let mut state = state_here();
        let exit = Factory::<Exit>::default()
            .try_create(&state, &words(&["exit", "1", "2"]), LaunchMode::Foreground)
            .unwrap();
        assert_eq!(exit.execute(&mut Vec::new(), &mut state).unwrap(), None);
        assert_eq!(state.exit_request, None);
    }

    #[test]
    fn test_cd_accepts_dash_operand() {
        let cd = Cd::from_args(&["cd"], &["-"]).ok().unwrap();
        assert_eq!(cd.target.as_deref(), Some("-"));
        assert!(Cd::from_args(&["cd"], &[]).ok().unwrap().target.is_none());

        let help = Cd::from_args(&["cd"], &["--help"]).err().unwrap();
        assert!(help.status.is_ok());
        assert!(help.output.starts_with("Usage: cd"));
    }
}
