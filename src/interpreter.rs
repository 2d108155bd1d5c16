use crate::command::{CommandFactory, ExitCode, LaunchMode};
use crate::config::ShellConfig;
use crate::display;
use crate::env::Environment;
use crate::error::ShellError;
use crate::expand;
use crate::jobs;
use crate::lexer;
use crate::signals::SignalRelay;
use crate::state::ShellState;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::io::{self, Write};
use std::sync::Arc;

/// Factory allows creating instances of ExecutableCommand.
///
/// Only supports commands defined in this crate: builtins and external programs.
pub(crate) struct Factory<T> {
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Default for Factory<T> {
    fn default() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

/// A shell-like interpreter that resolves command lines and runs built-in and
/// external commands.
///
/// The interpreter owns a [`ShellState`] and a list of [`CommandFactory`] objects
/// that are queried, in order, to create the command named by the first word.
/// See [`Default`] for the factories included out of the box.
///
/// Example
/// ```
/// use mysh::Interpreter;
/// let mut sh = Interpreter::default();
/// let code = sh.run("echo", &["hello", "world"]);
/// assert_eq!(code, 0);
/// ```
pub struct Interpreter {
    state: ShellState,
    commands: Vec<Box<dyn CommandFactory>>,
    relay: Option<SignalRelay>,
}

impl Interpreter {
    /// Create a new interpreter with a custom set of command factories.
    pub fn new(state: ShellState, commands: Vec<Box<dyn CommandFactory>>) -> Self {
        Self {
            state,
            commands,
            relay: None,
        }
    }

    /// Interpreter with the default commands, the process environment and `config`.
    pub fn with_config(config: ShellConfig) -> Self {
        Self::new(
            ShellState::new(Environment::new(), config),
            default_factories(),
        )
    }

    pub fn state(&self) -> &ShellState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut ShellState {
        &mut self.state
    }

    /// Run a single, already expanded command invocation in the foreground.
    ///
    /// Returns the resulting exit status.
    pub fn run(&mut self, name: &str, args: &[&str]) -> ExitCode {
        let argv: Vec<String> = std::iter::once(name)
            .chain(args.iter().copied())
            .map(str::to_owned)
            .collect();
        self.dispatch(&argv, LaunchMode::Foreground, &mut io::stdout());
        self.state.last_status
    }

    /// Resolve and execute one input line, writing command output to stdout.
    pub fn run_line(&mut self, line: &str) -> ExitCode {
        self.run_line_to(line, &mut io::stdout())
    }

    /// Resolve and execute one input line: tokenize, expand, dispatch.
    ///
    /// Blank lines are a no-op. Returns the exit status after the line.
    pub fn run_line_to(&mut self, line: &str, out: &mut dyn Write) -> ExitCode {
        let line = line.trim();
        if line.is_empty() {
            return self.state.last_status;
        }
        self.state.history.push(line);

        let (command, background) = lexer::strip_background_marker(line);
        let limit = self.state.config.max_args;
        let tokens = lexer::split_into_tokens(command, limit);
        if tokens.args.is_empty() {
            return self.state.last_status;
        }

        let tokens = match expand::expand(
            tokens,
            &self.state.aliases,
            &self.state.env,
            limit,
            self.state.config.max_alias_depth,
        ) {
            Ok(tokens) => tokens,
            Err(e) => {
                report(&e);
                self.state.last_status = e.exit_code();
                return self.state.last_status;
            }
        };
        if tokens.dropped > 0 {
            log::warn!("dropped {} words past the limit of {}", tokens.dropped, limit);
            eprintln!(
                "{}: too many arguments, {} dropped (limit {})",
                crate::SHELL_NAME,
                tokens.dropped,
                limit
            );
        }
        if tokens.args.is_empty() {
            return self.state.last_status;
        }

        let mode = if background {
            LaunchMode::Background
        } else {
            LaunchMode::Foreground
        };
        log::debug!("dispatching {:?} ({:?})", tokens.args, mode);
        self.dispatch(&tokens.args, mode, out);
        if let Err(e) = out.flush() {
            log::warn!("flushing output failed: {}", e);
        }
        self.state.last_status
    }

    fn dispatch(&mut self, argv: &[String], mode: LaunchMode, out: &mut dyn Write) {
        let Some(name) = argv.first() else {
            return;
        };
        let created = self
            .commands
            .iter()
            .find_map(|factory| factory.try_create(&self.state, argv, mode));

        let result = match created {
            Some(cmd) => cmd.execute(out, &mut self.state),
            None => Err(ShellError::CommandNotFound(name.clone()).into()),
        };
        match result {
            Ok(Some(code)) => self.state.last_status = code,
            Ok(None) => {}
            Err(e) => {
                if let Err(flush_err) = out.flush() {
                    log::warn!("flushing output failed: {}", flush_err);
                }
                let code = e.downcast_ref::<ShellError>().map_or(1, ShellError::exit_code);
                eprintln!("{}: {:#}", crate::SHELL_NAME, e);
                self.state.last_status = code;
            }
        }
    }

    /// Reports finished background jobs and drops them from the table.
    ///
    /// Runs a non-blocking reap of its own besides draining the signal relay, so
    /// a job that exited before it was registered is still noticed.
    pub fn maintain_jobs(&mut self, out: &mut dyn Write) {
        let mut events = self
            .relay
            .as_ref()
            .map(SignalRelay::drain)
            .unwrap_or_default();
        {
            let mut table = jobs::lock(&self.state.jobs);
            events.extend(table.reap());
            let removed = table.sweep();
            if removed > 0 {
                log::debug!("swept {} finished jobs", removed);
            }
        }
        events.sort_by_key(|e| e.id);
        for event in &events {
            if let Err(e) = display::write_job_event(out, event) {
                log::warn!("job notification lost: {}", e);
            }
        }
    }

    /// Starts asynchronous reaping and interrupt interception.
    ///
    /// Without it the interpreter still works but finished jobs are only
    /// noticed by [`Interpreter::maintain_jobs`].
    pub fn install_signal_relay(&mut self) {
        if self.relay.is_some() {
            return;
        }
        match SignalRelay::install(Arc::clone(&self.state.jobs)) {
            Ok(relay) => self.relay = Some(relay),
            Err(e) => log::warn!("signal handling unavailable: {}", e),
        }
    }

    /// Read-eval-print loop over the terminal.
    ///
    /// Returns the code the process should exit with: the argument of `exit`, or
    /// the last status when input ends.
    pub fn repl(&mut self) -> rustyline::Result<ExitCode> {
        self.install_signal_relay();
        let mut rl = DefaultEditor::new()?;
        let user = self
            .state
            .env
            .get_var("USER")
            .unwrap_or_else(|| "user".to_string());
        let host = hostname::get()
            .map(|h| h.to_string_lossy().into_owned())
            .unwrap_or_else(|_| "localhost".to_string());

        loop {
            self.maintain_jobs(&mut io::stdout());
            let prompt = display::prompt(
                &user,
                &host,
                &self.state.env.current_dir,
                self.state.last_status,
            );

            match rl.readline(&prompt) {
                Ok(line) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    if let Err(e) = rl.add_history_entry(line.as_str()) {
                        log::warn!("line editor history: {}", e);
                    }
                    self.run_line(&line);
                    if self.relay.as_ref().is_some_and(SignalRelay::take_interrupt) {
                        println!();
                    }
                    if let Some(code) = self.state.exit_request {
                        return Ok(code);
                    }
                    if let Some(marker) = &self.state.config.completion_marker {
                        println!("{marker}");
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!();
                }
                Err(ReadlineError::Eof) => {
                    println!();
                    break;
                }
                Err(err) => return Err(err),
            }
        }

        Ok(self.state.last_status)
    }
}

fn report(e: &ShellError) {
    eprintln!("{}: {}", crate::SHELL_NAME, e);
}

/// The default set of commands:
/// - built-ins: `cd`, `pwd`, `exit`, `history`, `alias`, `unalias`, `jobs`,
///   `help`, `export`, `unset`, `echo`
/// - external command launcher, consulted last
fn default_factories() -> Vec<Box<dyn CommandFactory>> {
    use crate::builtin::*;
    use crate::external::ExternalCommand;
    vec![
        Box::new(Factory::<Cd>::default()),
        Box::new(Factory::<Pwd>::default()),
        Box::new(Factory::<Exit>::default()),
        Box::new(Factory::<History>::default()),
        Box::new(Factory::<Alias>::default()),
        Box::new(Factory::<Unalias>::default()),
        Box::new(Factory::<Jobs>::default()),
        Box::new(Factory::<Help>::default()),
        Box::new(Factory::<Export>::default()),
        Box::new(Factory::<Unset>::default()),
        Box::new(Factory::<Echo>::default()),
        Box::new(Factory::<ExternalCommand>::default()),
    ]
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::with_config(ShellConfig::default())
    }
}
