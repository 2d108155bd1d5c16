use anyhow::{Context, Result};
use argh::FromArgs;
use mysh::Interpreter;
use mysh::command::ExitCode;
use mysh::config::ShellConfig;
use std::path::PathBuf;

#[derive(FromArgs)]
/// Interactive command interpreter with aliases, wildcards and background jobs.
struct Args {
    #[argh(option)]
    /// path to a TOML configuration file.
    config: Option<PathBuf>,

    #[argh(option)]
    /// maximum number of background jobs tracked at once.
    max_jobs: Option<usize>,

    #[argh(option)]
    /// maximum number of words in one command.
    max_args: Option<usize>,

    #[argh(option)]
    /// line printed after each command, for front ends driving the shell over a pipe.
    marker: Option<String>,

    #[argh(option, short = 'c')]
    /// run one command line and exit with its status.
    command: Option<String>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("MYSH_LOG", "warn"))
        .init();

    let args: Args = argh::from_env();
    let code = match run(args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", mysh::SHELL_NAME, e);
            2
        }
    };
    std::process::exit(code);
}

fn run(args: Args) -> Result<ExitCode> {
    let mut config = match &args.config {
        Some(path) => ShellConfig::load(path)?,
        None => ShellConfig::load_default(),
    };
    if let Some(max_jobs) = args.max_jobs {
        config.max_jobs = max_jobs;
    }
    if let Some(max_args) = args.max_args {
        config.max_args = max_args;
    }
    if args.marker.is_some() {
        config.completion_marker = args.marker;
    }
    log::info!(
        "starting with max_jobs={} max_args={}",
        config.max_jobs,
        config.max_args
    );

    let mut sh = Interpreter::with_config(config);

    if let Some(line) = args.command {
        let status = sh.run_line(&line);
        return Ok(sh.state().exit_request.unwrap_or(status));
    }

    println!("Welcome to mysh");
    println!("Type 'help' for available commands\n");
    sh.repl().context("line editor failed")
}
