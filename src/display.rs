//! Text rendering for everything the core reports as structured data.

use crate::alias::Alias;
use crate::command::ExitCode;
use crate::jobs::{JobEvent, JobId, JobSummary};
use std::io::{self, Write};
use std::path::Path;

const GREEN: &str = "\x1b[32m";
const BLUE: &str = "\x1b[34m";
const RED: &str = "\x1b[31m";
const RESET: &str = "\x1b[0m";

/// `user@host:cwd$ `, with the `$` red after a failed command.
pub fn prompt(user: &str, host: &str, cwd: &Path, last_status: ExitCode) -> String {
    let mark = if last_status == 0 { GREEN } else { RED };
    format!(
        "{GREEN}{user}@{host}{RESET}:{BLUE}{}{RESET}{mark}$ {RESET}",
        cwd.display()
    )
}

pub fn write_job_started(out: &mut dyn Write, id: JobId, pid: u32) -> io::Result<()> {
    writeln!(out, "[{id}] {pid}")
}

pub fn write_job_event(out: &mut dyn Write, event: &JobEvent) -> io::Result<()> {
    match event.exit_code {
        0 => writeln!(out, "[{}] Done\t\t{}", event.id, event.command),
        code => writeln!(out, "[{}] Exit {}\t\t{}", event.id, code, event.command),
    }
}

pub fn write_jobs(out: &mut dyn Write, jobs: &[JobSummary]) -> io::Result<()> {
    writeln!(out, "Background Jobs:")?;
    for job in jobs {
        writeln!(out, "[{}] Running\t\t{}", job.id, job.command)?;
    }
    Ok(())
}

pub fn write_alias(out: &mut dyn Write, alias: &Alias) -> io::Result<()> {
    writeln!(out, "alias {}='{}'", alias.name, alias.value)
}

pub fn write_aliases(out: &mut dyn Write, aliases: &[Alias]) -> io::Result<()> {
    writeln!(out, "Aliases:")?;
    for alias in aliases {
        write_alias(out, alias)?;
    }
    Ok(())
}

pub fn write_history<'a>(
    out: &mut dyn Write,
    lines: impl Iterator<Item = &'a str>,
) -> io::Result<()> {
    writeln!(out, "Command History:")?;
    for (i, line) in lines.enumerate() {
        writeln!(out, "{:3}  {}", i + 1, line)?;
    }
    Ok(())
}

pub fn write_variables(out: &mut dyn Write, vars: &[(&str, &str)]) -> io::Result<()> {
    for (name, value) in vars {
        writeln!(out, "export {name}={value}")?;
    }
    Ok(())
}

pub fn write_help(out: &mut dyn Write, entries: &[(&str, &str)]) -> io::Result<()> {
    writeln!(out, "mysh - interactive command interpreter")?;
    writeln!(out, "Built-in commands:")?;
    let width = entries.iter().map(|(usage, _)| usage.len()).max().unwrap_or(0);
    for (usage, summary) in entries {
        writeln!(out, "  {usage:width$}  - {summary}")?;
    }
    Ok(())
}
