//! Job table for background processes.
//!
//! The table is shared between the main loop and the signal relay thread as a
//! [`SharedJobTable`]; every mutation happens under its mutex.

use crate::command::ExitCode;
use crate::error::ShellError;
use crate::external::exit_code_of;
use std::process::{Child, Command};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Sequential, 1-based job identifier. Never reused.
pub type JobId = usize;

pub type SharedJobTable = Arc<Mutex<JobTable>>;

#[derive(Debug)]
pub struct Job {
    pub id: JobId,
    pub pid: u32,
    pub command: String,
    pub active: bool,
    child: Child,
}

/// What the display layer needs to list a running job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSummary {
    pub id: JobId,
    pub pid: u32,
    pub command: String,
}

/// A background job observed to have terminated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobEvent {
    pub id: JobId,
    pub command: String,
    pub exit_code: ExitCode,
}

#[derive(Debug)]
pub struct JobTable {
    jobs: Vec<Job>,
    capacity: usize,
    last_id: JobId,
}

impl JobTable {
    pub fn new(capacity: usize) -> Self {
        Self {
            jobs: Vec::new(),
            capacity,
            last_id: 0,
        }
    }

    pub fn shared(capacity: usize) -> SharedJobTable {
        Arc::new(Mutex::new(Self::new(capacity)))
    }

    /// Spawns `command` and records it as a new active job.
    ///
    /// Capacity is checked before spawning, so a full table never leaves an
    /// untracked child behind.
    pub fn spawn(
        &mut self,
        command: &mut Command,
        text: String,
        program: &str,
    ) -> Result<&Job, ShellError> {
        if self.is_full() {
            log::warn!("rejecting background job {:?}: table full", text);
            return Err(ShellError::JobTableFull {
                capacity: self.capacity,
            });
        }
        let child = command.spawn().map_err(|source| ShellError::Spawn {
            program: program.to_string(),
            source,
        })?;

        self.last_id += 1;
        let job = Job {
            id: self.last_id,
            pid: child.id(),
            command: text,
            active: true,
            child,
        };
        log::info!("job [{}] started, pid {}: {}", job.id, job.pid, job.command);
        self.jobs.push(job);
        Ok(&self.jobs[self.jobs.len() - 1])
    }

    /// Polls every active job without blocking and marks finished ones inactive.
    ///
    /// Each job produces exactly one event, on the poll that first sees it exit.
    pub fn reap(&mut self) -> Vec<JobEvent> {
        let mut events = Vec::new();
        for job in self.jobs.iter_mut().filter(|j| j.active) {
            let code = match job.child.try_wait() {
                Ok(Some(status)) => exit_code_of(status),
                Ok(None) => continue,
                Err(e) => {
                    log::warn!("job [{}] pid {} lost: {}", job.id, job.pid, e);
                    1
                }
            };
            job.active = false;
            log::info!("job [{}] finished with status {}", job.id, code);
            events.push(JobEvent {
                id: job.id,
                command: job.command.clone(),
                exit_code: code,
            });
        }
        events
    }

    /// Removes inactive entries, keeping the remaining ones in launch order.
    ///
    /// Returns how many entries were removed.
    pub fn sweep(&mut self) -> usize {
        let before = self.jobs.len();
        self.jobs.retain(|j| j.active);
        before - self.jobs.len()
    }

    pub fn active(&self) -> Vec<JobSummary> {
        self.jobs
            .iter()
            .filter(|j| j.active)
            .map(|j| JobSummary {
                id: j.id,
                pid: j.pid,
                command: j.command.clone(),
            })
            .collect()
    }

    pub fn get(&self, id: JobId) -> Option<&Job> {
        self.jobs.iter().find(|j| j.id == id)
    }

    /// Highest job id handed out so far, 0 before the first job.
    pub fn last_id(&self) -> JobId {
        self.last_id
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.jobs.len() >= self.capacity
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

/// Locks the table, recovering it if a previous holder panicked.
pub fn lock(jobs: &SharedJobTable) -> MutexGuard<'_, JobTable> {
    jobs.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn spawn(table: &mut JobTable, program: &str, args: &[&str]) -> JobId {
        let mut cmd = Command::new(program);
        cmd.args(args);
        let text = std::iter::once(program)
            .chain(args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ");
        table.spawn(&mut cmd, text, program).unwrap().id
    }

    /// Reaps until job `id` is inactive, collecting the events seen.
    fn reap_until_done(table: &mut JobTable, id: JobId) -> Vec<JobEvent> {
        let deadline = Instant::now() + Duration::from_secs(10);
        let mut events = Vec::new();
        while table.get(id).is_some_and(|j| j.active) {
            assert!(Instant::now() < deadline, "job {id} did not finish");
            events.extend(table.reap());
            std::thread::sleep(Duration::from_millis(10));
        }
        events
    }

    fn kill_all(table: &mut JobTable) {
        for job in table.jobs.iter_mut() {
            let _ = job.child.kill();
            let _ = job.child.wait();
        }
    }

    #[test]
    fn test_spawn_assigns_next_id_and_active() {
        let mut table = JobTable::new(10);
        assert_eq!(table.last_id(), 0);

        let id = spawn(&mut table, "true", &[]);
        assert_eq!(id, 1);
        assert_eq!(table.last_id(), 1);

        let job = table.get(id).unwrap();
        assert!(job.active);
        assert_eq!(job.command, "true");
        assert!(table.active().iter().any(|j| j.pid == job.pid));

        reap_until_done(&mut table, id);
    }

    #[test]
    fn test_reap_then_sweep_lifecycle() {
        let mut table = JobTable::new(10);
        let long = spawn(&mut table, "sleep", &["30"]);
        let short = spawn(&mut table, "true", &[]);

        let events = reap_until_done(&mut table, short);
        assert_eq!(
            events,
            vec![JobEvent {
                id: short,
                command: "true".to_string(),
                exit_code: 0,
            }]
        );
        assert!(!table.get(short).unwrap().active);
        assert!(table.get(long).unwrap().active);

        assert_eq!(table.sweep(), 1);
        assert!(table.get(short).is_none());
        assert_eq!(table.active()[0].id, long);

        kill_all(&mut table);
    }

    #[test]
    fn test_reap_reports_each_job_once() {
        let mut table = JobTable::new(10);
        let id = spawn(&mut table, "false", &[]);
        let events = reap_until_done(&mut table, id);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].exit_code, 1);
        assert!(table.reap().is_empty());
    }

    #[test]
    fn test_ids_not_reused_after_sweep() {
        let mut table = JobTable::new(10);
        let first = spawn(&mut table, "true", &[]);
        let second = spawn(&mut table, "true", &[]);
        reap_until_done(&mut table, first);
        reap_until_done(&mut table, second);
        table.sweep();
        assert!(table.is_empty());

        let third = spawn(&mut table, "true", &[]);
        assert_eq!(third, 3);
        reap_until_done(&mut table, third);
    }

    #[test]
    fn test_sweep_preserves_order_and_ids() {
        let mut table = JobTable::new(10);
        let a = spawn(&mut table, "sleep", &["30"]);
        let b = spawn(&mut table, "true", &[]);
        let c = spawn(&mut table, "sleep", &["30"]);
        reap_until_done(&mut table, b);
        table.sweep();

        let ids: Vec<JobId> = table.active().iter().map(|j| j.id).collect();
        assert_eq!(ids, vec![a, c]);

        kill_all(&mut table);
    }

    #[test]
    fn test_full_table_rejects_without_spawning() {
        let mut table = JobTable::new(1);
        spawn(&mut table, "sleep", &["30"]);

        let mut cmd = Command::new("true");
        let err = table.spawn(&mut cmd, "true".into(), "true").unwrap_err();
        assert!(matches!(err, ShellError::JobTableFull { capacity: 1 }));
        assert_eq!(table.len(), 1);
        assert_eq!(table.last_id(), 1);

        kill_all(&mut table);
    }

    #[test]
    fn test_spawn_failure_consumes_no_id() {
        let mut table = JobTable::new(4);
        let mut cmd = Command::new("/nonexistent/program/for/mysh");
        let err = table.spawn(&mut cmd, "x".into(), "x").unwrap_err();
        assert!(matches!(err, ShellError::Spawn { .. }));
        assert_eq!(table.last_id(), 0);
        assert!(table.is_empty());
    }
}
