use std::sync::Arc;
use std::thread;

use crossbeam_channel::unbounded;
use log::debug;

use crate::cancel::{CancellationToken, Deadline};
use crate::error::{Result, SchedulerError};

/// Bounded worker pool used for both the per-archive pipeline and the bank
/// exporter's concurrency cap. One primitive, two call sites: admission is a
/// plain counter bounded by `capacity`, results are collected on an MPSC
/// channel, and the owner always receives before dispatching more work —
/// never spawns unaccounted work, never `select`-with-`default`.
pub struct WorkerPool {
    capacity: usize,
}

impl WorkerPool {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "worker pool capacity must be at least 1");
        Self { capacity }
    }

    /// Runs `work` over every item in `items`, at most `capacity` concurrently.
    /// Honors `token` and `deadline` at every suspension point. On deadline
    /// expiry, stops dispatching new work, drains in-flight workers, then
    /// returns `DeadlineExceeded`. Returns results in arbitrary order, per
    /// the scheduler's "task results may arrive in any order" guarantee.
    pub fn run<T, R, F>(
        &self,
        items: Vec<T>,
        token: &CancellationToken,
        deadline: Option<&Deadline>,
        work: F,
    ) -> Result<Vec<R>>
    where
        T: Send + 'static,
        R: Send + 'static,
        F: Fn(T) -> Result<R> + Send + Sync + 'static,
    {
        let total = items.len();
        let work = Arc::new(work);
        let (tx, rx) = unbounded::<Result<R>>();
        let mut pending = items.into_iter();
        let mut active = 0usize;
        let mut finished = 0usize;
        let mut results = Vec::with_capacity(total);
        let mut deadline_hit: Option<SchedulerError> = None;

        loop {
            if deadline_hit.is_none() {
                if let Err(e) = token.check() {
                    deadline_hit = Some(e);
                } else if let Some(d) = deadline {
                    if let Err(e) = d.check() {
                        deadline_hit = Some(e);
                    }
                }
            }

            if active > 0 {
                let outcome = rx.recv().expect("worker dropped sender without a reply");
                active -= 1;
                finished += 1;
                match outcome {
                    Ok(r) => results.push(r),
                    Err(e) => return Err(drain_and_return(rx, active, e)),
                }
            }

            if finished >= total {
                break;
            }

            if deadline_hit.is_none() {
                while active < self.capacity {
                    let Some(item) = pending.next() else { break };
                    let tx = tx.clone();
                    let work = Arc::clone(&work);
                    active += 1;
                    thread::spawn(move || {
                        let outcome = work(item);
                        let _ = tx.send(outcome);
                    });
                }
            } else if active == 0 {
                break;
            }
        }

        if let Some(e) = deadline_hit {
            return Err(drain_and_return(rx, active, e));
        }

        if active != 0 {
            return Err(SchedulerError::LeakedWorker { active });
        }

        debug!("worker pool finished {} of {} tasks", finished, total);
        Ok(results)
    }
}

fn drain_and_return<R>(
    rx: crossbeam_channel::Receiver<Result<R>>,
    mut active: usize,
    err: SchedulerError,
) -> SchedulerError {
    while active > 0 {
        if rx.recv().is_ok() {
            active -= 1;
        } else {
            break;
        }
    }
    err
}
