use std::thread;

use crossbeam_channel::unbounded;

use crate::cancel::{CancellationToken, Deadline};
use crate::error::Result;
use crate::semaphore::Semaphore;

/// Producer-consumer dispatch for the directory-enumeration path: each batch
/// either gets a permit and runs on its own thread, or — when the pool is
/// saturated — runs inline on the caller. The inline fallback is the back
/// pressure: the caller can't outrun the workers because it becomes one.
pub struct BatchDispatcher {
    semaphore: Semaphore,
}

impl BatchDispatcher {
    pub fn new(capacity: usize) -> Self {
        Self {
            semaphore: Semaphore::new(capacity),
        }
    }

    pub fn run<T, R, F>(
        &self,
        batches: Vec<T>,
        token: &CancellationToken,
        deadline: Option<&Deadline>,
        process: F,
    ) -> Result<Vec<R>>
    where
        T: Send + 'static,
        R: Send + 'static,
        F: Fn(T) -> Result<R> + Send + Sync + 'static,
    {
        let process = std::sync::Arc::new(process);
        let (tx, rx) = unbounded::<Result<R>>();
        let mut spawned = 0usize;
        let mut results = Vec::new();

        for batch in batches {
            token.check()?;
            if let Some(d) = deadline {
                d.check()?;
            }

            match self.semaphore.try_acquire() {
                Some(permit) => {
                    let tx = tx.clone();
                    let process = std::sync::Arc::clone(&process);
                    spawned += 1;
                    thread::spawn(move || {
                        let outcome = process(batch);
                        drop(permit);
                        let _ = tx.send(outcome);
                    });
                }
                None => {
                    results.push(process(batch)?);
                }
            }
        }

        drop(tx);
        for outcome in rx.iter().take(spawned) {
            results.push(outcome?);
        }

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn processes_every_batch_exactly_once() {
        let dispatcher = BatchDispatcher::new(2);
        let token = CancellationToken::new();
        let batches: Vec<Vec<u32>> = (0..6).map(|i| vec![i]).collect();
        let results = dispatcher
            .run(batches, &token, None, |b| Ok::<u32, crate::error::SchedulerError>(b[0]))
            .unwrap();
        let mut results = results;
        results.sort();
        assert_eq!(results, (0..6).collect::<Vec<_>>());
    }

    #[test]
    fn falls_back_to_inline_once_saturated() {
        let dispatcher = BatchDispatcher::new(1);
        let token = CancellationToken::new();
        let inline_calls = Arc::new(AtomicUsize::new(0));
        let inline_calls_c = Arc::clone(&inline_calls);
        let batches: Vec<u32> = (0..3).collect();
        dispatcher
            .run(batches, &token, None, move |b| {
                if b != 0 {
                    inline_calls_c.fetch_add(1, Ordering::SeqCst);
                } else {
                    thread::sleep(Duration::from_millis(20));
                }
                Ok::<u32, crate::error::SchedulerError>(b)
            })
            .unwrap();
        assert!(inline_calls.load(Ordering::SeqCst) >= 1);
    }

    #[test]
    fn cancellation_stops_new_dispatch() {
        let dispatcher = BatchDispatcher::new(2);
        let token = CancellationToken::new();
        token.cancel();
        let batches: Vec<u32> = (0..3).collect();
        let err = dispatcher
            .run(batches, &token, None, |b| Ok::<u32, crate::error::SchedulerError>(b))
            .unwrap_err();
        assert!(matches!(err, crate::error::SchedulerError::Cancelled));
    }
}
