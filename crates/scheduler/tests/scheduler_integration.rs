use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use scheduler::{BatchDispatcher, CancellationToken, Deadline, SchedulerError, WorkerPool};

// A cancel fired from another thread mid-dispatch must stop the pool cleanly:
// no leaked workers, and the in-flight batch still gets drained rather than
// abandoned.
#[test]
fn cancel_from_another_thread_drains_cleanly() {
    let pool = WorkerPool::new(4);
    let token = CancellationToken::new();
    let started = Arc::new(AtomicUsize::new(0));

    let remote = token.clone();
    let canceller = thread::spawn(move || {
        thread::sleep(Duration::from_millis(10));
        remote.cancel();
    });

    let started_c = Arc::clone(&started);
    let items: Vec<u32> = (0..50).collect();
    let result = pool.run(items, &token, None, move |_i| {
        started_c.fetch_add(1, Ordering::SeqCst);
        thread::sleep(Duration::from_millis(5));
        Ok::<u32, SchedulerError>(0)
    });

    canceller.join().unwrap();
    assert!(matches!(result, Err(SchedulerError::Cancelled)));
    assert!(started.load(Ordering::SeqCst) < 50);
}

// The worker pool and the batch dispatcher are two independent concurrency
// primitives sharing one cancellation token; a deadline tripped against the
// pool must not affect a dispatcher run against the same token afterward.
#[test]
fn pool_deadline_does_not_poison_a_later_dispatcher_run() {
    let pool = WorkerPool::new(2);
    let token = CancellationToken::new();
    let deadline = Deadline::after(Duration::from_millis(1));

    let pool_err = pool
        .run(vec![1, 2, 3], &token, Some(&deadline), |_i| {
            thread::sleep(Duration::from_millis(20));
            Ok::<u32, SchedulerError>(0)
        })
        .unwrap_err();
    assert!(matches!(pool_err, SchedulerError::DeadlineExceeded { .. }));
    assert!(!token.is_cancelled());

    let dispatcher = BatchDispatcher::new(2);
    let results = dispatcher
        .run(vec![1, 2, 3], &token, None, |i| Ok::<u32, SchedulerError>(i * 10))
        .unwrap();
    let mut results = results;
    results.sort();
    assert_eq!(results, vec![10, 20, 30]);
}
