use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// A non-blocking counting semaphore: `try_acquire` never waits, it either
/// gets a permit or reports none available. Used by the directory-batch
/// producer/consumer pattern, where a missing permit means "process inline"
/// rather than "wait."
#[derive(Clone)]
pub struct Semaphore {
    inner: Arc<AtomicUsize>,
    capacity: usize,
}

impl Semaphore {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(AtomicUsize::new(0)),
            capacity,
        }
    }

    pub fn try_acquire(&self) -> Option<SemaphorePermit> {
        let mut current = self.inner.load(Ordering::SeqCst);
        loop {
            if current >= self.capacity {
                return None;
            }
            match self.inner.compare_exchange_weak(
                current,
                current + 1,
                Ordering::SeqCst,
                Ordering::SeqCst,
            ) {
                Ok(_) => {
                    return Some(SemaphorePermit {
                        inner: Arc::clone(&self.inner),
                    })
                }
                Err(observed) => current = observed,
            }
        }
    }
}

/// RAII permit; releases on drop so a panicking worker never leaks capacity.
pub struct SemaphorePermit {
    inner: Arc<AtomicUsize>,
}

impl Drop for SemaphorePermit {
    fn drop(&mut self) {
        self.inner.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exhausts_and_releases_capacity() {
        let sem = Semaphore::new(2);
        let a = sem.try_acquire().unwrap();
        let b = sem.try_acquire().unwrap();
        assert!(sem.try_acquire().is_none());
        drop(a);
        assert!(sem.try_acquire().is_some());
        let _ = b;
    }
}
