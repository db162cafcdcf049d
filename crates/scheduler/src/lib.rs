pub mod batch;
pub mod cancel;
pub mod error;
pub mod pool;
pub mod semaphore;

pub use batch::BatchDispatcher;
pub use cancel::{CancellationToken, Deadline};
pub use error::{Result, SchedulerError};
pub use pool::WorkerPool;
pub use semaphore::{Semaphore, SemaphorePermit};
