use crate::error::{EdgeError, Result};
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::error;

/// Shared CPU-parallel worker pool handed to every checker of one run.
///
/// Cloning is cheap; the worker threads exit once the last clone is dropped.
#[derive(Clone)]
pub struct CpuPool {
    inner: Arc<rayon::ThreadPool>,
}

impl CpuPool {
    /// Half the logical cores, leaving headroom for network-bound work.
    pub fn default_size() -> usize {
        (num_cpus::get() / 2).max(1)
    }

    pub fn new(threads: usize) -> Result<Self> {
        let inner = rayon::ThreadPoolBuilder::new()
            .num_threads(threads.max(1))
            .thread_name(|i| format!("reachmap-cpu-{i}"))
            // Without a handler rayon aborts the process on a panicking job.
            .panic_handler(|_| error!("CPU pool job panicked"))
            .build()
            .map_err(|e| EdgeError::Pool(e.to_string()))?;
        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    pub fn threads(&self) -> usize {
        self.inner.current_num_threads()
    }

    /// Runs `job` on the pool and awaits its result without blocking the
    /// async runtime. Inside `job`, rayon parallel iterators use this pool.
    pub async fn run<F, R>(&self, job: F) -> Result<R>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        self.inner.spawn(move || {
            // Receiver gone means the caller stopped waiting.
            let _ = tx.send(job());
        });
        rx.await
            .map_err(|_| EdgeError::TaskFailed("CPU pool job panicked".to_string()))
    }
}
