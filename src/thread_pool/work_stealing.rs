use crate::deque::{Closed, WorkDeque, DEFAULT_MAX_SIZE};
use crate::event::{Observer, PoolEvent};
use crate::{PoolError, Result};
use rand::Rng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

/// Upper bound on the platform-derived default worker count. An explicit
/// count passed by the caller is taken as-is.
const MAX_DEFAULT_WORKERS: usize = 4;

type Task = Box<dyn FnOnce() + Send + 'static>;

/// State shared between the pool handle and its workers.
struct Shared {
    queues: Vec<WorkDeque<Task>>,
    /// Advisory stop flag. The authoritative shutdown signal is closing
    /// every queue; a parked worker only wakes on close or new data.
    stop: AtomicBool,
    observer: Option<Observer>,
}

impl Shared {
    fn emit(&self, event: PoolEvent) {
        if let Some(observer) = &self.observer {
            observer(event);
        }
    }
}

/// A pool of worker threads, each owning one bounded deque.
///
/// `submit` pushes to a uniformly random queue. Each worker prefers the
/// back of its own queue (newest task), then steals the oldest task from a
/// random peer, then parks on its own queue until work arrives or the
/// queue is closed.
///
/// Dropping the pool is the synchronous shutdown: it stops the workers,
/// drains every queue, and joins every thread. Every task whose `submit`
/// completed before the drop began runs exactly once.
pub struct WorkStealingThreadPool {
    shared: Arc<Shared>,
    handles: Vec<thread::JoinHandle<()>>,
}

impl WorkStealingThreadPool {
    /// Start configuring a pool.
    pub fn builder() -> Builder {
        Builder::new()
    }

    /// Create a pool sized from the available parallelism, clamped to
    /// `[1, 4]`.
    pub fn with_default_workers() -> Result<Self> {
        Builder::new().build()
    }

    pub fn workers(&self) -> usize {
        self.shared.queues.len()
    }
}

impl super::ThreadPool for WorkStealingThreadPool {
    fn new(workers: u32) -> Result<Self> {
        Builder::new().workers(workers as usize).build()
    }

    fn submit<F>(&self, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        // No submitter affinity: any queue, including a worker's own, is a
        // valid target.
        let target = rand::thread_rng().gen_range(0..self.shared.queues.len());
        if let Err(Closed(task)) = self.shared.queues[target].push(Box::new(task)) {
            // Submitting after shutdown is a lifecycle contract violation;
            // the task is dropped, not run.
            log::warn!("task submitted to a shut-down pool was discarded");
            drop(task);
        }
    }
}

impl Drop for WorkStealingThreadPool {
    fn drop(&mut self) {
        self.shared.emit(PoolEvent::ShutdownRequested {
            workers: self.shared.queues.len(),
        });

        self.shared.stop.store(true, Ordering::Release);
        for queue in &self.shared.queues {
            queue.close();
        }

        for handle in self.handles.drain(..) {
            if handle.join().is_err() {
                log::error!("worker thread panicked while running a task");
            }
        }
        log::debug!("pool shut down, all workers joined");
    }
}

/// Configures a [`WorkStealingThreadPool`].
pub struct Builder {
    workers: Option<usize>,
    max_queue_size: usize,
    observer: Option<Observer>,
}

impl Builder {
    fn new() -> Builder {
        Builder {
            workers: None,
            max_queue_size: DEFAULT_MAX_SIZE,
            observer: None,
        }
    }

    /// Exact worker count. Zero is rejected at build time; leaving the
    /// count unset falls back to the clamped platform estimate.
    pub fn workers(mut self, workers: usize) -> Builder {
        self.workers = Some(workers);
        self
    }

    /// Per-queue capacity before `submit` starts blocking.
    pub fn max_queue_size(mut self, max_size: usize) -> Builder {
        self.max_queue_size = max_size;
        self
    }

    /// Register a callback for pool lifecycle transitions.
    pub fn observer<F>(mut self, observer: F) -> Builder
    where
        F: Fn(PoolEvent) + Send + Sync + 'static,
    {
        self.observer = Some(Arc::new(observer));
        self
    }

    pub fn build(self) -> Result<WorkStealingThreadPool> {
        let workers = match self.workers {
            Some(0) => return Err(PoolError::NoWorkers),
            Some(n) => n,
            None => num_cpus::get().clamp(1, MAX_DEFAULT_WORKERS),
        };

        let queues = (0..workers)
            .map(|_| WorkDeque::new(self.max_queue_size))
            .collect();
        let shared = Arc::new(Shared {
            queues,
            stop: AtomicBool::new(false),
            observer: self.observer,
        });

        let mut handles = Vec::with_capacity(workers);
        for idx in 0..workers {
            let shared = Arc::clone(&shared);
            let handle = thread::Builder::new()
                .name(format!("stealpool-worker-{idx}"))
                .spawn(move || run_worker(shared, idx))?;
            handles.push(handle);
        }
        log::debug!("pool started with {workers} workers");

        Ok(WorkStealingThreadPool { shared, handles })
    }
}

/// The scheduling loop bound to queue `idx`.
///
/// Task panics are not caught here: the loop offers no isolation boundary
/// per task, so an unhandled panic unwinds this worker.
fn run_worker(shared: Arc<Shared>, idx: usize) {
    let mut rng = rand::thread_rng();
    let queues = &shared.queues;

    log::debug!("worker {idx} started");
    shared.emit(PoolEvent::WorkerStarted { worker: idx });

    loop {
        // Once stop is requested the loop no longer seeks fresh work; it
        // drains through `wait_and_pop` until its queue is closed and empty.
        if !shared.stop.load(Ordering::Acquire) {
            // 1. Newest task from the own queue.
            if let Some(task) = queues[idx].try_pop() {
                task();
                continue;
            }

            // 2. Oldest task from a random victim. A self-steal degenerates
            // to another local attempt.
            let victim = rng.gen_range(0..queues.len());
            if let Some(task) = queues[victim].try_steal() {
                task();
                continue;
            }
        }

        // 3. Park on the own queue. `None` means closed and drained.
        match queues[idx].wait_and_pop() {
            Some(task) => task(),
            None => break,
        }
    }

    log::debug!("worker {idx} exited");
    shared.emit(PoolEvent::WorkerExited { worker: idx });
}
