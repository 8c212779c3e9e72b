use serde::Serialize;
use std::sync::Arc;

/// A lifecycle transition reported by a pool.
///
/// The pool itself writes nothing to stdout; callers that want narration
/// register an [`Observer`] and render events however they like.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PoolEvent {
    /// A worker thread entered its scheduling loop.
    WorkerStarted { worker: usize },
    /// A worker observed its queue closed and empty and exited.
    WorkerExited { worker: usize },
    /// Shutdown began; every queue is about to be closed.
    ShutdownRequested { workers: usize },
}

/// Callback invoked on every [`PoolEvent`]. May be called from any worker
/// thread as well as the thread driving shutdown.
pub type Observer = Arc<dyn Fn(PoolEvent) + Send + Sync + 'static>;
