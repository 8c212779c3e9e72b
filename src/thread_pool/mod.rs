mod rayon_wrapper;
mod work_stealing;

pub use rayon_wrapper::*;
pub use work_stealing::*;

use crate::Result;

pub trait ThreadPool: Sized + Send {
    fn new(workers: u32) -> Result<Self>;

    /// Hand a task to the pool for eventual single execution. There is no
    /// completion handle; tasks needing one must capture their own signal.
    /// May block the caller while the target queue is at capacity.
    fn submit<F>(&self, task: F)
    where
        F: FnOnce() + Send + 'static;
}
