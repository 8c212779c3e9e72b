use crate::Result;

/// `rayon`'s pool behind the same trait, kept as an ecosystem baseline for
/// the throughput benchmarks.
pub struct RayonThreadPool(rayon::ThreadPool);

impl super::ThreadPool for RayonThreadPool {
    fn new(workers: u32) -> Result<Self> {
        let rayon = rayon::ThreadPoolBuilder::new()
            .num_threads(workers as usize)
            .thread_name(|idx| format!("rayon-baseline-{idx}"))
            .build()?;
        Ok(RayonThreadPool(rayon))
    }

    fn submit<F>(&self, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        // Fire-and-forget; `install` would block the submitter until the
        // task ran.
        self.0.spawn(task)
    }
}
