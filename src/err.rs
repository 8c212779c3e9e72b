/// A Result type generic over a [PoolError]
pub type Result<T> = std::result::Result<T, PoolError>;

/// Custom error
#[derive(Debug)]
pub enum PoolError {
    /// A pool was requested with zero worker threads.
    NoWorkers,
    /// Spawning a worker thread failed.
    Io(std::io::Error),
    /// The rayon baseline pool could not be built.
    Rayon(rayon::ThreadPoolBuildError),
}

impl std::fmt::Display for PoolError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for PoolError {}

impl From<std::io::Error> for PoolError {
    fn from(e: std::io::Error) -> Self {
        PoolError::Io(e)
    }
}
impl From<rayon::ThreadPoolBuildError> for PoolError {
    fn from(e: rayon::ThreadPoolBuildError) -> Self {
        PoolError::Rayon(e)
    }
}
