/// Thread pool setup for the parallel pipeline stages.
use crate::{HerbariumError, Result};

/// Builds the global rayon pool. A thread count of zero means one
/// worker per logical CPU.
pub fn configure_thread_pool(threads: usize) -> Result<()> {
    let threads = if threads == 0 {
        num_cpus::get()
    } else {
        threads
    };

    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .map_err(|e| HerbariumError::Other(format!("thread pool setup failed: {}", e)))
}
