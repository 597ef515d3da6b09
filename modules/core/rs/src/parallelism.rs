use std::cmp::Ordering;
use std::thread::available_parallelism;

use eyre::Result;
use rayon::{ThreadPool, ThreadPoolBuilder};

// Negative requests count down from the number of available cores: -1 means all of them,
// -2 all but one, and so on. Never returns less than one thread.
fn resolve(requested: isize, cores: isize) -> usize {
    match requested.cmp(&0) {
        Ordering::Less => (cores + requested + 1).max(1) as usize,
        Ordering::Equal => 1,
        Ordering::Greater => requested.min(cores) as usize,
    }
}

/// Number of worker threads to use for the requested amount.
pub fn available(requested: isize) -> Result<usize> {
    let cores = available_parallelism()?.get() as isize;
    Ok(resolve(requested, cores))
}

/// Dedicated rayon pool sized according to [`available`]. The calling thread takes part in the
/// work.
pub fn thread_pool(requested: isize) -> Result<ThreadPool> {
    let pool = ThreadPoolBuilder::new()
        .num_threads(available(requested)?)
        .use_current_thread()
        .build()?;
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_thread_requests() {
        for (requested, cores, expected) in [
            (0, 8, 1),
            (1, 8, 1),
            (6, 8, 6),
            (8, 8, 8),
            (64, 8, 8),
            (-1, 8, 8),
            (-3, 8, 6),
            (-8, 8, 1),
            (-100, 8, 1),
        ] {
            assert_eq!(resolve(requested, cores), expected);
        }
    }

    #[test]
    fn test_thread_pool() -> Result<()> {
        let pool = thread_pool(1)?;
        assert_eq!(pool.current_num_threads(), 1);
        assert_eq!(pool.install(|| 2 + 2), 4);
        Ok(())
    }
}
