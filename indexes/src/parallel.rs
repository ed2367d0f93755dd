use log::debug;

use crate::Result;

/// Runs `f` on a dedicated rayon pool with `threads` workers, so nested
/// `par_iter` calls inside `f` are bounded by the trial's thread count.
pub fn with_threads<R, F>(threads: u16, f: F) -> Result<R>
where
    R: Send,
    F: FnOnce() -> R + Send,
{
    let threads = threads.max(1) as usize;
    debug!("with_threads: building pool with {} worker(s)", threads);
    let pool = rayon::ThreadPoolBuilder::new().num_threads(threads).build()?;
    Ok(pool.install(f))
}
