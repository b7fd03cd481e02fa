use std::any::Any;
use std::ops::Range;
use std::panic::{self, AssertUnwindSafe};

use log::{debug, warn};
use rayon::prelude::*;

use crate::error::{Result, SimError};

/// Below this many particles the per-step fan-out costs more than it saves.
pub const PARALLEL_THRESHOLD: usize = 100;

/// Number of contiguous chunks the particle range is split into.
pub const WORKER_CHUNKS: usize = 16;

/// Persistent worker threads reused across steps
pub struct WorkerPool {
    pool: rayon::ThreadPool,
}

impl WorkerPool {
    /// `threads` defaults to the number of logical CPUs.
    pub fn new(threads: Option<usize>) -> Result<Self> {
        let threads = threads.unwrap_or_else(num_cpus::get).max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("force-worker-{i}"))
            .build()?;
        debug!("started force worker pool with {threads} threads");
        Ok(Self { pool })
    }

    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }
}

pub fn chunk_size(len: usize, chunks: usize) -> usize {
    len.div_ceil(chunks.max(1)).max(1)
}

/// Half-open index ranges covering `0..len`, each `ceil(len / chunks)` long
/// except possibly the last.
pub fn chunk_ranges(len: usize, chunks: usize) -> Vec<Range<usize>> {
    let size = chunk_size(len, chunks);
    (0..len)
        .step_by(size)
        .map(|start| start..(start + size).min(len))
        .collect()
}

/// Fills `outputs[i] = kernel(i)` for every index.
///
/// Runs on the calling thread, as a single chunk 0, when there is no pool or
/// the slice is short. Otherwise each chunk gets exclusive access to its own
/// slice of `outputs` while `kernel` only reads shared data. All chunks finish
/// before this returns; the first panicking chunk, if any, is reported as an
/// error on either path.
pub fn dispatch<T, F>(outputs: &mut [T], pool: Option<&WorkerPool>, kernel: F) -> Result<()>
where
    T: Send,
    F: Fn(usize) -> T + Sync,
{
    let results: Vec<std::result::Result<(), (usize, String)>> = match pool {
        Some(pool) if outputs.len() >= PARALLEL_THRESHOLD => {
            let size = chunk_size(outputs.len(), WORKER_CHUNKS);
            let ranges = chunk_ranges(outputs.len(), WORKER_CHUNKS);
            pool.pool.install(|| {
                outputs
                    .par_chunks_mut(size)
                    .zip(ranges.par_iter())
                    .enumerate()
                    .map(|(chunk, (out, range))| run_chunk(chunk, out, range.clone(), &kernel))
                    .collect()
            })
        }
        _ => {
            let len = outputs.len();
            vec![run_chunk(0, outputs, 0..len, &kernel)]
        }
    };

    match results.into_iter().find_map(|r| r.err()) {
        Some((chunk, message)) => {
            warn!("force worker for chunk {chunk} failed: {message}");
            Err(SimError::WorkerPanicked { chunk, message })
        }
        None => Ok(()),
    }
}

fn run_chunk<T, F>(
    chunk: usize,
    out: &mut [T],
    range: Range<usize>,
    kernel: &F,
) -> std::result::Result<(), (usize, String)>
where
    F: Fn(usize) -> T,
{
    panic::catch_unwind(AssertUnwindSafe(|| {
        for (slot, i) in out.iter_mut().zip(range) {
            *slot = kernel(i);
        }
    }))
    .map_err(|payload| (chunk, panic_message(payload)))
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
