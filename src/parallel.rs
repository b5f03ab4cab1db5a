//! Fork-join parallel map over a slice.
//!
//! Each call partitions the input statically into contiguous ranges, spawns
//! one scoped thread per range, and joins every thread before returning.
//! No threads outlive the call.

use std::convert::Infallible;
use std::ops::Range;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};
use std::thread;

use log::{debug, trace, warn};

use crate::error::{BoxError, Error, Result, WorkerPanic};

/// Split `[0, n)` into contiguous ranges, one per worker
///
/// The number of ranges is `min(workers, n)`, clamped to at least 1. Every
/// range has `n / ranges` elements except the last, which absorbs the
/// remainder. For `n == 0` the result is a single empty range.
pub fn partition(n: usize, workers: usize) -> Vec<Range<usize>> {
    let workers = workers.min(n).max(1);
    let chunk = n / workers;

    (0..workers)
        .map(|id| {
            let start = id * chunk;
            let end = if id == workers - 1 { n } else { start + chunk };
            start..end
        })
        .collect()
}

/// First-error-wins slot shared by the workers of one call.
struct FirstFailure {
    stop: AtomicBool,
    failure: Mutex<Option<(usize, BoxError)>>,
}

impl FirstFailure {
    fn new() -> Self {
        Self {
            stop: AtomicBool::new(false),
            failure: Mutex::new(None),
        }
    }

    fn should_stop(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }

    fn record(&self, worker: usize, source: BoxError) {
        self.stop.store(true, Ordering::Release);

        let mut slot = self.failure.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.is_none() {
            warn!("parallel map worker {} failed: {}", worker, source);
            *slot = Some((worker, source));
        } else {
            trace!("worker {} failure dropped, an earlier failure was kept", worker);
        }
    }

    fn into_error(self) -> Option<Error> {
        self.failure
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .map(|(worker, source)| Error::MapperFailure { worker, source })
    }
}

/// Applies a function to every element of a slice on a fixed number of threads
///
/// The mapper itself holds only the worker count; all per-call state
/// (partition table, output, worker threads) lives inside the call.
///
/// The mapped function is invoked concurrently with itself and must not
/// rely on shared mutable state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParallelMapper {
    workers: usize,
}

impl ParallelMapper {
    /// Create a mapper using up to `workers` threads per call (0 is treated as 1)
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }

    /// Configured worker count
    pub fn thread_count(&self) -> usize {
        self.workers
    }

    /// Map `f` over `input`, preserving order
    ///
    /// # Returns
    /// * `Ok(output)` with `output[i] == f(&input[i])`
    /// * `Err(Error::MapperFailure)` if `f` panicked on any worker; the
    ///   source is a [`WorkerPanic`]. A panic stops the other workers the
    ///   same way a failure from [`try_map`](Self::try_map) does.
    pub fn map<T, R, F>(&self, input: &[T], f: F) -> Result<Vec<R>>
    where
        T: Sync,
        R: Send,
        F: Fn(&T) -> R + Sync,
    {
        self.try_map(input, |item| Ok::<R, Infallible>(f(item)))
    }

    /// Map a fallible `f` over `input`, preserving order
    ///
    /// The first failure observed wins. A failing worker abandons the rest
    /// of its range and raises a stop flag; the other workers check it
    /// between elements and stop early. The call still waits for every
    /// worker before returning the failure, and any partial results are
    /// discarded.
    ///
    /// # Returns
    /// * `Ok(output)` with `output[i]` produced from `input[i]`
    /// * `Err(Error::MapperFailure)` carrying the first failure
    pub fn try_map<T, R, E, F>(&self, input: &[T], f: F) -> Result<Vec<R>>
    where
        T: Sync,
        R: Send,
        E: Into<BoxError>,
        F: Fn(&T) -> std::result::Result<R, E> + Sync,
    {
        if input.is_empty() {
            return Ok(Vec::new());
        }

        let ranges = partition(input.len(), self.workers);
        debug!(
            "parallel map: {} elements on {} workers, ranges {:?}",
            input.len(),
            ranges.len(),
            ranges
        );

        let failures = FirstFailure::new();
        let f = &f;
        let failures_ref = &failures;

        let chunks: Vec<Option<Vec<R>>> = thread::scope(|scope| {
            let handles: Vec<_> = ranges
                .iter()
                .cloned()
                .enumerate()
                .map(|(worker, range)| {
                    thread::Builder::new()
                        .name(format!("ringfork-worker-{}", worker))
                        .spawn_scoped(scope, move || {
                            let mut out = Vec::with_capacity(range.len());
                            for item in &input[range] {
                                if failures_ref.should_stop() {
                                    return None;
                                }
                                match panic::catch_unwind(AssertUnwindSafe(|| f(item))) {
                                    Ok(Ok(value)) => out.push(value),
                                    Ok(Err(err)) => {
                                        failures_ref.record(worker, err.into());
                                        return None;
                                    }
                                    Err(payload) => {
                                        failures_ref.record(
                                            worker,
                                            Box::new(WorkerPanic::from_payload(payload)),
                                        );
                                        return None;
                                    }
                                }
                            }
                            trace!("worker {} finished {} elements", worker, out.len());
                            Some(out)
                        })
                })
                .collect();

            // Join everything before looking at the outcome. Panics are caught
            // in the worker loop; a join error only covers panics outside `f`.
            handles
                .into_iter()
                .enumerate()
                .map(|(worker, handle)| match handle {
                    Ok(handle) => match handle.join() {
                        Ok(chunk) => chunk,
                        Err(payload) => {
                            failures_ref
                                .record(worker, Box::new(WorkerPanic::from_payload(payload)));
                            None
                        }
                    },
                    Err(err) => {
                        failures_ref.record(worker, Box::new(err));
                        None
                    }
                })
                .collect()
        });

        if let Some(err) = failures.into_error() {
            return Err(err);
        }

        let mut output = Vec::with_capacity(input.len());
        for chunk in chunks.into_iter().flatten() {
            output.extend(chunk);
        }
        Ok(output)
    }
}

impl Default for ParallelMapper {
    /// One worker per available hardware thread, or 1 if unknown
    fn default() -> Self {
        let workers = thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        Self::new(workers)
    }
}
