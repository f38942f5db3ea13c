use std::ops::Range;
use std::sync::Arc;

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::body::Body;
use crate::error::{Result, SimError};
use crate::kernel::{self, Merge};

/// Executes the tick kernel, either inline or on a pool of worker threads.
#[derive(Clone, Debug, Default)]
pub enum Backend {
    #[default]
    Sequential,
    Parallel { pool: Arc<ThreadPool>, workers: usize },
}

/// Result of one tick: the compacted bodies and the merges that produced them.
#[derive(Clone, Debug, Default)]
pub struct Tick {
    pub bodies: Vec<Body>,
    pub merges: Vec<Merge>,
}

impl Backend {
    pub fn sequential() -> Self {
        Self::Sequential
    }

    /// Builds a dedicated pool of `workers` threads.
    pub fn parallel(workers: usize) -> Result<Self> {
        if workers == 0 {
            return Err(SimError::BackendUnavailable("zero workers requested".into()));
        }
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("gravity-worker-{i}"))
            .build()
            .map_err(|e| SimError::BackendUnavailable(e.to_string()))?;
        log::info!("parallel backend ready with {workers} workers");
        Ok(Self::Parallel {
            pool: Arc::new(pool),
            workers,
        })
    }

    /// One worker runs inline; more get a thread pool.
    pub fn with_workers(workers: usize) -> Result<Self> {
        match workers {
            0 | 1 => Ok(Self::Sequential),
            n => Self::parallel(n),
        }
    }

    pub fn workers(&self) -> usize {
        match self {
            Self::Sequential => 1,
            Self::Parallel { workers, .. } => *workers,
        }
    }

    /// Runs `f` once per partition, handing each call its own slots of `out`.
    /// Returns after every partition has finished.
    fn for_each_partition<T, F>(&self, out: &mut [T], f: F)
    where
        T: Send,
        F: Fn(Range<usize>, &mut [T]) + Sync,
    {
        match self {
            Self::Sequential => f(0..out.len(), out),
            Self::Parallel { pool, workers } => {
                let ranges = partition(out.len(), *workers);
                let parts = split_by(out, &ranges);
                pool.install(|| {
                    parts
                        .into_par_iter()
                        .for_each(|(range, slots)| f(range, slots));
                });
            }
        }
    }

    /// Advances `snapshot` by one time step. The snapshot is never mutated.
    pub fn tick(&self, snapshot: &[Body], dt: f64, g: f64) -> Tick {
        let n = snapshot.len();

        let mut proposals = vec![Vec::new(); n];
        self.for_each_partition(&mut proposals, |range, slots| {
            kernel::propose_range(snapshot, range, slots)
        });

        let mut merged = snapshot.to_vec();
        let merges = kernel::resolve(&mut merged, &proposals);

        let mut bodies = merged.clone();
        self.for_each_partition(&mut bodies, |range, slots| {
            kernel::integrate_range(&merged, range, dt, g, slots)
        });
        bodies.retain(|body| !body.is_dead);

        log::debug!(
            "tick: {n} bodies in, {} out, {} merges",
            bodies.len(),
            merges.len()
        );
        Tick { bodies, merges }
    }
}

/// Splits `0..n` into at most `workers` contiguous ranges covering every index.
/// The first `n % workers` ranges are one element longer.
pub fn partition(n: usize, workers: usize) -> Vec<Range<usize>> {
    let workers = workers.max(1);
    let base = n / workers;
    let extra = n % workers;

    let mut ranges = Vec::with_capacity(workers);
    let mut start = 0;
    for k in 0..workers {
        let len = base + usize::from(k < extra);
        if len == 0 {
            break;
        }
        ranges.push(start..start + len);
        start += len;
    }
    ranges
}

fn split_by<'a, T>(mut out: &'a mut [T], ranges: &[Range<usize>]) -> Vec<(Range<usize>, &'a mut [T])> {
    let mut parts = Vec::with_capacity(ranges.len());
    for range in ranges {
        let (head, tail) = std::mem::take(&mut out).split_at_mut(range.len());
        parts.push((range.clone(), head));
        out = tail;
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partition_covers_remainder() {
        let ranges = partition(10, 3);
        assert_eq!(ranges, vec![0..4, 4..7, 7..10]);
    }

    #[test]
    fn partition_with_more_workers_than_bodies() {
        assert_eq!(partition(2, 8), vec![0..1, 1..2]);
        assert!(partition(0, 4).is_empty());
    }

    #[test]
    fn every_slot_written_once() {
        let backend = Backend::parallel(3).unwrap();
        let mut slots = vec![0usize; 11];
        backend.for_each_partition(&mut slots, |range, out| {
            for (slot, i) in out.iter_mut().zip(range) {
                *slot += i + 1;
            }
        });
        assert_eq!(slots, (1..=11).collect::<Vec<_>>());
    }

    #[test]
    fn zero_workers_is_unavailable() {
        assert!(matches!(
            Backend::parallel(0),
            Err(SimError::BackendUnavailable(_))
        ));
        assert_eq!(Backend::with_workers(1).unwrap().workers(), 1);
    }
}
