//! In-process partition group.
//!
//! Each rank runs on its own thread and holds a [`ThreadComm`]. Reductions
//! rendezvous on a shared mutex/condvar pair and sum contributions in rank
//! order, so the result is bitwise identical on every rank and from run to
//! run.

use std::sync::{Arc, Condvar, Mutex};

use super::comm::{CommError, Communicator};

#[derive(Debug)]
struct ReduceState {
    /// Completed collectives so far
    generation: u64,
    /// Ranks that have contributed to the current collective
    arrived: usize,
    /// Contribution of each rank to the current collective
    partials: Vec<Option<Vec<f64>>>,
    /// Result of the last completed collective
    result: Result<Vec<f64>, CommError>,
    /// Set once any member has left the group
    aborted: bool,
}

#[derive(Debug)]
struct Shared {
    size: usize,
    state: Mutex<ReduceState>,
    done: Condvar,
}

/// Communicator for one rank of a thread-backed partition group.
///
/// Dropping a member aborts the group: ranks blocked in, or later entering,
/// a reduction get [`CommError::GroupAborted`] instead of waiting forever.
#[derive(Debug)]
pub struct ThreadComm {
    rank: usize,
    shared: Arc<Shared>,
}

/// Create the communicators of a `size`-rank group, indexed by rank.
pub fn thread_group(size: usize) -> Vec<ThreadComm> {
    assert!(size > 0, "Need at least one rank");

    let shared = Arc::new(Shared {
        size,
        state: Mutex::new(ReduceState {
            generation: 0,
            arrived: 0,
            partials: vec![None; size],
            result: Ok(Vec::new()),
            aborted: false,
        }),
        done: Condvar::new(),
    });

    (0..size)
        .map(|rank| ThreadComm {
            rank,
            shared: Arc::clone(&shared),
        })
        .collect()
}

/// Run `f` once per rank of a fresh `size`-rank group, each on its own thread.
///
/// Returns the per-rank results in rank order. A panic on any rank is
/// propagated to the caller after all threads have finished.
pub fn run_partitioned<T, F>(size: usize, f: F) -> Vec<T>
where
    F: Fn(ThreadComm) -> T + Sync,
    T: Send,
{
    let comms = thread_group(size);
    std::thread::scope(|scope| {
        let f = &f;
        let handles: Vec<_> = comms
            .into_iter()
            .map(|comm| scope.spawn(move || f(comm)))
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().unwrap_or_else(|e| std::panic::resume_unwind(e)))
            .collect()
    })
}

fn sum_in_rank_order(partials: &mut [Option<Vec<f64>>]) -> Result<Vec<f64>, CommError> {
    let expected = partials
        .first()
        .and_then(|p| p.as_ref())
        .map_or(0, |p| p.len());
    let mut total = vec![0.0; expected];
    let mut mismatch = None;

    for slot in partials.iter_mut() {
        let values = slot.take().unwrap_or_default();
        if values.len() != expected {
            mismatch.get_or_insert(values.len());
            continue;
        }
        for (t, v) in total.iter_mut().zip(&values) {
            *t += v;
        }
    }

    match mismatch {
        Some(actual) => Err(CommError::LengthMismatch { expected, actual }),
        None => Ok(total),
    }
}

impl Communicator for ThreadComm {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.shared.size
    }

    fn all_reduce_sum(&self, local: &[f64]) -> Result<Vec<f64>, CommError> {
        let mut state = self
            .shared
            .state
            .lock()
            .map_err(|_| CommError::GroupAborted)?;
        if state.aborted {
            return Err(CommError::GroupAborted);
        }

        let generation = state.generation;
        state.partials[self.rank] = Some(local.to_vec());
        state.arrived += 1;

        if state.arrived == self.shared.size {
            let result = sum_in_rank_order(&mut state.partials);
            state.arrived = 0;
            state.generation += 1;
            state.result = result.clone();
            self.shared.done.notify_all();
            return result;
        }

        while state.generation == generation && !state.aborted {
            state = self
                .shared
                .done
                .wait(state)
                .map_err(|_| CommError::GroupAborted)?;
        }

        // Completion wins over a later abort: the collective did finish
        if state.generation == generation {
            return Err(CommError::GroupAborted);
        }
        state.result.clone()
    }
}

impl Drop for ThreadComm {
    fn drop(&mut self) {
        if let Ok(mut state) = self.shared.state.lock() {
            state.aborted = true;
        }
        self.shared.done.notify_all();
    }
}
