//! Search engine driving the state machine over a rayon worker pool.
//!
//! The machine runs on one driver thread and advances only when a whole batch
//! has been evaluated; candidates within a batch run in parallel on the pool
//! and share the input matrix read-only.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;

use rayon::prelude::*;
use rayon::ThreadPool;

use crate::candidate::Extremum;
use crate::matrix::Matrix2D;
use crate::search::evaluate::evaluate_candidate;
use crate::search::machine::{SearchMachine, SearchState, Step};
use crate::search::{SearchConfig, SearchResult};
use crate::trace::trace_span;
use crate::util::{DiscFindError, DiscFindResult};

/// Receives push notifications from a running search.
///
/// Callbacks run on the search driver thread.
pub trait SearchObserver: Send + Sync {
    /// Called after every completed batch with the percentage done.
    fn on_progress(&self, _percent: u8) {}

    /// Called once with the final result.
    fn on_finished(&self, _result: &SearchResult) {}
}

/// Observer that ignores every notification.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl SearchObserver for NoopObserver {}

/// Notification forwarded by [`ChannelObserver`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SearchEvent {
    Progress(u8),
    Finished(SearchResult),
}

/// Observer forwarding notifications into an mpsc channel.
///
/// Events are dropped once the receiver is gone.
pub struct ChannelObserver {
    tx: Sender<SearchEvent>,
}

impl ChannelObserver {
    /// Wraps an existing sender.
    pub fn new(tx: Sender<SearchEvent>) -> Self {
        Self { tx }
    }

    /// Creates an observer together with its receiving end.
    pub fn channel() -> (Self, Receiver<SearchEvent>) {
        let (tx, rx) = mpsc::channel();
        (Self::new(tx), rx)
    }

    fn send(&self, event: SearchEvent) {
        let _ = self.tx.send(event);
    }
}

impl SearchObserver for ChannelObserver {
    fn on_progress(&self, percent: u8) {
        self.send(SearchEvent::Progress(percent));
    }

    fn on_finished(&self, result: &SearchResult) {
        self.send(SearchEvent::Finished(*result));
    }
}

/// Handle to a search running on its driver thread.
pub struct SearchHandle {
    join: JoinHandle<DiscFindResult<SearchResult>>,
}

impl SearchHandle {
    /// Blocks until the search finishes and returns its result.
    pub fn wait(self) -> DiscFindResult<SearchResult> {
        self.join.join().unwrap_or_else(|_| {
            Err(DiscFindError::WorkerPool {
                reason: "search thread panicked".to_string(),
            })
        })
    }

    /// Returns `true` once the driver thread has exited.
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }
}

/// Disc search engine with a fixed-size worker pool.
pub struct SearchEngine {
    cfg: SearchConfig,
    pool: Arc<ThreadPool>,
    machine: Arc<Mutex<SearchMachine>>,
    observer: Arc<dyn SearchObserver>,
}

impl SearchEngine {
    /// Builds an engine and its worker pool.
    pub fn new(cfg: SearchConfig) -> DiscFindResult<Self> {
        let machine = SearchMachine::new(cfg)?;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(cfg.threads)
            .thread_name(|idx| format!("discfind-worker-{idx}"))
            .build()
            .map_err(|err| DiscFindError::WorkerPool {
                reason: err.to_string(),
            })?;
        Ok(Self {
            cfg,
            pool: Arc::new(pool),
            machine: Arc::new(Mutex::new(machine)),
            observer: Arc::new(NoopObserver),
        })
    }

    /// Replaces the notification observer.
    pub fn with_observer(mut self, observer: Arc<dyn SearchObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Returns the engine configuration.
    pub fn config(&self) -> &SearchConfig {
        &self.cfg
    }

    /// Returns `true` while a search is evaluating.
    pub fn is_search_active(&self) -> bool {
        lock(&self.machine).is_active()
    }

    /// Returns a snapshot of the search state.
    pub fn state(&self) -> SearchState {
        lock(&self.machine).state().clone()
    }

    /// Starts a search on a background driver thread.
    ///
    /// Fails with [`DiscFindError::SearchActive`] while another search runs;
    /// that search is not affected. Input preconditions are checked before the
    /// thread is spawned.
    pub fn start_search(&self, matrix: Arc<Matrix2D<i32>>) -> DiscFindResult<SearchHandle> {
        let (first, generation) = begin(&self.machine, &matrix)?;

        let machine = Arc::clone(&self.machine);
        let pool = Arc::clone(&self.pool);
        let observer = Arc::clone(&self.observer);
        let cfg = self.cfg;
        let spawned = std::thread::Builder::new()
            .name("discfind-search".to_string())
            .spawn(move || {
                let _reset = ResetOnExit {
                    machine: &machine,
                    generation,
                };
                drive(&machine, first, &matrix, &cfg, &pool, observer.as_ref())
            });

        match spawned {
            Ok(join) => Ok(SearchHandle { join }),
            Err(err) => {
                lock(&self.machine).abort_generation(generation);
                Err(DiscFindError::WorkerPool {
                    reason: err.to_string(),
                })
            }
        }
    }

    /// Runs a search to completion on the calling thread.
    pub fn search_blocking(&self, matrix: &Matrix2D<i32>) -> DiscFindResult<SearchResult> {
        let (first, generation) = begin(&self.machine, matrix)?;
        let _reset = ResetOnExit {
            machine: &self.machine,
            generation,
        };
        drive(
            &self.machine,
            first,
            matrix,
            &self.cfg,
            &self.pool,
            self.observer.as_ref(),
        )
    }
}

/// Returns the machine to `Idle` if the driver exits mid-batch.
///
/// Tied to one search generation: once that search is `Done`, a search
/// started afterwards is not touched.
struct ResetOnExit<'a> {
    machine: &'a Mutex<SearchMachine>,
    generation: u64,
}

impl Drop for ResetOnExit<'_> {
    fn drop(&mut self) {
        lock(self.machine).abort_generation(self.generation);
    }
}

/// Starts the machine and returns the first batch with its generation.
fn begin(
    machine: &Mutex<SearchMachine>,
    matrix: &Matrix2D<i32>,
) -> DiscFindResult<(Vec<f32>, u64)> {
    let mut machine = lock(machine);
    let first = machine.start(matrix.size())?;
    Ok((first, machine.generation()))
}

fn lock(machine: &Mutex<SearchMachine>) -> MutexGuard<'_, SearchMachine> {
    machine.lock().unwrap_or_else(PoisonError::into_inner)
}

fn drive(
    machine: &Mutex<SearchMachine>,
    first: Vec<f32>,
    matrix: &Matrix2D<i32>,
    cfg: &SearchConfig,
    pool: &ThreadPool,
    observer: &dyn SearchObserver,
) -> DiscFindResult<SearchResult> {
    let _span = trace_span!(
        "search",
        width = matrix.width(),
        height = matrix.height(),
        parallel = cfg.parallel
    )
    .entered();

    let mut diameters = first;
    let mut iteration = 0usize;
    loop {
        let extrema = {
            let _span = trace_span!(
                "search_iteration",
                iteration = iteration,
                candidates = diameters.len()
            )
            .entered();
            evaluate_batch(matrix, &diameters, cfg, pool)?
        };

        let step = lock(machine).on_batch_done(extrema)?;
        match step {
            Step::Dispatch {
                diameters: next,
                progress,
            } => {
                observer.on_progress(progress);
                diameters = next;
                iteration += 1;
            }
            Step::Finished(result) => {
                observer.on_progress(100);
                observer.on_finished(&result);
                return Ok(result);
            }
        }
    }
}

/// Evaluates every diameter of a batch; returns only after all have finished.
fn evaluate_batch(
    matrix: &Matrix2D<i32>,
    diameters: &[f32],
    cfg: &SearchConfig,
    pool: &ThreadPool,
) -> DiscFindResult<Vec<Extremum>> {
    let results: Vec<DiscFindResult<Extremum>> = if cfg.parallel {
        pool.install(|| {
            diameters
                .par_iter()
                .map(|&diameter| evaluate_candidate(matrix, diameter, cfg))
                .collect()
        })
    } else {
        diameters
            .iter()
            .map(|&diameter| evaluate_candidate(matrix, diameter, cfg))
            .collect()
    };

    let mut extrema = Vec::with_capacity(results.len());
    for result in results {
        extrema.push(result?);
    }
    Ok(extrema)
}
