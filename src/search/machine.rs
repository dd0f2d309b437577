//! Event-driven state machine of the diameter search.
//!
//! The machine owns no threads: [`SearchMachine::start`] returns the first
//! batch of diameters and [`SearchMachine::on_batch_done`] consumes a completed
//! batch and returns the next step. The engine dispatches batches and feeds the
//! results back.

use crate::candidate::extremum::best_index;
use crate::candidate::Extremum;
use crate::matrix::Size;
use crate::search::{SearchConfig, SearchResult};
use crate::trace::trace_event;
use crate::util::math::{norm_to_pixel, partition_interval};
use crate::util::{DiscFindError, DiscFindResult};

/// Lifecycle of one search.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum SearchState {
    #[default]
    Idle,
    /// One batch is outstanding for `diameters`.
    Evaluating {
        iteration: usize,
        diameters: Vec<f32>,
    },
    Done(SearchResult),
}

/// Action requested by the machine after a batch completes.
#[derive(Clone, Debug, PartialEq)]
pub enum Step {
    /// Evaluate `diameters` next; `progress` is the completed percentage.
    Dispatch { diameters: Vec<f32>, progress: u8 },
    /// The iteration budget is exhausted.
    Finished(SearchResult),
}

/// Single-threaded transition function of the search.
#[derive(Clone, Debug)]
pub struct SearchMachine {
    cfg: SearchConfig,
    full_size: Size,
    state: SearchState,
    generation: u64,
}

impl SearchMachine {
    /// Creates an idle machine after validating `cfg`.
    pub fn new(cfg: SearchConfig) -> DiscFindResult<Self> {
        cfg.validate()?;
        Ok(Self {
            cfg,
            full_size: Size::default(),
            state: SearchState::Idle,
            generation: 0,
        })
    }

    /// Returns the current state.
    pub fn state(&self) -> &SearchState {
        &self.state
    }

    /// Identifies the most recently started search.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns `true` while a batch is outstanding.
    pub fn is_active(&self) -> bool {
        matches!(self.state, SearchState::Evaluating { .. })
    }

    /// Starts a search over an input of `full_size` and returns the first batch.
    ///
    /// Rejected with [`DiscFindError::SearchActive`] while evaluating. Inputs
    /// below the minimum side are rejected without changing state; `Idle` and
    /// `Done` are both valid starting points.
    pub fn start(&mut self, full_size: Size) -> DiscFindResult<Vec<f32>> {
        if self.is_active() {
            return Err(DiscFindError::SearchActive);
        }
        if full_size.is_empty() {
            return Err(DiscFindError::NullMatrix {
                context: "search input",
            });
        }
        if full_size.min_side() < self.cfg.min_matrix_side {
            return Err(DiscFindError::MatrixTooSmall {
                width: full_size.width,
                height: full_size.height,
                min_side: self.cfg.min_matrix_side,
            });
        }

        let (lo, hi) = self.cfg.diameter_bounds(full_size);
        let diameters = partition_interval(lo, hi, self.cfg.intervals);
        self.full_size = full_size;
        self.generation = self.generation.wrapping_add(1);
        self.state = SearchState::Evaluating {
            iteration: 0,
            diameters: diameters.clone(),
        };
        Ok(diameters)
    }

    /// Consumes the extrema of the outstanding batch.
    ///
    /// Invalid candidates are dropped. A batch without any valid candidate
    /// returns the machine to `Idle` and reports
    /// [`DiscFindError::NoValidCandidates`].
    pub fn on_batch_done(&mut self, extrema: Vec<Extremum>) -> DiscFindResult<Step> {
        let iteration = match &self.state {
            SearchState::Evaluating { iteration, .. } => *iteration,
            _ => {
                return Err(DiscFindError::UnexpectedEvent(
                    "batch completed while no search is active",
                ))
            }
        };

        let valid: Vec<Extremum> = extrema.into_iter().filter(Extremum::is_valid).collect();
        let best = match best_index(&valid) {
            Some(best) => best,
            None => {
                self.state = SearchState::Idle;
                return Err(DiscFindError::NoValidCandidates { iteration });
            }
        };

        let completed = iteration + 1;
        if completed < self.cfg.iterations {
            let lo = valid[best.saturating_sub(1)].diameter;
            let hi = valid[(best + 1).min(valid.len() - 1)].diameter;
            trace_event!(
                "interval_narrowed",
                iteration = completed,
                best = valid[best].diameter,
                lo = lo,
                hi = hi,
            );
            let diameters = partition_interval(lo, hi, self.cfg.intervals);
            self.state = SearchState::Evaluating {
                iteration: completed,
                diameters: diameters.clone(),
            };
            let progress = (completed * 100 / self.cfg.iterations) as u8;
            return Ok(Step::Dispatch {
                diameters,
                progress,
            });
        }

        let result = self.to_result(&valid[best]);
        trace_event!(
            "search_finished",
            diameter = result.diameter,
            center_x = result.center_x,
            center_y = result.center_y,
            response = result.response,
        );
        self.state = SearchState::Done(result);
        Ok(Step::Finished(result))
    }

    /// Drops an outstanding batch and returns to `Idle`.
    pub fn abort(&mut self) {
        if self.is_active() {
            self.state = SearchState::Idle;
        }
    }

    /// Like [`SearchMachine::abort`], but only while search `generation` is
    /// still the current one. A later search is left running.
    pub fn abort_generation(&mut self, generation: u64) {
        if self.generation == generation {
            self.abort();
        }
    }

    fn to_result(&self, best: &Extremum) -> SearchResult {
        let size = self.full_size;
        SearchResult {
            center_x: norm_to_pixel(best.max_point.x, size.width),
            center_y: norm_to_pixel(best.max_point.y, size.height),
            diameter: best.diameter * size.min_side() as f32,
            relative_diameter: best.diameter,
            response: best.max_value,
        }
    }
}
