//! Depth-first search with propagation, branch-and-bound optimization,
//! limits and cooperative cancellation.

use std::{
    fmt,
    sync::{
        atomic::{AtomicBool, AtomicI64, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};

use parking_lot::Mutex;
use serde::Serialize;
use tracing::debug;

use crate::{
    error::SolveError,
    model::Model,
    solver::{
        domain::Domain,
        engine::{build_watchers, PropagationEngine, PropagatorId, VariableId},
        heuristics::{
            value::{MinValue, ValueSelect},
            variable::{FirstFail, VariableSelect},
        },
        monitor::SearchMonitor,
        state::{DomainEvent, Revision, SearchState},
        stats::SolveStats,
    },
};

/// A complete assignment: every variable fixed to a single value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Solution {
    values: Vec<u32>,
}

impl Solution {
    fn from_state(model: &Model, state: &SearchState) -> Self {
        let values = state
            .fixed_values(model.num_variables())
            .expect("solutions are recorded from complete states");
        Self { values }
    }

    /// The assigned value of `var`.
    pub fn value(&self, var: VariableId) -> u32 {
        self.values[var as usize]
    }

    /// All values in variable-id order.
    pub fn values(&self) -> &[u32] {
        &self.values
    }
}

/// How far a search got before returning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SearchStatus {
    /// The search space was exhausted: enumerations are complete,
    /// optima are proved.
    Complete,
    /// A node, time or solution limit fired first.
    LimitReached,
    /// The host cancelled the search.
    Cancelled,
}

/// Which way [`Solver::solve_optimal`] drives the objective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Objective {
    Minimize,
    Maximize,
}

/// The result of [`Solver::solve`].
#[derive(Debug)]
pub struct SolveOutcome {
    pub solutions: Vec<Solution>,
    pub status: SearchStatus,
    pub stats: SolveStats,
}

/// The result of [`Solver::solve_optimal`]: the best solution found and
/// whether optimality was proved ([`SearchStatus::Complete`]) or the
/// search stopped on a limit with this incumbent in hand.
#[derive(Debug)]
pub struct OptimalOutcome {
    pub solution: Solution,
    pub objective: u32,
    pub status: SearchStatus,
    pub stats: SolveStats,
}

/// A cooperative cancellation flag shared between the host and the
/// search. Setting it makes every worker unwind at its next node.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Tunable knobs for a solve. The defaults are first-fail branching,
/// ascending values, a single worker and no limits.
#[derive(Clone)]
pub struct SolveOptions {
    pub var_select: Arc<dyn VariableSelect>,
    pub val_select: Arc<dyn ValueSelect>,
    pub node_limit: Option<u64>,
    pub time_limit: Option<Duration>,
    /// Number of worker threads; `0` means one per hardware thread.
    pub workers: usize,
    pub cancel: CancelToken,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            var_select: Arc::new(FirstFail),
            val_select: Arc::new(MinValue),
            node_limit: None,
            time_limit: None,
            workers: 1,
            cancel: CancelToken::new(),
        }
    }
}

impl fmt::Debug for SolveOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SolveOptions")
            .field("node_limit", &self.node_limit)
            .field("time_limit", &self.time_limit)
            .field("workers", &self.workers)
            .finish_non_exhaustive()
    }
}

/// The best solution found so far during optimization, shared between
/// workers. The bound is read lock-free on the hot path; the solution
/// itself changes rarely (per new best) behind a tiny critical section.
pub(crate) struct Incumbent {
    objective: Objective,
    bound: AtomicI64,
    best: Mutex<Option<(u32, Solution)>>,
}

impl Incumbent {
    pub(crate) fn new(objective: Objective) -> Self {
        let initial = match objective {
            Objective::Minimize => i64::MAX,
            Objective::Maximize => i64::MIN,
        };
        Self {
            objective,
            bound: AtomicI64::new(initial),
            best: Mutex::new(None),
        }
    }

    /// The current best objective value, if any solution has landed.
    pub(crate) fn bound(&self) -> Option<i64> {
        let bound = self.bound.load(Ordering::Relaxed);
        match self.objective {
            Objective::Minimize if bound == i64::MAX => None,
            Objective::Maximize if bound == i64::MIN => None,
            _ => Some(bound),
        }
    }

    /// Installs `solution` if it beats the current best. CAS loop on the
    /// bound, then the critical section re-checks before storing.
    pub(crate) fn offer(&self, objective_value: u32, solution: Solution) -> bool {
        let proposed = objective_value as i64;
        let mut current = self.bound.load(Ordering::Relaxed);
        loop {
            let improves = match self.objective {
                Objective::Minimize => proposed < current,
                Objective::Maximize => proposed > current,
            };
            if !improves {
                return false;
            }
            match self.bound.compare_exchange_weak(
                current,
                proposed,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(observed) => current = observed,
            }
        }
        let mut best = self.best.lock();
        let stale = best.as_ref().is_some_and(|(held, _)| match self.objective {
            Objective::Minimize => *held <= objective_value,
            Objective::Maximize => *held >= objective_value,
        });
        if !stale {
            *best = Some((objective_value, solution));
        }
        true
    }

    pub(crate) fn take(&self) -> Option<(u32, Solution)> {
        self.best.lock().take()
    }
}

/// Why a search unwound early.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Stop {
    Cancelled,
    Deadline,
    Nodes,
    Solutions,
}

impl Stop {
    pub(crate) fn status(self) -> SearchStatus {
        match self {
            Stop::Cancelled => SearchStatus::Cancelled,
            Stop::Deadline | Stop::Nodes | Stop::Solutions => SearchStatus::LimitReached,
        }
    }
}

/// What the search does with complete states.
pub(crate) enum Mode<'a> {
    /// Record solutions until the optional cap is hit.
    Enumerate {
        sink: &'a Mutex<Vec<Solution>>,
        cap: Option<usize>,
        /// Raised when the cap is reached, so sibling workers stop.
        filled: &'a AtomicBool,
    },
    /// Keep the best objective value seen, tightening the objective
    /// domain at every node.
    Optimize {
        objective_var: VariableId,
        incumbent: &'a Incumbent,
    },
}

/// One worker's depth-first search over states.
pub(crate) struct Search<'a> {
    pub(crate) model: &'a Model,
    pub(crate) engine: PropagationEngine<'a>,
    pub(crate) var_select: &'a dyn VariableSelect,
    pub(crate) val_select: &'a dyn ValueSelect,
    pub(crate) cancel: &'a CancelToken,
    pub(crate) deadline: Option<Instant>,
    pub(crate) node_limit: Option<u64>,
    /// Monitor reading at solve start; the node limit applies to nodes
    /// spent by this solve, not the monitor's lifetime total.
    pub(crate) node_base: u64,
    pub(crate) monitor: &'a SearchMonitor,
    pub(crate) stats: SolveStats,
}

impl<'a> Search<'a> {
    fn check_limits(&self, mode: &Mode<'_>) -> Result<(), Stop> {
        if self.cancel.is_cancelled() {
            return Err(Stop::Cancelled);
        }
        if let Mode::Enumerate { filled, .. } = mode {
            if filled.load(Ordering::Relaxed) {
                return Err(Stop::Solutions);
            }
        }
        if let Some(limit) = self.node_limit {
            if self.monitor.nodes() - self.node_base >= limit {
                return Err(Stop::Nodes);
            }
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Err(Stop::Deadline);
            }
        }
        Ok(())
    }

    /// Explores one branch decision: tighten the objective, apply the
    /// decision, propagate, recurse. A wiped-out domain just closes the
    /// branch.
    pub(crate) fn branch(
        &mut self,
        parent: &SearchState,
        decision_var: VariableId,
        decision: Domain,
        mode: &Mode<'_>,
    ) -> Result<(), Stop> {
        self.check_limits(mode)?;
        self.monitor.add_node();
        self.stats.nodes_visited += 1;

        let mut revision = Revision::new(parent.fork());
        if self.tighten_objective(&mut revision, mode).is_err() {
            self.fail();
            return Ok(());
        }
        // Intersect rather than overwrite: when the branching variable
        // is the objective, the bound tightening above may already have
        // shrunk it past the decision.
        if revision.intersect(decision_var, &decision).is_err() {
            self.fail();
            return Ok(());
        }

        let (state, seeds) = revision.into_parts();
        match self.propagate(state, &seeds) {
            None => {
                self.fail();
                Ok(())
            }
            Some(state) => self.descend(state, mode),
        }
    }

    /// Handles a propagated state: record it if complete, branch
    /// otherwise.
    pub(crate) fn descend(&mut self, state: SearchState, mode: &Mode<'_>) -> Result<(), Stop> {
        let Some(var) = self.var_select.select(self.model, &state) else {
            return self.record_solution(&state, mode);
        };
        for child in self.val_select.partition(state.domain(var)) {
            self.branch(&state, var, child, mode)?;
        }
        Ok(())
    }

    fn propagate(&mut self, state: SearchState, seeds: &[DomainEvent]) -> Option<SearchState> {
        self.engine
            .propagate(state, seeds, &mut self.stats, self.monitor)
    }

    fn tighten_objective(
        &self,
        revision: &mut Revision,
        mode: &Mode<'_>,
    ) -> Result<(), crate::solver::state::EmptyDomain> {
        let Mode::Optimize {
            objective_var,
            incumbent,
        } = mode
        else {
            return Ok(());
        };
        let Some(bound) = incumbent.bound() else {
            return Ok(());
        };
        match incumbent.objective {
            Objective::Minimize => {
                let _ = revision.restrict_bounds(*objective_var, i64::MIN, bound - 1)?;
            }
            Objective::Maximize => {
                let _ = revision.restrict_bounds(*objective_var, bound + 1, i64::MAX)?;
            }
        }
        Ok(())
    }

    fn record_solution(&mut self, state: &SearchState, mode: &Mode<'_>) -> Result<(), Stop> {
        let solution = Solution::from_state(self.model, state);
        match mode {
            Mode::Enumerate { sink, cap, filled } => {
                let mut solutions = sink.lock();
                if cap.is_some_and(|cap| solutions.len() >= cap) {
                    filled.store(true, Ordering::Relaxed);
                    return Err(Stop::Solutions);
                }
                solutions.push(solution);
                self.monitor.add_solution();
                debug!(found = solutions.len(), "recorded solution");
                if cap.is_some_and(|cap| solutions.len() >= cap) {
                    filled.store(true, Ordering::Relaxed);
                    return Err(Stop::Solutions);
                }
                Ok(())
            }
            Mode::Optimize {
                objective_var,
                incumbent,
            } => {
                let objective_value = solution.value(*objective_var);
                if incumbent.offer(objective_value, solution) {
                    self.monitor.add_solution();
                    debug!(objective = objective_value, "new incumbent");
                }
                Ok(())
            }
        }
    }

    fn fail(&mut self) {
        self.monitor.add_failure();
        self.stats.backtracks += 1;
    }
}

/// The solving façade: owns the frozen model, the reverse index, the
/// options and the monitor.
pub struct Solver {
    pub(crate) model: Arc<Model>,
    pub(crate) watchers: Arc<Vec<Vec<PropagatorId>>>,
    pub(crate) options: SolveOptions,
    pub(crate) monitor: Arc<SearchMonitor>,
}

impl Solver {
    pub fn new(model: Model) -> Self {
        Self::with_options(model, SolveOptions::default())
    }

    pub fn with_options(model: Model, options: SolveOptions) -> Self {
        let watchers = Arc::new(build_watchers(&model));
        Self {
            model: Arc::new(model),
            watchers,
            options,
            monitor: Arc::new(SearchMonitor::new()),
        }
    }

    pub fn model(&self) -> &Model {
        self.model.as_ref()
    }

    /// Live counters; clone the `Arc` to poll from another thread.
    pub fn monitor(&self) -> Arc<SearchMonitor> {
        Arc::clone(&self.monitor)
    }

    /// The root state before any propagation.
    pub fn root_state(&self) -> SearchState {
        SearchState::root(&self.model)
    }

    /// Runs every propagator on `state` to a fixpoint without
    /// searching. `None` means the state is infeasible.
    pub fn propagate(&self, state: SearchState) -> Option<SearchState> {
        let engine = PropagationEngine::new(self.model.as_ref(), self.watchers.as_slice());
        let mut stats = SolveStats::default();
        engine.propagate_all(state, &mut stats, &self.monitor)
    }

    fn deadline(&self) -> Option<Instant> {
        self.options.time_limit.map(|limit| Instant::now() + limit)
    }

    fn search<'a>(&'a self, deadline: Option<Instant>) -> Search<'a> {
        Search {
            model: self.model.as_ref(),
            engine: PropagationEngine::new(self.model.as_ref(), self.watchers.as_slice()),
            var_select: self.options.var_select.as_ref(),
            val_select: self.options.val_select.as_ref(),
            cancel: &self.options.cancel,
            deadline,
            node_limit: self.options.node_limit,
            node_base: self.monitor.nodes(),
            monitor: self.monitor.as_ref(),
            stats: SolveStats::default(),
        }
    }

    pub(crate) fn resolved_workers(&self) -> usize {
        if self.options.workers == 0 {
            num_cpus::get()
        } else {
            self.options.workers
        }
    }

    /// Enumerates solutions. `max_solutions <= 0` enumerates all;
    /// a positive value caps the count (and reports
    /// [`SearchStatus::LimitReached`] when the cap cuts the enumeration
    /// short).
    ///
    /// `Err(Infeasible)` is returned only when a completed search found
    /// nothing; an interrupted search returns the solutions it has.
    pub fn solve(&self, max_solutions: i64) -> Result<SolveOutcome, SolveError> {
        let cap = usize::try_from(max_solutions).ok().filter(|&cap| cap > 0);
        let deadline = self.deadline();
        debug!(?cap, workers = self.resolved_workers(), "solve");

        let mut stats = SolveStats::default();
        let engine = PropagationEngine::new(self.model.as_ref(), self.watchers.as_slice());
        let Some(root) = engine.propagate_all(self.root_state(), &mut stats, &self.monitor)
        else {
            return Err(SolveError::Infeasible);
        };

        let sink = Mutex::new(Vec::new());
        let filled = AtomicBool::new(false);
        let mode = Mode::Enumerate {
            sink: &sink,
            cap,
            filled: &filled,
        };

        let status = if self.resolved_workers() > 1 {
            crate::solver::parallel::run_workers(self, root, deadline, &mode, &mut stats)
        } else {
            let mut search = self.search(deadline);
            let walk = search.descend(root, &mode);
            stats.merge(&search.stats);
            match walk {
                Ok(()) => SearchStatus::Complete,
                Err(stop) => stop.status(),
            }
        };

        let solutions = sink.into_inner();
        if solutions.is_empty() && status == SearchStatus::Complete {
            return Err(SolveError::Infeasible);
        }
        Ok(SolveOutcome {
            solutions,
            status,
            stats,
        })
    }

    /// Branch-and-bound optimization of `objective_var`.
    ///
    /// Anytime: with limits or cancellation the best incumbent comes
    /// back with the corresponding status; an error is returned only
    /// when no solution was found at all.
    pub fn solve_optimal(
        &self,
        objective_var: VariableId,
        objective: Objective,
    ) -> Result<OptimalOutcome, SolveError> {
        if objective_var as usize >= self.model.num_variables() {
            return Err(SolveError::InvalidModel(
                crate::error::ModelError::UnknownVariable(objective_var),
            ));
        }
        let deadline = self.deadline();
        debug!(?objective, var = objective_var, "solve_optimal");

        let mut stats = SolveStats::default();
        let engine = PropagationEngine::new(self.model.as_ref(), self.watchers.as_slice());
        let Some(root) = engine.propagate_all(self.root_state(), &mut stats, &self.monitor)
        else {
            return Err(SolveError::Infeasible);
        };

        let incumbent = Incumbent::new(objective);
        let mode = Mode::Optimize {
            objective_var,
            incumbent: &incumbent,
        };

        let status = if self.resolved_workers() > 1 {
            crate::solver::parallel::run_workers(self, root, deadline, &mode, &mut stats)
        } else {
            let mut search = self.search(deadline);
            let walk = search.descend(root, &mode);
            stats.merge(&search.stats);
            match walk {
                Ok(()) => SearchStatus::Complete,
                Err(stop) => stop.status(),
            }
        };

        match incumbent.take() {
            Some((objective_value, solution)) => Ok(OptimalOutcome {
                solution,
                objective: objective_value,
                status,
                stats,
            }),
            None => match status {
                SearchStatus::Complete => Err(SolveError::Infeasible),
                SearchStatus::LimitReached => Err(SolveError::LimitReached),
                SearchStatus::Cancelled => Err(SolveError::Cancelled),
            },
        }
    }
}
