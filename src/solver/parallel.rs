//! Parallel search: the root disjunction split across worker threads.
//!
//! After the root fixpoint, the first branching variable's candidate
//! sub-domains are dealt round-robin to the workers. Each worker runs
//! the ordinary sequential search on its slice. The only shared mutable
//! state is the solution sink / incumbent, the cancellation and
//! cap-filled flags, and the monitor counters; the model and the root
//! state are shared immutably.

use std::{thread, time::Instant};

use tracing::debug;

use crate::solver::{
    engine::PropagationEngine,
    search::{Mode, Search, SearchStatus, Solver, Stop},
    state::SearchState,
    stats::SolveStats,
};

/// Runs the search below the (already propagated) root state across the
/// solver's configured number of workers and folds the worker verdicts
/// into one status.
pub(crate) fn run_workers(
    solver: &Solver,
    root: SearchState,
    deadline: Option<Instant>,
    mode: &Mode<'_>,
    stats: &mut SolveStats,
) -> SearchStatus {
    let node_base = solver.monitor.nodes();
    let make_search = || Search {
        model: solver.model.as_ref(),
        engine: PropagationEngine::new(solver.model.as_ref(), solver.watchers.as_slice()),
        var_select: solver.options.var_select.as_ref(),
        val_select: solver.options.val_select.as_ref(),
        cancel: &solver.options.cancel,
        deadline,
        node_limit: solver.options.node_limit,
        node_base,
        monitor: solver.monitor.as_ref(),
        stats: SolveStats::default(),
    };

    let Some(branch_var) = solver.options.var_select.select(solver.model.as_ref(), &root) else {
        // The root fixpoint already fixed everything.
        let mut search = make_search();
        let walk = search.descend(root, mode);
        stats.merge(&search.stats);
        return match walk {
            Ok(()) => SearchStatus::Complete,
            Err(stop) => stop.status(),
        };
    };

    let decisions = solver.options.val_select.partition(root.domain(branch_var));
    let workers = solver.resolved_workers().min(decisions.len()).max(1);
    debug!(workers, candidates = decisions.len(), "parallel root split");

    // Round-robin assignment keeps each worker's slice in heuristic
    // order.
    let mut slices: Vec<Vec<_>> = vec![Vec::new(); workers];
    for (index, decision) in decisions.into_iter().enumerate() {
        slices[index % workers].push(decision);
    }

    let root = &root;
    let verdicts: Vec<(Result<(), Stop>, SolveStats)> = thread::scope(|scope| {
        let handles: Vec<_> = slices
            .into_iter()
            .map(|slice| {
                scope.spawn(move || {
                    let mut search = make_search();
                    let mut walk = Ok(());
                    for decision in slice {
                        walk = search.branch(root, branch_var, decision, mode);
                        if walk.is_err() {
                            break;
                        }
                    }
                    (walk, search.stats)
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("worker threads do not panic"))
            .collect()
    });

    let mut status = SearchStatus::Complete;
    for (walk, worker_stats) in &verdicts {
        stats.merge(worker_stats);
        match walk {
            Ok(()) => {}
            Err(Stop::Cancelled) => status = SearchStatus::Cancelled,
            Err(_) => {
                if status == SearchStatus::Complete {
                    status = SearchStatus::LimitReached;
                }
            }
        }
    }
    status
}
