//! The worklist-driven propagation engine.
//!
//! The engine owns nothing: it borrows the model (for the propagators)
//! and the reverse index `variable -> watching propagators`, and drives
//! a state to its propagation fixpoint. Failure (some domain wiped out)
//! is reported as `None`; it is the search's job to treat that as a dead
//! branch.

use std::time::Instant;

use tracing::trace;

use crate::{
    model::Model,
    solver::{
        monitor::SearchMonitor,
        state::{DomainEvent, Revision, SearchState},
        stats::SolveStats,
        work_list::WorkList,
    },
};

/// A numeric identifier for a single variable in the constraint problem.
pub type VariableId = u32;
/// A numeric identifier for a single propagator in the constraint problem.
pub type PropagatorId = usize;

/// Builds the reverse index mapping each variable to the propagators
/// subscribed to it. Dense: indexed by variable id.
pub(crate) fn build_watchers(model: &Model) -> Vec<Vec<PropagatorId>> {
    let mut watchers = vec![Vec::new(); model.num_variables()];
    for id in 0..model.num_propagators() {
        for &var in model.propagator(id).variables() {
            watchers[var as usize].push(id);
        }
    }
    watchers
}

pub struct PropagationEngine<'m> {
    model: &'m Model,
    watchers: &'m [Vec<PropagatorId>],
}

impl<'m> PropagationEngine<'m> {
    pub fn new(model: &'m Model, watchers: &'m [Vec<PropagatorId>]) -> Self {
        Self { model, watchers }
    }

    /// Runs every propagator to a fixpoint. Used on the root state,
    /// where no event history exists yet.
    pub fn propagate_all(
        &self,
        state: SearchState,
        stats: &mut SolveStats,
        monitor: &SearchMonitor,
    ) -> Option<SearchState> {
        let mut worklist = WorkList::new(self.model.num_propagators());
        for id in 0..self.model.num_propagators() {
            worklist.push(self.model.propagator(id).priority(), id);
        }
        self.run(state, worklist, stats, monitor)
    }

    /// Runs the propagators watching the seed events (typically the one
    /// variable a branch decision touched) to a fixpoint.
    pub fn propagate(
        &self,
        state: SearchState,
        seeds: &[DomainEvent],
        stats: &mut SolveStats,
        monitor: &SearchMonitor,
    ) -> Option<SearchState> {
        let mut worklist = WorkList::new(self.model.num_propagators());
        self.schedule(seeds, &mut worklist);
        self.run(state, worklist, stats, monitor)
    }

    fn schedule(&self, events: &[DomainEvent], worklist: &mut WorkList) {
        for event in events {
            for &id in &self.watchers[event.var as usize] {
                worklist.push(self.model.propagator(id).priority(), id);
            }
        }
    }

    fn run(
        &self,
        mut state: SearchState,
        mut worklist: WorkList,
        stats: &mut SolveStats,
        monitor: &SearchMonitor,
    ) -> Option<SearchState> {
        while let Some(id) = worklist.pop() {
            let propagator = self.model.propagator(id);
            let propagator_stats = stats.propagator_stats.entry(id).or_default();
            propagator_stats.revisions += 1;
            monitor.add_propagation();

            let start_time = Instant::now();
            let mut revision = Revision::new(state);
            let outcome = propagator.propagate(&mut revision);
            propagator_stats.time_spent_micros += start_time.elapsed().as_micros() as u64;

            if outcome.is_err() {
                trace!(propagator = id, "propagation wiped out a domain");
                return None;
            }

            let (new_state, events) = revision.into_parts();
            state = new_state;
            if !events.is_empty() {
                propagator_stats.prunings += 1;
                self.schedule(&events, &mut worklist);
            }
        }
        Some(state)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::{
        model::{Model, Relation},
        solver::{
            engine::{build_watchers, PropagationEngine},
            monitor::SearchMonitor,
            state::SearchState,
            stats::SolveStats,
        },
    };

    #[test]
    fn fixpoint_chains_across_propagators() {
        // a < b and b < c over 1..=3 forces a=1, b=2, c=3.
        let mut model = Model::new(3);
        let a = model.new_var(1, 3).unwrap();
        let b = model.new_var(1, 3).unwrap();
        let c = model.new_var(1, 3).unwrap();
        model.inequality(a, Relation::Less, b).unwrap();
        model.inequality(b, Relation::Less, c).unwrap();

        let watchers = build_watchers(&model);
        let engine = PropagationEngine::new(&model, &watchers);
        let monitor = SearchMonitor::new();
        let mut stats = SolveStats::default();

        let state = engine
            .propagate_all(SearchState::root(&model), &mut stats, &monitor)
            .expect("the chain is satisfiable");
        assert_eq!(state.domain(a).singleton_value(), 1);
        assert_eq!(state.domain(b).singleton_value(), 2);
        assert_eq!(state.domain(c).singleton_value(), 3);
        assert!(monitor.propagations() >= 2);
    }

    #[test]
    fn root_failure_is_reported_as_none() {
        let mut model = Model::new(2);
        let a = model.new_var(1, 2).unwrap();
        let b = model.new_var(1, 2).unwrap();
        model.inequality(a, Relation::Less, b).unwrap();
        model.inequality(b, Relation::Less, a).unwrap();

        let watchers = build_watchers(&model);
        let engine = PropagationEngine::new(&model, &watchers);
        let monitor = SearchMonitor::new();
        let mut stats = SolveStats::default();

        assert!(engine
            .propagate_all(SearchState::root(&model), &mut stats, &monitor)
            .is_none());
    }
}
