//! The persistent search state and the revision handle propagators
//! mutate it through.
//!
//! A [`SearchState`] maps every variable to its current domain. It is
//! backed by a persistent map, so forking a state for a branch is O(1)
//! and sibling branches share structure instead of copying domains. A
//! state is never mutated in place: all changes go through a
//! [`Revision`], which checks for wipe-out, records a [`DomainEvent`]
//! per change, and produces the successor state.

use im::HashMap;

use crate::{
    model::Model,
    solver::{domain::Domain, engine::VariableId},
};

/// What kind of change a domain underwent, used to wake interested
/// propagators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Values were removed somewhere in the middle.
    Shrunk,
    /// The minimum or maximum moved.
    Bounds,
    /// The domain became a singleton.
    Fixed,
}

/// A domain change notification: which variable, and how.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DomainEvent {
    pub var: VariableId,
    pub kind: EventKind,
}

/// Marker for a wiped-out domain. Not an API error: the engine consumes
/// it and the search backtracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmptyDomain;

/// A single node in the search space: every variable's current domain.
///
/// Clone (or [`fork`](SearchState::fork)) is cheap; the underlying map is
/// persistent and shares structure with its ancestors.
#[derive(Debug, Clone)]
pub struct SearchState {
    domains: HashMap<VariableId, Domain>,
}

impl SearchState {
    /// The root state: every variable at its initial domain.
    pub fn root(model: &Model) -> Self {
        let domains = model
            .variables()
            .iter()
            .map(|variable| (variable.id, variable.domain.clone()))
            .collect();
        Self { domains }
    }

    /// The current domain of `var`.
    pub fn domain(&self, var: VariableId) -> &Domain {
        self.domains
            .get(&var)
            .expect("state holds a domain for every model variable")
    }

    /// A cheap handle for exploring a branch.
    pub fn fork(&self) -> Self {
        self.clone()
    }

    /// `true` when every variable is fixed.
    pub fn is_complete(&self) -> bool {
        self.domains.values().all(Domain::is_singleton)
    }

    /// The assigned values in variable-id order, or `None` if some
    /// variable is not fixed yet.
    pub fn fixed_values(&self, num_variables: usize) -> Option<Vec<u32>> {
        let mut values = Vec::with_capacity(num_variables);
        for var in 0..num_variables as VariableId {
            let domain = self.domain(var);
            if !domain.is_singleton() {
                return None;
            }
            values.push(domain.singleton_value());
        }
        Some(values)
    }

    fn with_domain(&self, var: VariableId, domain: Domain) -> Self {
        Self {
            domains: self.domains.update(var, domain),
        }
    }
}

/// An in-flight batch of domain changes against one state.
///
/// Propagators receive a `Revision`, read domains through it, and write
/// through the `set_domain` family. Each accepted write produces a new
/// underlying state and records an event; a write that would empty a
/// domain aborts with [`EmptyDomain`] instead.
#[derive(Debug)]
pub struct Revision {
    state: SearchState,
    events: Vec<DomainEvent>,
}

impl Revision {
    pub fn new(state: SearchState) -> Self {
        Self {
            state,
            events: Vec::new(),
        }
    }

    pub fn domain(&self, var: VariableId) -> &Domain {
        self.state.domain(var)
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    pub fn events(&self) -> &[DomainEvent] {
        &self.events
    }

    pub fn into_parts(self) -> (SearchState, Vec<DomainEvent>) {
        (self.state, self.events)
    }

    /// Replaces the domain of `var`. Returns whether anything changed;
    /// fails if `new` is empty. Propagators must only shrink: `new` has
    /// to be a subset of the current domain.
    pub fn set_domain(&mut self, var: VariableId, new: Domain) -> Result<bool, EmptyDomain> {
        if new.is_empty() {
            return Err(EmptyDomain);
        }
        let old = self.state.domain(var);
        if new == *old {
            return Ok(false);
        }
        debug_assert!(new.is_subset_of(old), "propagators may only shrink domains");
        let kind = if new.is_singleton() {
            EventKind::Fixed
        } else if new.min() != old.min() || new.max() != old.max() {
            EventKind::Bounds
        } else {
            EventKind::Shrunk
        };
        self.events.push(DomainEvent { var, kind });
        self.state = self.state.with_domain(var, new);
        Ok(true)
    }

    /// Fixes `var` to `value`; fails if the value is not available.
    pub fn fix(&mut self, var: VariableId, value: u32) -> Result<bool, EmptyDomain> {
        let domain = self.domain(var);
        if !domain.has(value) {
            return Err(EmptyDomain);
        }
        if domain.is_singleton() {
            return Ok(false);
        }
        let singleton = Domain::singleton(domain.max_value(), value);
        self.set_domain(var, singleton)
    }

    pub fn intersect(&mut self, var: VariableId, other: &Domain) -> Result<bool, EmptyDomain> {
        let (new, changed) = self.domain(var).intersect(other);
        if !changed {
            return Ok(false);
        }
        self.set_domain(var, new)
    }

    pub fn remove_value(&mut self, var: VariableId, value: u32) -> Result<bool, EmptyDomain> {
        let (new, changed) = self.domain(var).remove_value(value);
        if !changed {
            return Ok(false);
        }
        self.set_domain(var, new)
    }

    pub fn remove_below(&mut self, var: VariableId, bound: u32) -> Result<bool, EmptyDomain> {
        let (new, changed) = self.domain(var).remove_below(bound);
        if !changed {
            return Ok(false);
        }
        self.set_domain(var, new)
    }

    pub fn remove_above(&mut self, var: VariableId, bound: u32) -> Result<bool, EmptyDomain> {
        let (new, changed) = self.domain(var).remove_above(bound);
        if !changed {
            return Ok(false);
        }
        self.set_domain(var, new)
    }

    /// Clamps `var` to the (possibly out-of-range) inclusive interval
    /// `lo..=hi` expressed in i64 arithmetic. Used by the linear
    /// propagators, whose intermediate bounds can leave the value space.
    pub fn restrict_bounds(&mut self, var: VariableId, lo: i64, hi: i64) -> Result<bool, EmptyDomain> {
        if hi < 1 || lo > self.domain(var).max_value() as i64 || hi < lo {
            return Err(EmptyDomain);
        }
        let mut changed = false;
        if lo > 1 {
            changed |= self.remove_below(var, lo as u32)?;
        }
        if hi < self.domain(var).max_value() as i64 {
            changed |= self.remove_above(var, hi as u32)?;
        }
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{EventKind, Revision, SearchState};
    use crate::{model::Model, solver::domain::Domain};

    fn two_var_state() -> (SearchState, u32, u32) {
        let mut model = Model::new(9);
        let a = model.new_var(1, 9).unwrap();
        let b = model.new_var(3, 7).unwrap();
        (SearchState::root(&model), a, b)
    }

    #[test]
    fn root_state_mirrors_initial_domains() {
        let (state, a, b) = two_var_state();
        assert_eq!(state.domain(a).size(), 9);
        assert_eq!(state.domain(b).size(), 5);
        assert!(!state.is_complete());
    }

    #[test]
    fn forks_do_not_observe_sibling_writes() {
        let (state, a, _) = two_var_state();
        let fork = state.fork();

        let mut revision = Revision::new(fork);
        revision.fix(a, 4).unwrap();
        let (child, events) = revision.into_parts();

        assert_eq!(child.domain(a).singleton_value(), 4);
        assert_eq!(state.domain(a).size(), 9);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, EventKind::Fixed);
    }

    #[test]
    fn event_kinds_reflect_the_change() {
        let (state, a, _) = two_var_state();
        let mut revision = Revision::new(state);

        revision.remove_value(a, 5).unwrap();
        assert_eq!(revision.events()[0].kind, EventKind::Shrunk);

        revision.remove_below(a, 3).unwrap();
        assert_eq!(revision.events()[1].kind, EventKind::Bounds);

        revision.fix(a, 7).unwrap();
        assert_eq!(revision.events()[2].kind, EventKind::Fixed);
    }

    #[test]
    fn wipeout_is_reported_not_stored() {
        let (state, _, b) = two_var_state();
        let mut revision = Revision::new(state);
        assert!(revision.intersect(b, &Domain::from_values(9, &[1, 2])).is_err());
        // The failed write never landed.
        assert_eq!(revision.domain(b).size(), 5);
    }

    #[test]
    fn unchanged_writes_record_no_event() {
        let (state, _, b) = two_var_state();
        let mut revision = Revision::new(state);
        assert!(!revision.remove_below(b, 2).unwrap());
        assert!(revision.events().is_empty());
    }
}
