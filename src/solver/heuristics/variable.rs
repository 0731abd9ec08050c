//! Standard heuristics for selecting which variable to branch on next.

use crate::{
    model::Model,
    solver::{engine::VariableId, state::SearchState},
};

/// A trait for variable-selection heuristics.
///
/// Implementors choose which unassigned variable the solver branches on
/// next. A good choice can shrink the search tree by orders of
/// magnitude. Selection must be deterministic for a given state unless
/// the heuristic is explicitly randomized.
pub trait VariableSelect: Send + Sync {
    /// Selects the next variable to branch on, or `None` when every
    /// variable is already fixed.
    fn select(&self, model: &Model, state: &SearchState) -> Option<VariableId>;
}

/// Selects the first unassigned variable in declaration order.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputOrder;

impl VariableSelect for InputOrder {
    fn select(&self, model: &Model, state: &SearchState) -> Option<VariableId> {
        (0..model.num_variables() as VariableId).find(|&var| state.domain(var).size() > 1)
    }
}

/// First-fail: the unassigned variable with the smallest domain, ties
/// broken by the lower id. Tackling the most constrained variable first
/// keeps failures close to the root.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstFail;

impl VariableSelect for FirstFail {
    fn select(&self, model: &Model, state: &SearchState) -> Option<VariableId> {
        (0..model.num_variables() as VariableId)
            .filter(|&var| state.domain(var).size() > 1)
            .min_by_key(|&var| (state.domain(var).size(), var))
    }
}

/// Minimizes the ratio domain-size / degree, where the degree is the
/// number of propagators watching the variable. Compared without
/// floating point: `size_a / deg_a < size_b / deg_b` iff
/// `size_a * deg_b < size_b * deg_a`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DomDeg;

impl VariableSelect for DomDeg {
    fn select(&self, model: &Model, state: &SearchState) -> Option<VariableId> {
        (0..model.num_variables() as VariableId)
            .filter(|&var| state.domain(var).size() > 1)
            .min_by(|&a, &b| {
                let (size_a, size_b) = (state.domain(a).size() as u64, state.domain(b).size() as u64);
                let deg_a = model.degree(a).max(1) as u64;
                let deg_b = model.degree(b).max(1) as u64;
                (size_a * deg_b, a).cmp(&(size_b * deg_a, b))
            })
    }
}

/// Selects an unassigned variable at random. Mostly useful to
/// diversify portfolio runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomVariable;

impl VariableSelect for RandomVariable {
    fn select(&self, model: &Model, state: &SearchState) -> Option<VariableId> {
        use rand::seq::IteratorRandom;

        (0..model.num_variables() as VariableId)
            .filter(|&var| state.domain(var).size() > 1)
            .choose(&mut rand::thread_rng())
    }
}

#[cfg(test)]
mod tests {
    use super::{DomDeg, FirstFail, InputOrder, VariableSelect};
    use crate::{
        model::{Model, Relation},
        solver::state::SearchState,
    };

    fn model() -> (Model, [u32; 3]) {
        let mut model = Model::new(9);
        let a = model.new_var(1, 9).unwrap();
        let b = model.new_var(1, 3).unwrap();
        let c = model.new_var(1, 5).unwrap();
        model.inequality(a, Relation::NotEqual, c).unwrap();
        model.inequality(b, Relation::NotEqual, c).unwrap();
        (model, [a, b, c])
    }

    #[test]
    fn input_order_takes_the_lowest_id() {
        let (model, [a, _, _]) = model();
        let state = SearchState::root(&model);
        assert_eq!(InputOrder.select(&model, &state), Some(a));
    }

    #[test]
    fn first_fail_takes_the_tightest_domain() {
        let (model, [_, b, _]) = model();
        let state = SearchState::root(&model);
        assert_eq!(FirstFail.select(&model, &state), Some(b));
    }

    #[test]
    fn dom_deg_weights_size_by_degree() {
        // b: 3 values / 1 propagator; c: 5 values / 2 propagators.
        // 3*2 > 5*1, so c wins despite the larger domain.
        let (model, [_, _, c]) = model();
        let state = SearchState::root(&model);
        assert_eq!(DomDeg.select(&model, &state), Some(c));
    }
}
