//! The regular-language membership constraint.
//!
//! The word spelled by the sequence variables must be accepted by a
//! DFA. Filtering works on the layered graph with a node per
//! (position, state): a forward pass keeps the states reachable from
//! the start, a backward pass keeps the states that still reach an
//! accepting state, and each variable keeps exactly the labels carried
//! by a surviving edge out of its layer.

use crate::solver::{
    domain::Domain,
    engine::VariableId,
    propagator::{describe_scope, ConstraintDescriptor, Propagator, PropagatorPriority},
    state::{EmptyDomain, Revision},
};

/// A deterministic finite automaton over FD values.
///
/// States are `0..states`; `transitions` holds `(from, label, to)`
/// triples, at most one per `(from, label)` pair.
#[derive(Debug, Clone)]
pub struct Dfa {
    pub states: usize,
    pub transitions: Vec<(usize, u32, usize)>,
    pub start: usize,
    pub accepting: Vec<usize>,
}

/// Enforces that the sequence of variables spells a word of the DFA's
/// language.
#[derive(Debug, Clone)]
pub struct Regular {
    vars: Vec<VariableId>,
    /// `delta[state][label - 1]`, dense over the model's value range.
    delta: Vec<Vec<Option<usize>>>,
    start: usize,
    accepting: Vec<bool>,
}

impl Regular {
    /// `dfa` must already be validated (in-range states and labels).
    pub(crate) fn new(vars: Vec<VariableId>, dfa: &Dfa, max_value: u32) -> Self {
        let mut delta = vec![vec![None; max_value as usize]; dfa.states];
        for &(from, label, to) in &dfa.transitions {
            delta[from][label as usize - 1] = Some(to);
        }
        let mut accepting = vec![false; dfa.states];
        for &state in &dfa.accepting {
            accepting[state] = true;
        }
        Self {
            vars,
            delta,
            start: dfa.start,
            accepting,
        }
    }
}

impl Propagator for Regular {
    fn variables(&self) -> &[VariableId] {
        &self.vars
    }

    fn priority(&self) -> PropagatorPriority {
        PropagatorPriority::Expensive
    }

    fn descriptor(&self) -> ConstraintDescriptor {
        ConstraintDescriptor {
            name: "Regular".to_string(),
            description: format!("Regular({})", describe_scope(&self.vars)),
        }
    }

    fn propagate(&self, revision: &mut Revision) -> Result<(), EmptyDomain> {
        let n = self.vars.len();
        let states = self.delta.len();

        // Forward: states reachable at each layer from the start.
        let mut forward = vec![vec![false; states]; n + 1];
        forward[0][self.start] = true;
        for i in 0..n {
            for state in 0..states {
                if !forward[i][state] {
                    continue;
                }
                for label in revision.domain(self.vars[i]).iter() {
                    if let Some(next) = self.delta[state][label as usize - 1] {
                        forward[i + 1][next] = true;
                    }
                }
            }
        }

        // Backward: states that still reach an accepting state at layer n.
        let mut backward = vec![vec![false; states]; n + 1];
        for state in 0..states {
            backward[n][state] = self.accepting[state];
        }
        for i in (0..n).rev() {
            for state in 0..states {
                for label in revision.domain(self.vars[i]).iter() {
                    if let Some(next) = self.delta[state][label as usize - 1] {
                        if backward[i + 1][next] {
                            backward[i][state] = true;
                            break;
                        }
                    }
                }
            }
        }

        // A label survives at layer i when some live state carries it to
        // a live state.
        for i in 0..n {
            let max_value = revision.domain(self.vars[i]).max_value();
            let mut allowed = Domain::empty(max_value);
            for label in revision.domain(self.vars[i]).iter() {
                let supported = (0..states).any(|state| {
                    forward[i][state]
                        && self.delta[state][label as usize - 1]
                            .is_some_and(|next| backward[i + 1][next])
                });
                if supported {
                    allowed.insert(label);
                }
            }
            let _ = revision.intersect(self.vars[i], &allowed)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{Dfa, Regular};
    use crate::{
        model::Model,
        solver::{propagator::Propagator, state::Revision, state::SearchState},
    };

    /// Words over {1=A, 2=B} that end in A.
    fn ends_with_a() -> Dfa {
        Dfa {
            states: 2,
            transitions: vec![(0, 1, 1), (0, 2, 0), (1, 1, 1), (1, 2, 0)],
            start: 0,
            accepting: vec![1],
        }
    }

    #[test]
    fn last_position_is_forced_to_a() {
        let mut model = Model::new(2);
        let vars: Vec<u32> = (0..3).map(|_| model.new_var(1, 2).unwrap()).collect();
        let mut revision = Revision::new(SearchState::root(&model));

        Regular::new(vars.clone(), &ends_with_a(), 2)
            .propagate(&mut revision)
            .unwrap();
        assert_eq!(revision.domain(vars[2]).singleton_value(), 1);
        assert_eq!(revision.domain(vars[0]).size(), 2);
        assert_eq!(revision.domain(vars[1]).size(), 2);
    }

    #[test]
    fn dead_prefix_wipes_out() {
        // Language: exactly the word AA.
        let dfa = Dfa {
            states: 3,
            transitions: vec![(0, 1, 1), (1, 1, 2)],
            start: 0,
            accepting: vec![2],
        };
        let mut model = Model::new(2);
        let vars: Vec<u32> = (0..2).map(|_| model.new_var(1, 2).unwrap()).collect();
        let mut revision = Revision::new(SearchState::root(&model));
        revision.fix(vars[0], 2).unwrap();

        assert!(Regular::new(vars, &dfa, 2).propagate(&mut revision).is_err());
    }
}
