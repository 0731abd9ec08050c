//! Domain-consistent all-different filtering (Regin's algorithm).
//!
//! The constraint is a bipartite graph between variables and values. A
//! value is supportable for a variable exactly when the corresponding
//! edge belongs to *some* maximum matching, which is the case when the
//! edge is matched, lies on an alternating cycle, or lies on an even
//! alternating path starting at a free value. Orienting matched edges
//! variable -> value and unmatched edges value -> variable turns
//! alternating cycles into strongly connected components and the
//! alternating paths into plain reachability from the free values, so
//! one matching, one SCC pass and one sweep from the free values decide
//! every edge at once.

use crate::solver::{
    engine::VariableId,
    propagator::{describe_scope, ConstraintDescriptor, Propagator, PropagatorPriority},
    propagators::matching::{maximum_matching, tarjan_scc},
    state::{EmptyDomain, Revision},
};

/// Enforces that all variables in the scope take pairwise distinct
/// values. Filtering is domain-consistent.
#[derive(Debug, Clone)]
pub struct AllDifferent {
    vars: Vec<VariableId>,
}

impl AllDifferent {
    pub(crate) fn new(vars: Vec<VariableId>) -> Self {
        Self { vars }
    }
}

impl Propagator for AllDifferent {
    fn variables(&self) -> &[VariableId] {
        &self.vars
    }

    fn priority(&self) -> PropagatorPriority {
        PropagatorPriority::Expensive
    }

    fn descriptor(&self) -> ConstraintDescriptor {
        ConstraintDescriptor {
            name: "AllDifferent".to_string(),
            description: format!("AllDifferent({})", describe_scope(&self.vars)),
        }
    }

    fn propagate(&self, revision: &mut Revision) -> Result<(), EmptyDomain> {
        let n = self.vars.len();

        // Compact the values present in any domain to dense indices.
        let max_value = revision.domain(self.vars[0]).max_value();
        let mut value_index = vec![usize::MAX; max_value as usize + 1];
        let mut values: Vec<u32> = Vec::new();
        let mut domains: Vec<Vec<usize>> = Vec::with_capacity(n);
        for &var in &self.vars {
            let mut candidates = Vec::with_capacity(revision.domain(var).size());
            for value in revision.domain(var).iter() {
                let slot = &mut value_index[value as usize];
                if *slot == usize::MAX {
                    *slot = values.len();
                    values.push(value);
                }
                candidates.push(*slot);
            }
            domains.push(candidates);
        }
        let num_values = values.len();

        let matching = maximum_matching(&domains, num_values);
        if matching.size < n {
            return Err(EmptyDomain);
        }

        // Residual digraph. Nodes 0..n are variables, n.. are values.
        // Matched edges run variable -> value, unmatched value -> variable.
        let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); n + num_values];
        for (x, candidates) in domains.iter().enumerate() {
            for &v in candidates {
                if matching.value_of[x] == Some(v) {
                    adjacency[x].push(n + v);
                } else {
                    adjacency[n + v].push(x);
                }
            }
        }
        let component = tarjan_scc(&adjacency);

        // Every node reachable from a free (unmatched) value.
        let mut reachable = vec![false; n + num_values];
        let mut queue: Vec<usize> = (0..num_values)
            .filter(|&v| matching.variable_of[v].is_none())
            .map(|v| n + v)
            .collect();
        for &node in &queue {
            reachable[node] = true;
        }
        while let Some(node) = queue.pop() {
            for &next in &adjacency[node] {
                if !reachable[next] {
                    reachable[next] = true;
                    queue.push(next);
                }
            }
        }

        // An unmatched edge survives only inside its SCC or on a path
        // from a free value.
        for (x, candidates) in domains.iter().enumerate() {
            let mut pruned = revision.domain(self.vars[x]).clone();
            let mut changed = false;
            for &v in candidates {
                if matching.value_of[x] == Some(v) {
                    continue;
                }
                if component[x] != component[n + v] && !reachable[n + v] {
                    let (next, removed) = pruned.remove_value(values[v]);
                    pruned = next;
                    changed |= removed;
                }
            }
            if changed {
                let _ = revision.set_domain(self.vars[x], pruned)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::AllDifferent;
    use crate::{
        model::Model,
        solver::{propagator::Propagator, state::Revision, state::SearchState},
    };

    #[test]
    fn hall_set_prunes_the_outsider() {
        // x, y over {1,2} lock those values, so z loses them.
        let mut model = Model::new(3);
        let x = model.new_var(1, 2).unwrap();
        let y = model.new_var(1, 2).unwrap();
        let z = model.new_var(1, 3).unwrap();
        let mut revision = Revision::new(SearchState::root(&model));

        AllDifferent::new(vec![x, y, z])
            .propagate(&mut revision)
            .unwrap();
        assert_eq!(revision.domain(z).singleton_value(), 3);
        assert_eq!(revision.domain(x).size(), 2);
    }

    #[test]
    fn deficiency_wipes_out() {
        let mut model = Model::new(3);
        let x = model.new_var(1, 2).unwrap();
        let y = model.new_var(1, 2).unwrap();
        let z = model.new_var(1, 2).unwrap();
        let mut revision = Revision::new(SearchState::root(&model));

        assert!(AllDifferent::new(vec![x, y, z])
            .propagate(&mut revision)
            .is_err());
    }

    #[test]
    fn free_values_keep_alternating_paths_alive() {
        // One variable, two values: both must survive.
        let mut model = Model::new(5);
        let x = model.new_var(1, 2).unwrap();
        let y = model.new_var(1, 3).unwrap();
        let mut revision = Revision::new(SearchState::root(&model));

        AllDifferent::new(vec![x, y]).propagate(&mut revision).unwrap();
        assert_eq!(revision.domain(x).size(), 2);
        assert_eq!(revision.domain(y).size(), 3);
    }

    #[test]
    fn already_at_fixpoint_changes_nothing() {
        let mut model = Model::new(4);
        let x = model.new_var(1, 4).unwrap();
        let y = model.new_var(1, 4).unwrap();
        let mut revision = Revision::new(SearchState::root(&model));

        let propagator = AllDifferent::new(vec![x, y]);
        propagator.propagate(&mut revision).unwrap();
        assert!(revision.events().is_empty());
        propagator.propagate(&mut revision).unwrap();
        assert!(revision.events().is_empty());
    }
}
