//! Global cardinality: per-value occurrence bounds.
//!
//! The upper bounds are filtered the way all-different is, on the flow
//! residual: a variable-saturating assignment under the per-value
//! capacities plays the role of the matching, values with spare
//! capacity play the role of free values, and an edge outside every
//! maximum assignment (not in an SCC of the residual, not reachable
//! from spare capacity) is removed. The lower bounds are enforced by
//! counting: a value whose possible takers are exactly its minimum
//! claims all of them, and a value that can no longer reach its minimum
//! is a failure.

use crate::solver::{
    engine::VariableId,
    propagator::{describe_scope, ConstraintDescriptor, Propagator, PropagatorPriority},
    propagators::matching::tarjan_scc,
    state::{EmptyDomain, Revision},
};

/// Enforces that each listed value `v` is taken by a number of scope
/// variables within `min_occurrences[v]..=max_occurrences[v]`. Values
/// outside the list are unconstrained.
#[derive(Debug, Clone)]
pub struct GlobalCardinality {
    vars: Vec<VariableId>,
    values: Vec<u32>,
    min_occurrences: Vec<u32>,
    max_occurrences: Vec<u32>,
}

impl GlobalCardinality {
    pub(crate) fn new(
        vars: Vec<VariableId>,
        values: Vec<u32>,
        min_occurrences: Vec<u32>,
        max_occurrences: Vec<u32>,
    ) -> Self {
        Self {
            vars,
            values,
            min_occurrences,
            max_occurrences,
        }
    }
}

/// A variable-saturating assignment respecting per-value capacities,
/// found by augmenting paths (Kuhn generalized to capacities).
struct CapacitatedAssignment {
    value_of: Vec<Option<usize>>,
    takers: Vec<Vec<usize>>,
    size: usize,
}

fn capacitated_assignment(
    domains: &[Vec<usize>],
    capacities: &[usize],
) -> CapacitatedAssignment {
    let n = domains.len();
    let num_values = capacities.len();
    let mut value_of: Vec<Option<usize>> = vec![None; n];
    let mut takers: Vec<Vec<usize>> = vec![Vec::new(); num_values];
    let mut size = 0usize;

    for (x, candidates) in domains.iter().enumerate() {
        for &v in candidates {
            if takers[v].len() < capacities[v] {
                value_of[x] = Some(v);
                takers[v].push(x);
                size += 1;
                break;
            }
        }
    }
    for x in 0..n {
        if value_of[x].is_none() {
            let mut visited = vec![false; num_values];
            if augment(x, domains, capacities, &mut value_of, &mut takers, &mut visited) {
                size += 1;
            }
        }
    }

    CapacitatedAssignment {
        value_of,
        takers,
        size,
    }
}

fn augment(
    x: usize,
    domains: &[Vec<usize>],
    capacities: &[usize],
    value_of: &mut Vec<Option<usize>>,
    takers: &mut Vec<Vec<usize>>,
    visited: &mut Vec<bool>,
) -> bool {
    for &v in &domains[x] {
        if visited[v] {
            continue;
        }
        visited[v] = true;
        if takers[v].len() < capacities[v] {
            value_of[x] = Some(v);
            takers[v].push(x);
            return true;
        }
        let holders = takers[v].clone();
        for holder in holders {
            if augment(holder, domains, capacities, value_of, takers, visited) {
                takers[v].retain(|&taken| taken != holder);
                value_of[x] = Some(v);
                takers[v].push(x);
                return true;
            }
        }
    }
    false
}

impl Propagator for GlobalCardinality {
    fn variables(&self) -> &[VariableId] {
        &self.vars
    }

    fn priority(&self) -> PropagatorPriority {
        PropagatorPriority::Expensive
    }

    fn descriptor(&self) -> ConstraintDescriptor {
        ConstraintDescriptor {
            name: "GlobalCardinality".to_string(),
            description: format!("Gcc({})", describe_scope(&self.vars)),
        }
    }

    fn propagate(&self, revision: &mut Revision) -> Result<(), EmptyDomain> {
        let n = self.vars.len();

        // Lower bounds by counting.
        for (k, &value) in self.values.iter().enumerate() {
            let assigned = self
                .vars
                .iter()
                .filter(|&&var| {
                    let domain = revision.domain(var);
                    domain.is_singleton() && domain.singleton_value() == value
                })
                .count() as u32;
            let possible = self
                .vars
                .iter()
                .filter(|&&var| revision.domain(var).has(value))
                .count() as u32;

            if assigned > self.max_occurrences[k] || possible < self.min_occurrences[k] {
                return Err(EmptyDomain);
            }
            if possible == self.min_occurrences[k] && possible > assigned {
                // Every potential taker is needed.
                for &var in &self.vars {
                    if revision.domain(var).has(value) {
                        let _ = revision.fix(var, value)?;
                    }
                }
            }
        }
        let total_minimum: u64 = self.min_occurrences.iter().map(|&m| m as u64).sum();
        if total_minimum > n as u64 {
            return Err(EmptyDomain);
        }

        // Upper bounds by residual analysis. Compact the live values;
        // unlisted ones get capacity n.
        let max_value = revision.domain(self.vars[0]).max_value();
        let mut listed_cap = vec![usize::MAX; max_value as usize + 1];
        for (k, &value) in self.values.iter().enumerate() {
            listed_cap[value as usize] = self.max_occurrences[k] as usize;
        }
        let mut value_index = vec![usize::MAX; max_value as usize + 1];
        let mut values: Vec<u32> = Vec::new();
        let mut capacities: Vec<usize> = Vec::new();
        let mut domains: Vec<Vec<usize>> = Vec::with_capacity(n);
        for &var in &self.vars {
            let mut candidates = Vec::with_capacity(revision.domain(var).size());
            for value in revision.domain(var).iter() {
                let slot = &mut value_index[value as usize];
                if *slot == usize::MAX {
                    *slot = values.len();
                    values.push(value);
                    let cap = listed_cap[value as usize];
                    capacities.push(if cap == usize::MAX { n } else { cap });
                }
                candidates.push(*slot);
            }
            domains.push(candidates);
        }
        let num_values = values.len();

        let assignment = capacitated_assignment(&domains, &capacities);
        if assignment.size < n {
            return Err(EmptyDomain);
        }

        // Residual digraph as in all-different, with one twist: a value
        // with spare capacity is "free".
        let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); n + num_values];
        for (x, candidates) in domains.iter().enumerate() {
            for &v in candidates {
                if assignment.value_of[x] == Some(v) {
                    adjacency[x].push(n + v);
                } else {
                    adjacency[n + v].push(x);
                }
            }
        }
        let component = tarjan_scc(&adjacency);

        let mut reachable = vec![false; n + num_values];
        let mut queue: Vec<usize> = (0..num_values)
            .filter(|&v| assignment.takers[v].len() < capacities[v])
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

        for (x, candidates) in domains.iter().enumerate() {
            let mut pruned = revision.domain(self.vars[x]).clone();
            let mut changed = false;
            for &v in candidates {
                if assignment.value_of[x] == Some(v) {
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

    use super::GlobalCardinality;
    use crate::{
        model::Model,
        solver::{propagator::Propagator, state::Revision, state::SearchState},
    };

    fn three_vars() -> (Revision, Vec<u32>) {
        let mut model = Model::new(3);
        let vars: Vec<u32> = (0..3).map(|_| model.new_var(1, 3).unwrap()).collect();
        (Revision::new(SearchState::root(&model)), vars)
    }

    #[test]
    fn saturated_value_is_withdrawn_from_the_rest() {
        let (mut revision, vars) = three_vars();
        revision.fix(vars[0], 1).unwrap();

        // Value 1 occurs at most once.
        GlobalCardinality::new(vars.clone(), vec![1], vec![0], vec![1])
            .propagate(&mut revision)
            .unwrap();
        assert!(!revision.domain(vars[1]).has(1));
        assert!(!revision.domain(vars[2]).has(1));
    }

    #[test]
    fn scarce_value_claims_its_takers() {
        let (mut revision, vars) = three_vars();
        revision.remove_value(vars[1], 2).unwrap();
        revision.remove_value(vars[2], 2).unwrap();

        // Value 2 must occur at least once and only vars[0] can take it.
        GlobalCardinality::new(vars.clone(), vec![2], vec![1], vec![3])
            .propagate(&mut revision)
            .unwrap();
        assert_eq!(revision.domain(vars[0]).singleton_value(), 2);
    }

    #[test]
    fn impossible_minimum_fails() {
        let (mut revision, vars) = three_vars();
        assert!(
            GlobalCardinality::new(vars, vec![1, 2], vec![2, 2], vec![3, 3])
                .propagate(&mut revision)
                .is_err()
        );
    }

    #[test]
    fn capacity_squeeze_prunes_like_all_different() {
        // Two vars over {1,2}, one var over {1,2,3}; values 1 and 2 capped
        // at one occurrence each: the wide variable must take 3.
        let (mut revision, vars) = three_vars();
        revision.remove_value(vars[0], 3).unwrap();
        revision.remove_value(vars[1], 3).unwrap();

        GlobalCardinality::new(vars.clone(), vec![1, 2], vec![0, 0], vec![1, 1])
            .propagate(&mut revision)
            .unwrap();
        assert_eq!(revision.domain(vars[2]).singleton_value(), 3);
    }
}
