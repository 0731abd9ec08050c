//! The circuit constraint: successor variables forming one Hamiltonian
//! cycle.
//!
//! The distinctness of successors is handled by a companion
//! [`AllDifferent`](super::all_different::AllDifferent) posted over the
//! same scope; this propagator contributes the parts specific to
//! circuits: successors stay inside `1..=n`, nobody succeeds itself,
//! chains of already-fixed successors may not close early (sub-tour
//! elimination), and a closed cycle shorter than `n` is a failure.

use crate::solver::{
    engine::VariableId,
    propagator::{describe_scope, ConstraintDescriptor, Propagator},
    state::{EmptyDomain, Revision},
};

/// Enforces that `successors[i] = j` edges form a single cycle visiting
/// every node exactly once. Values are 1-based node indices.
#[derive(Debug, Clone)]
pub struct Circuit {
    successors: Vec<VariableId>,
}

impl Circuit {
    pub(crate) fn new(successors: Vec<VariableId>) -> Self {
        Self { successors }
    }
}

impl Propagator for Circuit {
    fn variables(&self) -> &[VariableId] {
        &self.successors
    }

    fn descriptor(&self) -> ConstraintDescriptor {
        ConstraintDescriptor {
            name: "Circuit".to_string(),
            description: format!("Circuit({})", describe_scope(&self.successors)),
        }
    }

    fn propagate(&self, revision: &mut Revision) -> Result<(), EmptyDomain> {
        let n = self.successors.len();

        for (i, &var) in self.successors.iter().enumerate() {
            let _ = revision.remove_above(var, n as u32)?;
            let _ = revision.remove_value(var, i as u32 + 1)?;
        }

        // Fixed successor edges as a partial function.
        let mut next: Vec<Option<usize>> = vec![None; n];
        let mut pointed_to = vec![false; n];
        for (i, &var) in self.successors.iter().enumerate() {
            let domain = revision.domain(var);
            if domain.is_singleton() {
                let target = (domain.singleton_value() - 1) as usize;
                next[i] = Some(target);
                pointed_to[target] = true;
            }
        }

        // Walk each maximal chain of fixed edges. A chain head -> ... ->
        // tail covering fewer than n nodes must not close back onto its
        // head.
        let mut visited = vec![false; n];
        for head in 0..n {
            if pointed_to[head] {
                continue;
            }
            let mut length = 1usize;
            let mut tail = head;
            visited[head] = true;
            while let Some(target) = next[tail] {
                if visited[target] {
                    // Two fixed edges point at the same node; the
                    // companion all-different fails this state.
                    break;
                }
                tail = target;
                visited[tail] = true;
                length += 1;
            }
            if length < n && tail != head {
                let _ = revision.remove_value(self.successors[tail], head as u32 + 1)?;
            }
        }

        // Whatever fixed edges remain unvisited form closed cycles. Any
        // cycle shorter than n is a dead end.
        for start in 0..n {
            if visited[start] || next[start].is_none() {
                continue;
            }
            let mut length = 0usize;
            let mut node = start;
            loop {
                visited[node] = true;
                length += 1;
                node = next[node].ok_or(EmptyDomain)?;
                if node == start {
                    break;
                }
                if visited[node] {
                    // Merging fixed edges: two successors share a target.
                    return Err(EmptyDomain);
                }
            }
            if length < n {
                return Err(EmptyDomain);
            }
        }
        Ok(())
    }
}
