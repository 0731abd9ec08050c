//! Cumulative resource scheduling with time-table filtering.
//!
//! Tasks `(start_i, duration_i, demand_i)` share a resource of fixed
//! capacity. The compulsory part of a task is the interval it occupies
//! under *every* remaining start time: `[latest_start, earliest_end)`.
//! Summing compulsory demands gives the profile; a profile overload is
//! a failure, and a start value whose execution window would push the
//! profile over capacity is filtered out.

use crate::solver::{
    domain::Domain,
    engine::VariableId,
    propagator::{describe_scope, ConstraintDescriptor, Propagator, PropagatorPriority},
    state::{EmptyDomain, Revision},
};

/// Enforces that at every time point the demands of the running tasks
/// stay within `capacity`. A task started at `s` runs over the time
/// points `s..s + duration`.
#[derive(Debug, Clone)]
pub struct Cumulative {
    starts: Vec<VariableId>,
    durations: Vec<u32>,
    demands: Vec<u32>,
    capacity: u32,
}

impl Cumulative {
    pub(crate) fn new(
        starts: Vec<VariableId>,
        durations: Vec<u32>,
        demands: Vec<u32>,
        capacity: u32,
    ) -> Self {
        Self {
            starts,
            durations,
            demands,
            capacity,
        }
    }

    /// Compulsory interval `[latest_start, earliest_end)` of task `i`,
    /// empty when the start is still too loose.
    fn compulsory(&self, revision: &Revision, i: usize) -> Option<(u32, u32)> {
        let domain = revision.domain(self.starts[i]);
        let latest_start = domain.max().expect("domains are non-empty");
        let earliest_end = domain.min().expect("domains are non-empty") + self.durations[i];
        (latest_start < earliest_end).then_some((latest_start, earliest_end))
    }
}

impl Propagator for Cumulative {
    fn variables(&self) -> &[VariableId] {
        &self.starts
    }

    fn priority(&self) -> PropagatorPriority {
        PropagatorPriority::Expensive
    }

    fn descriptor(&self) -> ConstraintDescriptor {
        ConstraintDescriptor {
            name: "Cumulative".to_string(),
            description: format!(
                "Cumulative({}; capacity {})",
                describe_scope(&self.starts),
                self.capacity
            ),
        }
    }

    fn propagate(&self, revision: &mut Revision) -> Result<(), EmptyDomain> {
        let n = self.starts.len();
        let horizon = (0..n)
            .map(|i| {
                revision.domain(self.starts[i]).max().expect("non-empty") + self.durations[i]
            })
            .max()
            .unwrap_or(0) as usize;

        // Profile of compulsory demand, indexed by time point.
        let mut profile = vec![0u64; horizon + 1];
        for i in 0..n {
            if self.demands[i] == 0 {
                continue;
            }
            if let Some((from, to)) = self.compulsory(revision, i) {
                for t in from..to {
                    profile[t as usize] += self.demands[i] as u64;
                    if profile[t as usize] > self.capacity as u64 {
                        return Err(EmptyDomain);
                    }
                }
            }
        }

        // A start value t of task i is viable when, over t..t+d, the
        // profile without i's own compulsory part leaves room for i.
        for i in 0..n {
            if self.demands[i] == 0 || self.durations[i] == 0 {
                continue;
            }
            let compulsory = self.compulsory(revision, i);
            let domain = revision.domain(self.starts[i]);
            let mut kept = Domain::empty(domain.max_value());
            for t in domain.iter() {
                let viable = (t..t + self.durations[i]).all(|u| {
                    let mut load = profile[u as usize];
                    if let Some((from, to)) = compulsory {
                        if u >= from && u < to {
                            load -= self.demands[i] as u64;
                        }
                    }
                    load + self.demands[i] as u64 <= self.capacity as u64
                });
                if viable {
                    kept.insert(t);
                }
            }
            let _ = revision.set_domain(self.starts[i], kept)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::Cumulative;
    use crate::{
        model::Model,
        solver::{propagator::Propagator, state::Revision, state::SearchState},
    };

    #[test]
    fn overload_fails() {
        let mut model = Model::new(10);
        let a = model.new_var(2, 2).unwrap();
        let b = model.new_var(2, 2).unwrap();
        let mut revision = Revision::new(SearchState::root(&model));

        // Two demand-2 tasks at the same time on a capacity-3 resource.
        assert!(
            Cumulative::new(vec![a, b], vec![3, 3], vec![2, 2], 3)
                .propagate(&mut revision)
                .is_err()
        );
    }

    #[test]
    fn compulsory_part_pushes_the_other_task_away() {
        let mut model = Model::new(10);
        let a = model.new_var(3, 3).unwrap(); // compulsory over 3..6
        let b = model.new_var(1, 8).unwrap();
        let mut revision = Revision::new(SearchState::root(&model));

        // Capacity 2, both tasks demand 2: b cannot overlap 3..6.
        Cumulative::new(vec![a, b], vec![3, 2], vec![2, 2], 2)
            .propagate(&mut revision)
            .unwrap();
        assert_eq!(
            revision.domain(b).iter().collect::<Vec<_>>(),
            vec![1, 6, 7, 8]
        );
    }

    #[test]
    fn fitting_tasks_are_left_alone() {
        let mut model = Model::new(10);
        let a = model.new_var(1, 4).unwrap();
        let b = model.new_var(1, 4).unwrap();
        let mut revision = Revision::new(SearchState::root(&model));

        Cumulative::new(vec![a, b], vec![2, 2], vec![1, 1], 2)
            .propagate(&mut revision)
            .unwrap();
        assert!(revision.events().is_empty());
    }
}
