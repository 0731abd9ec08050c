//! Counting membership in a value set: `Among` and its single-value
//! special case `Count`.

use crate::solver::{
    domain::Domain,
    engine::VariableId,
    propagator::{describe_scope, ConstraintDescriptor, Propagator},
    state::{EmptyDomain, Revision},
};

/// Enforces that the number of scope variables taking a value inside
/// the set equals the count variable.
///
/// The count variable uses the shifted encoding shared with booleans:
/// value `k` stands for a count of `k - 1`, so a count variable over
/// `{1..=n+1}` covers the counts `0..=n`.
#[derive(Debug, Clone)]
pub struct Among {
    vars: Vec<VariableId>,
    set: Domain,
    outside: Domain,
    count: VariableId,
    scope: Vec<VariableId>,
    kind: &'static str,
}

impl Among {
    pub(crate) fn new(vars: Vec<VariableId>, set: Domain, count: VariableId) -> Self {
        Self::with_kind(vars, set, count, "Among")
    }

    /// `Count` is `Among` over a single-value set.
    pub(crate) fn count(vars: Vec<VariableId>, value: u32, max_value: u32, count: VariableId) -> Self {
        Self::with_kind(
            vars,
            Domain::singleton(max_value, value),
            count,
            "Count",
        )
    }

    fn with_kind(
        vars: Vec<VariableId>,
        set: Domain,
        count: VariableId,
        kind: &'static str,
    ) -> Self {
        let mut scope = vars.clone();
        scope.push(count);
        let outside = set.complement();
        Self {
            vars,
            set,
            outside,
            count,
            scope,
            kind,
        }
    }
}

impl Propagator for Among {
    fn variables(&self) -> &[VariableId] {
        &self.scope
    }

    fn descriptor(&self) -> ConstraintDescriptor {
        ConstraintDescriptor {
            name: self.kind.to_string(),
            description: format!(
                "{}({}) = ?{} - 1",
                self.kind,
                describe_scope(&self.vars),
                self.count
            ),
        }
    }

    fn propagate(&self, revision: &mut Revision) -> Result<(), EmptyDomain> {
        let mut must = 0i64; // domains entirely inside the set
        let mut may = 0i64; // domains intersecting the set
        for &var in &self.vars {
            let domain = revision.domain(var);
            if domain.is_subset_of(&self.set) {
                must += 1;
                may += 1;
            } else if !domain.is_subset_of(&self.outside) {
                may += 1;
            }
        }

        // Shifted encoding: count value = membership count + 1.
        let _ = revision.restrict_bounds(self.count, must + 1, may + 1)?;

        let count_min = revision.domain(self.count).min().expect("non-empty") as i64 - 1;
        let count_max = revision.domain(self.count).max().expect("non-empty") as i64 - 1;

        if count_max == must {
            // Undecided variables must stay out of the set.
            for &var in &self.vars {
                if !revision.domain(var).is_subset_of(&self.set) {
                    let _ = revision.intersect(var, &self.outside)?;
                }
            }
        } else if count_min == may {
            // Undecided variables are all needed inside the set.
            for &var in &self.vars {
                if !revision.domain(var).is_subset_of(&self.outside) {
                    let _ = revision.intersect(var, &self.set)?;
                }
            }
        }
        Ok(())
    }
}
