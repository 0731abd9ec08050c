//! Positive table (extensional) constraints.

use crate::solver::{
    domain::Domain,
    engine::VariableId,
    propagator::{describe_scope, ConstraintDescriptor, Propagator},
    state::{EmptyDomain, Revision},
};

/// Enforces that the tuple of scope variables equals one of the rows.
///
/// A row is live while every entry is still admissible; each variable
/// keeps the union of its column over the live rows.
#[derive(Debug, Clone)]
pub struct Table {
    vars: Vec<VariableId>,
    rows: Vec<Vec<u32>>,
}

impl Table {
    pub(crate) fn new(vars: Vec<VariableId>, rows: Vec<Vec<u32>>) -> Self {
        Self { vars, rows }
    }
}

impl Propagator for Table {
    fn variables(&self) -> &[VariableId] {
        &self.vars
    }

    fn descriptor(&self) -> ConstraintDescriptor {
        ConstraintDescriptor {
            name: "Table".to_string(),
            description: format!(
                "({}) in {} rows",
                describe_scope(&self.vars),
                self.rows.len()
            ),
        }
    }

    fn propagate(&self, revision: &mut Revision) -> Result<(), EmptyDomain> {
        let width = self.vars.len();
        let max_value = revision.domain(self.vars[0]).max_value();

        let mut columns: Vec<Domain> = vec![Domain::empty(max_value); width];
        let mut any_live = false;
        for row in &self.rows {
            let live = row
                .iter()
                .zip(&self.vars)
                .all(|(&value, &var)| revision.domain(var).has(value));
            if live {
                any_live = true;
                for (column, &value) in columns.iter_mut().zip(row) {
                    column.insert(value);
                }
            }
        }
        if !any_live {
            return Err(EmptyDomain);
        }

        for (column, &var) in columns.iter().zip(&self.vars) {
            let _ = revision.intersect(var, column)?;
        }
        Ok(())
    }
}
