//! The offset channel `y = x + k`.

use crate::solver::{
    engine::VariableId,
    propagator::{ConstraintDescriptor, Propagator, PropagatorPriority},
    state::{EmptyDomain, Revision},
};

/// Enforces `y = x + offset` (offset may be negative).
///
/// Filtering is exact: each side is intersected with the shifted image
/// of the other, so holes propagate as well as bounds.
#[derive(Debug, Clone)]
pub struct Arithmetic {
    vars: [VariableId; 2],
    offset: i64,
}

impl Arithmetic {
    pub(crate) fn new(x: VariableId, offset: i64, y: VariableId) -> Self {
        Self {
            vars: [x, y],
            offset,
        }
    }
}

impl Propagator for Arithmetic {
    fn variables(&self) -> &[VariableId] {
        &self.vars
    }

    fn priority(&self) -> PropagatorPriority {
        PropagatorPriority::Cheap
    }

    fn descriptor(&self) -> ConstraintDescriptor {
        ConstraintDescriptor {
            name: "Arithmetic".to_string(),
            description: format!("?{} = ?{} + {}", self.vars[1], self.vars[0], self.offset),
        }
    }

    fn propagate(&self, revision: &mut Revision) -> Result<(), EmptyDomain> {
        let [x, y] = self.vars;
        let image = revision.domain(x).shift(self.offset);
        let _ = revision.intersect(y, &image)?;
        let preimage = revision.domain(y).shift(-self.offset);
        let _ = revision.intersect(x, &preimage)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::Arithmetic;
    use crate::{
        model::Model,
        solver::{propagator::Propagator, state::Revision, state::SearchState},
    };

    #[test]
    fn channels_holes_in_both_directions() {
        let mut model = Model::new(12);
        let x = model.new_var_from_values(&[1, 4, 7]).unwrap();
        let y = model.new_var(5, 12).unwrap();
        let mut revision = Revision::new(SearchState::root(&model));

        Arithmetic::new(x, 3, y).propagate(&mut revision).unwrap();
        assert_eq!(revision.domain(y).iter().collect::<Vec<_>>(), vec![7, 10]);
        assert_eq!(revision.domain(x).iter().collect::<Vec<_>>(), vec![4, 7]);
    }

    #[test]
    fn offset_outside_the_value_space_fails() {
        let mut model = Model::new(5);
        let x = model.new_var(1, 2).unwrap();
        let y = model.new_var(1, 2).unwrap();
        let mut revision = Revision::new(SearchState::root(&model));
        assert!(Arithmetic::new(x, 4, y).propagate(&mut revision).is_err());
    }
}
