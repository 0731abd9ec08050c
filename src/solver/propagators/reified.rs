//! Reified equality against a constant: `b <==> (x == v)`.

use crate::solver::{
    engine::VariableId,
    propagator::{ConstraintDescriptor, Propagator, PropagatorPriority},
    state::{EmptyDomain, Revision},
};

const FALSE: u32 = 1;
const TRUE: u32 = 2;

/// Links a shifted boolean `b` to the outcome of `x == value`.
///
/// A fixed `b` assigns or excludes the value; conversely the value's
/// availability in `dom(x)` decides `b`.
#[derive(Debug, Clone)]
pub struct ReifiedEqual {
    vars: [VariableId; 2],
    value: u32,
}

impl ReifiedEqual {
    pub(crate) fn new(b: VariableId, x: VariableId, value: u32) -> Self {
        Self {
            vars: [b, x],
            value,
        }
    }
}

impl Propagator for ReifiedEqual {
    fn variables(&self) -> &[VariableId] {
        &self.vars
    }

    fn priority(&self) -> PropagatorPriority {
        PropagatorPriority::Cheap
    }

    fn descriptor(&self) -> ConstraintDescriptor {
        ConstraintDescriptor {
            name: "ReifiedEqual".to_string(),
            description: format!("?{} <==> (?{} == {})", self.vars[0], self.vars[1], self.value),
        }
    }

    fn propagate(&self, revision: &mut Revision) -> Result<(), EmptyDomain> {
        let [b, x] = self.vars;

        // b -> x
        if revision.domain(b).is_singleton() {
            if revision.domain(b).singleton_value() == TRUE {
                let _ = revision.fix(x, self.value)?;
            } else {
                let _ = revision.remove_value(x, self.value)?;
            }
        }

        // x -> b
        if !revision.domain(x).has(self.value) {
            let _ = revision.remove_value(b, TRUE)?;
        } else if revision.domain(x).is_singleton() {
            let _ = revision.remove_value(b, FALSE)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::ReifiedEqual;
    use crate::{
        model::Model,
        solver::{propagator::Propagator, state::Revision, state::SearchState},
    };

    fn setup() -> (Revision, u32, u32) {
        let mut model = Model::new(9);
        let b = model.new_bool().unwrap();
        let x = model.new_var(1, 5).unwrap();
        (Revision::new(SearchState::root(&model)), b, x)
    }

    #[test]
    fn fixed_true_assigns_the_value() {
        let (mut revision, b, x) = setup();
        revision.fix(b, 2).unwrap();
        ReifiedEqual::new(b, x, 4).propagate(&mut revision).unwrap();
        assert_eq!(revision.domain(x).singleton_value(), 4);
    }

    #[test]
    fn fixed_false_excludes_the_value() {
        let (mut revision, b, x) = setup();
        revision.fix(b, 1).unwrap();
        ReifiedEqual::new(b, x, 4).propagate(&mut revision).unwrap();
        assert!(!revision.domain(x).has(4));
        assert_eq!(revision.domain(x).size(), 4);
    }

    #[test]
    fn unavailable_value_settles_b_to_false() {
        let (mut revision, b, x) = setup();
        revision.remove_value(x, 4).unwrap();
        ReifiedEqual::new(b, x, 4).propagate(&mut revision).unwrap();
        assert_eq!(revision.domain(b).singleton_value(), 1);
    }

    #[test]
    fn assignment_settles_b_to_true() {
        let (mut revision, b, x) = setup();
        revision.fix(x, 4).unwrap();
        ReifiedEqual::new(b, x, 4).propagate(&mut revision).unwrap();
        assert_eq!(revision.domain(b).singleton_value(), 2);
    }
}
