//! Binary order and disequality constraints: `a REL b`.

use crate::solver::{
    engine::VariableId,
    propagator::{ConstraintDescriptor, Propagator, PropagatorPriority},
    state::{EmptyDomain, Revision},
};

/// The relation of an [`Inequality`] constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
}

impl Relation {
    fn symbol(self) -> &'static str {
        match self {
            Relation::NotEqual => "!=",
            Relation::Less => "<",
            Relation::LessEqual => "<=",
            Relation::Greater => ">",
            Relation::GreaterEqual => ">=",
        }
    }
}

/// Enforces `a REL b`.
///
/// Disequality prunes only once a side is fixed; the order relations
/// additionally keep the bounds consistent (`a < b` caps `a` below
/// `max(b)` and lifts `b` above `min(a)`).
#[derive(Debug, Clone)]
pub struct Inequality {
    vars: [VariableId; 2],
    relation: Relation,
}

impl Inequality {
    pub(crate) fn new(a: VariableId, relation: Relation, b: VariableId) -> Self {
        Self {
            vars: [a, b],
            relation,
        }
    }

    fn bounds(
        &self,
        revision: &mut Revision,
        strict: bool,
        lo: VariableId,
        hi: VariableId,
    ) -> Result<(), EmptyDomain> {
        // lo < hi (strict) or lo <= hi.
        let gap = if strict { 1 } else { 0 };
        let hi_max = revision.domain(hi).max().expect("domains are non-empty");
        if hi_max < gap {
            return Err(EmptyDomain);
        }
        let _ = revision.remove_above(lo, hi_max - gap)?;
        let lo_min = revision.domain(lo).min().expect("domains are non-empty");
        let _ = revision.remove_below(hi, lo_min + gap)?;
        Ok(())
    }
}

impl Propagator for Inequality {
    fn variables(&self) -> &[VariableId] {
        &self.vars
    }

    fn priority(&self) -> PropagatorPriority {
        PropagatorPriority::Cheap
    }

    fn descriptor(&self) -> ConstraintDescriptor {
        ConstraintDescriptor {
            name: "Inequality".to_string(),
            description: format!(
                "?{} {} ?{}",
                self.vars[0],
                self.relation.symbol(),
                self.vars[1]
            ),
        }
    }

    fn propagate(&self, revision: &mut Revision) -> Result<(), EmptyDomain> {
        let [a, b] = self.vars;
        if a == b {
            // Reflexive posting: `a != a` and the strict orders can never
            // hold, the others always do.
            return match self.relation {
                Relation::NotEqual | Relation::Less | Relation::Greater => Err(EmptyDomain),
                Relation::LessEqual | Relation::GreaterEqual => Ok(()),
            };
        }
        match self.relation {
            Relation::NotEqual => {
                if revision.domain(a).is_singleton() {
                    let value = revision.domain(a).singleton_value();
                    let _ = revision.remove_value(b, value)?;
                }
                if revision.domain(b).is_singleton() {
                    let value = revision.domain(b).singleton_value();
                    let _ = revision.remove_value(a, value)?;
                }
                Ok(())
            }
            Relation::Less => self.bounds(revision, true, a, b),
            Relation::LessEqual => self.bounds(revision, false, a, b),
            Relation::Greater => self.bounds(revision, true, b, a),
            Relation::GreaterEqual => self.bounds(revision, false, b, a),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{Inequality, Relation};
    use crate::{
        model::Model,
        solver::{propagator::Propagator, state::Revision, state::SearchState},
    };

    fn state(max: u32, a: (u32, u32), b: (u32, u32)) -> (Revision, u32, u32) {
        let mut model = Model::new(max);
        let x = model.new_var(a.0, a.1).unwrap();
        let y = model.new_var(b.0, b.1).unwrap();
        (Revision::new(SearchState::root(&model)), x, y)
    }

    #[test]
    fn less_tightens_both_bounds() {
        let (mut revision, x, y) = state(10, (3, 10), (1, 6));
        Inequality::new(x, Relation::Less, y)
            .propagate(&mut revision)
            .unwrap();
        assert_eq!(revision.domain(x).max(), Some(5));
        assert_eq!(revision.domain(y).min(), Some(4));
    }

    #[test]
    fn not_equal_waits_for_a_fixed_side() {
        let (mut revision, x, y) = state(5, (1, 3), (2, 2));
        let propagator = Inequality::new(x, Relation::NotEqual, y);
        propagator.propagate(&mut revision).unwrap();
        assert_eq!(revision.domain(x).iter().collect::<Vec<_>>(), vec![1, 3]);

        // Idempotent on its fixpoint.
        let before = revision.events().len();
        propagator.propagate(&mut revision).unwrap();
        assert_eq!(revision.events().len(), before);
    }

    #[test]
    fn infeasible_order_wipes_out() {
        let (mut revision, x, y) = state(4, (3, 4), (1, 2));
        assert!(Inequality::new(x, Relation::Less, y)
            .propagate(&mut revision)
            .is_err());
    }
}
