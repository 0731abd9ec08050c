//! Lexicographic ordering between two sequences.

use crate::solver::{
    engine::VariableId,
    propagator::{describe_scope, ConstraintDescriptor, Propagator, PropagatorPriority},
    state::{EmptyDomain, Revision},
};

/// Enforces `X <=_lex Y` for equal-length sequences.
///
/// Positions where both sides are fixed and equal are skipped; the
/// first position where the sequences can still differ is the critical
/// index, and the ordering is enforced there as `x <= y` bounds. A
/// strictly smaller fixed pair discharges the constraint entirely.
#[derive(Debug, Clone)]
pub struct LexLessEq {
    xs: Vec<VariableId>,
    ys: Vec<VariableId>,
    scope: Vec<VariableId>,
}

impl LexLessEq {
    pub(crate) fn new(xs: Vec<VariableId>, ys: Vec<VariableId>) -> Self {
        let mut scope = xs.clone();
        scope.extend_from_slice(&ys);
        Self { xs, ys, scope }
    }
}

impl Propagator for LexLessEq {
    fn variables(&self) -> &[VariableId] {
        &self.scope
    }

    fn priority(&self) -> PropagatorPriority {
        PropagatorPriority::Cheap
    }

    fn descriptor(&self) -> ConstraintDescriptor {
        ConstraintDescriptor {
            name: "LexLessEq".to_string(),
            description: format!(
                "[{}] <=lex [{}]",
                describe_scope(&self.xs),
                describe_scope(&self.ys)
            ),
        }
    }

    fn propagate(&self, revision: &mut Revision) -> Result<(), EmptyDomain> {
        let n = self.xs.len();
        let mut critical = 0;
        while critical < n {
            let dx = revision.domain(self.xs[critical]);
            let dy = revision.domain(self.ys[critical]);
            if dx.is_singleton() && dy.is_singleton() {
                let (vx, vy) = (dx.singleton_value(), dy.singleton_value());
                if vx < vy {
                    return Ok(()); // strictly smaller prefix settles it
                }
                if vx > vy {
                    return Err(EmptyDomain);
                }
                critical += 1;
                continue;
            }
            break;
        }
        if critical == n {
            return Ok(()); // sequences are fixed and equal
        }

        let y_max = revision
            .domain(self.ys[critical])
            .max()
            .expect("non-empty");
        let _ = revision.remove_above(self.xs[critical], y_max)?;
        let x_min = revision
            .domain(self.xs[critical])
            .min()
            .expect("non-empty");
        let _ = revision.remove_below(self.ys[critical], x_min)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::LexLessEq;
    use crate::{
        model::Model,
        solver::{propagator::Propagator, state::Revision, state::SearchState},
    };

    fn sequences() -> (Revision, Vec<u32>, Vec<u32>) {
        let mut model = Model::new(9);
        let xs: Vec<u32> = (0..3).map(|_| model.new_var(1, 9).unwrap()).collect();
        let ys: Vec<u32> = (0..3).map(|_| model.new_var(1, 9).unwrap()).collect();
        (Revision::new(SearchState::root(&model)), xs, ys)
    }

    #[test]
    fn bounds_meet_at_the_critical_index() {
        let (mut revision, xs, ys) = sequences();
        revision.remove_above(ys[0], 4).unwrap();

        LexLessEq::new(xs.clone(), ys).propagate(&mut revision).unwrap();
        assert_eq!(revision.domain(xs[0]).max(), Some(4));
    }

    #[test]
    fn equal_prefix_moves_the_critical_index() {
        let (mut revision, xs, ys) = sequences();
        revision.fix(xs[0], 5).unwrap();
        revision.fix(ys[0], 5).unwrap();
        revision.remove_below(xs[1], 6).unwrap();

        LexLessEq::new(xs, ys.clone()).propagate(&mut revision).unwrap();
        assert_eq!(revision.domain(ys[1]).min(), Some(6));
    }

    #[test]
    fn smaller_prefix_discharges_the_suffix() {
        let (mut revision, xs, ys) = sequences();
        revision.fix(xs[0], 2).unwrap();
        revision.fix(ys[0], 7).unwrap();

        LexLessEq::new(xs, ys.clone()).propagate(&mut revision).unwrap();
        assert!(revision.events().len() <= 2); // only the two fixes above
    }

    #[test]
    fn larger_fixed_prefix_fails() {
        let (mut revision, xs, ys) = sequences();
        revision.fix(xs[0], 7).unwrap();
        revision.fix(ys[0], 2).unwrap();

        assert!(LexLessEq::new(xs, ys).propagate(&mut revision).is_err());
    }
}
