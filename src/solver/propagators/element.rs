//! The element constraint `value = array[index]`.

use crate::solver::{
    domain::Domain,
    engine::VariableId,
    propagator::{ConstraintDescriptor, Propagator},
    state::{EmptyDomain, Revision},
};

/// Enforces `value = array[index]`, where `index` is a 1-based position
/// into a fixed array of values.
///
/// `value` is restricted to the image of the index domain through the
/// array; `index` keeps only the positions whose entry is still
/// admissible for `value`.
#[derive(Debug, Clone)]
pub struct Element {
    array: Vec<u32>,
    vars: [VariableId; 2],
}

impl Element {
    pub(crate) fn new(array: Vec<u32>, index: VariableId, value: VariableId) -> Self {
        Self {
            array,
            vars: [index, value],
        }
    }
}

impl Propagator for Element {
    fn variables(&self) -> &[VariableId] {
        &self.vars
    }

    fn descriptor(&self) -> ConstraintDescriptor {
        ConstraintDescriptor {
            name: "Element".to_string(),
            description: format!("?{} = array[?{}]", self.vars[1], self.vars[0]),
        }
    }

    fn propagate(&self, revision: &mut Revision) -> Result<(), EmptyDomain> {
        let [index, value] = self.vars;

        let _ = revision.remove_above(index, self.array.len() as u32)?;

        let max_value = revision.domain(value).max_value();
        let mut image = Domain::empty(max_value);
        for position in revision.domain(index).iter() {
            image.insert(self.array[(position - 1) as usize]);
        }
        let _ = revision.intersect(value, &image)?;

        let index_space = revision.domain(index).max_value();
        let mut admissible = Domain::empty(index_space);
        for position in revision.domain(index).iter() {
            if revision.domain(value).has(self.array[(position - 1) as usize]) {
                admissible.insert(position);
            }
        }
        let _ = revision.intersect(index, &admissible)?;
        Ok(())
    }
}
