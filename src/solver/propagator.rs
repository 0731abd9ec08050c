//! The contract every constraint implements.

use std::fmt;

use crate::solver::{
    engine::VariableId,
    state::{EmptyDomain, Revision},
};

/// Scheduling class of a propagator. Cheap propagators run before
/// expensive ones so that the easy pruning is done by the time the
/// heavyweight algorithms rebuild their structures; ties are broken by
/// posting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PropagatorPriority {
    /// Matching-, graph- or profile-based global constraints.
    Expensive,
    /// Work linear in the scope or the domain sizes.
    Linear,
    /// A handful of bound or value updates.
    Cheap,
}

/// Human-readable identification, used by the stats table and logs.
#[derive(Debug, Clone)]
pub struct ConstraintDescriptor {
    pub name: String,
    pub description: String,
}

/// Executable form of a constraint.
///
/// A propagator is constructed once per model, owns the ids of the
/// variables it watches, and is invoked by the engine whenever one of
/// those domains changes. It must be deterministic, must only *shrink*
/// domains, and calling it on its own fixpoint must change nothing.
/// Completeness is not required: filtering weaker than domain
/// consistency is fine as long as no feasible assignment is ever
/// rejected.
///
/// Propagators keep no mutable state across invocations; anything they
/// need (matchings, layered graphs, profiles) is rebuilt from the
/// domains in the revision. That keeps them freely shareable between
/// branches and worker threads.
pub trait Propagator: fmt::Debug + Send + Sync {
    /// The subscription set: the engine wakes this propagator when any
    /// of these variables' domains change.
    fn variables(&self) -> &[VariableId];

    fn priority(&self) -> PropagatorPriority {
        PropagatorPriority::Linear
    }

    fn descriptor(&self) -> ConstraintDescriptor;

    /// Shrinks domains through `revision` as far as this propagator can
    /// justify. Returns [`EmptyDomain`] as soon as any domain wipes out.
    fn propagate(&self, revision: &mut Revision) -> Result<(), EmptyDomain>;
}

/// Renders a scope like `?0, ?1, ?2` for descriptors.
pub(crate) fn describe_scope(vars: &[VariableId]) -> String {
    let rendered: Vec<String> = vars.iter().map(|v| format!("?{v}")).collect();
    rendered.join(", ")
}
