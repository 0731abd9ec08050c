use crate::solver::engine::VariableId;

pub type Result<T, E = ModelError> = core::result::Result<T, E>;

/// Raised while a model is being built. Every constraint constructor
/// validates its shape up front so that nothing can go wrong during search.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("constraint scope is empty")]
    EmptyScope,

    #[error("unknown variable id {0}")]
    UnknownVariable(VariableId),

    #[error("value {value} is outside the model's value range 1..={max}")]
    ValueOutOfRange { value: i64, max: u32 },

    #[error("bounds {min}..={max} are inverted")]
    InvertedBounds { min: u32, max: u32 },

    #[error("variable domain would be empty")]
    EmptyDomain,

    #[error("variable {0} is not boolean (its domain must lie within {{1, 2}})")]
    NotBoolean(VariableId),

    #[error("expected {expected} entries, got {got}")]
    ArityMismatch { expected: usize, got: usize },

    #[error("linear coefficient at position {index} is zero")]
    ZeroCoefficient { index: usize },

    #[error("table row {row} has {got} entries, expected {expected}")]
    RowWidthMismatch {
        row: usize,
        expected: usize,
        got: usize,
    },

    #[error("dfa start state {start} is out of range for {states} states")]
    BadDfaStart { start: usize, states: usize },

    #[error("dfa accepting state {state} is out of range for {states} states")]
    BadDfaAccept { state: usize, states: usize },

    #[error("dfa transition {index} references an out-of-range state or label")]
    BadDfaTransition { index: usize },

    #[error("dfa has two transitions from state {state} on label {label}")]
    NondeterministicDfa { state: usize, label: u32 },

    #[error("circuit start index {start} is out of range for {nodes} nodes")]
    BadCircuitStart { start: usize, nodes: usize },

    #[error("cumulative capacity must be positive")]
    ZeroCapacity,
}

/// Raised by the solve entry points.
///
/// A propagation failure (empty domain) during search is *not* an error; it
/// only marks a dead branch and the search backtracks over it. These
/// variants are what the host actually observes.
#[derive(Debug, thiserror::Error)]
pub enum SolveError {
    /// The constraint system admits no solution.
    #[error("the constraint system is infeasible")]
    Infeasible,

    /// A node/time/solution limit fired before any solution was found. When
    /// at least one solution (or incumbent) exists, limits are reported
    /// through [`SearchStatus`](crate::SearchStatus) instead.
    #[error("limit reached before any solution was found")]
    LimitReached,

    /// The search was cancelled before any solution was found.
    #[error("search cancelled before any solution was found")]
    Cancelled,

    #[error(transparent)]
    InvalidModel(#[from] ModelError),
}
