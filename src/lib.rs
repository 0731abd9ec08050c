//! Solvo is a finite-domain constraint satisfaction and optimization
//! solver.
//!
//! A problem is stated declaratively: variables over bounded integer
//! domains (`1..=max_value`; zero is reserved) plus constraints chosen
//! from a library of propagators -- from simple inequalities up to
//! globals like all-different, circuit, regular and cumulative. The
//! solver enumerates satisfying assignments, or optimizes an objective
//! variable with branch-and-bound, returning the best incumbent even
//! when interrupted by a limit or a cancellation.
//!
//! # Core Concepts
//!
//! - **[`Model`]**: variables plus posted constraints. Every posting
//!   method validates its input up front, so a model that built without
//!   error cannot fail structurally during search.
//! - **[`Solver`]**: freezes a model and drives propagation and search.
//!   Configure heuristics, limits, worker count and cancellation
//!   through [`SolveOptions`].
//! - **[`Domain`]**: a packed bit-set over the value space; the
//!   building block propagators filter.
//!
//! # Example: A Simple 2-Variable Problem
//!
//! Solve `a != b` where `a` can be `1` or `2` and `b` is already `1`;
//! the solver deduces `a = 2`.
//!
//! ```
//! use solvo::{Model, Relation, Solver};
//!
//! let mut model = Model::new(2);
//! let a = model.new_var(1, 2).unwrap();
//! let b = model.new_var(1, 1).unwrap();
//! model.inequality(a, Relation::NotEqual, b).unwrap();
//!
//! let solver = Solver::new(model);
//! let outcome = solver.solve(0).unwrap();
//! assert_eq!(outcome.solutions.len(), 1);
//! assert_eq!(outcome.solutions[0].value(a), 2);
//! ```
//!
//! Booleans use the shifted encoding `{1, 2}` (1 = false, 2 = true) so
//! they share the 1-based value space, and the count variables of
//! `BoolSum`/`Among`/`Count` are shifted the same way: count value `k`
//! stands for `k - 1` occurrences.

pub mod error;
pub mod examples;
pub mod model;
pub mod solver;

pub use error::{ModelError, SolveError};
pub use model::{Model, Relation, Variable};
pub use solver::{
    domain::Domain,
    engine::{PropagatorId, VariableId},
    heuristics::{
        value::{MaxValue, MinValue, RandomValue, SplitDomain, ValueSelect},
        variable::{DomDeg, FirstFail, InputOrder, RandomVariable, VariableSelect},
    },
    monitor::{MonitorSnapshot, SearchMonitor},
    propagator::{ConstraintDescriptor, Propagator, PropagatorPriority},
    propagators::regular::Dfa,
    search::{
        CancelToken, Objective, OptimalOutcome, SearchStatus, Solution, SolveOptions,
        SolveOutcome, Solver,
    },
    state::{DomainEvent, EmptyDomain, EventKind, Revision, SearchState},
    stats::{render_stats_table, PropagatorStats, SolveStats},
};
