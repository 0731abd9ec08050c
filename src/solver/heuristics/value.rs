//! Heuristics that decide how a branching domain is explored.
//!
//! A value heuristic turns the chosen variable's domain into an ordered
//! *partition*: a list of disjoint sub-domains whose union is the whole
//! domain. Enumeration heuristics return singletons; split-domain
//! returns two halves and lets recursion cut further.

use parking_lot::Mutex;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use rand_core::SeedableRng;

use crate::solver::domain::Domain;

/// A trait for strategies that determine the order in which the values
/// of a branching variable are tried.
pub trait ValueSelect: Send + Sync {
    /// Splits `domain` into disjoint, collectively exhaustive children,
    /// in exploration order. `domain` always has at least two values.
    fn partition(&self, domain: &Domain) -> Vec<Domain>;
}

/// Tries values in ascending order.
#[derive(Debug, Clone, Copy, Default)]
pub struct MinValue;

impl ValueSelect for MinValue {
    fn partition(&self, domain: &Domain) -> Vec<Domain> {
        domain
            .iter()
            .map(|value| Domain::singleton(domain.max_value(), value))
            .collect()
    }
}

/// Tries values in descending order.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaxValue;

impl ValueSelect for MaxValue {
    fn partition(&self, domain: &Domain) -> Vec<Domain> {
        let mut children: Vec<Domain> = domain
            .iter()
            .map(|value| Domain::singleton(domain.max_value(), value))
            .collect();
        children.reverse();
        children
    }
}

/// Bisects the domain at the midpoint of its bounds, lower half first.
#[derive(Debug, Clone, Copy, Default)]
pub struct SplitDomain;

impl ValueSelect for SplitDomain {
    fn partition(&self, domain: &Domain) -> Vec<Domain> {
        let min = domain.min().expect("branching domain is non-empty");
        let max = domain.max().expect("branching domain is non-empty");
        let mid = min + (max - min) / 2;
        let (lower, _) = domain.remove_above(mid);
        let (upper, _) = domain.remove_below(mid + 1);
        vec![lower, upper]
    }
}

/// Tries values in a random order drawn from a seeded generator, so
/// runs are shuffled but reproducible.
#[derive(Debug)]
pub struct RandomValue {
    rng: Mutex<ChaCha8Rng>,
}

impl RandomValue {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(ChaCha8Rng::seed_from_u64(seed)),
        }
    }
}

impl ValueSelect for RandomValue {
    fn partition(&self, domain: &Domain) -> Vec<Domain> {
        let mut children: Vec<Domain> = domain
            .iter()
            .map(|value| Domain::singleton(domain.max_value(), value))
            .collect();
        children.shuffle(&mut *self.rng.lock());
        children
    }
}
