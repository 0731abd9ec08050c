//! Linear arithmetic over several variables: `LinearSum` and its boolean
//! specialization `BoolSum`.

use crate::solver::{
    engine::VariableId,
    propagator::{describe_scope, ConstraintDescriptor, Propagator, PropagatorPriority},
    state::{EmptyDomain, Revision},
};

fn div_floor(a: i64, b: i64) -> i64 {
    let q = a / b;
    let r = a % b;
    if r != 0 && (r < 0) != (b < 0) {
        q - 1
    } else {
        q
    }
}

fn div_ceil(a: i64, b: i64) -> i64 {
    let q = a / b;
    let r = a % b;
    if r != 0 && (r < 0) == (b < 0) {
        q + 1
    } else {
        q
    }
}

/// Enforces `sum(coefficients[i] * terms[i]) = total` with
/// bounds-consistent filtering in i64 arithmetic. Coefficients may be
/// negative; zero coefficients are rejected at posting time.
#[derive(Debug, Clone)]
pub struct LinearSum {
    coefficients: Vec<i64>,
    terms: Vec<VariableId>,
    total: VariableId,
    scope: Vec<VariableId>,
}

impl LinearSum {
    pub(crate) fn new(coefficients: Vec<i64>, terms: Vec<VariableId>, total: VariableId) -> Self {
        let mut scope = terms.clone();
        scope.push(total);
        Self {
            coefficients,
            terms,
            total,
            scope,
        }
    }

    /// Contribution interval of term `i` under its current domain.
    fn contribution(&self, revision: &Revision, i: usize) -> (i64, i64) {
        let domain = revision.domain(self.terms[i]);
        let min = domain.min().expect("domains are non-empty") as i64;
        let max = domain.max().expect("domains are non-empty") as i64;
        let c = self.coefficients[i];
        if c >= 0 {
            (c * min, c * max)
        } else {
            (c * max, c * min)
        }
    }
}

impl Propagator for LinearSum {
    fn variables(&self) -> &[VariableId] {
        &self.scope
    }

    fn descriptor(&self) -> ConstraintDescriptor {
        ConstraintDescriptor {
            name: "LinearSum".to_string(),
            description: format!(
                "sum({}) = ?{}",
                describe_scope(&self.terms),
                self.total
            ),
        }
    }

    fn propagate(&self, revision: &mut Revision) -> Result<(), EmptyDomain> {
        let n = self.terms.len();
        let mut sum_min = 0i64;
        let mut sum_max = 0i64;
        let mut bounds = Vec::with_capacity(n);
        for i in 0..n {
            let (lo, hi) = self.contribution(revision, i);
            sum_min += lo;
            sum_max += hi;
            bounds.push((lo, hi));
        }

        let _ = revision.restrict_bounds(self.total, sum_min, sum_max)?;
        let total_min = revision.domain(self.total).min().expect("non-empty") as i64;
        let total_max = revision.domain(self.total).max().expect("non-empty") as i64;

        for i in 0..n {
            let (lo, hi) = bounds[i];
            let rest_min = sum_min - lo;
            let rest_max = sum_max - hi;
            // coefficients[i] * terms[i] must fit in this window:
            let window_lo = total_min - rest_max;
            let window_hi = total_max - rest_min;
            let c = self.coefficients[i];
            let (term_lo, term_hi) = if c > 0 {
                (div_ceil(window_lo, c), div_floor(window_hi, c))
            } else {
                (div_ceil(window_hi, c), div_floor(window_lo, c))
            };
            let _ = revision.restrict_bounds(self.terms[i], term_lo, term_hi)?;
        }
        Ok(())
    }
}

/// Enforces `#(terms that are true) = count - 1` over shifted booleans
/// (`1` = false, `2` = true).
///
/// The count variable uses the same shifted encoding as the booleans:
/// value `k` stands for a count of `k - 1`, so a count variable over
/// `{1..=n+1}` covers the counts `0..=n`.
#[derive(Debug, Clone)]
pub struct BoolSum {
    terms: Vec<VariableId>,
    count: VariableId,
    scope: Vec<VariableId>,
}

const FALSE: u32 = 1;
const TRUE: u32 = 2;

impl BoolSum {
    pub(crate) fn new(terms: Vec<VariableId>, count: VariableId) -> Self {
        let mut scope = terms.clone();
        scope.push(count);
        Self {
            terms,
            count,
            scope,
        }
    }
}

impl Propagator for BoolSum {
    fn variables(&self) -> &[VariableId] {
        &self.scope
    }

    fn priority(&self) -> PropagatorPriority {
        PropagatorPriority::Cheap
    }

    fn descriptor(&self) -> ConstraintDescriptor {
        ConstraintDescriptor {
            name: "BoolSum".to_string(),
            description: format!(
                "#true({}) = ?{} - 1",
                describe_scope(&self.terms),
                self.count
            ),
        }
    }

    fn propagate(&self, revision: &mut Revision) -> Result<(), EmptyDomain> {
        let mut fixed_true = 0i64;
        let mut undecided = 0i64;
        for &term in &self.terms {
            let domain = revision.domain(term);
            match (domain.has(FALSE), domain.has(TRUE)) {
                (true, true) => undecided += 1,
                (false, true) => fixed_true += 1,
                (true, false) => {}
                (false, false) => return Err(EmptyDomain),
            }
        }

        // Shifted encoding: count value = true-count + 1.
        let _ = revision.restrict_bounds(
            self.count,
            fixed_true + 1,
            fixed_true + undecided + 1,
        )?;

        let count_min = revision.domain(self.count).min().expect("non-empty") as i64 - 1;
        let count_max = revision.domain(self.count).max().expect("non-empty") as i64 - 1;

        if count_max == fixed_true {
            // No more trues allowed.
            for &term in &self.terms {
                if revision.domain(term).size() > 1 {
                    let _ = revision.fix(term, FALSE)?;
                }
            }
        } else if count_min == fixed_true + undecided {
            // Every undecided boolean is needed.
            for &term in &self.terms {
                if revision.domain(term).size() > 1 {
                    let _ = revision.fix(term, TRUE)?;
                }
            }
        }
        Ok(())
    }
}
