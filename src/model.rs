//! The declarative model: variables over finite domains plus posted
//! constraints.
//!
//! A `Model` is built incrementally -- create variables, post
//! constraints -- and every posting method validates its input, so a
//! model that built without error can never blow up during search.
//! Handing the model to a [`Solver`](crate::solver::search::Solver)
//! freezes it; from then on it is shared read-only across every worker
//! thread.

use crate::{
    error::ModelError,
    solver::{
        domain::Domain,
        engine::{PropagatorId, VariableId},
        propagator::Propagator,
        propagators::{
            all_different::AllDifferent,
            among::Among,
            arithmetic::Arithmetic,
            cardinality::GlobalCardinality,
            circuit::Circuit,
            cumulative::Cumulative,
            element::Element,
            inequality::Inequality,
            lex::LexLessEq,
            linear::{BoolSum, LinearSum},
            regular::{Dfa, Regular},
            reified::ReifiedEqual,
            table::Table,
        },
    },
};

pub use crate::solver::propagators::inequality::Relation;

/// A decision variable: immutable identity plus its initial domain.
#[derive(Debug, Clone)]
pub struct Variable {
    pub id: VariableId,
    pub name: Option<String>,
    pub domain: Domain,
}

/// An ordered collection of variables and constraints over the value
/// space `1..=max_value`.
#[derive(Debug)]
pub struct Model {
    max_value: u32,
    variables: Vec<Variable>,
    propagators: Vec<Box<dyn Propagator>>,
}

impl Model {
    /// A model whose variables range over `1..=max_value`.
    pub fn new(max_value: u32) -> Self {
        Self {
            max_value,
            variables: Vec::new(),
            propagators: Vec::new(),
        }
    }

    pub fn max_value(&self) -> u32 {
        self.max_value
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_propagators(&self) -> usize {
        self.propagators.len()
    }

    pub fn propagator(&self, id: PropagatorId) -> &dyn Propagator {
        self.propagators[id].as_ref()
    }

    /// The number of propagators watching `var`.
    pub fn degree(&self, var: VariableId) -> usize {
        self.propagators
            .iter()
            .filter(|propagator| propagator.variables().contains(&var))
            .count()
    }

    /// Looks a variable up by its name.
    pub fn variable_named(&self, name: &str) -> Option<VariableId> {
        self.variables
            .iter()
            .find(|variable| variable.name.as_deref() == Some(name))
            .map(|variable| variable.id)
    }

    // ---- variable creation -------------------------------------------

    /// A variable over the inclusive range `min..=max`.
    pub fn new_var(&mut self, min: u32, max: u32) -> Result<VariableId, ModelError> {
        self.add_variable(None, Self::range_domain(self.max_value, min, max)?)
    }

    /// A named variable over the inclusive range `min..=max`.
    pub fn new_named_var(
        &mut self,
        name: &str,
        min: u32,
        max: u32,
    ) -> Result<VariableId, ModelError> {
        self.add_variable(
            Some(name.to_string()),
            Self::range_domain(self.max_value, min, max)?,
        )
    }

    /// A variable over an explicit value set.
    pub fn new_var_from_values(&mut self, values: &[u32]) -> Result<VariableId, ModelError> {
        if values.is_empty() {
            return Err(ModelError::EmptyDomain);
        }
        for &value in values {
            self.check_value(value)?;
        }
        self.add_variable(None, Domain::from_values(self.max_value, values))
    }

    /// A named variable over an explicit value set.
    pub fn new_named_var_from_values(
        &mut self,
        name: &str,
        values: &[u32],
    ) -> Result<VariableId, ModelError> {
        if values.is_empty() {
            return Err(ModelError::EmptyDomain);
        }
        for &value in values {
            self.check_value(value)?;
        }
        self.add_variable(Some(name.to_string()), Domain::from_values(self.max_value, values))
    }

    /// A boolean in the shifted encoding: domain `{1, 2}`, 1 = false,
    /// 2 = true.
    pub fn new_bool(&mut self) -> Result<VariableId, ModelError> {
        self.new_var(1, 2)
    }

    fn range_domain(max_value: u32, min: u32, max: u32) -> Result<Domain, ModelError> {
        if min > max {
            return Err(ModelError::InvertedBounds { min, max });
        }
        if min < 1 {
            return Err(ModelError::ValueOutOfRange {
                value: min as i64,
                max: max_value,
            });
        }
        if max > max_value {
            return Err(ModelError::ValueOutOfRange {
                value: max as i64,
                max: max_value,
            });
        }
        let (domain, _) = Domain::new(max_value).remove_below(min);
        let (domain, _) = domain.remove_above(max);
        Ok(domain)
    }

    fn add_variable(
        &mut self,
        name: Option<String>,
        domain: Domain,
    ) -> Result<VariableId, ModelError> {
        let id = self.variables.len() as VariableId;
        self.variables.push(Variable { id, name, domain });
        Ok(id)
    }

    // ---- posting helpers ---------------------------------------------

    fn check_var(&self, var: VariableId) -> Result<(), ModelError> {
        if (var as usize) < self.variables.len() {
            Ok(())
        } else {
            Err(ModelError::UnknownVariable(var))
        }
    }

    fn check_vars(&self, vars: &[VariableId]) -> Result<(), ModelError> {
        if vars.is_empty() {
            return Err(ModelError::EmptyScope);
        }
        vars.iter().try_for_each(|&var| self.check_var(var))
    }

    fn check_value(&self, value: u32) -> Result<(), ModelError> {
        if value >= 1 && value <= self.max_value {
            Ok(())
        } else {
            Err(ModelError::ValueOutOfRange {
                value: value as i64,
                max: self.max_value,
            })
        }
    }

    fn check_bool(&self, var: VariableId) -> Result<(), ModelError> {
        self.check_var(var)?;
        if self.max_value < 2 {
            return Err(ModelError::NotBoolean(var));
        }
        let domain = &self.variables[var as usize].domain;
        if domain.is_subset_of(&Domain::from_values(self.max_value, &[1, 2])) {
            Ok(())
        } else {
            Err(ModelError::NotBoolean(var))
        }
    }

    fn post(&mut self, propagator: impl Propagator + 'static) {
        self.propagators.push(Box::new(propagator));
    }

    // ---- constraint posting ------------------------------------------

    /// `a REL b` for REL in {!=, <, <=, >, >=}.
    pub fn inequality(
        &mut self,
        a: VariableId,
        relation: Relation,
        b: VariableId,
    ) -> Result<(), ModelError> {
        self.check_var(a)?;
        self.check_var(b)?;
        self.post(Inequality::new(a, relation, b));
        Ok(())
    }

    /// `y = x + offset`.
    pub fn offset(
        &mut self,
        x: VariableId,
        offset: i64,
        y: VariableId,
    ) -> Result<(), ModelError> {
        self.check_var(x)?;
        self.check_var(y)?;
        self.post(Arithmetic::new(x, offset, y));
        Ok(())
    }

    /// `value = array[index]`, with `index` 1-based into `array`.
    pub fn element(
        &mut self,
        array: &[u32],
        index: VariableId,
        value: VariableId,
    ) -> Result<(), ModelError> {
        if array.is_empty() {
            return Err(ModelError::EmptyScope);
        }
        self.check_var(index)?;
        self.check_var(value)?;
        for &entry in array {
            self.check_value(entry)?;
        }
        self.post(Element::new(array.to_vec(), index, value));
        Ok(())
    }

    /// `sum(coefficients[i] * terms[i]) = total`.
    pub fn linear_sum(
        &mut self,
        coefficients: &[i64],
        terms: &[VariableId],
        total: VariableId,
    ) -> Result<(), ModelError> {
        self.check_vars(terms)?;
        self.check_var(total)?;
        if coefficients.len() != terms.len() {
            return Err(ModelError::ArityMismatch {
                expected: terms.len(),
                got: coefficients.len(),
            });
        }
        if let Some(index) = coefficients.iter().position(|&c| c == 0) {
            return Err(ModelError::ZeroCoefficient { index });
        }
        self.post(LinearSum::new(
            coefficients.to_vec(),
            terms.to_vec(),
            total,
        ));
        Ok(())
    }

    /// `#(terms that are true) = count - 1` over shifted booleans; the
    /// count variable uses the shifted encoding too.
    pub fn bool_sum(
        &mut self,
        terms: &[VariableId],
        count: VariableId,
    ) -> Result<(), ModelError> {
        self.check_vars(terms)?;
        self.check_var(count)?;
        terms.iter().try_for_each(|&term| self.check_bool(term))?;
        self.post(BoolSum::new(terms.to_vec(), count));
        Ok(())
    }

    /// `b <==> (x == value)` with `b` a shifted boolean.
    pub fn reified_equal(
        &mut self,
        b: VariableId,
        x: VariableId,
        value: u32,
    ) -> Result<(), ModelError> {
        self.check_bool(b)?;
        self.check_var(x)?;
        self.check_value(value)?;
        self.post(ReifiedEqual::new(b, x, value));
        Ok(())
    }

    /// All variables take pairwise distinct values.
    pub fn all_different(&mut self, vars: &[VariableId]) -> Result<(), ModelError> {
        self.check_vars(vars)?;
        self.post(AllDifferent::new(vars.to_vec()));
        Ok(())
    }

    /// The successor variables form one Hamiltonian cycle. `start` only
    /// anchors the posting surface (a cycle has no distinguished first
    /// node) and must index into `successors`.
    pub fn circuit(
        &mut self,
        successors: &[VariableId],
        start: usize,
    ) -> Result<(), ModelError> {
        self.check_vars(successors)?;
        if start >= successors.len() {
            return Err(ModelError::BadCircuitStart {
                start,
                nodes: successors.len(),
            });
        }
        // Distinctness of successors is delegated to a companion
        // all-different; the circuit propagator handles the rest.
        self.post(AllDifferent::new(successors.to_vec()));
        self.post(Circuit::new(successors.to_vec()));
        Ok(())
    }

    /// The sequence of variables spells a word accepted by `dfa`.
    pub fn regular(&mut self, vars: &[VariableId], dfa: &Dfa) -> Result<(), ModelError> {
        self.check_vars(vars)?;
        if dfa.start >= dfa.states {
            return Err(ModelError::BadDfaStart {
                start: dfa.start,
                states: dfa.states,
            });
        }
        for &state in &dfa.accepting {
            if state >= dfa.states {
                return Err(ModelError::BadDfaAccept {
                    state,
                    states: dfa.states,
                });
            }
        }
        let mut seen = std::collections::HashSet::new();
        for (index, &(from, label, to)) in dfa.transitions.iter().enumerate() {
            if from >= dfa.states || to >= dfa.states {
                return Err(ModelError::BadDfaTransition { index });
            }
            if label < 1 || label > self.max_value {
                return Err(ModelError::BadDfaTransition { index });
            }
            if !seen.insert((from, label)) {
                return Err(ModelError::NondeterministicDfa { state: from, label });
            }
        }
        self.post(Regular::new(vars.to_vec(), dfa, self.max_value));
        Ok(())
    }

    /// Tasks `(starts[i], durations[i], demands[i])` share a resource
    /// of the given capacity.
    pub fn cumulative(
        &mut self,
        starts: &[VariableId],
        durations: &[u32],
        demands: &[u32],
        capacity: u32,
    ) -> Result<(), ModelError> {
        self.check_vars(starts)?;
        if durations.len() != starts.len() {
            return Err(ModelError::ArityMismatch {
                expected: starts.len(),
                got: durations.len(),
            });
        }
        if demands.len() != starts.len() {
            return Err(ModelError::ArityMismatch {
                expected: starts.len(),
                got: demands.len(),
            });
        }
        if capacity == 0 {
            return Err(ModelError::ZeroCapacity);
        }
        self.post(Cumulative::new(
            starts.to_vec(),
            durations.to_vec(),
            demands.to_vec(),
            capacity,
        ));
        Ok(())
    }

    /// Each `values[k]` is taken by a number of variables within
    /// `min_occurrences[k]..=max_occurrences[k]`.
    pub fn global_cardinality(
        &mut self,
        vars: &[VariableId],
        values: &[u32],
        min_occurrences: &[u32],
        max_occurrences: &[u32],
    ) -> Result<(), ModelError> {
        self.check_vars(vars)?;
        if min_occurrences.len() != values.len() {
            return Err(ModelError::ArityMismatch {
                expected: values.len(),
                got: min_occurrences.len(),
            });
        }
        if max_occurrences.len() != values.len() {
            return Err(ModelError::ArityMismatch {
                expected: values.len(),
                got: max_occurrences.len(),
            });
        }
        for (k, &value) in values.iter().enumerate() {
            self.check_value(value)?;
            if min_occurrences[k] > max_occurrences[k] {
                return Err(ModelError::InvertedBounds {
                    min: min_occurrences[k],
                    max: max_occurrences[k],
                });
            }
        }
        self.post(GlobalCardinality::new(
            vars.to_vec(),
            values.to_vec(),
            min_occurrences.to_vec(),
            max_occurrences.to_vec(),
        ));
        Ok(())
    }

    /// The number of variables taking a value in `set` equals
    /// `count - 1` (shifted count encoding).
    pub fn among(
        &mut self,
        vars: &[VariableId],
        set: &[u32],
        count: VariableId,
    ) -> Result<(), ModelError> {
        self.check_vars(vars)?;
        self.check_var(count)?;
        if set.is_empty() {
            return Err(ModelError::EmptyScope);
        }
        for &value in set {
            self.check_value(value)?;
        }
        self.post(Among::new(
            vars.to_vec(),
            Domain::from_values(self.max_value, set),
            count,
        ));
        Ok(())
    }

    /// The number of variables equal to `value` equals `count - 1`
    /// (shifted count encoding).
    pub fn count(
        &mut self,
        vars: &[VariableId],
        value: u32,
        count: VariableId,
    ) -> Result<(), ModelError> {
        self.check_vars(vars)?;
        self.check_var(count)?;
        self.check_value(value)?;
        self.post(Among::count(vars.to_vec(), value, self.max_value, count));
        Ok(())
    }

    /// The tuple of variables equals one of the rows.
    pub fn table(&mut self, vars: &[VariableId], rows: &[Vec<u32>]) -> Result<(), ModelError> {
        self.check_vars(vars)?;
        for (index, row) in rows.iter().enumerate() {
            if row.len() != vars.len() {
                return Err(ModelError::RowWidthMismatch {
                    row: index,
                    expected: vars.len(),
                    got: row.len(),
                });
            }
            for &value in row {
                self.check_value(value)?;
            }
        }
        self.post(Table::new(vars.to_vec(), rows.to_vec()));
        Ok(())
    }

    /// `xs <=_lex ys`.
    pub fn lex_less_eq(
        &mut self,
        xs: &[VariableId],
        ys: &[VariableId],
    ) -> Result<(), ModelError> {
        self.check_vars(xs)?;
        self.check_vars(ys)?;
        if xs.len() != ys.len() {
            return Err(ModelError::ArityMismatch {
                expected: xs.len(),
                got: ys.len(),
            });
        }
        self.post(LexLessEq::new(xs.to_vec(), ys.to_vec()));
        Ok(())
    }
}
