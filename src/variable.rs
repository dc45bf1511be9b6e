//! Linguistic variables — a universe plus named membership terms.
//!
//! A variable plays one of two roles:
//!
//! - **Antecedent** — a crisp input that gets fuzzified.
//! - **Consequent** — the output axis; carries the [`DefuzzMethod`] used to
//!   collapse the aggregated set.
//!
//! Term names are resolved to indices once, through a `hashbrown` lookup
//! table, so rule evaluation never touches strings.
//!
//! # Invariants
//!
//! - Term names are unique per variable ([`ConfigError::DuplicateTerm`]).
//! - At most [`MAX_TERMS`] terms per variable.
//! - Crisp inputs are clamped to the universe before evaluation.

use alloc::string::String;
use alloc::vec::Vec;

use hashbrown::HashMap;

use crate::defuzz::DefuzzMethod;
use crate::error::ConfigError;
use crate::membership::MembershipFunction;
use crate::universe::Universe;

/// Maximum number of terms a single variable may hold.
pub const MAX_TERMS: usize = 8;

/// Fuzzified degrees of one variable, indexed by term registration order.
pub type Degrees = heapless::Vec<f64, MAX_TERMS>;

/// Role of a variable in the inference system.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Role {
    /// Crisp input.
    Antecedent,
    /// Output axis with its defuzzification method.
    Consequent(DefuzzMethod),
}

/// How crisp inputs are turned into degrees.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Fuzzification {
    /// Evaluate the closed-form membership shape at the input.
    #[default]
    Analytic,
    /// Sample each shape on the universe and interpolate linearly between
    /// samples. Differs from `Analytic` only where breakpoints fall between
    /// samples; matches toolkits that store membership functions as arrays.
    Sampled,
}

/// A named membership term together with its curve sampled on the universe.
#[derive(Clone, Debug, PartialEq)]
pub struct Term {
    name: String,
    shape: MembershipFunction,
    curve: Vec<f64>,
}

impl Term {
    /// Term name, unique within its variable.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Membership shape.
    pub fn shape(&self) -> &MembershipFunction {
        &self.shape
    }

    /// Degrees at each universe sample.
    pub fn curve(&self) -> &[f64] {
        &self.curve
    }
}

/// Named input or output axis with its membership terms.
#[derive(Clone, Debug)]
pub struct LinguisticVariable {
    name: String,
    universe: Universe,
    role: Role,
    terms: heapless::Vec<Term, MAX_TERMS>,
    index: HashMap<String, usize>,
}

impl LinguisticVariable {
    /// New input variable with no terms.
    pub fn antecedent(name: impl Into<String>, universe: Universe) -> Self {
        Self::with_role(name.into(), universe, Role::Antecedent)
    }

    /// New output variable with no terms.
    pub fn consequent(name: impl Into<String>, universe: Universe, method: DefuzzMethod) -> Self {
        Self::with_role(name.into(), universe, Role::Consequent(method))
    }

    fn with_role(name: String, universe: Universe, role: Role) -> Self {
        Self {
            name,
            universe,
            role,
            terms: heapless::Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Register a term.
    ///
    /// Fails with [`ConfigError::DuplicateTerm`] if the name is taken,
    /// [`ConfigError::TooManyTerms`] past [`MAX_TERMS`], or a breakpoint error
    /// if the shape is malformed.
    pub fn add_term(
        &mut self,
        name: impl Into<String>,
        shape: MembershipFunction,
    ) -> Result<(), ConfigError> {
        let name = name.into();
        if self.index.contains_key(&name) {
            return Err(ConfigError::DuplicateTerm {
                variable: self.name.clone(),
                term: name,
            });
        }
        shape.validate()?;

        let curve = self
            .universe
            .samples()
            .iter()
            .map(|&x| shape.evaluate(x))
            .collect();
        let position = self.terms.len();
        self.terms
            .push(Term { name: name.clone(), shape, curve })
            .map_err(|_| ConfigError::TooManyTerms {
                variable: self.name.clone(),
                limit: MAX_TERMS,
            })?;
        self.index.insert(name, position);
        Ok(())
    }

    /// Builder form of [`add_term`](Self::add_term).
    pub fn with_term(
        mut self,
        name: impl Into<String>,
        shape: MembershipFunction,
    ) -> Result<Self, ConfigError> {
        self.add_term(name, shape)?;
        Ok(self)
    }

    /// Variable name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sample axis.
    pub fn universe(&self) -> &Universe {
        &self.universe
    }

    /// Input or output role.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Defuzzification method, `None` for antecedents.
    pub fn defuzz_method(&self) -> Option<DefuzzMethod> {
        match self.role {
            Role::Consequent(m) => Some(m),
            Role::Antecedent => None,
        }
    }

    /// Terms in registration order.
    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    /// Index of the named term.
    pub fn term_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Term at `index`.
    pub fn term(&self, index: usize) -> Option<&Term> {
        self.terms.get(index)
    }

    /// Degrees of every term at `x` (clamped to the universe), analytic mode.
    pub fn fuzzify(&self, x: f64) -> Degrees {
        self.fuzzify_with(x, Fuzzification::Analytic)
    }

    /// Degrees of every term at `x` (clamped to the universe).
    pub fn fuzzify_with(&self, x: f64, mode: Fuzzification) -> Degrees {
        let x = self.universe.clamp(x);
        self.terms
            .iter()
            .map(|t| match mode {
                Fuzzification::Analytic => t.shape.evaluate(x),
                Fuzzification::Sampled => self.universe.interpolate(&t.curve, x).clamp(0.0, 1.0),
            })
            .collect()
    }

    /// Degrees at `x` paired with term names.
    pub fn fuzzify_named(&self, x: f64) -> impl Iterator<Item = (&str, f64)> + '_ {
        let degrees = self.fuzzify(x);
        self.terms
            .iter()
            .zip(degrees)
            .map(|(t, d)| (t.name.as_str(), d))
    }
}
