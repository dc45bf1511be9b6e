//! Mamdani inference engine.
//!
//! Configuration and computation are split:
//!
//! - [`InferenceSystem`] — inputs, output and rules, validated and resolved to
//!   indices once by [`InferenceSystemBuilder::build`]. Immutable afterwards,
//!   so one system can serve any number of threads without locking.
//! - [`InferenceSession`] — created per decision, borrows the system
//!   read-only and owns every intermediate value. Dropped after use.
//!
//! # Session phases
//!
//! ```text
//! Idle ──fuzzify──▶ Fuzzified ──evaluate_rules──▶ RulesEvaluated
//!                                                      │
//!      Defuzzified ◀──defuzzify── Aggregated ◀──aggregate
//! ```
//!
//! Calling a step out of order returns [`Error::PhaseOrder`].
//!
//! # Aggregation
//!
//! Per output term the activation is the max of the firing strengths of the
//! rules that target it. Each term curve is clipped at its activation and the
//! clipped curves are merged by pointwise max. The x axis is the output
//! universe plus every point where a sampled term curve crosses its clip
//! level, so max-based defuzzifiers see the true edge of each plateau instead
//! of the nearest universe sample.

use alloc::string::String;
use alloc::vec::Vec;

use log::{debug, trace, warn};

use crate::error::{ConfigError, Error, Result};
use crate::rule::{CompiledExpr, Rule, TermId, TermRef};
use crate::variable::{Degrees, Fuzzification, LinguisticVariable, Role};

/// Maximum number of input variables.
pub const MAX_INPUTS: usize = 4;

/// Maximum number of rules.
pub const MAX_RULES: usize = 32;

/// Degrees within this distance of a clip level are treated as reaching it.
const CLIP_EPSILON: f64 = 1e-12;

/// What to return when the aggregated output set is zero everywhere.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NoRuleFired {
    /// Fail the call with [`Error::NoRuleFired`].
    #[default]
    Error,
    /// Return this crisp value instead (logged at `warn`).
    Fallback(f64),
}

// ─── InferenceSystem ─────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
struct CompiledRule {
    antecedent: CompiledExpr,
    /// Index of the consequent term in the output variable.
    consequent: usize,
}

/// Validated, immutable inference configuration.
#[derive(Clone, Debug)]
pub struct InferenceSystem {
    inputs: Vec<LinguisticVariable>,
    output: LinguisticVariable,
    rules: Vec<Rule>,
    compiled: Vec<CompiledRule>,
    fuzzification: Fuzzification,
    on_no_rule_fired: NoRuleFired,
}

/// Collects variables and rules, then validates them in [`build`](Self::build).
#[derive(Debug, Default)]
pub struct InferenceSystemBuilder {
    inputs: Vec<LinguisticVariable>,
    output: Option<LinguisticVariable>,
    rules: Vec<Rule>,
    fuzzification: Fuzzification,
    on_no_rule_fired: NoRuleFired,
}

impl InferenceSystemBuilder {
    /// Empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an input variable. Crisp inputs are passed in this order.
    pub fn input(mut self, variable: LinguisticVariable) -> Self {
        self.inputs.push(variable);
        self
    }

    /// Set the output variable; must have the consequent role.
    pub fn output(mut self, variable: LinguisticVariable) -> Self {
        self.output = Some(variable);
        self
    }

    /// Append a rule.
    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Append several rules.
    pub fn rules(mut self, rules: impl IntoIterator<Item = Rule>) -> Self {
        self.rules.extend(rules);
        self
    }

    /// Choose analytic or sampled fuzzification.
    pub fn fuzzification(mut self, mode: Fuzzification) -> Self {
        self.fuzzification = mode;
        self
    }

    /// Policy for an all-zero aggregated set. A fallback must be finite and
    /// inside the output universe, checked in [`build`](Self::build).
    pub fn on_no_rule_fired(mut self, policy: NoRuleFired) -> Self {
        self.on_no_rule_fired = policy;
        self
    }

    /// Validate and resolve everything.
    ///
    /// Fails on: missing or non-consequent output, duplicate variable names,
    /// variables without terms, capacity overflow, no rules, a fallback
    /// outside the output universe, or any rule that names an unknown
    /// variable or term.
    pub fn build(self) -> core::result::Result<InferenceSystem, ConfigError> {
        let output = self.output.ok_or(ConfigError::MissingOutput)?;
        if !matches!(output.role(), Role::Consequent(_)) {
            return Err(ConfigError::NotAConsequent(output.name().into()));
        }
        if self.inputs.len() > MAX_INPUTS {
            return Err(ConfigError::TooManyInputs(MAX_INPUTS));
        }
        if self.rules.is_empty() {
            return Err(ConfigError::NoRules);
        }
        if self.rules.len() > MAX_RULES {
            return Err(ConfigError::TooManyRules(MAX_RULES));
        }

        for (i, var) in self.inputs.iter().enumerate() {
            if var.role() != Role::Antecedent {
                return Err(ConfigError::NotAnAntecedent(var.name().into()));
            }
            let clash = self.inputs[..i].iter().any(|v| v.name() == var.name())
                || var.name() == output.name();
            if clash {
                return Err(ConfigError::DuplicateVariable(var.name().into()));
            }
        }
        for var in self.inputs.iter().chain(core::iter::once(&output)) {
            if var.terms().is_empty() {
                return Err(ConfigError::NoTerms(var.name().into()));
            }
        }
        if let NoRuleFired::Fallback(value) = self.on_no_rule_fired {
            let (min, max) = (output.universe().min(), output.universe().max());
            if !value.is_finite() || value < min || value > max {
                return Err(ConfigError::InvalidFallback { value, min, max });
            }
        }

        let inputs = self.inputs;
        let resolve = |r: &TermRef| -> core::result::Result<TermId, ConfigError> {
            let var = inputs
                .iter()
                .position(|v| v.name() == r.variable)
                .ok_or_else(|| ConfigError::UnknownVariable(r.variable.clone()))?;
            let term = inputs[var]
                .term_index(&r.term)
                .ok_or_else(|| unknown_term(r))?;
            Ok(TermId { var, term })
        };

        let mut compiled = Vec::with_capacity(self.rules.len());
        for rule in &self.rules {
            let antecedent = CompiledExpr::compile(rule.antecedent(), &resolve)?;
            let target = rule.consequent();
            if target.variable != output.name() {
                return Err(if inputs.iter().any(|v| v.name() == target.variable) {
                    ConfigError::NotAConsequent(target.variable.clone())
                } else {
                    ConfigError::UnknownVariable(target.variable.clone())
                });
            }
            let consequent = output.term_index(&target.term).ok_or_else(|| unknown_term(target))?;
            compiled.push(CompiledRule { antecedent, consequent });
        }

        debug!(
            "inference system built: {} inputs, output '{}' ({} samples), {} rules, {:?} fuzzification",
            inputs.len(),
            output.name(),
            output.universe().len(),
            compiled.len(),
            self.fuzzification,
        );

        Ok(InferenceSystem {
            inputs,
            output,
            rules: self.rules,
            compiled,
            fuzzification: self.fuzzification,
            on_no_rule_fired: self.on_no_rule_fired,
        })
    }
}

fn unknown_term(r: &TermRef) -> ConfigError {
    ConfigError::UnknownTerm { variable: r.variable.clone(), term: r.term.clone() }
}

impl InferenceSystem {
    /// Start a builder.
    pub fn builder() -> InferenceSystemBuilder {
        InferenceSystemBuilder::new()
    }

    /// Input variables in crisp-input order.
    pub fn inputs(&self) -> &[LinguisticVariable] {
        &self.inputs
    }

    /// Output variable.
    pub fn output(&self) -> &LinguisticVariable {
        &self.output
    }

    /// Rules as authored.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Fuzzification mode.
    pub fn fuzzification(&self) -> Fuzzification {
        self.fuzzification
    }

    /// No-rule-fired policy.
    pub fn no_rule_fired_policy(&self) -> NoRuleFired {
        self.on_no_rule_fired
    }

    /// Fresh session bound to this system.
    pub fn session(&self) -> InferenceSession<'_> {
        InferenceSession::new(self)
    }

    /// Run a full inference for one set of crisp inputs.
    pub fn infer(&self, inputs: &[f64]) -> Result<f64> {
        self.session().run(inputs)
    }
}

// ─── Aggregated output set ──────────────────────────────────────────────────

/// Combined, clipped output fuzzy set as parallel `x` / degree vectors.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AggregatedSet {
    xs: Vec<f64>,
    degrees: Vec<f64>,
}

impl AggregatedSet {
    /// Sample positions, strictly increasing.
    pub fn xs(&self) -> &[f64] {
        &self.xs
    }

    /// Degree at each sample position.
    pub fn degrees(&self) -> &[f64] {
        &self.degrees
    }

    /// `(x, degree)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.xs.iter().copied().zip(self.degrees.iter().copied())
    }

    /// Largest degree, `0.0` for an empty set.
    pub fn peak(&self) -> f64 {
        self.degrees.iter().copied().fold(0.0, f64::max)
    }

    /// `true` when every degree is zero.
    pub fn is_empty_set(&self) -> bool {
        self.peak() <= 0.0
    }

    /// Number of sample positions.
    pub fn len(&self) -> usize {
        self.xs.len()
    }

    /// `true` when there are no sample positions (before aggregation).
    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }
}

// ─── InferenceSession ────────────────────────────────────────────────────────

/// Progress of an [`InferenceSession`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Phase {
    /// Nothing computed yet.
    Idle,
    /// Crisp inputs validated and fuzzified.
    Fuzzified,
    /// Firing strength known for every rule.
    RulesEvaluated,
    /// Output set built.
    Aggregated,
    /// Crisp output produced.
    Defuzzified,
}

/// Per-call inference state. Borrows the system, owns everything else.
#[derive(Clone, Debug)]
pub struct InferenceSession<'s> {
    system: &'s InferenceSystem,
    phase: Phase,
    crisp_inputs: heapless::Vec<f64, MAX_INPUTS>,
    degrees: heapless::Vec<Degrees, MAX_INPUTS>,
    strengths: heapless::Vec<f64, MAX_RULES>,
    activations: Degrees,
    output: AggregatedSet,
    crisp: Option<f64>,
}

impl<'s> InferenceSession<'s> {
    /// Session in the [`Phase::Idle`] state.
    pub fn new(system: &'s InferenceSystem) -> Self {
        Self {
            system,
            phase: Phase::Idle,
            crisp_inputs: heapless::Vec::new(),
            degrees: heapless::Vec::new(),
            strengths: heapless::Vec::new(),
            activations: Degrees::new(),
            output: AggregatedSet::default(),
            crisp: None,
        }
    }

    fn expect_phase(&self, expected: Phase) -> Result<()> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(Error::PhaseOrder { expected, actual: self.phase })
        }
    }

    /// Validate and fuzzify one crisp value per input variable.
    ///
    /// Rejects non-finite values with [`Error::InvalidInput`]; finite values
    /// outside a universe are clamped to it.
    pub fn fuzzify(&mut self, inputs: &[f64]) -> Result<()> {
        self.expect_phase(Phase::Idle)?;
        let vars = &self.system.inputs;
        if inputs.len() != vars.len() {
            return Err(Error::InputArity { expected: vars.len(), actual: inputs.len() });
        }
        for (var, &value) in vars.iter().zip(inputs) {
            if !value.is_finite() {
                return Err(Error::InvalidInput { variable: var.name().into(), value });
            }
        }

        for (var, &value) in vars.iter().zip(inputs) {
            let d = var.fuzzify_with(value, self.system.fuzzification);
            trace!("fuzzify {}={} -> {:?}", var.name(), value, d.as_slice());
            // Capacities match MAX_INPUTS, which build() enforces.
            let _ = self.crisp_inputs.push(value);
            let _ = self.degrees.push(d);
        }
        self.phase = Phase::Fuzzified;
        Ok(())
    }

    /// Compute every rule's firing strength.
    pub fn evaluate_rules(&mut self) -> Result<()> {
        self.expect_phase(Phase::Fuzzified)?;
        for (i, rule) in self.system.compiled.iter().enumerate() {
            let strength = rule
                .antecedent
                .evaluate(&self.degrees)
                .map_err(|id| self.unknown_term(id))?;
            trace!("rule {} fires at {}", i + 1, strength);
            let _ = self.strengths.push(strength);
        }
        self.phase = Phase::RulesEvaluated;
        Ok(())
    }

    fn unknown_term(&self, id: TermId) -> Error {
        let var = self.system.inputs.get(id.var);
        Error::UnknownTerm {
            variable: var.map(|v| String::from(v.name())).unwrap_or_default(),
            term: var
                .and_then(|v| v.term(id.term))
                .map(|t| String::from(t.name()))
                .unwrap_or_default(),
        }
    }

    /// Max-combine strengths per output term, clip, and merge the curves.
    pub fn aggregate(&mut self) -> Result<()> {
        self.expect_phase(Phase::RulesEvaluated)?;
        let output = &self.system.output;

        let mut activations: Degrees = output.terms().iter().map(|_| 0.0).collect();
        for (rule, &strength) in self.system.compiled.iter().zip(&self.strengths) {
            let slot = &mut activations[rule.consequent];
            *slot = slot.max(strength);
        }
        trace!("term activations {:?}", activations.as_slice());

        let samples = output.universe().samples();
        let mut xs: Vec<f64> = samples.to_vec();
        for (term, &level) in output.terms().iter().zip(&activations) {
            if level > 0.0 && level < 1.0 {
                push_crossings(samples, term.curve(), level, &mut xs);
            }
        }
        xs.sort_by(f64::total_cmp);
        xs.dedup();

        let degrees = xs
            .iter()
            .map(|&x| {
                output
                    .terms()
                    .iter()
                    .zip(&activations)
                    .map(|(term, &level)| clip(output.universe().interpolate(term.curve(), x), level))
                    .fold(0.0, f64::max)
            })
            .collect();

        self.activations = activations;
        self.output = AggregatedSet { xs, degrees };
        self.phase = Phase::Aggregated;
        Ok(())
    }

    /// Collapse the aggregated set to a crisp value.
    ///
    /// An all-zero set follows the system's [`NoRuleFired`] policy.
    pub fn defuzzify(&mut self) -> Result<f64> {
        self.expect_phase(Phase::Aggregated)?;
        let output = &self.system.output;
        let method = output.defuzz_method().unwrap_or_default();

        let value = match method.apply(self.output.xs(), self.output.degrees()) {
            Some(v) => v,
            None => match self.system.on_no_rule_fired {
                NoRuleFired::Error => return Err(Error::NoRuleFired),
                NoRuleFired::Fallback(v) => {
                    warn!(
                        "no rule fired for inputs {:?}; using fallback {}",
                        self.crisp_inputs.as_slice(),
                        v
                    );
                    v
                }
            },
        };
        trace!("defuzzify ({}) -> {}", method, value);

        self.crisp = Some(value);
        self.phase = Phase::Defuzzified;
        Ok(value)
    }

    /// All four steps in order.
    pub fn run(&mut self, inputs: &[f64]) -> Result<f64> {
        self.fuzzify(inputs)?;
        self.evaluate_rules()?;
        self.aggregate()?;
        self.defuzzify()
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The system this session runs against.
    pub fn system(&self) -> &'s InferenceSystem {
        self.system
    }

    /// Crisp inputs as validated (before clamping).
    pub fn crisp_inputs(&self) -> &[f64] {
        &self.crisp_inputs
    }

    /// Fuzzified degrees of input `var`, empty before [`Phase::Fuzzified`].
    pub fn degrees(&self, var: usize) -> &[f64] {
        self.degrees.get(var).map_or(&[], |d| d.as_slice())
    }

    /// Degree of `variable IS term` after fuzzification.
    pub fn degree(&self, variable: &str, term: &str) -> Option<f64> {
        let var = self.system.inputs.iter().position(|v| v.name() == variable)?;
        let idx = self.system.inputs[var].term_index(term)?;
        self.degrees.get(var)?.get(idx).copied()
    }

    /// Firing strength per rule, in rule order.
    pub fn firing_strengths(&self) -> &[f64] {
        &self.strengths
    }

    /// Clip level per output term, in term order.
    pub fn term_activations(&self) -> &[f64] {
        &self.activations
    }

    /// Aggregated output set (empty before [`Phase::Aggregated`]).
    pub fn output_set(&self) -> &AggregatedSet {
        &self.output
    }

    /// Crisp output once defuzzified.
    pub fn crisp(&self) -> Option<f64> {
        self.crisp
    }
}

/// Mamdani implication: cap `mu` at `level`.
#[inline]
fn clip(mu: f64, level: f64) -> f64 {
    if mu >= level - CLIP_EPSILON { level } else { mu }
}

/// Append the x positions where the piecewise-linear `curve` crosses `level`
/// strictly between two samples.
fn push_crossings(samples: &[f64], curve: &[f64], level: f64, out: &mut Vec<f64>) {
    for i in 1..samples.len() {
        let (y0, y1) = (curve[i - 1], curve[i]);
        if (y0 - level) * (y1 - level) < 0.0 {
            let (x0, x1) = (samples[i - 1], samples[i]);
            out.push(x0 + (level - y0) * (x1 - x0) / (y1 - y0));
        }
    }
}
