//! Mixed-initiative LOA controller — the fixed two-input, three-rule switcher.
//!
//! Inputs: tracking-error magnitude (`error`, `[0, 0.1]`) and robot linear
//! velocity (`speed`, `[-0.4, 0.4]`). Output: `loa` in `[-1, 1]`, where the
//! `no_change` term sits on the negative half and `change` on the positive
//! half. Where to threshold the score is the caller's policy.
//!
//! # Rule base
//!
//! ```text
//! 1. error IS small OR error IS medium           → loa IS no_change
//! 2. error IS large AND NOT (speed IS reverse)   → loa IS change
//! 3. speed IS reverse AND error IS large         → loa IS no_change
//! ```
//!
//! Rule 3 is the mixed-initiative override: a large error while the robot is
//! reversing does not hand over control.
//!
//! # Example
//!
//! ```rust
//! use mi_fuzzy_core::controller::MixedInitiativeController;
//!
//! let mi = MixedInitiativeController::new().unwrap();
//! assert!(mi.decide(0.09, 0.3).unwrap() > 0.0);   // large error, driving forward
//! assert!(mi.decide(0.09, -0.2).unwrap() <= 0.0); // large error, reversing
//! ```

use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use crate::defuzz::DefuzzMethod;
use crate::engine::{AggregatedSet, InferenceSystem, NoRuleFired};
use crate::error::{ConfigError, Result};
use crate::membership::MembershipFunction;
use crate::rule::{is, Rule, TermRef};
use crate::universe::Universe;
use crate::variable::{Fuzzification, LinguisticVariable};

/// Name of the tracking-error input.
pub const ERROR_VAR: &str = "error";
/// Name of the speed input.
pub const SPEED_VAR: &str = "speed";
/// Name of the LOA output.
pub const LOA_VAR: &str = "loa";

// ─── Term tags ───────────────────────────────────────────────────────────────

/// Terms of the tracking-error input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorTerm {
    /// Robot is tracking its goal well.
    Small,
    /// Noticeable drift.
    Medium,
    /// Robot is failing to track.
    Large,
}

impl ErrorTerm {
    /// All terms, in registration order.
    pub const ALL: [ErrorTerm; 3] = [ErrorTerm::Small, ErrorTerm::Medium, ErrorTerm::Large];

    /// Term name used in the rule base.
    pub fn name(&self) -> &'static str {
        match self {
            ErrorTerm::Small => "small",
            ErrorTerm::Medium => "medium",
            ErrorTerm::Large => "large",
        }
    }
}

/// Terms of the speed input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SpeedTerm {
    /// Driving backwards.
    Reverse,
    /// Roughly stationary.
    Zero,
    /// Driving forwards.
    Forward,
}

impl SpeedTerm {
    /// All terms, in registration order.
    pub const ALL: [SpeedTerm; 3] = [SpeedTerm::Reverse, SpeedTerm::Zero, SpeedTerm::Forward];

    /// Term name used in the rule base.
    pub fn name(&self) -> &'static str {
        match self {
            SpeedTerm::Reverse => "reverse",
            SpeedTerm::Zero => "zero",
            SpeedTerm::Forward => "forward",
        }
    }
}

/// Terms of the LOA output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LoaTerm {
    /// Keep the current level of autonomy.
    NoChange,
    /// Switch level of autonomy.
    Change,
}

impl LoaTerm {
    /// All terms, in registration order.
    pub const ALL: [LoaTerm; 2] = [LoaTerm::NoChange, LoaTerm::Change];

    /// Term name used in the rule base.
    pub fn name(&self) -> &'static str {
        match self {
            LoaTerm::NoChange => "no_change",
            LoaTerm::Change => "change",
        }
    }
}

fn error_is(t: ErrorTerm) -> crate::rule::Expr {
    is(ERROR_VAR, t.name())
}

fn speed_is(t: SpeedTerm) -> crate::rule::Expr {
    is(SPEED_VAR, t.name())
}

fn loa(t: LoaTerm) -> TermRef {
    TermRef::new(LOA_VAR, t.name())
}

/// The fixed three-rule base.
pub fn rule_base() -> Vec<Rule> {
    vec![
        Rule::new(error_is(ErrorTerm::Small) | error_is(ErrorTerm::Medium), loa(LoaTerm::NoChange))
            .with_label("tracking fine"),
        Rule::new(error_is(ErrorTerm::Large) & !speed_is(SpeedTerm::Reverse), loa(LoaTerm::Change))
            .with_label("hand over"),
        Rule::new(speed_is(SpeedTerm::Reverse) & error_is(ErrorTerm::Large), loa(LoaTerm::NoChange))
            .with_label("reversing override"),
    ]
}

// ─── Configuration ───────────────────────────────────────────────────────────

/// One named membership term.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TermConfig {
    /// Term name.
    pub name: String,
    /// Membership shape.
    pub shape: MembershipFunction,
}

impl TermConfig {
    fn new(name: &str, shape: MembershipFunction) -> Self {
        Self { name: name.into(), shape }
    }
}

/// Universe and terms of one variable.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VariableConfig {
    /// Universe lower bound.
    pub min: f64,
    /// Universe upper bound.
    pub max: f64,
    /// Universe sample spacing.
    pub step: f64,
    /// Terms in registration order.
    pub terms: Vec<TermConfig>,
}

impl VariableConfig {
    fn universe(&self) -> core::result::Result<Universe, ConfigError> {
        Universe::new(self.min, self.max, self.step)
    }

    fn fill(
        &self,
        mut var: LinguisticVariable,
    ) -> core::result::Result<LinguisticVariable, ConfigError> {
        for t in &self.terms {
            var.add_term(t.name.clone(), t.shape)?;
        }
        Ok(var)
    }
}

/// Everything fixed at controller construction.
///
/// [`Default`] is the reference tuning from the shared-control experiments.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ControllerConfig {
    /// Tracking-error input.
    pub error: VariableConfig,
    /// Speed input.
    pub speed: VariableConfig,
    /// LOA output.
    pub loa: VariableConfig,
    /// Defuzzification of the LOA output.
    pub defuzz: DefuzzMethod,
    /// Analytic or sampled fuzzification.
    pub fuzzification: Fuzzification,
    /// Behaviour when no rule fires.
    pub on_no_rule_fired: NoRuleFired,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        use MembershipFunction::{Trapezoid, Triangle};
        Self {
            error: VariableConfig {
                min: 0.0,
                max: 0.1,
                step: 0.005,
                terms: vec![
                    TermConfig::new("small", Trapezoid { a: 0.0, b: 0.0, c: 0.035, d: 0.060 }),
                    TermConfig::new("medium", Trapezoid { a: 0.045, b: 0.055, c: 0.065, d: 0.080 }),
                    TermConfig::new("large", Trapezoid { a: 0.065, b: 0.085, c: 0.1, d: 0.1 }),
                ],
            },
            speed: VariableConfig {
                min: -0.4,
                max: 0.4,
                step: 0.05,
                terms: vec![
                    TermConfig::new("reverse", Trapezoid { a: -0.4, b: -0.4, c: -0.03, d: -0.02 }),
                    TermConfig::new("zero", Triangle { a: -0.03, b: 0.0, c: 0.03 }),
                    TermConfig::new("forward", Trapezoid { a: 0.02, b: 0.03, c: 0.4, d: 0.4 }),
                ],
            },
            loa: VariableConfig {
                min: -1.0,
                max: 1.0,
                step: 0.25,
                terms: vec![
                    TermConfig::new("no_change", Triangle { a: -1.0, b: -1.0, c: 0.0 }),
                    TermConfig::new("change", Triangle { a: 0.0, b: 1.0, c: 1.0 }),
                ],
            },
            defuzz: DefuzzMethod::LargestOfMaximum,
            fuzzification: Fuzzification::Analytic,
            on_no_rule_fired: NoRuleFired::Error,
        }
    }
}

// ─── Decision ────────────────────────────────────────────────────────────────

/// Degrees of every term of one input variable.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VariableDegrees {
    /// Variable name.
    pub variable: String,
    /// `(term, degree)` in registration order.
    pub terms: Vec<(String, f64)>,
}

/// A crisp decision with the intermediate values that produced it.
///
/// Owned data, so it can be handed to a plotter or logger after the
/// session is gone.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Decision {
    /// Crisp LOA score in the output universe.
    pub value: f64,
    /// Fuzzified inputs.
    pub inputs: Vec<VariableDegrees>,
    /// Firing strength of each rule, in rule-base order.
    pub rule_strengths: Vec<f64>,
    /// Clip level of each output term.
    pub activations: Vec<(String, f64)>,
    /// Aggregated output set that was defuzzified.
    pub output: AggregatedSet,
}

impl Decision {
    /// Degree of `variable IS term`, if both exist.
    pub fn degree(&self, variable: &str, term: &str) -> Option<f64> {
        self.inputs
            .iter()
            .find(|v| v.variable == variable)?
            .terms
            .iter()
            .find(|(t, _)| t == term)
            .map(|&(_, d)| d)
    }

    /// Clip level of output term `term`.
    pub fn activation(&self, term: LoaTerm) -> Option<f64> {
        self.activations
            .iter()
            .find(|(t, _)| t == term.name())
            .map(|&(_, d)| d)
    }
}

// ─── Controller ──────────────────────────────────────────────────────────────

/// Builds the inference system once; every call runs its own session.
///
/// `Send + Sync`: share one controller across threads by reference or `Arc`.
#[derive(Clone, Debug)]
pub struct MixedInitiativeController {
    system: InferenceSystem,
}

impl MixedInitiativeController {
    /// Controller with the reference configuration.
    pub fn new() -> core::result::Result<Self, ConfigError> {
        Self::with_config(&ControllerConfig::default())
    }

    /// Controller with a custom tuning. The rule base is fixed, so the config
    /// must define every term it names.
    pub fn with_config(config: &ControllerConfig) -> core::result::Result<Self, ConfigError> {
        let error = config
            .error
            .fill(LinguisticVariable::antecedent(ERROR_VAR, config.error.universe()?))?;
        let speed = config
            .speed
            .fill(LinguisticVariable::antecedent(SPEED_VAR, config.speed.universe()?))?;
        let loa = config
            .loa
            .fill(LinguisticVariable::consequent(LOA_VAR, config.loa.universe()?, config.defuzz))?;

        let system = InferenceSystem::builder()
            .input(error)
            .input(speed)
            .output(loa)
            .rules(rule_base())
            .fuzzification(config.fuzzification)
            .on_no_rule_fired(config.on_no_rule_fired)
            .build()?;
        Ok(Self { system })
    }

    /// Crisp LOA score for one control cycle.
    ///
    /// Non-finite inputs fail with [`Error::InvalidInput`](crate::Error::InvalidInput);
    /// finite inputs outside their universe are clamped.
    pub fn decide(&self, error: f64, speed: f64) -> Result<f64> {
        self.system.infer(&[error, speed])
    }

    /// Like [`decide`](Self::decide), also returning the intermediate values.
    pub fn decide_detailed(&self, error: f64, speed: f64) -> Result<Decision> {
        let mut session = self.system.session();
        let value = session.run(&[error, speed])?;

        let inputs = self
            .system
            .inputs()
            .iter()
            .enumerate()
            .map(|(i, var)| VariableDegrees {
                variable: var.name().into(),
                terms: var
                    .terms()
                    .iter()
                    .zip(session.degrees(i))
                    .map(|(t, &d)| (String::from(t.name()), d))
                    .collect(),
            })
            .collect();
        let activations = self
            .system
            .output()
            .terms()
            .iter()
            .zip(session.term_activations())
            .map(|(t, &d)| (String::from(t.name()), d))
            .collect();

        Ok(Decision {
            value,
            inputs,
            rule_strengths: session.firing_strengths().to_vec(),
            activations,
            output: session.output_set().clone(),
        })
    }

    /// The shared, immutable inference system.
    pub fn system(&self) -> &InferenceSystem {
        &self.system
    }
}
