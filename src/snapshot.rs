//! Serialisable view of a controller for plotting and logging.
//!
//! A [`ControllerSnapshot`] captures every variable (universe, term shapes,
//! sampled curves), the rule base as text, and optionally the last
//! [`Decision`] with its aggregated output set. It is a one-way export for an
//! external plotter: there is no `restore`, rebuild from a
//! [`ControllerConfig`](crate::controller::ControllerConfig) instead.
//!
//! # Example
//!
//! ```rust,ignore
//! use mi_fuzzy_core::controller::MixedInitiativeController;
//! use mi_fuzzy_core::snapshot::ControllerSnapshot;
//!
//! let mi = MixedInitiativeController::new()?;
//! let decision = mi.decide_detailed(0.04, 0.2)?;
//! let snap = ControllerSnapshot::from_system(mi.system()).with_decision(decision);
//! let json = serde_json::to_string(&snap)?;
//! ```
//!
//! # no_std
//!
//! Requires the `serde` feature; uses `alloc` only.

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use crate::controller::Decision;
use crate::defuzz::DefuzzMethod;
use crate::engine::InferenceSystem;
use crate::membership::MembershipFunction;
use crate::variable::{LinguisticVariable, Term};

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u16 = 1;

/// Whole-controller export.
#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq)]
pub struct ControllerSnapshot {
    /// Always [`SNAPSHOT_VERSION`] for newly created snapshots.
    pub version: u16,
    /// Input variables, in crisp-input order.
    pub inputs: Vec<VariableRecord>,
    /// Output variable.
    pub output: VariableRecord,
    /// Rules rendered as `IF … THEN …`, in rule-base order.
    pub rules: Vec<RuleRecord>,
    /// Most recent decision, if one was attached.
    pub decision: Option<Decision>,
}

/// One variable with its sampled axis and terms.
#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq)]
pub struct VariableRecord {
    /// Variable name.
    pub name: String,
    /// Universe sample positions.
    pub samples: Vec<f64>,
    /// Defuzzification method, outputs only.
    pub defuzz: Option<DefuzzMethod>,
    /// Terms in registration order.
    pub terms: Vec<TermRecord>,
}

/// One membership term.
#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq)]
pub struct TermRecord {
    /// Term name.
    pub name: String,
    /// Closed-form shape.
    pub shape: MembershipFunction,
    /// Degree at each entry of [`VariableRecord::samples`].
    pub curve: Vec<f64>,
}

/// One rule, labelled and rendered.
#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq)]
pub struct RuleRecord {
    /// Optional label.
    pub label: Option<String>,
    /// Human-readable form.
    pub text: String,
}

impl From<&Term> for TermRecord {
    fn from(t: &Term) -> Self {
        Self {
            name: t.name().into(),
            shape: *t.shape(),
            curve: t.curve().to_vec(),
        }
    }
}

impl From<&LinguisticVariable> for VariableRecord {
    fn from(v: &LinguisticVariable) -> Self {
        Self {
            name: v.name().into(),
            samples: v.universe().samples().to_vec(),
            defuzz: v.defuzz_method(),
            terms: v.terms().iter().map(TermRecord::from).collect(),
        }
    }
}

impl ControllerSnapshot {
    /// Export the configuration of `system`, without a decision.
    pub fn from_system(system: &InferenceSystem) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            inputs: system.inputs().iter().map(VariableRecord::from).collect(),
            output: VariableRecord::from(system.output()),
            rules: system
                .rules()
                .iter()
                .map(|r| RuleRecord {
                    label: r.label().map(String::from),
                    text: r.to_string(),
                })
                .collect(),
            decision: None,
        }
    }

    /// Attach the decision to plot alongside the curves.
    pub fn with_decision(mut self, decision: Decision) -> Self {
        self.decision = Some(decision);
        self
    }

    /// Look up a variable (input or output) by name.
    pub fn variable(&self, name: &str) -> Option<&VariableRecord> {
        self.inputs
            .iter()
            .chain(core::iter::once(&self.output))
            .find(|v| v.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::MixedInitiativeController;

    #[test]
    fn snapshot_mirrors_the_reference_controller() {
        let mi = MixedInitiativeController::new().unwrap();
        let snap = ControllerSnapshot::from_system(mi.system());
        assert_eq!(snap.version, SNAPSHOT_VERSION);
        assert_eq!(snap.inputs.len(), 2);
        assert_eq!(snap.rules.len(), 3);
        assert!(snap.decision.is_none());

        let error = snap.variable("error").unwrap();
        assert_eq!(error.samples.len(), 21);
        assert_eq!(error.defuzz, None);
        assert!(error.terms.iter().all(|t| t.curve.len() == 21));

        let loa = snap.variable("loa").unwrap();
        assert_eq!(loa.defuzz, Some(DefuzzMethod::LargestOfMaximum));
        assert_eq!(loa.terms[1].name, "change");
    }

    #[test]
    fn decision_is_attached() {
        let mi = MixedInitiativeController::new().unwrap();
        let d = mi.decide_detailed(0.09, 0.3).unwrap();
        let snap = ControllerSnapshot::from_system(mi.system()).with_decision(d.clone());
        assert_eq!(snap.decision, Some(d));
        assert_eq!(snap.rules[2].label.as_deref(), Some("reversing override"));
    }
}
