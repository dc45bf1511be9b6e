//! Error types for configuration and per-call inference failures.
//!
//! Two layers:
//!
//! - [`ConfigError`] — malformed universes, shapes, duplicate terms or rules
//!   that reference something unregistered. Raised while building an
//!   [`InferenceSystem`](crate::engine::InferenceSystem); the system is never
//!   produced in that case.
//! - [`Error`] — everything a single `decide` / `infer` call can return.
//!   Per-call errors never touch the shared configuration.

use alloc::string::String;

use crate::engine::Phase;

/// Configuration error — detected at construction time, always fatal.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// Universe bounds are non-finite or not strictly ordered.
    #[error("universe range must satisfy min < max, got [{min}, {max}]")]
    InvalidUniverseRange {
        /// Lower bound as given.
        min: f64,
        /// Upper bound as given.
        max: f64,
    },

    /// Universe step is zero, negative or non-finite.
    #[error("universe step must be positive and finite, got {0}")]
    InvalidUniverseStep(f64),

    /// `(max − min) / step` exceeds [`MAX_SAMPLES`](crate::universe::MAX_SAMPLES).
    #[error("universe would need more than {limit} samples")]
    TooManySamples {
        /// Capacity limit.
        limit: usize,
    },

    /// A membership function breakpoint is NaN or infinite.
    #[error("membership breakpoint must be finite, got {0}")]
    NonFiniteBreakpoint(f64),

    /// Membership function breakpoints are not non-decreasing.
    #[error("membership breakpoints must be non-decreasing, got {0:?}")]
    BreakpointOrder(alloc::vec::Vec<f64>),

    /// A term name was registered twice on the same variable.
    #[error("term '{term}' already registered on variable '{variable}'")]
    DuplicateTerm {
        /// Variable the term was added to.
        variable: String,
        /// Offending term name.
        term: String,
    },

    /// Variable already holds [`MAX_TERMS`](crate::variable::MAX_TERMS) terms.
    #[error("variable '{variable}' cannot hold more than {limit} terms")]
    TooManyTerms {
        /// Variable that overflowed.
        variable: String,
        /// Capacity limit.
        limit: usize,
    },

    /// More input variables than [`MAX_INPUTS`](crate::engine::MAX_INPUTS).
    #[error("at most {0} input variables are supported")]
    TooManyInputs(usize),

    /// More rules than [`MAX_RULES`](crate::engine::MAX_RULES).
    #[error("at most {0} rules are supported")]
    TooManyRules(usize),

    /// Two input variables share a name, or an input shares the output's name.
    #[error("variable '{0}' registered more than once")]
    DuplicateVariable(String),

    /// A rule names a variable that is not part of the system.
    #[error("rule references unknown variable '{0}'")]
    UnknownVariable(String),

    /// A rule names a term the variable does not define.
    #[error("rule references unknown term '{term}' on variable '{variable}'")]
    UnknownTerm {
        /// Variable name from the rule.
        variable: String,
        /// Term name from the rule.
        term: String,
    },

    /// The output variable was built with the antecedent role, or a rule
    /// consequent names an input variable.
    #[error("variable '{0}' is not a consequent")]
    NotAConsequent(String),

    /// An input variable was built with the consequent role.
    #[error("input variable '{0}' must be an antecedent")]
    NotAnAntecedent(String),

    /// The variable has no terms at all.
    #[error("variable '{0}' has no terms")]
    NoTerms(String),

    /// Defuzzification method name not recognised.
    #[error("unknown defuzzification method '{0}'")]
    UnknownDefuzzMethod(String),

    /// The system was built without an output variable.
    #[error("inference system needs an output variable")]
    MissingOutput,

    /// The no-rule-fired fallback is non-finite or outside the output universe.
    #[error("fallback {value} must be finite and within [{min}, {max}]")]
    InvalidFallback {
        /// Rejected fallback value.
        value: f64,
        /// Output universe lower bound.
        min: f64,
        /// Output universe upper bound.
        max: f64,
    },

    /// The system was built without any rules.
    #[error("inference system needs at least one rule")]
    NoRules,
}

/// Error returned by inference and by the controller facade.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum Error {
    /// Construction failed; see [`ConfigError`].
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A crisp input was NaN or infinite.
    #[error("input '{variable}' must be finite, got {value}")]
    InvalidInput {
        /// Input variable name.
        variable: String,
        /// Rejected value.
        value: f64,
    },

    /// Wrong number of crisp inputs supplied to a session.
    #[error("expected {expected} crisp inputs, got {actual}")]
    InputArity {
        /// Number of input variables in the system.
        expected: usize,
        /// Number of values supplied.
        actual: usize,
    },

    /// A rule looked up a degree that was never fuzzified.
    #[error("no fuzzified degree for term '{term}' of variable '{variable}'")]
    UnknownTerm {
        /// Variable name.
        variable: String,
        /// Term name.
        term: String,
    },

    /// Aggregated output set is zero everywhere and no fallback is configured.
    #[error("no rule fired: aggregated output set is empty")]
    NoRuleFired,

    /// A session step was called out of order.
    #[error("session step requires phase {expected:?}, session is in {actual:?}")]
    PhaseOrder {
        /// Phase the step needs.
        expected: Phase,
        /// Phase the session was actually in.
        actual: Phase,
    },
}

/// Crate-wide result alias.
pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn config_error_converts_into_error() {
        let e: Error = ConfigError::NoRules.into();
        assert_eq!(e, Error::Config(ConfigError::NoRules));
    }

    #[test]
    fn messages_name_the_offender() {
        let e = ConfigError::DuplicateTerm {
            variable: "error".into(),
            term: "small".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("small") && msg.contains("error"), "{}", msg);
    }
}
