//! Rule expressions and rules.
//!
//! Antecedents are small expression trees over `(variable, term)` references:
//!
//! ```rust
//! use mi_fuzzy_core::rule::{is, Rule, TermRef};
//!
//! // error IS large AND NOT (speed IS reverse)  →  LOA IS change
//! let rule = Rule::new(
//!     is("error", "large") & !is("speed", "reverse"),
//!     TermRef::new("loa", "change"),
//! );
//! assert_eq!(rule.antecedent().term_refs().count(), 2);
//! ```
//!
//! Connectives follow the Zadeh operators: AND = min, OR = max, NOT = 1 − x.
//! Authoring uses names; [`InferenceSystem`](crate::engine::InferenceSystem)
//! resolves every name to indices once at build time.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use core::ops::{BitAnd, BitOr, Not};

use crate::error::{Error, Result};
use crate::variable::Degrees;

/// Reference to one term of one variable, by name.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TermRef {
    /// Variable name.
    pub variable: String,
    /// Term name within the variable.
    pub term: String,
}

impl TermRef {
    /// Reference `term` of `variable`.
    pub fn new(variable: impl Into<String>, term: impl Into<String>) -> Self {
        Self { variable: variable.into(), term: term.into() }
    }
}

/// Fuzzy-logic expression over term references.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Expr {
    /// Degree of a single term.
    Term(TermRef),
    /// Minimum of both sides.
    And(Box<Expr>, Box<Expr>),
    /// Maximum of both sides.
    Or(Box<Expr>, Box<Expr>),
    /// Complement, `1 − x`.
    Not(Box<Expr>),
}

/// Shorthand for `Expr::Term(TermRef::new(variable, term))`.
pub fn is(variable: impl Into<String>, term: impl Into<String>) -> Expr {
    Expr::Term(TermRef::new(variable, term))
}

impl Expr {
    /// Evaluate against a degree lookup.
    ///
    /// Returns [`Error::UnknownTerm`] when `lookup` has no degree for a
    /// referenced term, which means that variable was never fuzzified.
    pub fn evaluate<F>(&self, lookup: &F) -> Result<f64>
    where
        F: Fn(&TermRef) -> Option<f64>,
    {
        match self {
            Expr::Term(r) => lookup(r).ok_or_else(|| Error::UnknownTerm {
                variable: r.variable.clone(),
                term: r.term.clone(),
            }),
            Expr::And(l, r) => Ok(l.evaluate(lookup)?.min(r.evaluate(lookup)?)),
            Expr::Or(l, r) => Ok(l.evaluate(lookup)?.max(r.evaluate(lookup)?)),
            Expr::Not(e) => Ok(1.0 - e.evaluate(lookup)?),
        }
    }

    /// Every term reference in the tree, left to right.
    pub fn term_refs(&self) -> impl Iterator<Item = &TermRef> {
        let mut out = Vec::new();
        self.collect_refs(&mut out);
        out.into_iter()
    }

    fn collect_refs<'a>(&'a self, out: &mut Vec<&'a TermRef>) {
        match self {
            Expr::Term(r) => out.push(r),
            Expr::And(l, r) | Expr::Or(l, r) => {
                l.collect_refs(out);
                r.collect_refs(out);
            }
            Expr::Not(e) => e.collect_refs(out),
        }
    }
}

impl fmt::Display for TermRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} IS {}", self.variable, self.term)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Term(r) => write!(f, "{}", r),
            Expr::And(l, r) => write!(f, "({} AND {})", l, r),
            Expr::Or(l, r) => write!(f, "({} OR {})", l, r),
            Expr::Not(e) => write!(f, "NOT {}", e),
        }
    }
}

impl BitAnd for Expr {
    type Output = Expr;

    fn bitand(self, rhs: Expr) -> Expr {
        Expr::And(Box::new(self), Box::new(rhs))
    }
}

impl BitOr for Expr {
    type Output = Expr;

    fn bitor(self, rhs: Expr) -> Expr {
        Expr::Or(Box::new(self), Box::new(rhs))
    }
}

impl Not for Expr {
    type Output = Expr;

    fn not(self) -> Expr {
        Expr::Not(Box::new(self))
    }
}

/// `IF antecedent THEN consequent`. Immutable once built.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rule {
    label: Option<String>,
    antecedent: Expr,
    consequent: TermRef,
}

impl Rule {
    /// New unlabelled rule.
    pub fn new(antecedent: Expr, consequent: TermRef) -> Self {
        Self { label: None, antecedent, consequent }
    }

    /// Attach a label, used in logs and snapshots.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Optional label.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Condition expression.
    pub fn antecedent(&self) -> &Expr {
        &self.antecedent
    }

    /// Output term this rule supports.
    pub fn consequent(&self) -> &TermRef {
        &self.consequent
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IF {} THEN {}", self.antecedent, self.consequent)
    }
}

// ─── Resolved form ───────────────────────────────────────────────────────────

/// Index pair `(input variable, term)` resolved at build time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct TermId {
    pub var: usize,
    pub term: usize,
}

/// [`Expr`] with names replaced by indices.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum CompiledExpr {
    Term(TermId),
    And(Box<CompiledExpr>, Box<CompiledExpr>),
    Or(Box<CompiledExpr>, Box<CompiledExpr>),
    Not(Box<CompiledExpr>),
}

impl CompiledExpr {
    /// Resolve every reference through `resolve`, stopping at the first failure.
    pub(crate) fn compile<E, F>(expr: &Expr, resolve: &F) -> core::result::Result<Self, E>
    where
        F: Fn(&TermRef) -> core::result::Result<TermId, E>,
    {
        Ok(match expr {
            Expr::Term(r) => CompiledExpr::Term(resolve(r)?),
            Expr::And(l, r) => CompiledExpr::And(
                Box::new(Self::compile(l, resolve)?),
                Box::new(Self::compile(r, resolve)?),
            ),
            Expr::Or(l, r) => CompiledExpr::Or(
                Box::new(Self::compile(l, resolve)?),
                Box::new(Self::compile(r, resolve)?),
            ),
            Expr::Not(e) => CompiledExpr::Not(Box::new(Self::compile(e, resolve)?)),
        })
    }

    /// Firing strength over per-variable degrees; `Err` carries the missing id.
    pub(crate) fn evaluate(&self, degrees: &[Degrees]) -> core::result::Result<f64, TermId> {
        match self {
            CompiledExpr::Term(id) => degrees
                .get(id.var)
                .and_then(|d| d.get(id.term))
                .copied()
                .ok_or(*id),
            CompiledExpr::And(l, r) => Ok(l.evaluate(degrees)?.min(r.evaluate(degrees)?)),
            CompiledExpr::Or(l, r) => Ok(l.evaluate(degrees)?.max(r.evaluate(degrees)?)),
            CompiledExpr::Not(e) => Ok(1.0 - e.evaluate(degrees)?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(r: &TermRef) -> Option<f64> {
        match (r.variable.as_str(), r.term.as_str()) {
            ("error", "small") => Some(0.2),
            ("error", "medium") => Some(0.7),
            ("error", "large") => Some(0.9),
            ("speed", "reverse") => Some(0.4),
            _ => None,
        }
    }

    #[test]
    fn connectives_are_min_max_complement() {
        let or = is("error", "small") | is("error", "medium");
        assert_eq!(or.evaluate(&lookup), Ok(0.7));

        let and_not = is("error", "large") & !is("speed", "reverse");
        assert!((and_not.evaluate(&lookup).unwrap() - 0.6).abs() < 1e-12);

        let and = is("speed", "reverse") & is("error", "large");
        assert_eq!(and.evaluate(&lookup), Ok(0.4));
    }

    #[test]
    fn missing_degree_is_unknown_term() {
        let e = is("error", "small") & is("speed", "forward");
        assert_eq!(
            e.evaluate(&lookup),
            Err(Error::UnknownTerm { variable: "speed".into(), term: "forward".into() })
        );
    }

    #[test]
    fn term_refs_in_order() {
        let e = is("speed", "reverse") & !(is("error", "large") | is("error", "small"));
        let names: Vec<&str> = e.term_refs().map(|r| r.term.as_str()).collect();
        assert_eq!(names, alloc::vec!["reverse", "large", "small"]);
    }

    #[test]
    fn compiled_expression_matches_named_one() {
        let e = is("error", "large") & !is("speed", "reverse");
        let compiled = CompiledExpr::compile(&e, &|r: &TermRef| -> core::result::Result<TermId, ()> {
            match (r.variable.as_str(), r.term.as_str()) {
                ("error", "large") => Ok(TermId { var: 0, term: 2 }),
                ("speed", "reverse") => Ok(TermId { var: 1, term: 0 }),
                _ => Err(()),
            }
        })
        .unwrap();

        let mut error = Degrees::new();
        error.extend_from_slice(&[0.2, 0.7, 0.9]).unwrap();
        let mut speed = Degrees::new();
        speed.extend_from_slice(&[0.4, 0.0, 0.0]).unwrap();
        let got = compiled.evaluate(&[error, speed]).unwrap();
        assert!((got - e.evaluate(&lookup).unwrap()).abs() < 1e-12);

        assert_eq!(compiled.evaluate(&[]), Err(TermId { var: 0, term: 2 }));
    }

    #[test]
    fn display_reads_like_the_rule() {
        use alloc::string::ToString;
        let r = Rule::new(
            is("error", "large") & !is("speed", "reverse"),
            TermRef::new("loa", "change"),
        );
        assert_eq!(
            r.to_string(),
            "IF (error IS large AND NOT speed IS reverse) THEN loa IS change"
        );
    }

    #[test]
    fn rule_accessors() {
        let r = Rule::new(is("error", "small"), TermRef::new("loa", "no_change")).with_label("r1");
        assert_eq!(r.label(), Some("r1"));
        assert_eq!(r.consequent().term, "no_change");
    }
}
