//! # mi-fuzzy-core
//!
//! Fuzzy mixed-initiative control switcher — decides when a shared-control
//! robot should change its level of autonomy (LOA).
//!
//! ---
//!
//! ## What it does
//!
//! Each control cycle the robot reports two numbers: how badly it is tracking
//! its goal (`error`) and how fast it is moving (`speed`). A small Mamdani
//! fuzzy system turns them into one crisp score in `[-1, 1]`:
//!
//! - **`< 0`** — leaning *no_change*: keep the current operator/robot split.
//! - **`> 0`** — leaning *change*: hand control over.
//!
//! The rule base is three lines. Tracking fine keeps the LOA. A large error
//! hands over, unless the robot is reversing, in which case the reversal is
//! treated as the operator already correcting and the LOA is kept.
//!
//! ---
//!
//! ## The pipeline
//!
//! ```text
//! crisp inputs → validate → clamp → fuzzify → rule strengths
//!                                                  │
//!        crisp score ◀── defuzzify ◀── aggregate (clip + max)
//! ```
//!
//! ## Module overview
//!
//! | Module | Key types | What it does |
//! |--------|-----------|--------------|
//! | [`membership`] | [`MembershipFunction`] | Trapezoid / triangle shapes, total `evaluate` |
//! | [`universe`] | [`Universe`] | Evenly spaced discretisation of a variable's range |
//! | [`variable`] | [`LinguisticVariable`], [`Fuzzification`] | Universe plus named terms; antecedent or consequent |
//! | [`rule`] | [`Rule`], [`rule::Expr`] | AND / OR / NOT expression trees over term references |
//! | [`defuzz`] | [`DefuzzMethod`] | centroid, bisector, mom, som, lom |
//! | [`engine`] | [`InferenceSystem`], [`InferenceSession`] | Immutable compiled system, per-call session |
//! | [`controller`] | [`MixedInitiativeController`], [`ControllerConfig`] | The fixed two-input, three-rule LOA switcher |
//! | [`error`] | [`Error`], [`ConfigError`] | Construction-time and per-call failures |
//! | [`snapshot`] | [`snapshot::ControllerSnapshot`] | JSON-ready export for a plotter (requires `serde` feature) |
//!
//! ## Quick start
//!
//! ```rust
//! use mi_fuzzy_core::MixedInitiativeController;
//!
//! let mi = MixedInitiativeController::new().unwrap();
//! let score = mi.decide(0.04, 0.2).unwrap();
//! assert!((score + 0.8).abs() < 1e-9);
//! ```
//!
//! ## Logging
//!
//! The crate logs through the [`log`] facade: `debug` when a system is built,
//! `trace` for per-phase session values, `warn` when the no-rule-fired
//! fallback is used. No logger is installed; bring your own.
//!
//! ## `no_std`
//!
//! This crate is `#![no_std]` + `alloc` by default. Enable the `std` feature
//! for `std::error::Error` impls. Enable the `serde` feature for
//! serialisation of configs, decisions and [`snapshot`]. Enable `python-ffi`
//! for the PyO3 bindings.

#![cfg_attr(not(any(test, feature = "std", feature = "python-ffi")), no_std)]
#![deny(unsafe_code)]
#![deny(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

extern crate alloc;

pub mod error;        // ConfigError + per-call Error
pub mod membership;   // trapezoid / triangle
pub mod universe;     // sampled axis
pub mod variable;     // LinguisticVariable
pub mod rule;         // Expr, Rule
pub mod defuzz;       // centroid, bisector, mom, som, lom
pub mod engine;       // InferenceSystem + InferenceSession
pub mod controller;   // MixedInitiativeController
#[cfg(feature = "serde")]
pub mod snapshot;     // plotter export

#[cfg(feature = "python-ffi")]
pub mod ffi;

pub use controller::{ControllerConfig, Decision, MixedInitiativeController};
pub use defuzz::DefuzzMethod;
pub use engine::{InferenceSession, InferenceSystem, NoRuleFired};
pub use error::{ConfigError, Error, Result};
pub use membership::MembershipFunction;
pub use rule::{Rule, TermRef};
pub use universe::Universe;
pub use variable::{Fuzzification, LinguisticVariable};
