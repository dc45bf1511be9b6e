//! Python FFI bindings via PyO3.
//!
//! Exposes the reference controller so a ROS node (or any Python loop) can
//! call it once per control cycle.
//!
//! # Building the Python extension
//!
//! ```bash
//! pip install maturin
//! maturin develop --features python-ffi
//! ```
//!
//! # Usage
//!
//! ```python
//! from mi_fuzzy_core import MixedInitiativeController
//!
//! mi = MixedInitiativeController()
//! score = mi.decide(0.09, 0.3)          # 1.0 → change LOA
//! detail = mi.decide_detailed(0.04, 0.2)
//! print(detail["value"], detail["rule_strengths"])
//! ```

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::PyDict;

use crate::controller::MixedInitiativeController as RustController;
use crate::defuzz::DefuzzMethod;
use crate::error::Error;

fn to_py_err(e: Error) -> PyErr {
    PyValueError::new_err(e.to_string())
}

// ── Controller ────────────────────────────────────────────────────────────────

/// Fuzzy level-of-autonomy switcher.
///
/// Construct once and call `decide(error, speed)` every control cycle.
#[pyclass(name = "MixedInitiativeController", frozen)]
pub struct PyMixedInitiativeController {
    inner: RustController,
}

#[pymethods]
impl PyMixedInitiativeController {
    /// Create a controller with the reference tuning.
    ///
    /// Args:
    ///     defuzz: defuzzification method name, one of
    ///             "centroid", "bisector", "mom", "som", "lom" (default "lom")
    #[new]
    #[pyo3(signature = (defuzz="lom"))]
    pub fn new(defuzz: &str) -> PyResult<Self> {
        let method: DefuzzMethod = defuzz.parse().map_err(|e: crate::error::ConfigError| {
            PyValueError::new_err(e.to_string())
        })?;
        let config = crate::controller::ControllerConfig { defuzz: method, ..Default::default() };
        let inner = RustController::with_config(&config)
            .map_err(|e| PyValueError::new_err(e.to_string()))?;
        Ok(Self { inner })
    }

    /// Crisp LOA score in [-1.0, 1.0].
    ///
    /// Args:
    ///     error: tracking-error magnitude (clamped to [0.0, 0.1])
    ///     speed: linear velocity in m/s (clamped to [-0.4, 0.4])
    ///
    /// Raises:
    ///     ValueError: on NaN/inf input or when no rule fires
    pub fn decide(&self, error: f64, speed: f64) -> PyResult<f64> {
        self.inner.decide(error, speed).map_err(to_py_err)
    }

    /// Like `decide`, returning a dict with the intermediate values:
    /// `value`, `inputs` ({variable: {term: degree}}), `rule_strengths`,
    /// `activations` ({term: level}) and `output` ({"x": [...], "mu": [...]}).
    pub fn decide_detailed<'py>(
        &self,
        py: Python<'py>,
        error: f64,
        speed: f64,
    ) -> PyResult<Bound<'py, PyDict>> {
        let d = self.inner.decide_detailed(error, speed).map_err(to_py_err)?;

        let out = PyDict::new_bound(py);
        out.set_item("value", d.value)?;

        let inputs = PyDict::new_bound(py);
        for var in &d.inputs {
            let terms = PyDict::new_bound(py);
            for (name, degree) in &var.terms {
                terms.set_item(name, *degree)?;
            }
            inputs.set_item(&var.variable, terms)?;
        }
        out.set_item("inputs", inputs)?;
        out.set_item("rule_strengths", d.rule_strengths)?;

        let activations = PyDict::new_bound(py);
        for (name, level) in &d.activations {
            activations.set_item(name, *level)?;
        }
        out.set_item("activations", activations)?;

        let set = PyDict::new_bound(py);
        set.set_item("x", d.output.xs().to_vec())?;
        set.set_item("mu", d.output.degrees().to_vec())?;
        out.set_item("output", set)?;
        Ok(out)
    }

    /// Python repr string.
    pub fn __repr__(&self) -> String {
        let method = self
            .inner
            .system()
            .output()
            .defuzz_method()
            .unwrap_or_default();
        format!("MixedInitiativeController(defuzz={:?})", method.name())
    }
}

// ── Module entry point ────────────────────────────────────────────────────────

/// Mixed-initiative fuzzy LOA controller — Python bindings.
#[pymodule]
pub fn mi_fuzzy_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyMixedInitiativeController>()?;
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    Ok(())
}
