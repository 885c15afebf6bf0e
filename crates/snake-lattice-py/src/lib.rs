use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use snake_lattice_core::{build_simulation, SimConfig};

/// Minimal PyO3 module exposing snake-lattice-core to Python renderers.
#[pyfunction]
fn version() -> &'static str {
    "0.1.0"
}

/// Default configuration as a JSON string.
#[pyfunction]
fn default_config_json() -> PyResult<String> {
    serde_json::to_string(&SimConfig::default()).map_err(|e| PyValueError::new_err(e.to_string()))
}

/// Run a simulation described by a JSON config and return the run summary
/// as JSON. When `with_frames` is set the result is a JSON object holding
/// the summary and every per-tick snapshot.
#[pyfunction]
#[pyo3(signature = (config_json, with_frames = false))]
fn run_json(config_json: &str, with_frames: bool) -> PyResult<String> {
    let config =
        SimConfig::from_json_str(config_json).map_err(|e| PyValueError::new_err(e.to_string()))?;
    let mut arena = build_simulation(config).map_err(|e| PyValueError::new_err(e.to_string()))?;
    let result = if with_frames {
        let mut frames = Vec::new();
        let summary = arena.run_with_observer(|frame| frames.push(frame.clone()));
        serde_json::to_string(&serde_json::json!({ "summary": summary, "frames": frames }))
    } else {
        serde_json::to_string(&arena.run())
    };
    result.map_err(|e| PyValueError::new_err(e.to_string()))
}

#[pymodule]
fn _core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(version, m)?)?;
    m.add_function(wrap_pyfunction!(default_config_json, m)?)?;
    m.add_function(wrap_pyfunction!(run_json, m)?)?;
    Ok(())
}
