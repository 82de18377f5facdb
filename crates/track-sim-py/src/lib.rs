use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use std::path::Path;
use track_sim_core::config::SimConfig;
use track_sim_core::episode::run_episode;
use track_sim_core::nn::NeuralNet;
use track_sim_core::track::TrackMap;

/// Minimal PyO3 module letting a Python evolution driver score one generation.
#[pyfunction]
fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[pyfunction]
fn weight_count() -> usize {
    NeuralNet::WEIGHT_COUNT
}

#[pyfunction]
fn default_config_json() -> PyResult<String> {
    serde_json::to_string(&SimConfig::default())
        .map_err(|e| PyValueError::new_err(format!("failed to serialize default config: {e}")))
}

#[pyfunction]
fn validate_config_json(config_json: &str) -> PyResult<bool> {
    parse_config(config_json)
        .map(|_| true)
        .map_err(PyValueError::new_err)
}

/// Run one episode with one network per weight vector and return fitness in input order.
///
/// `population_size` in the config is overridden by the number of weight vectors.
#[pyfunction]
#[pyo3(signature = (config_json, weights, generation, track_path=None))]
fn run_generation(
    py: Python<'_>,
    config_json: &str,
    weights: Vec<Vec<f32>>,
    generation: u64,
    track_path: Option<String>,
) -> PyResult<Vec<f64>> {
    let mut config = parse_config(config_json).map_err(PyValueError::new_err)?;
    config.population_size = weights.len();
    let nets = build_networks(&weights).map_err(PyValueError::new_err)?;
    let track = load_track(&config, track_path.as_deref()).map_err(PyValueError::new_err)?;
    py.allow_threads(|| run_episode(nets, &track, &config, generation))
        .map(|summary| summary.fitness)
        .map_err(|e| PyValueError::new_err(format!("episode failed: {e}")))
}

fn parse_config(config_json: &str) -> Result<SimConfig, String> {
    let config: SimConfig =
        serde_json::from_str(config_json).map_err(|e| format!("invalid config json: {e}"))?;
    config
        .validate()
        .map_err(|e| format!("invalid configuration: {e}"))?;
    Ok(config)
}

fn build_networks(weights: &[Vec<f32>]) -> Result<Vec<NeuralNet>, String> {
    weights
        .iter()
        .enumerate()
        .map(|(member, w)| {
            NeuralNet::try_from_weights(w).map_err(|e| format!("member {member}: {e}"))
        })
        .collect()
}

fn load_track(config: &SimConfig, track_path: Option<&str>) -> Result<TrackMap, String> {
    let track = match track_path {
        Some(path) => TrackMap::load(
            Path::new(path),
            config.track_width,
            config.track_height,
            config.border_color,
        ),
        None => {
            let (w, h) = (config.track_width as f64, config.track_height as f64);
            TrackMap::ellipse_ring(
                config.track_width,
                config.track_height,
                [w * 0.475, h * 0.47],
                [w * 0.275, h * 0.23],
            )
        }
    };
    track.map_err(|e| format!("invalid track: {e}"))
}

#[pymodule]
fn _core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(version, m)?)?;
    m.add_function(wrap_pyfunction!(weight_count, m)?)?;
    m.add_function(wrap_pyfunction!(default_config_json, m)?)?;
    m.add_function(wrap_pyfunction!(validate_config_json, m)?)?;
    m.add_function(wrap_pyfunction!(run_generation, m)?)?;
    Ok(())
}
