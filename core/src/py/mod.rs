use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::wrap_pyfunction;

use serde::{Deserialize, Serialize};
use serde_json as json;
use serde_path_to_error as spte;

use crate::gait::GaitClassifier;
use crate::models::{Gait, Sample, SessionType};

// ──────────────────────────────────────────────────────────────────────────────
// INPUT-REPR
// ──────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ClassifyIn {
    speeds_kmh: Vec<f64>,
}

#[derive(Debug, Serialize)]
struct ClassifyOut {
    labels: Vec<Gait>,
    #[serde(rename = "final")]
    final_gait: Gait,
}

#[derive(Debug, Deserialize)]
struct SummarizeIn {
    samples: Vec<Sample>,
    session_id: String,
    horse_id: String,
    #[serde(default = "default_session_type")]
    session_type: SessionType,
    #[serde(default)]
    notes: String,
}

fn default_session_type() -> SessionType {
    SessionType::Other
}

#[derive(Debug, Deserialize)]
struct GpxIn {
    samples: Vec<Sample>,
    name: String,
}

fn parse<'a, T: Deserialize<'a>>(json_in: &'a str, what: &str) -> PyResult<T> {
    let mut de = json::Deserializer::from_str(json_in);
    spte::deserialize(&mut de).map_err(|e| {
        PyValueError::new_err(format!("parse error ({what}) at {}: {}", e.path(), e))
    })
}

// ──────────────────────────────────────────────────────────────────────────────
// PyO3-FUNKSJONER — JSON inn, JSON (eller rå streng) ut
// ──────────────────────────────────────────────────────────────────────────────

/// Klassifiser en fartsserie (km/t) med den kanoniske klassifisereren
/// (EMA + hysterese) – samme som live-økten bruker.
#[pyfunction]
fn classify_gait_series_json(json_str: &str) -> PyResult<String> {
    let input: ClassifyIn = parse(json_str, "ClassifyIn")?;

    let mut clf = GaitClassifier::new();
    let labels: Vec<Gait> = input.speeds_kmh.iter().map(|v| clf.update(*v)).collect();
    let out = ClassifyOut {
        final_gait: clf.current(),
        labels,
    };
    serde_json::to_string(&out).map_err(|e| PyValueError::new_err(e.to_string()))
}

/// Post-hoc sammendrag av en rå sample-serie.
#[pyfunction]
fn summarize_track_json(json_str: &str) -> PyResult<String> {
    let input: SummarizeIn = parse(json_str, "SummarizeIn")?;

    let summary = crate::summary::summarize_track(
        &input.samples,
        &input.session_id,
        &input.horse_id,
        input.session_type,
        &input.notes,
    );
    serde_json::to_string(&summary).map_err(|e| PyValueError::new_err(e.to_string()))
}

/// GPX 1.1-eksport av en sample-serie. Returnerer dokumentet som streng.
#[pyfunction]
fn export_gpx_json(json_str: &str) -> PyResult<String> {
    let input: GpxIn = parse(json_str, "GpxIn")?;
    Ok(crate::gpx::to_gpx(&input.samples, &input.name))
}

/// Haversine-avstand i meter mellom to koordinater.
#[pyfunction]
fn haversine_m(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> PyResult<f64> {
    Ok(crate::geo::haversine_m(lat1, lng1, lat2, lng2))
}

// ──────────────────────────────────────────────────────────────────────────────
// PyO3-MODUL
// ──────────────────────────────────────────────────────────────────────────────

#[pymodule]
fn equigraph_core(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(classify_gait_series_json, m)?)?;
    m.add_function(wrap_pyfunction!(summarize_track_json, m)?)?;
    m.add_function(wrap_pyfunction!(export_gpx_json, m)?)?;
    m.add_function(wrap_pyfunction!(haversine_m, m)?)?;
    Ok(())
}
