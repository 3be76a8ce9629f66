//! Model-run requests in, batch outputs out.

use anyhow::Context;
use serde::Serialize;
use serde_json::Value;

use crate::monte_carlo::BatchStatus;
use crate::output::SimulationResults;
use crate::parameters::{DiseasePreset, SimulationParams};
use crate::presets::{self, PresetFile};

/// Looks a disease up by name, in the `presets` model file when the run
/// request provides one and in the built-in catalog otherwise.
pub fn resolve_disease<I>(ctx: &mrp::Environment<I>, name: &str) -> anyhow::Result<DiseasePreset> {
    let found = if ctx.files.contains_key("presets") {
        let file: PresetFile = ctx.read_toml_file("presets")?;
        presets::find_in(&file.presets, name).cloned()
    } else {
        presets::find(name).cloned()
    };
    found.with_context(|| format!("unknown disease '{name}'"))
}

/// Builds batch parameters from the request input. `disease` is either a
/// preset name or an inline preset. The batch seed is the request's `seed`,
/// or a fresh random one, and is always filled in so it can be reported.
pub fn parameters_from<I>(ctx: &mrp::Environment<I>) -> anyhow::Result<SimulationParams> {
    let mut input = ctx.input_json().clone();
    if let Some(name) = input.get("disease").and_then(Value::as_str).map(str::to_owned) {
        let disease = resolve_disease(ctx, &name)?;
        input.insert("disease".to_string(), serde_json::to_value(disease)?);
    }
    let mut parameters: SimulationParams =
        serde_json::from_value(Value::Object(input)).context("invalid simulation parameters")?;
    parameters.seed = Some(ctx.seed.unwrap_or_else(rand::random));
    Ok(parameters)
}

#[derive(Debug, Serialize)]
pub struct Summary<'a> {
    pub input_digest: String,
    pub replicate: u64,
    pub batch_seed: Option<u64>,
    pub status: BatchStatus,
    pub completed_runs: u32,
    pub avg_first_detection_day: f64,
    pub avg_tenth_detection_day: f64,
    pub first_detection_day_95ci: (f64, f64),
    pub tenth_detection_day_95ci: (f64, f64),
    pub days_before_historical_detection: Option<f64>,
    pub disease: &'a DiseasePreset,
}

/// Writes `aggregated.csv` and `summary.json` for a finished batch.
pub fn write_outputs<I>(
    ctx: &mrp::Environment<I>,
    parameters: &SimulationParams,
    results: &SimulationResults,
    status: BatchStatus,
) -> anyhow::Result<()> {
    ctx.write_csv(
        "aggregated.csv",
        &["day", "avg_infected"],
        &results.aggregated_rows(),
    )?;
    ctx.write_json(
        "summary.json",
        &Summary {
            input_digest: ctx.input_digest(),
            replicate: ctx.replicate,
            batch_seed: parameters.seed,
            status,
            completed_runs: results.completed_runs,
            avg_first_detection_day: results.avg_first_detection_day,
            avg_tenth_detection_day: results.avg_tenth_detection_day,
            first_detection_day_95ci: results.first_detection_day_95ci,
            tenth_detection_day_95ci: results.tenth_detection_day_95ci,
            days_before_historical_detection: results.days_before_historical_detection(),
            disease: &results.disease,
        },
    )?;
    Ok(())
}
