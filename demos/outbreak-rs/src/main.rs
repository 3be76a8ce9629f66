use anyhow::{Context, bail};
use tracing::info;
use tracing_subscriber::EnvFilter;

use outbreak::SimulationResults;
use outbreak::request::{parameters_from, write_outputs};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let ctx = mrp::Environment::from_stdin().context("failed to read run request")?;
    let parameters = parameters_from(&ctx)?;

    info!(
        digest = %ctx.input_digest(),
        replicate = ctx.replicate,
        batch_seed = ?parameters.seed,
        "run request loaded"
    );

    let (handle, progress) = outbreak::subscribe(parameters.clone(), parameters.num_runs)?;
    let mut latest: Option<SimulationResults> = None;
    for results in progress {
        info!(
            completed_runs = results.completed_runs,
            avg_first_detection_day = results.avg_first_detection_day,
            avg_tenth_detection_day = results.avg_tenth_detection_day,
            "progress"
        );
        latest = Some(results);
    }
    let status = handle.join();
    let Some(results) = latest else {
        bail!("batch finished without completing a run");
    };

    write_outputs(&ctx, &parameters, &results, status)
}
