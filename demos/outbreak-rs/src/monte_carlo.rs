//! Monte Carlo batches: many independent runs folded into per-day averages
//! and detection-day statistics, reported after every run.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::thread::{self, JoinHandle};

use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::Serialize;
use tracing::{debug, info};

use crate::model::{SeirModel, SimulationState};
use crate::output::{AggregatedState, SimulationResults};
use crate::parameters::{AggregateMetric, ParameterError, SimulationParams};
use crate::stats::{confidence_interval_95, mean};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BatchStatus {
    Idle,
    Running,
    Complete,
}

/// Running per-day totals over every run folded so far. Runs of different
/// lengths only contribute to the days they reached.
#[derive(Debug, Clone, Default)]
pub struct DayAggregator {
    totals: Vec<u64>,
    runs_reaching_day: Vec<u32>,
}

impl DayAggregator {
    pub fn fold(&mut self, trajectory: &[SimulationState], metric: AggregateMetric) {
        if trajectory.len() > self.totals.len() {
            self.totals.resize(trajectory.len(), 0);
            self.runs_reaching_day.resize(trajectory.len(), 0);
        }
        for (day, state) in trajectory.iter().enumerate() {
            self.totals[day] += state.metric(metric);
            self.runs_reaching_day[day] += 1;
        }
    }

    /// Number of days covered, i.e. the length of the longest run.
    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    pub fn aggregated(&self) -> Vec<AggregatedState> {
        self.totals
            .iter()
            .zip(&self.runs_reaching_day)
            .enumerate()
            .map(|(day, (total, runs))| AggregatedState {
                day: day as u32,
                avg_infected: *total as f64 / *runs as f64,
            })
            .collect()
    }
}

/// Per-run seeds of a batch, in run order. They are drawn from a generator
/// seeded with the batch seed, so batches with neighbouring seeds do not
/// share runs.
pub fn run_seeds(batch_seed: u64) -> impl Iterator<Item = u64> {
    let mut seeds = StdRng::seed_from_u64(batch_seed);
    std::iter::repeat_with(move || seeds.random())
}

/// One Monte Carlo batch as an explicit `Idle -> Running -> Complete` state
/// machine. Runs execute one at a time through [`MonteCarlo::run_next`];
/// run `i` draws from its own generator seeded with the `i`th of
/// [`run_seeds`].
pub struct MonteCarlo {
    parameters: SimulationParams,
    num_runs: u32,
    batch_seed: u64,
    seeds: StdRng,
    status: BatchStatus,
    completed_runs: u32,
    aggregator: DayAggregator,
    first_detection_days: Vec<f64>,
    tenth_detection_days: Vec<f64>,
}

impl MonteCarlo {
    /// Validates `parameters` and sets up an idle batch of `num_runs` runs.
    /// `num_runs` replaces `parameters.num_runs`.
    pub fn new(
        mut parameters: SimulationParams,
        num_runs: u32,
    ) -> Result<MonteCarlo, ParameterError> {
        parameters.num_runs = num_runs;
        parameters.validate()?;
        let batch_seed = parameters.seed.unwrap_or_else(rand::random);
        Ok(MonteCarlo {
            parameters,
            num_runs,
            batch_seed,
            seeds: StdRng::seed_from_u64(batch_seed),
            status: BatchStatus::Idle,
            completed_runs: 0,
            aggregator: DayAggregator::default(),
            first_detection_days: Vec::new(),
            tenth_detection_days: Vec::new(),
        })
    }

    pub fn status(&self) -> BatchStatus {
        self.status
    }

    pub fn completed_runs(&self) -> u32 {
        self.completed_runs
    }

    pub fn num_runs(&self) -> u32 {
        self.num_runs
    }

    pub fn parameters(&self) -> &SimulationParams {
        &self.parameters
    }

    pub fn batch_seed(&self) -> u64 {
        self.batch_seed
    }

    /// Begins the batch. Starting from `Idle` or `Complete` discards any
    /// previous progress; starting while `Running` does nothing.
    pub fn start(&mut self) {
        if self.status == BatchStatus::Running {
            return;
        }
        self.completed_runs = 0;
        self.seeds = StdRng::seed_from_u64(self.batch_seed);
        self.aggregator = DayAggregator::default();
        self.first_detection_days.clear();
        self.tenth_detection_days.clear();
        self.status = BatchStatus::Running;
        info!(
            disease = %self.parameters.disease.name,
            num_runs = self.num_runs,
            batch_seed = self.batch_seed,
            "starting Monte Carlo batch"
        );
    }

    /// Stops the batch before its next run.
    pub fn cancel(&mut self) {
        if self.status == BatchStatus::Running {
            self.status = BatchStatus::Idle;
            info!(completed_runs = self.completed_runs, "Monte Carlo batch cancelled");
        }
    }

    /// Executes the next run and returns the updated snapshot, or `None`
    /// unless the batch is running.
    pub fn run_next(&mut self) -> Option<SimulationResults> {
        if self.status != BatchStatus::Running {
            return None;
        }
        let mut rng = StdRng::seed_from_u64(self.seeds.random());
        let trajectory = SeirModel::simulate(&self.parameters, &mut rng);
        self.record(&trajectory)
    }

    /// Folds a finished run into a running batch and returns the new
    /// snapshot, or `None` unless the batch is running. The trajectory is
    /// not retained.
    pub fn record(&mut self, trajectory: &[SimulationState]) -> Option<SimulationResults> {
        if self.status != BatchStatus::Running {
            return None;
        }
        self.aggregator.fold(trajectory, self.parameters.metric);
        if let Some(last) = trajectory.last() {
            if let Some(day) = last.first_detection_day {
                self.first_detection_days.push(day as f64);
            }
            if let Some(day) = last.tenth_detection_day {
                self.tenth_detection_days.push(day as f64);
            }
        }
        self.completed_runs += 1;
        debug!(
            run = self.completed_runs,
            days = trajectory.len(),
            first_detection_day = ?trajectory.last().and_then(|s| s.first_detection_day),
            tenth_detection_day = ?trajectory.last().and_then(|s| s.tenth_detection_day),
            "run complete"
        );

        if self.completed_runs == self.num_runs {
            self.status = BatchStatus::Complete;
            info!(completed_runs = self.completed_runs, "Monte Carlo batch complete");
        }
        Some(self.results())
    }

    pub fn results(&self) -> SimulationResults {
        SimulationResults {
            aggregated_data: self.aggregator.aggregated(),
            avg_first_detection_day: mean(&self.first_detection_days),
            avg_tenth_detection_day: mean(&self.tenth_detection_days),
            first_detection_day_95ci: confidence_interval_95(&self.first_detection_days),
            tenth_detection_day_95ci: confidence_interval_95(&self.tenth_detection_days),
            completed_runs: self.completed_runs,
            disease: self.parameters.disease.clone(),
        }
    }

    /// Runs the whole batch on the current thread, reporting after every run.
    pub fn run_to_completion<F: FnMut(SimulationResults)>(&mut self, mut on_progress: F) {
        self.start();
        while let Some(results) = self.run_next() {
            on_progress(results);
        }
    }
}

/// A batch running on a worker thread.
pub struct BatchHandle {
    cancel: Arc<AtomicBool>,
    worker: JoinHandle<BatchStatus>,
}

impl BatchHandle {
    /// Asks the batch to stop once the in-flight run finishes.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Release);
    }

    pub fn is_finished(&self) -> bool {
        self.worker.is_finished()
    }

    /// Waits for the batch and returns where it ended up: `Complete`, or
    /// `Idle` if it was cancelled.
    pub fn join(self) -> BatchStatus {
        self.worker
            .join()
            .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
    }
}

/// Validates the parameters, then runs `num_runs` runs on a worker thread and
/// returns immediately. `on_progress` receives a fresh snapshot after every
/// completed run.
pub fn run_monte_carlo<F>(
    parameters: SimulationParams,
    num_runs: u32,
    mut on_progress: F,
) -> Result<BatchHandle, ParameterError>
where
    F: FnMut(SimulationResults) + Send + 'static,
{
    let mut batch = MonteCarlo::new(parameters, num_runs)?;
    let cancel = Arc::new(AtomicBool::new(false));
    let cancel_requested = Arc::clone(&cancel);

    let worker = thread::spawn(move || {
        batch.start();
        loop {
            if cancel_requested.load(Ordering::Acquire) {
                batch.cancel();
            }
            let Some(results) = batch.run_next() else {
                break;
            };
            on_progress(results);
        }
        batch.status()
    });

    Ok(BatchHandle { cancel, worker })
}

/// Like [`run_monte_carlo`], delivering snapshots over a channel. The channel
/// closes when the batch ends.
pub fn subscribe(
    parameters: SimulationParams,
    num_runs: u32,
) -> Result<(BatchHandle, Receiver<SimulationResults>), ParameterError> {
    let (tx, rx) = mpsc::channel();
    let handle = run_monte_carlo(parameters, num_runs, move |results| {
        // a dropped receiver just means nobody is listening any more
        let _ = tx.send(results);
    })?;
    Ok((handle, rx))
}
