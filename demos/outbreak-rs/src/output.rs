use serde::Serialize;

use crate::parameters::DiseasePreset;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AggregatedState {
    pub day: u32,
    /// Mean of the batch's aggregate metric over the runs that reached `day`.
    pub avg_infected: f64,
}

/// Snapshot of a Monte Carlo batch after some number of completed runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationResults {
    pub aggregated_data: Vec<AggregatedState>,
    pub avg_first_detection_day: f64,
    pub avg_tenth_detection_day: f64,
    pub first_detection_day_95ci: (f64, f64),
    pub tenth_detection_day_95ci: (f64, f64),
    pub completed_runs: u32,
    pub disease: DiseasePreset,
}

impl SimulationResults {
    /// How many days ahead of the historical first detection the simulated
    /// tenth positive test arrives, when the disease has a historical record.
    pub fn days_before_historical_detection(&self) -> Option<f64> {
        self.disease
            .historical_first_detection_day
            .map(|day| day as f64 - self.avg_tenth_detection_day)
    }

    /// `day,avg_infected` rows for CSV output.
    pub fn aggregated_rows(&self) -> Vec<Vec<String>> {
        self.aggregated_data
            .iter()
            .map(|row| vec![row.day.to_string(), row.avg_infected.to_string()])
            .collect()
    }
}
