//! Stochastic SEIR outbreak simulation with a healthcare-seeking and testing
//! pipeline, run as Monte Carlo batches to estimate when an outbreak would
//! first be detected.

pub mod model;
pub mod monte_carlo;
pub mod output;
pub mod parameters;
pub mod presets;
pub mod random;
pub mod request;
pub mod stats;

pub use model::{SeirModel, SimulationState};
pub use monte_carlo::{BatchHandle, BatchStatus, MonteCarlo, run_monte_carlo, run_seeds, subscribe};
pub use output::{AggregatedState, SimulationResults};
pub use parameters::{AggregateMetric, DiseasePreset, ParameterError, SimulationParams};
