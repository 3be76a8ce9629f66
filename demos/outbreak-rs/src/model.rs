use rand::Rng;
use serde::Serialize;

use crate::parameters::{AggregateMetric, SimulationParams};
use crate::random::{binomial, normal, poisson};

/// Cumulative positive tests at which each detection milestone is reached.
pub const FIRST_DETECTION_THRESHOLD: u64 = 1;
pub const TENTH_DETECTION_THRESHOLD: u64 = 10;

/// Population snapshot at the end of one simulated day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimulationState {
    pub susceptible: u64,
    pub exposed: u64,
    pub infected: u64,
    pub recovered: u64,
    /// Infected people who sought healthcare that day.
    pub hospitalized: u64,
    /// Cumulative tests performed.
    pub tested: u64,
    /// Cumulative positive tests.
    pub detected: u64,
    pub day: u32,
    pub first_detection_day: Option<u32>,
    pub tenth_detection_day: Option<u32>,
}

impl SimulationState {
    pub fn initial(parameters: &SimulationParams) -> SimulationState {
        SimulationState {
            susceptible: parameters.total_population - parameters.initial_infected,
            exposed: 0,
            infected: parameters.initial_infected,
            recovered: 0,
            hospitalized: 0,
            tested: 0,
            detected: 0,
            day: 0,
            first_detection_day: None,
            tenth_detection_day: None,
        }
    }

    pub fn population(&self) -> u64 {
        self.susceptible + self.exposed + self.infected + self.recovered
    }

    /// No one is left who could pass the infection on.
    pub fn is_extinct(&self) -> bool {
        self.infected == 0 && self.exposed == 0
    }

    pub fn metric(&self, metric: AggregateMetric) -> u64 {
        match metric {
            AggregateMetric::CumulativeInfected => self.infected + self.recovered,
            AggregateMetric::CurrentlyInfected => self.infected,
        }
    }
}

/// Discrete-time stochastic SEIR model with a healthcare-seeking and testing
/// pipeline layered on the infectious compartment.
pub struct SeirModel {}

impl SeirModel {
    /// Advances `state` by one time step. Transition counts are Poisson draws
    /// clamped to the size of their source compartment; detection works off
    /// the infected count at the start of the day.
    pub fn step<R: Rng>(
        state: &SimulationState,
        parameters: &SimulationParams,
        rng: &mut R,
    ) -> SimulationState {
        let disease = &parameters.disease;
        let contact_rate = normal(
            rng,
            parameters.base_contact_rate,
            parameters.contact_rate_variability,
        );
        let effective_beta =
            disease.transmission_probability(parameters.base_contact_rate) * contact_rate;

        let infection_rate = effective_beta
            * state.susceptible as f64
            * state.infected as f64
            / parameters.total_population as f64
            * parameters.time_step;
        let progression_rate =
            state.exposed as f64 / disease.incubation_period * parameters.time_step;
        let recovery_rate = state.infected as f64 / disease.infectious_period * parameters.time_step;

        let new_exposed = poisson(rng, infection_rate).min(state.susceptible);
        let new_infected = poisson(rng, progression_rate).min(state.exposed);
        let new_recovered = poisson(rng, recovery_rate).min(state.infected);

        let hospitalized = binomial(rng, state.infected, parameters.healthcare_seeking_rate);
        let tested_today = binomial(rng, hospitalized, parameters.testing_rate);
        let detected_today = binomial(rng, tested_today, parameters.test_sensitivity);

        let day = state.day + 1;
        let detected = state.detected + detected_today;

        SimulationState {
            susceptible: state.susceptible - new_exposed,
            exposed: state.exposed + new_exposed - new_infected,
            infected: state.infected + new_infected - new_recovered,
            recovered: state.recovered + new_recovered,
            hospitalized,
            tested: state.tested + tested_today,
            detected,
            day,
            first_detection_day: state
                .first_detection_day
                .or((detected >= FIRST_DETECTION_THRESHOLD).then_some(day)),
            tenth_detection_day: state
                .tenth_detection_day
                .or((detected >= TENTH_DETECTION_THRESHOLD).then_some(day)),
        }
    }

    /// A run ends when the outbreak dies out, when the tenth positive test
    /// comes in, or at the day ceiling.
    pub fn is_finished(state: &SimulationState, parameters: &SimulationParams) -> bool {
        state.is_extinct()
            || state.tenth_detection_day.is_some()
            || state.day >= parameters.max_days
    }

    /// Simulates one outbreak from day 0 until it finishes, returning every
    /// day's state.
    pub fn simulate<R: Rng>(parameters: &SimulationParams, rng: &mut R) -> Vec<SimulationState> {
        let mut state = SimulationState::initial(parameters);
        let mut trajectory = vec![state.clone()];
        while !Self::is_finished(&state, parameters) {
            state = Self::step(&state, parameters, rng);
            trajectory.push(state.clone());
        }
        trajectory
    }
}
