use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Epidemiological characteristics of a named disease.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiseasePreset {
    pub name: String,
    /// Basic reproduction number, calibrated against the batch's base contact
    /// rate.
    pub r0: f64,
    /// Mean incubation period in days.
    pub incubation_period: f64,
    /// Mean infectious period in days.
    pub infectious_period: f64,
    /// Day the outbreak was first detected historically, for comparison only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub historical_first_detection_day: Option<u32>,
}

impl DiseasePreset {
    /// Per-contact transmission probability implied by `r0` at the given
    /// contact rate.
    pub fn transmission_probability(&self, base_contact_rate: f64) -> f64 {
        self.r0 / base_contact_rate
    }
}

/// Which per-day quantity is averaged across runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateMetric {
    /// Everyone ever infected: `infected + recovered`.
    #[default]
    CumulativeInfected,
    /// Currently infectious: `infected`.
    CurrentlyInfected,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationParams {
    pub total_population: u64,
    pub initial_infected: u64,
    /// Mean daily contacts per person.
    pub base_contact_rate: f64,
    /// Standard deviation of the daily contact rate.
    #[serde(default)]
    pub contact_rate_variability: f64,
    /// Probability an infected person seeks healthcare on a given day.
    pub healthcare_seeking_rate: f64,
    /// Probability a healthcare seeker is tested.
    pub testing_rate: f64,
    /// Probability a test of an infected person comes back positive.
    #[serde(default = "default_probability_one")]
    pub test_sensitivity: f64,
    /// Days per step.
    #[serde(default = "default_time_step")]
    pub time_step: f64,
    #[serde(default = "default_num_runs")]
    pub num_runs: u32,
    /// A run stops once it reaches this day.
    #[serde(default = "default_max_days")]
    pub max_days: u32,
    #[serde(default)]
    pub metric: AggregateMetric,
    /// Batch seed; drawn from OS entropy when absent.
    #[serde(default)]
    pub seed: Option<u64>,
    pub disease: DiseasePreset,
}

fn default_probability_one() -> f64 {
    1.0
}

fn default_time_step() -> f64 {
    1.0
}

fn default_num_runs() -> u32 {
    100
}

fn default_max_days() -> u32 {
    100
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParameterError {
    #[error("total population must be positive")]
    EmptyPopulation,
    #[error("initial infected must be in 1..={total_population}, got {initial_infected}")]
    InitialInfected {
        initial_infected: u64,
        total_population: u64,
    },
    #[error("{name} must be a probability in [0, 1], got {value}")]
    Probability { name: &'static str, value: f64 },
    #[error("{name} must be positive and finite, got {value}")]
    NotPositive { name: &'static str, value: f64 },
    #[error("{name} must be non-negative and finite, got {value}")]
    Negative { name: &'static str, value: f64 },
    #[error("{0} must be at least 1")]
    ZeroCount(&'static str),
}

impl SimulationParams {
    /// Parameters with the defaults used for interactive exploration: a
    /// population of ten thousand seeded with ten cases.
    pub fn new(disease: DiseasePreset) -> Self {
        Self {
            total_population: 10_000,
            initial_infected: 10,
            base_contact_rate: 20.0,
            contact_rate_variability: 0.0,
            healthcare_seeking_rate: 0.5,
            testing_rate: 0.8,
            test_sensitivity: default_probability_one(),
            time_step: default_time_step(),
            num_runs: default_num_runs(),
            max_days: default_max_days(),
            metric: AggregateMetric::default(),
            seed: None,
            disease,
        }
    }

    pub fn validate(&self) -> Result<(), ParameterError> {
        if self.total_population == 0 {
            return Err(ParameterError::EmptyPopulation);
        }
        if self.initial_infected == 0 || self.initial_infected > self.total_population {
            return Err(ParameterError::InitialInfected {
                initial_infected: self.initial_infected,
                total_population: self.total_population,
            });
        }

        for (name, value) in [
            ("healthcare_seeking_rate", self.healthcare_seeking_rate),
            ("testing_rate", self.testing_rate),
            ("test_sensitivity", self.test_sensitivity),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ParameterError::Probability { name, value });
            }
        }

        for (name, value) in [
            ("base_contact_rate", self.base_contact_rate),
            ("time_step", self.time_step),
            ("incubation_period", self.disease.incubation_period),
            ("infectious_period", self.disease.infectious_period),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ParameterError::NotPositive { name, value });
            }
        }

        for (name, value) in [
            ("contact_rate_variability", self.contact_rate_variability),
            ("r0", self.disease.r0),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ParameterError::Negative { name, value });
            }
        }

        if self.num_runs == 0 {
            return Err(ParameterError::ZeroCount("num_runs"));
        }
        if self.max_days == 0 {
            return Err(ParameterError::ZeroCount("max_days"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::presets;

    fn params() -> SimulationParams {
        SimulationParams::new(presets::find("SARS").unwrap().clone())
    }

    #[test]
    fn test_defaults_are_valid() {
        assert_eq!(params().validate(), Ok(()));
    }

    #[test]
    fn test_initial_infected_bounds() {
        let mut p = params();
        p.initial_infected = 0;
        assert!(matches!(
            p.validate(),
            Err(ParameterError::InitialInfected { .. })
        ));
        p.initial_infected = p.total_population + 1;
        assert!(matches!(
            p.validate(),
            Err(ParameterError::InitialInfected { .. })
        ));
        p.initial_infected = p.total_population;
        assert_eq!(p.validate(), Ok(()));
    }

    #[test]
    fn test_probabilities() {
        let mut p = params();
        p.testing_rate = 1.2;
        assert_eq!(
            p.validate(),
            Err(ParameterError::Probability {
                name: "testing_rate",
                value: 1.2
            })
        );
        let mut p = params();
        p.healthcare_seeking_rate = f64::NAN;
        assert!(matches!(
            p.validate(),
            Err(ParameterError::Probability {
                name: "healthcare_seeking_rate",
                ..
            })
        ));
    }

    #[test]
    fn test_rates_and_periods() {
        let mut p = params();
        p.base_contact_rate = 0.0;
        assert!(matches!(
            p.validate(),
            Err(ParameterError::NotPositive {
                name: "base_contact_rate",
                ..
            })
        ));
        let mut p = params();
        p.disease.incubation_period = f64::INFINITY;
        assert!(matches!(
            p.validate(),
            Err(ParameterError::NotPositive {
                name: "incubation_period",
                ..
            })
        ));
        let mut p = params();
        p.contact_rate_variability = -1.0;
        assert!(matches!(
            p.validate(),
            Err(ParameterError::Negative {
                name: "contact_rate_variability",
                ..
            })
        ));
        let mut p = params();
        p.disease.r0 = 0.0;
        assert_eq!(p.validate(), Ok(()));
    }

    #[test]
    fn test_counts() {
        let mut p = params();
        p.num_runs = 0;
        assert_eq!(p.validate(), Err(ParameterError::ZeroCount("num_runs")));
        let mut p = params();
        p.max_days = 0;
        assert_eq!(p.validate(), Err(ParameterError::ZeroCount("max_days")));
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let p: SimulationParams = serde_json::from_value(serde_json::json!({
            "total_population": 1000,
            "initial_infected": 1,
            "base_contact_rate": 10.0,
            "healthcare_seeking_rate": 0.5,
            "testing_rate": 0.16,
            "metric": "currently_infected",
            "disease": {
                "name": "Test",
                "r0": 2.0,
                "incubation_period": 3.0,
                "infectious_period": 5.0
            }
        }))
        .unwrap();
        assert_eq!(p.test_sensitivity, 1.0);
        assert_eq!(p.time_step, 1.0);
        assert_eq!(p.num_runs, 100);
        assert_eq!(p.max_days, 100);
        assert_eq!(p.metric, AggregateMetric::CurrentlyInfected);
        assert_eq!(p.seed, None);
        assert_eq!(p.disease.historical_first_detection_day, None);
        assert_eq!(p.disease.transmission_probability(10.0), 0.2);
    }
}
