use outbreak::random::{binomial, normal, poisson};
use outbreak::{SeirModel, SimulationParams, presets};
use proptest::prelude::*;
use rand::{SeedableRng, rngs::StdRng};

fn arb_parameters() -> impl Strategy<Value = SimulationParams> {
    (
        1u64..20_000,
        0.0f64..1.0,
        0.0f64..12.0,
        0.5f64..30.0,
        0.0f64..5.0,
        (0.0f64..=1.0, 0.0f64..=1.0, 0.0f64..=1.0),
        (0.5f64..14.0, 1.0f64..21.0),
        1u32..120,
    )
        .prop_map(
            |(
                population,
                initial_fraction,
                r0,
                contact_rate,
                variability,
                (seeking, testing, sensitivity),
                (incubation, infectious),
                max_days,
            )| {
                let mut parameters =
                    SimulationParams::new(presets::find("SARS").unwrap().clone());
                parameters.total_population = population;
                parameters.initial_infected =
                    ((population as f64 * initial_fraction) as u64).clamp(1, population);
                parameters.disease.r0 = r0;
                parameters.disease.incubation_period = incubation;
                parameters.disease.infectious_period = infectious;
                parameters.base_contact_rate = contact_rate;
                parameters.contact_rate_variability = variability;
                parameters.healthcare_seeking_rate = seeking;
                parameters.testing_rate = testing;
                parameters.test_sensitivity = sensitivity;
                parameters.max_days = max_days;
                parameters
            },
        )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn population_is_conserved(parameters in arb_parameters(), seed in any::<u64>()) {
        prop_assert_eq!(parameters.validate(), Ok(()));
        let mut rng = StdRng::seed_from_u64(seed);
        let trajectory = SeirModel::simulate(&parameters, &mut rng);
        for state in &trajectory {
            prop_assert_eq!(state.population(), parameters.total_population);
        }
    }

    #[test]
    fn runs_terminate_within_ceiling(parameters in arb_parameters(), seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let trajectory = SeirModel::simulate(&parameters, &mut rng);
        let last = trajectory.last().unwrap();
        prop_assert!(last.day <= parameters.max_days);
        prop_assert_eq!(trajectory.len(), last.day as usize + 1);
    }

    #[test]
    fn milestones_are_ordered(parameters in arb_parameters(), seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let trajectory = SeirModel::simulate(&parameters, &mut rng);
        let last = trajectory.last().unwrap();
        if let Some(tenth) = last.tenth_detection_day {
            let first = last.first_detection_day.unwrap();
            prop_assert!(first <= tenth);
            prop_assert!(last.detected >= 10);
        }
        if last.first_detection_day.is_none() {
            prop_assert_eq!(last.detected, 0);
        }
    }

    #[test]
    fn binomial_stays_in_range(n in 0u64..5_000, p in -0.5f64..1.5, seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let k = binomial(&mut rng, n, p);
        prop_assert!(k <= n);
        if p <= 0. {
            prop_assert_eq!(k, 0);
        }
        if p >= 1. {
            prop_assert_eq!(k, n);
        }
    }

    #[test]
    fn poisson_of_non_positive_rate_is_zero(lambda in -1e6f64..=0., seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        prop_assert_eq!(poisson(&mut rng, lambda), 0);
    }

    #[test]
    fn normal_without_spread_is_mean(mean in 0.0f64..1e4, seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        prop_assert_eq!(normal(&mut rng, mean, 0.), mean);
    }
}
