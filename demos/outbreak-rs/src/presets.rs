//! Built-in disease catalog.

use std::sync::LazyLock;

use serde::Deserialize;

use crate::parameters::DiseasePreset;

static CATALOG: LazyLock<Vec<DiseasePreset>> = LazyLock::new(|| {
    vec![
        preset("SARS-CoV-2 (Wild-type)", 2.5, 6.67, 8.0, Some(42)),
        preset("SARS-CoV-2 (Omicron)", 9.5, 4.0, 8.0, None),
        preset("SARS", 2.4, 4.0, 10.0, None),
        preset("Seasonal Influenza", 1.3, 2.0, 4.0, None),
        preset("1918 Influenza", 2.0, 2.0, 4.0, None),
    ]
});

fn preset(
    name: &str,
    r0: f64,
    incubation_period: f64,
    infectious_period: f64,
    historical_first_detection_day: Option<u32>,
) -> DiseasePreset {
    DiseasePreset {
        name: name.to_string(),
        r0,
        incubation_period,
        infectious_period,
        historical_first_detection_day,
    }
}

/// The built-in presets, in display order.
pub fn catalog() -> &'static [DiseasePreset] {
    &CATALOG
}

/// Case-insensitive lookup in the built-in catalog.
pub fn find(name: &str) -> Option<&'static DiseasePreset> {
    find_in(catalog(), name)
}

pub fn find_in<'a>(presets: &'a [DiseasePreset], name: &str) -> Option<&'a DiseasePreset> {
    presets.iter().find(|p| p.name.eq_ignore_ascii_case(name))
}

/// Shape of a catalog file: a list of `[[presets]]` tables.
#[derive(Debug, Deserialize)]
pub struct PresetFile {
    pub presets: Vec<DiseasePreset>,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_catalog_order_and_lookup() {
        let names: Vec<&str> = catalog().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names[0], "SARS-CoV-2 (Wild-type)");
        assert_eq!(names.len(), 5);

        let flu = find("seasonal influenza").unwrap();
        assert_eq!(flu.incubation_period, 2.0);
        assert!(find("Measles").is_none());
    }

    #[test]
    fn test_catalog_is_valid() {
        for disease in catalog() {
            let params = crate::SimulationParams::new(disease.clone());
            assert_eq!(params.validate(), Ok(()), "{}", disease.name);
        }
    }

    #[test]
    fn test_preset_file() {
        let file: PresetFile = toml::from_str(
            r#"
            [[presets]]
            name = "Measles"
            r0 = 15.0
            incubation_period = 11.0
            infectious_period = 8.0
            historical_first_detection_day = 20
            "#,
        )
        .unwrap();
        let measles = find_in(&file.presets, "MEASLES").unwrap();
        assert_eq!(measles.r0, 15.0);
        assert_eq!(measles.historical_first_detection_day, Some(20));
    }
}
