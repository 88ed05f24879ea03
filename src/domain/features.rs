//! Feature assembly for the risk classifier.

use serde::{Deserialize, Serialize};

use super::patient::{ObstetricHistory, PersonalVitals};

/// Number of inputs the classifier expects.
pub const FEATURE_COUNT: usize = 14;

/// Feature names in classifier input order.
///
/// The order is a contract with the trained model and must never change.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "age",
    "gravida",
    "para",
    "live_births",
    "abortions",
    "child_deaths",
    "systolic_bp",
    "diastolic_bp",
    "glucose",
    "body_temperature",
    "pulse_rate",
    "hemoglobin",
    "hba1c",
    "respiration_rate",
];

/// Fixed-order classifier input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

/// Map the two patient records onto the classifier input.
///
/// No validation happens here: callers check the records first. Unchecked
/// values pass straight through.
#[must_use]
pub fn assemble(vitals: &PersonalVitals, history: &ObstetricHistory) -> FeatureVector {
    FeatureVector([
        f64::from(vitals.age),
        f64::from(history.gravida),
        f64::from(history.para),
        f64::from(history.live_births),
        f64::from(history.abortions),
        f64::from(history.child_deaths),
        f64::from(vitals.systolic_bp),
        f64::from(vitals.diastolic_bp),
        vitals.glucose,
        vitals.body_temperature,
        f64::from(vitals.pulse_rate),
        vitals.hemoglobin,
        vitals.hba1c,
        f64::from(vitals.respiration_rate),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::patient::tests::{sample_history, sample_vitals};

    #[test]
    fn test_reference_vector() {
        let vector = assemble(&sample_vitals(), &sample_history());
        assert_eq!(
            vector.as_slice(),
            &[28.0, 2.0, 1.0, 1.0, 0.0, 0.0, 120.0, 80.0, 95.0, 98.6, 72.0, 14.5, 5.2, 16.0]
        );
    }

    #[test]
    fn test_each_field_lands_at_its_index() {
        // Distinct values so any swap shows up.
        let vitals = PersonalVitals {
            age: 1,
            systolic_bp: 7,
            diastolic_bp: 8,
            glucose: 9.0,
            body_temperature: 10.0,
            pulse_rate: 11,
            hemoglobin: 12.0,
            hba1c: 13.0,
            respiration_rate: 14,
        };
        let history = ObstetricHistory {
            gravida: 2,
            para: 3,
            live_births: 4,
            abortions: 5,
            child_deaths: 6,
        };

        let vector = assemble(&vitals, &history);
        assert_eq!(vector.as_slice().len(), FEATURE_COUNT);
        for (i, value) in vector.as_slice().iter().enumerate() {
            assert!((value - (i as f64 + 1.0)).abs() < f64::EPSILON, "index {i}");
        }
    }

    #[test]
    fn test_unvalidated_input_passes_through() {
        let vitals = PersonalVitals {
            age: 0,
            glucose: f64::NAN,
            body_temperature: -40.0,
            ..sample_vitals()
        };
        let history = ObstetricHistory {
            gravida: u32::MAX,
            ..Default::default()
        };

        let vector = assemble(&vitals, &history);
        assert_eq!(vector.as_slice().len(), FEATURE_COUNT);
        assert!(vector.as_slice()[8].is_nan());
        assert!((vector.as_slice()[1] - f64::from(u32::MAX)).abs() < 1.0);
    }
}
