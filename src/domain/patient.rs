//! Patient records entered before a risk assessment.
//!
//! Two records feed the pipeline: the personal vitals measured at the visit
//! and the obstetric history. Both carry a `validate()` check that the intake
//! layer runs before any prediction is attempted.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

/// Plausible ranges for each vital (inclusive).
pub const AGE_RANGE: RangeInclusive<u32> = 15..=49;
pub const SYSTOLIC_RANGE: RangeInclusive<u32> = 70..=200;
pub const DIASTOLIC_RANGE: RangeInclusive<u32> = 40..=120;
pub const GLUCOSE_RANGE: RangeInclusive<f64> = 50.0..=400.0;
pub const TEMPERATURE_RANGE: RangeInclusive<f64> = 95.0..=107.0;
pub const PULSE_RANGE: RangeInclusive<u32> = 40..=180;
pub const HEMOGLOBIN_RANGE: RangeInclusive<f64> = 5.0..=20.0;
pub const HBA1C_RANGE: RangeInclusive<f64> = 3.0..=15.0;
pub const RESPIRATION_RANGE: RangeInclusive<u32> = 8..=40;

/// Input rejected by the intake checks.
///
/// Every violated rule is reported, not just the first one.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{}", .problems.join("; "))]
pub struct ValidationError {
    pub problems: Vec<String>,
}

impl ValidationError {
    fn from_problems(problems: Vec<String>) -> Result<(), Self> {
        if problems.is_empty() {
            Ok(())
        } else {
            Err(Self { problems })
        }
    }

    /// Merge the problems of two checks into a single error.
    pub fn merge(results: [Result<(), Self>; 2]) -> Result<(), Self> {
        let problems = results
            .into_iter()
            .filter_map(Result::err)
            .flat_map(|e| e.problems)
            .collect();
        Self::from_problems(problems)
    }
}

/// Vitals recorded for the current visit.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PersonalVitals {
    /// Age in years
    pub age: u32,
    /// Systolic blood pressure in mmHg
    pub systolic_bp: u32,
    /// Diastolic blood pressure in mmHg
    pub diastolic_bp: u32,
    /// Random blood glucose in mg/dL
    pub glucose: f64,
    /// Body temperature in °F
    pub body_temperature: f64,
    /// Pulse rate in BPM
    pub pulse_rate: u32,
    /// Hemoglobin in g/dL
    pub hemoglobin: f64,
    /// Glycated hemoglobin in %
    pub hba1c: f64,
    /// Respiration rate in breaths/min
    pub respiration_rate: u32,
}

impl PersonalVitals {
    /// Check every field against its plausible range.
    ///
    /// # Errors
    /// Returns a `ValidationError` listing each out-of-range field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut problems = Vec::new();

        check_int(&mut problems, "Age", self.age, &AGE_RANGE);
        check_int(&mut problems, "Systolic BP", self.systolic_bp, &SYSTOLIC_RANGE);
        check_int(&mut problems, "Diastolic BP", self.diastolic_bp, &DIASTOLIC_RANGE);
        check_float(&mut problems, "Glucose", self.glucose, &GLUCOSE_RANGE);
        check_float(
            &mut problems,
            "Body temperature",
            self.body_temperature,
            &TEMPERATURE_RANGE,
        );
        check_int(&mut problems, "Pulse rate", self.pulse_rate, &PULSE_RANGE);
        check_float(&mut problems, "Hemoglobin", self.hemoglobin, &HEMOGLOBIN_RANGE);
        check_float(&mut problems, "HbA1c", self.hba1c, &HBA1C_RANGE);
        check_int(
            &mut problems,
            "Respiration rate",
            self.respiration_rate,
            &RESPIRATION_RANGE,
        );

        if self.diastolic_bp >= self.systolic_bp {
            problems.push(format!(
                "Diastolic BP {} must be below systolic BP {}",
                self.diastolic_bp, self.systolic_bp
            ));
        }

        ValidationError::from_problems(problems)
    }
}

/// Obstetric history (GPAL counts).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ObstetricHistory {
    /// Total pregnancies, including the current one
    pub gravida: u32,
    /// Deliveries after 20 weeks
    pub para: u32,
    pub live_births: u32,
    pub abortions: u32,
    pub child_deaths: u32,
}

impl ObstetricHistory {
    /// Check the relationships between the counts.
    ///
    /// # Errors
    /// Returns a `ValidationError` listing each inconsistent relationship.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut problems = Vec::new();

        if self.live_births > self.para {
            problems.push(format!(
                "Live births {} cannot exceed para {}",
                self.live_births, self.para
            ));
        }
        if self.child_deaths > self.live_births {
            problems.push(format!(
                "Child deaths {} cannot exceed live births {}",
                self.child_deaths, self.live_births
            ));
        }
        if u64::from(self.para) + u64::from(self.abortions) > u64::from(self.gravida) {
            problems.push(format!(
                "Para {} plus abortions {} cannot exceed gravida {}",
                self.para, self.abortions, self.gravida
            ));
        }

        ValidationError::from_problems(problems)
    }
}

fn check_int(problems: &mut Vec<String>, name: &str, value: u32, range: &RangeInclusive<u32>) {
    if !range.contains(&value) {
        problems.push(format!(
            "{name} {value} out of range [{}, {}]",
            range.start(),
            range.end()
        ));
    }
}

fn check_float(problems: &mut Vec<String>, name: &str, value: f64, range: &RangeInclusive<f64>) {
    // NaN fails `contains`, so it is reported as out of range too.
    if !range.contains(&value) {
        problems.push(format!(
            "{name} {value} out of range [{}, {}]",
            range.start(),
            range.end()
        ));
    }
}
