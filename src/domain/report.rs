//! Health report assembled after each assessment.
//!
//! The report combines the raw vitals, a banded status per ancillary metric
//! and the overall status from the classifier. When no prediction is
//! available the overall status says so explicitly instead of carrying a
//! risk label.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

use super::patient::{ObstetricHistory, PersonalVitals};
use super::prediction::{RiskLevel, RiskPrediction};

/// Overall label used when the classifier produced nothing.
pub const AI_UNAVAILABLE_LABEL: &str = "AI Unavailable";

/// Detail text paired with [`AI_UNAVAILABLE_LABEL`].
pub const AI_UNAVAILABLE_DETAIL: &str = "AI prediction unavailable: traditional assessment only";

/// Relative distance outside the normal band still treated as a warning.
pub const WARNING_MARGIN: f64 = 0.10;

pub const RESPIRATION_NORMAL: NormalRange = NormalRange::new(12.0, 20.0);
pub const HEMOGLOBIN_NORMAL: NormalRange = NormalRange::new(11.0, 15.0);
pub const GLUCOSE_NORMAL: NormalRange = NormalRange::new(70.0, 140.0);
pub const OXYGEN_SATURATION_NORMAL: NormalRange = NormalRange::new(95.0, 100.0);

/// Status of a single metric, ordered by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricStatus {
    Normal,
    Warning,
    Critical,
}

impl MetricStatus {
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Warning => "warning",
            Self::Critical => "critical",
        }
    }
}

impl std::fmt::Display for MetricStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Inclusive normal band for a metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalRange {
    pub min: f64,
    pub max: f64,
}

impl NormalRange {
    #[must_use]
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }

    /// Band a value: inside the range is normal, up to [`WARNING_MARGIN`]
    /// beyond the violated bound is a warning, anything further is critical.
    #[must_use]
    pub fn classify(&self, value: f64) -> MetricStatus {
        if self.contains(value) {
            return MetricStatus::Normal;
        }

        let deviation = if value < self.min {
            relative_distance(self.min - value, self.min)
        } else {
            relative_distance(value - self.max, self.max)
        };

        // NaN deviation falls through to critical.
        if deviation <= WARNING_MARGIN {
            MetricStatus::Warning
        } else {
            MetricStatus::Critical
        }
    }
}

fn relative_distance(distance: f64, bound: f64) -> f64 {
    if bound == 0.0 {
        f64::INFINITY
    } else {
        distance / bound.abs()
    }
}

/// One banded metric row on the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricEntry {
    pub name: String,
    pub value: f64,
    pub unit: String,
    pub normal_range: NormalRange,
    pub status: MetricStatus,
}

impl MetricEntry {
    #[must_use]
    pub fn new(name: &str, value: f64, unit: &str, normal_range: NormalRange) -> Self {
        Self {
            name: name.to_string(),
            value,
            unit: unit.to_string(),
            normal_range,
            status: normal_range.classify(value),
        }
    }
}

/// Systolic/diastolic pair in mmHg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BloodPressure {
    pub systolic: u32,
    pub diastolic: u32,
}

impl std::fmt::Display for BloodPressure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.systolic, self.diastolic)
    }
}

/// Overall status of the report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OverallStatus {
    /// The classifier produced a prediction.
    Assessed {
        risk_level: RiskLevel,
        confidence: f64,
    },
    /// Inference failed or the model was not ready.
    Unavailable,
}

impl OverallStatus {
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Assessed { risk_level, .. } => risk_level.label(),
            Self::Unavailable => AI_UNAVAILABLE_LABEL,
        }
    }

    #[must_use]
    pub fn detail(&self) -> &'static str {
        match self {
            Self::Assessed { risk_level, .. } => risk_level.recommendation(),
            Self::Unavailable => AI_UNAVAILABLE_DETAIL,
        }
    }

    #[must_use]
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Assessed { .. })
    }
}

/// Complete report for one assessment run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub id: String,
    pub patient_name: String,
    /// Long date, e.g. "October 19, 2026"
    pub date: String,
    pub created_at: DateTime<Utc>,
    pub heart_rate: u32,
    pub blood_pressure: BloodPressure,
    /// Body temperature in °F
    pub temperature: f64,
    pub metrics: Vec<MetricEntry>,
    pub overall: OverallStatus,
    pub prediction: Option<RiskPrediction>,
    pub obstetric_history: ObstetricHistory,
}

impl HealthReport {
    /// Worst status across the banded metrics.
    ///
    /// This is the traditional assessment shown next to an unavailable
    /// prediction.
    #[must_use]
    pub fn traditional_status(&self) -> MetricStatus {
        self.metrics
            .iter()
            .map(|m| m.status)
            .max()
            .unwrap_or(MetricStatus::Normal)
    }
}

/// Estimated SpO2 (%) derived from respiration and hemoglobin.
///
/// Starts from 98% and drops for tachypnea and anemia; clamped to 70..=100.
#[must_use]
pub fn estimated_oxygen_saturation(vitals: &PersonalVitals) -> f64 {
    let tachypnea = (f64::from(vitals.respiration_rate) - 20.0).max(0.0);
    let anemia = (11.0 - vitals.hemoglobin).max(0.0);
    (98.0 - 0.5 * tachypnea - anemia).clamp(70.0, 100.0)
}

/// Build the report for the current moment.
#[must_use]
pub fn build(
    vitals: &PersonalVitals,
    history: &ObstetricHistory,
    patient_name: &str,
    prediction: Option<RiskPrediction>,
) -> HealthReport {
    build_at(vitals, history, patient_name, prediction, Local::now())
}

/// Build the report as of `now`.
#[must_use]
pub fn build_at(
    vitals: &PersonalVitals,
    history: &ObstetricHistory,
    patient_name: &str,
    prediction: Option<RiskPrediction>,
    now: DateTime<Local>,
) -> HealthReport {
    let metrics = vec![
        MetricEntry::new(
            "Respiration Rate",
            f64::from(vitals.respiration_rate),
            "breaths/min",
            RESPIRATION_NORMAL,
        ),
        MetricEntry::new("Hemoglobin", vitals.hemoglobin, "g/dL", HEMOGLOBIN_NORMAL),
        MetricEntry::new("Blood Glucose", vitals.glucose, "mg/dL", GLUCOSE_NORMAL),
        MetricEntry::new(
            "Oxygen Saturation",
            estimated_oxygen_saturation(vitals),
            "%",
            OXYGEN_SATURATION_NORMAL,
        ),
    ];

    let overall = match prediction {
        Some(p) => OverallStatus::Assessed {
            risk_level: p.risk_level,
            confidence: p.confidence,
        },
        None => OverallStatus::Unavailable,
    };

    HealthReport {
        id: report_id(),
        patient_name: patient_name.to_string(),
        date: now.format("%B %-d, %Y").to_string(),
        created_at: now.with_timezone(&Utc),
        heart_rate: vitals.pulse_rate,
        blood_pressure: BloodPressure {
            systolic: vitals.systolic_bp,
            diastolic: vitals.diastolic_bp,
        },
        temperature: vitals.body_temperature,
        metrics,
        overall,
        prediction,
        obstetric_history: *history,
    }
}

/// Random v4-style identifier from a ChaCha20 CSPRNG.
fn report_id() -> String {
    use rand::Rng;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    let mut rng = ChaCha20Rng::from_entropy();
    let mut bytes: [u8; 16] = rng.gen();
    bytes[6] = (bytes[6] & 0x0f) | 0x40;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;

    let hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
    format!(
        "{}-{}-{}-{}-{}",
        &hex[0..8],
        &hex[8..12],
        &hex[12..16],
        &hex[16..20],
        &hex[20..32]
    )
}
