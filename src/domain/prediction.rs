//! Risk prediction types and the interpretation rule.

use serde::{Deserialize, Serialize};

/// Discrete output of the risk classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    /// No pregnancy risk indicators
    NoRisk,
    /// Indicators of a high-risk pregnancy
    HighRisk,
}

impl RiskLevel {
    /// Display label, as shown on the report.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::NoRisk => "No Risk",
            Self::HighRisk => "High Risk",
        }
    }

    /// Recommendation shown alongside the label.
    #[must_use]
    pub fn recommendation(&self) -> &'static str {
        match self {
            Self::NoRisk => {
                "Continue routine prenatal care and keep your scheduled check-ups."
            }
            Self::HighRisk => {
                "Consult your healthcare provider promptly for a detailed evaluation."
            }
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// The two classifier outputs: `[P(no risk), P(high risk)]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassProbabilities {
    pub no_risk: f64,
    pub high_risk: f64,
}

impl ClassProbabilities {
    #[must_use]
    pub fn new(no_risk: f64, high_risk: f64) -> Self {
        Self { no_risk, high_risk }
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.no_risk.is_finite() && self.high_risk.is_finite()
    }
}

impl From<(f64, f64)> for ClassProbabilities {
    fn from((no_risk, high_risk): (f64, f64)) -> Self {
        Self { no_risk, high_risk }
    }
}

/// Interpreted result of one successful inference.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskPrediction {
    pub risk_level: RiskLevel,
    /// Larger of the two class probabilities
    pub confidence: f64,
    pub probabilities: ClassProbabilities,
}

impl RiskPrediction {
    #[must_use]
    pub fn recommendation(&self) -> &'static str {
        self.risk_level.recommendation()
    }
}

/// Turn classifier outputs into a risk label.
///
/// High risk wins only with a strictly larger probability; an exact tie
/// resolves to `NoRisk`.
#[must_use]
pub fn interpret(probabilities: ClassProbabilities) -> RiskPrediction {
    let risk_level = if probabilities.high_risk > probabilities.no_risk {
        RiskLevel::HighRisk
    } else {
        RiskLevel::NoRisk
    };

    RiskPrediction {
        risk_level,
        confidence: probabilities.no_risk.max(probabilities.high_risk),
        probabilities,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_higher_probability_wins() {
        let low = interpret((0.9, 0.1).into());
        assert_eq!(low.risk_level, RiskLevel::NoRisk);
        assert!((low.confidence - 0.9).abs() < f64::EPSILON);

        let high = interpret((0.2, 0.8).into());
        assert_eq!(high.risk_level, RiskLevel::HighRisk);
        assert!((high.confidence - 0.8).abs() < f64::EPSILON);
    }

    #[test]
    fn test_tie_is_deterministic() {
        for _ in 0..100 {
            let prediction = interpret((0.5, 0.5).into());
            assert_eq!(prediction.risk_level, RiskLevel::NoRisk);
            assert!((prediction.confidence - 0.5).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn test_one_hot_outputs() {
        assert_eq!(interpret((1.0, 0.0).into()).risk_level, RiskLevel::NoRisk);
        assert_eq!(interpret((0.0, 1.0).into()).risk_level, RiskLevel::HighRisk);
        assert_eq!(interpret((0.0, 0.0).into()).risk_level, RiskLevel::NoRisk);
    }

    #[test]
    fn test_labels() {
        assert_eq!(RiskLevel::NoRisk.label(), "No Risk");
        assert_eq!(RiskLevel::HighRisk.to_string(), "High Risk");
    }

    #[test]
    fn test_probabilities_are_kept() {
        let prediction = interpret(ClassProbabilities::new(0.35, 0.65));
        assert_eq!(prediction.probabilities, ClassProbabilities::new(0.35, 0.65));
        assert!(!prediction.recommendation().is_empty());
    }
}
