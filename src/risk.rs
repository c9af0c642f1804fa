use tracing::debug;

use crate::model::Classifier;
use crate::models::{
    FeatureVector, PredictionResult, RiskCategory, StudentRecord, StudentScore, FEATURES,
};

/// Explicit handle around the loaded classifier, passed by reference to
/// whatever needs a score.
pub struct Scorer<C> {
    classifier: C,
}

impl<C: Classifier> Scorer<C> {
    pub fn new(classifier: C) -> Self {
        Self { classifier }
    }

    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    /// Placement probability as a whole percent, truncated toward zero.
    pub fn predict_probability(&self, features: &FeatureVector) -> u8 {
        let raw = self.classifier.positive_probability(features);
        // NaN fails the range check and is scored as 0.
        let clamped = if raw.is_nan() { 0.0 } else { raw.clamp(0.0, 1.0) };
        (clamped * 100.0) as u8
    }

    pub fn predict(&self, features: &FeatureVector) -> PredictionResult {
        let probability = self.predict_probability(features);
        PredictionResult {
            probability,
            risk: risk_category(probability),
        }
    }

    pub fn score_student(&self, student: &StudentRecord) -> StudentScore {
        let prediction = self.predict(&FeatureVector::from_student(student));
        debug!(
            student_id = %student.student_id,
            probability = prediction.probability,
            risk = %prediction.risk,
            "Scored student"
        );

        StudentScore {
            student_id: student.student_id.clone(),
            name: student.name.clone(),
            department: student.department.clone(),
            probability: prediction.probability,
            risk: prediction.risk,
        }
    }

    /// Scores every student, highest probability first. Ties keep roster order.
    pub fn score_students(&self, students: &[StudentRecord]) -> Vec<StudentScore> {
        let mut scores: Vec<StudentScore> = students
            .iter()
            .map(|student| self.score_student(student))
            .collect();
        scores.sort_by(|a, b| b.probability.cmp(&a.probability));
        scores
    }
}

pub fn risk_category(probability: u8) -> RiskCategory {
    match probability {
        80.. => RiskCategory::Low,
        60..=79 => RiskCategory::Medium,
        _ => RiskCategory::High,
    }
}

/// The three lowest raw feature values, as "improve this skill" hints.
///
/// Values are compared as-is: CGPA (out of 10) is not rescaled against the
/// scores (out of 100). Ties keep [`FEATURES`] order. Fewer than three inputs
/// yield as many pairs as were given.
pub fn explain_risk(features: &[f64]) -> Vec<(&'static str, f64)> {
    let mut pairs: Vec<(&'static str, f64)> = FEATURES
        .iter()
        .copied()
        .zip(features.iter().copied())
        .collect();
    pairs.sort_by(|a, b| a.1.total_cmp(&b.1));
    pairs.truncate(3);
    pairs
}
