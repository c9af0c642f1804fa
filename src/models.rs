use std::fmt;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::DashboardError;

pub const FEATURE_COUNT: usize = 6;

/// Feature order shared by the model artifact and the scorer.
pub const FEATURES: [&str; FEATURE_COUNT] = [
    "cgpa",
    "aptitude_score",
    "coding_score",
    "placement_training_score",
    "communication_score",
    "soft_skill_score",
];

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StudentRecord {
    pub student_id: String,
    pub name: String,
    pub department: String,
    pub year: u32,
    pub cgpa: f64,
    pub tenth_percent: f64,
    pub twelfth_percent: f64,
    pub attendance: f64,
    pub aptitude_score: f64,
    pub coding_score: f64,
    pub placement_training_score: f64,
    pub communication_score: f64,
    pub soft_skill_score: f64,
    pub backlogs: u32,
    pub domain_interest: String,
    pub photo_path: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CompanyRecord {
    pub company_name: String,
    pub role: String,
    pub min_cgpa: f64,
    pub required_domain: String,
    pub interview_date: NaiveDate,
    pub mode: String,
    pub apply_link: String,
}

/// Six values in [`FEATURES`] order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn new(values: [f64; FEATURE_COUNT]) -> Self {
        Self(values)
    }

    pub fn from_student(student: &StudentRecord) -> Self {
        Self::new([
            student.cgpa,
            student.aptitude_score,
            student.coding_score,
            student.placement_training_score,
            student.communication_score,
            student.soft_skill_score,
        ])
    }

    pub fn values(&self) -> &[f64; FEATURE_COUNT] {
        &self.0
    }

    /// Name/value pairs in declaration order.
    pub fn named(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        FEATURES.iter().copied().zip(self.0.iter().copied())
    }
}

impl TryFrom<&[f64]> for FeatureVector {
    type Error = DashboardError;

    fn try_from(values: &[f64]) -> Result<Self, Self::Error> {
        let array: [f64; FEATURE_COUNT] =
            values.try_into().map_err(|_| DashboardError::InvalidFeatures {
                expected: FEATURE_COUNT,
                actual: values.len(),
            })?;
        Ok(Self(array))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RiskCategory {
    Low,
    Medium,
    High,
}

impl RiskCategory {
    /// Gauge colour used by the dashboard.
    pub fn color(self) -> &'static str {
        match self {
            RiskCategory::Low => "#27ae60",
            RiskCategory::Medium => "#f1c40f",
            RiskCategory::High => "#e74c3c",
        }
    }
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RiskCategory::Low => "Low Risk",
            RiskCategory::Medium => "Medium Risk",
            RiskCategory::High => "High Risk",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PredictionResult {
    pub probability: u8,
    pub risk: RiskCategory,
}

#[derive(Debug, Clone, Serialize)]
pub struct StudentScore {
    pub student_id: String,
    pub name: String,
    pub department: String,
    pub probability: u8,
    pub risk: RiskCategory,
}
