use std::fmt::Write;
use std::path::Path;

use chrono::NaiveDate;

use crate::models::{CompanyRecord, PredictionResult, StudentRecord, StudentScore};

const GAUGE_WIDTH: usize = 20;

/// Everything a single student's dashboard shows.
pub struct Dashboard<'a> {
    pub student: &'a StudentRecord,
    pub prediction: PredictionResult,
    pub explanation: &'a [(&'static str, f64)],
    pub eligible: bool,
    pub companies: &'a [&'a CompanyRecord],
    pub photo: Option<&'a Path>,
    pub metrics_chart: Option<&'a str>,
    pub radar_chart: Option<&'a str>,
}

/// `placement_training_score` -> `Placement Training Score`.
pub fn display_name(feature: &str) -> String {
    feature
        .split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// `[#########...........] 45%`
pub fn gauge(probability: u8) -> String {
    let filled = (usize::from(probability.min(100)) * GAUGE_WIDTH) / 100;
    format!(
        "[{}{}] {}%",
        "#".repeat(filled),
        ".".repeat(GAUGE_WIDTH - filled),
        probability
    )
}

pub fn eligibility_label(eligible: bool) -> &'static str {
    if eligible {
        "Eligible"
    } else {
        "Not Eligible"
    }
}

pub fn build_dashboard(dashboard: &Dashboard<'_>, generated_on: NaiveDate) -> String {
    let student = dashboard.student;
    let prediction = dashboard.prediction;
    let mut output = String::new();

    let _ = writeln!(output, "# Student Placement Prediction");
    let _ = writeln!(
        output,
        "Generated for {} ({}) on {}",
        student.name, student.student_id, generated_on
    );
    let _ = writeln!(output);

    let _ = writeln!(output, "## Student Profile");
    match dashboard.photo {
        Some(path) => {
            let _ = writeln!(output, "![{}]({})", student.name, path.display());
        }
        None => {
            let _ = writeln!(output, "_Photo not found_");
        }
    }
    let _ = writeln!(output);
    let _ = writeln!(output, "- **Name:** {}", student.name);
    let _ = writeln!(output, "- **Department:** {}", student.department);
    let _ = writeln!(output, "- **Year:** {}", student.year);
    let _ = writeln!(output, "- **CGPA:** {}", student.cgpa);
    let _ = writeln!(output, "- **10th %:** {}", student.tenth_percent);
    let _ = writeln!(output, "- **12th %:** {}", student.twelfth_percent);
    let _ = writeln!(output, "- **Attendance:** {}%", student.attendance);
    let _ = writeln!(output, "- **Aptitude:** {}", student.aptitude_score);
    let _ = writeln!(output, "- **Coding:** {}", student.coding_score);
    let _ = writeln!(output, "- **Training:** {}", student.placement_training_score);
    let _ = writeln!(output, "- **Communication:** {}", student.communication_score);
    let _ = writeln!(output, "- **Soft Skills:** {}", student.soft_skill_score);
    let _ = writeln!(output, "- **Backlogs:** {}", student.backlogs);
    let _ = writeln!(output);

    let _ = writeln!(output, "## AI Prediction Summary");
    let _ = writeln!(
        output,
        "`{}` (colour {})",
        gauge(prediction.probability),
        prediction.risk.color()
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "- **Risk Category:** {}", prediction.risk);
    let _ = writeln!(
        output,
        "- **Predicted Domain / Role:** {}",
        student.domain_interest
    );
    let _ = writeln!(
        output,
        "- **Placement Eligibility:** {}",
        eligibility_label(dashboard.eligible)
    );
    let _ = writeln!(output);

    let _ = writeln!(output, "## Reason for Risk Category & Improvement");
    for (feature, _) in dashboard.explanation {
        let _ = writeln!(output, "- {} - Improve this skill", display_name(feature));
    }
    let _ = writeln!(output);

    if dashboard.metrics_chart.is_some() || dashboard.radar_chart.is_some() {
        let _ = writeln!(output, "## Visual Analytics");
        if let Some(chart) = dashboard.metrics_chart {
            let _ = writeln!(output, "![Key Metrics]({chart})");
        }
        if let Some(chart) = dashboard.radar_chart {
            let _ = writeln!(output, "![Skill Radar]({chart})");
        }
        let _ = writeln!(output);
    }

    let _ = writeln!(output, "## Recommended Companies");
    if dashboard.companies.is_empty() {
        let _ = writeln!(output, "No matching companies found");
    } else {
        for company in dashboard.companies {
            let _ = writeln!(
                output,
                "- **{} - {}**: {} | {} | [Apply Now]({})",
                company.company_name,
                company.role,
                company.interview_date,
                company.mode,
                company.apply_link
            );
        }
    }

    output
}

pub fn build_ranking(scores: &[StudentScore], limit: usize) -> String {
    let mut output = String::new();

    if scores.is_empty() {
        let _ = writeln!(output, "No students matched this filter.");
        return output;
    }

    let _ = writeln!(output, "Students by placement probability:");
    for score in scores.iter().take(limit) {
        let _ = writeln!(
            output,
            "- {} ({}, {}) {}% {}",
            score.name, score.student_id, score.department, score.probability, score.risk
        );
    }

    output
}
