use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;

mod charts;
mod config;
mod data;
mod error;
mod matching;
mod model;
mod models;
mod report;
mod risk;

use config::{AppContext, Config};
use models::{
    CompanyRecord, FeatureVector, PredictionResult, RiskCategory, StudentRecord, FEATURES,
};
use report::Dashboard;

#[derive(Parser)]
#[command(name = "placement-dashboard")]
#[command(about = "Student placement prediction dashboard", long_about = None)]
struct Cli {
    #[command(flatten)]
    config: Config,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the student roster
    Students,
    /// Score every student and rank by placement probability
    Score {
        #[arg(long)]
        department: Option<String>,
        #[arg(long, value_enum)]
        risk: Option<RiskCategory>,
        #[arg(long, default_value_t = 10)]
        limit: usize,
        #[arg(long)]
        json: bool,
    },
    /// Print one student's prediction, explanation and company matches
    Show {
        #[arg(long)]
        student_id: String,
        #[arg(long)]
        json: bool,
    },
    /// Write a Markdown dashboard with key-metric and skill-radar charts
    Report {
        #[arg(long)]
        student_id: String,
        #[arg(long, default_value = "dashboard.md")]
        out: PathBuf,
    },
    /// Score a raw feature vector given in FEATURES order
    Predict {
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
        features: Vec<f64>,
    },
    /// Summarize the loaded model artifact
    InspectModel,
}

#[derive(Serialize)]
struct StudentView<'a> {
    student: &'a StudentRecord,
    prediction: PredictionResult,
    explanation: Vec<Hint>,
    eligible: bool,
    companies: Vec<&'a CompanyRecord>,
}

#[derive(Serialize)]
struct Hint {
    feature: &'static str,
    value: f64,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    config::init_logging(cli.config.verbose)?;

    let context = AppContext::load(cli.config)?;

    match cli.command {
        Commands::Students => {
            for student in context.roster.students() {
                println!(
                    "{}  {} ({}, year {})",
                    student.student_id, student.name, student.department, student.year
                );
            }
        }
        Commands::Score {
            department,
            risk,
            limit,
            json,
        } => {
            let students: Vec<StudentRecord> = context
                .roster
                .students()
                .iter()
                .filter(|student| {
                    department
                        .as_deref()
                        .map_or(true, |wanted| student.department.eq_ignore_ascii_case(wanted))
                })
                .cloned()
                .collect();

            let scores: Vec<_> = context
                .scorer
                .score_students(&students)
                .into_iter()
                .filter(|score| risk.map_or(true, |wanted| score.risk == wanted))
                .collect();
            info!(scored = scores.len(), "Scored roster");

            if json {
                let limited: Vec<_> = scores.iter().take(limit).collect();
                println!("{}", serde_json::to_string_pretty(&limited)?);
            } else {
                print!("{}", report::build_ranking(&scores, limit));
            }
        }
        Commands::Show { student_id, json } => {
            let student = context.roster.find(&student_id)?;
            let features = FeatureVector::from_student(student);
            let prediction = context.scorer.predict(&features);
            let explanation = risk::explain_risk(features.values());
            let eligible = matching::is_eligible(student);
            let companies = matching::matching_companies(student, context.roster.companies());

            if json {
                let view = StudentView {
                    student,
                    prediction,
                    explanation: explanation
                        .iter()
                        .map(|&(feature, value)| Hint { feature, value })
                        .collect(),
                    eligible,
                    companies,
                };
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else {
                let photo = data::resolve_photo(&context.config.photos_dir, &student.photo_path);
                let dashboard = Dashboard {
                    student,
                    prediction,
                    explanation: &explanation,
                    eligible,
                    companies: &companies,
                    photo: photo.as_deref(),
                    metrics_chart: None,
                    radar_chart: None,
                };
                print!(
                    "{}",
                    report::build_dashboard(&dashboard, Utc::now().date_naive())
                );
            }
        }
        Commands::Report { student_id, out } => {
            write_report(&context, &student_id, &out)?;
            println!("Dashboard written to {}.", out.display());
        }
        Commands::Predict { features } => {
            let features = FeatureVector::try_from(features.as_slice())?;
            let prediction = context.scorer.predict(&features);
            for (name, value) in features.named() {
                println!("{name}: {value}");
            }
            println!("Placement probability: {}%", prediction.probability);
            println!("Risk category: {}", prediction.risk);
            println!("Improve:");
            for (name, value) in risk::explain_risk(features.values()) {
                println!("- {} ({value})", report::display_name(name));
            }
        }
        Commands::InspectModel => {
            let summary = context.scorer.classifier().summary();
            println!("Model format v{}", summary.format_version);
            println!(
                "{} trees, {} nodes, max depth {}",
                summary.tree_count, summary.node_count, summary.max_depth
            );
            println!("Splits per feature:");
            for (feature, count) in &summary.split_counts {
                println!("- {feature}: {count}");
            }
        }
    }

    Ok(())
}

fn write_report(context: &AppContext, student_id: &str, out: &Path) -> anyhow::Result<()> {
    let student = context.roster.find(student_id)?;
    let features = FeatureVector::from_student(student);
    let prediction = context.scorer.predict(&features);
    let explanation = risk::explain_risk(features.values());
    let companies = matching::matching_companies(student, context.roster.companies());
    let photo = data::resolve_photo(&context.config.photos_dir, &student.photo_path);

    let stem = out
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("dashboard");
    let metrics_name = format!("{stem}-metrics.svg");
    let radar_name = format!("{stem}-radar.svg");
    let dir = out.parent().unwrap_or_else(|| Path::new(""));

    let labels: Vec<String> = FEATURES.iter().map(|name| report::display_name(name)).collect();
    let values = features.values();
    let metrics = charts::bar_chart_svg("Key Metrics", &labels, values, 640, 360);
    let radar = charts::radar_chart_svg("Skill Radar", &labels, values, 480);

    let metrics_path = dir.join(&metrics_name);
    std::fs::write(&metrics_path, metrics)
        .with_context(|| format!("failed to write {}", metrics_path.display()))?;
    let radar_path = dir.join(&radar_name);
    std::fs::write(&radar_path, radar)
        .with_context(|| format!("failed to write {}", radar_path.display()))?;

    let dashboard = Dashboard {
        student,
        prediction,
        explanation: &explanation,
        eligible: matching::is_eligible(student),
        companies: &companies,
        photo: photo.as_deref(),
        metrics_chart: Some(metrics_name.as_str()),
        radar_chart: Some(radar_name.as_str()),
    };
    let markdown = report::build_dashboard(&dashboard, Utc::now().date_naive());
    std::fs::write(out, markdown).with_context(|| format!("failed to write {}", out.display()))?;

    info!(student_id, out = %out.display(), "Wrote dashboard");
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::data::tests::{write_temp, COMPANIES_CSV, STUDENTS_CSV};
    use crate::model::tests::sample_ensemble;

    #[test]
    fn cli_parses_score_filters() {
        let cli = Cli::parse_from([
            "placement-dashboard",
            "score",
            "--department",
            "CSE",
            "--risk",
            "medium",
            "--limit",
            "5",
        ]);
        match cli.command {
            Commands::Score {
                department,
                risk,
                limit,
                json,
            } => {
                assert_eq!(department.as_deref(), Some("CSE"));
                assert_eq!(risk, Some(RiskCategory::Medium));
                assert_eq!(limit, 5);
                assert!(!json);
            }
            _ => panic!("expected score command"),
        }
    }

    #[test]
    fn cli_parses_feature_list() {
        let cli = Cli::parse_from([
            "placement-dashboard",
            "predict",
            "--features",
            "6.5,70,65,80,75,60",
        ]);
        match cli.command {
            Commands::Predict { features } => {
                assert_eq!(features, vec![6.5, 70.0, 65.0, 80.0, 75.0, 60.0]);
                assert!(FeatureVector::try_from(features.as_slice()).is_ok());
            }
            _ => panic!("expected predict command"),
        }
    }

    #[test]
    fn report_writes_dashboard_and_charts() {
        let dir = TempDir::new().unwrap();
        let model_path = dir.path().join("placement_model.bin");
        sample_ensemble().save(&model_path).unwrap();
        let photos = dir.path().join("photos");
        std::fs::create_dir(&photos).unwrap();
        std::fs::write(photos.join("S003.png"), b"png").unwrap();
        let students = write_temp(STUDENTS_CSV);
        let companies = write_temp(COMPANIES_CSV);

        let context = AppContext::load(Config {
            students: students.path().to_path_buf(),
            companies: companies.path().to_path_buf(),
            model: model_path,
            photos_dir: photos,
            verbose: false,
        })
        .unwrap();

        let out = dir.path().join("meera.md");
        write_report(&context, "S003", &out).unwrap();

        let markdown = std::fs::read_to_string(&out).unwrap();
        assert!(markdown.contains("[###############.....] 76%"));
        assert!(markdown.contains("- **Risk Category:** Medium Risk"));
        assert!(markdown.contains("S003.png"));
        assert!(markdown.contains("![Key Metrics](meera-metrics.svg)"));
        assert!(markdown.contains("- **Webforge - Frontend Engineer**"));

        let radar = std::fs::read_to_string(dir.path().join("meera-radar.svg")).unwrap();
        assert!(radar.contains(">Soft Skill Score<"));
        assert!(dir.path().join("meera-metrics.svg").is_file());
    }

    #[test]
    fn report_for_unknown_student_fails() {
        let dir = TempDir::new().unwrap();
        let model_path = dir.path().join("placement_model.bin");
        sample_ensemble().save(&model_path).unwrap();
        let students = write_temp(STUDENTS_CSV);
        let companies = write_temp(COMPANIES_CSV);
        let context = AppContext::load(Config {
            students: students.path().to_path_buf(),
            companies: companies.path().to_path_buf(),
            model: model_path,
            photos_dir: dir.path().to_path_buf(),
            verbose: false,
        })
        .unwrap();

        let out = dir.path().join("nobody.md");
        assert!(write_report(&context, "S404", &out).is_err());
        assert!(!out.exists());
    }
}
