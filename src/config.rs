use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::data::Roster;
use crate::model::TreeEnsemble;
use crate::risk::Scorer;

/// Input locations, each overridable from the environment.
#[derive(Debug, Clone, Args)]
pub struct Config {
    /// Student table (CSV)
    #[arg(
        long,
        global = true,
        env = "PLACEMENT_STUDENTS",
        default_value = "data/student_profile.csv"
    )]
    pub students: PathBuf,

    /// Company table (CSV)
    #[arg(
        long,
        global = true,
        env = "PLACEMENT_COMPANIES",
        default_value = "data/companies_profile.csv"
    )]
    pub companies: PathBuf,

    /// Fitted placement model
    #[arg(
        long,
        global = true,
        env = "PLACEMENT_MODEL",
        default_value = "data/placement_model.bin"
    )]
    pub model: PathBuf,

    /// Directory holding student photos
    #[arg(
        long,
        global = true,
        env = "PLACEMENT_PHOTOS",
        default_value = "data/photos"
    )]
    pub photos_dir: PathBuf,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

pub fn init_logging(verbose: bool) -> anyhow::Result<()> {
    let level = if verbose {
        "placement_dashboard=debug"
    } else {
        "placement_dashboard=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .try_init()
        .context("failed to install log subscriber")?;

    Ok(())
}

/// Process-wide inputs, loaded once before any command runs.
pub struct AppContext {
    pub config: Config,
    pub roster: Roster,
    pub scorer: Scorer<TreeEnsemble>,
}

impl AppContext {
    pub fn load(config: Config) -> anyhow::Result<Self> {
        let model = TreeEnsemble::load(&config.model)
            .with_context(|| format!("cannot start without a model at {}", config.model.display()))?;
        let roster = Roster::load(&config.students, &config.companies)
            .context("failed to load student and company tables")?;

        Ok(Self {
            config,
            roster,
            scorer: Scorer::new(model),
        })
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use tempfile::TempDir;

    use super::*;
    use crate::data::tests::{write_temp, COMPANIES_CSV, STUDENTS_CSV};
    use crate::model::tests::sample_ensemble;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        config: Config,
    }

    #[test]
    fn defaults_point_into_data_directory() {
        let harness = Harness::parse_from(["placement-dashboard"]);
        assert_eq!(harness.config.photos_dir, PathBuf::from("data/photos"));
        assert!(!harness.config.verbose);
    }

    #[test]
    fn flags_override_defaults() {
        let harness = Harness::parse_from([
            "placement-dashboard",
            "--model",
            "/tmp/other.bin",
            "-v",
        ]);
        assert_eq!(harness.config.model, PathBuf::from("/tmp/other.bin"));
        assert!(harness.config.verbose);
    }

    #[test]
    fn context_fails_fast_without_model() {
        let dir = TempDir::new().unwrap();
        let students = write_temp(STUDENTS_CSV);
        let companies = write_temp(COMPANIES_CSV);
        let config = Config {
            students: students.path().to_path_buf(),
            companies: companies.path().to_path_buf(),
            model: dir.path().join("missing.bin"),
            photos_dir: dir.path().to_path_buf(),
            verbose: false,
        };

        let err = AppContext::load(config).err().expect("missing model must fail");
        assert!(err.to_string().contains("cannot start without a model"));
    }

    #[test]
    fn context_loads_model_and_tables() {
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

        assert_eq!(context.roster.students().len(), 3);
        assert_eq!(context.scorer.classifier().trees().len(), 3);
    }
}
