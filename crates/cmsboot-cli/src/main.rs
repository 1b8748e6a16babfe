//! `cmsboot` - loads bootstrap documents into a CMS database.
//!
//! Usage:
//!   cmsboot roles demo             # built-in sources, in order
//!   cmsboot ./site.json            # a document on disk
//!   cmsboot --all                  # every default source
//!   RUST_LOG=debug cmsboot -a      # per-entity logging

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};

use cmsboot::pipeline::PipelineWarning;
use cmsboot::{
    load_settings, CmsbootError, Database, LogProgress, Pipeline, PipelineConfig, RunSummary,
    Settings, SourceError,
};

const ROLLBACK_MESSAGE: &str = "An error occurred while bootstrapping the project. \
    Transaction has been rolled back and no data has been stored in the database.";

#[derive(Parser, Debug)]
#[command(name = "cmsboot")]
#[command(about = "Bootstrap a CMS project with sample users, rules and content")]
#[command(group = clap::ArgGroup::new("input").required(true).args(["sources", "all"]))]
struct Args {
    /// Data sources: a built-in name (roles, demo) or a path to a JSON file
    #[arg(value_name = "SOURCE")]
    sources: Vec<String>,

    /// Use all default sources
    #[arg(short = 'a', long)]
    all: bool,

    /// SQLite database to write to
    #[arg(long, env = "CMSBOOT_DATABASE")]
    database: Option<PathBuf>,

    /// Settings file (JSON)
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,
}

impl Args {
    /// Source names to run, in order.
    fn selected_sources(&self, settings: &Settings) -> Vec<String> {
        if self.all {
            settings.default_sources.clone()
        } else {
            self.sources.clone()
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = init_logging(args.json_logs) {
        eprintln!("Failed to initialize logging: {}", e);
        return ExitCode::FAILURE;
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(json: bool) -> anyhow::Result<()> {
    tracing_log::LogTracer::init()?;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

fn run(args: &Args) -> anyhow::Result<()> {
    let mut settings = match &args.config {
        Some(path) => load_settings(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => Settings::default(),
    };
    if let Some(database) = &args.database {
        settings.database_path = database.clone();
    }

    let db = Database::open(&settings.database_path).with_context(|| {
        format!(
            "Failed to open database at {}",
            settings.database_path.display()
        )
    })?;

    let summaries = bootstrap(&db, &settings, &args.selected_sources(&settings))?;
    report(&summaries);
    Ok(())
}

fn bootstrap(
    db: &Database,
    settings: &Settings,
    sources: &[String],
) -> anyhow::Result<Vec<RunSummary>> {
    let config = PipelineConfig::from_settings(settings).context("Invalid section plan")?;
    let pipeline = Pipeline::from_config(Arc::new(config));
    match pipeline.bootstrap_sources(db, sources, &LogProgress) {
        Ok(summaries) => Ok(summaries),
        Err(CmsbootError::Source(e @ SourceError::NotFound(_))) => Err(e.into()),
        Err(e) => Err(anyhow::Error::new(e).context(ROLLBACK_MESSAGE)),
    }
}

fn report(summaries: &[RunSummary]) {
    for summary in summaries {
        let entities: usize = summary.sections.iter().map(|(_, n)| n).sum();
        info!(document = %summary.document, entities, "document applied");
        for warning in &summary.warnings {
            match warning {
                PipelineWarning::MissingContentType { app_label, model } => {
                    warn!(
                        document = %summary.document,
                        app_label = %app_label,
                        model = %model,
                        "permissions skipped for unknown content type"
                    );
                }
            }
        }
    }
}
